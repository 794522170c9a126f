//! Sluice: lossless row streaming and explicit parameter typing for managed SQL services.
//!
//! * [`Binder`] turns named values into a [`BindingSet`] where every parameter carries an
//!   explicit [`WireType`]. Strings stay strings whatever they look like.
//! * [`Relay`] forwards a [`RowSource`] through any number of layers without losing items,
//!   absence markers included, and releases it exactly once.
pub use sluice_core::*;
