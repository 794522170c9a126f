mod as_value;
mod binder;
mod closer;
mod connection;
mod encoded;
mod error;
mod executor;
mod query;
mod relay;
mod source;
mod util;
mod value;
mod wire_type;

pub use ::anyhow::Context as ErrorContext;
pub use as_value::*;
pub use binder::*;
pub use closer::*;
pub use connection::*;
pub use encoded::*;
pub use error::*;
pub use executor::*;
pub use query::*;
pub use relay::*;
pub use source::*;
pub use util::*;
pub use value::*;
pub use wire_type::*;
pub mod stream {
    pub use ::futures::stream::*;
}
pub use ::futures::future;

pub type Result<T> = anyhow::Result<T>;
pub type Error = anyhow::Error;
