mod config;
mod database;
mod snapshot;
mod source;
mod statement;

pub use config::*;
pub use database::MemoryDatabase;
pub use snapshot::*;
pub use source::*;
