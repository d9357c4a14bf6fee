mod config;
mod models;
mod topics;

pub use config::*;
pub use models::*;
pub use topics::*;
