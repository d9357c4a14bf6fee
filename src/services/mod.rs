pub mod backend_client;
pub mod config_service;
pub mod diagram_service;
pub mod history_service;
pub mod json_extract;
pub mod stream_reader;

#[cfg(test)]
pub(crate) mod fake_backend;

pub use backend_client::{AnalyzeRequest, Backend, ExpandRequest, HttpBackend};
pub use config_service::Config;
pub use stream_reader::{ChunkStream, StreamReader};
