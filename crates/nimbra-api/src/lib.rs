// nimbra-api: Async Rust client for the Nimbra Vision element gateway

pub mod client;
pub mod error;
pub mod models;
pub mod tables;
pub mod transport;

pub use client::VisionClient;
pub use error::Error;
pub use models::{
    CreateCircuitFields, ElementInfo, InterAppMessage, InterAppResponse, Row, TableResponse,
};
pub use transport::{TlsMode, TransportConfig};
