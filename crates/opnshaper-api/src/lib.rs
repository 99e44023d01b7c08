// opnshaper-api: Async Rust client for the OPNsense traffic shaper API

pub mod client;
pub mod error;
pub mod interfaces;
pub mod shaper;
pub mod transport;

pub use client::{ApiClient, ApiCredentials};
pub use error::Error;
pub use transport::{TlsMode, TransportConfig};
