// netops-api: Async client for the PostgREST-style REST surface of the
// hosted operations database.

pub mod client;
pub mod error;
pub mod query;
pub mod transport;

pub use client::RestClient;
pub use error::Error;
pub use query::{Order, Query};
pub use transport::{TlsMode, TransportConfig};
