mod admin_client;
mod conversions;
mod error;
mod http_transport;
mod params;
mod transport;

pub use admin_client::AdminClient;
pub use error::ClientError;
pub use http_transport::{base_url, HttpTransport};
pub use params::{ApiParams, ParamValue};
pub use transport::{carries_body, AdminTransport};
