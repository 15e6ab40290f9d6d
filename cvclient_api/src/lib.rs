mod client;
mod errors;
mod transport;
pub mod types;
pub use self::client::{format_url, truncate_body, HttpTransport, DEFAULT_TIMEOUT};
pub use self::errors::Error;
pub use self::transport::{RawResponse, Transport};
