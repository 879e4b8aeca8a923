use crate::error::QuoteError;

pub mod client;
pub mod decode;
pub mod request;
pub mod transport;

pub use client::QuoteClient;
pub use decode::{parse_history_payload, parse_quote_payload, QuoteSnapshot};
pub use transport::{HttpResponse, HttpTransport, QuoteTransport};

pub type FetchResult<T> = std::result::Result<T, QuoteError>;
