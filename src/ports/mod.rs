//! Ports - Trait seams between the resolution logic and the network.

pub mod http;
pub mod source;

pub use http::{ByteStream, FetchError, FetchRequest, FetchedPage, HttpClient, MediaResponse};
pub use source::MetadataSource;
