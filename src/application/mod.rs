//! Application layer - Services that drive the domain through the ports.

pub mod aggregator;
pub mod normalizer;
pub mod proxy;
pub mod resolver;
pub mod scraper;

pub use aggregator::AggregatorApi;
pub use normalizer::UrlNormalizer;
pub use proxy::{MediaDownload, MediaProxy, ProxyError};
pub use resolver::{build_source, ResolverService};
pub use scraper::PageScraper;
