//! Clipfetch - TikTok URL resolution gateway
//!
//! Hexagonal Architecture:
//! - domain/: Pure resolution logic (identifiers, payload parsing, filenames)
//! - ports/: Trait definitions (outbound HTTP, metadata sources)
//! - adapters/: Concrete implementations (reqwest client, axum routes)
//! - application/: Services (normalizer, resolver, sources, media proxy)
//! - config: Environment configuration

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

// Re-exports for convenience
pub use config::{GatewayConfig, ResolverStrategy};
pub use domain::{ResolveError, VideoMetadata};
