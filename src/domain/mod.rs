//! Domain layer - Pure resolution logic, no I/O.

pub mod aggregator;
pub mod filename;
pub mod identifier;
pub mod payload;
pub mod video;

pub use video::{ErrorKind, MediaVariant, ResolutionResult, ResolveError, VariantKind, VideoMetadata};
