//! Completion and progress transformers.
//!
//! Maps completion aggregator events onto xAPI statements. Each event type
//! is registered with a [`TransformerDef`]; a single [`Transformer`]
//! interprets any definition, and [`XApiProcessor`] dispatches events to
//! the right one.

#![warn(missing_docs)]

pub mod config;
pub mod definitions;
pub mod filter;
pub mod processor;
pub mod registry;
pub mod transformer;

pub use config::{ConfigError, TransformConfig};
pub use definitions::{Family, Granularity, ObjectIdentifier, TransformerDef};
pub use filter::{FilterPipeline, ObjectFilter};
pub use processor::{BatchOutcome, EventFailure, XApiProcessor};
pub use registry::TransformerRegistry;
pub use transformer::{progress_result, Transformer};
