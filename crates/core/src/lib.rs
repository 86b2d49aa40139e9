//! cxapi core data models.
//!
//! Aggregator events as they arrive, the xAPI statements they are mapped
//! into, and the vocabulary both sides share.

#![warn(missing_docs)]

mod error;
mod event;
mod statement;
pub mod vocabulary;

// Re-exports
pub use error::{Result, TransformError};
pub use event::EventPayload;
pub use statement::{
    Account, Activity, ActivityDefinition, Agent, Context, ContextActivities, LanguageMap,
    Score, Statement, StatementResult, Verb,
};
pub use vocabulary::{ActivityType, VerbKind};

/// Timestamp type
pub type Time = chrono::DateTime<chrono::Utc>;
