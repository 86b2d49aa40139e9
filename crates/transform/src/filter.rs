//! Object filters - external hooks over the statement object.
//!
//! Every transformer passes the object it built through the filters
//! registered under its filter type before the object is used. Filters may
//! rewrite the object or reject the event with an error.

use cxapi_core::{Activity, EventPayload, Result};
use std::collections::HashMap;
use tracing::trace;

/// A hook that post-processes a statement object.
pub trait ObjectFilter: Send + Sync {
    /// Rewrite `object`, or fail the transformation.
    fn apply(&self, object: Activity, payload: &EventPayload) -> Result<Activity>;
}

impl<F> ObjectFilter for F
where
    F: Fn(Activity, &EventPayload) -> Result<Activity> + Send + Sync,
{
    fn apply(&self, object: Activity, payload: &EventPayload) -> Result<Activity> {
        self(object, payload)
    }
}

/// Ordered filters, grouped by filter type.
#[derive(Default)]
pub struct FilterPipeline {
    filters: HashMap<String, Vec<Box<dyn ObjectFilter>>>,
}

impl FilterPipeline {
    /// Create an empty pipeline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a filter for a filter type.
    pub fn register(&mut self, filter_type: impl Into<String>, filter: impl ObjectFilter + 'static) {
        self.filters
            .entry(filter_type.into())
            .or_default()
            .push(Box::new(filter));
    }

    /// Number of filters registered for a filter type.
    pub fn count(&self, filter_type: &str) -> usize {
        self.filters.get(filter_type).map_or(0, Vec::len)
    }

    /// Run every filter of `filter_type` over `object`, in registration order.
    pub fn run(&self, filter_type: &str, object: Activity, payload: &EventPayload) -> Result<Activity> {
        let Some(filters) = self.filters.get(filter_type) else {
            return Ok(object);
        };

        trace!("Running {} filters for {}", filters.len(), filter_type);
        filters
            .iter()
            .try_fold(object, |object, filter| filter.apply(object, payload))
    }
}

impl std::fmt::Debug for FilterPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let counts: HashMap<&str, usize> = self
            .filters
            .iter()
            .map(|(k, v)| (k.as_str(), v.len()))
            .collect();
        f.debug_struct("FilterPipeline").field("filters", &counts).finish()
    }
}
