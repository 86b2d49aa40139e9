//! Event processor - dispatches events to their transformer.

use crate::config::TransformConfig;
use crate::filter::FilterPipeline;
use crate::registry::TransformerRegistry;
use crate::transformer::Transformer;
use cxapi_core::{EventPayload, Result, Statement, TransformError};
use tracing::{debug, warn};

/// Dispatches aggregator events to the transformer registered for them.
///
/// Holds only read-only state once built, so one processor can serve any
/// number of callers.
#[derive(Debug, Default)]
pub struct XApiProcessor {
    registry: TransformerRegistry,
    filters: FilterPipeline,
    config: TransformConfig,
}

/// A single event that could not be transformed.
#[derive(Debug)]
pub struct EventFailure {
    /// Position of the event in the batch
    pub index: usize,

    /// Event type, if the event had one
    pub event_type: Option<String>,

    /// Why it failed
    pub error: TransformError,
}

/// Outcome of transforming a batch of events.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    /// Statements built, in input order
    pub statements: Vec<Statement>,

    /// Events with no registered transformer
    pub skipped: usize,

    /// Events that failed
    pub failures: Vec<EventFailure>,
}

impl BatchOutcome {
    /// Whether every event was either transformed or skipped.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

impl XApiProcessor {
    /// Create a processor with the aggregator transformers and no filters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the configuration.
    pub fn with_config(mut self, config: TransformConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the registry.
    pub fn with_registry(mut self, registry: TransformerRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Set the object filters.
    pub fn with_filters(mut self, filters: FilterPipeline) -> Self {
        self.filters = filters;
        self
    }

    /// The registry in use.
    pub fn registry(&self) -> &TransformerRegistry {
        &self.registry
    }

    /// The configuration in use.
    pub fn config(&self) -> &TransformConfig {
        &self.config
    }

    /// Transform one event, dispatching on its `name`.
    ///
    /// Events with no registered transformer are skipped with `Ok(None)`.
    pub fn transform(&self, event: &EventPayload) -> Result<Option<Statement>> {
        let event_type = event
            .name()
            .ok_or_else(|| TransformError::MissingField("name".to_string()))?;

        if self.registry.get(event_type).is_none() {
            debug!("No transformer registered for {}, skipping", event_type);
            return Ok(None);
        }

        self.transform_as(event_type, event).map(Some)
    }

    /// Transform one event with the transformer registered for `event_type`.
    pub fn transform_as(&self, event_type: &str, event: &EventPayload) -> Result<Statement> {
        let def = self.registry.resolve(event_type)?;
        debug!("Transforming {}", event_type);
        Transformer::new(def, &self.config, &self.filters).transform(event)
    }

    /// Transform a batch, collecting failures instead of stopping at the first.
    pub fn transform_batch<'e, I>(&self, events: I) -> BatchOutcome
    where
        I: IntoIterator<Item = &'e EventPayload>,
    {
        let mut outcome = BatchOutcome::default();

        for (index, event) in events.into_iter().enumerate() {
            match self.transform(event) {
                Ok(Some(statement)) => outcome.statements.push(statement),
                Ok(None) => outcome.skipped += 1,
                Err(error) => {
                    warn!("Event {} ({:?}) failed: {}", index, event.name(), error);
                    outcome.failures.push(EventFailure {
                        index,
                        event_type: event.name().map(str::to_string),
                        error,
                    });
                }
            }
        }

        debug!(
            "Batch done: {} statements, {} skipped, {} failed",
            outcome.statements.len(),
            outcome.skipped,
            outcome.failures.len()
        );
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definitions::{Family, Granularity, TransformerDef};
    use cxapi_core::vocabulary::{VERB_COMPLETED, VERB_PROGRESSED};
    use cxapi_core::Activity;
    use serde_json::json;

    fn event(name: &str, data: serde_json::Value) -> EventPayload {
        EventPayload::new(json!({
            "name": name,
            "timestamp": "2024-03-01T10:15:30Z",
            "context": { "user_id": 3, "course_id": "course-v1:edX+DemoX+Demo" },
            "data": data,
        }))
    }

    #[test]
    fn test_dispatch_by_name() {
        let processor = XApiProcessor::new();

        let completed = processor
            .transform(&event(
                "openedx.completion_aggregator.completion.chapter",
                json!({ "block_id": "b1" }),
            ))
            .unwrap()
            .unwrap();
        assert_eq!(completed.verb.id, VERB_COMPLETED);

        let progressed = processor
            .transform(&event(
                "openedx.completion_aggregator.progress.chapter",
                json!({ "block_id": "b1", "percent": 0.25 }),
            ))
            .unwrap()
            .unwrap();
        assert_eq!(progressed.verb.id, VERB_PROGRESSED);
    }

    #[test]
    fn test_unregistered_event_is_skipped() {
        let processor = XApiProcessor::new();
        let out = processor
            .transform(&event("openedx.course.enrollment.activated", json!({})))
            .unwrap();
        assert!(out.is_none());
    }

    #[test]
    fn test_event_without_name_fails() {
        let processor = XApiProcessor::new();
        let err = processor
            .transform(&EventPayload::new(json!({ "data": {} })))
            .unwrap_err();
        assert!(matches!(err, TransformError::MissingField(path) if path == "name"));
    }

    #[test]
    fn test_transform_as_unknown() {
        let processor = XApiProcessor::new();
        let err = processor
            .transform_as("nope", &event("nope", json!({})))
            .unwrap_err();
        assert!(matches!(err, TransformError::UnknownEventType(_)));
    }

    #[test]
    fn test_batch_collects_failures() {
        let processor = XApiProcessor::new();
        let events = vec![
            event("openedx.completion_aggregator.completion.vertical", json!({ "block_id": "b1" })),
            event("openedx.completion_aggregator.completion.vertical", json!({})),
            event("openedx.course.enrollment.activated", json!({})),
            event("openedx.completion_aggregator.progress.course", json!({ "percent": 1.0 })),
        ];

        let outcome = processor.transform_batch(&events);
        assert_eq!(outcome.statements.len(), 2);
        assert_eq!(outcome.skipped, 1);
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].index, 1);
        assert!(!outcome.is_clean());
    }

    #[test]
    fn test_config_is_used() {
        let processor = XApiProcessor::new()
            .with_config(TransformConfig::default().with_platform_url("https://courses.example.org"));
        let statement = processor
            .transform(&event(
                "openedx.completion_aggregator.completion.sequential",
                json!({ "block_id": "b2" }),
            ))
            .unwrap()
            .unwrap();
        assert_eq!(
            statement.object.id.as_deref(),
            Some("https://courses.example.org/xblock/b2")
        );
    }

    #[test]
    fn test_custom_registry_and_filters() {
        let mut registry = TransformerRegistry::new();
        registry
            .register("custom.unit.completed", TransformerDef::completion(Granularity::Vertical))
            .unwrap();

        let mut filters = FilterPipeline::new();
        filters.register(
            Family::Completion.object_filter(),
            |mut object: Activity, _: &EventPayload| -> Result<Activity> {
                object.id = object.id.map(|id| id.to_lowercase());
                Ok(object)
            },
        );

        let processor = XApiProcessor::new()
            .with_registry(registry)
            .with_filters(filters);
        assert!(processor
            .transform(&event("openedx.completion_aggregator.completion.vertical", json!({})))
            .unwrap()
            .is_none());

        let statement = processor
            .transform(&event("custom.unit.completed", json!({ "block_id": "UNIT" })))
            .unwrap()
            .unwrap();
        assert_eq!(
            statement.object.id.as_deref(),
            Some("http://localhost:18000/xblock/unit")
        );
    }

    #[test]
    fn test_processor_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<XApiProcessor>();
    }
}
