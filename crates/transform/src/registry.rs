//! Transformer registry.

use crate::definitions::{self, TransformerDef};
use cxapi_core::{Result, TransformError};
use std::collections::HashMap;

/// Registry mapping event types to transformer definitions.
///
/// Built once at startup and shared read-only afterwards.
#[derive(Debug, Clone)]
pub struct TransformerRegistry {
    defs: HashMap<String, TransformerDef>,
}

impl TransformerRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            defs: HashMap::new(),
        }
    }

    /// Create a registry holding the aggregator event types.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        for (event_type, def) in definitions::builtin() {
            registry.defs.insert(event_type, def);
        }
        registry
    }

    /// Register a definition for an event type.
    pub fn register(&mut self, event_type: impl Into<String>, def: TransformerDef) -> Result<()> {
        let event_type = event_type.into();
        if self.defs.contains_key(&event_type) {
            return Err(TransformError::DuplicateEventType(event_type));
        }
        self.defs.insert(event_type, def);
        Ok(())
    }

    /// Unregister an event type.
    pub fn unregister(&mut self, event_type: &str) -> Option<TransformerDef> {
        self.defs.remove(event_type)
    }

    /// Get the definition for an event type.
    pub fn get(&self, event_type: &str) -> Option<&TransformerDef> {
        self.defs.get(event_type)
    }

    /// Get the definition for an event type, failing if none is registered.
    pub fn resolve(&self, event_type: &str) -> Result<&TransformerDef> {
        self.get(event_type)
            .ok_or_else(|| TransformError::UnknownEventType(event_type.to_string()))
    }

    /// Registered event types, sorted.
    pub fn event_types(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.defs.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    /// Number of registered event types.
    pub fn len(&self) -> usize {
        self.defs.len()
    }

    /// Whether nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }
}

impl Default for TransformerRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definitions::Granularity;

    #[test]
    fn test_builtin_registry() {
        let registry = TransformerRegistry::builtin();
        assert_eq!(registry.len(), 8);
        assert_eq!(
            registry.event_types().first().copied(),
            Some("openedx.completion_aggregator.completion.chapter")
        );
    }

    #[test]
    fn test_register_rejects_duplicates() {
        let mut registry = TransformerRegistry::builtin();
        let err = registry
            .register(
                "openedx.completion_aggregator.completion.course",
                TransformerDef::completion(Granularity::Course),
            )
            .unwrap_err();
        assert!(matches!(err, TransformError::DuplicateEventType(_)));
    }

    #[test]
    fn test_register_and_unregister() {
        let mut registry = TransformerRegistry::new();
        assert!(registry.is_empty());

        registry
            .register("custom.unit.done", TransformerDef::completion(Granularity::Vertical))
            .unwrap();
        assert!(registry.get("custom.unit.done").is_some());

        let removed = registry.unregister("custom.unit.done");
        assert!(removed.is_some());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_resolve_unknown() {
        let registry = TransformerRegistry::builtin();
        let err = registry.resolve("openedx.course.enrollment.activated").unwrap_err();
        assert!(matches!(err, TransformError::UnknownEventType(key) if key == "openedx.course.enrollment.activated"));
    }
}
