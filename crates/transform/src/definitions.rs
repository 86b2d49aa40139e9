//! Transformer definitions for the aggregator event types.
//!
//! Every registered event type maps to one [`TransformerDef`]. The
//! definitions differ only in data: the verb, the object type, where the
//! object identifier comes from and whether it is mandatory.

use cxapi_core::vocabulary::{NAMESPACE_COURSES, NAMESPACE_XBLOCK};
use cxapi_core::{ActivityType, VerbKind};
use serde::Serialize;
use std::fmt;

/// Prefix shared by every aggregator event type.
pub const EVENT_PREFIX: &str = "openedx.completion_aggregator";

/// Filter type applied to the object of completion statements.
pub const COMPLETION_OBJECT_FILTER: &str = "completion_aggregator.xapi.completion.get_object";

/// Filter type applied to the object of progress statements.
pub const PROGRESS_OBJECT_FILTER: &str = "completion_aggregator.xapi.progress.get_object";

/// Kind of aggregator event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Family {
    /// A block or course was completed
    Completion,
    /// Completion percentage of a block or course changed
    Progress,
}

impl Family {
    /// All families, in registration order.
    pub const ALL: [Family; 2] = [Family::Completion, Family::Progress];

    /// Verb emitted for this family.
    pub fn verb(self) -> VerbKind {
        match self {
            Family::Completion => VerbKind::Completed,
            Family::Progress => VerbKind::Progressed,
        }
    }

    /// Filter type the object is passed through.
    pub fn object_filter(self) -> &'static str {
        match self {
            Family::Completion => COMPLETION_OBJECT_FILTER,
            Family::Progress => PROGRESS_OBJECT_FILTER,
        }
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Family::Completion => f.write_str("completion"),
            Family::Progress => f.write_str("progress"),
        }
    }
}

/// Structural level of the content an event refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    /// Section
    Chapter,
    /// Subsection
    Sequential,
    /// Unit
    Vertical,
    /// Course
    Course,
}

impl Granularity {
    /// All granularities, in registration order.
    pub const ALL: [Granularity; 4] = [
        Granularity::Chapter,
        Granularity::Sequential,
        Granularity::Vertical,
        Granularity::Course,
    ];

    /// Activity type of the statement object.
    pub fn activity_type(self) -> ActivityType {
        match self {
            Granularity::Chapter | Granularity::Sequential => ActivityType::Module,
            Granularity::Vertical => ActivityType::Lesson,
            Granularity::Course => ActivityType::Course,
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Granularity::Chapter => "chapter",
            Granularity::Sequential => "sequential",
            Granularity::Vertical => "vertical",
            Granularity::Course => "course",
        };
        f.write_str(name)
    }
}

/// Where the object identifier is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ObjectIdentifier {
    /// Dotted payload path
    pub field: &'static str,

    /// IRI namespace the identifier is placed under
    pub namespace: &'static str,

    /// Whether a missing identifier fails the transformation
    pub required: bool,
}

/// Everything that distinguishes one transformer from another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TransformerDef {
    /// Completion or progress
    pub family: Family,

    /// Object activity type; `None` leaves the transformer unusable
    pub object_type: Option<ActivityType>,

    /// Object identifier source; `None` leaves completion transformers unusable
    pub identifier: Option<ObjectIdentifier>,

    /// Drop the parent course from the context activities
    pub suppress_context_activities: bool,
}

impl TransformerDef {
    /// Definition for a completion event at `granularity`.
    pub fn completion(granularity: Granularity) -> Self {
        Self::for_family(Family::Completion, granularity)
    }

    /// Definition for a progress event at `granularity`.
    pub fn progress(granularity: Granularity) -> Self {
        Self::for_family(Family::Progress, granularity)
    }

    /// Definition for any family and granularity.
    pub fn for_family(family: Family, granularity: Granularity) -> Self {
        let is_course = granularity == Granularity::Course;
        let (field, namespace) = if is_course {
            ("data.course_id", NAMESPACE_COURSES)
        } else {
            ("data.block_id", NAMESPACE_XBLOCK)
        };

        Self {
            family,
            object_type: Some(granularity.activity_type()),
            identifier: Some(ObjectIdentifier {
                field,
                namespace,
                required: family == Family::Completion,
            }),
            suppress_context_activities: is_course,
        }
    }

    /// Verb emitted by this transformer.
    pub fn verb(&self) -> VerbKind {
        self.family.verb()
    }

    /// Whether the statement carries a score.
    pub fn includes_result(&self) -> bool {
        self.family == Family::Progress
    }
}

/// Event type key for a family and granularity.
pub fn event_type(family: Family, granularity: Granularity) -> String {
    format!("{EVENT_PREFIX}.{family}.{granularity}")
}

/// The eight aggregator event types and their definitions.
pub fn builtin() -> Vec<(String, TransformerDef)> {
    Family::ALL
        .into_iter()
        .flat_map(|family| {
            Granularity::ALL.into_iter().map(move |granularity| {
                (
                    event_type(family, granularity),
                    TransformerDef::for_family(family, granularity),
                )
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_type_keys() {
        assert_eq!(
            event_type(Family::Completion, Granularity::Vertical),
            "openedx.completion_aggregator.completion.vertical"
        );
        assert_eq!(
            event_type(Family::Progress, Granularity::Course),
            "openedx.completion_aggregator.progress.course"
        );
    }

    #[test]
    fn test_builtin_covers_every_combination() {
        let defs = builtin();
        assert_eq!(defs.len(), 8);
        assert!(defs
            .iter()
            .any(|(key, _)| key == "openedx.completion_aggregator.completion.sequential"));
    }

    #[test]
    fn test_completion_identifiers_are_required() {
        for granularity in Granularity::ALL {
            let def = TransformerDef::completion(granularity);
            assert!(def.identifier.unwrap().required);
            assert!(!def.includes_result());
        }
    }

    #[test]
    fn test_progress_identifiers_are_optional() {
        for granularity in Granularity::ALL {
            let def = TransformerDef::progress(granularity);
            assert!(!def.identifier.unwrap().required);
            assert!(def.includes_result());
        }
    }

    #[test]
    fn test_course_reads_course_id() {
        let def = TransformerDef::completion(Granularity::Course);
        let identifier = def.identifier.unwrap();
        assert_eq!(identifier.field, "data.course_id");
        assert_eq!(identifier.namespace, "courses");
        assert!(def.suppress_context_activities);
        assert_eq!(def.object_type, Some(ActivityType::Course));
    }

    #[test]
    fn test_lesson_differs_from_module_only_by_type() {
        let module = TransformerDef::progress(Granularity::Sequential);
        let lesson = TransformerDef::progress(Granularity::Vertical);
        assert_eq!(module.identifier, lesson.identifier);
        assert_eq!(module.family, lesson.family);
        assert_eq!(module.suppress_context_activities, lesson.suppress_context_activities);
        assert_eq!(module.object_type, Some(ActivityType::Module));
        assert_eq!(lesson.object_type, Some(ActivityType::Lesson));
    }
}
