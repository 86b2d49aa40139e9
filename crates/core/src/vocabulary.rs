//! xAPI vocabulary used by the aggregator statements.

use crate::statement::{LanguageMap, Verb};
use serde::{Deserialize, Serialize};

/// Statement format version written on every statement.
pub const XAPI_VERSION: &str = "1.0.3";

/// Language tag used for verb displays.
pub const EN: &str = "en";

/// Verb IRI for completion statements.
pub const VERB_COMPLETED: &str = "http://adlnet.gov/expapi/verbs/completed";

/// Verb IRI for progress statements.
pub const VERB_PROGRESSED: &str = "http://adlnet.gov/expapi/verbs/progressed";

/// Activity type for sections and subsections.
pub const ACTIVITY_MODULE: &str = "http://adlnet.gov/expapi/activities/module";

/// Activity type for units.
pub const ACTIVITY_LESSON: &str = "http://adlnet.gov/expapi/activities/lesson";

/// Activity type for courses.
pub const ACTIVITY_COURSE: &str = "http://adlnet.gov/expapi/activities/course";

/// Context extension carrying the name and version of the transformer.
pub const EXTENSION_TRANSFORMER_VERSION: &str =
    "https://w3id.org/xapi/openedx/extension/transformer-version";

/// IRI namespace for course blocks.
pub const NAMESPACE_XBLOCK: &str = "xblock";

/// IRI namespace for courses.
pub const NAMESPACE_COURSES: &str = "courses";

/// The verbs a transformer can emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerbKind {
    /// The learner finished the activity
    Completed,
    /// The learner advanced through the activity
    Progressed,
}

impl VerbKind {
    /// Verb IRI.
    pub fn iri(self) -> &'static str {
        match self {
            VerbKind::Completed => VERB_COMPLETED,
            VerbKind::Progressed => VERB_PROGRESSED,
        }
    }

    /// English display word.
    pub fn display(self) -> &'static str {
        match self {
            VerbKind::Completed => "completed",
            VerbKind::Progressed => "progressed",
        }
    }

    /// Build the statement verb.
    pub fn to_verb(self) -> Verb {
        let mut display = LanguageMap::new();
        display.insert(EN.to_string(), self.display().to_string());
        Verb {
            id: self.iri().to_string(),
            display,
        }
    }
}

/// Activity types an object can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityType {
    /// Section or subsection
    Module,
    /// Unit
    Lesson,
    /// Whole course
    Course,
}

impl ActivityType {
    /// Activity type IRI.
    pub fn iri(self) -> &'static str {
        match self {
            ActivityType::Module => ACTIVITY_MODULE,
            ActivityType::Lesson => ACTIVITY_LESSON,
            ActivityType::Course => ACTIVITY_COURSE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verb_display() {
        let verb = VerbKind::Progressed.to_verb();
        assert_eq!(verb.id, VERB_PROGRESSED);
        assert_eq!(verb.display.get(EN).map(String::as_str), Some("progressed"));
    }

    #[test]
    fn test_activity_iris_are_distinct() {
        assert_ne!(ActivityType::Module.iri(), ActivityType::Lesson.iri());
        assert_eq!(ActivityType::Course.iri(), ACTIVITY_COURSE);
    }
}
