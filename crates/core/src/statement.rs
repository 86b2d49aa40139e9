//! Statement model - what gets exported to a learning record store.
//!
//! Field names serialize the way xAPI expects them (`objectType`,
//! `contextActivities`, `homePage`); empty optional parts are left out.

use crate::Time;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Language tag to text.
pub type LanguageMap = BTreeMap<String, String>;

/// A learning record statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statement {
    /// Deterministic identifier
    pub id: Uuid,

    /// Who did it
    pub actor: Agent,

    /// What they did
    pub verb: Verb,

    /// What they did it to
    pub object: Activity,

    /// Outcome, for progress statements
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<StatementResult>,

    /// Surrounding context
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<Context>,

    /// When it happened
    pub timestamp: Time,

    /// Statement format version
    pub version: String,
}

/// The actor of a statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agent {
    /// Always `Agent`
    #[serde(rename = "objectType")]
    pub object_type: String,

    /// Platform account
    pub account: Account,
}

impl Agent {
    /// Create an agent identified by a platform account.
    pub fn with_account(home_page: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            object_type: "Agent".to_string(),
            account: Account {
                home_page: home_page.into(),
                name: name.into(),
            },
        }
    }
}

/// An account on a platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Platform root URL
    #[serde(rename = "homePage")]
    pub home_page: String,

    /// Account name on that platform
    pub name: String,
}

/// A statement verb.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verb {
    /// Verb IRI
    pub id: String,

    /// Human readable name
    pub display: LanguageMap,
}

/// An activity, used as statement object and as context parent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    /// Always `Activity`
    #[serde(rename = "objectType")]
    pub object_type: String,

    /// Activity IRI; absent when the payload did not supply an identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Type and name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub definition: Option<ActivityDefinition>,
}

impl Activity {
    /// Create an activity with a typed definition.
    pub fn new(id: Option<String>, activity_type: impl Into<String>) -> Self {
        Self {
            object_type: "Activity".to_string(),
            id,
            definition: Some(ActivityDefinition {
                activity_type: activity_type.into(),
                name: None,
            }),
        }
    }

    /// Activity type IRI, if a definition is present.
    pub fn activity_type(&self) -> Option<&str> {
        self.definition.as_ref().map(|d| d.activity_type.as_str())
    }
}

/// Definition of an activity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityDefinition {
    /// Activity type IRI
    #[serde(rename = "type")]
    pub activity_type: String,

    /// Display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<LanguageMap>,
}

/// Statement result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatementResult {
    /// Whether the activity is complete
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion: Option<bool>,

    /// Score
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<Score>,
}

/// A score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Score {
    /// Normalized value, nominally in `[0, 1]`
    pub scaled: f64,
}

/// Statement context.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Context {
    /// Related activities
    #[serde(
        rename = "contextActivities",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub context_activities: Option<ContextActivities>,

    /// Extension IRI to value
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extensions: BTreeMap<String, serde_json::Value>,
}

/// Activities related to the statement object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextActivities {
    /// Containing activities
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parent: Vec<Activity>,
}

impl Statement {
    /// Parent context activities, empty when none were attached.
    pub fn parent_activities(&self) -> &[Activity] {
        self.context
            .as_ref()
            .and_then(|c| c.context_activities.as_ref())
            .map(|a| a.parent.as_slice())
            .unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_activity_serializes_xapi_names() {
        let activity = Activity::new(
            Some("http://localhost/xblock/b1".to_string()),
            "http://adlnet.gov/expapi/activities/module",
        );
        let value = serde_json::to_value(&activity).unwrap();
        assert_eq!(
            value,
            json!({
                "objectType": "Activity",
                "id": "http://localhost/xblock/b1",
                "definition": { "type": "http://adlnet.gov/expapi/activities/module" }
            })
        );
    }

    #[test]
    fn test_activity_without_id_omits_it() {
        let activity = Activity::new(None, "http://adlnet.gov/expapi/activities/course");
        let value = serde_json::to_value(&activity).unwrap();
        assert!(value.get("id").is_none());
    }

    #[test]
    fn test_agent_account() {
        let agent = Agent::with_account("http://localhost", "7");
        let value = serde_json::to_value(&agent).unwrap();
        assert_eq!(value["objectType"], "Agent");
        assert_eq!(value["account"]["homePage"], "http://localhost");
        assert_eq!(value["account"]["name"], "7");
    }

    #[test]
    fn test_empty_context_serializes_empty() {
        let value = serde_json::to_value(Context::default()).unwrap();
        assert_eq!(value, json!({}));
    }
}
