//! Generic transformation from an aggregator event to a statement.
//!
//! One [`Transformer`] handles every event type; what differs between
//! them lives in the [`TransformerDef`] it is built with.

use crate::config::TransformConfig;
use crate::definitions::{Family, TransformerDef};
use crate::filter::FilterPipeline;
use chrono::{DateTime, NaiveDateTime, Utc};
use cxapi_core::vocabulary::{ACTIVITY_COURSE, EXTENSION_TRANSFORMER_VERSION, NAMESPACE_COURSES};
use cxapi_core::{
    Activity, Agent, Context, ContextActivities, EventPayload, Result, Score, Statement,
    StatementResult, Time, TransformError, Verb,
};
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

/// Payload path of the completion percentage.
pub const PERCENT_FIELD: &str = "data.percent";

/// Payload path of the acting user.
pub const USER_FIELD: &str = "context.user_id";

/// Maps one event payload to one statement.
///
/// Cheap to build; holds only borrows of shared, read-only state.
#[derive(Debug, Clone, Copy)]
pub struct Transformer<'a> {
    def: &'a TransformerDef,
    config: &'a TransformConfig,
    filters: &'a FilterPipeline,
}

impl<'a> Transformer<'a> {
    /// Create a transformer for one definition.
    pub fn new(
        def: &'a TransformerDef,
        config: &'a TransformConfig,
        filters: &'a FilterPipeline,
    ) -> Self {
        Self {
            def,
            config,
            filters,
        }
    }

    /// Build the statement for `payload`.
    pub fn transform(&self, payload: &EventPayload) -> Result<Statement> {
        // The identifier is derived once and reused for the whole statement.
        let object_id = self.object_id(payload)?;
        let object = self.object(payload, object_id)?;

        let actor = self.actor(payload)?;
        let verb = self.def.verb().to_verb();
        let timestamp = self.timestamp(payload)?;
        let result = if self.def.includes_result() {
            Some(progress_result(payload)?)
        } else {
            None
        };
        let context = self.context(payload)?;

        let id = statement_id(&actor, &verb, &object, result.as_ref(), &timestamp);
        debug!(
            "Built {} statement {} for {}",
            self.def.verb().display(),
            id,
            object.id.as_deref().unwrap_or("<no object id>")
        );

        Ok(Statement {
            id,
            actor,
            verb,
            object,
            result,
            context: Some(context),
            timestamp,
            version: self.config.xapi_version.clone(),
        })
    }

    /// Object IRI for `payload`.
    ///
    /// A required identifier that is absent or empty fails with
    /// [`TransformError::MissingField`]; an optional one yields `None`.
    pub fn object_id(&self, payload: &EventPayload) -> Result<Option<String>> {
        let Some(identifier) = self.def.identifier else {
            return Ok(None);
        };

        let value = payload.get_string(identifier.field, identifier.required)?;
        let iri = self.config.object_iri(identifier.namespace, value.as_deref());
        if identifier.required && iri.is_none() {
            return Err(TransformError::MissingField(identifier.field.to_string()));
        }
        Ok(iri)
    }

    /// Statement object, after the registered object filters have run.
    pub fn object(&self, payload: &EventPayload, object_id: Option<String>) -> Result<Activity> {
        let object_type = self
            .def
            .object_type
            .ok_or(TransformError::NotImplemented("object type"))?;
        if self.def.family == Family::Completion && object_id.is_none() {
            return Err(TransformError::NotImplemented("object identifier"));
        }

        let object = Activity::new(object_id, object_type.iri());
        self.filters
            .run(self.def.family.object_filter(), object, payload)
    }

    /// Actor identified by a platform account.
    pub fn actor(&self, payload: &EventPayload) -> Result<Agent> {
        let user = payload
            .get_string(USER_FIELD, true)?
            .ok_or_else(|| TransformError::MissingField(USER_FIELD.to_string()))?;
        Ok(Agent::with_account(self.config.root_url(), user))
    }

    /// Event time, from `timestamp` or the legacy `time` key.
    pub fn timestamp(&self, payload: &EventPayload) -> Result<Time> {
        let (path, value) = match payload.get_data("timestamp", false)? {
            Some(value) => ("timestamp", value),
            None => match payload.get_data("time", false)? {
                Some(value) => ("time", value),
                None => return Err(TransformError::MissingField("timestamp".to_string())),
            },
        };

        let raw = value
            .as_str()
            .ok_or_else(|| TransformError::invalid(path, "expected a string"))?;
        parse_timestamp(raw)
            .ok_or_else(|| TransformError::invalid(path, format!("unparseable timestamp {raw:?}")))
    }

    /// Context with the parent course, unless this transformer suppresses it.
    pub fn context(&self, payload: &EventPayload) -> Result<Context> {
        let mut context = Context::default();
        context.extensions.insert(
            EXTENSION_TRANSFORMER_VERSION.to_string(),
            Value::String(self.config.transformer_version.clone()),
        );

        // A course cannot be its own parent.
        if !self.def.suppress_context_activities {
            if let Some(course) = self.course_activity(payload)? {
                context.context_activities = Some(ContextActivities {
                    parent: vec![course],
                });
            }
        }

        Ok(context)
    }

    fn course_activity(&self, payload: &EventPayload) -> Result<Option<Activity>> {
        let course_id = match payload.get_string("context.course_id", false)? {
            Some(id) => Some(id),
            None => payload.get_string("data.course_id", false)?,
        };

        Ok(self
            .config
            .object_iri(NAMESPACE_COURSES, course_id.as_deref())
            .map(|iri| Activity::new(Some(iri), ACTIVITY_COURSE)))
    }
}

/// Result block of a progress statement.
///
/// `scaled` is the percent field, with any falsy value read as `0`;
/// `completion` holds only when `scaled` is exactly `1.0`. Values outside
/// `[0, 1]` are passed through. Strings, `true` and other non-numeric
/// values that are not falsy are rejected.
pub fn progress_result(payload: &EventPayload) -> Result<StatementResult> {
    let scaled = scaled_percent(payload.get_data(PERCENT_FIELD, false)?)?;
    Ok(StatementResult {
        completion: Some(scaled == 1.0),
        score: Some(Score { scaled }),
    })
}

fn scaled_percent(value: Option<&Value>) -> Result<f64> {
    let scaled = match value {
        None | Some(Value::Null) => 0.0,
        Some(Value::Bool(false)) => 0.0,
        Some(Value::Number(n)) => n
            .as_f64()
            .ok_or_else(|| TransformError::invalid(PERCENT_FIELD, "not representable as a float"))?,
        Some(Value::String(s)) if s.is_empty() => 0.0,
        Some(Value::Array(a)) if a.is_empty() => 0.0,
        Some(Value::Object(o)) if o.is_empty() => 0.0,
        Some(_) => {
            return Err(TransformError::invalid(PERCENT_FIELD, "expected a number"));
        }
    };

    if !scaled.is_finite() {
        return Err(TransformError::invalid(PERCENT_FIELD, "must be finite"));
    }
    Ok(scaled)
}

/// Parse an event timestamp. Timestamps without an offset are read as UTC.
pub fn parse_timestamp(raw: &str) -> Option<Time> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Name-based UUID, so the same event always yields the same statement id.
fn statement_id(
    actor: &Agent,
    verb: &Verb,
    object: &Activity,
    result: Option<&StatementResult>,
    timestamp: &Time,
) -> Uuid {
    let score = result
        .and_then(|r| r.score)
        .map(|s| s.scaled.to_string())
        .unwrap_or_default();
    let name = format!(
        "{}|{}|{}|{}|{}",
        actor.account.name,
        verb.id,
        object.id.as_deref().unwrap_or_default(),
        score,
        timestamp.to_rfc3339(),
    );
    Uuid::new_v5(&Uuid::NAMESPACE_URL, name.as_bytes())
}
