//! The Signal record: one assessment event about one entity
//!
//! A signal pairs the asset it concerns (`entity`) with one or more
//! findings (`securityContext` / `securityContexts`), plus submitter and
//! lifecycle metadata. On the wire it is a single JSON object with
//! lower-camel-case field spellings and ISO-8601 timestamps; unknown
//! fields are ignored on decode for forward compatibility.
//!
//! Signals are constructed once (from parsed input or through the
//! builder) and treated as immutable afterwards.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::context::SecurityContext;
use crate::entity::Entity;
use crate::enums::str_enum;
use crate::{MAX_CONFIDENCE, MIN_CONFIDENCE, SIGNAL_VERSION};

str_enum! {
    /// How much of the record a submitter chose to send.
    ///
    /// `entityOnly` posts the asset alone, to be referenced later;
    /// `securityContextOnly` posts a finding referencing a known asset.
    SignalType {
        Default => "default",
        EntityOnly => "entityOnly",
        SecurityContextOnly => "securityContextOnly",
    }
}

/// Details about the submitter of a signal.
///
/// The name must be a stable unique identifier: the consumer keys signal
/// lifecycle management on it across repeated submissions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignalSource {
    pub name: String,

    /// Advisory resubmission interval for sources that guarantee they will
    /// submit a fresh assessment. An explicit `expiresAt` on the signal
    /// takes precedence when both are present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_submission_interval_in_mins: Option<u32>,
}

impl SignalSource {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            next_submission_interval_in_mins: None,
        }
    }
}

/// A geographical region the signal applies to (ISO-3166 alpha-2 code).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub country_code: String,
}

/// One submitted security observation about one entity.
///
/// A useful signal carries at least one of `entity` or a security context;
/// one with neither has no scoreable information and the quality scorer
/// penalizes it accordingly.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Signal {
    /// Schema version of this record.
    pub version: String,

    /// Globally unique id, preferably a GUID. Resubmitting with the same id
    /// overwrites the previously submitted signal.
    pub id: String,

    /// Stable name of the logical finding. Repeated submissions of the same
    /// finding must keep the name; changing it creates a distinct finding
    /// even when the id is reused.
    pub name: String,

    pub source: SignalSource,

    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub signal_type: Option<SignalType>,

    /// Human readable explanation of the signal.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// When the information was converted into a signal and submitted.
    /// Distinct from `firstSeen`.
    pub created_at: DateTime<Utc>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_seen: Option<DateTime<Utc>>,

    /// Typically the last detection time at the source.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_seen: Option<DateTime<Utc>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified_at: Option<DateTime<Utc>>,

    /// When this signal stops being relevant. A daily submitter would set
    /// this 24 hours past submission.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,

    /// Set when the signal is no longer valid; update `modifiedAt` too.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revoked: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<BTreeMap<String, Vec<String>>>,

    /// Submitter confidence in the correctness of the data, documented
    /// range 0-100. Not enforced here; the scorer uses the raw value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<i64>,

    /// Regions this signal is specific to, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Vec<Location>>,

    /// Refinement notes. Example: "Added ATT&CK mapping to the signal"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity: Option<Entity>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub security_context: Option<SecurityContext>,

    /// Additional findings on the same entity. Evaluated alongside
    /// `securityContext` when both are present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub security_contexts: Option<Vec<SecurityContext>>,

    /// Business-facing key-value context, e.g. remediation cost or
    /// cyber-insurance impact. No naming standard is imposed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business_context: Option<BTreeMap<String, Vec<String>>>,
}

impl Signal {
    /// Create a new signal builder. The id defaults to a fresh UUID v4 and
    /// `createdAt` to now.
    pub fn builder(name: &str, source: SignalSource) -> SignalBuilder {
        SignalBuilder::new(name, source)
    }
}

/// Builder for signals.
pub struct SignalBuilder {
    id: String,
    version: String,
    name: String,
    source: SignalSource,
    signal_type: Option<SignalType>,
    description: Option<String>,
    created_at: DateTime<Utc>,
    expires_at: Option<DateTime<Utc>>,
    confidence: Option<i64>,
    entity: Option<Entity>,
    security_contexts: Vec<SecurityContext>,
    tags: Option<BTreeMap<String, Vec<String>>>,
}

impl SignalBuilder {
    pub fn new(name: &str, source: SignalSource) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            version: SIGNAL_VERSION.to_string(),
            name: name.to_string(),
            source,
            signal_type: None,
            description: None,
            created_at: Utc::now(),
            expires_at: None,
            confidence: None,
            entity: None,
            security_contexts: Vec::new(),
            tags: None,
        }
    }

    /// Override the generated id, e.g. to overwrite a prior submission.
    pub fn id(mut self, id: &str) -> Self {
        self.id = id.to_string();
        self
    }

    pub fn signal_type(mut self, signal_type: SignalType) -> Self {
        self.signal_type = Some(signal_type);
        self
    }

    pub fn description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    pub fn expires_at(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    /// Clamped into the documented 0-100 range.
    pub fn confidence(mut self, confidence: i64) -> Self {
        self.confidence = Some(confidence.clamp(MIN_CONFIDENCE, MAX_CONFIDENCE));
        self
    }

    pub fn entity(mut self, entity: Entity) -> Self {
        self.entity = Some(entity);
        self
    }

    /// Add a finding. The first one becomes `securityContext`; further
    /// ones accumulate in `securityContexts`.
    pub fn security_context(mut self, context: SecurityContext) -> Self {
        self.security_contexts.push(context);
        self
    }

    pub fn tag(mut self, key: &str, values: &[&str]) -> Self {
        self.tags
            .get_or_insert_with(BTreeMap::new)
            .insert(key.to_string(), values.iter().map(|v| v.to_string()).collect());
        self
    }

    pub fn build(self) -> Signal {
        let mut contexts = self.security_contexts.into_iter();
        let security_context = contexts.next();
        let rest: Vec<SecurityContext> = contexts.collect();

        Signal {
            version: self.version,
            id: self.id,
            name: self.name,
            source: self.source,
            signal_type: self.signal_type,
            description: self.description,
            created_at: self.created_at,
            first_seen: None,
            last_seen: None,
            modified_at: None,
            expires_at: self.expires_at,
            revoked: None,
            tags: self.tags,
            confidence: self.confidence,
            location: None,
            comment: None,
            entity: self.entity,
            security_context,
            security_contexts: if rest.is_empty() { None } else { Some(rest) },
            business_context: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{ComplianceStatus, SecurityType, Status};
    use crate::entity::EntityType;
    use crate::severity::Severity;

    fn ca_context() -> SecurityContext {
        SecurityContext::new(
            SecurityType::Ca,
            Status {
                compliance_status: Some(ComplianceStatus::Fail),
                workflow_status: None,
            },
            Severity::scored("ccss", 7.2),
        )
    }

    #[test]
    fn test_builder_defaults() {
        let signal = Signal::builder("Firewall state should be On", SignalSource::new("acme.scanner"))
            .signal_type(SignalType::Default)
            .confidence(250)
            .build();

        assert_eq!(signal.version, SIGNAL_VERSION);
        assert!(Uuid::parse_str(&signal.id).is_ok());
        assert_eq!(signal.confidence, Some(100));
        assert!(signal.entity.is_none());
        assert!(signal.security_context.is_none());
    }

    #[test]
    fn test_builder_splits_contexts() {
        let signal = Signal::builder("n", SignalSource::new("s"))
            .security_context(ca_context())
            .security_context(ca_context())
            .security_context(ca_context())
            .build();

        assert!(signal.security_context.is_some());
        assert_eq!(signal.security_contexts.as_ref().map(Vec::len), Some(2));
    }

    #[test]
    fn test_wire_field_spellings() {
        let signal = Signal::builder("n", SignalSource::new("s"))
            .signal_type(SignalType::EntityOnly)
            .entity(Entity::new(EntityType::Machine, "host.acme.com"))
            .build();
        let value = serde_json::to_value(&signal).unwrap();

        assert_eq!(value["type"], "entityOnly");
        assert!(value["createdAt"].is_string());
        assert_eq!(value["entity"]["type"], "machine");
        assert!(value.get("securityContexts").is_none());
        assert!(value.get("signal_type").is_none());
    }

    #[test]
    fn test_round_trip_preserves_shape() {
        let signal = Signal::builder("n", SignalSource::new("s"))
            .entity(Entity::new(EntityType::File, "payload.exe"))
            .security_context(ca_context())
            .tag("tenantName", &["acme"])
            .build();

        let text = serde_json::to_string(&signal).unwrap();
        let back: Signal = serde_json::from_str(&text).unwrap();

        assert_eq!(back.id, signal.id);
        assert_eq!(back.created_at, signal.created_at);
        assert_eq!(back.entity.as_ref().map(|e| e.entity_type), Some(EntityType::File));
        assert_eq!(back.tags, signal.tags);
    }

    #[test]
    fn test_unknown_top_level_fields_are_ignored() {
        let signal: Signal = serde_json::from_str(
            r#"{
                "version": "1.0",
                "id": "x",
                "name": "n",
                "source": { "name": "s" },
                "createdAt": "2022-07-22T02:15:05Z",
                "someFutureField": [1, 2, 3]
            }"#,
        )
        .unwrap();
        assert_eq!(signal.id, "x");
    }
}
