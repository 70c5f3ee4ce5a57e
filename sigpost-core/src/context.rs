//! The security context: the actual finding inside a signal
//!
//! A context names the kind of finding (vulnerability, misconfiguration,
//! detection, backup event, ...), its status and severity, and optional
//! enrichment: standards mappings, kill-chain phases, attack patterns with
//! technique mappings, campaigns, effects, and remediation guidance.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::enums::str_enum;
use crate::severity::Severity;
use crate::{MAX_DEGREE_OF_IMPACT, MIN_DEGREE_OF_IMPACT};

/// Prefix marking a text field as a reference to another signal.
pub const SIGNAL_URL_PREFIX: &str = "signalurl://";

/// A text field that is either literal text or a pointer to the same field
/// on another signal, written `signalurl://<signal id>` on the wire.
/// Resolving a reference is the consumer's responsibility.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TextOrRef {
    Literal(String),
    Reference(String),
}

impl TextOrRef {
    pub fn literal(text: &str) -> Self {
        Self::Literal(text.to_string())
    }

    /// A reference to the corresponding field of the signal with `id`.
    pub fn reference(id: &str) -> Self {
        Self::Reference(id.to_string())
    }
}

impl From<String> for TextOrRef {
    fn from(raw: String) -> Self {
        match raw.strip_prefix(SIGNAL_URL_PREFIX) {
            Some(id) => Self::Reference(id.to_string()),
            None => Self::Literal(raw),
        }
    }
}

impl From<TextOrRef> for String {
    fn from(text: TextOrRef) -> Self {
        match text {
            TextOrRef::Literal(text) => text,
            TextOrRef::Reference(id) => format!("{SIGNAL_URL_PREFIX}{id}"),
        }
    }
}

str_enum! {
    /// The kind of security information a context carries.
    SecurityType {
        Finding => "finding",
        OutsideIn => "outsideIn",
        Ca => "ca",
        Va => "va",
        Edr => "edr",
        Log => "log",
        Backup => "backup",
        Network => "network",
        Dlp => "dlp",
        Email => "email",
        Uba => "uba",
        Waf => "waf",
        Others => "others",
    }
}

str_enum! {
    /// Assessment outcome for compliance-style findings.
    ComplianceStatus {
        Pass => "pass",
        Fail => "fail",
        Unknown => "unknown",
    }
}

str_enum! {
    /// Business workflow state at the source of the signal.
    WorkflowStatus {
        New => "new",
        RiskAccepted => "riskAccepted",
        Resolved => "resolved",
    }
}

str_enum! {
    /// Possible effect of the finding, motivated by the AWS ASFF spec.
    Effect {
        DataExposure => "dataExposure",
        DataExfiltration => "dataExfiltration",
        DataDestruction => "dataDestruction",
        DenialOfService => "denialOfService",
        ResourceConsumption => "resourceConsumption",
    }
}

str_enum! {
    /// What kind of control the signal represents.
    ControlType {
        Detection => "detection",
        Mitigation => "mitigation",
        Resilience => "resilience",
        Recovery => "recovery",
    }
}

/// State of the security information.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Status {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compliance_status: Option<ComplianceStatus>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub workflow_status: Option<WorkflowStatus>,
}

/// Evidence backing the finding: free text and/or a pointer to a stored
/// document or screenshot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Evidence {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observation_text: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

/// Mapping of the finding to a standard like CIS, STIG, NVD, or OWASP.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StandardMapping {
    /// Example: "cisBenchmark"
    pub name: String,

    /// Example: "9.14"
    pub value: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<BTreeMap<String, String>>,
}

/// A phase in a named kill chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KillChainPhase {
    /// Example: "lockheed-martin-cyber-kill-chain", "mitre-attack"
    pub name: String,

    /// Example: "reconnaissance", "credential-access"
    pub phase: String,
}

/// Mapping of an attack pattern to an external attack-technique taxonomy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TechniqueMapping {
    /// Example: "Brute Force"
    pub technique_name: String,

    /// Example: "T1110"
    pub technique_id: String,
}

/// A way adversaries attempt to compromise targets, preferably named with
/// CAPEC terminology.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttackPattern {
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<TextOrRef>,

    /// Taxonomy the pattern comes from. Example: "capec", "cve"
    pub source_name: String,

    /// Identifier within the taxonomy. Example: "CAPEC-49"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub mapping: Option<TechniqueMapping>,
}

/// A grouping of adversarial behavior over a period of time against a
/// specific set of targets.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Campaign {
    pub name: String,

    pub aliases: Vec<String>,

    /// What the actor hopes to accomplish with this campaign.
    pub objective: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<TextOrRef>,

    pub first_seen: DateTime<Utc>,

    pub last_seen: DateTime<Utc>,
}

/// Narrative description of the finding for different audiences.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextDescription {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business: Option<TextOrRef>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub technical: Option<TextOrRef>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub business_impact: Option<TextOrRef>,
}

/// Remediation guidance for the finding.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Remediation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<TextOrRef>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<TextOrRef>,

    /// Multiple reference links; will eventually replace `reference`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub references: Option<Vec<TextOrRef>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub impact: Option<TextOrRef>,
}

/// One finding on the entity the signal refers to.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityContext {
    #[serde(rename = "type")]
    pub context_type: SecurityType,

    /// Additional context. Example: "UserAccess" for a uba context.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_type: Option<String>,

    pub status: Status,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub evidence: Option<Evidence>,

    pub severity: Severity,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub standards_mapping: Option<Vec<StandardMapping>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub kill_chain_phases: Option<Vec<KillChainPhase>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub attack_pattern: Option<Vec<AttackPattern>>,

    /// CAM control identifiers this finding contributes to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cam_controls: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub campaign: Option<Vec<Campaign>>,

    /// Submitter-asserted scoring adjustment, documented range -10..=10.
    /// 0 means "derive the impact from the severity instead".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub degree_of_impact: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub effect: Option<Vec<Effect>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub control_type: Option<ControlType>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<ContextDescription>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub remediation: Option<Remediation>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<BTreeMap<String, Vec<String>>>,
}

impl SecurityContext {
    /// A minimal context: type, status, and severity only.
    pub fn new(context_type: SecurityType, status: Status, severity: Severity) -> Self {
        Self {
            context_type,
            sub_type: None,
            status,
            evidence: None,
            severity,
            standards_mapping: None,
            kill_chain_phases: None,
            attack_pattern: None,
            cam_controls: None,
            campaign: None,
            degree_of_impact: None,
            effect: None,
            control_type: None,
            description: None,
            remediation: None,
            tags: None,
        }
    }

    /// Assert a scoring adjustment, clamped into the documented -10..=10
    /// range. Decoded values are taken as-is.
    pub fn with_degree_of_impact(mut self, impact: i64) -> Self {
        self.degree_of_impact = Some(impact.clamp(MIN_DEGREE_OF_IMPACT, MAX_DEGREE_OF_IMPACT));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_or_ref_wire_forms() {
        let literal: TextOrRef = serde_json::from_str("\"patch the host\"").unwrap();
        assert_eq!(literal, TextOrRef::literal("patch the host"));

        let reference: TextOrRef =
            serde_json::from_str("\"signalurl://09d34300-4c54\"").unwrap();
        assert_eq!(reference, TextOrRef::reference("09d34300-4c54"));

        let round = serde_json::to_string(&reference).unwrap();
        assert_eq!(round, "\"signalurl://09d34300-4c54\"");
    }

    #[test]
    fn test_minimal_context_decodes() {
        let ctx: SecurityContext = serde_json::from_str(
            r#"{
                "type": "ca",
                "status": { "complianceStatus": "fail" },
                "severity": { "type": "ccss", "value": 7.2 }
            }"#,
        )
        .unwrap();
        assert_eq!(ctx.context_type, SecurityType::Ca);
        assert_eq!(ctx.status.compliance_status, Some(ComplianceStatus::Fail));
        assert_eq!(ctx.severity.value, Some(7.2));
    }

    #[test]
    fn test_missing_status_is_a_decode_error() {
        let result = serde_json::from_str::<SecurityContext>(
            r#"{"type": "ca", "severity": {"type": "ccss"}}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_degree_of_impact_is_clamped() {
        let minimal = || {
            SecurityContext::new(
                SecurityType::Va,
                Status::default(),
                Severity::scored("cvss", 9.8),
            )
        };
        assert_eq!(minimal().with_degree_of_impact(25).degree_of_impact, Some(10));
        assert_eq!(minimal().with_degree_of_impact(-25).degree_of_impact, Some(-10));
        assert_eq!(minimal().with_degree_of_impact(8).degree_of_impact, Some(8));
    }

    #[test]
    fn test_unknown_context_fields_are_ignored() {
        let ctx: SecurityContext = serde_json::from_str(
            r#"{
                "type": "va",
                "status": {},
                "severity": { "type": "cvss", "value": 5.0 },
                "futureField": { "nested": true }
            }"#,
        )
        .unwrap();
        assert_eq!(ctx.context_type, SecurityType::Va);
    }
}
