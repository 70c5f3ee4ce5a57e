//! Severity characterization for security contexts
//!
//! Vendors disagree on scales (0-10, 0-100, coarse levels, inverted
//! ranges), so a severity carries a scale identifier plus whichever of a
//! numeric value, a coarse level, and a full CVSS breakdown the submitter
//! has. CCSS severities reuse the CVSS shape.

use serde::{Deserialize, Serialize};

use crate::enums::str_enum;

str_enum! {
    /// Coarse severity level, also used for asset C/I/A requirements.
    SeverityLevel {
        Critical => "critical",
        High => "high",
        Medium => "medium",
        Low => "low",
        Info => "info",
    }
}

/// CVSS-based score breakdown. Also used to represent CCSS.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cvss {
    /// The CVSS version used. Example: "3.1"
    pub version: String,

    /// The full vector string.
    /// Example: "AV:A/AC:H/PR:L/UI:R/S:C/C:L/I:L/A:L"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vector: Option<String>,

    /// Base score, 0-10.
    pub base_score: f64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub temporal_score: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub environmental_score: Option<f64>,
}

str_enum! {
    /// CVSS 3.1 metric abbreviations, as they appear in a vector string.
    Cvss31Metric {
        AttackVector => "AV",
        AttackComplexity => "AC",
        PrivilegesRequired => "PR",
        UserInteraction => "UI",
        Scope => "S",
        Confidentiality => "C",
        Integrity => "I",
        Availability => "A",
        ExploitCodeMaturity => "E",
        RemediationLevel => "RL",
        ReportConfidence => "RC",
        ConfidentialityRequirement => "CR",
        IntegrityRequirement => "IR",
        AvailabilityRequirement => "AR",
        ModifiedAttackVector => "MAV",
        ModifiedAttackComplexity => "MAC",
        ModifiedPrivilegesRequired => "MPR",
        ModifiedUserInteraction => "MUI",
        ModifiedScope => "MS",
        ModifiedConfidentiality => "MC",
        ModifiedIntegrity => "MI",
        ModifiedAvailability => "MA",
    }
}

/// The severity of a finding.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Severity {
    /// The scale this severity is expressed in. Example: "cvss", "ccss",
    /// "custom".
    #[serde(rename = "type")]
    pub severity_type: String,

    /// Numeric severity; range semantics depend on `severity_type`.
    /// Example: 0-10 when the type is "cvss".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,

    /// Coarse level. May coexist with a numeric value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<SeverityLevel>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub cvss: Option<Cvss>,
}

impl Severity {
    /// A severity carrying only a scale identifier and a numeric value.
    pub fn scored(severity_type: &str, value: f64) -> Self {
        Self {
            severity_type: severity_type.to_string(),
            value: Some(value),
            level: None,
            cvss: None,
        }
    }

    /// A severity carrying only a coarse level, scale "custom".
    pub fn leveled(level: SeverityLevel) -> Self {
        Self {
            severity_type: "custom".to_string(),
            value: None,
            level: Some(level),
            cvss: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_level_wire_spelling() {
        let json = serde_json::to_string(&SeverityLevel::High).unwrap();
        assert_eq!(json, "\"high\"");
        let back: SeverityLevel = serde_json::from_str("\"HIGH\"").unwrap();
        assert_eq!(back, SeverityLevel::High);
    }

    #[test]
    fn test_cvss_camel_case_fields() {
        let cvss = Cvss {
            version: "3.0".to_string(),
            vector: Some("AV:A/AC:H/PR:L/UI:R/S:C/C:L/I:L/A:L".to_string()),
            base_score: 9.2,
            temporal_score: None,
            environmental_score: Some(9.2),
        };
        let value = serde_json::to_value(&cvss).unwrap();
        assert_eq!(value["baseScore"], 9.2);
        assert_eq!(value["environmentalScore"], 9.2);
        assert!(value.get("temporalScore").is_none());
    }

    #[test]
    fn test_metric_abbreviations() {
        assert_eq!(Cvss31Metric::AttackVector.as_str(), "AV");
        assert_eq!(
            "mav".parse::<Cvss31Metric>().unwrap(),
            Cvss31Metric::ModifiedAttackVector
        );
        assert!("XX".parse::<Cvss31Metric>().is_err());
    }
}
