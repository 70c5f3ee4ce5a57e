//! Quality scoring for signals
//!
//! The more information a signal carries, the more useful it is to the
//! scoring platform. The quality score is a weighted arithmetic mean over
//! a fixed list of presence factors: each factor contributes a value and a
//! weight depending on whether the field it inspects is populated.
//!
//! The documented contract is "a number between 0 and 100", but the factor
//! table ranges from -300 (no entity) to +200 (high-value enrichment), so
//! the mean is deliberately not clamped: a signal missing its entity scores
//! strongly negative and a heavily enriched one can exceed 100.
//!
//! The scorer never mutates its input and never fails: every missing
//! optional chain degenerates to the factor's absent branch.

use crate::context::SecurityContext;
use crate::signal::Signal;

/// One contribution to the weighted mean.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Factor {
    pub value: f64,
    pub weight: f64,
}

impl Factor {
    fn new(value: f64, weight: f64) -> Self {
        Self { value, weight }
    }
}

fn presence(present: bool, if_present: f64, if_absent: f64) -> Factor {
    Factor::new(if present { if_present } else { if_absent }, 1.0)
}

/// Estimate how complete a signal is.
///
/// Contexts are factor-pooled: `securityContext` and every element of
/// `securityContexts` each contribute a full factor set to one flat list,
/// which is then averaged as a whole. A signal with many contexts is not
/// scored per-context and aggregated.
pub fn quality_of_signal(signal: &Signal) -> f64 {
    let mut factors = Vec::new();

    factors.push(presence(!signal.name.is_empty(), 60.0, 20.0));
    factors.push(presence(!signal.source.name.is_empty(), 50.0, 30.0));
    factors.push(presence(signal.signal_type.is_some(), 60.0, 10.0));

    // A stated confidence counts at half weight; an unstated one falls back
    // to a full-weight neutral value.
    match signal.confidence {
        Some(confidence) => factors.push(Factor::new(confidence as f64, 0.5)),
        None => factors.push(Factor::new(30.0, 1.0)),
    }

    let entity = signal.entity.as_ref();
    let attributes = entity.and_then(|e| e.entity_attributes.as_ref());

    // A signal without an entity carries no scoreable information; the
    // -300 factor dominates the mean.
    factors.push(presence(entity.is_some(), 60.0, -300.0));
    // The entity type is mandatory within an entity, so this tracks
    // entity presence.
    factors.push(presence(entity.is_some(), 60.0, 10.0));
    factors.push(presence(
        attributes.and_then(|a| a.attribute_type.as_deref()).is_some_and(|t| !t.is_empty()),
        60.0,
        30.0,
    ));
    factors.push(presence(
        attributes.is_some_and(|a| a.confidentiality_requirement.is_some()),
        70.0,
        30.0,
    ));
    factors.push(presence(
        attributes.is_some_and(|a| a.integrity_requirement.is_some()),
        70.0,
        30.0,
    ));
    factors.push(presence(
        attributes.is_some_and(|a| a.availability_requirement.is_some()),
        70.0,
        30.0,
    ));

    if let Some(context) = &signal.security_context {
        factors.extend(security_context_factors(context));
    }
    if let Some(contexts) = &signal.security_contexts {
        for context in contexts {
            factors.extend(security_context_factors(context));
        }
    }

    weighted_average(&factors)
}

fn security_context_factors(context: &SecurityContext) -> Vec<Factor> {
    let mut factors = Vec::with_capacity(8);

    // `type` and `severity` are mandatory on a decoded context, so their
    // present branches always apply.
    factors.push(Factor::new(70.0, 1.0));
    factors.push(presence(context.status.compliance_status.is_some(), 70.0, 30.0));
    factors.push(Factor::new(50.0, 1.0));
    factors.push(presence(
        context.standards_mapping.as_ref().is_some_and(|m| !m.is_empty()),
        200.0,
        50.0,
    ));
    // Only the first attack pattern's technique mapping is inspected.
    factors.push(presence(
        context
            .attack_pattern
            .as_ref()
            .and_then(|patterns| patterns.first())
            .and_then(|pattern| pattern.mapping.as_ref())
            .is_some_and(|mapping| !mapping.technique_id.is_empty()),
        200.0,
        50.0,
    ));
    // Zero means "derive impact from severity" and counts as absent.
    factors.push(presence(
        context.degree_of_impact.is_some_and(|impact| impact != 0),
        200.0,
        50.0,
    ));
    factors.push(presence(context.control_type.is_some(), 60.0, 50.0));
    factors.push(presence(
        context.effect.as_ref().is_some_and(|e| !e.is_empty()),
        200.0,
        50.0,
    ));

    factors
}

fn weighted_average(factors: &[Factor]) -> f64 {
    let (sum, weight_sum) = factors.iter().fold((0.0, 0.0), |(sum, weights), factor| {
        (sum + factor.value * factor.weight, weights + factor.weight)
    });
    sum / weight_sum
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn signal_from(value: Value) -> Signal {
        serde_json::from_value(value).unwrap()
    }

    fn ca_context() -> Value {
        json!({
            "type": "ca",
            "status": { "complianceStatus": "fail" },
            "severity": {
                "type": "ccss",
                "value": 9.2,
                "cvss": {
                    "version": "3.0",
                    "baseScore": 9.2,
                    "vector": "AV:A/AC:H/PR:L/UI:R/S:C/C:L/I:L/A:L",
                    "temporalScore": 9.2,
                    "environmentalScore": 9.2
                }
            },
            "standardsMapping": [],
            "degreeOfImpact": 0
        })
    }

    fn machine_entity() -> Value {
        json!({
            "type": "machine",
            "name": "Pay-As-You-Go",
            "entityAttributes": {
                "ipAddresses": [{ "name": "" }],
                "type": "Azure - Subscriptions",
                "criticality": "medium",
                "confidentialityRequirement": "medium",
                "integrityRequirement": "medium",
                "availabilityRequirement": "medium"
            }
        })
    }

    fn base_signal(entity: Option<Value>, context: Value) -> Signal {
        let mut value = json!({
            "version": "1.0",
            "id": "09d34300-4c54-4e5e-9050-fff5d912cb19",
            "name": "External accounts with owner permissions should be removed",
            "source": { "name": "uat.safescore.io", "nextSubmissionIntervalInMins": 1440 },
            "type": "default",
            "createdAt": "2022-07-22T02:15:05.000Z",
            "confidence": 100,
            "securityContext": context
        });
        if let Some(entity) = entity {
            value["entity"] = entity;
        }
        signal_from(value)
    }

    #[test]
    fn test_poor_signal_scores_below_33() {
        let signal = base_signal(None, ca_context());
        let quality = quality_of_signal(&signal);
        assert!((quality - 28.0).abs() < 1e-9);
        assert!(quality < 33.0);
    }

    #[test]
    fn test_average_signal_scores_between_33_and_66() {
        let signal = base_signal(Some(machine_entity()), ca_context());
        let quality = quality_of_signal(&signal);
        assert!((quality - 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_good_signal_scores_above_66() {
        let mut context = ca_context();
        context["attackPattern"] = json!([{
            "name": "Password Brute Forcing",
            "sourceName": "capec",
            "sourceId": "CAPEC-49",
            "mapping": { "techniqueName": "Brute Force", "techniqueId": "T1110" }
        }]);
        let signal = base_signal(Some(machine_entity()), context);
        let quality = quality_of_signal(&signal);
        assert!(quality > 66.0);
        assert!((quality - 1200.0 / 17.5).abs() < 1e-9);
    }

    #[test]
    fn test_signal_without_contexts_scores_top_level_factors_only() {
        // No securityContext and no securityContexts: nothing pools in,
        // so the mean is over the eight top-level factors alone.
        let signal = signal_from(json!({
            "version": "1.0",
            "id": "09d34300-4c54-4e5e-9050-fff5d912cb19",
            "name": "n",
            "source": { "name": "s" },
            "createdAt": "2022-07-22T02:15:05.000Z"
        }));
        let quality = quality_of_signal(&signal);
        // (60 + 50 + 10 + 30 - 300 + 10 + 30 + 3 * 30) / 10
        assert!((quality - (-2.0)).abs() < 1e-9);
        assert!(quality < 0.0);
    }

    #[test]
    fn test_missing_entity_lowers_the_score() {
        let with_entity = base_signal(Some(machine_entity()), ca_context());
        let without_entity = base_signal(None, ca_context());
        assert!(quality_of_signal(&without_entity) < quality_of_signal(&with_entity));
    }

    #[test]
    fn test_scoring_is_idempotent() {
        let signal = base_signal(Some(machine_entity()), ca_context());
        assert_eq!(
            quality_of_signal(&signal).to_bits(),
            quality_of_signal(&signal).to_bits()
        );
    }

    fn enriched_context() -> Value {
        json!({
            "type": "edr",
            "status": { "complianceStatus": "fail" },
            "severity": { "type": "cvss", "value": 9.8 },
            "standardsMapping": [{ "name": "cisBenchmark", "value": "9.14" }],
            "attackPattern": [{
                "name": "Brute Force",
                "sourceName": "capec",
                "mapping": { "techniqueName": "Brute Force", "techniqueId": "T1110" }
            }],
            "degreeOfImpact": 6,
            "controlType": "detection",
            "effect": ["dataExposure"]
        })
    }

    #[test]
    fn test_pooled_contexts_can_exceed_100() {
        // Both `securityContext` and every `securityContexts` element
        // contribute a full factor set to one flat average.
        let mut value = json!({
            "version": "1.0",
            "id": "x",
            "name": "n",
            "source": { "name": "s" },
            "type": "default",
            "createdAt": "2022-07-22T02:15:05.000Z",
            "entity": machine_entity(),
            "securityContext": enriched_context()
        });

        let single = quality_of_signal(&signal_from(value.clone()));
        assert!((single - 1640.0 / 18.0).abs() < 1e-9);

        value["securityContexts"] = json!([enriched_context()]);
        let pooled = quality_of_signal(&signal_from(value));
        assert!((pooled - 2690.0 / 26.0).abs() < 1e-9);
        assert!(pooled > single);
        assert!(pooled > 100.0);
    }

    #[test]
    fn test_empty_enrichment_counts_as_absent() {
        let mut context = ca_context();
        context["effect"] = json!([]);
        context["attackPattern"] = json!([{
            "name": "unmapped",
            "sourceName": "capec"
        }]);
        let signal = base_signal(None, context);
        // Same as the poor signal: empty effect list and an unmapped first
        // attack pattern both take the absent branch.
        assert!((quality_of_signal(&signal) - 28.0).abs() < 1e-9);
    }
}
