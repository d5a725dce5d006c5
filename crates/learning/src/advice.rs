//! Advice composition with an anti-hallucination gate: a response can only
//! cite signatures actually loaded for the requesting user, and must either
//! carry enough personalized references or say plainly that it can't.

use serde::{Deserialize, Serialize};

use crate::model::MistakeSignature;

/// Minimum number of personalized references a response needs before it's
/// allowed to claim personalization at all.
const MIN_PERSONALIZED_REFERENCES: usize = 2;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalizedReference {
    pub signature_id: String,
    pub title: String,
    pub occurrence_count: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEvidence {
    pub personalized_reference_count: usize,
    pub insufficient_history: bool,
    pub insufficient_reason: Option<String>,
    pub sources: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdviceResponse {
    pub response: String,
    pub personalized_references: Vec<PersonalizedReference>,
    pub history_evidence: HistoryEvidence,
}

/// Compose advice strictly from `loaded` signatures. Never invents a
/// reference the caller didn't already load — if there aren't enough real
/// ones, the response says so via `insufficient_history` instead of padding
/// out with generic advice dressed up as personalized.
pub fn compose(loaded: &[MistakeSignature], games_recorded: u32) -> AdviceResponse {
    let references: Vec<PersonalizedReference> = loaded
        .iter()
        .map(|s| PersonalizedReference {
            signature_id: s.signature_id.to_string(),
            title: s.title.clone(),
            occurrence_count: s.occurrence_count,
        })
        .collect();

    if references.len() < MIN_PERSONALIZED_REFERENCES {
        let reason = if games_recorded < 2 {
            "fewer than 2 games recorded".to_string()
        } else {
            "no confirmed patterns yet".to_string()
        };
        return AdviceResponse {
            response: generic_response(),
            personalized_references: references.clone(),
            history_evidence: HistoryEvidence {
                personalized_reference_count: references.len(),
                insufficient_history: true,
                insufficient_reason: Some(reason),
                sources: references.iter().map(|r| r.signature_id.clone()).collect(),
            },
        };
    }

    let response = personalized_response(loaded);
    let sources = references.iter().map(|r| r.signature_id.clone()).collect();
    AdviceResponse {
        response,
        personalized_references: references,
        history_evidence: HistoryEvidence {
            personalized_reference_count: loaded.len(),
            insufficient_history: false,
            insufficient_reason: None,
            sources,
        },
    }
}

/// An `insufficientHistory` envelope for a specific reason, without any
/// loaded signatures at all — used when the caller couldn't load signatures
/// in the first place (e.g. the store is unavailable) rather than loaded
/// fewer than the personalization bar requires.
pub fn insufficient_history(reason: impl Into<String>) -> AdviceResponse {
    AdviceResponse {
        response: generic_response(),
        personalized_references: Vec::new(),
        history_evidence: HistoryEvidence {
            personalized_reference_count: 0,
            insufficient_history: true,
            insufficient_reason: Some(reason.into()),
            sources: Vec::new(),
        },
    }
}

fn generic_response() -> String {
    "Keep playing — once a few more games are in, advice here will start \
     pointing at your specific patterns instead of general principles."
        .to_string()
}

fn personalized_response(loaded: &[MistakeSignature]) -> String {
    let mut lines = Vec::new();
    for signature in loaded {
        lines.push(format!(
            "{} has come up {} time(s); {}",
            signature.title, signature.occurrence_count, signature.description
        ));
    }
    lines.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;
    use wall_e_types::{SignatureId, UserId};

    fn signature(title: &str) -> MistakeSignature {
        MistakeSignature::new(
            SignatureId::new(),
            UserId::new(),
            crate::model::MistakeCategory::Tactical,
            title,
            "description",
            json!({}),
            Utc::now(),
        )
    }

    #[test]
    fn fewer_than_two_signatures_triggers_insufficient_history() {
        let loaded = vec![signature("hanging queen")];
        let advice = compose(&loaded, 1);
        assert!(advice.history_evidence.insufficient_history);
        assert_eq!(
            advice.history_evidence.insufficient_reason.as_deref(),
            Some("fewer than 2 games recorded")
        );
    }

    #[test]
    fn two_or_more_signatures_is_sufficient() {
        let loaded = vec![signature("hanging queen"), signature("missed fork")];
        let advice = compose(&loaded, 5);
        assert!(!advice.history_evidence.insufficient_history);
        assert_eq!(advice.history_evidence.personalized_reference_count, 2);
        assert!(advice.response.contains("hanging queen"));
    }

    #[test]
    fn insufficient_history_carries_the_given_reason_and_cites_nothing() {
        let advice = insufficient_history("persistence_unavailable");
        assert!(advice.history_evidence.insufficient_history);
        assert_eq!(advice.history_evidence.personalized_reference_count, 0);
        assert_eq!(
            advice.history_evidence.insufficient_reason.as_deref(),
            Some("persistence_unavailable")
        );
        assert!(advice.personalized_references.is_empty());
    }

    #[test]
    fn response_never_cites_a_signature_outside_the_loaded_set() {
        let loaded = vec![signature("hanging queen"), signature("missed fork")];
        let advice = compose(&loaded, 5);
        for reference in &advice.personalized_references {
            assert!(loaded.iter().any(|s| s.signature_id.to_string() == reference.signature_id));
        }
    }
}
