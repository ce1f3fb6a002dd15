use serde::Serialize;

use crate::{PermissionRequirement, RoleSet};

/// Evaluate a permission requirement against the tags a user holds.
///
/// - No IO
/// - No panics
/// - Open (empty) requirements always pass
/// - Otherwise at least one required tag must be held
pub fn evaluate(required: &PermissionRequirement, held: &RoleSet) -> bool {
    required.is_open() || held.intersects(required.iter().map(|p| p.as_str()))
}

// ─────────────────────────────────────────────────────────────────────────────
// Evaluation Explanation
// ─────────────────────────────────────────────────────────────────────────────

/// Detailed explanation of an evaluation, for debug logs and admin tooling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EvaluationExplanation {
    pub granted: bool,

    /// Human-readable reason for the decision.
    pub reason: String,

    /// Required tags, sorted.
    pub required: Vec<String>,

    /// Required tags the user holds. Empty when denied or when the
    /// requirement is open.
    pub matched: Vec<String>,

    /// Tags the user holds, sorted.
    pub held: Vec<String>,
}

/// Explain why [`evaluate`] returns what it does.
pub fn explain_evaluation(required: &PermissionRequirement, held: &RoleSet) -> EvaluationExplanation {
    let required_list: Vec<String> = required.iter().map(|p| p.as_str().to_string()).collect();
    let held_list: Vec<String> = held.iter().map(|r| r.as_str().to_string()).collect();

    if required.is_open() {
        return EvaluationExplanation {
            granted: true,
            reason: "open requirement".to_string(),
            required: required_list,
            matched: Vec::new(),
            held: held_list,
        };
    }

    let matched: Vec<String> = required_list
        .iter()
        .filter(|p| held.contains(p.as_str()))
        .cloned()
        .collect();

    let granted = !matched.is_empty();
    let reason = if granted {
        format!("holds {:?}", matched)
    } else {
        format!("requires one of {:?}, holds {:?}", required_list, held_list)
    };

    EvaluationExplanation {
        granted,
        reason,
        required: required_list,
        matched,
        held: held_list,
    }
}
