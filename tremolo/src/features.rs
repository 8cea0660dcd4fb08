//! Global feature templates computed from the shape of a partial
//! assignment, as opposed to token-local text.

use crate::assignment::{SentenceAssignment, is_argument_bearing};
use crate::common::NULL_ROLE_LABEL;
use crate::instance::SentenceInstance;

fn sorted_candidates(assn: &SentenceAssignment, index: usize) -> Vec<usize> {
    let mut candidates: Vec<usize> = assn
        .edge_labels_at(index)
        .map(|map| map.keys().copied().collect())
        .unwrap_or_default();
    candidates.sort_unstable();
    candidates
}

/// Features fired at the trigger-classification step of `index`: pairings
/// of the current trigger label with every earlier one, and a duplicate
/// marker when the same label already occurred.
pub(crate) fn trigger_features(
    _inst: &SentenceInstance,
    index: usize,
    assn: &SentenceAssignment,
) -> Vec<String> {
    let cur = assn.label_at_token(index);
    if !is_argument_bearing(&cur) {
        return vec![];
    }
    let mut feats = vec![];
    let mut duplicated = false;
    for j in 0..index {
        let other = assn.label_at_token(j);
        if !is_argument_bearing(&other) {
            continue;
        }
        feats.push(format!("TriggerPair:{other}_{cur}"));
        if other == cur && !duplicated {
            feats.push(format!("DupTrigger:{cur}"));
            duplicated = true;
        }
    }
    feats
}

/// Node-level features fired as argument search reaches candidate `k` of
/// `index`: a marker when the candidate's role duplicates a role already
/// assigned to an earlier candidate of the same trigger.
pub(crate) fn node_progress_features(
    _inst: &SentenceInstance,
    index: usize,
    k: usize,
    assn: &SentenceAssignment,
) -> Vec<String> {
    let Some(role) = assn.edge_label_at(index, k) else {
        return vec![];
    };
    if role == NULL_ROLE_LABEL {
        return vec![];
    }
    let cur = assn.label_at_token(index);
    let mut feats = vec![];
    for earlier in sorted_candidates(assn, index) {
        if earlier >= k {
            break;
        }
        if assn.edge_label_at(index, earlier).as_deref() == Some(role.as_str()) {
            feats.push(format!("DupRole:{cur}:{role}"));
            break;
        }
    }
    feats
}

/// Sentence-level features fired as argument search reaches candidate `k`
/// of `index`: markers for the candidate already filling a role under an
/// earlier trigger in the sentence.
pub(crate) fn sent_progress_features(
    _inst: &SentenceInstance,
    index: usize,
    k: usize,
    assn: &SentenceAssignment,
) -> Vec<String> {
    let Some(role) = assn.edge_label_at(index, k) else {
        return vec![];
    };
    if role == NULL_ROLE_LABEL {
        return vec![];
    }
    let cur = assn.label_at_token(index);
    let mut feats = vec![];
    for j in 0..index {
        let other = assn.label_at_token(j);
        if !is_argument_bearing(&other) {
            continue;
        }
        if let Some(other_role) = assn.edge_label_at(j, k)
            && other_role != NULL_ROLE_LABEL
        {
            feats.push(format!("SharedArg:{cur}:{role}_{other}:{other_role}"));
        }
    }
    feats
}

/// Features fired once argument search of `index` is complete: the sorted
/// multiset of assigned roles and the argument count of the trigger.
pub(crate) fn complete_features(
    _inst: &SentenceInstance,
    index: usize,
    assn: &SentenceAssignment,
) -> Vec<String> {
    let cur = assn.label_at_token(index);
    if !is_argument_bearing(&cur) {
        return vec![];
    }
    let mut roles: Vec<String> = sorted_candidates(assn, index)
        .into_iter()
        .filter_map(|k| assn.edge_label_at(index, k))
        .filter(|role| role != NULL_ROLE_LABEL)
        .collect();
    roles.sort_unstable();
    vec![
        format!("RoleSet:{cur}:{}", roles.join("+")),
        format!("NumArgs:{cur}:{}", roles.len()),
    ]
}
