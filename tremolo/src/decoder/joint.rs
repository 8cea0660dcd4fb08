//! Joint beam-search decoding.
//!
//! One linear model scores trigger and argument decisions together. At
//! each token the beam is expanded over trigger labels, then over role
//! labels for one candidate at a time, keeping the top-K hypotheses by
//! cumulative score after every expansion.

use std::cmp::Ordering;
use std::sync::Arc;

use crate::alphabet::{Alphabets, NULL_LABEL_ID};
use crate::assignment::{SentenceAssignment, is_argument_bearing};
use crate::constraints::TypeConstraints;
use crate::decoder::config::DecoderConfig;
use crate::feature_vector::FeatureVector;
use crate::instance::SentenceInstance;
use crate::model::Model;

pub(crate) struct JointDecoder {
    model: Arc<Model>,
    config: DecoderConfig,
}

impl JointDecoder {
    pub(crate) fn new(model: Arc<Model>, config: DecoderConfig) -> Self {
        Self { model, config }
    }

    pub(crate) fn decode(&self, inst: &SentenceInstance) -> SentenceAssignment {
        beam_search(
            inst,
            None,
            self.model.weights(),
            self.model.alphabets(),
            self.model.constraints(),
            self.config,
        )
        .predicted
    }
}

pub(crate) struct SearchOutcome {
    pub(crate) predicted: SentenceAssignment,
    /// True when the gold assignment fell out of the beam before the
    /// sentence was fully labeled, in which case `predicted` is the best
    /// hypothesis at the state where it fell out.
    pub(crate) early_stopped: bool,
}

/// Runs the beam search over `inst`. When `gold` is given, the search
/// stops at the first completed token whose beam no longer contains the
/// gold prefix (the early-update condition of perceptron training).
pub(crate) fn beam_search(
    inst: &SentenceInstance,
    gold: Option<&SentenceAssignment>,
    weights: &FeatureVector,
    alphabets: &Arc<Alphabets>,
    constraints: &Arc<TypeConstraints>,
    config: DecoderConfig,
) -> SearchOutcome {
    let add = config.grow_alphabets;
    let use_unknown = config.score_unknown_features;
    // The null label is always enumerable, even over an unseeded table.
    let num_labels = alphabets.node_labels.len().max(1);

    let mut beam = vec![SentenceAssignment::new(
        Arc::clone(alphabets),
        Arc::clone(constraints),
        config,
    )];

    for i in 0..inst.len() {
        // Trigger expansion.
        let mut expanded = Vec::with_capacity(beam.len() * num_labels);
        for hyp in &beam {
            for label_id in 0..num_labels {
                let label_id = label_id as u32;
                if label_id != NULL_LABEL_ID && !inst.token(i).is_possible_trigger() {
                    continue;
                }
                let mut next = hyp.clone();
                next.increment_state();
                next.set_current_node_label_id(label_id);
                next.make_node_features(inst, i, add, use_unknown);
                if config.use_global_features {
                    next.make_global_features_trigger(inst, i, add, use_unknown);
                }
                next.update_score_for_new_state(weights);
                expanded.push(next);
            }
        }
        beam = prune(expanded, config.beam_width, i, None);

        // Argument expansion, one candidate at a time.
        for (k, candidate) in inst.candidates().iter().enumerate() {
            let mut expanded = Vec::with_capacity(beam.len());
            for hyp in beam {
                let label = hyp.label_at_token(i);
                if !is_argument_bearing(&label)
                    || !constraints.is_entity_compatible(&label, candidate.mention_type())
                {
                    // Not an argument slot for this hypothesis.
                    expanded.push(hyp);
                    continue;
                }
                for role_id in role_ids(&label, alphabets, constraints, add) {
                    let mut next = hyp.clone();
                    next.set_current_edge_label_id(k, role_id);
                    next.make_edge_local_feature(inst, i, k, add, use_unknown);
                    if config.use_global_features {
                        next.make_global_features_progress(inst, i, k, add, use_unknown);
                    }
                    next.update_score_for_new_state(weights);
                    expanded.push(next);
                }
            }
            beam = prune(expanded, config.beam_width, i, Some(k));
        }

        if config.use_global_features {
            for hyp in &mut beam {
                hyp.make_global_features_complete(inst, i, add, use_unknown);
                hyp.update_score_for_new_state(weights);
            }
            sort_by_score(&mut beam);
        }

        if let Some(gold) = gold
            && !beam.iter().any(|hyp| gold.matches_up_to(hyp, i))
        {
            log::debug!("gold fell out of the beam at token {i}");
            return SearchOutcome {
                predicted: beam.remove(0),
                early_stopped: true,
            };
        }
    }

    SearchOutcome {
        predicted: beam.remove(0),
        early_stopped: false,
    }
}

/// Role label ids tried for one (event type, candidate) pair: the null
/// role first, then the ontology's roles for the event type, or every
/// known role label when the ontology has none registered.
fn role_ids(
    event_label: &str,
    alphabets: &Alphabets,
    constraints: &TypeConstraints,
    add_if_absent: bool,
) -> Vec<u32> {
    let mut ids = vec![NULL_LABEL_ID];
    let roles = constraints.roles_for(event_label);
    if roles.is_empty() {
        let num_roles = alphabets.edge_labels.len() as u32;
        ids.extend((0..num_roles).filter(|&id| id != NULL_LABEL_ID));
    } else {
        for role in roles {
            if let Some(id) = alphabets.edge_labels.lookup_index(role, add_if_absent)
                && id != NULL_LABEL_ID
            {
                ids.push(id);
            }
        }
    }
    ids
}

fn sort_by_score(beam: &mut [SentenceAssignment]) {
    // Stable, so equal scores keep first-encountered order.
    beam.sort_by(|a, b| {
        b.score()
            .partial_cmp(&a.score())
            .unwrap_or(Ordering::Equal)
    });
}

/// Ranks hypotheses by score and keeps the best `width`, dropping any
/// hypothesis whose labels up to (`step`, `arg_bound`) duplicate an
/// already-kept one.
fn prune(
    mut hypotheses: Vec<SentenceAssignment>,
    width: usize,
    step: usize,
    arg_bound: Option<usize>,
) -> Vec<SentenceAssignment> {
    sort_by_score(&mut hypotheses);
    let mut kept: Vec<SentenceAssignment> = Vec::with_capacity(width);
    for hyp in hypotheses {
        if kept.len() == width {
            break;
        }
        if kept
            .iter()
            .any(|other| other.matches_up_to_args(&hyp, step, arg_bound))
        {
            continue;
        }
        kept.push(hyp);
    }
    kept
}
