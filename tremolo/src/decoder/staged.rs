//! Staged decoding with independent classifiers.
//!
//! A trigger classifier labels each token in isolation; when its output is
//! argument-bearing, an argument classifier labels each (trigger,
//! candidate) pair in isolation. No search is performed and no global
//! features apply, because nothing is known about the rest of the sentence
//! when a decision is made.

use std::sync::Arc;

use crate::alphabet::{Alphabets, NULL_LABEL_ID};
use crate::assignment::{SentenceAssignment, is_argument_bearing};
use crate::common::NULL_ROLE_LABEL;
use crate::constraints::TypeConstraints;
use crate::decoder::config::DecoderConfig;
use crate::feature_vector::FeatureVector;
use crate::instance::SentenceInstance;

/// A trained classifier mapping a sparse feature vector to a label.
///
/// Implementations must be deterministic: score ties must be broken by a
/// fixed rule (for example first label in training order), never by
/// iteration order or failure.
pub trait Classifier: Send + Sync {
    /// Returns the predicted label for `features`, or `None` when the
    /// classifier abstains.
    fn classify(&self, features: &FeatureVector) -> Option<String>;
}

pub(crate) struct StagedDecoder {
    trigger: Arc<dyn Classifier>,
    argument: Arc<dyn Classifier>,
    alphabets: Arc<Alphabets>,
    constraints: Arc<TypeConstraints>,
    config: DecoderConfig,
}

impl StagedDecoder {
    pub(crate) fn new(
        trigger: Arc<dyn Classifier>,
        argument: Arc<dyn Classifier>,
        alphabets: Arc<Alphabets>,
        constraints: Arc<TypeConstraints>,
        config: DecoderConfig,
    ) -> Self {
        Self {
            trigger,
            argument,
            alphabets,
            constraints,
            config,
        }
    }

    pub(crate) fn decode(&self, inst: &SentenceInstance) -> SentenceAssignment {
        let mut assn = SentenceAssignment::new(
            Arc::clone(&self.alphabets),
            Arc::clone(&self.constraints),
            self.config,
        );
        for i in 0..inst.len() {
            assn.increment_state();

            if inst.token(i).is_possible_trigger() {
                let features = unit_vector(inst.node_text_features(i));
                if let Some(label) = self.trigger.classify(&features) {
                    // An unknown label under a frozen alphabet keeps the
                    // null label.
                    assn.set_current_node_label(&label, self.config.grow_alphabets);
                }
            }

            if !is_argument_bearing(&assn.current_node_label()) {
                continue;
            }
            for k in 0..inst.candidates().len() {
                let features = unit_vector(inst.edge_text_features(i, k));
                let role = self
                    .argument
                    .classify(&features)
                    .unwrap_or_else(|| NULL_ROLE_LABEL.to_string());
                if !assn.set_current_edge_label(k, &role, self.config.grow_alphabets) {
                    assn.set_current_edge_label_id(k, NULL_LABEL_ID);
                }
            }
        }
        assn
    }
}

fn unit_vector(features: &[String]) -> FeatureVector {
    let mut fv = FeatureVector::with_capacity(features.len());
    for feature in features {
        fv.add(feature, 1.0);
    }
    fv
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{attack_constraints, five_token_instance};

    /// Labels by the first feature found in its table, abstaining
    /// otherwise.
    struct TableClassifier {
        table: Vec<(&'static str, &'static str)>,
    }

    impl Classifier for TableClassifier {
        fn classify(&self, features: &FeatureVector) -> Option<String> {
            self.table
                .iter()
                .find(|(feature, _)| features.get(feature).is_some())
                .map(|(_, label)| label.to_string())
        }
    }

    fn decoder_with(
        trigger: TableClassifier,
        argument: TableClassifier,
    ) -> (StagedDecoder, Arc<Alphabets>) {
        let alphabets = Arc::new(Alphabets::new());
        alphabets.node_labels.lookup_index("Attack", true);
        alphabets.edge_labels.lookup_index("Agent", true);
        alphabets.edge_labels.lookup_index("Victim", true);
        let decoder = StagedDecoder::new(
            Arc::new(trigger),
            Arc::new(argument),
            Arc::clone(&alphabets),
            Arc::new(attack_constraints()),
            DecoderConfig::default(),
        );
        (decoder, alphabets)
    }

    #[test]
    fn test_trigger_then_arguments() {
        let inst = five_token_instance();
        let (decoder, _) = decoder_with(
            TableClassifier {
                table: vec![("w=attacked", "Attack")],
            },
            TableClassifier {
                table: vec![("path=nsubj", "Agent"), ("path=dobj", "Victim")],
            },
        );
        let assn = decoder.decode(&inst);
        let events = assn.to_events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].trigger_index, 2);
        assert_eq!(events[0].event_type, "Attack");
        assert_eq!(events[0].arguments.len(), 2);
        assert_eq!(events[0].arguments[0].role, "Agent");
        assert_eq!(events[0].arguments[1].role, "Victim");
    }

    #[test]
    fn test_null_trigger_skips_arguments() {
        let inst = five_token_instance();
        let (decoder, _) = decoder_with(
            TableClassifier { table: vec![] },
            TableClassifier {
                table: vec![("path=nsubj", "Agent")],
            },
        );
        let assn = decoder.decode(&inst);
        assert!(assn.to_events().is_empty());
        assert!(assn.edge_labels_at(2).is_none());
    }

    #[test]
    fn test_unknown_labels_fall_back_to_null() {
        let inst = five_token_instance();
        let (decoder, alphabets) = decoder_with(
            TableClassifier {
                table: vec![("w=attacked", "Attack")],
            },
            TableClassifier {
                table: vec![("path=nsubj", "Instrument")],
            },
        );
        alphabets.freeze();
        let assn = decoder.decode(&inst);
        let events = assn.to_events();
        assert_eq!(events.len(), 1);
        // "Instrument" was never trained; the pair keeps the null role.
        assert!(events[0].arguments.iter().all(|a| a.candidate_index != 0));
    }
}
