//! Structured perceptron training.
//!
//! The trainer builds gold assignments with the same feature templates the
//! decoder uses, so training and decoding score functions are identical.
//! Each sentence is decoded with the gold assignment tracked in the beam;
//! when the gold prefix falls out (or the final prediction is wrong), the
//! weights are updated toward the gold features and away from the
//! predicted ones over the aligned prefix.
//!
//! # Examples
//!
//! ```
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use tremolo::constraints::TypeConstraints;
//! use tremolo::trainer::{Corpus, Trainer};
//!
//! let corpus = "\
//! T\tsoldiers\t0\tw=soldiers,pos=NNS
//! T\tattacked\t1\tw=attacked,pos=VBD
//! C\tPER\tsoldiers
//! F\t1\t0\tpath=nsubj,type=PER
//! E\t1\tAttack\t0:Agent
//! EOS
//! ";
//! let corpus = Corpus::from_reader(corpus.as_bytes())?;
//!
//! let mut constraints = TypeConstraints::new();
//! constraints.add_role("Attack", "Agent");
//!
//! let model = Trainer::new(constraints).max_iter(10).train(&corpus)?;
//! assert!(model.weights().len() > 0);
//! # Ok(())
//! # }
//! ```

mod corpus;

use std::sync::Arc;

pub use crate::trainer::corpus::{Corpus, Example};

use crate::alphabet::Alphabets;
use crate::assignment::SentenceAssignment;
use crate::constraints::TypeConstraints;
use crate::decoder::config::DecoderConfig;
use crate::decoder::joint;
use crate::errors::Result;
use crate::feature_vector::FeatureVector;
use crate::model::Model;

/// Trainer of the joint linear model.
pub struct Trainer {
    constraints: TypeConstraints,
    config: DecoderConfig,
    max_iter: u64,
    averaged: bool,
}

impl Trainer {
    /// Creates a new trainer over the given ontology.
    pub fn new(constraints: TypeConstraints) -> Self {
        Self {
            constraints,
            config: DecoderConfig::default(),
            max_iter: 20,
            averaged: false,
        }
    }

    /// Changes the decoder configuration used during training. The same
    /// configuration should be passed to [`Decoder::joint`] afterwards.
    ///
    /// [`Decoder::joint`]: crate::Decoder::joint
    pub fn decoder_config(mut self, config: DecoderConfig) -> Self {
        self.config = config;
        self
    }

    /// Changes the maximum number of epochs.
    ///
    /// The default value is 20. Training stops earlier once an epoch ends
    /// with no update.
    ///
    /// # Panics
    ///
    /// It will panic when `n` is zero.
    pub fn max_iter(mut self, n: u64) -> Self {
        assert!(n >= 1);
        self.max_iter = n;
        self
    }

    /// Enables per-epoch weight averaging, which often decodes better than
    /// the last weight vector.
    pub fn averaged(mut self, yes: bool) -> Self {
        self.averaged = yes;
        self
    }

    /// Runs training and returns the trained model.
    ///
    /// # Errors
    ///
    /// [`TremoloError`](crate::errors::TremoloError) is returned when the
    /// decoder configuration is invalid.
    pub fn train(self, corpus: &Corpus) -> Result<Model> {
        let mut config = self.config;
        config.validate()?;
        config.grow_alphabets = true;

        let alphabets = Arc::new(Alphabets::new());
        let constraints = Arc::new(self.constraints);

        let golds: Vec<SentenceAssignment> = corpus
            .examples()
            .iter()
            .map(|example| {
                SentenceAssignment::from_gold(
                    example.instance(),
                    Arc::clone(&alphabets),
                    Arc::clone(&constraints),
                    config,
                    true,
                )
            })
            .collect();

        let mut weights = FeatureVector::new();
        let mut averaged_sum = FeatureVector::new();
        let mut epochs_run = 0u64;

        for epoch in 1..=self.max_iter {
            let mut num_updates = 0usize;
            for (example, gold) in corpus.examples().iter().zip(&golds) {
                let outcome = joint::beam_search(
                    example.instance(),
                    Some(gold),
                    &weights,
                    &alphabets,
                    &constraints,
                    config,
                );
                let predicted = outcome.predicted;
                let Some(stop) = predicted.state() else {
                    continue;
                };
                if !outcome.early_stopped && predicted.matches(gold) {
                    continue;
                }
                let gold_fv = gold.combined_feature_vector(stop);
                let predicted_fv = predicted.combined_feature_vector(stop);
                weights.add_delta(&gold_fv, &predicted_fv, 1.0);
                num_updates += 1;
            }
            epochs_run = epoch;
            if self.averaged {
                averaged_sum.plus_equals(&weights, 1.0);
            }
            log::info!(
                "epoch {epoch}: {num_updates} updates over {} sentences, {} features",
                corpus.len(),
                weights.len(),
            );
            if num_updates == 0 {
                break;
            }
        }

        let weights = if self.averaged && epochs_run > 0 {
            averaged_sum.multiply(1.0 / epochs_run as f64);
            averaged_sum
        } else {
            weights
        };
        Ok(Model::new(weights, alphabets, constraints))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Decoder;
    use crate::test_utils::{attack_constraints, toy_corpus};

    #[test]
    fn test_training_recovers_gold_events() {
        let corpus = Corpus::from_reader(toy_corpus().as_bytes()).unwrap();
        let config = DecoderConfig::default();
        let model = Trainer::new(attack_constraints())
            .decoder_config(config)
            .max_iter(30)
            .train(&corpus)
            .unwrap();
        let decoder = Decoder::joint(model, config).unwrap();
        let mut worker = decoder.new_worker();
        for example in corpus.examples() {
            worker.decode(example.instance());
            let gold: Vec<_> = example
                .instance()
                .gold_events()
                .iter()
                .map(crate::event::Event::from)
                .collect();
            assert_eq!(worker.events(), gold.as_slice());
        }
    }

    #[test]
    fn test_averaged_training_also_recovers() {
        let corpus = Corpus::from_reader(toy_corpus().as_bytes()).unwrap();
        let config = DecoderConfig::default();
        let model = Trainer::new(attack_constraints())
            .decoder_config(config)
            .max_iter(30)
            .averaged(true)
            .train(&corpus)
            .unwrap();
        let decoder = Decoder::joint(model, config).unwrap();
        let mut worker = decoder.new_worker();
        worker.decode(corpus.examples()[0].instance());
        assert_eq!(worker.num_events(), 1);
        assert_eq!(worker.event(0).event_type, "Attack");
    }
}
