//! Decoders turning annotated sentences into event-structure assignments.

pub mod config;
pub(crate) mod joint;
pub mod staged;
pub mod worker;

use std::sync::Arc;

use crate::alphabet::Alphabets;
use crate::assignment::SentenceAssignment;
use crate::constraints::TypeConstraints;
use crate::decoder::config::DecoderConfig;
use crate::decoder::joint::JointDecoder;
use crate::decoder::staged::{Classifier, StagedDecoder};
use crate::decoder::worker::Worker;
use crate::errors::Result;
use crate::instance::SentenceInstance;
use crate::model::Model;

enum Strategy {
    Joint(JointDecoder),
    Staged(StagedDecoder),
}

/// Decoder over annotated sentence instances.
///
/// Two disciplines are supported, selected at construction: a joint
/// beam-search decoder over one linear model ([`Decoder::joint`]), and a
/// staged decoder over two independent classifiers ([`Decoder::staged`]).
/// Cloning a decoder is cheap and shares the underlying model.
#[derive(Clone)]
pub struct Decoder {
    strategy: Arc<Strategy>,
}

impl Decoder {
    /// Creates a joint beam-search decoder over a trained model.
    ///
    /// Unless the configuration allows the vocabulary to grow, the model's
    /// symbol tables are frozen here so concurrent workers can share them.
    ///
    /// # Errors
    ///
    /// [`TremoloError`](crate::errors::TremoloError) is returned when the
    /// configuration is invalid.
    pub fn joint(model: Model, config: DecoderConfig) -> Result<Self> {
        config.validate()?;
        if !config.grow_alphabets {
            model.freeze();
        }
        Ok(Self {
            strategy: Arc::new(Strategy::Joint(JointDecoder::new(Arc::new(model), config))),
        })
    }

    /// Creates a staged decoder from an independent trigger classifier and
    /// argument classifier.
    ///
    /// The symbol tables must contain every label the classifiers emit;
    /// unknown labels fall back to the null label at decode time.
    ///
    /// # Errors
    ///
    /// [`TremoloError`](crate::errors::TremoloError) is returned when the
    /// configuration is invalid.
    pub fn staged(
        trigger: Arc<dyn Classifier>,
        argument: Arc<dyn Classifier>,
        alphabets: Arc<Alphabets>,
        constraints: Arc<TypeConstraints>,
        config: DecoderConfig,
    ) -> Result<Self> {
        config.validate()?;
        if !config.grow_alphabets {
            alphabets.freeze();
        }
        Ok(Self {
            strategy: Arc::new(Strategy::Staged(StagedDecoder::new(
                trigger,
                argument,
                alphabets,
                constraints,
                config,
            ))),
        })
    }

    /// Decodes one sentence into a full assignment.
    pub fn decode(&self, inst: &SentenceInstance) -> SentenceAssignment {
        match &*self.strategy {
            Strategy::Joint(joint) => joint.decode(inst),
            Strategy::Staged(staged) => staged.decode(inst),
        }
    }

    /// Creates a new worker.
    pub fn new_worker(&self) -> Worker {
        Worker::new(self.clone())
    }
}
