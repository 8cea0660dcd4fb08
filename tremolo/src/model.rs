//! Trained model shared by decoding workers.

use std::sync::Arc;

use crate::alphabet::Alphabets;
use crate::constraints::TypeConstraints;
use crate::feature_vector::FeatureVector;

/// A trained linear model: the global weight vector together with the
/// symbol tables and ontology it was trained with.
///
/// The model is read-only during decoding; hypothesis branching never
/// mutates it.
pub struct Model {
    weights: FeatureVector,
    alphabets: Arc<Alphabets>,
    constraints: Arc<TypeConstraints>,
}

impl Model {
    /// Bundles trained weights with their symbol tables and ontology.
    pub fn new(
        weights: FeatureVector,
        alphabets: Arc<Alphabets>,
        constraints: Arc<TypeConstraints>,
    ) -> Self {
        Self {
            weights,
            alphabets,
            constraints,
        }
    }

    /// Gets the global weight vector.
    pub fn weights(&self) -> &FeatureVector {
        &self.weights
    }

    /// Gets the shared symbol tables.
    pub fn alphabets(&self) -> &Arc<Alphabets> {
        &self.alphabets
    }

    /// Gets the shared ontology.
    pub fn constraints(&self) -> &Arc<TypeConstraints> {
        &self.constraints
    }

    /// Freezes the symbol tables for decoding.
    pub fn freeze(&self) {
        self.alphabets.freeze();
    }
}
