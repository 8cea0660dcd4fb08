//! Annotated sentence instances consumed by the decoders.
//!
//! An instance carries everything the preprocessing pipeline has resolved
//! for one sentence: tokens with their local text features, the ordered
//! list of argument-candidate mentions, text features for every
//! (token, candidate) pair, and gold event annotations when available.
//! The decoders never derive linguistic features themselves.

use crate::errors::{Result, TremoloError};

/// A token with its precomputed local text features.
#[derive(Debug, Clone)]
pub struct Token {
    surface: String,
    text_features: Vec<String>,
    possible_trigger: bool,
}

impl Token {
    /// Creates a token that may carry a trigger label.
    pub fn new<S>(surface: S, text_features: Vec<String>) -> Self
    where
        S: Into<String>,
    {
        Self {
            surface: surface.into(),
            text_features,
            possible_trigger: true,
        }
    }

    /// Sets whether this token may carry a non-null trigger label.
    ///
    /// The upstream pipeline decides this, typically from the part of
    /// speech. Tokens with `false` keep the null label in gold construction
    /// and joint search.
    pub fn possible_trigger(mut self, yes: bool) -> Self {
        self.possible_trigger = yes;
        self
    }

    /// Returns the surface string.
    pub fn surface(&self) -> &str {
        &self.surface
    }

    /// Returns the local text features.
    pub fn text_features(&self) -> &[String] {
        &self.text_features
    }

    /// Checks if this token may carry a non-null trigger label.
    pub fn is_possible_trigger(&self) -> bool {
        self.possible_trigger
    }
}

/// A candidate argument mention (entity, value, or time expression).
#[derive(Debug, Clone)]
pub struct Candidate {
    mention_type: String,
    surface: String,
}

impl Candidate {
    /// Creates a candidate of the given mention type.
    pub fn new<T, S>(mention_type: T, surface: S) -> Self
    where
        T: Into<String>,
        S: Into<String>,
    {
        Self {
            mention_type: mention_type.into(),
            surface: surface.into(),
        }
    }

    /// Returns the mention type string.
    pub fn mention_type(&self) -> &str {
        &self.mention_type
    }

    /// Returns the surface string.
    pub fn surface(&self) -> &str {
        &self.surface
    }
}

/// A gold event annotation on an instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventAnnotation {
    /// Index of the trigger token.
    pub trigger_index: usize,

    /// Event type label.
    pub event_type: String,

    /// `(candidate index, role)` pairs in candidate order.
    pub arguments: Vec<(usize, String)>,
}

impl EventAnnotation {
    /// Creates an annotation.
    pub fn new<S>(trigger_index: usize, event_type: S, arguments: Vec<(usize, String)>) -> Self
    where
        S: Into<String>,
    {
        Self {
            trigger_index,
            event_type: event_type.into(),
            arguments,
        }
    }
}

/// An annotated sentence ready for decoding.
#[derive(Debug, Clone, Default)]
pub struct SentenceInstance {
    tokens: Vec<Token>,
    candidates: Vec<Candidate>,
    // Indexed as [token][candidate].
    edge_text_features: Vec<Vec<Vec<String>>>,
    gold_events: Vec<EventAnnotation>,
}

impl SentenceInstance {
    /// Creates an instance over the given tokens and candidates, with empty
    /// edge text features for every (token, candidate) pair.
    pub fn new(tokens: Vec<Token>, candidates: Vec<Candidate>) -> Self {
        let edge_text_features = vec![vec![vec![]; candidates.len()]; tokens.len()];
        Self {
            tokens,
            candidates,
            edge_text_features,
            gold_events: vec![],
        }
    }

    /// Returns the number of tokens.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Checks if the sentence has no tokens.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Returns the `i`-th token.
    pub fn token(&self, i: usize) -> &Token {
        &self.tokens[i]
    }

    /// Returns all tokens.
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Returns the ordered candidate list.
    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    /// Returns the local text features of token `i`.
    pub fn node_text_features(&self, i: usize) -> &[String] {
        self.tokens[i].text_features()
    }

    /// Returns the text features of the (token `i`, candidate `k`) pair.
    pub fn edge_text_features(&self, i: usize, k: usize) -> &[String] {
        &self.edge_text_features[i][k]
    }

    /// Stores the text features of the (token `i`, candidate `k`) pair.
    ///
    /// # Errors
    ///
    /// [`TremoloError`] is returned when either index is out of range.
    pub fn set_edge_text_features(
        &mut self,
        i: usize,
        k: usize,
        features: Vec<String>,
    ) -> Result<()> {
        if i >= self.tokens.len() {
            return Err(TremoloError::invalid_argument(
                "i",
                format!("token index out of range: {i}"),
            ));
        }
        if k >= self.candidates.len() {
            return Err(TremoloError::invalid_argument(
                "k",
                format!("candidate index out of range: {k}"),
            ));
        }
        self.edge_text_features[i][k] = features;
        Ok(())
    }

    /// Adds a gold event annotation.
    ///
    /// # Errors
    ///
    /// [`TremoloError`] is returned when the trigger or a candidate index
    /// is out of range.
    pub fn add_gold_event(&mut self, event: EventAnnotation) -> Result<()> {
        if event.trigger_index >= self.tokens.len() {
            return Err(TremoloError::invalid_argument(
                "event",
                format!("trigger index out of range: {}", event.trigger_index),
            ));
        }
        if let Some(&(k, _)) = event
            .arguments
            .iter()
            .find(|&&(k, _)| k >= self.candidates.len())
        {
            return Err(TremoloError::invalid_argument(
                "event",
                format!("candidate index out of range: {k}"),
            ));
        }
        self.gold_events.push(event);
        Ok(())
    }

    /// Returns the gold event annotations.
    pub fn gold_events(&self) -> &[EventAnnotation] {
        &self.gold_events
    }

    /// Removes all gold event annotations, e.g. before attaching predicted
    /// ones for output.
    pub fn clear_gold_events(&mut self) {
        self.gold_events.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edge_feature_bounds() {
        let mut inst = SentenceInstance::new(
            vec![Token::new("fired", vec!["pos=VBD".into()])],
            vec![Candidate::new("PER", "he")],
        );
        assert!(inst.set_edge_text_features(0, 0, vec!["path=nsubj".into()]).is_ok());
        assert!(inst.set_edge_text_features(1, 0, vec![]).is_err());
        assert!(inst.set_edge_text_features(0, 1, vec![]).is_err());
        assert_eq!(inst.edge_text_features(0, 0), ["path=nsubj"]);
    }

    #[test]
    fn test_gold_event_bounds() {
        let mut inst = SentenceInstance::new(
            vec![Token::new("fired", vec![])],
            vec![Candidate::new("PER", "he")],
        );
        assert!(inst
            .add_gold_event(EventAnnotation::new(0, "Attack", vec![(0, "Attacker".into())]))
            .is_ok());
        assert!(inst
            .add_gold_event(EventAnnotation::new(1, "Attack", vec![]))
            .is_err());
        assert!(inst
            .add_gold_event(EventAnnotation::new(0, "Attack", vec![(3, "Target".into())]))
            .is_err());
        assert_eq!(inst.gold_events().len(), 1);
    }
}
