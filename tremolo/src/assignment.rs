//! Incremental label assignments over one sentence.
//!
//! A [`SentenceAssignment`] is the unit of hypothesis in decoding: one
//! trigger label per token, one role label per (trigger, candidate) pair,
//! and one feature vector with a partial score per committed token. It is
//! extended one token at a time, and competing hypotheses are branched off
//! with [`SentenceAssignment::clone`], which shares all finalized states
//! and copies only the frontier.

use std::fmt;
use std::sync::Arc;

use hashbrown::HashMap;

use crate::alphabet::{Alphabets, NULL_LABEL_ID};
use crate::common::{NULL_ROLE_LABEL, NULL_TRIGGER_LABEL, PAD_TRIGGER_LABEL};
use crate::constraints::TypeConstraints;
use crate::decoder::config::DecoderConfig;
use crate::event::{Event, EventArgument};
use crate::feature_vector::FeatureVector;
use crate::features;
use crate::instance::SentenceInstance;

/// Role assignments of one trigger token, keyed by candidate index.
pub type EdgeMap = HashMap<usize, u32>;

/// Checks if `label` can carry argument attachments, i.e. is not the null
/// trigger label.
pub fn is_argument_bearing(label: &str) -> bool {
    !label.eq_ignore_ascii_case(NULL_TRIGGER_LABEL)
}

/// The incremental state of a structured decision for one sentence.
///
/// The frontier only advances: [`Self::increment_state`] commits the next
/// token, and every "current" operation applies to the most recently
/// committed one. Before the first token is committed, the current-state
/// mutators are harmless no-ops.
pub struct SentenceAssignment {
    alphabets: Arc<Alphabets>,
    constraints: Arc<TypeConstraints>,
    config: DecoderConfig,
    node_assignment: Vec<u32>,
    edge_assignment: Vec<Option<Arc<EdgeMap>>>,
    feat_vec_seq: Vec<Arc<FeatureVector>>,
    partial_scores: Vec<f64>,
    score: f64,
}

impl SentenceAssignment {
    /// Creates an empty assignment, before the first token.
    pub fn new(
        alphabets: Arc<Alphabets>,
        constraints: Arc<TypeConstraints>,
        config: DecoderConfig,
    ) -> Self {
        Self {
            alphabets,
            constraints,
            config,
            node_assignment: vec![],
            edge_assignment: vec![],
            feat_vec_seq: vec![],
            partial_scores: vec![],
            score: 0.0,
        }
    }

    /// Builds the gold assignment of an annotated instance, running the
    /// same feature templates as decoding so that training and decoding
    /// score identically.
    ///
    /// Tokens flagged as impossible triggers keep the null label. Every
    /// event-compatible candidate of a gold trigger receives the null role
    /// before the annotated roles are applied, so the edge map covers
    /// exactly the candidates decoding would consider.
    pub fn from_gold(
        inst: &SentenceInstance,
        alphabets: Arc<Alphabets>,
        constraints: Arc<TypeConstraints>,
        config: DecoderConfig,
        learnable: bool,
    ) -> Self {
        let mut assn = Self::new(alphabets, constraints, config);
        for _ in 0..inst.len() {
            assn.increment_state();
        }
        for event in inst.gold_events() {
            let i = event.trigger_index;
            if !inst.token(i).is_possible_trigger() {
                continue;
            }
            let Some(label_id) = assn
                .alphabets
                .node_labels
                .lookup_index(&event.event_type, learnable)
            else {
                continue;
            };
            assn.node_assignment[i] = label_id;

            for (k, candidate) in inst.candidates().iter().enumerate() {
                if assn
                    .constraints
                    .is_entity_compatible(&event.event_type, candidate.mention_type())
                {
                    assn.edge_map_mut(i).insert(k, NULL_LABEL_ID);
                }
            }
            for (k, role) in &event.arguments {
                if let Some(role_id) = assn.alphabets.edge_labels.lookup_index(role, learnable) {
                    assn.edge_map_mut(i).insert(*k, role_id);
                }
            }
        }
        for i in 0..inst.len() {
            assn.make_all_features(inst, i, learnable, learnable);
        }
        assn
    }

    /// Returns the frontier state: the index of the most recently committed
    /// token, or `None` before the first token.
    pub fn state(&self) -> Option<usize> {
        self.node_assignment.len().checked_sub(1)
    }

    /// Advances the frontier by one token, appending the null trigger
    /// label, a fresh feature vector, and a zero partial score.
    ///
    /// Must be called exactly once per token before that token's label,
    /// edges, or features are set.
    pub fn increment_state(&mut self) {
        self.node_assignment.push(NULL_LABEL_ID);
        self.edge_assignment.push(None);
        self.feat_vec_seq.push(Arc::new(FeatureVector::new()));
        self.partial_scores.push(0.0);
    }

    /// Returns the cumulative score over all committed states.
    pub fn score(&self) -> f64 {
        self.score
    }

    /// Returns the per-state partial scores.
    pub fn partial_scores(&self) -> &[f64] {
        &self.partial_scores
    }

    /// Returns the trigger label ids of all committed states.
    pub fn node_label_ids(&self) -> &[u32] {
        &self.node_assignment
    }

    /// Returns the trigger label string at token `i`, or the padding label
    /// for positions outside the committed range.
    pub fn label_at_token(&self, i: usize) -> String {
        self.node_assignment
            .get(i)
            .and_then(|&id| self.alphabets.node_labels.lookup_object(id))
            .unwrap_or_else(|| PAD_TRIGGER_LABEL.to_string())
    }

    /// Returns the trigger label string of the frontier token, or the
    /// padding label before the first token.
    pub fn current_node_label(&self) -> String {
        match self.state() {
            Some(state) => self.label_at_token(state),
            None => PAD_TRIGGER_LABEL.to_string(),
        }
    }

    fn label_before(&self, i: usize) -> String {
        if i == 0 {
            PAD_TRIGGER_LABEL.to_string()
        } else {
            self.label_at_token(i - 1)
        }
    }

    /// Sets the trigger label of the frontier token, interning the label
    /// when `add_if_absent` is set.
    ///
    /// Returns `false`, leaving the label untouched, before the first
    /// token or when the label is unknown and cannot be interned.
    pub fn set_current_node_label(&mut self, label: &str, add_if_absent: bool) -> bool {
        let Some(state) = self.state() else {
            return false;
        };
        let Some(id) = self.alphabets.node_labels.lookup_index(label, add_if_absent) else {
            return false;
        };
        self.node_assignment[state] = id;
        true
    }

    /// Sets the trigger label of the frontier token by id. A no-op before
    /// the first token.
    pub fn set_current_node_label_id(&mut self, id: u32) {
        if let Some(state) = self.state() {
            self.node_assignment[state] = id;
        }
    }

    /// Returns the role map of token `i`, or `None` when the token has no
    /// argument attachments.
    pub fn edge_labels_at(&self, i: usize) -> Option<&EdgeMap> {
        self.edge_assignment.get(i)?.as_deref()
    }

    /// Returns the role map of the frontier token.
    pub fn current_edge_labels(&self) -> Option<&EdgeMap> {
        self.edge_labels_at(self.state()?)
    }

    /// Returns the role label id between token `i` and candidate `k`.
    pub fn edge_label_id_at(&self, i: usize, k: usize) -> Option<u32> {
        self.edge_labels_at(i)?.get(&k).copied()
    }

    /// Returns the role label string between token `i` and candidate `k`.
    pub fn edge_label_at(&self, i: usize, k: usize) -> Option<String> {
        self.alphabets
            .edge_labels
            .lookup_object(self.edge_label_id_at(i, k)?)
    }

    /// Sets the role between the frontier token and candidate `k`,
    /// interning the role label when `add_if_absent` is set.
    ///
    /// Returns `false`, leaving the map untouched, before the first token
    /// or when the label is unknown and cannot be interned.
    pub fn set_current_edge_label(&mut self, k: usize, role: &str, add_if_absent: bool) -> bool {
        let Some(state) = self.state() else {
            return false;
        };
        let Some(id) = self.alphabets.edge_labels.lookup_index(role, add_if_absent) else {
            return false;
        };
        self.edge_map_mut(state).insert(k, id);
        true
    }

    /// Sets the role between the frontier token and candidate `k` by id.
    /// A no-op before the first token.
    pub fn set_current_edge_label_id(&mut self, k: usize, id: u32) {
        if let Some(state) = self.state() {
            self.edge_map_mut(state).insert(k, id);
        }
    }

    /// Bulk-sets candidate roles of the frontier token. A no-op before the
    /// first token.
    pub fn set_current_edges(&mut self, edges: &EdgeMap) {
        if let Some(state) = self.state() {
            let map = self.edge_map_mut(state);
            for (&k, &id) in edges {
                map.insert(k, id);
            }
        }
    }

    // The frontier map is exclusively owned after a clone; earlier maps are
    // shared and never mutated again, so make_mut only copies when a clone
    // races ahead of the copy done in clone().
    fn edge_map_mut(&mut self, i: usize) -> &mut EdgeMap {
        let slot = &mut self.edge_assignment[i];
        Arc::make_mut(slot.get_or_insert_with(|| Arc::new(EdgeMap::new())))
    }

    /// Returns the feature vector of state `i`.
    pub fn feature_vector_at(&self, i: usize) -> Option<&FeatureVector> {
        self.feat_vec_seq.get(i).map(Arc::as_ref)
    }

    /// Sums the feature vectors of states `0..=up_to` into one vector.
    pub fn combined_feature_vector(&self, up_to: usize) -> FeatureVector {
        let mut fv = FeatureVector::new();
        for state_fv in self.feat_vec_seq.iter().take(up_to + 1) {
            fv.plus_equals(state_fv, 1.0);
        }
        fv
    }

    fn fv_mut(&mut self, i: usize) -> &mut FeatureVector {
        Arc::make_mut(&mut self.feat_vec_seq[i])
    }

    /// Runs every feature template of state `i` in template order: node
    /// features, edge features, then (if configured) global features.
    pub fn make_all_features(
        &mut self,
        inst: &SentenceInstance,
        i: usize,
        add_if_absent: bool,
        use_if_absent: bool,
    ) {
        self.make_node_features(inst, i, add_if_absent, use_if_absent);
        self.make_edge_features(inst, i, add_if_absent, use_if_absent);
        if self.config.use_global_features {
            self.make_global_features(inst, i, add_if_absent, use_if_absent);
        }
    }

    /// Generates the trigger-label indicator features of state `i`.
    ///
    /// With feature order 1 or higher each local text feature is combined
    /// with the previous and current labels; with order 0 only with the
    /// current label. Non-null labels outside the configured exception set
    /// also fire a supertype backoff, and a label-transition feature fires
    /// when the previous label is non-null.
    pub fn make_node_features(
        &mut self,
        inst: &SentenceInstance,
        i: usize,
        add_if_absent: bool,
        use_if_absent: bool,
    ) {
        let prev = self.label_before(i);
        let cur = self.label_at_token(i);
        let backoff = if is_argument_bearing(&cur) && self.constraints.has_supertype_backoff(&cur)
        {
            self.constraints.super_type(&cur).map(str::to_string)
        } else {
            None
        };

        for tf in inst.node_text_features(i) {
            let feature = if self.config.feature_order >= 1 {
                format!("Bigram:\t{tf}\tPrev:{prev}\tCur:{cur}")
            } else {
                format!("Bigram:\t{tf}\tCur:{cur}")
            };
            self.make_feature(&feature, i, add_if_absent, use_if_absent);
            if let Some(super_type) = &backoff {
                let feature = format!("Bigram:\t{tf}\tCur:{super_type}");
                self.make_feature(&feature, i, add_if_absent, use_if_absent);
            }
        }

        if is_argument_bearing(&prev) {
            let feature = format!("Bigram:\tPrev:{prev}\tCur:{cur}");
            self.make_feature(&feature, i, add_if_absent, use_if_absent);
        }
    }

    /// Generates edge features for every candidate with a role assignment
    /// at state `i`. Does nothing when the label at `i` bears no arguments
    /// or the token has no role map.
    pub fn make_edge_features(
        &mut self,
        inst: &SentenceInstance,
        i: usize,
        add_if_absent: bool,
        use_if_absent: bool,
    ) {
        if !is_argument_bearing(&self.label_at_token(i)) {
            return;
        }
        let Some(map) = self.edge_labels_at(i) else {
            return;
        };
        let mut candidates: Vec<usize> = map.keys().copied().collect();
        candidates.sort_unstable();
        for k in candidates {
            self.make_edge_local_feature(inst, i, k, add_if_absent, use_if_absent);
        }
    }

    /// Generates the edge features between token `i` and candidate `k`.
    ///
    /// Roles declared independent of the event type use a template without
    /// the trigger label; other roles condition on it. Non-null roles also
    /// fire an `IsArg` backoff, the null role its own template (unless the
    /// skip switch is on), and one feature combines the trigger and role
    /// labels directly.
    pub fn make_edge_local_feature(
        &mut self,
        inst: &SentenceInstance,
        i: usize,
        k: usize,
        add_if_absent: bool,
        use_if_absent: bool,
    ) {
        let Some(role) = self.edge_label_at(i, k) else {
            return;
        };
        if self.config.skip_null_role_features && role == NULL_ROLE_LABEL {
            return;
        }
        let node_label = self.label_at_token(i);

        for tf in inst.edge_text_features(i, k) {
            if role != NULL_ROLE_LABEL {
                let feature = if self.constraints.is_independent_role(&role) {
                    format!("EdgeLocal:\t{tf}\tRole:{role}")
                } else {
                    format!("EdgeLocal:\t{tf}\tTrigger:{node_label}\tRole:{role}")
                };
                self.make_feature(&feature, i, add_if_absent, use_if_absent);
                let feature = format!("EdgeLocal:\t{tf}\tIsArg");
                self.make_feature(&feature, i, add_if_absent, use_if_absent);
            } else {
                let feature = format!("EdgeLocal:\t{tf}\t{role}");
                self.make_feature(&feature, i, add_if_absent, use_if_absent);
            }
        }
        let feature = format!("EdgeLocal:\tTrigger:{node_label}\tRole:{role}");
        self.make_feature(&feature, i, add_if_absent, use_if_absent);
    }

    /// Generates all global features of state `i`: the trigger-step
    /// features, then, if the token has a role map, the node-complete
    /// features and the per-candidate progress features.
    pub fn make_global_features(
        &mut self,
        inst: &SentenceInstance,
        i: usize,
        add_if_absent: bool,
        use_if_absent: bool,
    ) {
        self.make_global_features_trigger(inst, i, add_if_absent, use_if_absent);
        let Some(map) = self.edge_labels_at(i) else {
            return;
        };
        let mut candidates: Vec<usize> = map.keys().copied().collect();
        candidates.sort_unstable();
        self.make_global_features_complete(inst, i, add_if_absent, use_if_absent);
        for k in candidates {
            self.make_global_features_progress(inst, i, k, add_if_absent, use_if_absent);
        }
    }

    /// Generates the global features fired at the trigger-classification
    /// step of state `i`, before any arguments are attached.
    pub fn make_global_features_trigger(
        &mut self,
        inst: &SentenceInstance,
        i: usize,
        add_if_absent: bool,
        use_if_absent: bool,
    ) {
        let feats = features::trigger_features(inst, i, self);
        for f in feats {
            let feature = format!("TriggerGlobal:\t{f}");
            self.make_feature(&feature, i, add_if_absent, use_if_absent);
        }
    }

    /// Generates the global features fired as argument search progresses
    /// over candidate `k` of state `i`.
    pub fn make_global_features_progress(
        &mut self,
        inst: &SentenceInstance,
        i: usize,
        k: usize,
        add_if_absent: bool,
        use_if_absent: bool,
    ) {
        let feats = features::node_progress_features(inst, i, k, self);
        for f in feats {
            let feature = format!("NodeGlobal:\t{f}");
            self.make_feature(&feature, i, add_if_absent, use_if_absent);
        }
        let feats = features::sent_progress_features(inst, i, k, self);
        for f in feats {
            let feature = format!("SentGlobal:\t{f}");
            self.make_feature(&feature, i, add_if_absent, use_if_absent);
        }
    }

    /// Generates the global features fired once the argument search of
    /// state `i` is complete.
    pub fn make_global_features_complete(
        &mut self,
        inst: &SentenceInstance,
        i: usize,
        add_if_absent: bool,
        use_if_absent: bool,
    ) {
        let feats = features::complete_features(inst, i, self);
        for f in feats {
            let feature = format!("NodeGlobal:\t{f}");
            self.make_feature(&feature, i, add_if_absent, use_if_absent);
        }
    }

    /// Adds one feature to the feature vector of state `i` under the
    /// vocabulary policy: `add_if_absent` interns unknown features,
    /// `use_if_absent` scores them with unit weight even when they stay
    /// out of vocabulary.
    fn make_feature(&mut self, feature: &str, i: usize, add_if_absent: bool, use_if_absent: bool) {
        let include = if use_if_absent && !add_if_absent {
            true
        } else {
            self.alphabets
                .features
                .lookup_index(feature, add_if_absent)
                .is_some()
        };
        if include {
            self.fv_mut(i).add(feature, 1.0);
        }
    }

    /// Recomputes the partial score of the frontier state as the dot
    /// product of its feature vector with `weights`, then the cumulative
    /// score as the sum of all partial scores. A no-op before the first
    /// token.
    pub fn update_score_for_new_state(&mut self, weights: &FeatureVector) {
        let Some(state) = self.state() else {
            return;
        };
        self.partial_scores[state] = self.feat_vec_seq[state].dot(weights);
        self.score = self.partial_scores.iter().sum();
    }

    /// Recomputes every partial score and the cumulative score against
    /// `weights`.
    pub fn rescore(&mut self, weights: &FeatureVector) {
        for (partial, fv) in self.partial_scores.iter_mut().zip(&self.feat_vec_seq) {
            *partial = fv.dot(weights);
        }
        self.score = self.partial_scores.iter().sum();
    }

    fn edge_map_agrees(mine: Option<&EdgeMap>, other: Option<&EdgeMap>) -> bool {
        match other {
            None => true,
            Some(map) => mine.is_some_and(|m| m == map),
        }
    }

    /// Checks full equality of labels: same frontier, same trigger label at
    /// every state, and agreeing role maps.
    pub fn matches(&self, other: &Self) -> bool {
        if self.state() != other.state() {
            return false;
        }
        for i in 0..self.node_assignment.len() {
            if self.node_assignment[i] != other.node_assignment[i] {
                return false;
            }
            if !Self::edge_map_agrees(self.edge_labels_at(i), other.edge_labels_at(i)) {
                return false;
            }
        }
        true
    }

    /// Checks equality of labels up to state `step` (inclusive), ignoring
    /// everything after it. States beyond either frontier are skipped.
    pub fn matches_up_to(&self, other: &Self, step: usize) -> bool {
        let end = match (self.state(), other.state()) {
            (Some(a), Some(b)) => step.min(a).min(b),
            _ => return true,
        };
        for i in 0..=end {
            if self.node_assignment[i] != other.node_assignment[i] {
                return false;
            }
            if !Self::edge_map_agrees(self.edge_labels_at(i), other.edge_labels_at(i)) {
                return false;
            }
        }
        true
    }

    /// Checks equality of labels up to state `step`, comparing at `step`
    /// the trigger label and, when `arg_bound` is given, the roles of
    /// candidates `0..=arg_bound` only. Used to deduplicate hypotheses
    /// mid-way through a trigger's candidate loop.
    pub fn matches_up_to_args(
        &self,
        other: &Self,
        step: usize,
        arg_bound: Option<usize>,
    ) -> bool {
        let (Some(a), Some(b)) = (self.state(), other.state()) else {
            return true;
        };
        if step > a || step > b {
            return false;
        }
        for i in 0..step {
            if self.node_assignment[i] != other.node_assignment[i] {
                return false;
            }
            if !Self::edge_map_agrees(self.edge_labels_at(i), other.edge_labels_at(i)) {
                return false;
            }
        }
        if self.node_assignment[step] != other.node_assignment[step] {
            return false;
        }
        let Some(arg_bound) = arg_bound else {
            return true;
        };
        let mine = self.edge_labels_at(step);
        let others = other.edge_labels_at(step);
        for k in 0..=arg_bound {
            let label = mine.and_then(|m| m.get(&k));
            let label_other = others.and_then(|m| m.get(&k));
            if label != label_other {
                return false;
            }
        }
        true
    }

    /// Collects the labeled structure as a list of events, in trigger then
    /// candidate order. Candidates with the null role are not arguments.
    pub fn to_events(&self) -> Vec<Event> {
        let mut events = vec![];
        for (i, &label_id) in self.node_assignment.iter().enumerate() {
            let Some(label) = self.alphabets.node_labels.lookup_object(label_id) else {
                continue;
            };
            if !is_argument_bearing(&label) {
                continue;
            }
            let mut arguments = vec![];
            if let Some(map) = self.edge_labels_at(i) {
                let mut candidates: Vec<usize> = map.keys().copied().collect();
                candidates.sort_unstable();
                for k in candidates {
                    let Some(role) = self.edge_label_at(i, k) else {
                        continue;
                    };
                    if role != NULL_ROLE_LABEL {
                        arguments.push(EventArgument {
                            candidate_index: k,
                            role,
                        });
                    }
                }
            }
            events.push(Event {
                trigger_index: i,
                event_type: label,
                arguments,
            });
        }
        events
    }
}

impl Clone for SentenceAssignment {
    /// Branches a hypothesis: label sequences and all pre-frontier edge
    /// maps and feature vectors are shared, while the frontier edge map and
    /// feature vector are deep-copied, since the frontier is the only state
    /// still being mutated during search.
    fn clone(&self) -> Self {
        let mut edge_assignment = self.edge_assignment.clone();
        if let Some(state) = self.state()
            && let Some(Some(map)) = edge_assignment.get_mut(state)
        {
            *map = Arc::new((**map).clone());
        }
        let mut feat_vec_seq = self.feat_vec_seq.clone();
        if let Some(last) = feat_vec_seq.last_mut() {
            *last = Arc::new((**last).clone());
        }
        Self {
            alphabets: Arc::clone(&self.alphabets),
            constraints: Arc::clone(&self.constraints),
            config: self.config,
            node_assignment: self.node_assignment.clone(),
            edge_assignment,
            feat_vec_seq,
            partial_scores: self.partial_scores.clone(),
            score: self.score,
        }
    }
}

impl PartialEq for SentenceAssignment {
    fn eq(&self, other: &Self) -> bool {
        self.matches(other)
    }
}

impl fmt::Debug for SentenceAssignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SentenceAssignment {{ score: {},", self.score)?;
        for i in 0..self.node_assignment.len() {
            write!(f, " {}", self.label_at_token(i))?;
            if let Some(map) = self.edge_labels_at(i) {
                let mut candidates: Vec<usize> = map.keys().copied().collect();
                candidates.sort_unstable();
                write!(f, "(")?;
                for (n, k) in candidates.into_iter().enumerate() {
                    if n != 0 {
                        write!(f, " ")?;
                    }
                    let role = self.edge_label_at(i, k).unwrap_or_default();
                    write!(f, "{k}:{role}")?;
                }
                write!(f, ")")?;
            }
        }
        write!(f, " }}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{attack_constraints, five_token_instance};

    fn context() -> (Arc<Alphabets>, Arc<TypeConstraints>, DecoderConfig) {
        (
            Arc::new(Alphabets::new()),
            Arc::new(attack_constraints()),
            DecoderConfig::default(),
        )
    }

    fn gold_assignment() -> (SentenceInstance, SentenceAssignment) {
        let (alphabets, constraints, config) = context();
        let inst = five_token_instance();
        let assn = SentenceAssignment::from_gold(&inst, alphabets, constraints, config, true);
        (inst, assn)
    }

    #[test]
    fn test_mutators_before_first_state_are_noops() {
        let (alphabets, constraints, config) = context();
        let mut assn = SentenceAssignment::new(alphabets, constraints, config);
        assert_eq!(assn.state(), None);
        assert!(!assn.set_current_node_label("Attack", true));
        assn.set_current_node_label_id(3);
        assert!(!assn.set_current_edge_label(0, "Agent", true));
        assn.set_current_edge_label_id(0, 3);
        assert_eq!(assn.state(), None);
        assert!(assn.current_edge_labels().is_none());
        assert_eq!(assn.current_node_label(), PAD_TRIGGER_LABEL);
    }

    #[test]
    fn test_state_advances_monotonically() {
        let (alphabets, constraints, config) = context();
        let mut assn = SentenceAssignment::new(alphabets, constraints, config);
        assn.increment_state();
        assert_eq!(assn.state(), Some(0));
        assert!(assn.set_current_node_label("Attack", true));
        assn.increment_state();
        assert_eq!(assn.state(), Some(1));
        assert_eq!(assn.label_at_token(0), "Attack");
        assert_eq!(assn.current_node_label(), NULL_TRIGGER_LABEL);
        assert_eq!(assn.partial_scores().len(), 2);
    }

    #[test]
    fn test_score_additivity() {
        let (alphabets, constraints, config) = context();
        let inst = five_token_instance();
        let gold = SentenceAssignment::from_gold(
            &inst,
            Arc::clone(&alphabets),
            Arc::clone(&constraints),
            config,
            true,
        );
        let mut weights = FeatureVector::new();
        for i in 0..inst.len() {
            weights.plus_equals(gold.feature_vector_at(i).unwrap(), 0.5);
        }
        // Re-walk the sentence as a decoder would.
        let mut assn = SentenceAssignment::new(alphabets, constraints, config);
        for i in 0..inst.len() {
            assn.increment_state();
            assn.set_current_node_label(&gold.label_at_token(i), false);
            if let Some(map) = gold.edge_labels_at(i) {
                assn.set_current_edges(map);
            }
            assn.make_all_features(&inst, i, false, false);
            assn.update_score_for_new_state(&weights);
        }
        let total: f64 = assn.partial_scores().iter().sum();
        assert!((assn.score() - total).abs() < 1e-9);
        assert!(assn.score() > 0.0);
        assert!(assn.matches(&gold));
    }

    #[test]
    fn test_clone_shares_prefix_and_copies_frontier() {
        let (alphabets, constraints, config) = context();
        let mut source = SentenceAssignment::new(alphabets, constraints, config);
        let agent = source.alphabets.edge_labels.lookup_index("Agent", true).unwrap();
        let attack = source.alphabets.node_labels.lookup_index("Attack", true).unwrap();
        source.increment_state();
        source.set_current_node_label_id(attack);
        source.set_current_edge_label_id(0, NULL_LABEL_ID);
        source.increment_state();
        source.set_current_node_label_id(attack);
        source.set_current_edge_label_id(0, NULL_LABEL_ID);

        let mut branched = source.clone();
        branched.set_current_edge_label_id(0, agent);
        branched.set_current_edge_label_id(1, agent);

        // The source's frontier map is untouched by the branch's mutation.
        assert_eq!(source.edge_label_id_at(1, 0), Some(NULL_LABEL_ID));
        assert_eq!(source.edge_labels_at(1).unwrap().len(), 1);
        assert_eq!(branched.edge_label_id_at(1, 0), Some(agent));
        // Pre-frontier states are shared, not copied.
        assert!(Arc::ptr_eq(
            source.edge_assignment[0].as_ref().unwrap(),
            branched.edge_assignment[0].as_ref().unwrap(),
        ));
        assert_eq!(source.node_assignment, branched.node_assignment);
    }

    #[test]
    fn test_equality_up_to_step() {
        let (inst, a) = gold_assignment();
        let (alphabets, constraints, config) = context();
        let mut b = SentenceAssignment::from_gold(&inst, alphabets, constraints, config, true);
        assert!(a.matches(&b));
        // Diverge after step 2.
        b.node_assignment[4] = 99;
        assert!(!a.matches(&b));
        assert!(a.matches_up_to(&b, 2));
        assert!(a.matches_up_to(&b, 3));
        assert!(!a.matches_up_to(&b, 4));
    }

    #[test]
    fn test_equality_with_argument_bound() {
        let (_, a) = gold_assignment();
        let mut b = a.clone();
        assert!(a.matches_up_to_args(&b, 2, None));
        assert!(a.matches_up_to_args(&b, 2, Some(1)));
        // Flip candidate 1's role; candidate 0 still agrees.
        let other = b.alphabets.edge_labels.lookup_index("Agent", false).unwrap();
        b.edge_map_mut(2).insert(1, other);
        assert!(a.matches_up_to_args(&b, 2, None));
        assert!(a.matches_up_to_args(&b, 2, Some(0)));
        assert!(!a.matches_up_to_args(&b, 2, Some(1)));
    }

    #[test]
    fn test_absent_edge_map_is_lenient() {
        let (_, a) = gold_assignment();
        let mut b = a.clone();
        // Dropping the other side's map entirely still matches, per the
        // one-sided agreement rule.
        b.edge_assignment[2] = None;
        assert!(a.matches(&b));
        assert!(!b.matches(&a));
    }

    #[test]
    fn test_gold_structure_and_fired_features() {
        let (inst, assn) = gold_assignment();
        assert_eq!(assn.state(), Some(4));
        assert_eq!(assn.label_at_token(2), "Attack");
        assert_eq!(assn.edge_label_at(2, 0).as_deref(), Some("Agent"));
        assert_eq!(assn.edge_label_at(2, 1).as_deref(), Some("Victim"));

        let fv = assn.feature_vector_at(2).unwrap();
        for tf in inst.node_text_features(2) {
            let expected = format!("Bigram:\t{tf}\tPrev:O\tCur:Attack");
            assert!(fv.get(&expected).is_some(), "missing {expected}");
            let backoff = format!("Bigram:\t{tf}\tCur:Conflict");
            assert!(fv.get(&backoff).is_some(), "missing {backoff}");
        }
        let tf = &inst.edge_text_features(2, 1)[0];
        let expected = format!("EdgeLocal:\t{tf}\tTrigger:Attack\tRole:Victim");
        assert!(fv.get(&expected).is_some(), "missing {expected}");
    }

    #[test]
    fn test_rescore_counts_matching_features() {
        let (inst, mut assn) = gold_assignment();
        let mut weights = FeatureVector::new();
        let bigram = format!(
            "Bigram:\t{}\tPrev:O\tCur:Attack",
            inst.node_text_features(2)[0]
        );
        let edge = format!(
            "EdgeLocal:\t{}\tTrigger:Attack\tRole:Victim",
            inst.edge_text_features(2, 1)[0]
        );
        weights.add(&bigram, 1.0);
        weights.add(&edge, 1.0);
        assn.rescore(&weights);
        assert!((assn.score() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_events_from_gold() {
        let (_, assn) = gold_assignment();
        let events = assn.to_events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].trigger_index, 2);
        assert_eq!(events[0].event_type, "Attack");
        let roles: Vec<(usize, &str)> = events[0]
            .arguments
            .iter()
            .map(|a| (a.candidate_index, a.role.as_str()))
            .collect();
        assert_eq!(roles, [(0, "Agent"), (1, "Victim")]);
    }

    #[test]
    fn test_skip_null_role_features() {
        use crate::instance::{Candidate, EventAnnotation, Token};

        // Candidate 1 keeps the default null role.
        let mut inst = SentenceInstance::new(
            vec![Token::new("attacked", vec!["w=attacked".into()])],
            vec![Candidate::new("PER", "he"), Candidate::new("GPE", "city")],
        );
        inst.set_edge_text_features(0, 0, vec!["path=nsubj".into()])
            .unwrap();
        inst.set_edge_text_features(0, 1, vec!["path=dobj".into()])
            .unwrap();
        inst.add_gold_event(EventAnnotation::new(0, "Attack", vec![(0, "Agent".into())]))
            .unwrap();

        let (alphabets, constraints, config) = context();
        let with_null = SentenceAssignment::from_gold(
            &inst,
            Arc::clone(&alphabets),
            Arc::clone(&constraints),
            config,
            true,
        );
        let fv = with_null.feature_vector_at(0).unwrap();
        assert!(fv.iter().any(|(key, _)| key.contains("\tNON")));

        let config = config.skip_null_role_features(true);
        let skipped = SentenceAssignment::from_gold(&inst, alphabets, constraints, config, true);
        let fv = skipped.feature_vector_at(0).unwrap();
        assert!(fv.iter().all(|(key, _)| !key.contains("\tNON")));
    }
}
