//! Precision/recall scoring of extracted events.

use hashbrown::HashSet;

use crate::event::Event;

/// Match counts with derived precision, recall, and F1.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counts {
    /// Predictions agreeing with the gold standard.
    pub matched: usize,

    /// Total predictions.
    pub predicted: usize,

    /// Total gold items.
    pub gold: usize,
}

impl Counts {
    /// Fraction of predictions that are correct.
    pub fn precision(&self) -> f64 {
        if self.predicted == 0 {
            0.0
        } else {
            self.matched as f64 / self.predicted as f64
        }
    }

    /// Fraction of gold items that were predicted.
    pub fn recall(&self) -> f64 {
        if self.gold == 0 {
            0.0
        } else {
            self.matched as f64 / self.gold as f64
        }
    }

    /// Harmonic mean of precision and recall.
    pub fn f1(&self) -> f64 {
        let p = self.precision();
        let r = self.recall();
        if p + r == 0.0 { 0.0 } else { 2.0 * p * r / (p + r) }
    }
}

/// Trigger-level and argument-level scores of one evaluation.
#[derive(Debug, Clone, Copy, Default)]
pub struct EventScores {
    /// Triggers match on (token index, event type).
    pub trigger: Counts,

    /// Arguments additionally match on (candidate index, role).
    pub argument: Counts,
}

/// Scores predicted events against gold events, sentence by sentence.
///
/// The two slices must be aligned: entry `i` of both holds the events of
/// the same sentence.
pub fn score_events(gold: &[Vec<Event>], predicted: &[Vec<Event>]) -> EventScores {
    debug_assert_eq!(gold.len(), predicted.len());
    let mut scores = EventScores::default();
    for (gold_events, predicted_events) in gold.iter().zip(predicted) {
        let gold_triggers: HashSet<(usize, &str)> = gold_events
            .iter()
            .map(|e| (e.trigger_index, e.event_type.as_str()))
            .collect();
        let gold_arguments: HashSet<(usize, &str, usize, &str)> = gold_events
            .iter()
            .flat_map(|e| {
                e.arguments.iter().map(|a| {
                    (
                        e.trigger_index,
                        e.event_type.as_str(),
                        a.candidate_index,
                        a.role.as_str(),
                    )
                })
            })
            .collect();

        scores.trigger.gold += gold_triggers.len();
        scores.argument.gold += gold_arguments.len();
        for event in predicted_events {
            scores.trigger.predicted += 1;
            if gold_triggers.contains(&(event.trigger_index, event.event_type.as_str())) {
                scores.trigger.matched += 1;
            }
            for argument in &event.arguments {
                scores.argument.predicted += 1;
                let key = (
                    event.trigger_index,
                    event.event_type.as_str(),
                    argument.candidate_index,
                    argument.role.as_str(),
                );
                if gold_arguments.contains(&key) {
                    scores.argument.matched += 1;
                }
            }
        }
    }
    scores
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventArgument;

    fn event(trigger: usize, ty: &str, args: &[(usize, &str)]) -> Event {
        Event {
            trigger_index: trigger,
            event_type: ty.to_string(),
            arguments: args
                .iter()
                .map(|&(k, role)| EventArgument {
                    candidate_index: k,
                    role: role.to_string(),
                })
                .collect(),
        }
    }

    #[test]
    fn test_counts() {
        let gold = vec![
            vec![event(2, "Attack", &[(0, "Agent"), (1, "Victim")])],
            vec![event(0, "Die", &[(0, "Victim")])],
        ];
        let predicted = vec![
            vec![event(2, "Attack", &[(0, "Agent"), (1, "Place")])],
            vec![event(1, "Die", &[(0, "Victim")])],
        ];
        let scores = score_events(&gold, &predicted);
        assert_eq!(scores.trigger.matched, 1);
        assert_eq!(scores.trigger.predicted, 2);
        assert_eq!(scores.trigger.gold, 2);
        // The Die argument hangs off a wrong trigger, so only Agent counts.
        assert_eq!(scores.argument.matched, 1);
        assert_eq!(scores.argument.predicted, 3);
        assert_eq!(scores.argument.gold, 3);
        assert!((scores.trigger.precision() - 0.5).abs() < 1e-9);
        assert!((scores.trigger.f1() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_empty_is_zero_not_nan() {
        let scores = score_events(&[], &[]);
        assert_eq!(scores.trigger.precision(), 0.0);
        assert_eq!(scores.trigger.recall(), 0.0);
        assert_eq!(scores.trigger.f1(), 0.0);
    }
}
