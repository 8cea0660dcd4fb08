//! Provider of a routine for decoding.

use crate::assignment::SentenceAssignment;
use crate::decoder::Decoder;
use crate::event::Event;
use crate::instance::SentenceInstance;

/// Provider of a routine for decoding.
///
/// It holds the result structures of the last decoded sentence, which can
/// be reused across sentences. Create one worker per thread; workers share
/// the decoder's frozen model.
pub struct Worker {
    decoder: Decoder,
    assignment: Option<SentenceAssignment>,
    events: Vec<Event>,
}

impl Worker {
    pub(crate) fn new(decoder: Decoder) -> Self {
        Self {
            decoder,
            assignment: None,
            events: vec![],
        }
    }

    /// Decodes `inst`, replacing the previously stored result.
    pub fn decode(&mut self, inst: &SentenceInstance) {
        let assignment = self.decoder.decode(inst);
        self.events = assignment.to_events();
        self.assignment = Some(assignment);
    }

    /// Gets the number of extracted events.
    #[inline(always)]
    pub fn num_events(&self) -> usize {
        self.events.len()
    }

    /// Gets the `i`-th extracted event.
    #[inline(always)]
    pub fn event(&self, i: usize) -> &Event {
        &self.events[i]
    }

    /// Gets all extracted events in trigger order.
    #[inline(always)]
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Gets the full assignment of the last decoded sentence.
    pub fn assignment(&self) -> Option<&SentenceAssignment> {
        self.assignment.as_ref()
    }

    /// Gets the cumulative score of the last decoded sentence. Staged
    /// decoding performs no scoring, so the score is zero there.
    pub fn score(&self) -> Option<f64> {
        self.assignment.as_ref().map(SentenceAssignment::score)
    }
}
