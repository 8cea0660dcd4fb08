//! Extracted event structures.

use std::fmt;

use crate::instance::EventAnnotation;

/// One argument attachment of an extracted event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventArgument {
    /// Index into the instance's candidate list.
    pub candidate_index: usize,

    /// Role label.
    pub role: String,
}

/// An extracted event: a trigger token, its event type, and the attached
/// arguments in candidate order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    /// Index of the trigger token.
    pub trigger_index: usize,

    /// Event type label.
    pub event_type: String,

    /// Attached arguments, ordered by candidate index.
    pub arguments: Vec<EventArgument>,
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}(", self.event_type, self.trigger_index)?;
        for (i, arg) in self.arguments.iter().enumerate() {
            if i != 0 {
                write!(f, " ")?;
            }
            write!(f, "{}:{}", arg.candidate_index, arg.role)?;
        }
        write!(f, ")")
    }
}

impl From<&EventAnnotation> for Event {
    fn from(annotation: &EventAnnotation) -> Self {
        Self {
            trigger_index: annotation.trigger_index,
            event_type: annotation.event_type.clone(),
            arguments: annotation
                .arguments
                .iter()
                .map(|(candidate_index, role)| EventArgument {
                    candidate_index: *candidate_index,
                    role: role.clone(),
                })
                .collect(),
        }
    }
}

impl From<&Event> for EventAnnotation {
    fn from(event: &Event) -> Self {
        Self {
            trigger_index: event.trigger_index,
            event_type: event.event_type.clone(),
            arguments: event
                .arguments
                .iter()
                .map(|arg| (arg.candidate_index, arg.role.clone()))
                .collect(),
        }
    }
}
