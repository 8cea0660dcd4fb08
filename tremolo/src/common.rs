//! Common settings in Tremolo.

/// The trigger label meaning "no event at this token".
pub const NULL_TRIGGER_LABEL: &str = "O";

/// The trigger label assumed for positions before the first token.
///
/// Feature templates that look one token back read this label at index -1.
pub const PAD_TRIGGER_LABEL: &str = "O";

/// The role label meaning "this candidate is not an argument".
pub const NULL_ROLE_LABEL: &str = "NON";

/// The default beam width of the joint decoder.
pub const DEFAULT_BEAM_WIDTH: usize = 4;
