//! # Tremolo
//!
//! Tremolo extracts structured events (a trigger word plus typed
//! arguments) from annotated sentences with a beam-search structured
//! perceptron. Trigger labels and argument roles are decoded jointly under
//! one sparse linear model, so argument decisions can inform trigger
//! decisions and vice versa; a staged discipline over two independent
//! classifiers is also provided.
//!
//! Preprocessing (tokenization, tagging, parsing, mention detection) is
//! out of scope: sentences arrive with their text features and candidate
//! mentions already resolved.
//!
//! ## Examples
//!
//! ```
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//!
//! use tremolo::constraints::TypeConstraints;
//! use tremolo::trainer::{Corpus, Trainer};
//! use tremolo::{Decoder, DecoderConfig};
//!
//! let corpus = "\
//! T\tTroops\t0\tw=Troops,pos=NNS
//! T\tattacked\t1\tw=attacked,pos=VBD
//! T\tthe\t0\tw=the,pos=DT
//! T\tcity\t0\tw=city,pos=NN
//! C\tPER\tTroops
//! C\tGPE\tcity
//! F\t1\t0\tpath=nsubj,type=PER
//! F\t1\t1\tpath=dobj,type=GPE
//! E\t1\tAttack\t0:Attacker,1:Place
//! EOS
//! ";
//! let corpus = Corpus::from_reader(corpus.as_bytes())?;
//!
//! let mut constraints = TypeConstraints::new();
//! constraints.add_event_type("Attack", "Conflict");
//! constraints.add_role("Attack", "Attacker");
//! constraints.add_role("Attack", "Place");
//! constraints.mark_independent_role("Place");
//!
//! let model = Trainer::new(constraints).max_iter(10).train(&corpus)?;
//! let decoder = Decoder::joint(model, DecoderConfig::default())?;
//! let mut worker = decoder.new_worker();
//!
//! worker.decode(corpus.examples()[0].instance());
//! assert_eq!(worker.num_events(), 1);
//!
//! let event = worker.event(0);
//! assert_eq!(event.event_type, "Attack");
//! assert_eq!(event.trigger_index, 1);
//! assert_eq!(event.arguments.len(), 2);
//! # Ok(())
//! # }
//! ```
#![deny(missing_docs)]

pub mod alphabet;
pub mod assignment;
pub mod common;
pub mod constraints;
pub mod decoder;
pub mod errors;
pub mod event;
pub mod feature_vector;
mod features;
pub mod instance;
pub mod model;
pub mod scorer;
mod utils;

#[cfg(feature = "train")]
pub mod trainer;

#[cfg(test)]
mod test_utils;

pub use decoder::Decoder;
pub use decoder::config::DecoderConfig;
pub use model::Model;

/// Version number of this library.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
