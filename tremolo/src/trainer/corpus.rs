//! Corpus reading and writing.
//!
//! A corpus is a sequence of sentence blocks terminated by `EOS` lines.
//! Each block holds tab-separated tagged lines; feature lists are CSV
//! fields so features may contain commas when quoted:
//!
//! ```text
//! T<TAB>surface<TAB>0|1<TAB>feat,feat,...   token (flag: possible trigger)
//! C<TAB>type<TAB>surface                    argument candidate
//! F<TAB>token<TAB>candidate<TAB>feat,...    pair text features
//! E<TAB>token<TAB>type<TAB>cand:Role,...    gold event
//! EOS
//! ```
//!
//! Lines starting with `#` are skipped.

use std::io::{BufRead, BufReader, BufWriter, Read, Write};

use crate::errors::{Result, TremoloError};
use crate::instance::{Candidate, EventAnnotation, SentenceInstance, Token};
use crate::utils;

/// One training or evaluation sentence.
pub struct Example {
    instance: SentenceInstance,
}

impl Example {
    /// Wraps an instance as an example.
    pub fn new(instance: SentenceInstance) -> Self {
        Self { instance }
    }

    /// Gets the annotated instance.
    pub fn instance(&self) -> &SentenceInstance {
        &self.instance
    }

    /// Writes the example as one sentence block.
    ///
    /// # Errors
    ///
    /// An I/O error is returned when the sink fails.
    pub fn write<W>(&self, wtr: W) -> Result<()>
    where
        W: Write,
    {
        let mut wtr = BufWriter::new(wtr);
        for token in self.instance.tokens() {
            let flag = if token.is_possible_trigger() { "1" } else { "0" };
            write!(&mut wtr, "T\t{}\t{}\t", token.surface(), flag)?;
            utils::write_csv_row(&mut wtr, token.text_features())?;
            writeln!(&mut wtr)?;
        }
        for candidate in self.instance.candidates() {
            writeln!(
                &mut wtr,
                "C\t{}\t{}",
                candidate.mention_type(),
                candidate.surface()
            )?;
        }
        for i in 0..self.instance.len() {
            for k in 0..self.instance.candidates().len() {
                let features = self.instance.edge_text_features(i, k);
                if features.is_empty() {
                    continue;
                }
                write!(&mut wtr, "F\t{i}\t{k}\t")?;
                utils::write_csv_row(&mut wtr, features)?;
                writeln!(&mut wtr)?;
            }
        }
        for event in self.instance.gold_events() {
            write!(&mut wtr, "E\t{}\t{}\t", event.trigger_index, event.event_type)?;
            let arguments: Vec<String> = event
                .arguments
                .iter()
                .map(|(k, role)| format!("{k}:{role}"))
                .collect();
            utils::write_csv_row(&mut wtr, &arguments)?;
            writeln!(&mut wtr)?;
        }
        writeln!(&mut wtr, "EOS")?;
        Ok(())
    }
}

#[derive(Default)]
struct Block {
    tokens: Vec<Token>,
    candidates: Vec<Candidate>,
    edge_features: Vec<(usize, usize, Vec<String>)>,
    events: Vec<EventAnnotation>,
    seen: bool,
}

impl Block {
    fn finish(self) -> Result<Example> {
        let mut instance = SentenceInstance::new(self.tokens, self.candidates);
        for (i, k, features) in self.edge_features {
            instance.set_edge_text_features(i, k, features)?;
        }
        for event in self.events {
            instance.add_gold_event(event)?;
        }
        Ok(Example::new(instance))
    }
}

/// A set of examples.
pub struct Corpus {
    examples: Vec<Example>,
}

impl Corpus {
    /// Reads a corpus.
    ///
    /// # Errors
    ///
    /// [`TremoloError`] is returned when a line is malformed or an index
    /// is out of range.
    pub fn from_reader<R>(rdr: R) -> Result<Self>
    where
        R: Read,
    {
        let reader = BufReader::new(rdr);
        let mut examples = vec![];
        let mut block = Block::default();
        for (line_no, line) in reader.lines().enumerate() {
            let line = line?;
            let line = line.trim_end_matches(['\r', '\n']);
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if line == "EOS" {
                examples.push(std::mem::take(&mut block).finish()?);
                continue;
            }
            block.seen = true;
            let cols: Vec<&str> = line.split('\t').collect();
            let malformed = || {
                TremoloError::invalid_format(
                    "corpus",
                    format!("line {}: malformed line: {line}", line_no + 1),
                )
            };
            match cols.as_slice() {
                ["T", surface, flag, features] => {
                    let possible_trigger = match *flag {
                        "0" => false,
                        "1" => true,
                        _ => return Err(malformed()),
                    };
                    block.tokens.push(
                        Token::new(*surface, parse_features(features))
                            .possible_trigger(possible_trigger),
                    );
                }
                ["C", mention_type, surface] => {
                    block.candidates.push(Candidate::new(*mention_type, *surface));
                }
                ["F", token, candidate, features] => {
                    let i: usize = token.parse()?;
                    let k: usize = candidate.parse()?;
                    block.edge_features.push((i, k, parse_features(features)));
                }
                ["E", trigger, event_type, arguments] => {
                    let trigger_index: usize = trigger.parse()?;
                    let mut parsed = vec![];
                    for field in parse_features(arguments) {
                        let Some((k, role)) = field.split_once(':') else {
                            return Err(malformed());
                        };
                        parsed.push((k.parse::<usize>()?, role.to_string()));
                    }
                    block
                        .events
                        .push(EventAnnotation::new(trigger_index, *event_type, parsed));
                }
                ["E", trigger, event_type] => {
                    let trigger_index: usize = trigger.parse()?;
                    block
                        .events
                        .push(EventAnnotation::new(trigger_index, *event_type, vec![]));
                }
                _ => return Err(malformed()),
            }
        }
        if block.seen {
            examples.push(block.finish()?);
        }
        Ok(Self { examples })
    }

    /// Gets the examples in corpus order.
    pub fn examples(&self) -> &[Example] {
        &self.examples
    }

    /// Returns the number of examples.
    pub fn len(&self) -> usize {
        self.examples.len()
    }

    /// Checks if the corpus has no examples.
    pub fn is_empty(&self) -> bool {
        self.examples.is_empty()
    }
}

fn parse_features(field: &str) -> Vec<String> {
    if field.is_empty() {
        return vec![];
    }
    utils::parse_csv_row(field)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SENTENCE: &str = "\
T\tsoldiers\t0\tw=soldiers,pos=NNS
T\tattacked\t1\tw=attacked,pos=VBD
T\tvillage\t0\tw=village,pos=NN
C\tPER\tsoldiers
C\tGPE\tvillage
F\t1\t0\tpath=nsubj,type=PER
F\t1\t1\tpath=dobj,type=GPE
E\t1\tAttack\t0:Agent,1:Place
EOS
";

    #[test]
    fn test_parse_sentence_block() {
        let corpus = Corpus::from_reader(SENTENCE.as_bytes()).unwrap();
        assert_eq!(corpus.len(), 1);
        let inst = corpus.examples()[0].instance();
        assert_eq!(inst.len(), 3);
        assert!(!inst.token(0).is_possible_trigger());
        assert!(inst.token(1).is_possible_trigger());
        assert_eq!(inst.candidates().len(), 2);
        assert_eq!(inst.candidates()[1].mention_type(), "GPE");
        assert_eq!(inst.edge_text_features(1, 0), ["path=nsubj", "type=PER"]);
        assert!(inst.edge_text_features(0, 0).is_empty());
        let event = &inst.gold_events()[0];
        assert_eq!(event.trigger_index, 1);
        assert_eq!(event.event_type, "Attack");
        assert_eq!(event.arguments[1], (1, "Place".to_string()));
    }

    #[test]
    fn test_write_round_trip() {
        let corpus = Corpus::from_reader(SENTENCE.as_bytes()).unwrap();
        let mut buf = vec![];
        corpus.examples()[0].write(&mut buf).unwrap();
        let reread = Corpus::from_reader(buf.as_slice()).unwrap();
        let a = corpus.examples()[0].instance();
        let b = reread.examples()[0].instance();
        assert_eq!(a.len(), b.len());
        assert_eq!(a.gold_events(), b.gold_events());
        assert_eq!(a.edge_text_features(1, 1), b.edge_text_features(1, 1));
    }

    #[test]
    fn test_rejects_out_of_range_indices() {
        let bad = "T\ta\t1\tw=a\nF\t3\t0\tx\nEOS\n";
        assert!(Corpus::from_reader(bad.as_bytes()).is_err());
    }

    #[test]
    fn test_rejects_malformed_flag() {
        let bad = "T\ta\tyes\tw=a\nEOS\n";
        assert!(Corpus::from_reader(bad.as_bytes()).is_err());
    }

    #[test]
    fn test_event_without_arguments() {
        let block = "T\tdied\t1\tw=died\nE\t0\tDie\nEOS\n";
        let corpus = Corpus::from_reader(block.as_bytes()).unwrap();
        let event = &corpus.examples()[0].instance().gold_events()[0];
        assert!(event.arguments.is_empty());
    }
}
