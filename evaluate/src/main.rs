use std::error::Error;
use std::fs::File;
use std::path::PathBuf;

use clap::Parser;

use tremolo::event::Event;
use tremolo::scorer::score_events;
use tremolo::trainer::Corpus;

#[derive(Parser, Debug)]
#[clap(
    name = "evaluate",
    about = "Scores a predicted corpus against a gold corpus"
)]
struct Args {
    /// Gold corpus.
    #[clap(short = 'g', long)]
    gold: PathBuf,

    /// Predicted corpus, aligned sentence by sentence with the gold one.
    #[clap(short = 'p', long)]
    predicted: PathBuf,
}

fn events_of(corpus: &Corpus) -> Vec<Vec<Event>> {
    corpus
        .examples()
        .iter()
        .map(|example| {
            example
                .instance()
                .gold_events()
                .iter()
                .map(Event::from)
                .collect()
        })
        .collect()
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let gold = Corpus::from_reader(File::open(&args.gold)?)?;
    let predicted = Corpus::from_reader(File::open(&args.predicted)?)?;
    if gold.len() != predicted.len() {
        return Err(format!(
            "corpora are not aligned: {} gold sentences vs {} predicted",
            gold.len(),
            predicted.len(),
        )
        .into());
    }

    let scores = score_events(&events_of(&gold), &events_of(&predicted));
    println!(
        "trigger:  P {:.4}  R {:.4}  F1 {:.4}  ({}/{}/{})",
        scores.trigger.precision(),
        scores.trigger.recall(),
        scores.trigger.f1(),
        scores.trigger.matched,
        scores.trigger.predicted,
        scores.trigger.gold,
    );
    println!(
        "argument: P {:.4}  R {:.4}  F1 {:.4}  ({}/{}/{})",
        scores.argument.precision(),
        scores.argument.recall(),
        scores.argument.f1(),
        scores.argument.matched,
        scores.argument.predicted,
        scores.argument.gold,
    );

    Ok(())
}
