use std::error::Error;
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use clap::Parser;

use tremolo::constraints::TypeConstraints;
use tremolo::event::Event;
use tremolo::instance::EventAnnotation;
use tremolo::scorer::score_events;
use tremolo::trainer::{Corpus, Example, Trainer};
use tremolo::{Decoder, DecoderConfig};

#[derive(Parser, Debug)]
#[clap(name = "train", about = "Trains an event extraction model")]
struct Args {
    /// Training corpus.
    #[clap(short = 't', long)]
    train: PathBuf,

    /// Held-out corpus to decode and score after training.
    #[clap(short = 'e', long)]
    test: Option<PathBuf>,

    /// Output file for held-out predictions, in corpus format.
    #[clap(short = 'o', long)]
    output: Option<PathBuf>,

    /// Ontology definition (event/role/entity/independent/exception lines).
    #[clap(short = 'c', long)]
    ontology: Option<PathBuf>,

    /// Maximum number of training epochs.
    #[clap(short = 'i', long, default_value = "20")]
    iters: u64,

    /// Beam width of the joint decoder.
    #[clap(short = 'b', long, default_value = "4")]
    beam_width: usize,

    /// Feature order (0 = unigram, 1 = bigram).
    #[clap(short = 'g', long, default_value = "1")]
    order: u8,

    /// Disables global features.
    #[clap(long)]
    no_global: bool,

    /// Averages the weight vectors over epochs.
    #[clap(short = 'a', long)]
    averaged: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    eprintln!("Loading the training corpus...");
    let corpus = Corpus::from_reader(File::open(&args.train)?)?;
    eprintln!("{} sentences", corpus.len());

    let constraints = match &args.ontology {
        Some(path) => TypeConstraints::from_reader(File::open(path)?)?,
        None => TypeConstraints::new(),
    };

    let config = DecoderConfig::default()
        .beam_width(args.beam_width)
        .feature_order(args.order)
        .use_global_features(!args.no_global);

    eprintln!("Training...");
    let model = Trainer::new(constraints)
        .decoder_config(config)
        .max_iter(args.iters)
        .averaged(args.averaged)
        .train(&corpus)?;
    eprintln!("{} features", model.weights().len());

    let Some(test) = &args.test else {
        return Ok(());
    };

    eprintln!("Decoding the held-out corpus...");
    let test_corpus = Corpus::from_reader(File::open(test)?)?;
    let decoder = Decoder::joint(model, config)?;
    let mut worker = decoder.new_worker();

    let mut gold = vec![];
    let mut predicted = vec![];
    for example in test_corpus.examples() {
        worker.decode(example.instance());
        gold.push(
            example
                .instance()
                .gold_events()
                .iter()
                .map(Event::from)
                .collect::<Vec<_>>(),
        );
        predicted.push(worker.events().to_vec());
    }

    let scores = score_events(&gold, &predicted);
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

    if let Some(output) = &args.output {
        let mut wtr = BufWriter::new(File::create(output)?);
        for (example, events) in test_corpus.examples().iter().zip(&predicted) {
            let mut instance = example.instance().clone();
            instance.clear_gold_events();
            for event in events {
                instance.add_gold_event(EventAnnotation::from(event))?;
            }
            Example::new(instance).write(&mut wtr)?;
        }
        eprintln!("Predictions written to {}", output.display());
    }

    Ok(())
}
