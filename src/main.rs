use anyhow::Context;
use chordchain::chord_progression::ProgressionBuilder;
use chordchain::config::{load_config, validate_config, Config};
use chordchain::harmony::{classify, ChordSymbol, HarmonicFunction};
use chordchain::sampler::Sampler;
use chordchain::session::{write_ranking, Session};
use chordchain::train::{MalformedPolicy, Trainer};
use chordchain::util::seeded_rng;
use chordchain::{codec, dataset, Mood, Order};
use clap::{Parser, Subcommand};
use log::warn;
use std::io;
use std::path::PathBuf;

/// Mood-conditioned Markov chord progression generator
#[derive(Parser)]
#[command(name = "chordchain")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    /// JSON configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Text seed for reproducible output
    #[arg(short, long, global = true)]
    seed: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Synthesize a rule-based training dataset
    SynthDataset {
        #[arg(short, long, default_value = "chords_dataset.json")]
        output: PathBuf,

        #[arg(long)]
        sessions: Option<usize>,

        #[arg(long)]
        max_length: Option<usize>,
    },
    /// Train a probability table from a dataset
    Train {
        dataset: PathBuf,

        #[arg(short, long, default_value = "markov_probabilities.json")]
        output: PathBuf,

        /// Model order (1 or 2)
        #[arg(long)]
        order: Option<u8>,

        /// Skip malformed samples instead of rejecting the dataset
        #[arg(long)]
        skip_malformed: bool,
    },
    /// Generate a progression from a trained model
    Generate {
        #[arg(short, long, default_value = "markov_probabilities.json")]
        model: PathBuf,

        /// Starting chord (C, Am, F, ...)
        #[arg(long, default_value = "C")]
        start: String,

        /// Mood name or menu number (1-4)
        #[arg(long)]
        mood: Option<String>,

        #[arg(short, long)]
        length: Option<usize>,

        /// Add 7/9 colour to generated chords
        #[arg(long)]
        extensions: bool,

        /// Print a render request as JSON instead of the chord line
        #[arg(long)]
        json: bool,
    },
    /// Build a progression step by step from ranked suggestions
    Interactive {
        #[arg(short, long, default_value = "markov_probabilities.json")]
        model: PathBuf,

        #[arg(long, default_value = "C")]
        start: String,

        #[arg(long)]
        mood: Option<String>,

        #[arg(long)]
        extensions: bool,

        #[arg(long)]
        json: bool,
    },
    /// Show ranked next functions for a mood and history
    Inspect {
        #[arg(short, long, default_value = "markov_probabilities.json")]
        model: PathBuf,

        #[arg(long)]
        mood: Option<String>,

        /// Function names or chords, oldest first
        history: Vec<String>,
    },
    /// Show default configuration
    ShowConfig,
    /// Validate configuration file
    ValidateConfig { path: PathBuf },
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => load_config(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => Config::default(),
    };
    if cli.seed.is_some() {
        config.seed = cli.seed.clone();
    }
    let mut rng = seeded_rng(config.seed.as_deref());

    match cli.command {
        Commands::SynthDataset {
            output,
            sessions,
            max_length,
        } => {
            if let Some(sessions) = sessions {
                config.dataset.sessions = sessions;
            }
            if let Some(max_length) = max_length {
                config.dataset.max_length = max_length;
            }
            validate_config(&config)?;

            let samples = dataset::synthesize(&config.dataset, &mut rng);
            dataset::save_samples(&samples, &output)?;
            println!("Dataset created: {} samples", samples.len());
            println!("Saved as: {}", output.display());
        }
        Commands::Train {
            dataset,
            output,
            order,
            skip_malformed,
        } => {
            if let Some(order) = order {
                config.model.order = Order::try_from(order).map_err(anyhow::Error::msg)?;
            }
            if skip_malformed {
                config.model.malformed = MalformedPolicy::Skip;
            }

            let samples = dataset::load_samples(&dataset)
                .with_context(|| format!("reading dataset {}", dataset.display()))?;
            let trainer = Trainer::new(config.model.order, config.model.malformed);
            let (table, report) = trainer.train(&samples)?;
            codec::save(&table, &output)?;

            if report.malformed > 0 {
                warn!("{} malformed samples were skipped", report.malformed);
            }
            println!("Saved trained Markov model → {}", output.display());
        }
        Commands::Generate {
            model,
            start,
            mood,
            length,
            extensions,
            json,
        } => {
            let table = codec::load(&model)
                .with_context(|| format!("loading model {}", model.display()))?;
            let mood = resolve_mood(mood.as_deref(), config.generation.mood);
            let length = length.unwrap_or(config.generation.length);
            let builder = ProgressionBuilder::new(&table, mood)
                .with_extensions(extensions || config.generation.extensions);

            let progression = builder.generate(resolve_start(&start), length, &mut rng);
            if json {
                let request = progression.render_request(config.generation.beats_per_chord);
                println!("{}", serde_json::to_string_pretty(&request)?);
            } else {
                println!("{}", progression);
            }
        }
        Commands::Interactive {
            model,
            start,
            mood,
            extensions,
            json,
        } => {
            let table = codec::load(&model)
                .with_context(|| format!("loading model {}", model.display()))?;
            let mood = resolve_mood(mood.as_deref(), config.generation.mood);
            let builder = ProgressionBuilder::new(&table, mood)
                .with_extensions(extensions || config.generation.extensions);

            let mut session = Session::start(builder, resolve_start(&start), &mut rng);
            session.run(io::stdin().lock(), &mut io::stdout(), &mut rng)?;
            let progression = session.finish();

            println!("\nFinal progression:");
            if json {
                let request = progression.render_request(config.generation.beats_per_chord);
                println!("{}", serde_json::to_string_pretty(&request)?);
            } else {
                println!("{}", progression);
            }
        }
        Commands::Inspect {
            model,
            mood,
            history,
        } => {
            let table = codec::load(&model)
                .with_context(|| format!("loading model {}", model.display()))?;
            let mood = resolve_mood(mood.as_deref(), config.generation.mood);
            let history: Vec<HarmonicFunction> = history
                .iter()
                .map(|s| HarmonicFunction::from_name(s).unwrap_or_else(|| classify(s)))
                .collect();

            let ranking = Sampler::new(&table).rank_next(mood, &history);
            println!("{:?} resolution for '{}' after {:?}", ranking.resolution, mood, history);
            write_ranking(&ranking, &mut io::stdout())?;
        }
        Commands::ShowConfig => {
            let config = Config::default();
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        Commands::ValidateConfig { path } => {
            let config = load_config(path)?;
            println!("Configuration is valid");
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
    }

    Ok(())
}

fn resolve_mood(input: Option<&str>, default: Mood) -> Mood {
    match input {
        None => default,
        Some(input) => {
            let mood = Mood::parse_lenient(input);
            if mood == Mood::Mixed && Mood::from_name(input).is_none() && input.trim() != "4" {
                warn!("Unknown mood '{}', using mixed", input);
            }
            mood
        }
    }
}

fn resolve_start(input: &str) -> ChordSymbol {
    ChordSymbol::parse(input).unwrap_or_else(|| {
        warn!("Invalid chord '{}'. Using C.", input);
        ChordSymbol::default()
    })
}
