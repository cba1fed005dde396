//! Mood-conditioned Markov chord progression generator.
//!
//! A model is trained offline from labelled transition samples into a
//! probability table keyed by mood and the last one or two harmonic
//! functions, saved as JSON, and later queried to grow progressions either
//! automatically or interactively from ranked suggestions.

pub mod chord_progression;
pub mod codec;
pub mod config;
pub mod dataset;
pub mod error;
pub mod harmony;
pub mod key;
pub mod mood;
pub mod sampler;
pub mod session;
pub mod table;
pub mod train;
pub mod util;

pub use chord_progression::{Progression, ProgressionBuilder};
pub use config::Config;
pub use error::{ConfigError, ModelError, SessionError, TrainError};
pub use harmony::{classify, ChordSymbol, HarmonicFunction};
pub use key::{Order, TransitionKey};
pub use mood::Mood;
pub use sampler::{Ranking, Resolution, Sampler};
pub use session::Session;
pub use table::ProbabilityTable;
pub use train::{MalformedPolicy, Trainer};
