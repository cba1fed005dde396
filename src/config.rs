use crate::error::ConfigError;
use crate::key::Order;
use crate::mood::Mood;
use crate::train::MalformedPolicy;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub model: ModelConfig,
    pub generation: GenerationConfig,
    pub dataset: DatasetConfig,
    /// Text seed for reproducible runs; entropy-seeded when absent.
    pub seed: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub order: Order,
    pub malformed: MalformedPolicy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    pub mood: Mood,
    pub length: usize,
    /// Append random 7/9 colour to generated chords.
    pub extensions: bool,
    /// Duration handed to the renderer for each chord.
    pub beats_per_chord: f32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            mood: Mood::Mixed,
            length: 8,
            extensions: false,
            beats_per_chord: 2.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetConfig {
    pub sessions: usize,
    pub max_length: usize,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            sessions: 10_000,
            max_length: 8,
        }
    }
}

pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.generation.length == 0 {
        return Err(ConfigError::Invalid(
            "generation.length must be at least 1".to_string(),
        ));
    }
    if !(config.generation.beats_per_chord.is_finite() && config.generation.beats_per_chord > 0.0)
    {
        return Err(ConfigError::Invalid(
            "generation.beats_per_chord must be positive".to_string(),
        ));
    }
    if config.dataset.max_length < 2 {
        return Err(ConfigError::Invalid(
            "dataset.max_length must be at least 2".to_string(),
        ));
    }
    Ok(())
}

/// Load configuration from JSON file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: Config = serde_json::from_str(&content)?;
    validate_config(&config)?;
    Ok(config)
}

/// Save configuration to JSON file
pub fn save_config<P: AsRef<Path>>(config: &Config, path: P) -> Result<(), ConfigError> {
    let content = serde_json::to_string_pretty(config)?;
    std::fs::write(path, content)?;
    Ok(())
}
