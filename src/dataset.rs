//! Transition samples: their on-disk shape and a rule-based synthesizer.
//!
//! The synthesizer walks the key using a fixed resolution map (dominant
//! resolves to tonic, predominant to dominant, tonic moves on to either) and
//! keeps only chords whose own mood matches the session mood, unless the
//! session is "mixed" or the filter leaves nothing.

use crate::config::DatasetConfig;
use crate::error::TrainError;
use crate::harmony::{classify, HarmonicFunction, KEY_CHORDS};
use crate::mood::Mood;
use log::info;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A well-formed transition sample.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransitionSample {
    pub context: Vec<String>,
    pub functions: Vec<HarmonicFunction>,
    pub mood: Mood,
    pub next_chord: String,
}

/// A sample as read from a dataset file. Fields are checked by the trainer.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawSample {
    #[serde(default)]
    pub context: Option<Vec<String>>,
    #[serde(default)]
    pub functions: Option<Vec<String>>,
    #[serde(default)]
    pub mood: Option<String>,
    #[serde(default)]
    pub next_chord: Option<String>,
}

impl RawSample {
    pub fn new(mood: &str, functions: &[&str], next_chord: &str) -> Self {
        RawSample {
            context: None,
            functions: Some(functions.iter().map(|f| f.to_string()).collect()),
            mood: Some(mood.to_string()),
            next_chord: Some(next_chord.to_string()),
        }
    }
}

impl From<TransitionSample> for RawSample {
    fn from(sample: TransitionSample) -> Self {
        RawSample {
            context: Some(sample.context),
            functions: Some(
                sample
                    .functions
                    .iter()
                    .map(|f| f.name().to_string())
                    .collect(),
            ),
            mood: Some(sample.mood.name().to_string()),
            next_chord: Some(sample.next_chord),
        }
    }
}

/// Functions a chord of the given function may resolve to.
pub fn resolution_targets(function: HarmonicFunction) -> &'static [HarmonicFunction] {
    match function {
        HarmonicFunction::Dominant => &[HarmonicFunction::Tonic],
        HarmonicFunction::Predominant => &[HarmonicFunction::Dominant],
        HarmonicFunction::Tonic => &[HarmonicFunction::Predominant, HarmonicFunction::Dominant],
    }
}

/// Candidate next chords after `prev` under the given mood, in key order.
pub fn suggest_next(prev: &str, mood: Mood) -> Vec<&'static str> {
    let targets = resolution_targets(classify(prev));
    let resolving = || {
        KEY_CHORDS
            .into_iter()
            .filter(|ch| targets.contains(&classify(ch)))
    };

    let candidates: Vec<&'static str> = resolving()
        .filter(|ch| mood == Mood::Mixed || Mood::of_function(classify(ch)) == mood)
        .collect();

    if candidates.is_empty() {
        resolving().collect()
    } else {
        candidates
    }
}

/// Generates `config.sessions` progressions and emits one sample per step.
pub fn synthesize<R: Rng + ?Sized>(config: &DatasetConfig, rng: &mut R) -> Vec<TransitionSample> {
    let mut dataset = Vec::new();

    for _ in 0..config.sessions {
        let mood = Mood::MENU[rng.gen_range(0..Mood::MENU.len())];
        let mut progression = vec![KEY_CHORDS[rng.gen_range(0..KEY_CHORDS.len())]];

        for _ in 1..config.max_length {
            let Some(prev) = progression.last() else {
                break;
            };
            let Some(next_chord) = suggest_next(prev, mood).choose(rng).copied() else {
                break;
            };

            dataset.push(TransitionSample {
                context: progression.iter().map(|ch| ch.to_string()).collect(),
                functions: progression.iter().map(|ch| classify(ch)).collect(),
                mood,
                next_chord: next_chord.to_string(),
            });
            progression.push(next_chord);
        }
    }

    info!(
        "Synthesized {} samples from {} sessions",
        dataset.len(),
        config.sessions
    );
    dataset
}

pub fn load_samples<P: AsRef<Path>>(path: P) -> Result<Vec<RawSample>, TrainError> {
    let content = std::fs::read_to_string(path)?;
    let samples: Vec<RawSample> = serde_json::from_str(&content)?;
    Ok(samples)
}

pub fn save_samples<P: AsRef<Path>>(
    samples: &[TransitionSample],
    path: P,
) -> Result<(), TrainError> {
    let content = serde_json::to_string_pretty(samples)?;
    std::fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_suggest_next_follows_resolution_map() {
        assert_eq!(suggest_next("G", Mood::Mixed), vec!["C", "Em", "Am"]);
        assert_eq!(suggest_next("F", Mood::Mixed), vec!["G", "Bdim"]);
        assert_eq!(suggest_next("C", Mood::Mixed), vec!["Dm", "F", "G", "Bdim"]);
    }

    #[test]
    fn test_suggest_next_filters_by_mood() {
        assert_eq!(suggest_next("C", Mood::TensionDrive), vec!["G", "Bdim"]);
        assert_eq!(suggest_next("Am", Mood::GentleMotion), vec!["Dm", "F"]);
        // Nothing stable follows a predominant, so the filter is dropped.
        assert_eq!(suggest_next("Dm", Mood::StableFloating), vec!["G", "Bdim"]);
    }

    #[test]
    fn test_synthesize_shapes() {
        let mut rng = StdRng::seed_from_u64(7);
        let config = DatasetConfig {
            sessions: 20,
            max_length: 5,
        };
        let samples = synthesize(&config, &mut rng);

        assert_eq!(samples.len(), 20 * 4);
        for sample in &samples {
            assert!(Mood::MENU.contains(&sample.mood));
            assert_eq!(sample.context.len(), sample.functions.len());
            assert!(!sample.functions.is_empty());
            assert!(KEY_CHORDS.contains(&sample.next_chord.as_str()));
        }
    }

    #[test]
    fn test_raw_sample_from_transition_sample() {
        let sample = TransitionSample {
            context: vec!["C".into(), "F".into()],
            functions: vec![HarmonicFunction::Tonic, HarmonicFunction::Predominant],
            mood: Mood::GentleMotion,
            next_chord: "G".into(),
        };
        let raw = RawSample::from(sample);
        assert_eq!(raw.mood.as_deref(), Some("gentle motion"));
        assert_eq!(
            raw.functions,
            Some(vec!["tonic".to_string(), "predominant".to_string()])
        );
    }

    #[test]
    fn test_missing_fields_deserialize_as_none() {
        let raw: Vec<RawSample> =
            serde_json::from_str(r#"[{"mood": "mixed", "next_chord": "G"}]"#).unwrap();
        assert_eq!(raw[0].functions, None);
        assert_eq!(raw[0].next_chord.as_deref(), Some("G"));
    }
}
