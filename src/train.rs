//! Counts (mood, key, next function) transitions and normalizes them into a
//! [`ProbabilityTable`].
//!
//! Counting happens in an accumulator local to [`Trainer::train`]; nothing
//! outlives the call except the returned table. The pass is deterministic.

use crate::dataset::RawSample;
use crate::error::TrainError;
use crate::harmony::{classify, HarmonicFunction};
use crate::key::{Order, TransitionKey};
use crate::mood::Mood;
use crate::table::{MoodTransitions, ProbabilityTable};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// What to do with a sample that is missing a field or names an unknown function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MalformedPolicy {
    /// Fail the whole batch; no table is produced.
    #[default]
    Reject,
    /// Drop the sample, log a warning and count it in the report.
    Skip,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TrainingReport {
    /// Samples that contributed a count.
    pub counted: usize,
    /// Well-formed samples whose history was shorter than the model order.
    pub too_short: usize,
    /// Malformed samples dropped under [`MalformedPolicy::Skip`].
    pub malformed: usize,
}

struct ParsedSample {
    mood: Mood,
    history: Vec<HarmonicFunction>,
    next: HarmonicFunction,
}

type Counts = BTreeMap<Mood, BTreeMap<TransitionKey, BTreeMap<HarmonicFunction, u64>>>;

#[derive(Debug, Clone, Copy, Default)]
pub struct Trainer {
    order: Order,
    policy: MalformedPolicy,
}

impl Trainer {
    pub fn new(order: Order, policy: MalformedPolicy) -> Self {
        Trainer { order, policy }
    }

    pub fn order(&self) -> Order {
        self.order
    }

    pub fn train(
        &self,
        samples: &[RawSample],
    ) -> Result<(ProbabilityTable, TrainingReport), TrainError> {
        info!(
            "Counting order-{} transitions over {} samples...",
            self.order.depth(),
            samples.len()
        );

        let mut counts = Counts::new();
        let mut report = TrainingReport::default();

        for (index, raw) in samples.iter().enumerate() {
            let sample = match parse_sample(raw) {
                Ok(sample) => sample,
                Err(reason) => match self.policy {
                    MalformedPolicy::Reject => {
                        return Err(TrainError::MalformedSample { index, reason })
                    }
                    MalformedPolicy::Skip => {
                        warn!("Skipping malformed sample #{}: {}", index, reason);
                        report.malformed += 1;
                        continue;
                    }
                },
            };

            let Some(key) = TransitionKey::from_history(&sample.history, self.order) else {
                debug!(
                    "Sample #{} has {} functions, fewer than order {}",
                    index,
                    sample.history.len(),
                    self.order.depth()
                );
                report.too_short += 1;
                continue;
            };

            *counts
                .entry(sample.mood)
                .or_default()
                .entry(key)
                .or_default()
                .entry(sample.next)
                .or_default() += 1;
            report.counted += 1;
        }

        let table = ProbabilityTable::from_parts(self.order, normalize(counts));
        info!(
            "Training complete: {} counted, {} too short, {} malformed, {} (mood, key) entries",
            report.counted,
            report.too_short,
            report.malformed,
            table.entry_count()
        );
        Ok((table, report))
    }
}

fn parse_sample(raw: &RawSample) -> Result<ParsedSample, String> {
    let mood_name = raw.mood.as_deref().ok_or("missing mood")?;
    let functions = raw.functions.as_ref().ok_or("missing function history")?;
    let next_chord = raw.next_chord.as_deref().ok_or("missing next chord")?;

    let mood = Mood::from_name(mood_name).unwrap_or_else(|| {
        debug!("Unknown mood '{}', counting as mixed", mood_name);
        Mood::Mixed
    });

    let history = functions
        .iter()
        .map(|name| {
            HarmonicFunction::from_name(name)
                .ok_or_else(|| format!("unknown harmonic function '{name}' in history"))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ParsedSample {
        mood,
        history,
        next: classify(next_chord),
    })
}

fn normalize(counts: Counts) -> BTreeMap<Mood, MoodTransitions> {
    counts
        .into_iter()
        .map(|(mood, keys)| {
            let transitions = keys
                .into_iter()
                .map(|(key, next_counts)| {
                    let total = next_counts.values().sum::<u64>() as f64;
                    let distribution = next_counts
                        .into_iter()
                        .map(|(function, count)| (function, count as f64 / total))
                        .collect();
                    (key, distribution)
                })
                .collect();
            (mood, transitions)
        })
        .collect()
}
