//! Next-function prediction over a [`ProbabilityTable`].
//!
//! Lookups go through a three-stage cascade, each stage consulted only when
//! the previous one produced no candidates:
//!
//! 1. exact `(mood, key)` match;
//! 2. for order-2 tables, every key in the mood sharing the most recent
//!    function, with weights summed per next function;
//! 3. the uniform fallback over all functions.
//!
//! A mood missing from the table is treated as [`Mood::Mixed`]. The cascade
//! always terminates with candidates, so neither [`Sampler::sample_next`] nor
//! [`Sampler::rank_next`] can fail.

use crate::harmony::HarmonicFunction;
use crate::key::{Order, TransitionKey};
use crate::mood::Mood;
use crate::table::{Distribution, ProbabilityTable};
use crate::util::weighted_choice;
use log::debug;
use rand::Rng;

/// Which cascade stage produced a set of candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Exact,
    Degraded,
    Uniform,
}

/// Ranking returned when neither an exact nor a degraded match exists.
pub const FALLBACK_RANKING: [(HarmonicFunction, f64); 3] = [
    (HarmonicFunction::Tonic, 0.34),
    (HarmonicFunction::Predominant, 0.33),
    (HarmonicFunction::Dominant, 0.33),
];

/// Weighted next-function candidates, in function order, with the stage that produced them.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidates {
    pub mood: Mood,
    pub resolution: Resolution,
    pub weights: Vec<(HarmonicFunction, f64)>,
}

/// A single sampled function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Draw {
    pub function: HarmonicFunction,
    pub resolution: Resolution,
}

/// Candidates sorted by weight, highest first.
#[derive(Debug, Clone, PartialEq)]
pub struct Ranking {
    pub resolution: Resolution,
    pub entries: Vec<(HarmonicFunction, f64)>,
}

impl Ranking {
    pub fn top(&self) -> Option<HarmonicFunction> {
        self.entries.first().map(|(f, _)| *f)
    }

    /// Function at a 1-based position, as shown to a user.
    pub fn at_position(&self, position: usize) -> Option<HarmonicFunction> {
        position
            .checked_sub(1)
            .and_then(|idx| self.entries.get(idx))
            .map(|(f, _)| *f)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Sampler<'a> {
    table: &'a ProbabilityTable,
}

impl<'a> Sampler<'a> {
    pub fn new(table: &'a ProbabilityTable) -> Self {
        Sampler { table }
    }

    pub fn table(&self) -> &'a ProbabilityTable {
        self.table
    }

    pub fn order(&self) -> Order {
        self.table.order()
    }

    /// Runs the cascade for `history`, most recent last. Only the trailing `order`
    /// entries are used.
    pub fn resolve(&self, mood: Mood, history: &[HarmonicFunction]) -> Candidates {
        let mood = if self.table.contains_mood(mood) {
            mood
        } else {
            Mood::Mixed
        };

        if let Some(weights) = self.exact(mood, history) {
            debug!("{} {:?}: exact match", mood, history);
            return Candidates {
                mood,
                resolution: Resolution::Exact,
                weights,
            };
        }

        if let Some(weights) = self.degraded(mood, history) {
            debug!("{} {:?}: degraded match on last function", mood, history);
            return Candidates {
                mood,
                resolution: Resolution::Degraded,
                weights,
            };
        }

        debug!("{} {:?}: uniform fallback", mood, history);
        Candidates {
            mood,
            resolution: Resolution::Uniform,
            weights: HarmonicFunction::ALL.into_iter().map(|f| (f, 1.0)).collect(),
        }
    }

    pub fn sample_next<R: Rng + ?Sized>(
        &self,
        mood: Mood,
        history: &[HarmonicFunction],
        rng: &mut R,
    ) -> HarmonicFunction {
        self.draw(mood, history, rng).function
    }

    /// Like [`Sampler::sample_next`], also reporting which stage fired.
    pub fn draw<R: Rng + ?Sized>(
        &self,
        mood: Mood,
        history: &[HarmonicFunction],
        rng: &mut R,
    ) -> Draw {
        let candidates = self.resolve(mood, history);
        let function = weighted_choice(&candidates.weights, rng).unwrap_or_else(|| {
            HarmonicFunction::ALL[rng.gen_range(0..HarmonicFunction::ALL.len())]
        });
        Draw {
            function,
            resolution: candidates.resolution,
        }
    }

    /// All candidates sorted by weight descending; equal weights keep function order.
    pub fn rank_next(&self, mood: Mood, history: &[HarmonicFunction]) -> Ranking {
        let candidates = self.resolve(mood, history);
        let entries = match candidates.resolution {
            Resolution::Uniform => FALLBACK_RANKING.to_vec(),
            Resolution::Exact | Resolution::Degraded => {
                let mut entries = candidates.weights;
                entries.sort_by(|(_, a), (_, b)| b.total_cmp(a));
                entries
            }
        };
        Ranking {
            resolution: candidates.resolution,
            entries,
        }
    }

    fn exact(
        &self,
        mood: Mood,
        history: &[HarmonicFunction],
    ) -> Option<Vec<(HarmonicFunction, f64)>> {
        let key = TransitionKey::from_history(history, self.table.order())?;
        positive_weights(self.table.distribution(mood, &key)?)
    }

    fn degraded(
        &self,
        mood: Mood,
        history: &[HarmonicFunction],
    ) -> Option<Vec<(HarmonicFunction, f64)>> {
        if self.table.order() != Order::Second {
            return None;
        }
        let last = *history.last()?;

        let mut merged = Distribution::new();
        for (key, dist) in self.table.transitions(mood)? {
            if key.last() != last {
                continue;
            }
            for (function, weight) in dist {
                *merged.entry(*function).or_default() += weight;
            }
        }
        positive_weights(&merged)
    }
}

fn positive_weights(dist: &Distribution) -> Option<Vec<(HarmonicFunction, f64)>> {
    let weights: Vec<_> = dist
        .iter()
        .filter(|(_, w)| w.is_finite() && **w > 0.0)
        .map(|(f, w)| (*f, *w))
        .collect();
    (!weights.is_empty()).then_some(weights)
}
