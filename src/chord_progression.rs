use crate::harmony::{ChordSymbol, HarmonicFunction, EXTENSIONS};
use crate::key::Order;
use crate::mood::Mood;
use crate::sampler::{Ranking, Resolution, Sampler};
use crate::table::ProbabilityTable;
use log::debug;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// An append-only sequence of chords. Always holds at least the starting chord.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Progression {
    chords: Vec<ChordSymbol>,
}

impl Progression {
    pub fn new(start: ChordSymbol) -> Self {
        Progression {
            chords: vec![start],
        }
    }

    pub fn chords(&self) -> &[ChordSymbol] {
        &self.chords
    }

    pub fn len(&self) -> usize {
        self.chords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chords.is_empty()
    }

    pub fn last(&self) -> &ChordSymbol {
        // `new` seeds one chord and nothing removes chords.
        &self.chords[self.chords.len() - 1]
    }

    /// Functions of the trailing `n` chords (fewer if the progression is shorter).
    pub fn trailing_functions(&self, n: usize) -> Vec<HarmonicFunction> {
        let start = self.chords.len().saturating_sub(n);
        self.chords[start..].iter().map(ChordSymbol::function).collect()
    }

    pub(crate) fn push(&mut self, chord: ChordSymbol) {
        self.chords.push(chord);
    }

    /// What an external renderer needs to voice this progression.
    pub fn render_request(&self, beats_per_chord: f32) -> RenderRequest {
        RenderRequest {
            chords: self.chords.iter().map(ToString::to_string).collect(),
            beats_per_chord,
        }
    }
}

impl fmt::Display for Progression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .chords
            .iter()
            .map(ChordSymbol::as_str)
            .collect::<Vec<_>>()
            .join(" → ");
        f.write_str(&joined)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderRequest {
    pub chords: Vec<String>,
    pub beats_per_chord: f32,
}

/// How the chord of a [`Step`] was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepSource {
    /// Not enough history yet; repeated the previous chord's function.
    Opening,
    /// Drawn from the model.
    Sampled(Resolution),
    /// Function picked by the caller (e.g. an accepted suggestion).
    Chosen,
    /// Exact chord supplied by the caller.
    Manual,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub chord: ChordSymbol,
    pub function: HarmonicFunction,
    pub source: StepSource,
}

/// Grows progressions one chord at a time for a fixed mood.
#[derive(Debug, Clone, Copy)]
pub struct ProgressionBuilder<'a> {
    sampler: Sampler<'a>,
    mood: Mood,
    extensions: bool,
}

impl<'a> ProgressionBuilder<'a> {
    pub fn new(table: &'a ProbabilityTable, mood: Mood) -> Self {
        ProgressionBuilder {
            sampler: Sampler::new(table),
            mood,
            extensions: false,
        }
    }

    pub fn with_extensions(mut self, extensions: bool) -> Self {
        self.extensions = extensions;
        self
    }

    pub fn mood(&self) -> Mood {
        self.mood
    }

    pub fn order(&self) -> Order {
        self.sampler.order()
    }

    /// Whether `progression` is long enough to key a full-order lookup.
    pub fn has_full_history(&self, progression: &Progression) -> bool {
        progression.len() >= self.order().depth()
    }

    /// Appends exactly one chord.
    pub fn extend<R: Rng + ?Sized>(&self, progression: &mut Progression, rng: &mut R) -> Step {
        let (function, source) = if self.has_full_history(progression) {
            let history = progression.trailing_functions(self.order().depth());
            let draw = self.sampler.draw(self.mood, &history, rng);
            (draw.function, StepSource::Sampled(draw.resolution))
        } else {
            (progression.last().function(), StepSource::Opening)
        };
        self.push_function(progression, function, source, rng)
    }

    /// Appends a chord of the given function, bypassing the model.
    pub fn extend_with<R: Rng + ?Sized>(
        &self,
        progression: &mut Progression,
        function: HarmonicFunction,
        rng: &mut R,
    ) -> Step {
        self.push_function(progression, function, StepSource::Chosen, rng)
    }

    /// Appends the caller's chord verbatim.
    pub fn extend_manual(&self, progression: &mut Progression, chord: ChordSymbol) -> Step {
        let step = Step {
            function: chord.function(),
            chord: chord.clone(),
            source: StepSource::Manual,
        };
        progression.push(chord);
        step
    }

    /// Ranked next-function suggestions for the current end of `progression`.
    pub fn suggestions(&self, progression: &Progression) -> Ranking {
        let history = progression.trailing_functions(self.order().depth());
        self.sampler.rank_next(self.mood, &history)
    }

    /// `start` followed by `length - 1` generated chords.
    pub fn generate<R: Rng + ?Sized>(
        &self,
        start: ChordSymbol,
        length: usize,
        rng: &mut R,
    ) -> Progression {
        let mut progression = Progression::new(start);
        while progression.len() < length {
            self.extend(&mut progression, rng);
        }
        progression
    }

    /// Picks a chord of `function` uniformly, coloured if extensions are on.
    pub fn chord_for<R: Rng + ?Sized>(
        &self,
        function: HarmonicFunction,
        rng: &mut R,
    ) -> ChordSymbol {
        let choices = function.chords();
        let chord = ChordSymbol::from_vocabulary(choices[rng.gen_range(0..choices.len())]);
        if self.extensions {
            chord.with_extension(EXTENSIONS.choose(rng).copied().unwrap_or_default())
        } else {
            chord
        }
    }

    fn push_function<R: Rng + ?Sized>(
        &self,
        progression: &mut Progression,
        function: HarmonicFunction,
        source: StepSource,
        rng: &mut R,
    ) -> Step {
        let chord = self.chord_for(function, rng);
        debug!("{:?}: {} -> {}", source, function, chord);
        progression.push(chord.clone());
        Step {
            chord,
            function,
            source,
        }
    }
}
