//! Human-in-the-loop progression building.
//!
//! A session shows ranked next-function suggestions and lets the user take
//! one by position or type a chord of their own. Rejected input leaves the
//! progression untouched.

use crate::chord_progression::{Progression, ProgressionBuilder, Step};
use crate::error::SessionError;
use crate::harmony::ChordSymbol;
use crate::sampler::Ranking;
use log::{info, warn};
use rand::Rng;
use std::io::{self, BufRead, Write};

/// One line of user input, parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Accept(usize),
    Override(String),
    Done,
}

impl Command {
    pub fn parse(input: &str) -> Self {
        let input = input.trim();
        if input.eq_ignore_ascii_case("done") {
            Command::Done
        } else if let Ok(position) = input.parse::<usize>() {
            Command::Accept(position)
        } else {
            Command::Override(input.to_string())
        }
    }
}

pub struct Session<'a> {
    builder: ProgressionBuilder<'a>,
    progression: Progression,
}

impl<'a> Session<'a> {
    /// Starts from `start`, filling opening chords until the model has a full history.
    pub fn start<R: Rng + ?Sized>(
        builder: ProgressionBuilder<'a>,
        start: ChordSymbol,
        rng: &mut R,
    ) -> Self {
        let mut session = Session {
            builder,
            progression: Progression::new(start),
        };
        session.fill_opening(rng);
        session
    }

    pub fn progression(&self) -> &Progression {
        &self.progression
    }

    pub fn suggestions(&self) -> Ranking {
        self.builder.suggestions(&self.progression)
    }

    /// Takes the suggestion at 1-based `position` and appends a chord of that function.
    pub fn accept<R: Rng + ?Sized>(
        &mut self,
        position: usize,
        rng: &mut R,
    ) -> Result<Step, SessionError> {
        let ranking = self.suggestions();
        let function = ranking
            .at_position(position)
            .ok_or(SessionError::InvalidPosition {
                position,
                available: ranking.len(),
            })?;
        Ok(self.builder.extend_with(&mut self.progression, function, rng))
    }

    /// Appends a user-typed chord if it is in the vocabulary.
    pub fn override_with(&mut self, input: &str) -> Result<Step, SessionError> {
        let chord =
            ChordSymbol::parse(input).ok_or_else(|| SessionError::UnknownChord(input.to_string()))?;
        Ok(self.builder.extend_manual(&mut self.progression, chord))
    }

    /// Discards the progression and starts over from `start`.
    pub fn reset<R: Rng + ?Sized>(&mut self, start: ChordSymbol, rng: &mut R) {
        info!("Session reset to {}", start);
        self.progression = Progression::new(start);
        self.fill_opening(rng);
    }

    pub fn finish(self) -> Progression {
        self.progression
    }

    /// Prompts on `out` and applies commands read from `input` until `done` or end of input.
    ///
    /// Unreadable or rejected lines are reported and the loop keeps going.
    pub fn run<I: BufRead, W: Write, R: Rng + ?Sized>(
        &mut self,
        mut input: I,
        out: &mut W,
        rng: &mut R,
    ) -> io::Result<()> {
        let mut buf = Vec::new();
        loop {
            writeln!(out, "\nCurrent progression:\n{}", self.progression)?;
            writeln!(out, "\nSuggestions (ranked):")?;
            write_ranking(&self.suggestions(), out)?;
            write!(out, "\nPick option number OR enter your own chord OR 'done': ")?;
            out.flush()?;

            buf.clear();
            if input.read_until(b'\n', &mut buf)? == 0 {
                return Ok(());
            }
            let line = match std::str::from_utf8(&buf) {
                Ok(line) => line,
                Err(e) => {
                    warn!("Ignoring unreadable input line: {}", e);
                    writeln!(out, "Could not read that line. Try again.")?;
                    continue;
                }
            };

            let result = match Command::parse(line) {
                Command::Done => return Ok(()),
                Command::Accept(position) => self.accept(position, rng),
                Command::Override(chord) => self.override_with(&chord),
            };
            match result {
                Ok(step) => info!("Added {} ({})", step.chord, step.function),
                Err(e) => writeln!(out, "{}. Try again (C, Am, Em, F, Dm, G, Bdim).", e)?,
            }
        }
    }

    fn fill_opening<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        while !self.builder.has_full_history(&self.progression) {
            let step = self.builder.extend(&mut self.progression, rng);
            info!("Opening chord chosen automatically: {}", step.chord);
        }
    }
}

pub fn write_ranking<W: Write>(ranking: &Ranking, out: &mut W) -> io::Result<()> {
    for (i, (function, weight)) in ranking.entries.iter().enumerate() {
        writeln!(out, "{}. {}  (prob={:.3})", i + 1, function, weight)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chord_progression::StepSource;
    use crate::dataset::RawSample;
    use crate::harmony::HarmonicFunction;
    use crate::key::Order;
    use crate::mood::Mood;
    use crate::table::ProbabilityTable;
    use crate::train::{MalformedPolicy, Trainer};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::io::Cursor;

    fn table(order: Order) -> ProbabilityTable {
        let samples = vec![
            RawSample::new("mixed", &["tonic", "tonic"], "G"),
            RawSample::new("mixed", &["tonic", "tonic"], "G"),
            RawSample::new("mixed", &["tonic", "tonic"], "F"),
        ];
        Trainer::new(order, MalformedPolicy::Reject)
            .train(&samples)
            .unwrap()
            .0
    }

    #[test]
    fn test_command_parse() {
        assert_eq!(Command::parse(" 2 "), Command::Accept(2));
        assert_eq!(Command::parse("DONE"), Command::Done);
        assert_eq!(Command::parse("am7"), Command::Override("am7".to_string()));
    }

    #[test]
    fn test_start_fills_opening_for_second_order() {
        let table = table(Order::Second);
        let mut rng = StdRng::seed_from_u64(1);
        let builder = ProgressionBuilder::new(&table, Mood::Mixed);
        let session = Session::start(builder, ChordSymbol::parse("C").unwrap(), &mut rng);
        assert_eq!(session.progression().len(), 2);
        assert_eq!(
            session.progression().chords()[1].function(),
            HarmonicFunction::Tonic
        );
    }

    #[test]
    fn test_start_needs_no_opening_for_first_order() {
        let table = table(Order::First);
        let mut rng = StdRng::seed_from_u64(1);
        let builder = ProgressionBuilder::new(&table, Mood::Mixed);
        let session = Session::start(builder, ChordSymbol::parse("C").unwrap(), &mut rng);
        assert_eq!(session.progression().len(), 1);
    }

    #[test]
    fn test_accept_ranked_suggestion() {
        let table = table(Order::Second);
        let mut rng = StdRng::seed_from_u64(2);
        let builder = ProgressionBuilder::new(&table, Mood::Mixed);
        let mut session = Session::start(builder, ChordSymbol::parse("Am").unwrap(), &mut rng);

        let ranking = session.suggestions();
        assert_eq!(ranking.top(), Some(HarmonicFunction::Dominant));

        let step = session.accept(2, &mut rng).unwrap();
        assert_eq!(step.function, HarmonicFunction::Predominant);
        assert_eq!(step.source, StepSource::Chosen);
        assert_eq!(session.progression().len(), 3);
    }

    #[test]
    fn test_invalid_input_leaves_state_unchanged() {
        let table = table(Order::Second);
        let mut rng = StdRng::seed_from_u64(3);
        let builder = ProgressionBuilder::new(&table, Mood::Mixed);
        let mut session = Session::start(builder, ChordSymbol::parse("C").unwrap(), &mut rng);
        let before = session.progression().clone();

        assert_eq!(
            session.accept(0, &mut rng),
            Err(SessionError::InvalidPosition {
                position: 0,
                available: 2
            })
        );
        assert_eq!(
            session.accept(7, &mut rng).unwrap_err(),
            SessionError::InvalidPosition {
                position: 7,
                available: 2
            }
        );
        assert_eq!(
            session.override_with("H7"),
            Err(SessionError::UnknownChord("H7".to_string()))
        );
        assert_eq!(session.progression(), &before);
    }

    #[test]
    fn test_manual_override_and_reset() {
        let table = table(Order::Second);
        let mut rng = StdRng::seed_from_u64(4);
        let builder = ProgressionBuilder::new(&table, Mood::Mixed);
        let mut session = Session::start(builder, ChordSymbol::parse("C").unwrap(), &mut rng);

        let step = session.override_with("bdim").unwrap();
        assert_eq!(step.chord.as_str(), "Bdim");
        assert_eq!(step.source, StepSource::Manual);
        assert_eq!(session.progression().last().as_str(), "Bdim");

        session.reset(ChordSymbol::parse("F").unwrap(), &mut rng);
        assert_eq!(session.progression().len(), 2);
        assert_eq!(session.progression().chords()[0].as_str(), "F");

        let progression = session.finish();
        assert_eq!(progression.len(), 2);
    }

    #[test]
    fn test_run_survives_unreadable_line() {
        let table = table(Order::Second);
        let mut rng = StdRng::seed_from_u64(5);
        let builder = ProgressionBuilder::new(&table, Mood::Mixed);
        let mut session = Session::start(builder, ChordSymbol::parse("C").unwrap(), &mut rng);

        let mut input = b"\xff\xfe\n".to_vec();
        input.extend_from_slice(b"dm\nH\n1\ndone\nG\n");
        let mut out = Vec::new();
        session.run(Cursor::new(input), &mut out, &mut rng).unwrap();

        let transcript = String::from_utf8(out).unwrap();
        assert!(transcript.contains("Could not read that line"));
        assert!(transcript.contains("Try again (C, Am"));
        assert_eq!(session.progression().len(), 4);
        assert_eq!(session.progression().chords()[2].as_str(), "Dm");
    }

    #[test]
    fn test_run_stops_at_end_of_input() {
        let table = table(Order::Second);
        let mut rng = StdRng::seed_from_u64(6);
        let builder = ProgressionBuilder::new(&table, Mood::Mixed);
        let mut session = Session::start(builder, ChordSymbol::parse("C").unwrap(), &mut rng);

        let mut out = Vec::new();
        session.run(Cursor::new(b"f".to_vec()), &mut out, &mut rng).unwrap();
        assert_eq!(session.progression().last().as_str(), "F");
    }
}
