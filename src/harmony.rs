use serde::{Deserialize, Serialize};
use std::fmt;

/// The structural role a chord plays within the key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HarmonicFunction {
    Tonic,
    Predominant,
    Dominant,
}

impl HarmonicFunction {
    pub const ALL: [HarmonicFunction; 3] = [
        HarmonicFunction::Tonic,
        HarmonicFunction::Predominant,
        HarmonicFunction::Dominant,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            HarmonicFunction::Tonic => "tonic",
            HarmonicFunction::Predominant => "predominant",
            HarmonicFunction::Dominant => "dominant",
        }
    }

    /// Strict inverse of [`HarmonicFunction::name`].
    pub fn from_name(name: &str) -> Option<Self> {
        HarmonicFunction::ALL
            .into_iter()
            .find(|f| f.name() == name)
    }

    /// The vocabulary chords carrying this function.
    pub fn chords(&self) -> &'static [&'static str] {
        match self {
            HarmonicFunction::Tonic => &["C", "Am", "Em"],
            HarmonicFunction::Predominant => &["F", "Dm"],
            HarmonicFunction::Dominant => &["G", "Bdim"],
        }
    }
}

impl fmt::Display for HarmonicFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The diatonic chords of the key, in scale order.
pub const KEY_CHORDS: [&str; 7] = ["C", "Dm", "Em", "F", "G", "Am", "Bdim"];

/// Colour suffixes appended to generated chords when extensions are enabled.
pub const EXTENSIONS: [&str; 3] = ["", "7", "9"];

/// Function of a bare vocabulary chord, if it is one.
pub fn lookup(base: &str) -> Option<HarmonicFunction> {
    HarmonicFunction::ALL
        .into_iter()
        .find(|f| f.chords().contains(&base))
}

/// Classifies a chord symbol, ignoring any extension suffix. Unknown symbols are tonic.
pub fn classify(symbol: &str) -> HarmonicFunction {
    lookup(strip_extension(symbol)).unwrap_or(HarmonicFunction::Tonic)
}

/// Removes a trailing extension (`7`, `9`, `13`, `maj7`, ...) from a chord symbol.
pub fn strip_extension(symbol: &str) -> &str {
    let trimmed = symbol.trim();
    let without_digits = trimmed.trim_end_matches(|c: char| c.is_ascii_digit());
    if without_digits.len() == trimmed.len() {
        return trimmed;
    }
    match without_digits.strip_suffix("maj") {
        Some(base) if !base.is_empty() => base,
        _ => without_digits,
    }
}

/// Title-cases user input: `"am7"` becomes `"Am7"`, `"BDIM"` becomes `"Bdim"`.
pub fn normalize(input: &str) -> String {
    let mut chars = input.trim().chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// A chord symbol whose base is a known vocabulary entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ChordSymbol(String);

impl ChordSymbol {
    /// Normalizes `input` and accepts it only if its base chord is in the vocabulary.
    pub fn parse(input: &str) -> Option<Self> {
        let symbol = normalize(input);
        lookup(strip_extension(&symbol))?;
        Some(ChordSymbol(symbol))
    }

    pub(crate) fn from_vocabulary(base: &'static str) -> Self {
        ChordSymbol(base.to_string())
    }

    pub fn with_extension(mut self, extension: &str) -> Self {
        self.0.push_str(extension);
        self
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn base(&self) -> &str {
        strip_extension(&self.0)
    }

    pub fn function(&self) -> HarmonicFunction {
        classify(&self.0)
    }
}

impl Default for ChordSymbol {
    fn default() -> Self {
        ChordSymbol::from_vocabulary("C")
    }
}

impl fmt::Display for ChordSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use HarmonicFunction::*;

    #[test]
    fn test_classify_vocabulary() {
        assert_eq!(classify("C"), Tonic);
        assert_eq!(classify("Am"), Tonic);
        assert_eq!(classify("Em"), Tonic);
        assert_eq!(classify("F"), Predominant);
        assert_eq!(classify("Dm"), Predominant);
        assert_eq!(classify("G"), Dominant);
        assert_eq!(classify("Bdim"), Dominant);
    }

    #[test]
    fn test_classify_ignores_extensions() {
        assert_eq!(classify("G7"), Dominant);
        assert_eq!(classify("Dm9"), Predominant);
        assert_eq!(classify("Fmaj7"), Predominant);
        assert_eq!(classify("Bdim7"), Dominant);
        assert_eq!(classify("C13"), Tonic);
    }

    #[test]
    fn test_unknown_symbols_default_to_tonic() {
        for symbol in ["", "X", "E", "D7", "Gsus4", "not a chord"] {
            assert_eq!(classify(symbol), Tonic, "{symbol:?}");
        }
    }

    #[test]
    fn test_every_key_chord_has_a_function() {
        for chord in KEY_CHORDS {
            assert!(lookup(chord).is_some(), "{chord}");
        }
    }

    #[test]
    fn test_function_names() {
        for function in HarmonicFunction::ALL {
            assert_eq!(HarmonicFunction::from_name(function.name()), Some(function));
        }
        assert_eq!(HarmonicFunction::from_name("Tonic"), None);
        assert_eq!(HarmonicFunction::from_name("subdominant"), None);
    }

    #[test]
    fn test_chord_symbol_parse() {
        assert_eq!(ChordSymbol::parse(" am ").unwrap().as_str(), "Am");
        assert_eq!(ChordSymbol::parse("BDIM").unwrap().as_str(), "Bdim");
        assert_eq!(ChordSymbol::parse("g7").unwrap().function(), Dominant);
        assert!(ChordSymbol::parse("H").is_none());
        assert!(ChordSymbol::parse("").is_none());
    }

    #[test]
    fn test_chord_symbol_extension() {
        let chord = ChordSymbol::from_vocabulary("Dm").with_extension("9");
        assert_eq!(chord.to_string(), "Dm9");
        assert_eq!(chord.base(), "Dm");
        assert_eq!(chord.function(), Predominant);
    }
}
