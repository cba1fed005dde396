use crate::harmony::HarmonicFunction;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub enum Mood {
    #[serde(rename = "tension / drive")]
    TensionDrive,
    #[serde(rename = "stable / floating")]
    StableFloating,
    #[serde(rename = "gentle motion")]
    GentleMotion,
    #[serde(rename = "release / relief")]
    ReleaseRelief,
    #[default]
    #[serde(rename = "mixed")]
    Mixed,
}

impl Mood {
    pub const ALL: [Mood; 5] = [
        Mood::TensionDrive,
        Mood::StableFloating,
        Mood::GentleMotion,
        Mood::ReleaseRelief,
        Mood::Mixed,
    ];

    /// Moods offered by the menu and used for dataset synthesis, in menu order.
    pub const MENU: [Mood; 4] = [
        Mood::TensionDrive,
        Mood::StableFloating,
        Mood::GentleMotion,
        Mood::Mixed,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Mood::TensionDrive => "tension / drive",
            Mood::StableFloating => "stable / floating",
            Mood::GentleMotion => "gentle motion",
            Mood::ReleaseRelief => "release / relief",
            Mood::Mixed => "mixed",
        }
    }

    /// Strict inverse of [`Mood::name`].
    pub fn from_exact_name(name: &str) -> Option<Self> {
        Mood::ALL.into_iter().find(|m| m.name() == name)
    }

    /// Name match tolerant of surrounding whitespace and case.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Mood::ALL
            .into_iter()
            .find(|m| m.name().eq_ignore_ascii_case(name))
    }

    /// Accepts a mood name or a 1-based menu number; anything else is [`Mood::Mixed`].
    pub fn parse_lenient(input: &str) -> Self {
        let input = input.trim();
        if let Ok(choice) = input.parse::<usize>() {
            return choice
                .checked_sub(1)
                .and_then(|idx| Mood::MENU.get(idx).copied())
                .unwrap_or_default();
        }
        Mood::from_name(input).unwrap_or_default()
    }

    /// The mood a chord of the given function evokes on its own.
    pub fn of_function(function: HarmonicFunction) -> Self {
        match function {
            HarmonicFunction::Tonic => Mood::StableFloating,
            HarmonicFunction::Predominant => Mood::GentleMotion,
            HarmonicFunction::Dominant => Mood::TensionDrive,
        }
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
