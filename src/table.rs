use crate::harmony::HarmonicFunction;
use crate::key::{Order, TransitionKey};
use crate::mood::Mood;
use std::collections::BTreeMap;

/// Next-function weights for a single transition key.
/// Sums to 1.0 after training; merged lookups may hold raw sums.
pub type Distribution = BTreeMap<HarmonicFunction, f64>;

/// All transitions observed under one mood.
pub type MoodTransitions = BTreeMap<TransitionKey, Distribution>;

/// Immutable once built. Reloading produces a new table.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProbabilityTable {
    order: Order,
    moods: BTreeMap<Mood, MoodTransitions>,
}

impl ProbabilityTable {
    pub fn empty(order: Order) -> Self {
        ProbabilityTable {
            order,
            moods: BTreeMap::new(),
        }
    }

    /// Every key in `moods` must have the given order.
    pub(crate) fn from_parts(order: Order, moods: BTreeMap<Mood, MoodTransitions>) -> Self {
        debug_assert!(moods
            .values()
            .flat_map(|t| t.keys())
            .all(|k| k.order() == order));
        ProbabilityTable { order, moods }
    }

    pub fn order(&self) -> Order {
        self.order
    }

    pub fn moods(&self) -> impl Iterator<Item = (Mood, &MoodTransitions)> {
        self.moods.iter().map(|(m, t)| (*m, t))
    }

    pub fn transitions(&self, mood: Mood) -> Option<&MoodTransitions> {
        self.moods.get(&mood)
    }

    pub fn distribution(&self, mood: Mood, key: &TransitionKey) -> Option<&Distribution> {
        self.moods.get(&mood)?.get(key)
    }

    pub fn contains_mood(&self, mood: Mood) -> bool {
        self.moods.contains_key(&mood)
    }

    /// Number of (mood, key) entries.
    pub fn entry_count(&self) -> usize {
        self.moods.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entry_count() == 0
    }
}
