//! Model order and transition keys, including their persisted string encoding.
//!
//! The encoding is the single place that owns the `|` separator: an order-2
//! key `(older, newer)` is stored as `"older|newer"`, an order-1 key as the
//! bare function name.

use crate::harmony::HarmonicFunction;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const KEY_SEPARATOR: char = '|';

/// Number of prior functions consulted per prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Order {
    First,
    #[default]
    Second,
}

impl Order {
    pub fn depth(&self) -> usize {
        match self {
            Order::First => 1,
            Order::Second => 2,
        }
    }
}

impl TryFrom<u8> for Order {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Order::First),
            2 => Ok(Order::Second),
            other => Err(format!("model order must be 1 or 2, got {other}")),
        }
    }
}

impl From<Order> for u8 {
    fn from(order: Order) -> u8 {
        order.depth() as u8
    }
}

/// The recent history of functions a prediction is conditioned on, most recent last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TransitionKey {
    Single(HarmonicFunction),
    Pair(HarmonicFunction, HarmonicFunction),
}

impl TransitionKey {
    /// Key from the trailing `order` functions of `history`, or `None` if it is too short.
    pub fn from_history(history: &[HarmonicFunction], order: Order) -> Option<Self> {
        match (order, history) {
            (Order::First, [.., last]) => Some(TransitionKey::Single(*last)),
            (Order::Second, [.., older, newer]) => Some(TransitionKey::Pair(*older, *newer)),
            _ => None,
        }
    }

    pub fn order(&self) -> Order {
        match self {
            TransitionKey::Single(_) => Order::First,
            TransitionKey::Pair(..) => Order::Second,
        }
    }

    /// The most recent function in the key.
    pub fn last(&self) -> HarmonicFunction {
        match self {
            TransitionKey::Single(f) | TransitionKey::Pair(_, f) => *f,
        }
    }

    pub fn encode(&self) -> String {
        match self {
            TransitionKey::Single(f) => f.name().to_string(),
            TransitionKey::Pair(older, newer) => {
                format!("{}{KEY_SEPARATOR}{}", older.name(), newer.name())
            }
        }
    }

    /// Reverses [`TransitionKey::encode`], splitting on the first separator.
    pub fn decode(encoded: &str) -> Option<Self> {
        match encoded.split_once(KEY_SEPARATOR) {
            Some((older, newer)) => Some(TransitionKey::Pair(
                HarmonicFunction::from_name(older)?,
                HarmonicFunction::from_name(newer)?,
            )),
            None => HarmonicFunction::from_name(encoded).map(TransitionKey::Single),
        }
    }
}

impl fmt::Display for TransitionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}
