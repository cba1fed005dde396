//! JSON persistence for [`ProbabilityTable`].
//!
//! The file is a flat, string-keyed record: mood name → encoded transition
//! key → function name → weight. Decoding is all-or-nothing.

use crate::error::ModelError;
use crate::harmony::HarmonicFunction;
use crate::key::{Order, TransitionKey};
use crate::mood::Mood;
use crate::table::{Distribution, MoodTransitions, ProbabilityTable};
use log::info;
use std::collections::BTreeMap;
use std::path::Path;

pub type PersistedModel = BTreeMap<String, BTreeMap<String, BTreeMap<String, f64>>>;

pub fn encode(table: &ProbabilityTable) -> PersistedModel {
    table
        .moods()
        .map(|(mood, transitions)| {
            let keys = transitions
                .iter()
                .map(|(key, dist)| {
                    let weights = dist
                        .iter()
                        .map(|(function, weight)| (function.name().to_string(), *weight))
                        .collect();
                    (key.encode(), weights)
                })
                .collect();
            (mood.name().to_string(), keys)
        })
        .collect()
}

/// Rebuilds a table, inferring its order from the keys. An empty model decodes as order 2.
pub fn decode(model: &PersistedModel) -> Result<ProbabilityTable, ModelError> {
    let mut order: Option<Order> = None;
    let mut moods = BTreeMap::new();

    for (mood_name, keys) in model {
        let mood = Mood::from_exact_name(mood_name)
            .ok_or_else(|| ModelError::UnknownMood(mood_name.clone()))?;
        let mut transitions = MoodTransitions::new();

        for (encoded, weights) in keys {
            let key = TransitionKey::decode(encoded).ok_or_else(|| ModelError::UndecodableKey {
                mood: mood_name.clone(),
                key: encoded.clone(),
            })?;
            match order {
                Some(existing) if existing != key.order() => return Err(ModelError::MixedOrders),
                _ => order = Some(key.order()),
            }

            let mut dist = Distribution::new();
            for (function_name, weight) in weights {
                let function = HarmonicFunction::from_name(function_name).ok_or_else(|| {
                    ModelError::UnknownFunction {
                        mood: mood_name.clone(),
                        key: encoded.clone(),
                        function: function_name.clone(),
                    }
                })?;
                if !weight.is_finite() || *weight < 0.0 {
                    return Err(ModelError::InvalidWeight {
                        mood: mood_name.clone(),
                        key: encoded.clone(),
                        function: function_name.clone(),
                        weight: *weight,
                    });
                }
                dist.insert(function, *weight);
            }
            transitions.insert(key, dist);
        }
        moods.insert(mood, transitions);
    }

    Ok(ProbabilityTable::from_parts(order.unwrap_or_default(), moods))
}

pub fn to_json(table: &ProbabilityTable) -> Result<String, ModelError> {
    Ok(serde_json::to_string_pretty(&encode(table))?)
}

pub fn from_json(json: &str) -> Result<ProbabilityTable, ModelError> {
    let model: PersistedModel = serde_json::from_str(json)?;
    decode(&model)
}

pub fn save<P: AsRef<Path>>(table: &ProbabilityTable, path: P) -> Result<(), ModelError> {
    std::fs::write(path.as_ref(), to_json(table)?)?;
    info!(
        "Saved order-{} model ({} entries) to {}",
        table.order().depth(),
        table.entry_count(),
        path.as_ref().display()
    );
    Ok(())
}

pub fn load<P: AsRef<Path>>(path: P) -> Result<ProbabilityTable, ModelError> {
    let content = std::fs::read_to_string(path.as_ref())?;
    let table = from_json(&content)?;
    info!(
        "Loaded order-{} model ({} entries) from {}",
        table.order().depth(),
        table.entry_count(),
        path.as_ref().display()
    );
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::RawSample;
    use crate::train::Trainer;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_encoded_layout() {
        let samples = vec![
            RawSample::new("mixed", &["tonic", "predominant"], "G"),
            RawSample::new("mixed", &["tonic", "predominant"], "Dm"),
        ];
        let (table, _) = Trainer::default().train(&samples).unwrap();
        let json: serde_json::Value = serde_json::from_str(&to_json(&table).unwrap()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "mixed": {
                    "tonic|predominant": { "predominant": 0.5, "dominant": 0.5 }
                }
            })
        );
    }

    #[test]
    fn test_table_survives_json() {
        let samples = vec![
            RawSample::new("mixed", &["tonic", "predominant"], "G"),
            RawSample::new("gentle motion", &["dominant", "tonic"], "F"),
            RawSample::new("gentle motion", &["dominant", "tonic"], "Am"),
        ];
        let (table, _) = Trainer::default().train(&samples).unwrap();
        let decoded = from_json(&to_json(&table).unwrap()).unwrap();
        assert_eq!(decoded, table);
    }

    #[test]
    fn test_first_order_model_decodes_as_first_order() {
        let table = from_json(r#"{"mixed": {"tonic": {"dominant": 1.0}}}"#).unwrap();
        assert_eq!(table.order(), Order::First);
        assert_eq!(table.entry_count(), 1);
    }

    #[test]
    fn test_decode_failures_are_fatal() {
        let cases = [
            r#"{"mixed": {"tonic|bogus": {"dominant": 1.0}}}"#,
            r#"{"mixed": {"tonic|tonic|tonic": {"dominant": 1.0}}}"#,
            r#"{"mixed": {"tonic|tonic": {"subdominant": 1.0}}}"#,
            r#"{"mixed": {"tonic|tonic": {"dominant": "high"}}}"#,
            r#"{"mixed": {"tonic|tonic": {"dominant": -0.5}}}"#,
            r#"{"sad": {"tonic|tonic": {"dominant": 1.0}}}"#,
            r#"{"MIXED": {"tonic|tonic": {"dominant": 1.0}}}"#,
            r#"{"mixed": {"tonic": {"tonic": 1.0}}, "MIXED": {"dominant": {"tonic": 1.0}}}"#,
            r#"{" mixed": {"tonic|tonic": {"dominant": 1.0}}}"#,
            r#"{"mixed": {"tonic": {"dominant": 1.0}, "tonic|tonic": {"dominant": 1.0}}}"#,
            r#"["not", "a", "model"]"#,
        ];
        for case in cases {
            assert!(from_json(case).is_err(), "{case}");
        }
    }

    #[test]
    fn test_mixed_orders_error() {
        let json = r#"{"mixed": {"dominant": {"tonic": 1.0}, "tonic|tonic": {"dominant": 1.0}}}"#;
        let err = from_json(json).unwrap_err();
        assert!(matches!(err, ModelError::MixedOrders));
    }

    #[test]
    fn test_trained_weights_round_trip_exactly() {
        let mut mismatches = Vec::new();
        for n in 2..60 {
            for k in 1..n {
                let mut samples = vec![RawSample::new("mixed", &["tonic", "tonic"], "G"); k];
                samples.extend(vec![RawSample::new("mixed", &["tonic", "tonic"], "F"); n - k]);
                let (table, _) = Trainer::default().train(&samples).unwrap();
                if from_json(&to_json(&table).unwrap()).unwrap() != table {
                    mismatches.push((k, n));
                }
            }
        }
        assert_eq!(mismatches, Vec::<(usize, usize)>::new());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        let samples = vec![RawSample::new("stable / floating", &["tonic", "tonic"], "Em")];
        let (table, _) = Trainer::default().train(&samples).unwrap();

        save(&table, &path).unwrap();
        assert_eq!(load(&path).unwrap(), table);
    }
}
