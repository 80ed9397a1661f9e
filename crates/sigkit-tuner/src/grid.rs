//! Parameter grids.

use serde_json::Value;
use std::collections::BTreeMap;

use sigkit_core::error::TunerError;
use sigkit_strategy::SignalParams;

/// Names accepted in a grid.
pub const TUNABLE_PARAMS: &[&str] = &[
    "ema_fast",
    "ema_slow",
    "sma_trend",
    "atr_period",
    "tp_atr",
    "sl_atr",
    "ratio_min_threshold",
    "fallback_count",
];

/// One point of the grid: parameter name to value.
pub type ParamSet = BTreeMap<String, f64>;

/// Candidate values per tunable parameter.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParamGrid {
    params: BTreeMap<String, Vec<f64>>,
}

impl ParamGrid {
    /// Build a grid, rejecting unknown names and empty candidate lists.
    pub fn new(params: BTreeMap<String, Vec<f64>>) -> Result<Self, TunerError> {
        if params.is_empty() {
            return Err(TunerError::InvalidGrid("grid has no parameters".into()));
        }
        for (name, values) in &params {
            if !TUNABLE_PARAMS.contains(&name.as_str()) {
                return Err(TunerError::UnknownParameter(name.clone()));
            }
            if values.is_empty() {
                return Err(TunerError::InvalidGrid(format!("'{}' has no candidate values", name)));
            }
        }
        Ok(Self { params })
    }

    /// Parse `{"name": [v1, v2, ...], ...}`. A scalar is a one-value list.
    pub fn from_json(text: &str) -> Result<Self, TunerError> {
        let value: Value =
            serde_json::from_str(text).map_err(|e| TunerError::InvalidGrid(e.to_string()))?;
        let Value::Object(map) = value else {
            return Err(TunerError::InvalidGrid("grid must be a JSON object".into()));
        };

        let mut params = BTreeMap::new();
        for (name, raw) in map {
            let items = match raw {
                Value::Array(items) => items,
                scalar => vec![scalar],
            };
            let values = items
                .iter()
                .map(|v| {
                    v.as_f64().ok_or_else(|| {
                        TunerError::InvalidGrid(format!("'{}' values must be numbers", name))
                    })
                })
                .collect::<Result<Vec<f64>, _>>()?;
            params.insert(name, values);
        }
        Self::new(params)
    }

    /// Named preset grid.
    pub fn preset(name: &str) -> Result<Self, TunerError> {
        match name {
            "simple" => Self::new(BTreeMap::from([
                ("atr_period".to_string(), vec![10.0, 14.0]),
                ("ema_fast".to_string(), vec![5.0, 9.0]),
                ("ema_slow".to_string(), vec![21.0, 50.0]),
            ])),
            other => Err(TunerError::UnknownPreset(other.to_string())),
        }
    }

    pub fn names(&self) -> Vec<&str> {
        self.params.keys().map(String::as_str).collect()
    }

    /// Number of combinations.
    pub fn size(&self) -> usize {
        self.params.values().map(Vec::len).product()
    }

    /// Cartesian product of all candidate values.
    pub fn combinations(&self) -> Vec<ParamSet> {
        let mut out = vec![ParamSet::new()];
        for (name, values) in &self.params {
            out = out
                .into_iter()
                .flat_map(|partial| {
                    values.iter().map(move |&v| {
                        let mut next = partial.clone();
                        next.insert(name.clone(), v);
                        next
                    })
                })
                .collect();
        }
        out
    }
}

fn as_period(name: &str, value: f64) -> Result<usize, TunerError> {
    if value.fract() != 0.0 || value < 1.0 || !value.is_finite() {
        return Err(TunerError::InvalidValue {
            name: name.to_string(),
            value,
        });
    }
    Ok(value as usize)
}

fn as_non_negative(name: &str, value: f64) -> Result<f64, TunerError> {
    if !value.is_finite() || value < 0.0 {
        return Err(TunerError::InvalidValue {
            name: name.to_string(),
            value,
        });
    }
    Ok(value)
}

/// Overlay a grid point on base parameters.
pub fn apply_params(base: &SignalParams, set: &ParamSet) -> Result<SignalParams, TunerError> {
    let mut params = base.clone();
    for (name, &value) in set {
        match name.as_str() {
            "ema_fast" => params.ema_fast = as_period(name, value)?,
            "ema_slow" => params.ema_slow = as_period(name, value)?,
            "sma_trend" => params.sma_trend = as_period(name, value)?,
            "atr_period" => params.atr_period = as_period(name, value)?,
            "fallback_count" => params.fallback_count = as_period(name, value)?,
            "tp_atr" => params.tp_atr = as_non_negative(name, value)?,
            "sl_atr" => params.sl_atr = as_non_negative(name, value)?,
            "ratio_min_threshold" => params.ratio_min_threshold = as_non_negative(name, value)?,
            other => return Err(TunerError::UnknownParameter(other.to_string())),
        }
    }
    Ok(params)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_json() {
        let json = r#"{"atr_period":[10,14],"ema_fast":[5,9],"ema_slow":[21,50]}"#;
        let grid = ParamGrid::from_json(json).unwrap();
        assert_eq!(grid.size(), 8);
        assert_eq!(grid.names(), vec!["atr_period", "ema_fast", "ema_slow"]);
        assert_eq!(grid, ParamGrid::preset("simple").unwrap());
    }

    #[test]
    fn test_scalar_is_single_value() {
        let grid = ParamGrid::from_json(r#"{"tp_atr": 2.5}"#).unwrap();
        assert_eq!(grid.combinations(), vec![ParamSet::from([("tp_atr".to_string(), 2.5)])]);
    }

    #[test]
    fn test_rejects_bad_grids() {
        assert!(matches!(
            ParamGrid::from_json(r#"{"rsi_period":[14]}"#),
            Err(TunerError::UnknownParameter(_))
        ));
        for json in [r#"{"ema_fast":[]}"#, r#"{"ema_fast":["x"]}"#] {
            assert!(matches!(ParamGrid::from_json(json), Err(TunerError::InvalidGrid(_))));
        }
        assert!(matches!(ParamGrid::from_json("[1,2]"), Err(TunerError::InvalidGrid(_))));
        assert!(matches!(ParamGrid::from_json("{}"), Err(TunerError::InvalidGrid(_))));
        assert!(matches!(ParamGrid::preset("huge"), Err(TunerError::UnknownPreset(_))));
    }

    #[test]
    fn test_combinations_cover_product() {
        let combos = ParamGrid::preset("simple").unwrap().combinations();
        assert_eq!(combos.len(), 8);

        let mut seen: Vec<(f64, f64, f64)> = combos
            .iter()
            .map(|c| (c["atr_period"], c["ema_fast"], c["ema_slow"]))
            .collect();
        seen.sort_by(|a, b| a.partial_cmp(b).unwrap());
        seen.dedup();
        assert_eq!(seen.len(), 8);
    }

    #[test]
    fn test_apply_params() {
        let set = ParamSet::from([
            ("ema_fast".to_string(), 5.0),
            ("tp_atr".to_string(), 3.0),
        ]);
        let params = apply_params(&SignalParams::default(), &set).unwrap();
        assert_eq!(params.ema_fast, 5);
        assert_eq!(params.tp_atr, 3.0);
        assert_eq!(params.ema_slow, 21);

        let bad = ParamSet::from([("atr_period".to_string(), 2.5)]);
        assert!(matches!(
            apply_params(&SignalParams::default(), &bad),
            Err(TunerError::InvalidValue { .. })
        ));
    }
}
