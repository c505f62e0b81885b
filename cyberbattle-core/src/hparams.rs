//! Hyper-parameters of a training run.
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fs::File, io::Write, path::Path};

/// Value of a hyper-parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HParamValue {
    /// Integer value, including floats without fractional part.
    Int(i64),

    /// Floating point value.
    Float(f64),

    /// Text value. Parameters given without value are empty texts.
    Text(String),
}

impl HParamValue {
    /// Parses a value, preferring integers over floats over text.
    pub fn parse(s: &str) -> Self {
        match s.parse::<f64>() {
            Ok(v) if v.is_finite() && v == v.round() => HParamValue::Int(v as i64),
            Ok(v) => HParamValue::Float(v),
            Err(_) => HParamValue::Text(s.to_string()),
        }
    }

    /// Returns `true` for an empty text.
    pub fn is_empty(&self) -> bool {
        matches!(self, HParamValue::Text(s) if s.is_empty())
    }
}

impl From<i64> for HParamValue {
    fn from(v: i64) -> Self {
        HParamValue::Int(v)
    }
}

impl From<usize> for HParamValue {
    fn from(v: usize) -> Self {
        HParamValue::Int(v as i64)
    }
}

impl From<f64> for HParamValue {
    fn from(v: f64) -> Self {
        HParamValue::Float(v)
    }
}

impl From<bool> for HParamValue {
    fn from(v: bool) -> Self {
        HParamValue::Int(v as i64)
    }
}

impl From<&str> for HParamValue {
    fn from(v: &str) -> Self {
        HParamValue::Text(v.to_string())
    }
}

impl From<String> for HParamValue {
    fn from(v: String) -> Self {
        HParamValue::Text(v)
    }
}

impl<T: Into<HParamValue>> From<Option<T>> for HParamValue {
    fn from(v: Option<T>) -> Self {
        v.map_or_else(|| HParamValue::Text(String::new()), Into::into)
    }
}

/// Parses a learner parameter string such as `γ=0.015, replaymemory=10000, lr=0.01`.
///
/// `γ` is renamed to `gamma` and `replaymemory` to `replay_memory_size`.
/// Whitespace is ignored.
pub fn parse_parameters(s: &str) -> BTreeMap<String, HParamValue> {
    let s = s
        .replace('γ', "gamma")
        .replace("replaymemory", "replay_memory_size")
        .replace(['\n', ' '], "");
    s.split(',')
        .filter_map(|kv| {
            let mut it = kv.split('=');
            let key = it.next()?;
            if key.is_empty() {
                return None;
            }
            let value = it
                .next()
                .map_or_else(|| HParamValue::Text(String::new()), HParamValue::parse);
            Some((key.to_string(), value))
        })
        .collect()
}

/// Hyper-parameters with their discrete domains.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HParams {
    /// Hyper-parameters.
    pub hparams: BTreeMap<String, HParamValue>,

    /// Discrete domains of some hyper-parameters.
    pub hparam_domain_discrete: BTreeMap<String, Vec<HParamValue>>,
}

impl HParams {
    /// Constructs an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a hyper-parameter.
    pub fn insert(&mut self, k: impl Into<String>, v: impl Into<HParamValue>) {
        self.hparams.insert(k.into(), v.into());
    }

    /// Gets a hyper-parameter.
    pub fn get(&self, k: &str) -> Option<&HParamValue> {
        self.hparams.get(k)
    }

    /// Adds the parameters reported by a learner, then updates the discrete domains.
    pub fn extend_from_parameters(&mut self, s: &str) {
        self.hparams.extend(parse_parameters(s));
        self.update_domains();
    }

    fn update_domains(&mut self) {
        let domains: [(&str, Vec<HParamValue>); 3] = [
            (
                "gamma",
                [0.015, 0.25, 0.5, 0.8].iter().map(|&v| HParamValue::Float(v)).collect(),
            ),
            ("train_while_exploit", vec![HParamValue::Int(0), HParamValue::Int(1)]),
            ("reward_clip", vec![HParamValue::Int(0), HParamValue::Int(1)]),
        ];
        for (key, domain) in domains {
            if let Some(v) = self.hparams.get(key) {
                let domain = if v.is_empty() {
                    vec![HParamValue::Text(String::new())]
                } else {
                    domain
                };
                self.hparam_domain_discrete.insert(key.to_string(), domain);
            }
        }
    }

    /// Saves the table as YAML.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}
