//! Trigger times of detection points, accumulated over episodes.
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    fs::File,
    io::{BufReader, BufWriter},
    path::Path,
};

/// Trigger times of a detection point over several episodes.
///
/// Stored in compressed sparse row layout: the triggers of episode `k` are
/// `indices[indptr[k]..indptr[k + 1]]` and the episode lasted `eplength[k]` steps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectionPointSeries {
    /// Trigger steps of all episodes, concatenated.
    pub indices: Vec<usize>,

    /// Offsets of each episode in `indices`, starting with 0.
    pub indptr: Vec<usize>,

    /// Length of each episode.
    pub eplength: Vec<usize>,
}

impl Default for DetectionPointSeries {
    fn default() -> Self {
        Self {
            indices: vec![],
            indptr: vec![0],
            eplength: vec![],
        }
    }
}

impl DetectionPointSeries {
    /// Appends the triggers of an episode.
    pub fn push(&mut self, triggers: &[usize], eplength: usize) {
        let last = self.indptr.last().copied().unwrap_or(0);
        self.indices.extend_from_slice(triggers);
        self.indptr.push(last + triggers.len());
        self.eplength.push(eplength);
    }

    /// Number of episodes.
    pub fn episode_count(&self) -> usize {
        self.eplength.len()
    }

    /// Trigger steps of the `k`-th episode.
    pub fn episode_triggers(&self, k: usize) -> Option<&[usize]> {
        let start = *self.indptr.get(k)?;
        let end = *self.indptr.get(k + 1)?;
        self.indices.get(start..end)
    }
}

/// Detection point series keyed by detection point name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DetectionPointsResults(BTreeMap<String, DetectionPointSeries>);

impl DetectionPointsResults {
    /// Constructs empty results.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends the detection points reported at the end of an episode.
    pub fn push_episode(&mut self, points: &BTreeMap<String, Vec<usize>>, eplength: usize) {
        for (name, triggers) in points.iter() {
            self.0
                .entry(name.clone())
                .or_default()
                .push(triggers, eplength);
        }
    }

    /// Series of the given detection point.
    pub fn get(&self, name: &str) -> Option<&DetectionPointSeries> {
        self.0.get(name)
    }

    /// Iterates over the series.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &DetectionPointSeries)> {
        self.0.iter()
    }

    /// Number of detection points.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if no detection point was reported.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Saves the results as JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let wtr = BufWriter::new(File::create(path)?);
        serde_json::to_writer(wtr, &self)?;
        Ok(())
    }

    /// Loads results from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let rdr = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(rdr)?)
    }
}
