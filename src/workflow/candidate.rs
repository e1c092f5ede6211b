//! Ranked candidate lists produced by the dependent stages.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::record::Record;

/// Number of candidates every dependent stage returns.
pub const CANDIDATE_COUNT: usize = 3;

/// One generated option offered to the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    /// Position in generation order, 0-based
    pub candidate_id: usize,

    /// Stage-specific output fields
    pub output: Record,
}

/// Exactly [`CANDIDATE_COUNT`] candidates in generation order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CandidateSet(Vec<Candidate>);

impl CandidateSet {
    /// Build a set from generated options.
    ///
    /// Extra options are dropped. Missing slots, and options that are not
    /// JSON objects, are filled by `filler`, which receives the 0-based slot.
    pub fn from_options(options: Vec<Value>, filler: impl Fn(usize) -> Record) -> Self {
        let generated = options.len();
        let mut outputs: Vec<Record> = options
            .into_iter()
            .take(CANDIDATE_COUNT)
            .enumerate()
            .map(|(slot, option)| match option {
                Value::Object(output) => output,
                _ => filler(slot),
            })
            .collect();

        if generated < CANDIDATE_COUNT {
            tracing::warn!(generated, "Fewer options than expected, padding with placeholders");
        }
        while outputs.len() < CANDIDATE_COUNT {
            outputs.push(filler(outputs.len()));
        }

        Self::from_outputs(outputs)
    }

    /// Build a set where every slot comes from `make`.
    pub fn uniform(make: impl Fn(usize) -> Record) -> Self {
        Self::from_outputs((0..CANDIDATE_COUNT).map(make).collect())
    }

    fn from_outputs(outputs: Vec<Record>) -> Self {
        Self(
            outputs
                .into_iter()
                .enumerate()
                .map(|(candidate_id, output)| Candidate { candidate_id, output })
                .collect(),
        )
    }

    /// The candidates, ordered by `candidate_id`.
    pub fn as_slice(&self) -> &[Candidate] {
        &self.0
    }

    /// Iterate over the candidates in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Candidate> {
        self.0.iter()
    }

    /// Number of candidates; always [`CANDIDATE_COUNT`].
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> IntoIterator for &'a CandidateSet {
    type Item = &'a Candidate;
    type IntoIter = std::slice::Iter<'a, Candidate>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
