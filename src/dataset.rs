use serde::Deserialize;

use crate::error::Result;
use crate::stats::{summarize, MedianRule, Summary};

/// Ordered sequence of numbers, as served by the backend or typed by the user.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    values: Vec<f64>,
}

impl Dataset {
    pub const fn new() -> Self {
        Dataset { values: Vec::new() }
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn push(&mut self, value: f64) {
        self.values.push(value);
    }

    pub fn summarize(&self, rule: MedianRule) -> Summary {
        summarize(&self.values, rule)
    }

    /// Decodes a response body.
    ///
    /// Accepts a bare array or an object with a `data` array. An empty body,
    /// `null`, or a `null` data field is no result at all.
    pub fn from_payload(body: &[u8]) -> Result<Option<Dataset>> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }
        let payload: Payload = serde_json::from_slice(body)?;
        let values = match payload {
            Payload::Bare(values) => values,
            Payload::Wrapped { data } => data,
        };
        Ok(values.map(Dataset::from))
    }
}

impl From<Vec<f64>> for Dataset {
    fn from(values: Vec<f64>) -> Self {
        Dataset { values }
    }
}

impl FromIterator<f64> for Dataset {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        Dataset {
            values: iter.into_iter().collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Payload {
    Bare(Option<Vec<f64>>),
    Wrapped {
        // Present but possibly null; a missing field is not a dataset.
        #[serde(deserialize_with = "Option::deserialize")]
        data: Option<Vec<f64>>,
    },
}
