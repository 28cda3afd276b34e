use reqwest::Url;
use serde::Serialize;

use crate::error::{ClientError, Result};

/// Path of the dataset endpoint, relative to the base url.
pub const DATASET_PATH: &str = "dataset";

/// Query string of `GET <base>/dataset`.
#[derive(Debug, Serialize, PartialEq, Eq, Clone, Copy)]
pub struct DatasetQuery {
    pub set_index: usize,
}

impl DatasetQuery {
    pub fn new(set_index: usize) -> Self {
        DatasetQuery { set_index }
    }
}

impl From<usize> for DatasetQuery {
    fn from(set_index: usize) -> Self {
        DatasetQuery::new(set_index)
    }
}

/// Parses a base url, rejecting anything that cannot carry a path.
pub fn parse_base_url(input: &str) -> Result<Url> {
    let url = input
        .parse::<Url>()
        .map_err(|_| ClientError::InvalidUrl(input.to_string()))?;
    if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
        return Err(ClientError::InvalidUrl(input.to_string()));
    }
    Ok(url)
}

/// Appends `segment` to the path of `base`.
///
/// Unlike [`Url::join`] the last segment of the base is kept, so
/// `http://host/api` becomes `http://host/api/dataset`.
pub fn endpoint(base: &Url, segment: &str) -> Result<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| ClientError::InvalidUrl(base.to_string()))?
        .pop_if_empty()
        .push(segment);
    url.set_query(None);
    Ok(url)
}
