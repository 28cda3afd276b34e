use log::{debug, warn};

use crate::client::Client;
use crate::dataset::Dataset;
use crate::error::{ClientError, Result};
use crate::request::{endpoint, DatasetQuery, DATASET_PATH};

impl Client {
    /// Fetches one dataset, `GET <base>/dataset?set_index=<n>`.
    ///
    /// `Ok(None)` means the backend answered with an empty payload.
    pub async fn dataset(&self, query: DatasetQuery) -> Result<Option<Dataset>> {
        let url = endpoint(self.base_url(), DATASET_PATH)?;
        debug!("GET {} set_index={}", url, query.set_index);

        let response = self.http().get(url).query(&query).send().await?;
        let status = response.status();
        if !status.is_success() {
            warn!("Dataset {} answered with {}", query.set_index, status);
            return Err(ClientError::StatusError(status.as_u16()));
        }

        let body = response.bytes().await?;
        Dataset::from_payload(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_dataset_invalid_base() {
        // `endpoint` refuses bases that cannot carry a path.
        let client = Client::with_http(
            reqwest::Client::new(),
            "data:text/plain,hello".parse().unwrap(),
        );

        let result = client.dataset(DatasetQuery::new(0)).await;
        assert!(matches!(result, Err(ClientError::InvalidUrl(_))));
    }
}
