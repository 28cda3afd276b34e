use std::sync::Arc;
use std::task::{Context, Poll};

use futures::future::BoxFuture;
use reqwest::Url;
use tower::Service;

use crate::dataset::Dataset;
use crate::error::{ClientError, Result};
use crate::request::{parse_base_url, DatasetQuery};

struct ClientRef {
    http: reqwest::Client,
    base_url: Url,
}

/// Handle to the dataset backend.
///
/// Cloning is cheap, every clone shares the same connection pool. The client
/// is also a [`Service`] taking a dataset index, which is how the dashboard
/// drives it.
#[derive(Clone)]
pub struct Client {
    client: Arc<ClientRef>,
}

impl Client {
    pub fn new(base_url: Url) -> Self {
        Client::with_http(reqwest::Client::new(), base_url)
    }

    /// Creates a [Client] from a pre-configured [reqwest::Client].
    pub fn with_http(http: reqwest::Client, base_url: Url) -> Self {
        Client {
            client: Arc::new(ClientRef { http, base_url }),
        }
    }

    /// Parses `base_url` and creates a [Client] for it.
    pub fn from_base(base_url: &str) -> Result<Self> {
        parse_base_url(base_url).map(Client::new)
    }

    pub fn base_url(&self) -> &Url {
        &self.client.base_url
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.client.http
    }
}

impl Service<usize> for Client {
    type Response = Option<Dataset>;
    type Error = ClientError;
    type Future = BoxFuture<'static, Result<Option<Dataset>>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, set_index: usize) -> Self::Future {
        let client = self.clone();
        Box::pin(async move { client.dataset(DatasetQuery::new(set_index)).await })
    }
}
