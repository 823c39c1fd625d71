use std::{future::Future, time::Duration};

use tokio::runtime::Builder;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Owns a current-thread runtime and a reqwest client so the adapters can
/// expose sync methods at the use-case trait seams.
#[derive(Debug)]
pub(super) struct HttpRunner {
    rt: tokio::runtime::Runtime,
    client: reqwest::Client,
}

impl HttpRunner {
    pub(super) fn new() -> Result<Self, String> {
        let rt = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|error| format!("failed to initialize async runtime: {error}"))?;

        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|error| format!("failed to build http client: {error}"))?;

        Ok(Self { rt, client })
    }

    pub(super) fn client(&self) -> &reqwest::Client {
        &self.client
    }

    pub(super) fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.rt.block_on(future)
    }
}
