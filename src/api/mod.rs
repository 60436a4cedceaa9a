pub mod incidents;
pub mod types;

use crate::config::ApiConfig;
use anyhow::{Context, Result};
use reqwest::Client;

#[derive(Clone, Debug)]
pub struct IncidentClient {
    pub(crate) client: Client,
    pub(crate) config: ApiConfig,
}

impl IncidentClient {
    pub fn new(config: ApiConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().context("Failed to build HTTP client")?;
        Ok(Self { client, config })
    }

    pub(crate) fn authorization(&self) -> String {
        format!("Token token={}", self.config.token)
    }
}
