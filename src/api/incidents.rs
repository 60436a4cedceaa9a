use super::IncidentClient;
use crate::api::types::IncidentsResponse;
use crate::config::DateRange;
use anyhow::{Context, Result};
use tracing::debug;

const BOUND_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%:z";

/// One page of the incident listing.
#[allow(async_fn_in_trait)]
pub trait IncidentsApi {
    async fn get_incidents(&self, range: &DateRange, offset: u64) -> Result<IncidentsResponse>;
}

/// Query pairs for one page. The bounds carry the offset of the requested
/// timezone so the server cannot read them in the account's zone.
pub fn incident_query(range: &DateRange, offset: u64) -> Vec<(&'static str, String)> {
    vec![
        ("since", range.start.format(BOUND_FORMAT).to_string()),
        ("until", range.end.format(BOUND_FORMAT).to_string()),
        ("time_zone", range.time_zone.name().to_string()),
        ("offset", offset.to_string()),
    ]
}

impl IncidentsApi for IncidentClient {
    async fn get_incidents(&self, range: &DateRange, offset: u64) -> Result<IncidentsResponse> {
        let url = format!("{}/api/v1/incidents", self.config.base_url);
        let query = incident_query(range, offset);
        debug!(url = %url, ?query, "Requesting incidents page");

        let response = self
            .client
            .get(&url)
            .header("Authorization", self.authorization())
            .header("Accept", "application/json")
            .query(&query)
            .send()
            .await
            .context("Failed to send incidents request")?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            anyhow::bail!("Incidents request failed with status: {} - {}", status, text);
        }

        let text = response
            .text()
            .await
            .context("Failed to read incidents response")?;

        let page = serde_json::from_str::<IncidentsResponse>(&text)
            .context("Failed to parse incidents response")?;
        debug!(
            count = page.incidents.len(),
            limit = page.limit,
            offset = page.offset,
            total = page.total,
            "Received incidents page"
        );
        Ok(page)
    }
}
