pub mod api;
pub mod config;
pub mod report;

use anyhow::{Context, Result};
use api::IncidentClient;
use config::Config;
use report::collect::{CollectSummary, collect_incidents};
use std::io::Write;
use tracing::info;

/// Fetches every incident in the configured range and writes the grouped
/// report to `out`.
pub async fn run<W: Write>(config: &Config, out: &mut W) -> Result<CollectSummary> {
    info!(
        since = %config.range.since,
        until = %config.range.until,
        time_zone = %config.range.time_zone,
        "Building incident report"
    );

    let client = IncidentClient::new(config.api.clone())?;
    let (groups, summary) = collect_incidents(&client, &config.range).await?;

    report::format::write_report(out, &groups).context("Failed to write report")?;
    info!(
        pages = summary.pages,
        incidents = summary.incidents,
        services = groups.service_count(),
        "Report complete"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ApiConfig, DateRange};
    use chrono::NaiveDate;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn incident_json(number: u64, service: &str, status: &str, extra: serde_json::Value) -> serde_json::Value {
        let mut incident = json!({
            "id": format!("P{number}"),
            "incident_number": number,
            "created_on": "2016-04-28T09:00:00+08:00",
            "status": status,
            "service": { "id": "S1", "name": service },
            "trigger_summary_data": { "description": format!("alert {number}") },
            "last_status_change_on": "2016-04-28T09:30:00+08:00"
        });
        if let (Some(object), Some(extra)) = (incident.as_object_mut(), extra.as_object()) {
            for (key, value) in extra {
                object.insert(key.clone(), value.clone());
            }
        }
        incident
    }

    #[tokio::test]
    async fn writes_full_report_from_api() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/incidents"))
            .and(header("Authorization", "Token token=t0k"))
            .and(query_param("since", "2016-04-28T00:00:00+08:00"))
            .and(query_param("until", "2016-04-28T23:59:59+08:00"))
            .and(query_param("offset", "0"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "incidents": [
                    incident_json(11, "web", "resolved", json!({ "resolved_by_user": { "name": "alice" } })),
                    incident_json(12, "db", "acknowledged", json!({
                        "acknowledgers": [{ "at": "2016-04-28T09:10:00+08:00", "object": { "name": "bob" } }]
                    })),
                ],
                "limit": 2, "offset": 0, "total": 3
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/v1/incidents"))
            .and(query_param("offset", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "incidents": [incident_json(13, "web", "triggered", json!({}))],
                "limit": 2, "offset": 2, "total": 3
            })))
            .expect(1)
            .mount(&server)
            .await;

        let day = NaiveDate::from_ymd_opt(2016, 4, 28).unwrap();
        let config = Config {
            api: ApiConfig {
                base_url: server.uri(),
                token: "t0k".to_string(),
                timeout: None,
            },
            range: DateRange::new(day, day, chrono_tz::Asia::Singapore).unwrap(),
            verbose: false,
        };

        let mut out = Vec::new();
        let summary = run(&config, &mut out).await.unwrap();

        assert_eq!(summary.pages, 2);
        assert_eq!(summary.incidents, 3);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Category db: count: 1\n\
             db,12,alert 12,2016-04-28T09:00:00+08:00,2016-04-28T09:30:00+08:00,acknowledged,bob - 2016-04-28T09:10:00+08:00\n\
             Category web: count: 2\n\
             web,11,alert 11,2016-04-28T09:00:00+08:00,2016-04-28T09:30:00+08:00,resolved,resolved by: alice\n\
             web,13,alert 13,2016-04-28T09:00:00+08:00,2016-04-28T09:30:00+08:00,triggered,open\n"
        );
    }
}
