use super::ServiceGroups;
use crate::api::incidents::IncidentsApi;
use crate::config::DateRange;
use anyhow::{Context, Result};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CollectSummary {
    pub pages: usize,
    pub incidents: usize,
    pub reported_total: u64,
}

/// Walks the paginated listing from offset 0 and groups every incident by
/// service.
///
/// Stops on the first empty page, when everything fit in one page
/// (`total <= limit`), or once the collected count reaches `total`, checked
/// in that order. The second offset is the page `limit`; later offsets are
/// the previous page's `offset` plus its size.
pub async fn collect_incidents<A: IncidentsApi>(
    api: &A,
    range: &DateRange,
) -> Result<(ServiceGroups, CollectSummary)> {
    let mut groups = ServiceGroups::new();
    let mut summary = CollectSummary::default();
    let mut offset = 0;

    loop {
        let call = summary.pages + 1;
        info!(call, offset, "Fetching incidents page");
        let page = api
            .get_incidents(range, offset)
            .await
            .with_context(|| format!("Failed to fetch incidents page {} (offset {})", call, offset))?;
        summary.pages = call;

        if page.incidents.is_empty() {
            info!(call, "No more incidents");
            break;
        }

        let page_len = page.incidents.len() as u64;
        summary.reported_total = page.total;
        groups.extend(page.incidents);
        summary.incidents = groups.incident_count();

        if page.total <= page.limit {
            break;
        }
        if summary.incidents as u64 >= page.total {
            break;
        }

        offset = if call == 1 {
            page.limit
        } else {
            page.offset.saturating_add(page_len)
        };
        info!(call, collected = summary.incidents, total = page.total, "Finished page");
    }

    if summary.incidents as u64 != summary.reported_total {
        warn!(
            collected = summary.incidents,
            reported = summary.reported_total,
            "Collected incident count differs from reported total"
        );
    }

    Ok((groups, summary))
}
