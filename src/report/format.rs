use super::ServiceGroups;
use crate::api::types::{Incident, Status};
use chrono::{DateTime, FixedOffset, SecondsFormat};
use std::fmt;
use std::io::{self, Write};

/// Short outcome text shown at the end of each report line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    ResolvedBy(String),
    ResolvedByApi,
    AcknowledgedBy {
        name: String,
        at: DateTime<FixedOffset>,
    },
    /// Acknowledged, but the API listed nobody.
    UnknownAcknowledger,
    Open,
    /// Status we don't recognize; carries whatever resolver the API sent.
    Unset(Option<String>),
}

impl Resolution {
    pub fn for_incident(incident: &Incident) -> Self {
        let resolver = incident.resolved_by_user.name().map(str::to_string);
        match &incident.status {
            Status::Resolved => match resolver {
                Some(name) => Resolution::ResolvedBy(name),
                None => Resolution::ResolvedByApi,
            },
            // only the first acknowledger is reported
            Status::Acknowledged => match incident.acknowledgers.first() {
                Some(ack) => Resolution::AcknowledgedBy {
                    name: ack.object.name.clone(),
                    at: ack.at,
                },
                None => Resolution::UnknownAcknowledger,
            },
            Status::Triggered => Resolution::Open,
            Status::Other(_) => Resolution::Unset(resolver),
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resolution::ResolvedBy(name) => write!(f, "resolved by: {}", name),
            Resolution::ResolvedByApi => f.write_str("API"),
            Resolution::AcknowledgedBy { name, at } => write!(f, "{} - {}", name, timestamp(at)),
            Resolution::UnknownAcknowledger => f.write_str("unknown"),
            Resolution::Open => f.write_str("open"),
            Resolution::Unset(resolver) => f.write_str(resolver.as_deref().unwrap_or_default()),
        }
    }
}

pub fn timestamp(at: &DateTime<FixedOffset>) -> String {
    at.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// Missing timestamps print as an empty field.
fn optional_timestamp(at: Option<&DateTime<FixedOffset>>) -> String {
    at.map(timestamp).unwrap_or_default()
}

/// `service,number,description,created,last_change,status,resolution`
pub fn format_line(service: &str, incident: &Incident) -> String {
    format!(
        "{},{},{},{},{},{},{}",
        service,
        incident.incident_number,
        incident.trigger_summary_data.description,
        optional_timestamp(incident.created_on.as_ref()),
        optional_timestamp(incident.last_status_change_on.as_ref()),
        incident.status,
        Resolution::for_incident(incident),
    )
}

pub fn format_header(service: &str, count: usize) -> String {
    format!("Category {}: count: {}", service, count)
}

pub fn write_report<W: Write>(out: &mut W, groups: &ServiceGroups) -> io::Result<()> {
    for (service, incidents) in groups.iter() {
        writeln!(out, "{}", format_header(service, incidents.len()))?;
        for incident in incidents {
            writeln!(out, "{}", format_line(service, incident))?;
        }
    }
    out.flush()
}
