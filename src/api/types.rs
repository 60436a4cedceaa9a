use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Deserializer};
use std::fmt;

#[derive(Debug, Deserialize, Clone)]
pub struct IncidentsResponse {
    #[serde(default)]
    pub incidents: Vec<Incident>,
    pub limit: u64,
    pub offset: u64,
    pub total: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Incident {
    pub id: String,
    pub incident_number: u64,
    pub created_on: Option<DateTime<FixedOffset>>,
    pub status: Status,
    pub html_url: Option<String>,
    pub incident_key: Option<String>,
    pub service: ServiceRef,
    pub escalation_policy: Option<EscalationPolicyRef>,
    #[serde(default)]
    pub trigger_summary_data: TriggerSummaryData,
    pub last_status_change_on: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    pub resolved_by_user: Resolver,
    #[serde(default)]
    pub acknowledgers: Vec<Acknowledger>,
    pub urgency: Option<String>,
    #[serde(default)]
    pub number_of_escalations: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServiceRef {
    pub id: String,
    pub name: String,
    pub html_url: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EscalationPolicyRef {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct TriggerSummaryData {
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Acknowledger {
    pub at: DateTime<FixedOffset>,
    pub object: UserRef,
}

#[derive(Debug, Deserialize, Clone)]
pub struct UserRef {
    pub id: Option<String>,
    pub name: String,
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Triggered,
    Acknowledged,
    Resolved,
    Other(String),
}

impl From<String> for Status {
    fn from(value: String) -> Self {
        match value.as_str() {
            "triggered" => Status::Triggered,
            "acknowledged" => Status::Acknowledged,
            "resolved" => Status::Resolved,
            _ => Status::Other(value),
        }
    }
}

impl<'de> Deserialize<'de> for Status {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Status::from)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Triggered => f.write_str("triggered"),
            Status::Acknowledged => f.write_str("acknowledged"),
            Status::Resolved => f.write_str("resolved"),
            Status::Other(raw) => f.write_str(raw),
        }
    }
}

/// Who resolved an incident. The API sends either nothing, a plain string or
/// a user object; only the name is kept.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Resolver {
    #[default]
    Absent,
    Named(String),
}

impl Resolver {
    pub fn name(&self) -> Option<&str> {
        match self {
            Resolver::Absent => None,
            Resolver::Named(name) => Some(name),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawResolver {
    Name(String),
    User(UserRef),
}

impl<'de> Deserialize<'de> for Resolver {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<RawResolver>::deserialize(deserializer)?;
        Ok(match raw {
            None => Resolver::Absent,
            Some(RawResolver::Name(name)) => Resolver::Named(name),
            Some(RawResolver::User(user)) => Resolver::Named(user.name),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn incident_json(extra: serde_json::Value) -> serde_json::Value {
        let mut base = json!({
            "id": "PT4KHLK",
            "incident_number": 1234,
            "created_on": "2016-04-28T10:00:00+08:00",
            "status": "resolved",
            "service": { "id": "PSVC1", "name": "checkout" },
            "escalation_policy": { "id": "PEP1", "name": "Ops" },
            "trigger_summary_data": { "description": "CPU high" },
            "last_status_change_on": "2016-04-28T11:30:00+08:00"
        });
        if let (Some(base), Some(extra)) = (base.as_object_mut(), extra.as_object()) {
            for (k, v) in extra {
                base.insert(k.clone(), v.clone());
            }
        }
        base
    }

    #[test]
    fn missing_or_null_resolver_is_absent() {
        let incident: Incident = serde_json::from_value(incident_json(json!({}))).unwrap();
        assert_eq!(incident.resolved_by_user, Resolver::Absent);

        let incident: Incident =
            serde_json::from_value(incident_json(json!({ "resolved_by_user": null }))).unwrap();
        assert_eq!(incident.resolved_by_user, Resolver::Absent);
    }

    #[test]
    fn resolver_from_string_or_user_object() {
        let incident: Incident =
            serde_json::from_value(incident_json(json!({ "resolved_by_user": "alice" }))).unwrap();
        assert_eq!(incident.resolved_by_user, Resolver::Named("alice".into()));

        let incident: Incident = serde_json::from_value(incident_json(json!({
            "resolved_by_user": { "id": "PU1", "name": "Alice Ng", "email": "alice@example.com" }
        })))
        .unwrap();
        assert_eq!(incident.resolved_by_user.name(), Some("Alice Ng"));
    }

    #[test]
    fn unknown_status_is_preserved() {
        let incident: Incident =
            serde_json::from_value(incident_json(json!({ "status": "snoozed" }))).unwrap();
        assert_eq!(incident.status, Status::Other("snoozed".into()));
        assert_eq!(incident.status.to_string(), "snoozed");
    }

    #[test]
    fn missing_timestamps_decode_as_none() {
        let mut value = incident_json(json!({ "created_on": null }));
        if let Some(object) = value.as_object_mut() {
            object.remove("last_status_change_on");
        }
        let incident: Incident = serde_json::from_value(value).unwrap();
        assert!(incident.created_on.is_none());
        assert!(incident.last_status_change_on.is_none());
    }

    #[test]
    fn decodes_page_metadata() {
        let page: IncidentsResponse = serde_json::from_value(json!({
            "incidents": [incident_json(json!({}))],
            "limit": 100,
            "offset": 0,
            "total": 1
        }))
        .unwrap();
        assert_eq!(page.incidents.len(), 1);
        assert_eq!(page.incidents[0].service.name, "checkout");
        assert_eq!(page.incidents[0].trigger_summary_data.description, "CPU high");
        assert!(page.incidents[0].acknowledgers.is_empty());
        assert_eq!((page.limit, page.offset, page.total), (100, 0, 1));
    }
}
