pub mod collect;
pub mod format;

use crate::api::types::Incident;
use std::collections::BTreeMap;

/// Incidents keyed by service name. Within a service, incidents keep the
/// order in which the API returned them; services iterate by name.
#[derive(Debug, Default, Clone)]
pub struct ServiceGroups {
    groups: BTreeMap<String, Vec<Incident>>,
}

impl ServiceGroups {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, incident: Incident) {
        self.groups
            .entry(incident.service.name.clone())
            .or_default()
            .push(incident);
    }

    pub fn extend(&mut self, incidents: impl IntoIterator<Item = Incident>) {
        for incident in incidents {
            self.push(incident);
        }
    }

    pub fn get(&self, service: &str) -> Option<&[Incident]> {
        self.groups.get(service).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Incident])> {
        self.groups
            .iter()
            .map(|(name, incidents)| (name.as_str(), incidents.as_slice()))
    }

    pub fn service_count(&self) -> usize {
        self.groups.len()
    }

    pub fn incident_count(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}
