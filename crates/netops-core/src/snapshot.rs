// ── Report snapshot ──
//
// Every collection a report view needs, fetched together. A collection
// whose fetch failed is simply empty.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::model::{Alert, Breakdown, EnergyRecord, Equipment, Intervention, Site};

#[derive(Debug, Clone, Default, Serialize)]
pub struct Snapshot {
    pub fetched_at: Option<DateTime<Utc>>,
    pub sites: Vec<Site>,
    pub equipment: Vec<Equipment>,
    pub interventions: Vec<Intervention>,
    pub alerts: Vec<Alert>,
    pub breakdowns: Vec<Breakdown>,
    pub energy: Vec<EnergyRecord>,
}
