// ── Energy consumption record ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::common::{EquipmentRef, SiteRef};
use super::entity_id::EntityId;

/// Default tariff applied when a record is stored without a cost.
pub const DEFAULT_TARIFF_PER_KWH: f64 = 0.15;

/// One metered observation for a site (optionally a single piece of equipment).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnergyRecord {
    pub id: EntityId,
    pub site_id: EntityId,
    #[serde(default)]
    pub equipment_id: Option<EntityId>,
    #[serde(deserialize_with = "crate::convert::lenient_f64")]
    pub consumption_kwh: f64,
    #[serde(default, deserialize_with = "crate::convert::opt_lenient_f64")]
    pub cost_amount: Option<f64>,
    #[serde(deserialize_with = "crate::convert::timestamp")]
    pub period_start: DateTime<Utc>,
    #[serde(deserialize_with = "crate::convert::timestamp")]
    pub period_end: DateTime<Utc>,
    #[serde(default, deserialize_with = "crate::convert::opt_timestamp")]
    pub recorded_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "crate::convert::opt_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(
        default,
        rename(deserialize = "sites"),
        deserialize_with = "crate::convert::one_or_first",
        skip_serializing_if = "Option::is_none"
    )]
    pub site: Option<SiteRef>,
    #[serde(
        default,
        deserialize_with = "crate::convert::one_or_first",
        skip_serializing_if = "Option::is_none"
    )]
    pub equipment: Option<EquipmentRef>,
}

impl EnergyRecord {
    /// Timestamp used for trend bucketing.
    pub fn recorded(&self) -> Option<DateTime<Utc>> {
        self.recorded_at.or(self.created_at)
    }

    pub fn cost(&self) -> f64 {
        self.cost_amount.unwrap_or(0.0)
    }
}

/// `kwh × tariff`, rounded to cents.
pub fn default_cost(consumption_kwh: f64, tariff_per_kwh: f64) -> f64 {
    round2(consumption_kwh * tariff_per_kwh)
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_cost_rounds_to_cents() {
        assert!((default_cost(1234.0, DEFAULT_TARIFF_PER_KWH) - 185.1).abs() < 1e-9);
        assert!((default_cost(7.0, DEFAULT_TARIFF_PER_KWH) - 1.05).abs() < 1e-9);
        assert!((default_cost(10.0, DEFAULT_TARIFF_PER_KWH) - 1.5).abs() < 1e-9);
    }
}
