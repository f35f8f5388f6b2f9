// ── Controller abstraction ──
//
// Single entry point for consumers. Owns the REST client, fans out the
// reads each view needs, enforces role checks, and routes write commands
// through the breakdown lifecycle with conditional updates.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
use netops_api::transport::{TlsMode, TransportConfig};
use netops_api::{Order, Query, RestClient};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::command::{
    Command, CommandResult, CreateBreakdownRequest, CreateEnergyRequest, UpdateBreakdownRequest,
    UpdateEnergyRequest, UpdateProfileRequest,
};
use crate::config::{AuthCredentials, BackendConfig, TlsVerification};
use crate::error::CoreError;
use crate::form::check_reading;
use crate::lifecycle::{self, Stamps};
use crate::metrics::{
    BreakdownStats, DashboardCounts, DashboardStats, EnergyPoint, EnergyStats, SiteEnergy,
    SiteStats, UserStats, month_buckets, monthly_energy,
};
use crate::model::{
    Alert, AlertStatus, Breakdown, BreakdownStatus, EnergyRecord, EntityId, Equipment,
    Intervention, Profile, Role, Severity, Site, SiteStatus,
};
use crate::poll::{AlertFetch, AlertNotifier, AlertPoller, BoxFuture};
use crate::snapshot::Snapshot;

// ── Tables and projections ──────────────────────────────────────────

const SITES: &str = "sites";
const EQUIPMENT: &str = "equipment";
const ALERTS: &str = "alerts";
const INTERVENTIONS: &str = "interventions";
const BREAKDOWNS: &str = "breakdowns";
const ENERGY: &str = "energy_consumption";
const PROFILES: &str = "profiles";

const BREAKDOWN_SELECT: &str = "*,sites(name,code),equipment(name),\
     reporter:profiles!breakdowns_reported_by_fkey(full_name),\
     assignee:profiles!breakdowns_assigned_to_fkey(full_name)";
const ENERGY_SELECT: &str = "*,sites(name,code),equipment(name)";
const ALERT_SELECT: &str = "*,sites(name),equipment(name)";
const EQUIPMENT_SELECT: &str = "*,sites(name,code)";
const INTERVENTION_SELECT: &str = "*,sites(name),equipment(name)";

/// Energy rows summed on the dashboard card.
const DASHBOARD_ENERGY_ROWS: usize = 100;
/// Alerts kept per poll.
const POLL_ALERT_LIMIT: usize = 50;

const ACTIVE_STATUSES: [BreakdownStatus; 3] = [
    BreakdownStatus::Open,
    BreakdownStatus::Investigating,
    BreakdownStatus::InProgress,
];

// ── Filters ─────────────────────────────────────────────────────────

/// Narrowing for breakdown listings.
#[derive(Debug, Clone, Default)]
pub struct BreakdownFilter {
    pub status: Option<BreakdownStatus>,
    pub severity: Option<Severity>,
    pub site_id: Option<EntityId>,
    /// Only open, investigating, or in-progress rows.
    pub active_only: bool,
    pub limit: Option<usize>,
}

impl BreakdownFilter {
    fn to_query(&self) -> Query {
        let mut query = Query::new()
            .select(BREAKDOWN_SELECT)
            .order("reported_at", Order::Desc);
        if let Some(status) = self.status {
            query = query.eq("status", status);
        }
        if let Some(severity) = self.severity {
            query = query.eq("severity", severity);
        }
        if let Some(site) = &self.site_id {
            query = query.eq("site_id", site);
        }
        if self.active_only {
            query = query.in_list("status", ACTIVE_STATUSES);
        }
        if let Some(limit) = self.limit {
            query = query.limit(limit);
        }
        query
    }
}

// ── Controller ──────────────────────────────────────────────────────

/// The main entry point for consumers.
///
/// Cheaply cloneable via `Arc<ControllerInner>`.
#[derive(Clone)]
pub struct Controller {
    inner: Arc<ControllerInner>,
}

struct ControllerInner {
    config: BackendConfig,
    client: RestClient,
}

impl Controller {
    /// Build the REST client for `config`. No request is made until the
    /// first read or write.
    pub fn new(config: BackendConfig) -> Result<Self, CoreError> {
        let transport = build_transport(&config);
        let client = match &config.auth {
            AuthCredentials::ApiKey {
                api_key,
                access_token,
            } => RestClient::from_api_key(
                config.url.as_str(),
                api_key,
                access_token.as_ref(),
                &transport,
            )?,
        };
        debug!(url = %client.base_url(), "backend client ready");

        Ok(Self {
            inner: Arc::new(ControllerInner { config, client }),
        })
    }

    pub fn config(&self) -> &BackendConfig {
        &self.inner.config
    }

    fn client(&self) -> &RestClient {
        &self.inner.client
    }

    // ── Reads ────────────────────────────────────────────────────

    pub async fn sites(&self) -> Result<Vec<Site>, CoreError> {
        let query = Query::new().select("*").order("name", Order::Asc);
        Ok(self.client().select(SITES, &query).await?)
    }

    /// Equipment, optionally restricted to one site.
    pub async fn equipment(&self, site_id: Option<&EntityId>) -> Result<Vec<Equipment>, CoreError> {
        let mut query = Query::new()
            .select(EQUIPMENT_SELECT)
            .order("name", Order::Asc);
        if let Some(site) = site_id {
            query = query.eq("site_id", site);
        }
        Ok(self.client().select(EQUIPMENT, &query).await?)
    }

    /// Newest alerts first.
    pub async fn alerts(
        &self,
        active_only: bool,
        limit: Option<usize>,
    ) -> Result<Vec<Alert>, CoreError> {
        let mut query = Query::new()
            .select(ALERT_SELECT)
            .order("created_at", Order::Desc);
        if active_only {
            query = query.eq("status", AlertStatus::Active);
        }
        if let Some(limit) = limit {
            query = query.limit(limit);
        }
        Ok(self.client().select(ALERTS, &query).await?)
    }

    pub async fn interventions(&self) -> Result<Vec<Intervention>, CoreError> {
        let query = Query::new()
            .select(INTERVENTION_SELECT)
            .order("created_at", Order::Desc);
        Ok(self.client().select(INTERVENTIONS, &query).await?)
    }

    pub async fn breakdowns(&self, filter: &BreakdownFilter) -> Result<Vec<Breakdown>, CoreError> {
        Ok(self.client().select(BREAKDOWNS, &filter.to_query()).await?)
    }

    pub async fn breakdown(&self, id: &EntityId) -> Result<Breakdown, CoreError> {
        let query = Query::new().select(BREAKDOWN_SELECT).eq("id", id);
        self.client()
            .select_one(BREAKDOWNS, &query)
            .await?
            .ok_or_else(|| CoreError::not_found("breakdown", id))
    }

    /// Energy readings, newest first.
    pub async fn energy_records(
        &self,
        site_id: Option<&EntityId>,
        limit: Option<usize>,
    ) -> Result<Vec<EnergyRecord>, CoreError> {
        let mut query = Query::new()
            .select(ENERGY_SELECT)
            .order("recorded_at", Order::Desc);
        if let Some(site) = site_id {
            query = query.eq("site_id", site);
        }
        if let Some(limit) = limit {
            query = query.limit(limit);
        }
        Ok(self.client().select(ENERGY, &query).await?)
    }

    pub async fn energy_record(&self, id: &EntityId) -> Result<EnergyRecord, CoreError> {
        let query = Query::new().select(ENERGY_SELECT).eq("id", id);
        self.client()
            .select_one(ENERGY, &query)
            .await?
            .ok_or_else(|| CoreError::not_found("energy record", id))
    }

    /// The user directory. Requires an admin or manager acting profile.
    pub async fn profiles(&self) -> Result<Vec<Profile>, CoreError> {
        self.require_role(Role::can_view_users, "list users").await?;
        self.fetch_profiles().await
    }

    async fn fetch_profiles(&self) -> Result<Vec<Profile>, CoreError> {
        let query = Query::new().select("*").order("created_at", Order::Desc);
        Ok(self.client().select(PROFILES, &query).await?)
    }

    async fn equipment_item(&self, id: &EntityId) -> Result<Equipment, CoreError> {
        let query = Query::new().select("*").eq("id", id);
        self.client()
            .select_one(EQUIPMENT, &query)
            .await?
            .ok_or_else(|| CoreError::not_found("equipment", id))
    }

    // ── Aggregate views ──────────────────────────────────────────
    //
    // A failed fetch degrades to empty data with a warning; these never
    // return an error for a read failure.

    /// Overview cards: exact counts plus the most recent energy rows.
    pub async fn dashboard(&self) -> DashboardStats {
        let c = self.client();
        let all = Query::new();
        let active_site = Query::new().eq("status", SiteStatus::Active);
        let active_alert = Query::new().eq("status", AlertStatus::Active);
        let active_breakdown = Query::new().in_list("status", ACTIVE_STATUSES);
        let (sites, active_sites, equipment, active_alerts, breakdowns, active_breakdowns, energy) =
            tokio::join!(
                c.count(SITES, &all),
                c.count(SITES, &active_site),
                c.count(EQUIPMENT, &all),
                c.count(ALERTS, &active_alert),
                c.count(BREAKDOWNS, &all),
                c.count(BREAKDOWNS, &active_breakdown),
                self.energy_records(None, Some(DASHBOARD_ENERGY_ROWS)),
            );

        let counts = DashboardCounts {
            total_sites: count_or_zero("sites", sites),
            active_sites: count_or_zero("active sites", active_sites),
            total_equipment: count_or_zero("equipment", equipment),
            active_alerts: count_or_zero("active alerts", active_alerts),
            total_breakdowns: count_or_zero("breakdowns", breakdowns),
            active_breakdowns: count_or_zero("active breakdowns", active_breakdowns),
        };
        DashboardStats::compute(counts, &or_empty("energy", energy))
    }

    /// Every collection the report views use, fetched concurrently.
    pub async fn snapshot(&self) -> Snapshot {
        let every_breakdown = BreakdownFilter::default();
        let (sites, equipment, interventions, alerts, breakdowns, energy) = tokio::join!(
            self.sites(),
            self.equipment(None),
            self.interventions(),
            self.alerts(false, None),
            self.breakdowns(&every_breakdown),
            self.energy_records(None, None),
        );
        Snapshot {
            fetched_at: Some(Utc::now()),
            sites: or_empty("sites", sites),
            equipment: or_empty("equipment", equipment),
            interventions: or_empty("interventions", interventions),
            alerts: or_empty("alerts", alerts),
            breakdowns: or_empty("breakdowns", breakdowns),
            energy: or_empty("energy", energy),
        }
    }

    pub async fn breakdown_stats(&self) -> BreakdownStats {
        let rows = self.breakdowns(&BreakdownFilter::default()).await;
        BreakdownStats::compute(&or_empty("breakdowns", rows))
    }

    pub async fn site_stats(&self) -> SiteStats {
        SiteStats::compute(&or_empty("sites", self.sites().await))
    }

    pub async fn energy_stats(&self) -> EnergyStats {
        EnergyStats::compute(&or_empty("energy", self.energy_records(None, None).await))
    }

    /// Per-site consumption, highest first.
    pub async fn energy_by_site(&self, limit: usize) -> Vec<SiteEnergy> {
        SiteEnergy::top(&or_empty("energy", self.energy_records(None, None).await), limit)
    }

    /// Six-month consumption series in the timezone of `now`.
    pub async fn energy_trend<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> Vec<EnergyPoint> {
        let buckets = month_buckets(now);
        let mut query = Query::new()
            .select(ENERGY_SELECT)
            .order("recorded_at", Order::Asc);
        if let (Some(first), Some(last)) = (buckets.first(), buckets.last()) {
            query = query
                .gte("recorded_at", first.start.to_rfc3339_opts(SecondsFormat::Secs, true))
                .lt("recorded_at", last.end.to_rfc3339_opts(SecondsFormat::Secs, true));
        }
        let rows = self.client().select(ENERGY, &query).await;
        monthly_energy(&or_empty("energy", rows.map_err(CoreError::from)), now)
    }

    /// Role counts. Requires an admin or manager acting profile.
    pub async fn user_stats<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> Result<UserStats, CoreError> {
        self.require_role(Role::can_view_users, "view user statistics")
            .await?;
        let profiles = or_empty("profiles", self.fetch_profiles().await);
        Ok(UserStats::compute(&profiles, now))
    }

    // ── Role checks ──────────────────────────────────────────────

    /// Profile of the configured acting user.
    pub async fn acting_profile(&self) -> Result<Profile, CoreError> {
        let Some(id) = &self.inner.config.acting_user else {
            return Err(CoreError::PermissionDenied {
                message: "no acting user configured for this profile".into(),
            });
        };
        let query = Query::new().select("*").eq("id", id);
        self.client()
            .select_one(PROFILES, &query)
            .await?
            .ok_or_else(|| CoreError::PermissionDenied {
                message: format!("acting user {id} has no profile"),
            })
    }

    async fn require_role(&self, allowed: fn(Role) -> bool, action: &str) -> Result<Role, CoreError> {
        let profile = self.acting_profile().await?;
        match profile.role {
            Some(role) if allowed(role) => Ok(role),
            Some(role) => Err(CoreError::PermissionDenied {
                message: format!("role {role} may not {action}"),
            }),
            None => Err(CoreError::PermissionDenied {
                message: format!("{} has no role and may not {action}", profile.display_name()),
            }),
        }
    }

    // ── Breakdown writes ─────────────────────────────────────────

    pub async fn report_breakdown(&self, req: &CreateBreakdownRequest) -> Result<Breakdown, CoreError> {
        if let Some(eq) = &req.equipment_id {
            self.check_equipment_site(eq, &req.site_id).await?;
        }
        let rows: Vec<Breakdown> = self.client().insert(BREAKDOWNS, req).await?;
        let created = rows
            .into_iter()
            .next()
            .ok_or_else(|| CoreError::Internal("insert returned no row".into()))?;
        info!(id = %created.id, severity = %created.severity, "breakdown reported");
        Ok(created)
    }

    /// Move a breakdown along one lifecycle edge.
    pub async fn transition_breakdown(
        &self,
        id: &EntityId,
        to: BreakdownStatus,
    ) -> Result<Breakdown, CoreError> {
        let current = self.breakdown(id).await?;
        let patch = lifecycle::plan_transition(&current, to, Utc::now())?;
        let updated = self.conditional_update(id, current.status, &patch).await?;
        info!(%id, from = %current.status, to = %to, "breakdown transitioned");
        Ok(updated)
    }

    /// Full edit. A status change walks the lifecycle table and picks up
    /// the stamps of every edge crossed; manual timestamps win.
    pub async fn edit_breakdown(
        &self,
        id: &EntityId,
        update: &UpdateBreakdownRequest,
    ) -> Result<Breakdown, CoreError> {
        if update.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
            return Err(CoreError::validation("title must not be empty"));
        }
        let current = self.breakdown(id).await?;
        let mut update = update.clone();

        let site_id = update.site_id.clone().unwrap_or_else(|| current.site_id.clone());
        if site_id != current.site_id && update.equipment_id.is_none() {
            update.equipment_id = Some(None);
        }
        if let Some(Some(eq)) = &update.equipment_id {
            self.check_equipment_site(eq, &site_id).await?;
        }

        let mut body = to_object(&update)?;
        if let Some(to) = update.status.filter(|to| *to != current.status) {
            let mut stamps = Stamps::of(&current);
            if let Some(manual) = update.downtime_end {
                stamps.downtime_end = manual;
            }
            let patch = lifecycle::plan_status_change(current.status, stamps, to, Utc::now())?;
            merge(&mut body, to_object(&patch)?);
        }
        if body.is_empty() {
            return Ok(current);
        }

        let updated = self
            .conditional_update(id, current.status, &Value::Object(body))
            .await?;
        info!(%id, status = %updated.status, "breakdown updated");
        Ok(updated)
    }

    pub async fn delete_breakdown(&self, id: &EntityId) -> Result<(), CoreError> {
        let rows: Vec<Value> = self
            .client()
            .delete(BREAKDOWNS, &Query::new().select("id").eq("id", id))
            .await?;
        if rows.is_empty() {
            return Err(CoreError::not_found("breakdown", id));
        }
        info!(%id, "breakdown deleted");
        Ok(())
    }

    /// PATCH conditioned on the status the change was planned against.
    async fn conditional_update<B: Serialize + Sync>(
        &self,
        id: &EntityId,
        expected: BreakdownStatus,
        body: &B,
    ) -> Result<Breakdown, CoreError> {
        let query = Query::new()
            .select(BREAKDOWN_SELECT)
            .eq("id", id)
            .eq("status", expected);
        let rows: Vec<Breakdown> = self.client().update(BREAKDOWNS, &query, body).await?;
        match rows.into_iter().next() {
            Some(row) => Ok(row),
            None => Err(self.explain_missed_update(id, expected).await),
        }
    }

    /// Work out why a conditional update matched nothing.
    async fn explain_missed_update(&self, id: &EntityId, expected: BreakdownStatus) -> CoreError {
        match self.breakdown(id).await {
            Ok(current) if current.status != expected => {
                warn!(%id, %expected, actual = %current.status, "breakdown changed concurrently");
                CoreError::Conflict {
                    id: id.to_string(),
                    expected,
                    actual: current.status,
                }
            }
            Ok(_) => CoreError::PermissionDenied {
                message: format!("update of breakdown {id} was not applied"),
            },
            Err(e) => e,
        }
    }

    async fn check_equipment_site(
        &self,
        equipment_id: &EntityId,
        site_id: &EntityId,
    ) -> Result<(), CoreError> {
        let equipment = self.equipment_item(equipment_id).await?;
        if &equipment.site_id != site_id {
            return Err(CoreError::validation(format!(
                "equipment {} is not installed at site {site_id}",
                equipment.name
            )));
        }
        Ok(())
    }

    // ── Energy writes ────────────────────────────────────────────

    pub async fn record_energy(&self, req: &CreateEnergyRequest) -> Result<EnergyRecord, CoreError> {
        check_reading(
            req.consumption_kwh,
            Some(req.cost_amount),
            req.period_start,
            req.period_end,
        )?;
        if let Some(eq) = &req.equipment_id {
            self.check_equipment_site(eq, &req.site_id).await?;
        }
        let rows: Vec<EnergyRecord> = self.client().insert(ENERGY, req).await?;
        let created = rows
            .into_iter()
            .next()
            .ok_or_else(|| CoreError::Internal("insert returned no row".into()))?;
        info!(id = %created.id, kwh = created.consumption_kwh, "energy reading recorded");
        Ok(created)
    }

    pub async fn edit_energy(
        &self,
        id: &EntityId,
        update: &UpdateEnergyRequest,
    ) -> Result<EnergyRecord, CoreError> {
        let current = self.energy_record(id).await?;
        check_reading(
            update.consumption_kwh.unwrap_or(current.consumption_kwh),
            update.cost_amount,
            update.period_start.unwrap_or(current.period_start),
            update.period_end.unwrap_or(current.period_end),
        )?;

        let mut update = update.clone();
        let site_id = update.site_id.clone().unwrap_or_else(|| current.site_id.clone());
        if site_id != current.site_id && update.equipment_id.is_none() {
            update.equipment_id = Some(None);
        }
        if let Some(Some(eq)) = &update.equipment_id {
            self.check_equipment_site(eq, &site_id).await?;
        }

        let query = Query::new().select(ENERGY_SELECT).eq("id", id);
        let rows: Vec<EnergyRecord> = self.client().update(ENERGY, &query, &update).await?;
        let updated = rows
            .into_iter()
            .next()
            .ok_or_else(|| CoreError::not_found("energy record", id))?;
        info!(%id, "energy reading updated");
        Ok(updated)
    }

    pub async fn delete_energy(&self, id: &EntityId) -> Result<(), CoreError> {
        let rows: Vec<Value> = self
            .client()
            .delete(ENERGY, &Query::new().select("id").eq("id", id))
            .await?;
        if rows.is_empty() {
            return Err(CoreError::not_found("energy record", id));
        }
        info!(%id, "energy reading deleted");
        Ok(())
    }

    // ── User writes ──────────────────────────────────────────────

    pub async fn update_user(
        &self,
        id: &EntityId,
        update: &UpdateProfileRequest,
    ) -> Result<Profile, CoreError> {
        self.require_role(Role::can_manage_users, "edit users").await?;
        if update.role == Some(Role::Unknown) {
            return Err(CoreError::validation("unknown role"));
        }
        let query = Query::new().select("*").eq("id", id);
        let rows: Vec<Profile> = self.client().update(PROFILES, &query, update).await?;
        let updated = rows
            .into_iter()
            .next()
            .ok_or_else(|| CoreError::not_found("user", id))?;
        info!(%id, "user profile updated");
        Ok(updated)
    }

    /// Edit the acting user's own name and contact fields. Any role may do
    /// this; the role itself stays admin-only.
    pub async fn update_own_profile(
        &self,
        update: &UpdateProfileRequest,
    ) -> Result<Profile, CoreError> {
        if update.role.is_some() {
            return Err(CoreError::validation(
                "roles are changed by an admin with `users edit`",
            ));
        }
        if update.full_name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            return Err(CoreError::validation("full name cannot be empty"));
        }
        let me = self.acting_profile().await?;
        let query = Query::new().select("*").eq("id", &me.id);
        let rows: Vec<Profile> = self.client().update(PROFILES, &query, update).await?;
        let updated = rows
            .into_iter()
            .next()
            .ok_or_else(|| CoreError::not_found("user", &me.id))?;
        info!(id = %me.id, "own profile updated");
        Ok(updated)
    }

    pub async fn delete_user(&self, id: &EntityId) -> Result<(), CoreError> {
        if self.inner.config.acting_user.as_ref() == Some(id) {
            return Err(CoreError::validation("you cannot delete your own account"));
        }
        self.require_role(Role::can_manage_users, "delete users").await?;
        let rows: Vec<Value> = self
            .client()
            .delete(PROFILES, &Query::new().select("id").eq("id", id))
            .await?;
        if rows.is_empty() {
            return Err(CoreError::not_found("user", id));
        }
        info!(%id, "user profile deleted");
        Ok(())
    }

    // ── Command execution ────────────────────────────────────────

    /// Execute a write command.
    pub async fn execute(&self, cmd: Command) -> Result<CommandResult, CoreError> {
        route_command(self, cmd).await
    }

    // ── Alert polling ────────────────────────────────────────────

    /// Start polling active alerts every `interval`. Newly raised critical
    /// alerts are passed to `notifier`.
    pub fn spawn_alert_poller(
        &self,
        interval: Duration,
        notifier: Arc<dyn AlertNotifier>,
    ) -> AlertPoller {
        let ctrl = self.clone();
        let fetch: AlertFetch = Arc::new(move || -> BoxFuture<Result<Vec<Alert>, CoreError>> {
            let ctrl = ctrl.clone();
            Box::pin(async move { ctrl.alerts(true, Some(POLL_ALERT_LIMIT)).await })
        });
        AlertPoller::spawn(fetch, interval, notifier)
    }
}

// ── Command routing ─────────────────────────────────────────────────

async fn route_command(controller: &Controller, cmd: Command) -> Result<CommandResult, CoreError> {
    match cmd {
        // ── Breakdowns ───────────────────────────────────────────
        Command::ReportBreakdown(req) => controller
            .report_breakdown(&req)
            .await
            .map(|b| CommandResult::Breakdown(Box::new(b))),
        Command::TransitionBreakdown { id, to } => controller
            .transition_breakdown(&id, to)
            .await
            .map(|b| CommandResult::Breakdown(Box::new(b))),
        Command::EditBreakdown { id, update } => controller
            .edit_breakdown(&id, &update)
            .await
            .map(|b| CommandResult::Breakdown(Box::new(b))),
        Command::DeleteBreakdown { id } => {
            controller.delete_breakdown(&id).await?;
            Ok(CommandResult::Ok)
        }

        // ── Energy ───────────────────────────────────────────────
        Command::RecordEnergy(req) => controller
            .record_energy(&req)
            .await
            .map(CommandResult::Energy),
        Command::EditEnergy { id, update } => controller
            .edit_energy(&id, &update)
            .await
            .map(CommandResult::Energy),
        Command::DeleteEnergy { id } => {
            controller.delete_energy(&id).await?;
            Ok(CommandResult::Ok)
        }

        // ── Users ────────────────────────────────────────────────
        Command::UpdateUser { id, update } => controller
            .update_user(&id, &update)
            .await
            .map(CommandResult::Profile),
        Command::UpdateOwnProfile(update) => controller
            .update_own_profile(&update)
            .await
            .map(CommandResult::Profile),
        Command::DeleteUser { id } => {
            controller.delete_user(&id).await?;
            Ok(CommandResult::Ok)
        }
    }
}

// ── Helpers ─────────────────────────────────────────────────────────

fn build_transport(config: &BackendConfig) -> TransportConfig {
    TransportConfig {
        tls: match &config.tls {
            TlsVerification::SystemDefaults => TlsMode::System,
            TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
            TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
        },
        timeout: config.timeout,
    }
}

fn or_empty<T>(collection: &str, result: Result<Vec<T>, CoreError>) -> Vec<T> {
    result.unwrap_or_else(|e| {
        warn!(collection, error = %e, "fetch failed, showing no data");
        Vec::new()
    })
}

fn count_or_zero(what: &str, result: Result<u64, netops_api::Error>) -> u64 {
    result.unwrap_or_else(|e| {
        warn!(count = what, error = %e, "count failed, showing zero");
        0
    })
}

fn to_object<T: Serialize>(value: &T) -> Result<serde_json::Map<String, Value>, CoreError> {
    match serde_json::to_value(value) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(CoreError::Internal(format!(
            "expected an object body, got {other}"
        ))),
        Err(e) => Err(CoreError::Internal(format!("serialize request body: {e}"))),
    }
}

fn merge(into: &mut serde_json::Map<String, Value>, from: serde_json::Map<String, Value>) {
    for (key, value) in from {
        into.insert(key, value);
    }
}
