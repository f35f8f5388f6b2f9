// ── Breakdown lifecycle ──
//
// The transition table is the single source of truth for which status
// moves are legal. Timestamp side effects are attached to edges, so a
// multi-step move made through a full edit stamps exactly what walking
// those edges one at a time would have stamped.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::CoreError;
use crate::model::{Breakdown, BreakdownStatus};

/// Statuses reachable in one step from `from`.
pub fn allowed_next(from: BreakdownStatus) -> &'static [BreakdownStatus] {
    use BreakdownStatus as S;
    match from {
        S::Open => &[S::Investigating],
        S::Investigating => &[S::InProgress, S::Resolved],
        S::InProgress => &[S::Resolved],
        S::Resolved => &[S::Closed],
        S::Closed => &[],
    }
}

pub fn can_transition(from: BreakdownStatus, to: BreakdownStatus) -> bool {
    allowed_next(from).contains(&to)
}

/// Shortest chain of edges from `from` to `to`, excluding `from` itself.
///
/// `Some(vec![])` when the two are equal; `None` when `to` is not
/// reachable (every backward move).
pub fn path(from: BreakdownStatus, to: BreakdownStatus) -> Option<Vec<BreakdownStatus>> {
    if from == to {
        return Some(Vec::new());
    }
    // The table is a small DAG; breadth-first keeps the shortest route.
    let mut frontier = vec![(from, Vec::new())];
    while !frontier.is_empty() {
        let mut next = Vec::new();
        for (status, trail) in frontier {
            for &step in allowed_next(status) {
                let mut trail = trail.clone();
                trail.push(step);
                if step == to {
                    return Some(trail);
                }
                next.push((step, trail));
            }
        }
        frontier = next;
    }
    None
}

// ── Stamps ──────────────────────────────────────────────────────────

/// The lifecycle-managed timestamp columns of a breakdown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stamps {
    pub acknowledged_at: Option<DateTime<Utc>>,
    pub downtime_end: Option<DateTime<Utc>>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub closed_at: Option<DateTime<Utc>>,
}

impl Stamps {
    pub fn of(breakdown: &Breakdown) -> Self {
        Self {
            acknowledged_at: breakdown.acknowledged_at,
            downtime_end: breakdown.downtime_end,
            resolved_at: breakdown.resolved_at,
            closed_at: breakdown.closed_at,
        }
    }
}

/// Status plus the timestamp columns a transition newly fills.
///
/// Serializes to the exact column set for the conditional update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TransitionPatch {
    pub status: BreakdownStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub acknowledged_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub downtime_end: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub closed_at: Option<DateTime<Utc>>,
}

impl TransitionPatch {
    fn status_only(status: BreakdownStatus) -> Self {
        Self {
            status,
            acknowledged_at: None,
            downtime_end: None,
            resolved_at: None,
            closed_at: None,
        }
    }

    /// Apply to an in-memory row, as the backend would.
    pub fn apply_to(&self, breakdown: &mut Breakdown) {
        breakdown.status = self.status;
        if self.acknowledged_at.is_some() {
            breakdown.acknowledged_at = self.acknowledged_at;
        }
        if self.downtime_end.is_some() {
            breakdown.downtime_end = self.downtime_end;
        }
        if self.resolved_at.is_some() {
            breakdown.resolved_at = self.resolved_at;
        }
        if self.closed_at.is_some() {
            breakdown.closed_at = self.closed_at;
        }
    }
}

/// Side effects of entering `to`. Stamps only fill empty columns, so
/// a value already present (stored or manually supplied) is never moved.
fn stamp_edge(
    to: BreakdownStatus,
    now: DateTime<Utc>,
    stamps: &mut Stamps,
    patch: &mut TransitionPatch,
) {
    fn fill(
        slot: &mut Option<DateTime<Utc>>,
        out: &mut Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) {
        if slot.is_none() {
            *slot = Some(now);
            *out = Some(now);
        }
    }

    match to {
        BreakdownStatus::Investigating => {
            fill(&mut stamps.acknowledged_at, &mut patch.acknowledged_at, now);
        }
        BreakdownStatus::Resolved => {
            fill(&mut stamps.resolved_at, &mut patch.resolved_at, now);
            fill(&mut stamps.downtime_end, &mut patch.downtime_end, now);
        }
        BreakdownStatus::Closed => {
            fill(&mut stamps.closed_at, &mut patch.closed_at, now);
        }
        BreakdownStatus::Open | BreakdownStatus::InProgress => {}
    }
}

// ── Planning ────────────────────────────────────────────────────────

/// Plan a single-edge status action (acknowledge, start, resolve, close).
///
/// Anything outside the table, including re-entering the current
/// status, is an [`CoreError::InvalidTransition`].
pub fn plan_transition(
    current: &Breakdown,
    to: BreakdownStatus,
    now: DateTime<Utc>,
) -> Result<TransitionPatch, CoreError> {
    let from = current.status;
    if !can_transition(from, to) {
        return Err(CoreError::InvalidTransition { from, to });
    }
    let mut stamps = Stamps::of(current);
    let mut patch = TransitionPatch::status_only(to);
    stamp_edge(to, now, &mut stamps, &mut patch);
    Ok(patch)
}

/// Plan the status part of a full edit.
///
/// The edit may keep the status or move it forward along any chain of
/// table edges; each traversed edge contributes its stamps. `stamps`
/// should already carry manually supplied values so they win over
/// automatic ones. Backward moves are rejected.
pub fn plan_status_change(
    from: BreakdownStatus,
    stamps: Stamps,
    to: BreakdownStatus,
    now: DateTime<Utc>,
) -> Result<TransitionPatch, CoreError> {
    let steps = path(from, to).ok_or(CoreError::InvalidTransition { from, to })?;
    let mut stamps = stamps;
    let mut patch = TransitionPatch::status_only(to);
    for step in steps {
        stamp_edge(step, now, &mut stamps, &mut patch);
    }
    Ok(patch)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{Duration, TimeZone};
    use pretty_assertions::assert_eq;
    use strum::IntoEnumIterator;

    use super::*;
    use crate::model::BreakdownStatus as S;

    fn t(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 17, hour, 0, 0).unwrap()
    }

    fn breakdown(status: S) -> Breakdown {
        serde_json::from_value(serde_json::json!({
            "id": "b-1",
            "title": "Fiber cut",
            "type": "connectivity_loss",
            "severity": "major",
            "status": status,
            "site_id": "s-1",
            "downtime_start": "2026-10-17T06:00:00Z"
        }))
        .unwrap()
    }

    #[test]
    fn table_edges() {
        assert!(can_transition(S::Open, S::Investigating));
        assert!(can_transition(S::Investigating, S::InProgress));
        assert!(can_transition(S::Investigating, S::Resolved));
        assert!(can_transition(S::InProgress, S::Resolved));
        assert!(can_transition(S::Resolved, S::Closed));
        assert!(!can_transition(S::Open, S::Resolved));
        assert!(!can_transition(S::Closed, S::Open));
        assert!(allowed_next(S::Closed).is_empty());
    }

    #[test]
    fn no_status_transitions_to_itself() {
        for status in S::iter() {
            assert!(!can_transition(status, status), "{status}");
        }
    }

    #[test]
    fn full_lifecycle_populates_all_stamps() {
        let mut b = breakdown(S::Open);

        plan_transition(&b, S::Investigating, t(7)).unwrap().apply_to(&mut b);
        assert_eq!(b.status, S::Investigating);
        assert_eq!(b.acknowledged_at, Some(t(7)));

        plan_transition(&b, S::Resolved, t(9)).unwrap().apply_to(&mut b);
        assert_eq!(b.resolved_at, Some(t(9)));
        assert_eq!(b.downtime_end, Some(t(9)));

        plan_transition(&b, S::Closed, t(10)).unwrap().apply_to(&mut b);
        assert_eq!(b.status, S::Closed);
        assert_eq!(b.closed_at, Some(t(10)));
        assert_eq!(b.acknowledged_at, Some(t(7)));
        assert_eq!(b.resolution_time(), Some(Duration::hours(3)));
    }

    #[test]
    fn resolve_keeps_existing_downtime_end() {
        let mut b = breakdown(S::InProgress);
        b.downtime_end = Some(t(8));
        let patch = plan_transition(&b, S::Resolved, t(9)).unwrap();
        assert_eq!(patch.resolved_at, Some(t(9)));
        assert_eq!(patch.downtime_end, None);
    }

    #[test]
    fn start_work_stamps_nothing() {
        let b = breakdown(S::Investigating);
        let patch = plan_transition(&b, S::InProgress, t(8)).unwrap();
        assert_eq!(patch, TransitionPatch::status_only(S::InProgress));
    }

    #[test]
    fn second_resolution_is_rejected_and_moves_nothing() {
        let mut b = breakdown(S::Resolved);
        b.resolved_at = Some(t(9));
        let err = plan_transition(&b, S::Resolved, t(11)).unwrap_err();
        assert!(matches!(
            err,
            CoreError::InvalidTransition {
                from: S::Resolved,
                to: S::Resolved
            }
        ));
        assert_eq!(b.resolved_at, Some(t(9)));
    }

    #[test]
    fn invalid_edge_is_rejected() {
        let b = breakdown(S::Open);
        assert!(matches!(
            plan_transition(&b, S::Closed, t(8)),
            Err(CoreError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn shortest_paths() {
        assert_eq!(path(S::Open, S::Open), Some(vec![]));
        assert_eq!(
            path(S::Open, S::Resolved),
            Some(vec![S::Investigating, S::Resolved])
        );
        assert_eq!(
            path(S::Open, S::Closed),
            Some(vec![S::Investigating, S::Resolved, S::Closed])
        );
        assert_eq!(path(S::Resolved, S::InProgress), None);
    }

    #[test]
    fn edit_skipping_forward_stamps_every_edge() {
        let patch = plan_status_change(S::Open, Stamps::default(), S::Closed, t(12)).unwrap();
        assert_eq!(patch.status, S::Closed);
        assert_eq!(patch.acknowledged_at, Some(t(12)));
        assert_eq!(patch.resolved_at, Some(t(12)));
        assert_eq!(patch.downtime_end, Some(t(12)));
        assert_eq!(patch.closed_at, Some(t(12)));
    }

    #[test]
    fn edit_manual_downtime_end_wins() {
        let stamps = Stamps {
            downtime_end: Some(t(5)),
            ..Stamps::default()
        };
        let patch = plan_status_change(S::InProgress, stamps, S::Resolved, t(12)).unwrap();
        assert_eq!(patch.resolved_at, Some(t(12)));
        assert_eq!(patch.downtime_end, None);
    }

    #[test]
    fn edit_keeping_status_stamps_nothing() {
        let patch = plan_status_change(S::Resolved, Stamps::default(), S::Resolved, t(12)).unwrap();
        assert_eq!(patch, TransitionPatch::status_only(S::Resolved));
    }

    #[test]
    fn edit_backwards_is_rejected() {
        assert!(matches!(
            plan_status_change(S::Closed, Stamps::default(), S::Open, t(12)),
            Err(CoreError::InvalidTransition {
                from: S::Closed,
                to: S::Open
            })
        ));
    }

    #[test]
    fn patch_serializes_only_filled_columns() {
        let b = breakdown(S::Open);
        let patch = plan_transition(&b, S::Investigating, t(7)).unwrap();
        let v = serde_json::to_value(patch).unwrap();
        assert_eq!(
            v,
            serde_json::json!({
                "status": "investigating",
                "acknowledged_at": "2026-10-17T07:00:00Z"
            })
        );
    }
}
