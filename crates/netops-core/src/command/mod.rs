// ── Command API ──
//
// All write operations flow through a unified `Command` enum. The
// controller routes each variant to a single-table mutation.

pub mod requests;

use crate::model::{Breakdown, BreakdownStatus, EnergyRecord, EntityId, Profile};

pub use requests::{
    CreateBreakdownRequest, CreateEnergyRequest, UpdateBreakdownRequest, UpdateEnergyRequest,
    UpdateProfileRequest,
};

/// All possible write operations against the backend.
#[derive(Debug, Clone)]
pub enum Command {
    // ── Breakdown operations ─────────────────────────────────────────
    ReportBreakdown(CreateBreakdownRequest),
    TransitionBreakdown {
        id: EntityId,
        to: BreakdownStatus,
    },
    EditBreakdown {
        id: EntityId,
        update: Box<UpdateBreakdownRequest>,
    },
    DeleteBreakdown {
        id: EntityId,
    },

    // ── Energy operations ────────────────────────────────────────────
    RecordEnergy(CreateEnergyRequest),
    EditEnergy {
        id: EntityId,
        update: UpdateEnergyRequest,
    },
    DeleteEnergy {
        id: EntityId,
    },

    // ── User operations ──────────────────────────────────────────────
    UpdateUser {
        id: EntityId,
        update: UpdateProfileRequest,
    },
    DeleteUser {
        id: EntityId,
    },
    /// Edit the acting user's own profile. `role` must be unset.
    UpdateOwnProfile(UpdateProfileRequest),
}

/// Result of a successfully executed command.
#[derive(Debug, Clone)]
pub enum CommandResult {
    Ok,
    Breakdown(Box<Breakdown>),
    Energy(EnergyRecord),
    Profile(Profile),
}
