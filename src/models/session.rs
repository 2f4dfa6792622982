// Data models for exercise sessions, lifetime statistics and UI snapshots

use crate::models::exercise::{ExerciseType, Quality, RepPhase};
use serde::{Deserialize, Serialize};

// ==============================================================================
// Live session
// ==============================================================================

/// A gated angle measurement, in degrees within [0, 180]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AngleSample {
    pub value: f32,
    pub timestamp_ms: i64,
}

impl AngleSample {
    pub fn new(value: f32, timestamp_ms: i64) -> Self {
        Self {
            value,
            timestamp_ms,
        }
    }
}

/// The single canonical record of an exercise session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    pub rep_count: u32,
    pub started_at_ms: i64,
    pub elapsed_seconds: u64,
    pub is_active: bool,
    pub last_rep_at_ms: i64,
    pub phase: RepPhase,
}

/// Finalize request handed to the persistence collaborator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletedSession {
    pub exercise: ExerciseType,
    pub rep_count: u32, // Always >= 1
    pub duration_seconds: u64,
    pub started_at_ms: i64,
    pub ended_at_ms: i64,
}

/// Outcome of the last finalize request, surfaced as a UI notice
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "message", rename_all = "snake_case")]
pub enum SaveStatus {
    #[default]
    Idle,
    Pending,
    Saved,
    Failed(String),
}

/// Read-only view published to the UI after every frame and tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub exercise: ExerciseType,
    pub rep_count: u32,
    pub phase: RepPhase,
    pub phase_label: String,
    pub current_angle_degrees: Option<f32>,
    pub quality: Quality,
    pub elapsed_seconds: u64,
    pub is_active: bool,
    pub frames_processed: u64,
    pub frames_accepted: u64,
    pub reps_per_minute: u32,
    pub ms_since_last_rep: Option<i64>,
    pub save_status: SaveStatus,
}

// ==============================================================================
// Persistence-side records
// ==============================================================================

/// Lifetime totals for one exercise, owned by the store
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LifetimeStats {
    pub total_reps: u64,
    pub sessions_completed: u64,
    pub best_session: u32,
    pub average_per_session: f64,
}

/// One saved session from the history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub id: String,
    pub exercise: ExerciseType,
    pub rep_count: u32,
    pub duration_seconds: u64,
    pub recorded_at: chrono::DateTime<chrono::Utc>,
}

// ==============================================================================
// Error Types
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("A {0} session is already active")]
    AlreadyActive(ExerciseType),

    #[error("No active {0} session to end")]
    NotActive(ExerciseType),
}

pub type SessionResult<T> = Result<T, SessionError>;
