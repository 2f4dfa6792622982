pub mod core;
pub mod models;

pub use crate::core::config::{Config, StoreBackend};
pub use crate::core::engine::{EndOutcome, RepCounterEngine};
pub use crate::core::store::{open_store, SessionStore, StoreError, StoreResult};
pub use crate::models::exercise::{ExerciseProfile, ExerciseType, Quality, RepPhase};
pub use crate::models::pose::{FrameKeypoints, JointId, RawKeypoint};
pub use crate::models::session::{
    CompletedSession, LifetimeStats, SaveStatus, SessionError, SessionRecord, SessionSnapshot,
};
