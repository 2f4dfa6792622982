// Rep state machine - hysteresis + cooldown over gated angle samples

use crate::models::exercise::{ExerciseProfile, RepPhase};
use crate::models::session::{AngleSample, SessionState};

/// What a single sample did to the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RepTransition {
    pub previous: RepPhase,
    pub phase: RepPhase,
    pub counted: bool,
}

impl RepTransition {
    pub fn changed(&self) -> bool {
        self.previous != self.phase
    }
}

/// Drives `SessionState::phase` and `rep_count` for one exercise profile.
///
/// * below `down_threshold` → DOWN
/// * above `up_threshold` coming from DOWN with the cooldown elapsed → UP and
///   one rep counted
/// * above `up_threshold` otherwise → UP without counting
/// * anything in between leaves the phase alone
///
/// The machine holds no state of its own; everything lives in the session
/// record so there is exactly one copy.
#[derive(Debug, Clone)]
pub struct RepStateMachine {
    profile: ExerciseProfile,
}

impl RepStateMachine {
    pub fn new(profile: ExerciseProfile) -> Self {
        Self { profile }
    }

    pub fn profile(&self) -> &ExerciseProfile {
        &self.profile
    }

    pub fn advance(&self, state: &mut SessionState, sample: AngleSample) -> RepTransition {
        let previous = state.phase;
        let mut counted = false;

        if sample.value < self.profile.down_threshold {
            state.phase = RepPhase::Down;
        } else if sample.value > self.profile.up_threshold {
            let since_last_rep = sample.timestamp_ms.saturating_sub(state.last_rep_at_ms);
            if previous == RepPhase::Down && since_last_rep >= self.profile.cooldown_ms {
                state.rep_count += 1;
                state.last_rep_at_ms = sample.timestamp_ms;
                counted = true;
            }
            state.phase = RepPhase::Up;
        }

        RepTransition {
            previous,
            phase: state.phase,
            counted,
        }
    }
}
