// Session lifecycle and live telemetry for one exercise instance

use crate::core::frame_pipeline::{FrameEvaluation, FramePipeline};
use crate::core::quality_gate::QualityGate;
use crate::core::rep_counter::{RepStateMachine, RepTransition};
use crate::models::exercise::{ExerciseProfile, ExerciseType, Quality};
use crate::models::pose::FrameKeypoints;
use crate::models::session::{
    CompletedSession, SaveStatus, SessionError, SessionResult, SessionSnapshot, SessionState,
};

/// Owns the session record and everything the UI reads from it.
///
/// Frames that arrive while no session is active still update the angle and
/// quality readout but never touch the phase or the count.
#[derive(Debug, Clone)]
pub struct SessionTracker {
    exercise: ExerciseType,
    pipeline: FramePipeline,
    machine: RepStateMachine,
    state: SessionState,
    current_angle: Option<f32>,
    quality: Quality,
    frames_processed: u64,
    frames_accepted: u64,
    last_frame_at_ms: Option<i64>,
    save_status: SaveStatus,
    generation: u64,
}

impl SessionTracker {
    pub fn new(profile: ExerciseProfile, gate: QualityGate) -> Self {
        Self {
            exercise: profile.exercise,
            pipeline: FramePipeline::new(profile.clone(), gate),
            machine: RepStateMachine::new(profile),
            state: SessionState::default(),
            current_angle: None,
            quality: Quality::Good,
            frames_processed: 0,
            frames_accepted: 0,
            last_frame_at_ms: None,
            save_status: SaveStatus::Idle,
            generation: 0,
        }
    }

    pub fn for_exercise(exercise: ExerciseType) -> Self {
        Self::new(exercise.default_profile(), QualityGate::default())
    }

    pub fn exercise(&self) -> ExerciseType {
        self.exercise
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn is_active(&self) -> bool {
        self.state.is_active
    }

    /// Bumped by every `start` and `reset`; identifies the current session
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Begin a fresh session
    pub fn start(&mut self, now_ms: i64) -> SessionResult<()> {
        if self.state.is_active {
            return Err(SessionError::AlreadyActive(self.exercise));
        }

        self.clear();
        self.generation += 1;
        self.state.is_active = true;
        self.state.started_at_ms = now_ms;
        // The first rep is gated by the cooldown measured from the start
        self.state.last_rep_at_ms = now_ms;
        Ok(())
    }

    /// One wall-clock second elapsed
    pub fn tick(&mut self) {
        if self.state.is_active {
            self.state.elapsed_seconds += 1;
        }
    }

    /// Stop the session. Returns the finalize request when at least one rep
    /// was counted. The count stays visible until `reset` or the next `start`.
    pub fn end(&mut self, now_ms: i64) -> SessionResult<Option<CompletedSession>> {
        if !self.state.is_active {
            return Err(SessionError::NotActive(self.exercise));
        }

        self.state.is_active = false;

        if self.state.rep_count == 0 {
            return Ok(None);
        }

        Ok(Some(CompletedSession {
            exercise: self.exercise,
            rep_count: self.state.rep_count,
            duration_seconds: self.state.elapsed_seconds,
            started_at_ms: self.state.started_at_ms,
            ended_at_ms: now_ms,
        }))
    }

    /// Force-clear every session field regardless of state
    pub fn reset(&mut self) {
        self.clear();
        self.generation += 1;
    }

    /// Evaluate one frame and, if it is trustworthy and a session is running,
    /// feed it to the state machine.
    pub fn process_frame(&mut self, frame: &FrameKeypoints) -> Option<RepTransition> {
        let evaluation = self.pipeline.evaluate(frame);
        self.apply(evaluation, frame.timestamp_ms)
    }

    pub fn apply(
        &mut self,
        evaluation: FrameEvaluation,
        timestamp_ms: i64,
    ) -> Option<RepTransition> {
        self.frames_processed += 1;
        self.last_frame_at_ms = Some(timestamp_ms);
        self.quality = evaluation.quality();
        self.current_angle = evaluation.angle();

        let sample = evaluation.sample()?;
        self.frames_accepted += 1;

        if !self.state.is_active {
            return None;
        }

        Some(self.machine.advance(&mut self.state, sample))
    }

    pub fn set_save_status(&mut self, status: SaveStatus) {
        self.save_status = status;
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let reps_per_minute = if self.state.elapsed_seconds > 0 {
            (self.state.rep_count as f64 / self.state.elapsed_seconds as f64 * 60.0).round() as u32
        } else {
            0
        };

        let ms_since_last_rep = match (self.state.rep_count, self.last_frame_at_ms) {
            (0, _) | (_, None) => None,
            (_, Some(now)) => Some(now.saturating_sub(self.state.last_rep_at_ms).max(0)),
        };

        SessionSnapshot {
            exercise: self.exercise,
            rep_count: self.state.rep_count,
            phase: self.state.phase,
            phase_label: self.state.phase.label(self.exercise).to_string(),
            current_angle_degrees: self.current_angle,
            quality: self.quality,
            elapsed_seconds: self.state.elapsed_seconds,
            is_active: self.state.is_active,
            frames_processed: self.frames_processed,
            frames_accepted: self.frames_accepted,
            reps_per_minute,
            ms_since_last_rep,
            save_status: self.save_status.clone(),
        }
    }

    fn clear(&mut self) {
        self.state = SessionState::default();
        self.current_angle = None;
        self.quality = Quality::Good;
        self.frames_processed = 0;
        self.frames_accepted = 0;
        self.last_frame_at_ms = None;
        self.save_status = SaveStatus::Idle;
    }
}
