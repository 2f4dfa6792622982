// Rep counter engine - frame worker, elapsed-time ticker and persistence glue

use crate::core::config::Config;
use crate::core::quality_gate::QualityGate;
use crate::core::rep_counter::RepTransition;
use crate::core::session_tracker::SessionTracker;
use crate::core::stats::{StatsAggregator, StatsDisplay};
use crate::core::store::{SessionStore, StoreResult};
use crate::models::exercise::{ExerciseProfile, ExerciseType};
use crate::models::pose::FrameKeypoints;
use crate::models::session::{
    CompletedSession, SaveStatus, SessionRecord, SessionResult, SessionSnapshot,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;

const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(1);
const DEFAULT_HISTORY_LIMIT: u32 = 10;

/// Result of ending a session
#[derive(Debug)]
pub struct EndOutcome {
    /// Present when at least one rep was counted
    pub session: Option<CompletedSession>,
    /// Background save followed by a stats refresh
    pub save: Option<JoinHandle<()>>,
}

/// Live rep counter for one exercise.
///
/// Frames and ticks both go through the same tracker lock, so a frame is
/// always applied to a consistent session record.
pub struct RepCounterEngine {
    exercise: ExerciseType,
    tracker: Arc<Mutex<SessionTracker>>,
    store: Arc<dyn SessionStore>,
    stats: Arc<Mutex<StatsAggregator>>,
    frame_tx: Arc<watch::Sender<Option<FrameKeypoints>>>,
    snapshot_tx: Arc<watch::Sender<SessionSnapshot>>,
    ticker: Mutex<Option<JoinHandle<()>>>,
    tick_interval: Duration,
    history_limit: u32,
}

impl RepCounterEngine {
    pub fn new(profile: ExerciseProfile, store: Arc<dyn SessionStore>) -> Self {
        Self::build(
            SessionTracker::new(profile, QualityGate::default()),
            store,
            DEFAULT_TICK_INTERVAL,
            DEFAULT_HISTORY_LIMIT,
        )
    }

    pub fn with_config(
        exercise: ExerciseType,
        config: &Config,
        store: Arc<dyn SessionStore>,
    ) -> Self {
        let tracker = SessionTracker::new(
            config.profile_for(exercise),
            QualityGate::new(config.min_joint_confidence),
        );
        Self::build(
            tracker,
            store,
            Duration::from_millis(config.tick_interval_ms),
            config.history_limit,
        )
    }

    fn build(
        tracker: SessionTracker,
        store: Arc<dyn SessionStore>,
        tick_interval: Duration,
        history_limit: u32,
    ) -> Self {
        let exercise = tracker.exercise();
        let (frame_tx, _) = watch::channel(None);
        let (snapshot_tx, _) = watch::channel(tracker.snapshot());

        Self {
            exercise,
            tracker: Arc::new(Mutex::new(tracker)),
            store,
            stats: Arc::new(Mutex::new(StatsAggregator::new(exercise))),
            frame_tx: Arc::new(frame_tx),
            snapshot_tx: Arc::new(snapshot_tx),
            ticker: Mutex::new(None),
            tick_interval,
            history_limit,
        }
    }

    pub fn exercise(&self) -> ExerciseType {
        self.exercise
    }

    // ==============================================================================
    // Frames
    // ==============================================================================

    /// Start the task that applies submitted frames in order.
    ///
    /// The task ends when the engine is dropped.
    pub fn spawn_frame_worker(&self) -> JoinHandle<()> {
        let mut frames = self.frame_tx.subscribe();
        let tracker = self.tracker.clone();
        let snapshot_tx = self.snapshot_tx.clone();

        tokio::spawn(async move {
            while frames.changed().await.is_ok() {
                let frame = frames.borrow_and_update().clone();
                if let Some(frame) = frame {
                    apply_frame(&tracker, &snapshot_tx, &frame).await;
                }
            }
            tracing::debug!("frame worker stopped");
        })
    }

    /// Hand a frame to the worker. An unprocessed earlier frame is dropped.
    pub fn submit_frame(&self, frame: FrameKeypoints) {
        self.frame_tx.send_replace(Some(frame));
    }

    /// Apply one frame right away
    pub async fn process_frame(&self, frame: &FrameKeypoints) -> Option<RepTransition> {
        apply_frame(&self.tracker, &self.snapshot_tx, frame).await
    }

    // ==============================================================================
    // Session lifecycle
    // ==============================================================================

    pub async fn start_session(&self, now_ms: i64) -> SessionResult<()> {
        {
            let mut tracker = self.tracker.lock().await;
            tracker.start(now_ms)?;
            self.snapshot_tx.send_replace(tracker.snapshot());
        }

        self.stop_ticker().await;
        let handle = spawn_ticker(
            self.tracker.clone(),
            self.snapshot_tx.clone(),
            self.tick_interval,
        );
        *self.ticker.lock().await = Some(handle);

        tracing::info!(exercise = %self.exercise, "session started");
        Ok(())
    }

    /// Stop the session and persist it in the background if any rep counted
    pub async fn end_session(&self, now_ms: i64) -> SessionResult<EndOutcome> {
        let (session, generation) = {
            let mut tracker = self.tracker.lock().await;
            let session = tracker.end(now_ms)?;
            if session.is_some() {
                tracker.set_save_status(SaveStatus::Pending);
            }
            self.snapshot_tx.send_replace(tracker.snapshot());
            (session, tracker.generation())
        };
        self.stop_ticker().await;

        let Some(completed) = session.clone() else {
            tracing::info!(
                exercise = %self.exercise,
                "session ended without reps, nothing to save"
            );
            return Ok(EndOutcome { session: None, save: None });
        };

        tracing::info!(
            exercise = %self.exercise,
            reps = completed.rep_count,
            duration = completed.duration_seconds,
            "session ended"
        );

        let store = self.store.clone();
        let tracker = self.tracker.clone();
        let snapshot_tx = self.snapshot_tx.clone();
        let stats = self.stats.clone();

        let save = tokio::spawn(async move {
            let status = match store.save_session(&completed).await {
                Ok(()) => {
                    tracing::info!(
                        exercise = %completed.exercise,
                        reps = completed.rep_count,
                        "session saved"
                    );
                    SaveStatus::Saved
                }
                Err(e) => {
                    tracing::warn!(
                        exercise = %completed.exercise,
                        error = %e,
                        "failed to save session"
                    );
                    SaveStatus::Failed(e.to_string())
                }
            };

            {
                let mut tracker = tracker.lock().await;
                // Only the session that produced this save may show its outcome
                if tracker.generation() == generation {
                    tracker.set_save_status(status);
                    snapshot_tx.send_replace(tracker.snapshot());
                }
            }

            stats.lock().await.refresh(store.as_ref()).await;
        });

        Ok(EndOutcome {
            session,
            save: Some(save),
        })
    }

    /// Stop the ticker and clear the session unconditionally
    pub async fn reset_session(&self) {
        self.stop_ticker().await;
        let mut tracker = self.tracker.lock().await;
        tracker.reset();
        self.snapshot_tx.send_replace(tracker.snapshot());
        tracing::info!(exercise = %self.exercise, "session reset");
    }

    async fn stop_ticker(&self) {
        if let Some(handle) = self.ticker.lock().await.take() {
            handle.abort();
        }
    }

    // ==============================================================================
    // Read side
    // ==============================================================================

    pub async fn snapshot(&self) -> SessionSnapshot {
        self.tracker.lock().await.snapshot()
    }

    /// Receiver that sees every published snapshot
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshot_tx.subscribe()
    }

    pub async fn refresh_stats(&self) -> bool {
        self.stats.lock().await.refresh(self.store.as_ref()).await
    }

    pub async fn stats(&self) -> StatsDisplay {
        self.stats.lock().await.display()
    }

    pub async fn session_history(&self) -> StoreResult<Vec<SessionRecord>> {
        self.store
            .session_history(self.exercise, self.history_limit)
            .await
    }

    pub async fn delete_session(&self, id: &str) -> StoreResult<()> {
        self.store.delete_session(self.exercise, id).await?;
        self.refresh_stats().await;
        Ok(())
    }

    /// Wipe saved history and totals for this exercise
    pub async fn reset_lifetime_stats(&self) -> StoreResult<()> {
        self.store.reset_stats(self.exercise).await?;
        self.refresh_stats().await;
        Ok(())
    }
}

impl Drop for RepCounterEngine {
    fn drop(&mut self) {
        if let Some(handle) = self.ticker.get_mut().take() {
            handle.abort();
        }
    }
}

async fn apply_frame(
    tracker: &Mutex<SessionTracker>,
    snapshot_tx: &watch::Sender<SessionSnapshot>,
    frame: &FrameKeypoints,
) -> Option<RepTransition> {
    let mut tracker = tracker.lock().await;
    let transition = tracker.process_frame(frame);

    if let Some(transition) = transition {
        if transition.counted {
            tracing::info!(
                exercise = %tracker.exercise(),
                reps = tracker.state().rep_count,
                "rep counted"
            );
        } else if transition.changed() {
            tracing::debug!(
                from = ?transition.previous,
                to = ?transition.phase,
                "phase changed"
            );
        }
    }

    snapshot_tx.send_replace(tracker.snapshot());
    transition
}

fn spawn_ticker(
    tracker: Arc<Mutex<SessionTracker>>,
    snapshot_tx: Arc<watch::Sender<SessionSnapshot>>,
    period: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        // First tick completes immediately
        interval.tick().await;

        loop {
            interval.tick().await;
            let mut tracker = tracker.lock().await;
            if !tracker.is_active() {
                break;
            }
            tracker.tick();
            snapshot_tx.send_replace(tracker.snapshot());
        }
    })
}
