// End-to-end rep counting against an in-memory recording store

use async_trait::async_trait;
use rep_counter::{
    CompletedSession, ExerciseType, FrameKeypoints, JointId, LifetimeStats, Quality, RawKeypoint,
    RepCounterEngine, RepPhase, SaveStatus, SessionError, SessionRecord, SessionStore, StoreError,
    StoreResult,
};
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct RecordingStore {
    saved: Mutex<Vec<CompletedSession>>,
}

impl RecordingStore {
    fn saved(&self) -> Vec<CompletedSession> {
        self.saved.lock().unwrap().clone()
    }
}

#[async_trait]
impl SessionStore for RecordingStore {
    async fn save_session(&self, session: &CompletedSession) -> StoreResult<()> {
        self.saved.lock().unwrap().push(session.clone());
        Ok(())
    }

    async fn lifetime_stats(&self, exercise: ExerciseType) -> StoreResult<LifetimeStats> {
        let saved = self.saved.lock().unwrap();
        let reps: Vec<u32> = saved
            .iter()
            .filter(|s| s.exercise == exercise)
            .map(|s| s.rep_count)
            .collect();
        let total: u64 = reps.iter().map(|&r| r as u64).sum();
        Ok(LifetimeStats {
            total_reps: total,
            sessions_completed: reps.len() as u64,
            best_session: reps.iter().copied().max().unwrap_or(0),
            average_per_session: if reps.is_empty() {
                0.0
            } else {
                total as f64 / reps.len() as f64
            },
        })
    }

    async fn session_history(
        &self,
        _exercise: ExerciseType,
        _limit: u32,
    ) -> StoreResult<Vec<SessionRecord>> {
        Ok(Vec::new())
    }

    async fn delete_session(&self, _exercise: ExerciseType, id: &str) -> StoreResult<()> {
        Err(StoreError::NotFound(id.to_string()))
    }

    async fn reset_stats(&self, _exercise: ExerciseType) -> StoreResult<()> {
        self.saved.lock().unwrap().clear();
        Ok(())
    }
}

enum Naming {
    Canonical,
    Legacy,
}

/// Both vertex angles equal `angle`; the outer joints are 100 px from the vertex
fn frame(
    exercise: ExerciseType,
    angle: f32,
    at: i64,
    confidence: f32,
    naming: Naming,
) -> FrameKeypoints {
    let profile = exercise.default_profile();
    let radians = (angle as f64).to_radians();
    let mut keypoints = Vec::new();

    for (triple, x) in [(profile.left_joints, 100.0f32), (profile.right_joints, 300.0)] {
        let points = [
            (x, 100.0f32),
            (x, 200.0),
            (x + (100.0 * radians.sin()) as f32, 200.0 - (100.0 * radians.cos()) as f32),
        ];
        for (joint, (px, py)) in triple.iter().zip(points) {
            keypoints.push(keypoint(*joint, px, py, confidence, &naming));
        }
    }

    FrameKeypoints::new(at, keypoints)
}

fn keypoint(joint: JointId, x: f32, y: f32, confidence: f32, naming: &Naming) -> RawKeypoint {
    match naming {
        Naming::Canonical => RawKeypoint::named(joint.canonical_name(), x, y, confidence),
        Naming::Legacy => RawKeypoint::legacy(joint.legacy_name(), x, y, confidence),
    }
}

fn setup(exercise: ExerciseType) -> (RepCounterEngine, Arc<RecordingStore>) {
    let store = Arc::new(RecordingStore::default());
    let engine = RepCounterEngine::new(exercise.default_profile(), store.clone());
    (engine, store)
}

/// Feed angles spaced `step_ms` apart starting at `first_ms`; returns the
/// indices of the frames that counted a rep
async fn replay(
    engine: &RepCounterEngine,
    exercise: ExerciseType,
    angles: &[f32],
    first_ms: i64,
    step_ms: i64,
) -> Vec<usize> {
    let mut counted = Vec::new();
    for (i, &angle) in angles.iter().enumerate() {
        let at = first_ms + i as i64 * step_ms;
        let transition = engine
            .process_frame(&frame(exercise, angle, at, 0.9, Naming::Canonical))
            .await;
        if transition.map_or(false, |t| t.counted) {
            counted.push(i);
        }
    }
    counted
}

#[tokio::test]
async fn squat_full_rep_counts_once_on_the_way_up() {
    let (engine, _) = setup(ExerciseType::Squat);
    engine.start_session(0).await.unwrap();

    let counted = replay(
        &engine,
        ExerciseType::Squat,
        &[180.0, 180.0, 140.0, 100.0, 140.0, 180.0, 180.0],
        1_000,
        900,
    )
    .await;

    assert_eq!(counted, vec![5]);
    assert_eq!(engine.snapshot().await.rep_count, 1);
}

#[tokio::test]
async fn squat_trace_ends_standing_with_one_rep() {
    let (engine, _) = setup(ExerciseType::Squat);
    engine.start_session(0).await.unwrap();

    replay(
        &engine,
        ExerciseType::Squat,
        &[178.0, 179.0, 155.0, 120.0, 95.0, 150.0, 178.0],
        900,
        900,
    )
    .await;

    let snapshot = engine.snapshot().await;
    assert_eq!(snapshot.rep_count, 1);
    assert_eq!(snapshot.phase, RepPhase::Up);
    assert_eq!(snapshot.phase_label, "standing");
    assert_eq!(snapshot.quality, Quality::Good);
}

#[tokio::test]
async fn oscillation_near_thresholds_counts_nothing() {
    let (engine, _) = setup(ExerciseType::Squat);
    engine.start_session(0).await.unwrap();

    let band = replay(&engine, ExerciseType::Squat, &[164.0, 166.0, 164.0, 166.0], 100, 100).await;
    let fast_angles = [176.0, 164.0, 176.0, 164.0, 176.0];
    let fast = replay(&engine, ExerciseType::Squat, &fast_angles, 500, 50).await;

    assert!(band.is_empty());
    assert!(fast.is_empty());
    assert_eq!(engine.snapshot().await.rep_count, 0);
}

#[tokio::test]
async fn fast_pushup_inside_cooldown_is_ignored() {
    let (engine, _) = setup(ExerciseType::Pushup);
    engine.start_session(0).await.unwrap();

    replay(&engine, ExerciseType::Pushup, &[170.0, 85.0, 170.0], 0, 150).await;

    let snapshot = engine.snapshot().await;
    assert_eq!(snapshot.rep_count, 0);
    assert_eq!(snapshot.phase, RepPhase::Up);
}

#[tokio::test]
async fn fast_pushup_with_wall_clock_timestamps_is_ignored() {
    let t0 = 1_760_000_000_000;
    let (engine, _) = setup(ExerciseType::Pushup);
    engine.start_session(t0).await.unwrap();

    let counted = replay(&engine, ExerciseType::Pushup, &[170.0, 85.0, 170.0], t0, 150).await;

    assert!(counted.is_empty());
    let snapshot = engine.snapshot().await;
    assert_eq!(snapshot.rep_count, 0);
    assert_eq!(snapshot.phase, RepPhase::Up);
}

#[tokio::test]
async fn first_squat_rep_waits_a_cooldown_after_start() {
    let t0 = 1_760_000_000_000;
    let (engine, _) = setup(ExerciseType::Squat);
    engine.start_session(t0).await.unwrap();

    // Up again 600 ms after start: too early
    let early = replay(&engine, ExerciseType::Squat, &[120.0, 178.0], t0 + 300, 300).await;
    let later = replay(&engine, ExerciseType::Squat, &[120.0, 178.0], t0 + 1_000, 300).await;

    assert!(early.is_empty());
    assert_eq!(later, vec![1]);
    assert_eq!(engine.snapshot().await.rep_count, 1);
}

#[tokio::test]
async fn low_confidence_frames_never_change_the_session() {
    let (engine, _) = setup(ExerciseType::Pushup);
    engine.start_session(0).await.unwrap();
    replay(&engine, ExerciseType::Pushup, &[170.0], 1_000, 0).await;
    let before = engine.snapshot().await;

    for (i, angle) in [80.0, 170.0, 80.0, 170.0].into_iter().enumerate() {
        let at = 2_000 + i as i64 * 1_000;
        let transition = engine
            .process_frame(&frame(ExerciseType::Pushup, angle, at, 0.2, Naming::Canonical))
            .await;
        assert!(transition.is_none());
    }

    let after = engine.snapshot().await;
    assert_eq!(after.rep_count, before.rep_count);
    assert_eq!(after.phase, before.phase);
    assert_eq!(after.quality, Quality::Poor);
    assert_eq!(after.current_angle_degrees, None);
}

#[tokio::test]
async fn legacy_keypoint_names_count_like_canonical_ones() {
    let (engine, _) = setup(ExerciseType::Pushup);
    engine.start_session(0).await.unwrap();

    for (angle, at) in [(170.0, 1_000), (80.0, 2_000), (170.0, 3_000)] {
        engine
            .process_frame(&frame(ExerciseType::Pushup, angle, at, 0.8, Naming::Legacy))
            .await;
    }

    assert_eq!(engine.snapshot().await.rep_count, 1);
}

#[tokio::test]
async fn ending_with_reps_saves_exactly_once() {
    let (engine, store) = setup(ExerciseType::Pushup);
    engine.start_session(0).await.unwrap();
    replay(&engine, ExerciseType::Pushup, &[170.0, 80.0, 170.0, 80.0, 170.0], 1_000, 1_000).await;

    let outcome = engine.end_session(6_000).await.unwrap();
    outcome.save.expect("a save should be scheduled").await.unwrap();

    let saved = store.saved();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].rep_count, 2);
    assert_eq!(saved[0].exercise, ExerciseType::Pushup);
    assert_eq!(saved[0].ended_at_ms, 6_000);

    assert_eq!(
        engine.end_session(7_000).await.err(),
        Some(SessionError::NotActive(ExerciseType::Pushup))
    );
    assert_eq!(store.saved().len(), 1);

    let snapshot = engine.snapshot().await;
    assert_eq!(snapshot.save_status, SaveStatus::Saved);
    assert_eq!(snapshot.rep_count, 2);
    assert_eq!(engine.stats().await.total_reps, 2);
}

#[tokio::test]
async fn ending_without_reps_never_saves() {
    let (engine, store) = setup(ExerciseType::Squat);
    engine.start_session(0).await.unwrap();
    replay(&engine, ExerciseType::Squat, &[178.0, 170.0, 178.0], 1_000, 1_000).await;

    let outcome = engine.end_session(4_000).await.unwrap();
    assert!(outcome.session.is_none());
    assert!(outcome.save.is_none());
    assert!(store.saved().is_empty());
}

#[tokio::test]
async fn reset_then_start_matches_a_fresh_engine() {
    let (used, _) = setup(ExerciseType::Squat);
    used.start_session(0).await.unwrap();
    replay(&used, ExerciseType::Squat, &[178.0, 120.0, 178.0], 1_000, 1_000).await;
    used.reset_session().await;
    used.start_session(10_000).await.unwrap();

    let (fresh, _) = setup(ExerciseType::Squat);
    fresh.start_session(10_000).await.unwrap();

    assert_eq!(used.snapshot().await, fresh.snapshot().await);
}
