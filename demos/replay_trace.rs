/// Replay a recorded keypoint trace through the rep counter
/// Run with: cargo run --example replay_trace -- <trace.jsonl> [squat|pushup]
///
/// Each line of the trace is one `FrameKeypoints` JSON object.

use rep_counter::core::database::{Database, SqliteSessionStore};
use rep_counter::core::logging::init_tracing;
use rep_counter::{ExerciseType, FrameKeypoints, RepCounterEngine};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing("info");

    let mut args = std::env::args().skip(1);
    let path = args
        .next()
        .ok_or("usage: replay_trace <trace.jsonl> [squat|pushup]")?;
    let exercise = match args.next() {
        Some(name) => ExerciseType::from_string(&name)?,
        None => ExerciseType::Squat,
    };

    let contents = std::fs::read_to_string(&path)?;
    let frames = contents
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(serde_json::from_str::<FrameKeypoints>)
        .collect::<Result<Vec<_>, _>>()?;

    println!("=== Replaying {} frames of {} from {} ===\n", frames.len(), exercise, path);

    let db = Database::in_memory().await?;
    let store = Arc::new(SqliteSessionStore::new(Arc::new(db)));
    let engine = RepCounterEngine::new(exercise.default_profile(), store);

    let started_at = frames.first().map(|f| f.timestamp_ms).unwrap_or_default();
    let ended_at = frames.last().map(|f| f.timestamp_ms).unwrap_or_default();
    engine.start_session(started_at).await?;

    for frame in &frames {
        if let Some(transition) = engine.process_frame(frame).await {
            if transition.counted {
                let snapshot = engine.snapshot().await;
                println!(
                    "  rep {} at {} ms ({:.1}°)",
                    snapshot.rep_count,
                    frame.timestamp_ms,
                    snapshot.current_angle_degrees.unwrap_or_default()
                );
            }
        }
    }

    let outcome = engine.end_session(ended_at).await?;
    if let Some(save) = outcome.save {
        save.await?;
    }

    let snapshot = engine.snapshot().await;
    println!("\n=== Final Snapshot ===\n");
    println!("{}", serde_json::to_string_pretty(&snapshot)?);

    let stats = engine.stats().await;
    println!("\n=== Lifetime Stats ===\n");
    println!("  Total reps: {}", stats.total_reps);
    println!("  Sessions: {}", stats.sessions_completed);
    println!("  Best session: {}", stats.best_session);
    println!("  Average: {}", stats.average_per_session);

    Ok(())
}
