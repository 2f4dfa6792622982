// Lifetime totals cache for one exercise

use crate::core::store::SessionStore;
use crate::models::exercise::ExerciseType;
use crate::models::session::LifetimeStats;
use serde::{Deserialize, Serialize};

/// What the stats panel shows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsDisplay {
    pub exercise: ExerciseType,
    pub total_reps: u64,
    pub sessions_completed: u64,
    pub best_session: u32,
    /// Rounded to one decimal
    pub average_per_session: f64,
    /// Last refresh failed; the numbers are from an earlier refresh
    pub unavailable: bool,
}

#[derive(Debug, Clone)]
pub struct StatsAggregator {
    exercise: ExerciseType,
    cached: Option<LifetimeStats>,
    unavailable: bool,
}

impl StatsAggregator {
    pub fn new(exercise: ExerciseType) -> Self {
        Self {
            exercise,
            cached: None,
            unavailable: false,
        }
    }

    pub fn cached(&self) -> Option<&LifetimeStats> {
        self.cached.as_ref()
    }

    pub fn is_unavailable(&self) -> bool {
        self.unavailable
    }

    /// Pull fresh totals from the store. Failures keep the previous value.
    pub async fn refresh(&mut self, store: &dyn SessionStore) -> bool {
        match store.lifetime_stats(self.exercise).await {
            Ok(stats) => {
                tracing::debug!(
                    exercise = %self.exercise,
                    total = stats.total_reps,
                    "stats refreshed"
                );
                self.cached = Some(stats);
                self.unavailable = false;
                true
            }
            Err(e) => {
                tracing::warn!(exercise = %self.exercise, error = %e, "stats unavailable");
                self.unavailable = true;
                false
            }
        }
    }

    pub fn display(&self) -> StatsDisplay {
        let stats = self.cached.clone().unwrap_or_default();
        StatsDisplay {
            exercise: self.exercise,
            total_reps: stats.total_reps,
            sessions_completed: stats.sessions_completed,
            best_session: stats.best_session,
            average_per_session: (stats.average_per_session * 10.0).round() / 10.0,
            unavailable: self.unavailable,
        }
    }
}
