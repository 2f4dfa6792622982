use crate::core::store::{SessionStore, StoreError, StoreResult};
use crate::models::exercise::ExerciseType;
use crate::models::session::{CompletedSession, LifetimeStats, SessionRecord};
use async_trait::async_trait;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use sqlx::{migrate::MigrateDatabase, Sqlite};
use std::path::Path;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct Database {
    pub(crate) pool: SqlitePool,
}

impl Database {
    /// Open (creating if needed) the database file and run migrations
    pub async fn init(db_path: &Path) -> StoreResult<Self> {
        let db_url = format!("sqlite://{}", db_path.display());

        // Create database directory if it doesn't exist
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        if !Sqlite::database_exists(&db_url).await? {
            Sqlite::create_database(&db_url).await?;
        }

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(&db_url)
            .await?;

        let db = Self { pool };
        db.run_migrations().await?;

        tracing::info!(path = %db_path.display(), "session database ready");
        Ok(db)
    }

    /// Private in-memory database, mostly for tests and dry runs
    pub async fn in_memory() -> StoreResult<Self> {
        // A single connection keeps every query on the same memory database
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;

        let db = Self { pool };
        db.run_migrations().await?;
        Ok(db)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn run_migrations(&self) -> StoreResult<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

// ==============================================================================
// Rows
// ==============================================================================

#[derive(Debug, Clone, sqlx::FromRow)]
struct SessionRow {
    id: String,
    exercise_type: String,
    rep_count: i64,
    duration_seconds: i64,
    ended_at: i64,
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct StatsRow {
    total_reps: i64,
    sessions_completed: i64,
    best_session: i64,
    average_per_session: f64,
}

impl TryFrom<SessionRow> for SessionRecord {
    type Error = StoreError;

    fn try_from(row: SessionRow) -> Result<Self, Self::Error> {
        let exercise = ExerciseType::from_string(&row.exercise_type).map_err(StoreError::Decode)?;
        let recorded_at = chrono::DateTime::from_timestamp_millis(row.ended_at)
            .ok_or_else(|| StoreError::Decode(format!("bad timestamp {}", row.ended_at)))?;

        Ok(SessionRecord {
            id: row.id,
            exercise,
            rep_count: row.rep_count.max(0) as u32,
            duration_seconds: row.duration_seconds.max(0) as u64,
            recorded_at,
        })
    }
}

// ==============================================================================
// SQLite Session Store
// ==============================================================================

/// Local session store backed by the SQLite database
#[derive(Debug, Clone)]
pub struct SqliteSessionStore {
    db: Arc<Database>,
}

impl SqliteSessionStore {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl SessionStore for SqliteSessionStore {
    async fn save_session(&self, session: &CompletedSession) -> StoreResult<()> {
        let id = Uuid::new_v4().to_string();
        let created_at = chrono::Utc::now().timestamp_millis();

        sqlx::query(
            "INSERT INTO exercise_sessions (
                id, exercise_type, rep_count, duration_seconds, started_at, ended_at, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(session.exercise.to_db_string())
        .bind(session.rep_count as i64)
        .bind(session.duration_seconds as i64)
        .bind(session.started_at_ms)
        .bind(session.ended_at_ms)
        .bind(created_at)
        .execute(self.db.pool())
        .await?;

        tracing::debug!(
            %id,
            exercise = %session.exercise,
            reps = session.rep_count,
            "session row inserted"
        );
        Ok(())
    }

    async fn lifetime_stats(&self, exercise: ExerciseType) -> StoreResult<LifetimeStats> {
        let row = sqlx::query_as::<_, StatsRow>(
            "SELECT
                COALESCE(SUM(rep_count), 0) AS total_reps,
                COUNT(*) AS sessions_completed,
                COALESCE(MAX(rep_count), 0) AS best_session,
                COALESCE(AVG(rep_count), 0.0) AS average_per_session
             FROM exercise_sessions
             WHERE exercise_type = ?",
        )
        .bind(exercise.to_db_string())
        .fetch_one(self.db.pool())
        .await?;

        Ok(LifetimeStats {
            total_reps: row.total_reps.max(0) as u64,
            sessions_completed: row.sessions_completed.max(0) as u64,
            best_session: row.best_session.max(0) as u32,
            average_per_session: row.average_per_session,
        })
    }

    async fn session_history(
        &self,
        exercise: ExerciseType,
        limit: u32,
    ) -> StoreResult<Vec<SessionRecord>> {
        let rows = sqlx::query_as::<_, SessionRow>(
            "SELECT id, exercise_type, rep_count, duration_seconds, ended_at
             FROM exercise_sessions
             WHERE exercise_type = ?
             ORDER BY ended_at DESC, created_at DESC
             LIMIT ?",
        )
        .bind(exercise.to_db_string())
        .bind(limit as i64)
        .fetch_all(self.db.pool())
        .await?;

        rows.into_iter().map(SessionRecord::try_from).collect()
    }

    async fn delete_session(&self, exercise: ExerciseType, id: &str) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM exercise_sessions WHERE id = ? AND exercise_type = ?")
            .bind(id)
            .bind(exercise.to_db_string())
            .execute(self.db.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id.to_string()));
        }
        Ok(())
    }

    async fn reset_stats(&self, exercise: ExerciseType) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM exercise_sessions WHERE exercise_type = ?")
            .bind(exercise.to_db_string())
            .execute(self.db.pool())
            .await?;

        tracing::info!(%exercise, removed = result.rows_affected(), "exercise history reset");
        Ok(())
    }
}
