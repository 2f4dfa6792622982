// Remote session store - talks to the fitness backend REST API

use crate::core::store::{SessionStore, StoreError, StoreResult};
use crate::models::exercise::ExerciseType;
use crate::models::session::{CompletedSession, LifetimeStats, SessionRecord};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;

/// Per-exercise endpoints and payload field names of the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApiRoutes {
    pub save: &'static str,
    pub count_field: &'static str,
    pub stats: &'static str,
    pub sessions: &'static str,
    pub reset: &'static str,
}

impl ApiRoutes {
    pub fn for_exercise(exercise: ExerciseType) -> Self {
        match exercise {
            ExerciseType::Squat => ApiRoutes {
                save: "/api/squat-session",
                count_field: "squat_count",
                stats: "/api/stats",
                sessions: "/api/sessions",
                reset: "/api/reset-stats",
            },
            ExerciseType::Pushup => ApiRoutes {
                save: "/api/pushup-session",
                count_field: "pushup_count",
                stats: "/api/pushup-stats",
                sessions: "/api/pushup-sessions",
                reset: "/api/reset-pushup-stats",
            },
        }
    }
}

pub struct HttpSessionStore {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl HttpSessionStore {
    pub fn new(base_url: &str, token: Option<String>) -> StoreResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> StoreResult<Value> {
        let response = self.authorize(request).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(StoreError::Rejected {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&body).map_err(|e| StoreError::Decode(e.to_string()))
    }
}

#[async_trait]
impl SessionStore for HttpSessionStore {
    async fn save_session(&self, session: &CompletedSession) -> StoreResult<()> {
        let routes = ApiRoutes::for_exercise(session.exercise);
        let request = self
            .client
            .post(self.url(routes.save))
            .json(&save_payload(session));
        self.send(request).await?;
        Ok(())
    }

    async fn lifetime_stats(&self, exercise: ExerciseType) -> StoreResult<LifetimeStats> {
        let routes = ApiRoutes::for_exercise(exercise);
        let body = self.send(self.client.get(self.url(routes.stats))).await?;
        parse_stats(&body)
    }

    async fn session_history(
        &self,
        exercise: ExerciseType,
        limit: u32,
    ) -> StoreResult<Vec<SessionRecord>> {
        let routes = ApiRoutes::for_exercise(exercise);
        let body = self.send(self.client.get(self.url(routes.sessions))).await?;
        let mut records = parse_history(exercise, &body)?;
        records.truncate(limit as usize);
        Ok(records)
    }

    async fn delete_session(&self, exercise: ExerciseType, id: &str) -> StoreResult<()> {
        let routes = ApiRoutes::for_exercise(exercise);
        let url = self.url(&format!("{}/{}", routes.sessions, id));
        match self.send(self.client.delete(url)).await {
            Err(StoreError::Rejected { status: 404, .. }) => {
                Err(StoreError::NotFound(id.to_string()))
            }
            other => other.map(|_| ()),
        }
    }

    async fn reset_stats(&self, exercise: ExerciseType) -> StoreResult<()> {
        let routes = ApiRoutes::for_exercise(exercise);
        self.send(self.client.post(self.url(routes.reset))).await?;
        Ok(())
    }
}

// ==============================================================================
// Payloads
// ==============================================================================

/// `stats` object of the stats endpoints
#[derive(Debug, Deserialize)]
struct StatsBody {
    #[serde(alias = "total_squats", alias = "total_pushups")]
    total_reps: u64,
    sessions_completed: u64,
    best_session: u32,
    #[serde(default)]
    average_per_session: f64,
}

#[derive(Debug, Deserialize)]
struct StatsResponse {
    stats: StatsBody,
}

/// The backend uses integer row ids
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RemoteId {
    Number(i64),
    Text(String),
}

#[derive(Debug, Deserialize)]
struct HistoryEntry {
    id: RemoteId,
    #[serde(alias = "squat_count", alias = "pushup_count")]
    rep_count: u32,
    #[serde(default)]
    duration: u64,
    timestamp: String,
}

#[derive(Debug, Deserialize)]
struct HistoryResponse {
    sessions: Vec<HistoryEntry>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

pub fn save_payload(session: &CompletedSession) -> Value {
    let routes = ApiRoutes::for_exercise(session.exercise);
    json!({
        routes.count_field: session.rep_count,
        "duration": session.duration_seconds,
    })
}

pub fn parse_stats(body: &Value) -> StoreResult<LifetimeStats> {
    let response = StatsResponse::deserialize(body).map_err(decode_error)?;
    let stats = response.stats;

    Ok(LifetimeStats {
        total_reps: stats.total_reps,
        sessions_completed: stats.sessions_completed,
        best_session: stats.best_session,
        average_per_session: stats.average_per_session,
    })
}

pub fn parse_history(exercise: ExerciseType, body: &Value) -> StoreResult<Vec<SessionRecord>> {
    let response = HistoryResponse::deserialize(body).map_err(decode_error)?;

    response
        .sessions
        .into_iter()
        .map(|entry| {
            let id = match entry.id {
                RemoteId::Number(n) => n.to_string(),
                RemoteId::Text(s) => s,
            };
            Ok(SessionRecord {
                recorded_at: parse_timestamp(&entry.timestamp)?,
                id,
                exercise,
                rep_count: entry.rep_count,
                duration_seconds: entry.duration,
            })
        })
        .collect()
}

/// The backend emits naive UTC ISO-8601 timestamps; accept RFC 3339 too
fn parse_timestamp(raw: &str) -> StoreResult<chrono::DateTime<chrono::Utc>> {
    if let Ok(parsed) = chrono::DateTime::parse_from_rfc3339(raw) {
        return Ok(parsed.with_timezone(&chrono::Utc));
    }
    raw.parse::<chrono::NaiveDateTime>()
        .map(|naive| naive.and_utc())
        .map_err(|e| StoreError::Decode(format!("bad timestamp {:?}: {}", raw, e)))
}

fn decode_error(e: serde_json::Error) -> StoreError {
    StoreError::Decode(e.to_string())
}

fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .map(|b| b.error)
        .unwrap_or_else(|_| body.trim().to_string())
}
