//! HTTP/JSON row store gateway, built the way the teacher's `FleetClient`
//! builds its hub client: a single cloned `reqwest::Client` with a fixed
//! per-call timeout, typed calls, and bounded jittered retry wrapping each
//! network round trip (§10.1).
//!
//! Each call targets a `{store_url}/rest/v1/{table}`-shaped endpoint,
//! authenticated with a bearer `store_key`, matching the Supabase-style REST
//! surface confirmed in the original reference implementation's `cloud_db.py`.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{json, Value};

use crate::types::{
    Emotion, GamificationEntry, PostureSample, Recommendation, Response, ResponseKind,
    StressLevel,
};

use super::error::GatewayError;
use super::retry::with_retry;
use super::{LeaderboardEntry, RowStoreGateway, TrainingRow};

#[derive(Clone)]
pub struct HttpRowStoreGateway {
    http: reqwest::Client,
    store_url: String,
    store_key: String,
    max_attempts: u32,
    retry_base: Duration,
    retry_jitter: Duration,
}

impl HttpRowStoreGateway {
    pub fn new(store_url: &str, store_key: &str) -> Self {
        let settings = &crate::config::get().gateway;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.http_timeout_secs))
            .build()
            .expect("failed to build row store HTTP client");

        Self {
            http,
            store_url: store_url.trim_end_matches('/').to_string(),
            store_key: store_key.to_string(),
            max_attempts: settings.max_attempts,
            retry_base: Duration::from_millis(settings.retry_base_ms),
            retry_jitter: Duration::from_millis(settings.retry_jitter_ms),
        }
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.store_url, table)
    }

    fn auth(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        req.header("Authorization", format!("Bearer {}", self.store_key))
            .header("apikey", &self.store_key)
    }

    async fn get_json(&self, table: &str, query: &[(&str, &str)]) -> Result<Value, GatewayError> {
        with_retry(self.max_attempts, self.retry_base, self.retry_jitter, || async {
            let resp = self
                .auth(self.http.get(self.table_url(table)).query(query))
                .send()
                .await
                .map_err(|e| GatewayError::Transient(e.to_string()))?;

            if resp.status().is_server_error() || resp.status().as_u16() == 429 {
                return Err(GatewayError::Transient(format!("status {}", resp.status())));
            }
            if resp.status() == reqwest::StatusCode::NOT_FOUND {
                return Err(GatewayError::NotFound);
            }
            if !resp.status().is_success() {
                return Err(GatewayError::ShapeMismatch(format!("status {}", resp.status())));
            }

            resp.json::<Value>()
                .await
                .map_err(|e| GatewayError::ShapeMismatch(e.to_string()))
        })
        .await
    }

    async fn post_json(&self, table: &str, body: &Value) -> Result<(), GatewayError> {
        with_retry(self.max_attempts, self.retry_base, self.retry_jitter, || async {
            let resp = self
                .auth(self.http.post(self.table_url(table)))
                .header("Content-Type", "application/json")
                .header("Prefer", "return=minimal")
                .json(body)
                .send()
                .await
                .map_err(|e| GatewayError::Transient(e.to_string()))?;

            if resp.status().is_server_error() || resp.status().as_u16() == 429 {
                return Err(GatewayError::Transient(format!("status {}", resp.status())));
            }
            if !resp.status().is_success() {
                return Err(GatewayError::ShapeMismatch(format!("status {}", resp.status())));
            }
            Ok(())
        })
        .await
    }

    async fn upsert_json(&self, table: &str, body: &Value) -> Result<(), GatewayError> {
        with_retry(self.max_attempts, self.retry_base, self.retry_jitter, || async {
            let resp = self
                .auth(self.http.post(self.table_url(table)))
                .header("Content-Type", "application/json")
                .header("Prefer", "resolution=merge-duplicates,return=minimal")
                .json(body)
                .send()
                .await
                .map_err(|e| GatewayError::Transient(e.to_string()))?;

            if resp.status().is_server_error() || resp.status().as_u16() == 429 {
                return Err(GatewayError::Transient(format!("status {}", resp.status())));
            }
            if !resp.status().is_success() {
                return Err(GatewayError::ShapeMismatch(format!("status {}", resp.status())));
            }
            Ok(())
        })
        .await
    }
}

fn str_field<'a>(row: &'a Value, field: &str) -> Result<&'a str, GatewayError> {
    row.get(field)
        .and_then(Value::as_str)
        .ok_or_else(|| GatewayError::ShapeMismatch(format!("missing field `{field}`")))
}

fn i8_field(row: &Value, field: &str) -> Result<i8, GatewayError> {
    row.get(field)
        .and_then(Value::as_i64)
        .map(|v| v as i8)
        .ok_or_else(|| GatewayError::ShapeMismatch(format!("missing field `{field}`")))
}

fn f64_field(row: &Value, field: &str) -> Result<f64, GatewayError> {
    row.get(field)
        .and_then(Value::as_f64)
        .ok_or_else(|| GatewayError::ShapeMismatch(format!("missing field `{field}`")))
}

fn timestamp_field(row: &Value, field: &str) -> Result<DateTime<Utc>, GatewayError> {
    let raw = str_field(row, field)?;
    raw.parse::<DateTime<Utc>>()
        .map_err(|e| GatewayError::ShapeMismatch(format!("bad timestamp `{field}`: {e}")))
}

fn parse_posture_row(row: &Value) -> Result<PostureSample, GatewayError> {
    Ok(PostureSample {
        user_id: str_field(row, "user_id")?.to_string(),
        timestamp: timestamp_field(row, "timestamp")?,
        overall_zone: i8_field(row, "overall_zone")?,
        neck_flexion: row.get("neck_flexion").and_then(Value::as_i64).map(|v| v as i8).unwrap_or(-1),
        neck_lateral_bend: row.get("neck_lateral_bend").and_then(Value::as_i64).map(|v| v as i8).unwrap_or(-1),
        shoulder_alignment: row.get("shoulder_alignment").and_then(Value::as_i64).map(|v| v as i8).unwrap_or(-1),
        arm_abduction: row.get("arm_abduction").and_then(Value::as_i64).map(|v| v as i8).unwrap_or(-1),
    })
}

fn parse_emotion(raw: &str) -> Emotion {
    match raw {
        "angry" => Emotion::Angry,
        "fear" => Emotion::Fear,
        "disgust" => Emotion::Disgust,
        "sad" => Emotion::Sad,
        "neutral" => Emotion::Neutral,
        "happy" => Emotion::Happy,
        "surprise" => Emotion::Surprise,
        _ => Emotion::Unknown,
    }
}

fn parse_stress_level(raw: &str) -> StressLevel {
    match raw {
        "muy bajo" => StressLevel::MuyBajo,
        "bajo" => StressLevel::Bajo,
        "medio" => StressLevel::Medio,
        "alto" => StressLevel::Alto,
        "muy alto" => StressLevel::MuyAlto,
        _ => StressLevel::Medio,
    }
}

fn parse_emotion_row(row: &Value) -> Result<crate::types::EmotionSample, GatewayError> {
    Ok(crate::types::EmotionSample {
        user_id: str_field(row, "user_id")?.to_string(),
        timestamp: timestamp_field(row, "timestamp")?,
        emotion: parse_emotion(str_field(row, "emotion")?),
        stress_level: parse_stress_level(str_field(row, "stress_level")?),
        stress_score: f64_field(row, "stress_score")?,
    })
}

#[async_trait]
impl RowStoreGateway for HttpRowStoreGateway {
    async fn recent_posture(&self, since: DateTime<Utc>) -> Result<Vec<PostureSample>, GatewayError> {
        let since_str = since.to_rfc3339();
        let body = self
            .get_json("posture", &[("timestamp", &format!("gte.{since_str}")), ("order", "timestamp.asc")])
            .await?;
        let rows = body.as_array().ok_or_else(|| GatewayError::ShapeMismatch("expected array".into()))?;
        rows.iter()
            .filter_map(|r| match parse_posture_row(r) {
                Ok(sample) => Some(Ok(sample)),
                Err(_) => None,
            })
            .collect()
    }

    async fn recent_emotions(
        &self,
        since: DateTime<Utc>,
        emotions: Option<&[Emotion]>,
    ) -> Result<Vec<crate::types::EmotionSample>, GatewayError> {
        let since_str = since.to_rfc3339();
        let mut query = vec![("timestamp", format!("gte.{since_str}")), ("order", "timestamp.asc".to_string())];
        if let Some(list) = emotions {
            let labels: Vec<&str> = list.iter().map(Emotion::label).collect();
            query.push(("emotion", format!("in.({})", labels.join(","))));
        }
        let query_ref: Vec<(&str, &str)> = query.iter().map(|(k, v)| (*k, v.as_str())).collect();
        let body = self.get_json("emotions", &query_ref).await?;
        let rows = body.as_array().ok_or_else(|| GatewayError::ShapeMismatch("expected array".into()))?;
        Ok(rows.iter().filter_map(|r| parse_emotion_row(r).ok()).collect())
    }

    async fn insert_recommendation(&self, rec: &Recommendation) -> Result<(), GatewayError> {
        let body = json!({
            "id": rec.id,
            "risk_tag": rec.risk_tag,
            "triggered_user_id": rec.triggered_user_id,
            "activity_name": rec.activity_name,
            "duration": rec.duration,
            "urgency": rec.urgency,
            "source": rec.source,
            "steps": rec.steps,
            "created_at": rec.created_at.to_rfc3339(),
        });
        self.post_json("recommendations", &body).await
    }

    async fn insert_response(&self, resp: &Response) -> Result<(), GatewayError> {
        let body = json!({
            "recommendation_id": resp.recommendation_id,
            "triggered_user_id": resp.triggered_user_id,
            "response": resp.response,
            "created_at": resp.created_at.to_rfc3339(),
        });
        self.post_json("recommendation_responses", &body).await
    }

    async fn gamification_get(&self, user_id: &str) -> Result<Option<GamificationEntry>, GatewayError> {
        let body = match self.get_json("gamification", &[("user_id", &format!("eq.{user_id}"))]).await {
            Ok(v) => v,
            Err(GatewayError::NotFound) => return Ok(None),
            Err(e) => return Err(e),
        };
        let rows = body.as_array().ok_or_else(|| GatewayError::ShapeMismatch("expected array".into()))?;
        match rows.first() {
            None => Ok(None),
            Some(row) => Ok(Some(GamificationEntry {
                user_id: user_id.to_string(),
                points: f64_field(row, "points")?,
                last_updated: timestamp_field(row, "last_updated").unwrap_or_else(|_| Utc::now()),
            })),
        }
    }

    async fn gamification_upsert(&self, user_id: &str, points: f64) -> Result<(), GatewayError> {
        let body = json!({
            "user_id": user_id,
            "points": points,
            "last_updated": Utc::now().to_rfc3339(),
        });
        self.upsert_json("gamification", &body).await
    }

    async fn leaderboard(&self) -> Result<Vec<LeaderboardEntry>, GatewayError> {
        let body = self
            .get_json("gamification", &[("order", "points.desc"), ("select", "user_id,points,Employees(Name)")])
            .await?;
        let rows = body.as_array().ok_or_else(|| GatewayError::ShapeMismatch("expected array".into()))?;
        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            let user_id = str_field(row, "user_id")?.to_string();
            let points = f64_field(row, "points")?;
            let display_name = row
                .get("Employees")
                .and_then(|e| e.get("Name"))
                .and_then(Value::as_str)
                .unwrap_or(&user_id)
                .to_string();
            out.push(LeaderboardEntry { user_id, display_name, points });
        }
        Ok(out)
    }

    async fn history_for_training(&self) -> Result<Vec<TrainingRow>, GatewayError> {
        let body = self
            .get_json(
                "recommendation_responses",
                &[("select", "triggered_user_id,response,created_at,recommendations(activity_name)")],
            )
            .await?;
        let rows = body.as_array().ok_or_else(|| GatewayError::ShapeMismatch("expected array".into()))?;
        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            let response_str = str_field(row, "response")?;
            let Some(response) = ResponseKind::from_str(response_str) else {
                continue;
            };
            let activity_name = row
                .get("recommendations")
                .and_then(|r| r.get("activity_name"))
                .and_then(Value::as_str)
                .map(str::to_string);
            let Some(activity_name) = activity_name else { continue };
            out.push(TrainingRow {
                triggered_user_id: str_field(row, "triggered_user_id")?.to_string(),
                activity_name,
                response_created_at: timestamp_field(row, "created_at")?,
                response,
            });
        }
        Ok(out)
    }

    async fn stress_scores(&self, user_id: &str, days: i64) -> Result<Vec<f64>, GatewayError> {
        let since = (Utc::now() - chrono::Duration::days(days)).to_rfc3339();
        let body = self
            .get_json(
                "emotions",
                &[("user_id", &format!("eq.{user_id}")), ("timestamp", &format!("gte.{since}"))],
            )
            .await?;
        let rows = body.as_array().ok_or_else(|| GatewayError::ShapeMismatch("expected array".into()))?;
        Ok(rows.iter().filter_map(|r| f64_field(r, "stress_score").ok()).collect())
    }

    async fn high_risk_posture_count(&self, user_id: &str, days: i64) -> Result<u64, GatewayError> {
        let since = (Utc::now() - chrono::Duration::days(days)).to_rfc3339();
        let body = self
            .get_json(
                "posture",
                &[
                    ("user_id", &format!("eq.{user_id}")),
                    ("timestamp", &format!("gte.{since}")),
                    ("neck_lateral_bend", "gte.3"),
                    ("select", "user_id"),
                ],
            )
            .await?;
        let rows = body.as_array().ok_or_else(|| GatewayError::ShapeMismatch("expected array".into()))?;
        Ok(rows.len() as u64)
    }

    async fn known_user_ids(&self) -> Result<Vec<String>, GatewayError> {
        let body = self.get_json("gamification", &[("select", "user_id")]).await?;
        let rows = body.as_array().ok_or_else(|| GatewayError::ShapeMismatch("expected array".into()))?;
        Ok(rows.iter().filter_map(|r| str_field(r, "user_id").ok().map(str::to_string)).collect())
    }
}
