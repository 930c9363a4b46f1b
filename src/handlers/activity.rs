use actix_web::{web, HttpResponse};
use serde::{Deserialize, Deserializer};
use sqlx::{Sqlite, SqlitePool};
use validator::Validate;
use chrono::Utc;
use log::info;
use crate::models::activity::{ActivityRecord, ActivityType};
use crate::errors::AppError;
use crate::utils::jwt::AuthUser;
use crate::utils::time::{duration_seconds, parse_timestamp};
use crate::utils::validation::{require_non_blank, validate_activity_type, validate_payload};

pub(crate) const RECORD_COLUMNS: &str =
    "id, user_id, title, record_type, start_time, end_time, duration_seconds, memo, created_at, updated_at";

const NOT_FOUND: &str = "Activity record not found";

#[derive(Deserialize, Validate)]
pub struct CreateActivityRequest {
    #[validate(required(message = "Title is required"))]
    #[validate(length(min = 1, max = 200, message = "Title must be between 1 and 200 characters"))]
    title: Option<String>,

    #[serde(rename = "type")]
    #[validate(required(message = "Type is required"))]
    record_type: Option<String>,

    #[validate(required(message = "Start time is required"))]
    start_time: Option<String>,

    #[validate(required(message = "End time is required"))]
    end_time: Option<String>,

    memo: Option<String>,
}

/// Partial update; `"memo": null` clears the memo.
#[derive(Deserialize, Validate)]
pub struct UpdateActivityRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be between 1 and 200 characters"))]
    title: Option<String>,

    #[serde(rename = "type")]
    record_type: Option<String>,

    start_time: Option<String>,

    end_time: Option<String>,

    #[serde(default, deserialize_with = "present")]
    memo: Option<Option<String>>,
}

fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

async fn fetch_owned_record<'e, E>(
    executor: E,
    record_id: i64,
    user_id: i64,
) -> Result<ActivityRecord, AppError>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, ActivityRecord>(&format!(
        "SELECT {} FROM activity_records WHERE id = ? AND user_id = ?",
        RECORD_COLUMNS
    ))
    .bind(record_id)
    .bind(user_id)
    .fetch_optional(executor)
    .await?
    .ok_or_else(|| AppError::NotFound(NOT_FOUND.to_string()))
}

// POST /v1/api/activity
pub async fn create_activity(
    user: AuthUser,
    pool: web::Data<SqlitePool>,
    payload: web::Json<CreateActivityRequest>,
) -> Result<HttpResponse, AppError> {
    let payload = payload.into_inner();
    validate_payload(&payload)?;

    let title = payload.title.unwrap_or_default();
    require_non_blank("Title", &title)?;
    let record_type = validate_activity_type(payload.record_type.as_deref().unwrap_or_default())?;
    let start_time = parse_timestamp(payload.start_time.as_deref().unwrap_or_default())?;
    let end_time = parse_timestamp(payload.end_time.as_deref().unwrap_or_default())?;

    let duration = duration_seconds(start_time, end_time);
    let memo = payload.memo.filter(|_| record_type.allows_memo());

    let now = Utc::now();
    let mut tx = pool.begin().await?;
    let record = sqlx::query_as::<_, ActivityRecord>(&format!(
        "INSERT INTO activity_records
            (user_id, title, record_type, start_time, end_time, duration_seconds, memo, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING {}",
        RECORD_COLUMNS
    ))
    .bind(user.0)
    .bind(&title)
    .bind(record_type)
    .bind(start_time)
    .bind(end_time)
    .bind(duration)
    .bind(&memo)
    .bind(now)
    .bind(now)
    .fetch_one(&mut *tx)
    .await?;
    tx.commit().await?;

    info!("User {} created {} record {}", user.0, record.record_type, record.id);

    Ok(HttpResponse::Created().json(record))
}

// GET /v1/api/activities
pub async fn get_activities(
    user: AuthUser,
    pool: web::Data<SqlitePool>,
) -> Result<HttpResponse, AppError> {
    let records = sqlx::query_as::<_, ActivityRecord>(&format!(
        "SELECT {} FROM activity_records WHERE user_id = ? ORDER BY end_time DESC, id DESC",
        RECORD_COLUMNS
    ))
    .bind(user.0)
    .fetch_all(&**pool)
    .await?;

    Ok(HttpResponse::Ok().json(records))
}

// GET /v1/api/activity/{id}
pub async fn get_activity(
    user: AuthUser,
    pool: web::Data<SqlitePool>,
    record_id: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let record = fetch_owned_record(&**pool, *record_id, user.0).await?;
    Ok(HttpResponse::Ok().json(record))
}

// PUT /v1/api/activity/{id}
pub async fn update_activity(
    user: AuthUser,
    pool: web::Data<SqlitePool>,
    record_id: web::Path<i64>,
    payload: web::Json<UpdateActivityRequest>,
) -> Result<HttpResponse, AppError> {
    let patch = payload.into_inner();
    validate_payload(&patch)?;

    let mut tx = pool.begin().await?;
    let existing = fetch_owned_record(&mut *tx, *record_id, user.0).await?;

    let record_type = match patch.record_type.as_deref() {
        Some(raw) => validate_activity_type(raw)?,
        None => existing.record_type,
    };

    let sets_memo = matches!(patch.memo, Some(Some(_)));
    if sets_memo && (!existing.record_type.allows_memo() || !record_type.allows_memo()) {
        return Err(AppError::Forbidden(format!(
            "Memo cannot be set on {} records",
            ActivityType::App
        )));
    }

    let title = match patch.title {
        Some(title) => {
            require_non_blank("Title", &title)?;
            title
        }
        None => existing.title,
    };

    let timestamps_changed = patch.start_time.is_some() || patch.end_time.is_some();
    let start_time = match patch.start_time.as_deref() {
        Some(raw) => parse_timestamp(raw)?,
        None => existing.start_time,
    };
    let end_time = match patch.end_time.as_deref() {
        Some(raw) => parse_timestamp(raw)?,
        None => existing.end_time,
    };
    let duration = if timestamps_changed {
        duration_seconds(start_time, end_time)
    } else {
        existing.duration_seconds
    };

    let memo = patch
        .memo
        .unwrap_or(existing.memo)
        .filter(|_| record_type.allows_memo());

    let record = sqlx::query_as::<_, ActivityRecord>(&format!(
        "UPDATE activity_records
        SET title = ?, record_type = ?, start_time = ?, end_time = ?, duration_seconds = ?, memo = ?, updated_at = ?
        WHERE id = ? AND user_id = ?
        RETURNING {}",
        RECORD_COLUMNS
    ))
    .bind(&title)
    .bind(record_type)
    .bind(start_time)
    .bind(end_time)
    .bind(duration)
    .bind(&memo)
    .bind(Utc::now())
    .bind(existing.id)
    .bind(user.0)
    .fetch_one(&mut *tx)
    .await?;
    tx.commit().await?;

    info!("User {} updated record {}", user.0, record.id);

    Ok(HttpResponse::Ok().json(record))
}

// DELETE /v1/api/activity/{id}
pub async fn delete_activity(
    user: AuthUser,
    pool: web::Data<SqlitePool>,
    record_id: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let mut tx = pool.begin().await?;
    let result = sqlx::query("DELETE FROM activity_records WHERE id = ? AND user_id = ?")
        .bind(*record_id)
        .bind(user.0)
        .execute(&mut *tx)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(NOT_FOUND.to_string()));
    }
    tx.commit().await?;

    info!("User {} deleted record {}", user.0, *record_id);

    Ok(HttpResponse::Ok().json(serde_json::json!({ "message": "Activity record deleted successfully" })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_distinguishes_null_memo_from_missing_memo() {
        let cleared: UpdateActivityRequest = serde_json::from_str(r#"{"memo": null}"#).unwrap();
        assert_eq!(cleared.memo, Some(None));

        let untouched: UpdateActivityRequest = serde_json::from_str(r#"{"title": "Reading"}"#).unwrap();
        assert_eq!(untouched.memo, None);

        let set: UpdateActivityRequest = serde_json::from_str(r#"{"memo": "note"}"#).unwrap();
        assert_eq!(set.memo, Some(Some("note".to_string())));
    }

    #[test]
    fn create_requires_every_mandatory_field() {
        let payload: CreateActivityRequest =
            serde_json::from_str(r#"{"title": "Reading", "type": "MANUAL"}"#).unwrap();
        assert!(validate_payload(&payload).is_err());
    }

    #[test]
    fn create_ignores_client_duration() {
        let payload: CreateActivityRequest = serde_json::from_str(
            r#"{"title": "Reading", "type": "MANUAL", "start_time": "2024-01-01T10:00:00Z",
                "end_time": "2024-01-01T10:30:00Z", "duration_seconds": 999}"#,
        )
        .unwrap();
        assert!(validate_payload(&payload).is_ok());
    }
}
