use actix_web::{web, HttpResponse};
use serde::Deserialize;
use sqlx::SqlitePool;
use chrono::Utc;
use crate::errors::AppError;
use crate::handlers::activity::RECORD_COLUMNS;
use crate::models::activity::ActivityRecord;
use crate::models::summary::{summarize, SummaryWindow, DEFAULT_SUMMARY_DAYS};
use crate::utils::jwt::AuthUser;

#[derive(Deserialize)]
pub struct SummaryQuery {
    days: Option<u32>,
}

// GET /v1/api/activities/summary?days=N
pub async fn get_summary(
    user: AuthUser,
    pool: web::Data<SqlitePool>,
    query: web::Query<SummaryQuery>,
) -> Result<HttpResponse, AppError> {
    let window = SummaryWindow::ending_at(Utc::now(), query.days.unwrap_or(DEFAULT_SUMMARY_DAYS))?;

    let records = sqlx::query_as::<_, ActivityRecord>(&format!(
        "SELECT {} FROM activity_records
        WHERE user_id = ? AND end_time >= ? AND end_time < ?
        ORDER BY end_time DESC, id DESC",
        RECORD_COLUMNS
    ))
    .bind(user.0)
    .bind(window.start)
    .bind(window.end)
    .fetch_all(&**pool)
    .await?;

    Ok(HttpResponse::Ok().json(summarize(&records, &window)))
}
