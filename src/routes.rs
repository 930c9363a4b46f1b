use actix_web::{web, HttpResponse};

use crate::errors::AppError;
use crate::handlers::{activity, auth, summary};

/// Mounts every `/v1/api` route. Callers register the pool, `TokenService`
/// and `PasswordHasher` as app data. Protected handlers take an `AuthUser`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        AppError::BadRequest(err.to_string()).into()
    }))
    .app_data(web::QueryConfig::default().error_handler(|err, _req| {
        AppError::BadRequest(err.to_string()).into()
    }))
    // Non-numeric ids are indistinguishable from unknown ones.
    .app_data(web::PathConfig::default().error_handler(|_err, _req| {
        AppError::NotFound("Activity record not found".to_string()).into()
    }))
    .service(
        web::scope("/v1/api")
            .service(
                web::resource("/register")
                    .route(web::post().to(auth::register)),
            )
            .service(
                web::resource("/login")
                    .route(web::post().to(auth::login)),
            )
            .service(
                web::resource("/logout")
                    .route(web::post().to(auth::logout)),
            )
            .service(
                web::resource("/activity")
                    .route(web::post().to(activity::create_activity)),
            )
            .service(
                web::resource("/activities")
                    .route(web::get().to(activity::get_activities)),
            )
            .service(
                web::resource("/activities/summary")
                    .route(web::get().to(summary::get_summary)),
            )
            .service(
                web::resource("/activity/{id}")
                    .route(web::get().to(activity::get_activity))
                    .route(web::put().to(activity::update_activity))
                    .route(web::delete().to(activity::delete_activity)),
            )
            .default_service(web::to(not_found)),
    );
}

async fn not_found() -> Result<HttpResponse, AppError> {
    Err(AppError::NotFound("Not found".to_string()))
}
