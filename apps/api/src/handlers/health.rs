use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use sqlx::PgPool;

use crate::dto::HealthResponse;
use crate::state::AppState;

pub async fn health_handler(
    State(state): State<AppState>,
) -> (StatusCode, Json<HealthResponse>) {
    let Some(pool) = state.pool else {
        return (
            StatusCode::OK,
            Json(HealthResponse {
                status: "ok",
                store: "memory",
                detail: None,
            }),
        );
    };

    match check_postgres(&pool).await {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "ok",
                store: "postgres",
                detail: None,
            }),
        ),
        Err(detail) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthResponse {
                status: "error",
                store: "postgres",
                detail: Some(detail),
            }),
        ),
    }
}

async fn check_postgres(pool: &PgPool) -> Result<(), String> {
    sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(pool)
        .await
        .map(|_| ())
        .map_err(|error| format!("postgres check failed: {error}"))
}
