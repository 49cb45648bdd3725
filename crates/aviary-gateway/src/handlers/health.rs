use crate::model::HealthResponse;
use axum::Json;

/// Liveness probe. Does not touch storage.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reports_ok() {
        let Json(body) = health_handler().await;
        assert_eq!(serde_json::to_string(&body).unwrap(), r#"{"status":"ok"}"#);
    }
}
