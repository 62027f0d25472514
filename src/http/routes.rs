use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::{
    detection::DetectionService, domain::Verdict, features::FEATURE_VERSION,
    whois::RegistrationProvider,
};

use super::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct CheckUrlRequest {
    pub url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
    model: String,
    features: usize,
    feature_version: u8,
}

pub fn router<P>(service: Arc<DetectionService<P>>) -> Router
where
    P: RegistrationProvider + 'static,
{
    Router::new()
        .route("/health", get(health::<P>))
        .route("/api/check_url", post(check_url::<P>))
        .with_state(service)
}

async fn check_url<P>(
    State(service): State<Arc<DetectionService<P>>>,
    payload: Result<Json<CheckUrlRequest>, JsonRejection>,
) -> Result<Json<Verdict>, ApiError>
where
    P: RegistrationProvider + 'static,
{
    let Json(request) = payload.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
    let url = request
        .url
        .filter(|url| !url.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("url is required".to_string()))?;

    let verdict = service.evaluate(&url).await?;
    Ok(Json(verdict))
}

async fn health<P>(State(service): State<Arc<DetectionService<P>>>) -> Json<HealthResponse>
where
    P: RegistrationProvider + 'static,
{
    let scorer = service.scorer();
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        model: scorer.name().to_string(),
        features: scorer.input_width(),
        feature_version: FEATURE_VERSION,
    })
}

#[cfg(test)]
mod tests {
    use std::{path::Path, time::Duration};

    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
    };
    use chrono::Utc;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::{
        config::{FailurePolicy, RegistrationConfig, WhoisConfig},
        features::layout::FEATURE_COUNT,
        model::ClassifierScorer,
        whois::{
            testing::{Behavior, FakeProvider},
            RegistrationAgeSignal,
        },
    };

    fn app(behavior: Behavior) -> Router {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("models/phishing_model.onnx");
        let scorer = Arc::new(ClassifierScorer::load(&path).unwrap());
        let registration = RegistrationAgeSignal::new(
            FakeProvider::new(behavior),
            &RegistrationConfig {
                recent_threshold: chrono::Duration::days(180),
                failure_policy: FailurePolicy::Open,
            },
            &WhoisConfig {
                api_url: String::new(),
                api_key: Some("k".into()),
                timeout: Duration::from_millis(100),
                max_retries: 0,
            },
        );
        router(Arc::new(DetectionService::new(scorer, registration)))
    }

    async fn post_json(app: Router, body: String) -> (StatusCode, Value) {
        let response = app
            .oneshot(
                Request::post("/api/check_url")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    #[tokio::test]
    async fn check_url_returns_verdict() {
        let app = app(Behavior::Created(Utc::now() - chrono::Duration::days(3)));
        let (status, body) = post_json(
            app,
            json!({"url": "http://paypa1-login.verify-account.com/update"}).to_string(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({
                "is_phishing": true,
                "reasons": [
                    "URL looks suspicious (ML Detection)",
                    "Domain is too new (WHOIS Check)"
                ]
            })
        );
    }

    #[tokio::test]
    async fn provider_outage_is_invisible_to_callers() {
        let app = app(Behavior::Status(500));
        let (status, body) =
            post_json(app, json!({"url": "https://www.wikipedia.org"}).to_string()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"is_phishing": false, "reasons": []}));
    }

    #[tokio::test]
    async fn missing_or_blank_url_is_a_client_error() {
        for body in [json!({}).to_string(), json!({"url": ""}).to_string()] {
            let (status, body) = post_json(app(Behavior::Missing), body).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body["status"], 400);
        }
    }

    #[tokio::test]
    async fn malformed_json_is_a_client_error() {
        let (status, _) = post_json(app(Behavior::Missing), "{not json".to_string()).await;
        assert!(status.is_client_error());
    }

    #[tokio::test]
    async fn health_reports_model() {
        let response = app(Behavior::Missing)
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["status"], "ok");
        assert_eq!(body["features"], FEATURE_COUNT);
    }
}
