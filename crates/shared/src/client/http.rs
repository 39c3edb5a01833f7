use crate::{
    abstract_trait::BackendClientTrait,
    config::BackendConfig,
    domain::{
        requests::{CreateUserRequest, DocumentUpload, LoginRequest, QueryRequest, RegisterRequest},
        responses::{
            AnalyticsStats, DocumentMetadata, HealthStatus, LoginResponse, QueryResponse,
            SearchHistoryEntry,
        },
    },
    errors::ClientError,
    model::{Principal, Role},
    utils::{Method, Metrics, Status as StatusUtils, TracingContext},
};
use async_trait::async_trait;
use opentelemetry::{
    Context, KeyValue,
    global::{self, BoxedTracer},
    trace::{Span, SpanKind, TraceContextExt, Tracer},
};
use reqwest::{
    RequestBuilder, Response, StatusCode,
    multipart::{Form, Part},
};
use serde::de::DeserializeOwned;
use serde_json::json;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{error, info};

/// reqwest-backed client for the document backend.
#[derive(Debug, Clone)]
pub struct BackendHttpClient {
    client: reqwest::Client,
    config: BackendConfig,
    metrics: Metrics,
}

impl BackendHttpClient {
    pub fn new(config: BackendConfig, metrics: Metrics) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .connect_timeout(config.timeouts.connect)
            .build()?;

        Ok(Self {
            client,
            config,
            metrics,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url, path)
    }

    fn default_timeout(&self) -> Duration {
        self.config.timeouts.default
    }

    fn get_tracer(&self) -> BoxedTracer {
        global::tracer("backend-client")
    }

    fn start_tracing(&self, operation_name: &str, attributes: Vec<KeyValue>) -> TracingContext {
        let start_time = Instant::now();
        let tracer = self.get_tracer();
        let mut span = tracer
            .span_builder(operation_name.to_string())
            .with_kind(SpanKind::Client)
            .with_attributes(attributes)
            .start(&tracer);

        info!("Starting backend call: {operation_name}");

        span.add_event(
            "Backend call started",
            vec![KeyValue::new("operation", operation_name.to_string())],
        );

        let cx = Context::current_with_span(span);
        TracingContext { cx, start_time }
    }

    fn complete_tracing(
        &self,
        tracing_ctx: &TracingContext,
        method: Method,
        is_success: bool,
        message: &str,
    ) {
        let status_str = if is_success { "SUCCESS" } else { "ERROR" };
        let status = if is_success {
            StatusUtils::Success
        } else {
            StatusUtils::Error
        };
        let elapsed = tracing_ctx.start_time.elapsed().as_secs_f64();

        tracing_ctx.cx.span().add_event(
            "Backend call completed",
            vec![
                KeyValue::new("status", status_str),
                KeyValue::new("duration_secs", elapsed.to_string()),
                KeyValue::new("message", message.to_string()),
            ],
        );

        if is_success {
            info!("Backend call completed: {message}");
        } else {
            error!("Backend call failed: {message}");
        }

        self.metrics.record(method, status, elapsed);

        tracing_ctx.cx.span().end();
    }

    /// Sends the request. The backend answers 200 on success, so any other
    /// status becomes a `ClientError`.
    async fn execute(
        &self,
        operation: &str,
        method: Method,
        request: RequestBuilder,
    ) -> Result<Response, ClientError> {
        let tracing_ctx = self.start_tracing(
            operation,
            vec![
                KeyValue::new("component", "backend"),
                KeyValue::new("operation", operation.to_string()),
            ],
        );

        let result = match request.send().await {
            Ok(response) if response.status() == StatusCode::OK => Ok(response),
            Ok(response) => {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                Err(ClientError::from_status(status, body))
            }
            Err(err) => Err(ClientError::from(err)),
        };

        match &result {
            Ok(_) => self.complete_tracing(&tracing_ctx, method, true, operation),
            Err(err) => {
                self.complete_tracing(&tracing_ctx, method, false, &format!("{operation}: {err}"))
            }
        }

        result
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        operation: &str,
        method: Method,
        request: RequestBuilder,
    ) -> Result<T, ClientError> {
        let response = self.execute(operation, method, request).await?;
        response
            .json::<T>()
            .await
            .map_err(|err| ClientError::Decode(err.to_string()))
    }

    async fn submit(
        &self,
        operation: &str,
        method: Method,
        request: RequestBuilder,
    ) -> Result<(), ClientError> {
        self.execute(operation, method, request).await.map(|_| ())
    }
}

#[async_trait]
impl BackendClientTrait for BackendHttpClient {
    async fn login(&self, req: &LoginRequest) -> Result<LoginResponse, ClientError> {
        let request = self
            .client
            .post(self.url("/auth/login"))
            .timeout(self.default_timeout())
            .json(req);

        self.fetch("Login", Method::Post, request).await
    }

    async fn register(&self, req: &RegisterRequest) -> Result<Principal, ClientError> {
        let request = self
            .client
            .post(self.url("/auth/register"))
            .timeout(self.default_timeout())
            .json(req);

        self.fetch("Register", Method::Post, request).await
    }

    async fn current_user(&self, token: &str) -> Result<Principal, ClientError> {
        let request = self
            .client
            .get(self.url("/auth/me"))
            .timeout(self.default_timeout())
            .bearer_auth(token);

        self.fetch("CurrentUser", Method::Get, request).await
    }

    async fn create_user(&self, token: &str, req: &CreateUserRequest) -> Result<(), ClientError> {
        let request = self
            .client
            .post(self.url("/auth/users/create"))
            .timeout(self.default_timeout())
            .bearer_auth(token)
            .json(req);

        self.submit("CreateUser", Method::Post, request).await
    }

    async fn list_users(&self, token: &str) -> Result<Vec<Principal>, ClientError> {
        let request = self
            .client
            .get(self.url("/auth/users"))
            .timeout(self.default_timeout())
            .bearer_auth(token);

        self.fetch("ListUsers", Method::Get, request).await
    }

    async fn update_role(&self, token: &str, user_id: i64, role: Role) -> Result<(), ClientError> {
        let request = self
            .client
            .put(self.url(&format!("/auth/users/{user_id}/role")))
            .timeout(self.default_timeout())
            .bearer_auth(token)
            .json(&json!({ "role": role }));

        self.submit("UpdateRole", Method::Put, request).await
    }

    async fn deactivate_user(&self, token: &str, user_id: i64) -> Result<(), ClientError> {
        let request = self
            .client
            .put(self.url(&format!("/auth/users/{user_id}/deactivate")))
            .timeout(self.default_timeout())
            .bearer_auth(token);

        self.submit("DeactivateUser", Method::Put, request).await
    }

    async fn search_history(
        &self,
        token: &str,
        limit: u32,
    ) -> Result<Vec<SearchHistoryEntry>, ClientError> {
        let request = self
            .client
            .get(self.url("/search/history"))
            .timeout(self.default_timeout())
            .bearer_auth(token)
            .query(&[("limit", limit)]);

        self.fetch("SearchHistory", Method::Get, request).await
    }

    async fn analytics(&self, token: &str) -> Result<AnalyticsStats, ClientError> {
        let request = self
            .client
            .get(self.url("/analytics/stats"))
            .timeout(self.default_timeout())
            .bearer_auth(token);

        self.fetch("Analytics", Method::Get, request).await
    }

    async fn upload_document(
        &self,
        token: &str,
        upload: DocumentUpload,
    ) -> Result<DocumentMetadata, ClientError> {
        let mut part = Part::bytes(upload.content).file_name(upload.file_name);
        if let Some(content_type) = upload.content_type.as_deref() {
            part = part.mime_str(content_type)?;
        }

        let request = self
            .client
            .post(self.url("/upload"))
            .timeout(self.config.timeouts.upload)
            .bearer_auth(token)
            .multipart(Form::new().part("file", part));

        self.fetch("UploadDocument", Method::Post, request).await
    }

    async fn list_documents(&self, token: &str) -> Result<Vec<DocumentMetadata>, ClientError> {
        let request = self
            .client
            .get(self.url("/documents"))
            .timeout(self.default_timeout())
            .bearer_auth(token);

        self.fetch("ListDocuments", Method::Get, request).await
    }

    async fn delete_document(&self, token: &str, document_id: i64) -> Result<(), ClientError> {
        let request = self
            .client
            .delete(self.url(&format!("/documents/{document_id}")))
            .timeout(self.default_timeout())
            .bearer_auth(token);

        self.submit("DeleteDocument", Method::Delete, request).await
    }

    async fn query(&self, token: &str, req: &QueryRequest) -> Result<QueryResponse, ClientError> {
        let request = self
            .client
            .post(self.url("/query"))
            .timeout(self.config.timeouts.query)
            .bearer_auth(token)
            .json(req);

        self.fetch("Query", Method::Post, request).await
    }

    async fn health(&self) -> Result<HealthStatus, ClientError> {
        let request = self
            .client
            .get(self.url("/health"))
            .timeout(self.config.timeouts.health);

        self.fetch("Health", Method::Get, request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_paths_onto_base_url() {
        let client =
            BackendHttpClient::new(BackendConfig::new("http://backend:8000/"), Metrics::new())
                .unwrap();

        assert_eq!(client.base_url(), "http://backend:8000");
        assert_eq!(client.url("/auth/me"), "http://backend:8000/auth/me");
    }

    #[tokio::test]
    async fn only_200_counts_as_success() {
        use axum::{Json, Router, http::StatusCode as AxumStatus, routing::{get, post}};

        let app = Router::new()
            .route("/auth/users/create", post(|| async { AxumStatus::ACCEPTED }))
            .route("/health", get(|| async { Json(json!({ "status": "healthy" })) }));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await });

        let client =
            BackendHttpClient::new(BackendConfig::new(format!("http://{addr}")), Metrics::new())
                .unwrap();

        let req = CreateUserRequest {
            username: "carol".into(),
            email: "carol@example.com".into(),
            password: "secret1".into(),
            role: Role::User,
        };
        let err = client.create_user("tok1", &req).await.unwrap_err();
        assert!(matches!(err, ClientError::Status { status: 202, .. }));
        assert!(!err.is_unreachable());

        assert_eq!(client.health().await.unwrap().status, "healthy");
    }

    #[tokio::test]
    async fn unreachable_backend_is_a_transport_failure() {
        let client =
            BackendHttpClient::new(BackendConfig::new("http://127.0.0.1:9"), Metrics::new())
                .unwrap();

        let err = client.health().await.unwrap_err();
        assert!(err.is_unreachable());
    }
}
