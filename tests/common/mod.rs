use std::sync::Arc;

use anyhow::{anyhow, ensure, Result};
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use chrono::Duration;
use docvault::auth::jwt::JwtService;
use docvault::config::AppConfig;
use docvault::db;
use docvault::routes;
use docvault::state::AppState;
use docvault::store::{DocumentStore, MemoryStore, UserStore};
use http_body_util::BodyExt;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use tower::util::ServiceExt;

pub const TEST_PASSWORD: &str = "correct-horse";

pub fn test_config() -> AppConfig {
    AppConfig {
        database_url: None,
        database_max_pool_size: db::DEFAULT_MAX_POOL_SIZE,
        server_host: "127.0.0.1".to_string(),
        server_port: 0,
        jwt_secret: "test-secret".to_string(),
        jwt_issuer: "test-issuer".to_string(),
        jwt_audience: "test-audience".to_string(),
        jwt_expiry_minutes: 60,
        cors_allowed_origin: None,
        external_ingest_key: None,
    }
}

#[allow(dead_code)]
pub fn test_jwt() -> JwtService {
    JwtService::new(
        "test-secret",
        "test-issuer",
        "test-audience",
        Duration::minutes(60),
    )
}

pub struct TestApp {
    pub state: AppState,
    router: Router,
}

#[allow(dead_code)]
pub struct RegisteredUser {
    pub id: i64,
    pub email: String,
    pub token: String,
}

impl TestApp {
    pub fn new() -> Result<Self> {
        Self::with_config(test_config())
    }

    pub fn with_config(config: AppConfig) -> Result<Self> {
        let store = Arc::new(MemoryStore::new());
        Self::with_stores(config, store.clone(), store)
    }

    pub fn with_stores(
        config: AppConfig,
        users: Arc<dyn UserStore>,
        documents: Arc<dyn DocumentStore>,
    ) -> Result<Self> {
        let jwt = Arc::new(JwtService::from_config(&config)?);
        let state = AppState::new(config, users, documents, jwt);
        let router = routes::create_router(state.clone());
        Ok(Self { state, router })
    }

    pub async fn register(&self, email: &str, name: &str) -> Result<RegisteredUser> {
        let response = self
            .post_json(
                "/api/auth/register",
                &json!({ "email": email, "password": TEST_PASSWORD, "name": name }),
                None,
            )
            .await?;
        ensure!(
            response.status() == StatusCode::CREATED,
            "registration failed with status {}",
            response.status()
        );

        let body: Value = read_json(response).await?;
        Ok(RegisteredUser {
            id: body["user"]["id"]
                .as_i64()
                .ok_or_else(|| anyhow!("missing user id"))?,
            email: body["user"]["email"]
                .as_str()
                .ok_or_else(|| anyhow!("missing user email"))?
                .to_string(),
            token: body["token"]
                .as_str()
                .ok_or_else(|| anyhow!("missing token"))?
                .to_string(),
        })
    }

    #[allow(dead_code)]
    pub async fn login_token(&self, email: &str, password: &str) -> Result<String> {
        let response = self
            .post_json(
                "/api/auth/login",
                &json!({ "email": email, "password": password }),
                None,
            )
            .await?;
        ensure!(
            response.status() == StatusCode::OK,
            "login failed with status {}",
            response.status()
        );
        let body: Value = read_json(response).await?;
        body["token"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| anyhow!("missing token"))
    }

    /// Uploads a web-interface document and returns its JSON representation.
    #[allow(dead_code)]
    pub async fn upload(&self, token: &str, document: Value) -> Result<Value> {
        let response = self.post_json("/api/documents", &document, Some(token)).await?;
        ensure!(
            response.status() == StatusCode::CREATED,
            "upload failed with status {}",
            response.status()
        );
        read_json(response).await
    }

    pub async fn post_json<T: Serialize + ?Sized>(
        &self,
        path: &str,
        payload: &T,
        token: Option<&str>,
    ) -> Result<hyper::Response<Body>> {
        self.send_json(Method::POST, path, payload, token, &[]).await
    }

    #[allow(dead_code)]
    pub async fn patch_json<T: Serialize + ?Sized>(
        &self,
        path: &str,
        payload: &T,
        token: Option<&str>,
    ) -> Result<hyper::Response<Body>> {
        self.send_json(Method::PATCH, path, payload, token, &[]).await
    }

    pub async fn send_json<T: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        payload: &T,
        token: Option<&str>,
        extra_headers: &[(&str, &str)],
    ) -> Result<hyper::Response<Body>> {
        let body = serde_json::to_vec(payload)?;
        let mut builder = Request::builder()
            .method(method)
            .uri(path)
            .header("content-type", "application/json");
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        for (name, value) in extra_headers {
            builder = builder.header(*name, *value);
        }
        let request = builder.body(Body::from(body))?;
        Ok(self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("infallible response"))
    }

    pub async fn get(&self, path: &str, token: Option<&str>) -> Result<hyper::Response<Body>> {
        let mut builder = Request::builder().method(Method::GET).uri(path);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        let request = builder.body(Body::empty())?;
        Ok(self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("infallible response"))
    }

    #[allow(dead_code)]
    pub async fn delete(&self, path: &str, token: Option<&str>) -> Result<hyper::Response<Body>> {
        let builder = Request::builder().method(Method::DELETE).uri(path);
        let builder = if let Some(token) = token {
            builder.header("authorization", format!("Bearer {token}"))
        } else {
            builder
        };
        let request = builder.body(Body::empty())?;
        Ok(self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("infallible response"))
    }
}

/// A minimal valid upload body; callers override fields as needed.
#[allow(dead_code)]
pub fn document_body(filename: &str, file_type: &str, content_text: Option<&str>) -> Value {
    json!({
        "filename": filename,
        "original_filename": filename,
        "file_type": file_type,
        "file_size": 1024,
        "file_path": format!("/uploads/{filename}"),
        "content_text": content_text,
        "upload_source": "WEB_INTERFACE",
    })
}

pub async fn body_to_vec(body: Body) -> Result<Vec<u8>> {
    let collected = body
        .collect()
        .await
        .map_err(|err| anyhow!("failed to read response body: {err}"))?;
    Ok(collected.to_bytes().to_vec())
}

pub async fn read_json<T: DeserializeOwned>(response: hyper::Response<Body>) -> Result<T> {
    let body = body_to_vec(response.into_body()).await?;
    Ok(serde_json::from_slice(&body)?)
}
