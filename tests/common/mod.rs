#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use serde_json::Value;
use std::sync::Arc;
use tower::util::ServiceExt;
use zip_api::{
    AppConfig, AppState, InMemoryRepository, Repository, RepositoryState, auth, create_router,
    models::{County, CreateCityRequest, CreateCountyRequest, NewUser, User},
};

/// Test fixture: an in-memory store, the router built on it, and a token for
/// a registered user.
pub struct TestApp {
    pub repo: Arc<InMemoryRepository>,
    pub router: Router,
    pub config: AppConfig,
    pub user: User,
    pub token: String,
}

impl TestApp {
    pub async fn new() -> Self {
        let repo = Arc::new(InMemoryRepository::new());
        let config = AppConfig::default();

        // A placeholder hash is enough: these tests never log in with it.
        let user = repo
            .create_user(NewUser {
                name: "Test User".to_string(),
                email: "tester@example.com".to_string(),
                password_hash: "not-a-real-hash".to_string(),
            })
            .await
            .unwrap();
        let token = auth::issue_token(&config, user.id).unwrap();

        let state = AppState {
            repo: repo.clone() as RepositoryState,
            config: config.clone(),
        };

        TestApp {
            repo,
            router: create_router(state),
            config,
            user,
            token,
        }
    }

    pub async fn county(&self, name: &str) -> County {
        self.repo
            .create_county(CreateCountyRequest {
                name: name.to_string(),
            })
            .await
            .unwrap()
    }

    pub async fn city(&self, county_id: i64, name: &str, zip_code: i32) -> i64 {
        self.repo
            .create_city(
                county_id,
                CreateCityRequest {
                    name: name.to_string(),
                    zip_code,
                },
            )
            .await
            .unwrap()
            .id
    }

    /// Sends one request through the router; `token` adds a bearer header.
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, json)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Method::GET, uri, None, None).await
    }

    pub async fn authed(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        self.send(method, uri, body, Some(&self.token)).await
    }
}

pub fn names(cities: &Value) -> Vec<String> {
    cities
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap().to_string())
        .collect()
}
