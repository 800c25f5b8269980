/// Common test utilities for integration tests
///
/// Builds the full router over fresh in-memory stores, a cheap Argon2
/// hasher and a scripted completion provider, and wraps the request
/// plumbing so tests read as HTTP conversations.

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::Duration,
};
use taskden_api::{
    app::{build_router, AppState},
    config::Config,
};
use taskden_shared::{
    auth::{gateway::AuthGateway, jwt::HmacTokenSigner, password::Argon2Hasher},
    chat::{ChatMessage, ChatRelay, CompletionProvider, ProviderError},
    models::CredentialStore,
};
use tower::ServiceExt;

pub const SECRET: &str = "integration-test-secret-at-least-32-bytes";

/// Completion provider that answers from a script and records its inputs
pub struct ScriptedProvider {
    reply: Result<String, u16>,
    pub calls: Mutex<Vec<Vec<ChatMessage>>>,
}

impl ScriptedProvider {
    pub fn replying(text: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(text.to_string()),
            calls: Mutex::new(Vec::new()),
        })
    }

    /// Fails every call with the given upstream HTTP status
    pub fn failing(status: u16) -> Arc<Self> {
        Arc::new(Self {
            reply: Err(status),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl CompletionProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, ProviderError> {
        self.calls.lock().unwrap().push(messages.to_vec());
        match &self.reply {
            Ok(text) => Ok(text.clone()),
            Err(status) => Err(ProviderError::Status {
                status: *status,
                message: "upstream exploded: trace id 1234".to_string(),
            }),
        }
    }
}

/// Test context containing the app and the signer behind it
pub struct TestContext {
    pub app: Router,
    pub signer: Arc<HmacTokenSigner>,
}

/// Parsed response
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: axum::http::HeaderMap,
    pub body: Value,
}

impl TestContext {
    /// App with chat disabled and auth required everywhere
    pub fn new() -> Self {
        Self::with_chat(None, &[])
    }

    /// App with the given provider and extra config overrides
    pub fn with_chat(
        provider: Option<Arc<dyn CompletionProvider>>,
        overrides: &[(&str, &str)],
    ) -> Self {
        let mut env: HashMap<String, String> = HashMap::new();
        env.insert("SECRET_KEY".to_string(), SECRET.to_string());
        for (key, value) in overrides {
            env.insert(key.to_string(), value.to_string());
        }
        let config = Config::from_lookup(|key| env.get(key).cloned()).unwrap();

        let signer = Arc::new(HmacTokenSigner::new(SECRET));
        let auth = AuthGateway::new(
            Arc::new(CredentialStore::new()),
            Arc::new(Argon2Hasher::with_params(1024, 1, 1).unwrap()),
            signer.clone(),
        )
        .with_min_password_length(config.auth.password_min_length);
        let chat = ChatRelay::new(provider, Duration::from_secs(5));

        let state = AppState::new(config, auth, chat);

        Self {
            app: build_router(state),
            signer,
        }
    }

    /// Sends a request with an optional bearer token and JSON body
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
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

        self.dispatch(request).await
    }

    /// Sends an arbitrary prepared request
    pub async fn dispatch(&self, request: Request<Body>) -> TestResponse {
        let response = self.app.clone().oneshot(request).await.unwrap();

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };

        TestResponse {
            status,
            headers,
            body,
        }
    }

    /// `POST /auth/signup`
    pub async fn signup(&self, email: &str, password: &str) -> TestResponse {
        self.send(
            Method::POST,
            "/auth/signup",
            None,
            Some(serde_json::json!({ "email": email, "password": password })),
        )
        .await
    }

    /// `POST /auth/login` with a form body
    pub async fn login(&self, email: &str, password: &str) -> TestResponse {
        let form = format!(
            "username={}&password={}",
            email.replace('@', "%40"),
            password
        );
        let request = Request::builder()
            .method(Method::POST)
            .uri("/auth/login")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(form))
            .unwrap();

        self.dispatch(request).await
    }

    /// Signs up and logs in, returning the access token
    pub async fn register(&self, email: &str, password: &str) -> String {
        let signup = self.signup(email, password).await;
        assert_eq!(signup.status, StatusCode::CREATED, "signup failed: {}", signup.body);

        let login = self.login(email, password).await;
        assert_eq!(login.status, StatusCode::OK, "login failed: {}", login.body);

        login.body["access_token"].as_str().unwrap().to_string()
    }
}
