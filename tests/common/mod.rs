//! Shared utilities for integration testing.
//!
//! Spawns an in-process identity provider (Keycloak-shaped endpoints) that
//! also serves a small manuscript API guarded by bearer tokens.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde_json::json;
use tokio::net::TcpListener;

use folio_viewer::config::{ApiConfig, GrantConfig, IdentityConfig};

pub const REALM: &str = "theolab";
pub const CLIENT_ID: &str = "qwb-api";
pub const USERNAME: &str = "reader";
pub const PASSWORD: &str = "secret";
pub const CLIENT_SECRET: &str = "s3cret";
pub const KEY_ID: &str = "test-key";

const PRIVATE_KEY_PEM: &str = include_str!("test_rsa.pem");
const MODULUS: &str = "mQQaJGfPj0PnJaxLTU5KJyyJpTt_IpZ_nOmODTbrKPdup-mXu9lnp26XyRNfMBnNgWyn_dQsPZH8qA1ZgvFIoFctC2svGPxEv6y43T2-ifHOxl5kGyuXkYtp2MlKuGdTjIDNrBYI2FYKJil0eNMh8h5wu7OiqGAUD0EiWMXoX56cTAXK37MUUEAQJXCUQn8WYJMUQC4WWNGdfStDke01jo48rlBJXNlBmGyYcRhh_FmlDNdcd_P4dWnQ-8oLHCy1xsszcpY87-OhYoDfRQbvmFFlEA5Ym4kU-nx05m3ISuPGSit3K8T5MymlglsrxWAgxWMOjwKs3c_Ce92R5v124Q";
const EXPONENT: &str = "AQAB";

/// Knobs for the mock provider.
#[derive(Debug, Clone)]
pub struct MockOptions {
    /// Number of discovery requests answered with 503 before succeeding.
    pub discovery_failures: u32,
    /// Grants advertised in the well-known document.
    pub grant_types: Vec<&'static str>,
    /// Lifetime of issued tokens; negative for already expired tokens.
    pub token_ttl_secs: i64,
}

impl Default for MockOptions {
    fn default() -> Self {
        Self {
            discovery_failures: 0,
            grant_types: vec!["authorization_code", "implicit", "password", "client_credentials"],
            token_ttl_secs: 300,
        }
    }
}

struct MockState {
    base_url: String,
    options: MockOptions,
    discovery_failures_left: AtomicU32,
    discovery_calls: AtomicU32,
    token_calls: AtomicU32,
    issued: Mutex<Vec<String>>,
}

/// Handle to a running mock provider.
#[derive(Clone)]
pub struct MockIdentity {
    state: Arc<MockState>,
}

impl MockIdentity {
    pub async fn start() -> Self {
        Self::start_with(MockOptions::default()).await
    }

    pub async fn start_with(options: MockOptions) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let state = Arc::new(MockState {
            base_url: format!("http://{}", addr),
            discovery_failures_left: AtomicU32::new(options.discovery_failures),
            options,
            discovery_calls: AtomicU32::new(0),
            token_calls: AtomicU32::new(0),
            issued: Mutex::new(Vec::new()),
        });

        let app = Router::new()
            .route("/realms/{realm}/.well-known/openid-configuration", get(well_known))
            .route("/realms/{realm}/protocol/openid-connect/token", post(token))
            .route("/realms/{realm}/protocol/openid-connect/certs", get(certs))
            .route("/manuscript/{name}", get(manuscript))
            .with_state(state.clone());

        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self { state }
    }

    pub fn base_url(&self) -> &str {
        &self.state.base_url
    }

    pub fn discovery_calls(&self) -> u32 {
        self.state.discovery_calls.load(Ordering::SeqCst)
    }

    pub fn token_calls(&self) -> u32 {
        self.state.token_calls.load(Ordering::SeqCst)
    }

    /// Tokens issued by the token endpoint, oldest first.
    pub fn issued_tokens(&self) -> Vec<String> {
        self.state.issued.lock().unwrap().clone()
    }

    /// Identity configuration pointing at this provider.
    pub fn identity_config(&self, grant: GrantConfig) -> IdentityConfig {
        IdentityConfig {
            server_url: self.base_url().to_string(),
            realm: REALM.to_string(),
            client_id: CLIENT_ID.to_string(),
            grant,
            timeout_secs: 5,
            ..IdentityConfig::default()
        }
    }

    /// API configuration pointing at this server's manuscript endpoints.
    pub fn api_config(&self) -> ApiConfig {
        ApiConfig {
            base_url: self.base_url().to_string(),
            timeout_secs: 5,
        }
    }
}

pub fn password_grant() -> GrantConfig {
    GrantConfig::Password {
        username: USERNAME.into(),
        password: PASSWORD.into(),
    }
}

/// Sign a token with the provider's key.
pub fn mint_token(username: &str, roles: &[&str], ttl_secs: i64) -> String {
    let now = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_secs() as i64;
    let claims = json!({
        "preferred_username": username,
        "resource_access": { CLIENT_ID: { "roles": roles } },
        "iat": now,
        "exp": now + ttl_secs,
    });

    let mut header = Header::new(Algorithm::RS256);
    header.kid = Some(KEY_ID.to_string());
    let key = EncodingKey::from_rsa_pem(PRIVATE_KEY_PEM.as_bytes()).unwrap();
    encode(&header, &claims, &key).unwrap()
}

async fn well_known(State(state): State<Arc<MockState>>, Path(realm): Path<String>) -> Response {
    state.discovery_calls.fetch_add(1, Ordering::SeqCst);

    let failures_left = state.discovery_failures_left.load(Ordering::SeqCst);
    if failures_left > 0 {
        state.discovery_failures_left.store(failures_left - 1, Ordering::SeqCst);
        return StatusCode::SERVICE_UNAVAILABLE.into_response();
    }

    let issuer = format!("{}/realms/{}", state.base_url, realm);
    Json(json!({
        "issuer": issuer,
        "authorization_endpoint": format!("{}/protocol/openid-connect/auth", issuer),
        "token_endpoint": format!("{}/protocol/openid-connect/token", issuer),
        "jwks_uri": format!("{}/protocol/openid-connect/certs", issuer),
        "grant_types_supported": state.options.grant_types,
    }))
    .into_response()
}

async fn token(
    State(state): State<Arc<MockState>>,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    state.token_calls.fetch_add(1, Ordering::SeqCst);

    let field = |name: &str| form.get(name).map(String::as_str);
    let accepted = field("client_id") == Some(CLIENT_ID)
        && match field("grant_type") {
            Some("password") => field("username") == Some(USERNAME) && field("password") == Some(PASSWORD),
            Some("client_credentials") => field("client_secret") == Some(CLIENT_SECRET),
            _ => false,
        };

    if !accepted {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({
                "error": "invalid_grant",
                "error_description": "Invalid user credentials",
            })),
        )
            .into_response();
    }

    let username = field("username").unwrap_or("service-account");
    let access_token = mint_token(username, &["read"], state.options.token_ttl_secs);
    state.issued.lock().unwrap().push(access_token.clone());

    Json(json!({
        "access_token": access_token,
        "refresh_token": "refresh-me",
        "expires_in": state.options.token_ttl_secs,
        "token_type": "Bearer",
    }))
    .into_response()
}

async fn certs() -> Json<serde_json::Value> {
    Json(json!({
        "keys": [
            { "kid": "enc-key", "kty": "RSA", "alg": "RSA-OAEP", "use": "enc", "n": MODULUS, "e": EXPONENT },
            { "kid": KEY_ID, "kty": "RSA", "alg": "RS256", "use": "sig", "n": MODULUS, "e": EXPONENT },
        ]
    }))
}

async fn manuscript(
    State(state): State<Arc<MockState>>,
    Path(name): Path<String>,
    headers: HeaderMap,
) -> Response {
    let authorized = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|token| state.issued.lock().unwrap().iter().any(|t| t == token))
        .unwrap_or(false);

    if !authorized {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    Json(json!({ name: "content" })).into_response()
}
