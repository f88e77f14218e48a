use async_trait::async_trait;
use axum_test::TestServer;
use chrono::Utc;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

use karnya_backend::modules::auth::model::{Account, Identity, Role, UserType};
use karnya_backend::services::{
    hashing::PasswordHasher, jwt::JwtService, mailer::Mailer, metrics::MetricsRegistry,
    rate_limit::create_rate_limiter,
};
use karnya_backend::storage::Storage;
use karnya_backend::AppState;

const TEST_SECRET: &str = "test-secret-key-for-testing-only";

#[allow(dead_code)]
#[derive(Debug, Clone, PartialEq)]
pub enum SentMail {
    Verification { email: String, token: String },
    PasswordReset { email: String, reset_url: String },
}

/// Keeps every outgoing message so tests can read the tokens a user would get.
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<SentMail>>,
}

#[allow(dead_code)]
impl RecordingMailer {
    pub fn sent(&self) -> Vec<SentMail> {
        self.sent.lock().unwrap().clone()
    }

    pub fn last_verification_token(&self, email: &str) -> Option<String> {
        self.sent().into_iter().rev().find_map(|mail| match mail {
            SentMail::Verification { email: to, token } if to == email => Some(token),
            _ => None,
        })
    }

    pub fn last_reset_token(&self, email: &str) -> Option<String> {
        self.sent().into_iter().rev().find_map(|mail| match mail {
            SentMail::PasswordReset { email: to, reset_url } if to == email => reset_url
                .split_once("token=")
                .map(|(_, token)| token.to_string()),
            _ => None,
        })
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send_verification(&self, email: &str, token: &str) {
        self.sent.lock().unwrap().push(SentMail::Verification {
            email: email.to_string(),
            token: token.to_string(),
        });
    }

    async fn send_password_reset(&self, email: &str, reset_url: &str) {
        self.sent.lock().unwrap().push(SentMail::PasswordReset {
            email: email.to_string(),
            reset_url: reset_url.to_string(),
        });
    }
}

// Allow dead_code for utilities used by other test files
#[allow(dead_code)]
pub struct TestContext {
    pub server: TestServer,
    pub storage: Storage,
    pub mailer: Arc<RecordingMailer>,
    pub jwt: JwtService,
}

#[allow(dead_code)]
impl TestContext {
    pub async fn new() -> Self {
        let storage = Storage::in_memory();
        let mailer = Arc::new(RecordingMailer::default());

        let state = AppState {
            storage: storage.clone(),
            jwt_service: JwtService::new(TEST_SECRET.to_string()),
            hasher: PasswordHasher::new(1024, 1).expect("valid argon2 params"),
            mailer: mailer.clone(),
            metrics: MetricsRegistry::new().expect("metrics registry"),
            frontend_url: "http://localhost:3000".to_string(),
        };

        let app = karnya_backend::create_app(state, create_rate_limiter(10_000, 10_000));
        let server = TestServer::new(app).expect("Failed to create test server");

        Self {
            server,
            storage,
            mailer,
            jwt: JwtService::new(TEST_SECRET.to_string()),
        }
    }

    /// Registers an account and returns its session token and id.
    pub async fn register(&self, email: &str, user_type: &str) -> (String, String) {
        let response = self
            .server
            .post("/api/auth/register")
            .json(&register_body(email, user_type))
            .await;
        response.assert_status(axum::http::StatusCode::CREATED);

        let body: Value = response.json();
        (
            body["token"].as_str().unwrap().to_string(),
            body["user"]["id"].as_str().unwrap().to_string(),
        )
    }

    /// Registers, verifies via the mailed token and logs in.
    pub async fn verified_login(&self, user_type: &str) -> (String, String) {
        let email = test_email();
        self.register(&email, user_type).await;

        let token = self.mailer.last_verification_token(&email).unwrap();
        self.server
            .post("/api/auth/verify-email")
            .json(&json!({ "token": token }))
            .await
            .assert_status_ok();

        let response = self
            .server
            .post("/api/auth/login")
            .json(&json!({ "email": &email, "password": test_password() }))
            .await;
        response.assert_status_ok();

        let body: Value = response.json();
        (email, body["token"].as_str().unwrap().to_string())
    }

    /// Session token for a super admin, which the public API cannot create.
    pub async fn super_admin_token(&self) -> String {
        let now = Utc::now();
        let account = Account {
            id: uuid::Uuid::new_v4().to_string(),
            first_name: "Root".into(),
            last_name: "Admin".into(),
            email: test_email(),
            phone: None,
            user_type: UserType::Admin,
            role: Role::SuperAdmin,
            password_hash: "unused".into(),
            is_verified: true,
            verification_token: None,
            reset_password_token: None,
            reset_password_expires: None,
            created_at: now,
            updated_at: now,
        };
        self.storage.accounts.insert(&account).await.unwrap();
        self.jwt
            .issue_session_token(&Identity::from(&account))
            .unwrap()
    }
}

#[allow(dead_code)]
pub fn register_body(email: &str, user_type: &str) -> Value {
    json!({
        "firstName": "Test",
        "lastName": "User",
        "email": email,
        "password": test_password(),
        "phone": "9999999999",
        "userType": user_type
    })
}

// Helper to generate unique test email
#[allow(dead_code)]
pub fn test_email() -> String {
    format!("test_{}@example.com", uuid::Uuid::new_v4())
}

// Helper to generate test password
#[allow(dead_code)]
pub fn test_password() -> &'static str {
    "TestPassword123!"
}
