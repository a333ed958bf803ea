use anyhow::Result;
use chrono::Utc;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::env;
use uuid::Uuid;

use tempo_be::AppState;
use tempo_be::config::Config;
use tempo_be::database::repositories::{
    ModificationRepository, OrganizationRepository, ProjectRepository, TimeEntryRepository,
    UserRepository,
};
use tempo_be::database::models::UserRole;
use tempo_be::services::auth::{AuthService, Claims};
use tempo_be::services::TimeClockService;

/// Shared context for handler tests.
///
/// The pool is created lazily and never connects unless a handler
/// actually reaches the database, so request-validation and auth tests
/// run without a Postgres instance.
pub struct TestContext {
    pub pool: PgPool,
    pub config: Config,
}

impl TestContext {
    pub fn new() -> Result<Self> {
        let config = test_config();
        let pool = PgPoolOptions::new()
            .max_connections(1)
            .connect_lazy(&config.database_url)?;

        Ok(TestContext { pool, config })
    }

    pub fn app_state(&self) -> AppState {
        AppState {
            auth_service: AuthService::new(
                self.config.clone(),
                UserRepository::new(self.pool.clone()),
                OrganizationRepository::new(self.pool.clone()),
            ),
        }
    }

    pub fn timeclock(&self) -> TimeClockService {
        TimeClockService::new(
            self.pool.clone(),
            TimeEntryRepository::new(self.pool.clone()),
            UserRepository::new(self.pool.clone()),
            OrganizationRepository::new(self.pool.clone()),
            ProjectRepository::new(self.pool.clone()),
            ModificationRepository::new(self.pool.clone()),
        )
    }

    /// Mint a token the way the login path would, without a user row.
    pub fn token_for(&self, role: UserRole) -> String {
        use jsonwebtoken::{EncodingKey, Header, encode};

        let claims = Claims {
            sub: Uuid::new_v4(),
            email: "test@example.com".to_string(),
            organization_id: Uuid::new_v4(),
            role,
            exp: (Utc::now() + chrono::Duration::hours(24)).timestamp() as usize,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.config.jwt_secret.as_ref()),
        )
        .expect("token encoding should succeed")
    }
}

pub fn test_config() -> Config {
    Config {
        database_url: env::var("TEST_DATABASE_URL")
            .unwrap_or_else(|_| "postgres://postgres@localhost:5432/tempo_test".to_string()),
        jwt_secret: "test-jwt-secret-key-that-is-long-enough".to_string(),
        jwt_expiration_days: 1,
        host: "127.0.0.1".to_string(),
        port: 0,
        environment: "test".to_string(),
        client_base_url: "http://localhost:3000".to_string(),
        jobs_enabled: false,
        overtime_check_interval_secs: 3600,
        auto_stop_interval_secs: 900,
        timesheet_interval_secs: 3600,
        daily_summary_interval_secs: 86400,
    }
}

pub fn setup_test_env() {
    // Quiet logger for test runs; init at most once.
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn auth_header(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {}", token))
}

/// Request-body generators built on the fake crate.
pub struct MockData;

impl MockData {
    pub fn register_body() -> serde_json::Value {
        use fake::Fake;
        use fake::faker::internet::en::SafeEmail;
        use fake::faker::name::en::{FirstName, LastName};

        serde_json::json!({
            "email": SafeEmail().fake::<String>(),
            "password": "Test123!",
            "firstName": FirstName().fake::<String>(),
            "lastName": LastName().fake::<String>(),
            "organization": {
                "name": "Test Organization",
                "slug": format!("org-{}", Uuid::new_v4().simple()),
                "email": SafeEmail().fake::<String>(),
            },
        })
    }

    pub fn modification_body() -> serde_json::Value {
        use fake::Fake;
        use fake::faker::lorem::en::Sentence;

        serde_json::json!({
            "requestedChanges": { "description": Sentence(3..8).fake::<String>() },
            "reason": Sentence(5..12).fake::<String>(),
        })
    }
}
