use std::env;

/// Development fallback for the token-signing secret. Never accepted in production.
const LOCAL_JWT_SECRET: &str = "super-secure-test-secret-value-local";

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

/// AppConfig
///
/// Holds the application's configuration. Loaded once at startup and shared
/// immutably through `AppState`; components that need a value (the JWT secret,
/// the bcrypt cost) pull it via `FromRef` instead of reading the environment.
#[derive(Clone, Debug)]
pub struct AppConfig {
    // Postgres connection string. `None` in local mode runs on the in-memory store.
    pub db_url: Option<String>,
    // Runtime environment marker. Controls the local auth bypass and log format.
    pub env: Env,
    // Secret used to sign issued tokens and verify presented ones (HS256).
    pub jwt_secret: String,
    // bcrypt work factor for new password hashes.
    pub bcrypt_cost: u32,
    // Socket address the HTTP server binds to.
    pub bind_addr: String,
}

/// Env
///
/// Runtime context: `Local` enables development conveniences, `Production`
/// demands every secret explicitly.
#[derive(Clone, PartialEq, Debug)]
pub enum Env {
    Local,
    Production,
}

impl Default for AppConfig {
    /// Non-panicking values for test setup. The bcrypt cost is the minimum the
    /// algorithm allows so test suites don't spend seconds hashing.
    fn default() -> Self {
        Self {
            db_url: None,
            env: Env::Local,
            jwt_secret: LOCAL_JWT_SECRET.to_string(),
            bcrypt_cost: 4,
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// Reads every parameter from environment variables, failing fast.
    ///
    /// # Panics
    /// Panics in production if `DATABASE_URL` or `JWT_SECRET` is missing, and in any
    /// environment if `BCRYPT_COST` is set but not a valid cost (4..=31).
    pub fn load() -> Self {
        let env_str = env::var("APP_ENV").unwrap_or_else(|_| "local".to_string());
        let env = match env_str.as_str() {
            "production" => Env::Production,
            _ => Env::Local,
        };

        let bcrypt_cost = match env::var("BCRYPT_COST") {
            Ok(raw) => raw
                .parse::<u32>()
                .ok()
                .filter(|cost| (4..=31).contains(cost))
                .expect("FATAL: BCRYPT_COST must be an integer between 4 and 31."),
            Err(_) => bcrypt::DEFAULT_COST,
        };

        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());

        match env {
            Env::Local => Self {
                env: Env::Local,
                db_url: env::var("DATABASE_URL").ok(),
                jwt_secret: env::var("JWT_SECRET").unwrap_or_else(|_| LOCAL_JWT_SECRET.to_string()),
                bcrypt_cost,
                bind_addr,
            },
            Env::Production => Self {
                env: Env::Production,
                db_url: Some(
                    env::var("DATABASE_URL").expect("FATAL: DATABASE_URL required in prod"),
                ),
                jwt_secret: env::var("JWT_SECRET")
                    .expect("FATAL: JWT_SECRET must be set in production."),
                bcrypt_cost,
                bind_addr,
            },
        }
    }
}
