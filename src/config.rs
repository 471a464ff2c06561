use anyhow::Context;

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub max_connections: u32,
    pub password_hash_cost: u32,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://cinema.db?mode=rwc".to_string());

        let max_connections: u32 = std::env::var("DB_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "5".to_string())
            .parse()
            .context("DB_MAX_CONNECTIONS")?;

        let password_hash_cost: u32 = match std::env::var("PASSWORD_HASH_COST") {
            Ok(cost) => cost.parse().context("PASSWORD_HASH_COST")?,
            Err(_) => bcrypt::DEFAULT_COST,
        };

        Ok(Self { database_url, max_connections, password_hash_cost })
    }

    /// Single-connection in-memory database, mainly for tests.
    pub fn in_memory() -> Self {
        Self {
            database_url: "sqlite::memory:".to_string(),
            max_connections: 1,
            password_hash_cost: 4,
        }
    }
}
