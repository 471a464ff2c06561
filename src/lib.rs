pub mod accounts;
pub mod booking;
pub mod catalog;
pub mod config;
pub mod db;
pub mod entities;
pub mod error;
pub mod validation;

pub use accounts::{Accounts, NewUser};
pub use booking::{Booking, NewTicket};
pub use catalog::{Catalog, NewMovie};
pub use config::Config;
pub use error::{AppError, AppResult};
pub use validation::{FieldErrors, Seat};

use sea_orm::DatabaseConnection;

/// The three stores sharing one connection pool.
#[derive(Clone)]
pub struct Stores {
    pub catalog: Catalog,
    pub booking: Booking,
    pub accounts: Accounts,
}

impl Stores {
    pub fn new(db: DatabaseConnection, config: &Config) -> Self {
        Self {
            catalog: Catalog::new(db.clone()),
            booking: Booking::new(db.clone()),
            accounts: Accounts::new(db, config.password_hash_cost),
        }
    }

    pub async fn connect(config: &Config) -> AppResult<Self> {
        let db = db::connect_and_migrate(config).await?;
        Ok(Self::new(db, config))
    }
}
