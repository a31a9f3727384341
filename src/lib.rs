pub mod api;
pub mod config;
pub mod db;
pub mod service;
pub mod token;

pub use db::DbPool;

use anyhow::Result;
use std::sync::Arc;

use config::Config;
use db::{SqlitePersonRepository, SqliteUserRepository};
use service::{PersonService, UserService};
use token::TokenMaker;

pub struct AppState {
    pub config: Config,
    pub db: DbPool,
    pub token_maker: Arc<TokenMaker>,
    pub users: UserService,
    pub persons: PersonService,
}

impl AppState {
    pub fn new(config: Config, db: DbPool) -> Result<Self> {
        let token_maker = Arc::new(TokenMaker::new(config.auth.token_key.as_bytes())?);
        let token_duration = config::parse_duration(&config.auth.token_duration)?;

        let users = UserService::new(
            Arc::new(SqliteUserRepository::new(db.clone())),
            token_maker.clone(),
            token_duration,
        );
        let persons = PersonService::new(Arc::new(SqlitePersonRepository::new(db.clone())));

        Ok(Self {
            config,
            db,
            token_maker,
            users,
            persons,
        })
    }
}

/// App state over a fresh in-memory database, for router-level tests.
#[cfg(test)]
pub(crate) async fn test_state() -> Arc<AppState> {
    let db = db::connect_test().await;
    Arc::new(AppState::new(Config::default(), db).expect("test app state"))
}
