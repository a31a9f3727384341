//! Person lookup passthrough.

use std::sync::Arc;

use crate::db::{Person, PersonRepository};

#[derive(Clone)]
pub struct PersonService {
    repo: Arc<dyn PersonRepository>,
}

impl PersonService {
    pub fn new(repo: Arc<dyn PersonRepository>) -> Self {
        Self { repo }
    }

    /// Fetch the default person, if one exists.
    pub async fn get_default_person(&self) -> Result<Option<Person>, sqlx::Error> {
        self.repo.get_default().await
    }
}
