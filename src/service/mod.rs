//! Business logic layered between the HTTP handlers and the repositories.

pub mod persons;
pub mod users;

pub use persons::PersonService;
pub use users::{UserError, UserService};
