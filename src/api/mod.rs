pub mod actions;
pub mod csrf;
pub mod models;

pub use actions::{ActionError, ActionsClient, ServerActions};
pub use models::*;
