pub mod auth_handlers;
pub mod extract;
pub mod user_handlers;

pub use auth_handlers::{login_handler, register_handler};
pub use user_handlers::{
    block_users_handler, delete_users_handler, list_users_handler, unblock_users_handler,
};

use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Liveness probe.
pub async fn liveness_handler() -> &'static str {
    "Server is running"
}
