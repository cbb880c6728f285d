pub mod common;
pub mod health;
pub mod leads;

use crate::errors::ApiError;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Fallback for unmatched routes
pub async fn not_found() -> ApiError {
    ApiError::NotFound("Not Found".to_string())
}
