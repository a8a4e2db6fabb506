// Psicodoc - drafts psychological documents from form input with a hosted assistant

pub mod assembler;
pub mod assistant;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod export;
pub mod extraction;
pub mod models;
pub mod pipeline;
pub mod routes;
pub mod session;
pub mod types;
pub mod utils;

// Re-exports for convenience
pub use config::Config;
pub use models::AppState;

pub fn create_router(state: AppState) -> axum::Router {
    routes::create_router(state)
}
