//! Route table.

use crate::api::handlers::{self, AppState};
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/games", get(handlers::list_games))
        .route("/api/game/play", post(handlers::play))
        .route("/api/game/transaction", post(handlers::transaction))
        .route("/api/user/balance", get(handlers::balance))
        .route("/api/user/bets", get(handlers::user_bets))
        .route("/api/user/transactions", get(handlers::user_transactions))
        .route("/api/admin/users", post(handlers::admin_create_user))
        .route(
            "/api/admin/users/:id/balance",
            post(handlers::admin_adjust_balance),
        )
        .with_state(state)
}
