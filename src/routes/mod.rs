use axum::Router;

use crate::state::SharedState;

pub mod docs;
pub mod extract;
pub mod games;
pub mod health;
pub mod lists;
pub mod ratings;
pub mod reference;
pub mod reviews;
pub mod users;

/// Compose all route trees, wiring in shared state and documentation routes.
pub fn router(state: SharedState) -> Router<()> {
    let api_router = health::router()
        .merge(games::router())
        .merge(ratings::router())
        .merge(reviews::router())
        .merge(users::router())
        .merge(lists::router())
        .merge(reference::router());

    let docs_router = docs::router(state.clone());

    api_router.merge(docs_router).with_state(state)
}
