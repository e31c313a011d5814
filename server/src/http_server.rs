use axum::routing::{get, post};
use axum::Router;

use crate::AppState;

mod ingredients;
mod pagination;
mod recipes;
mod tags;
mod users;

pub(crate) fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/ingredients", get(ingredients::list))
        .route("/api/v1/ingredients/{id}", get(ingredients::retrieve))
        .route("/api/v1/tags", get(tags::list))
        .route("/api/v1/tags/{id}", get(tags::retrieve))
        .route("/api/v1/recipes", get(recipes::list).post(recipes::create))
        .route(
            "/api/v1/recipes/download_shopping_cart",
            get(recipes::download_shopping_cart),
        )
        .route(
            "/api/v1/recipes/{id}",
            get(recipes::retrieve)
                .patch(recipes::update)
                .delete(recipes::delete),
        )
        .route(
            "/api/v1/recipes/{id}/favorite",
            post(recipes::add_favorite).delete(recipes::remove_favorite),
        )
        .route(
            "/api/v1/recipes/{id}/shopping_cart",
            post(recipes::add_to_cart).delete(recipes::remove_from_cart),
        )
        .route("/api/v1/users", get(users::list))
        .route("/api/v1/users/me", get(users::me))
        .route("/api/v1/users/subscriptions", get(users::subscriptions))
        .route("/api/v1/users/{id}", get(users::retrieve))
        .route(
            "/api/v1/users/{id}/subscribe",
            post(users::subscribe).delete(users::unsubscribe),
        )
        .with_state(state)
}

pub(crate) async fn serve() -> color_eyre::Result<()> {
    let state = AppState::from_env().await?;
    let addr = state.app.bind_addr;

    let app = router(state);

    tracing::info!("listening on {addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
