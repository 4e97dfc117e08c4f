pub mod layout;
pub mod signin;
pub mod signout;
pub mod user;

use crate::appstate::AppState;
use axum::Router;
use axum::routing::get;

pub use user::MemoryUserStore;

pub type AuthSession = axum_login::AuthSession<MemoryUserStore>;

/// Sign-in and sign-out pages. Both stay reachable without a session.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/signin", get(signin::signin_get).post(signin::signin_post))
        .route(
            "/signout",
            get(signout::signout_get).post(signout::signout_post),
        )
}
