use super::AuthSession;
use super::layout::layout;
use crate::appstate::AppState;
use crate::i18n::t;
use crate::portal::layout::PageContext;
use crate::portal::views::PRIMARY_BUTTON;
use crate::portal::views::SECONDARY_BUTTON;
use axum::extract::State;
use axum::response::Redirect;
use maud::Markup;
use maud::html;

pub async fn signout_get(State(state): State<AppState>, ctx: PageContext) -> Markup {
    let lang = ctx.prefs.language;

    layout(
        &state.seo,
        &ctx.prefs,
        t(lang, "common.sign_out"),
        "/signout",
        html! {
            p class="mb-6 text-center text-sm text-gray-600 dark:text-gray-400" {
                "Are you sure you want to sign out?"
            }

            div class="space-y-4" {
                form method="POST" action="/signout" {
                    button type="submit" class=(PRIMARY_BUTTON) {
                        "Yes, sign out"
                    }
                }

                a href="/profile" class=(SECONDARY_BUTTON) {
                    (t(lang, "common.cancel"))
                }
            }
        },
    )
}

pub async fn signout_post(State(state): State<AppState>, mut auth_session: AuthSession) -> Redirect {
    match auth_session.logout().await {
        Ok(Some(user)) => {
            if let Err(e) = state.user_store.forget(&user.id) {
                tracing::debug!("user {} was already gone: {}", user.id, e);
            }
            tracing::info!("{} signed out", user.username);
        }
        Ok(None) => {}
        Err(e) => tracing::warn!("sign out failed: {}", e),
    }

    Redirect::to("/signin")
}
