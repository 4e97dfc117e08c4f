use super::AuthSession;
use super::layout::layout;
use super::user::Credentials;
use crate::appstate::AppState;
use crate::i18n::t;
use crate::known_errors::KnownErrors;
use crate::known_errors::RedirectOnError;
use crate::portal::layout::PageContext;
use crate::portal::layout::error_banner;
use crate::portal::views::INPUT;
use crate::portal::views::LABEL;
use crate::portal::views::PRIMARY_BUTTON;
use crate::preferences::safe_return_path;
use crate::security::SanitizeKind;
use crate::security::sanitize::sanitize_input;
use crate::security::validation::LoginForm;
use crate::security::validation::validate_login;
use crate::telemetry::analytics::Visitor;
use crate::toast::Toast;
use axum::extract::Form;
use axum::extract::Query;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::response::Redirect;
use axum::response::Response;
use maud::html;
use serde::Deserialize;

#[derive(Deserialize, Default)]
pub struct SigninQuery {
    next: Option<String>,
}

fn signin_url(next: Option<&str>) -> String {
    match next {
        Some(next) => format!("/signin?next={}", urlencoding::encode(next)),
        None => "/signin".to_string(),
    }
}

pub async fn signin_get(
    State(state): State<AppState>,
    auth_session: AuthSession,
    ctx: PageContext,
    Query(query): Query<SigninQuery>,
) -> Response {
    if auth_session.user.is_some() {
        return Redirect::to(safe_return_path(query.next.as_deref())).into_response();
    }

    let lang = ctx.prefs.language;

    layout(
        &state.seo,
        &ctx.prefs,
        t(lang, "login.title"),
        "/signin",
        html! {
            @if let Some(toast) = &ctx.toast {
                (toast.render())
            }

            p class="mb-6 text-center text-sm text-gray-500 dark:text-gray-400" {
                (t(lang, "login.subtitle"))
            }

            form method="POST" action="/signin" class="space-y-6" {
                @if let Some(next) = &query.next {
                    input type="hidden" name="next" value=(next);
                }

                div {
                    label for="username" class=(LABEL) { (t(lang, "login.username")) }
                    div class="mt-2" {
                        input
                            id="username"
                            type="text"
                            name="username"
                            autocomplete="username"
                            required
                            class=(INPUT);
                    }
                }

                div {
                    label for="password" class=(LABEL) { (t(lang, "login.password")) }
                    div class="mt-2" {
                        input
                            id="password"
                            type="password"
                            name="password"
                            autocomplete="current-password"
                            required
                            class=(INPUT);
                    }
                }

                button type="submit" class=(PRIMARY_BUTTON) {
                    (t(lang, "login.submit"))
                }
            }

            div class="mt-6" {
                (error_banner(&ctx.error))
            }
        },
    )
    .into_response()
}

pub async fn signin_post(
    State(state): State<AppState>,
    mut auth_session: AuthSession,
    Form(form): Form<LoginForm>,
) -> Result<Redirect, Redirect> {
    let callback_url = &signin_url(form.next.as_deref());

    // credentials are checked verbatim; the sanitized copy only gates input
    let credentials = Credentials {
        username: form.username.clone(),
        password: form.password.clone(),
    };

    let form = LoginForm {
        username: sanitize_input(&form.username, SanitizeKind::Text),
        password: sanitize_input(&form.password, SanitizeKind::Text),
        next: form.next,
    };

    let visitor = Visitor::from_session(&auth_session.session, None, "/signin")
        .await
        .or_redirect(callback_url)?;

    if form.username.is_empty() || form.password.is_empty() {
        state
            .analytics
            .track_form_submit(&visitor, "login", false);
        return Err(
            KnownErrors::invalid_input("Please enter both username and password")
                .redirect(callback_url),
        );
    }

    let username = validate_login(&form)
        .map_err(|messages| KnownErrors::InvalidInput { messages })
        .or_redirect(callback_url)?;

    let key = username.as_ref().to_lowercase();
    if !state.rate_limiter.is_allowed(&key) {
        let retry_after_secs = state.rate_limiter.time_until_reset(&key).as_secs().max(1);
        tracing::warn!("sign-in rate limit hit for {}", key);
        return Err(KnownErrors::RateLimited { retry_after_secs }.redirect(callback_url));
    }

    state.simulate_latency().await;

    let user = auth_session
        .authenticate(credentials)
        .await
        .map_err(|e| KnownErrors::InternalError {
            context: e.to_string(),
        })
        .or_redirect(callback_url)?;

    let Some(user) = user else {
        tracing::info!("failed sign-in for {}", username);
        state
            .analytics
            .track_form_submit(&visitor, "login", false);
        return Err(KnownErrors::LoginFailed {
            username: username.to_string(),
        }
        .redirect(callback_url));
    };

    auth_session
        .login(&user)
        .await
        .map_err(|e| KnownErrors::SessionError {
            context: e.to_string(),
        })
        .or_redirect(callback_url)?;

    state.rate_limiter.reset(&key);
    state
        .analytics
        .identify(&visitor, &user.id.to_string(), user.highest_role().as_str());
    state.analytics.track_form_submit(&visitor, "login", true);

    Toast::success(
        "Success",
        format!("Welcome to TEE 1104 Union, {}!", user.name),
    )
    .push(&auth_session.session)
    .await
    .or_redirect(callback_url)?;

    tracing::info!("{} signed in as {}", user.username, user.highest_role().as_str());

    Ok(Redirect::to(safe_return_path(form.next.as_deref())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signin_url_keeps_next() {
        assert_eq!(signin_url(None), "/signin");
        assert_eq!(
            signin_url(Some("/tickets?q=a b")),
            "/signin?next=%2Ftickets%3Fq%3Da%20b"
        );
    }
}
