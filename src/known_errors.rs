use crate::auth::user::Capabilities;
use axum::response::Redirect;
use serde::Deserialize;
use serde::Serialize;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, thiserror::Error)]
pub enum KnownErrors {
    #[error("not logged in")]
    NotLoggedIn,

    #[error("invalid input: {}", messages.join(", "))]
    InvalidInput { messages: Vec<String> },

    #[error("login failed for {username}")]
    LoginFailed { username: String },

    #[error("too many attempts, retry in {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("missing permissions: {required:?}")]
    PermissionError { required: Capabilities },

    #[error("session failure: {context}")]
    SessionError { context: String },

    #[error("payment integration unavailable")]
    PaymentUnavailable,

    #[error("not found: {what}")]
    NotFound { what: String },

    #[error("internal error: {context}")]
    InternalError { context: String },
}

impl KnownErrors {
    pub fn invalid_input<S: Into<String>>(message: S) -> Self {
        KnownErrors::InvalidInput {
            messages: vec![message.into()],
        }
    }

    /// The text shown to the member, as opposed to the log line.
    pub fn user_message(&self) -> String {
        use KnownErrors::*;
        match self {
            NotLoggedIn => "Please sign in to continue".to_string(),
            InvalidInput { messages } => messages.join(". "),
            LoginFailed { .. } => "Invalid username or password".to_string(),
            RateLimited { retry_after_secs } => format!(
                "Too many sign-in attempts. Try again in {} seconds",
                retry_after_secs
            ),
            PermissionError { .. } => "You do not have access to this action".to_string(),
            SessionError { .. } | InternalError { .. } => {
                "Something went wrong. Please try again".to_string()
            }
            PaymentUnavailable => {
                "Payment integration coming soon! Please contact union office for now.".to_string()
            }
            NotFound { what } => format!("{} could not be found", what),
        }
    }

    pub fn encode(&self) -> String {
        let json = serde_json::to_string(self).unwrap_or_else(|_| "\"NotLoggedIn\"".to_string());
        urlencoding::encode(&json).into_owned()
    }

    /// Parses the value of an `err` query parameter. Axum has already
    /// percent-decoded it, so this is plain JSON.
    pub fn decode(value: &str) -> Option<Self> {
        serde_json::from_str(value).ok()
    }

    pub fn redirect(&self, url: &str) -> Redirect {
        let separator = if url.contains('?') { '&' } else { '?' };
        Redirect::to(&format!("{}{}err={}", url, separator, self.encode()))
    }
}

impl From<tower_sessions::session::Error> for KnownErrors {
    fn from(value: tower_sessions::session::Error) -> Self {
        KnownErrors::SessionError {
            context: value.to_string(),
        }
    }
}

#[derive(Deserialize, Default)]
pub struct UrlError {
    pub err: Option<String>,
}

impl UrlError {
    pub fn known(&self) -> Option<KnownErrors> {
        self.err.as_deref().and_then(KnownErrors::decode)
    }
}

pub trait RedirectOnError<T> {
    fn or_redirect(self, url: &str) -> Result<T, Redirect>;
}

impl<T, E> RedirectOnError<T> for Result<T, E>
where
    E: Into<KnownErrors>,
{
    fn or_redirect(self, url: &str) -> Result<T, Redirect> {
        self.map_err(|e| {
            let known: KnownErrors = e.into();
            tracing::debug!("redirecting to {} after error: {}", url, known);
            known.redirect(url)
        })
    }
}
