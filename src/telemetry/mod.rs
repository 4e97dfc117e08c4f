pub mod analytics;
pub mod errors;
pub mod health;
pub mod monitor;
pub mod performance;

use crate::appstate::AppState;
use crate::auth::AuthSession;
use analytics::Visitor;
use axum::extract::Request;
use axum::extract::State;
use axum::http::Method;
use axum::http::header;
use axum::middleware::Next;
use axum::response::Response;
use errors::ErrorOrigin;
use serde_json::json;
use std::time::Instant;

pub use analytics::Analytics;
pub use errors::ErrorLog;
pub use monitor::ApplicationMonitor;
pub use performance::PerformanceMonitor;

/// Times every request, keeps 5xx responses in the error log and counts
/// page views for rendered pages.
pub async fn track_requests(
    State(state): State<AppState>,
    auth_session: AuthSession,
    request: Request,
    next: Next,
) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let user_agent = request
        .headers()
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let start = Instant::now();
    let response = next.run(request).await;
    let status = response.status();

    // unknown paths share one entry so probing can't grow the metrics map
    let operation = if status.as_u16() == 404 {
        format!("{} (not found)", method)
    } else {
        format!("{} {}", method, path)
    };
    state.performance.record(&operation, start.elapsed());

    let user_id = auth_session.user.as_ref().map(|u| u.id.to_string());

    // the health report answers 503 on purpose; logging it would keep it there
    if status.is_server_error() && !path.starts_with("/health") {
        state.errors.log_error(
            format!("{} {} returned {}", method, path, status),
            json!({ "status": status.as_u16() }),
            ErrorOrigin {
                path: Some(path),
                user_agent,
                user_id,
            },
        );
    } else if method == Method::GET && status.is_success() && is_html(&response) {
        match Visitor::from_session(&auth_session.session, user_id, &path).await {
            Ok(visitor) => state.analytics.track_page_view(&visitor, &path),
            Err(e) => tracing::warn!("could not resolve analytics session: {}", e),
        }
    }

    response
}

fn is_html(response: &Response) -> bool {
    response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("text/html"))
}
