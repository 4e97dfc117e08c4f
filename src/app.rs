use crate::appstate::AppState;
use crate::auth;
use crate::auth::MemoryUserStore;
use crate::notfoundpage;
use crate::offline;
use crate::portal::commands;
use crate::portal::views;
use crate::preferences;
use crate::preferences::Preferences;
use crate::security::headers::security_headers;
use crate::seo;
use crate::telemetry;
use crate::telemetry::errors::ErrorOrigin;
use crate::telemetry::health;
use crate::theme::theme;
use axum::Router;
use axum::http::StatusCode;
use axum::http::header;
use axum::middleware;
use axum::response::IntoResponse;
use axum::response::Redirect;
use axum::response::Response;
use axum::routing::get;
use axum::routing::post;
use axum_login::AuthManagerLayerBuilder;
use axum_login::login_required;
use maud::html;
use serde_json::json;
use std::any::Any;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;
use tower_sessions::Expiry;
use tower_sessions::MemoryStore;
use tower_sessions::cookie::time::Duration as TimeDuration;
use tower_sessions::SessionManagerLayer;

pub fn app(state: AppState) -> Router {
    let session_store = MemoryStore::default();
    let idle = TimeDuration::seconds(state.config.session_idle().as_secs() as i64);
    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(state.config.secure_cookies)
        .with_expiry(Expiry::OnInactivity(idle));

    let auth_layer =
        AuthManagerLayerBuilder::new(state.user_store.clone(), session_layer).build();

    let portal_routes = Router::new()
        .route("/", get(views::home::home_page))
        .route("/tickets", get(views::tickets::ticket_list))
        .route(
            "/tickets/new",
            get(views::tickets::create_ticket_page).post(commands::create_ticket),
        )
        .route("/tickets/approve", post(commands::approve_ticket))
        .route(
            "/announcements",
            get(views::announcements::announcements_page),
        )
        .route("/connect", get(views::connect::connect_page))
        .route("/connect/message", post(commands::send_message))
        .route("/connect/join", post(commands::join_group))
        .route(
            "/profile",
            get(views::profile::profile_page).post(commands::update_profile),
        )
        .route("/payments", get(views::payments::payments_page))
        .route("/payments/pay", post(commands::pay_now))
        .route(
            "/payments/{id}/receipt",
            get(views::payments::download_receipt),
        )
        .route_layer(login_required!(MemoryUserStore, login_url = "/signin"));

    let errors = state.errors.clone();

    let mut app = Router::new()
        .route("/logo.svg", get(serve_logo))
        .route("/favicon.ico", get(serve_logo))
        .route("/index.html", get(Redirect::permanent("/")))
        .route("/assets/css/index.css", get(offline::serve_stylesheet))
        .route("/assets/js/main.js", get(offline::serve_main_script))
        .route("/sw.js", get(offline::serve_service_worker))
        .route("/manifest.json", get(offline::serve_manifest))
        .route("/robots.txt", get(seo::serve_robots))
        .route("/sitemap.xml", get(seo::serve_sitemap))
        .route("/health", get(health::health_check))
        .route("/health/live", get(health::liveness_check))
        .route("/health/ready", get(health::readiness_check))
        .route(
            "/settings/accessibility",
            post(preferences::update_accessibility),
        )
        .route("/settings/language", post(preferences::update_language))
        .merge(auth::router())
        .merge(portal_routes)
        .fallback(notfoundpage::not_found_page)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            telemetry::track_requests,
        ))
        .layer(auth_layer)
        .layer(CatchPanicLayer::custom(
            move |panic: Box<dyn Any + Send + 'static>| {
                let detail = panic_message(panic.as_ref());
                tracing::error!("handler panicked: {}", detail);
                errors.log_error(
                    "handler panicked",
                    json!({ "panic": detail }),
                    ErrorOrigin::default(),
                );
                error_page()
            },
        ));

    for (name, value) in security_headers() {
        app = app.layer(SetResponseHeaderLayer::if_not_present(name, value));
    }

    app.layer(TraceLayer::new_for_http()).with_state(state)
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else {
        "unknown panic".to_string()
    }
}

/// Rendered in place of any page whose handler panicked.
fn error_page() -> Response {
    let markup = theme(
        &Preferences::default(),
        html! { title { "Something went wrong" } },
        html! {
            div class="flex min-h-full flex-col items-center justify-center gap-4 px-6 py-12 text-center" {
                h1 class="text-2xl font-bold text-gray-900 dark:text-white" { "Something went wrong" }
                p class="text-gray-600 dark:text-gray-400" {
                    "An unexpected error occurred. Please try again."
                }
                a
                    href=""
                    class="rounded-md bg-indigo-600 px-4 py-2 text-sm font-semibold text-white hover:bg-indigo-500" {
                    "Try again"
                }
            }
        },
    );

    (StatusCode::INTERNAL_SERVER_ERROR, markup).into_response()
}

async fn serve_logo() -> impl IntoResponse {
    const LOGO_SVG: &str = include_str!("logo.svg");
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "image/svg+xml")],
        LOGO_SVG,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::offline::strategy::STATIC_ASSETS;
    use axum::body::Body;
    use axum::http::HeaderMap;
    use axum::http::Method;
    use axum::http::Request;
    use tower::ServiceExt;

    fn test_state() -> AppState {
        AppState::new(Config {
            simulated_latency_ms: 0,
            ..Config::default()
        })
    }

    fn test_app() -> Router {
        app(test_state())
    }

    async fn send(app: &Router, request: Request<Body>) -> Response {
        app.clone()
            .oneshot(request)
            .await
            .expect("router is infallible")
    }

    fn get_with(uri: &str, cookie: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        builder.body(Body::empty()).expect("valid request")
    }

    fn post_form(uri: &str, body: &str, cookie: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        builder
            .body(Body::from(body.to_string()))
            .expect("valid request")
    }

    async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body should be readable");
        String::from_utf8(bytes.to_vec()).expect("body should be utf-8")
    }

    fn location(headers: &HeaderMap) -> &str {
        headers
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
    }

    fn session_cookie(headers: &HeaderMap) -> Option<String> {
        headers
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(';').next())
            .map(str::to_string)
    }

    async fn sign_in(app: &Router, username: &str, password: &str) -> String {
        let response = send(
            app,
            post_form(
                "/signin",
                &format!("username={}&password={}", username, password),
                None,
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(response.headers()), "/");
        session_cookie(response.headers()).expect("login should set a session cookie")
    }

    #[tokio::test]
    async fn test_unknown_path_renders_not_found() {
        let app = test_app();
        let response = send(&app, get_with("/no/such/page", None)).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(body_text(response).await.contains("Oops! Page not found"));
    }

    #[tokio::test]
    async fn test_portal_requires_login() {
        let app = test_app();
        for path in ["/", "/tickets", "/announcements", "/connect", "/profile", "/payments"] {
            let response = send(&app, get_with(path, None)).await;
            assert!(response.status().is_redirection(), "{} should redirect", path);
            assert!(
                location(response.headers()).starts_with("/signin"),
                "{} should send visitors to sign in",
                path
            );
        }
    }

    #[tokio::test]
    async fn test_public_routes() {
        let app = test_app();

        let response = send(&app, get_with("/signin", None)).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains(r#"name="password""#));

        let response = send(&app, get_with("/health/live", None)).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = send(&app, get_with("/health/ready", None)).await;
        assert_eq!(body_text(response).await, "OK");

        let response = send(&app, get_with("/sw.js", None)).await;
        assert!(body_text(response).await.contains("union-connect-v1-static"));

        let response = send(&app, get_with("/robots.txt", None)).await;
        assert!(body_text(response).await.contains("Sitemap:"));
    }

    #[tokio::test]
    async fn test_health_report() {
        let app = test_app();
        let response = send(&app, get_with("/health", None)).await;

        assert_eq!(response.status(), StatusCode::OK);
        let report: serde_json::Value =
            serde_json::from_str(&body_text(response).await).expect("health report is json");
        assert!(report["status"].is_string());
        assert!(report["checks"].is_array());
    }

    #[tokio::test]
    async fn test_security_headers_on_every_response() {
        let app = test_app();
        for path in ["/health/ready", "/signin", "/missing"] {
            let response = send(&app, get_with(path, None)).await;
            let headers = response.headers();
            assert_eq!(headers[header::X_FRAME_OPTIONS], "DENY");
            assert_eq!(headers[header::X_CONTENT_TYPE_OPTIONS], "nosniff");
            assert!(headers.contains_key(header::CONTENT_SECURITY_POLICY));
        }
    }

    #[tokio::test]
    async fn test_member_signs_in_and_sees_home() {
        let app = test_app();
        let cookie = sign_in(&app, "user", "user").await;

        let response = send(&app, get_with("/", Some(&cookie))).await;
        assert_eq!(response.status(), StatusCode::OK);
        let page = body_text(response).await;
        assert!(page.contains("Welcome Back"));
        assert!(page.contains("Welcome to TEE 1104 Union, Regular User!"));
        assert!(!page.contains("Admin Actions"));

        // the toast is shown once
        let page = body_text(send(&app, get_with("/", Some(&cookie))).await).await;
        assert!(!page.contains("Welcome to TEE 1104 Union, Regular User!"));
    }

    #[tokio::test]
    async fn test_manager_sees_dashboard() {
        let app = test_app();
        let cookie = sign_in(&app, "manager", "manager").await;

        let page = body_text(send(&app, get_with("/", Some(&cookie))).await).await;
        assert!(page.contains("Manager Dashboard"));
        assert!(page.contains("Approve Tickets"));
        assert!(!page.contains("Create News"));
    }

    #[tokio::test]
    async fn test_bad_credentials_are_rejected() {
        let app = test_app();

        let response = send(
            &app,
            post_form("/signin", "username=user&password=wrong", None),
        )
        .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let target = location(response.headers()).to_string();
        assert!(target.starts_with("/signin?err="));
        assert!(target.contains("LoginFailed"));

        let response = send(&app, post_form("/signin", "username=&password=", None)).await;
        assert!(location(response.headers()).contains("InvalidInput"));
    }

    #[tokio::test]
    async fn test_sign_in_is_rate_limited() {
        let app = test_app();
        for _ in 0..5 {
            send(&app, post_form("/signin", "username=director&password=nope", None)).await;
        }

        let response = send(
            &app,
            post_form("/signin", "username=director&password=director", None),
        )
        .await;
        assert!(location(response.headers()).contains("RateLimited"));
    }

    #[tokio::test]
    async fn test_ticket_validation_and_creation() {
        let app = test_app();
        let cookie = sign_in(&app, "user", "user").await;

        let response = send(
            &app,
            post_form(
                "/tickets/new",
                "title=&category=safety&priority=high&description=",
                Some(&cookie),
            ),
        )
        .await;
        assert!(location(response.headers()).starts_with("/tickets/new?err="));

        let response = send(
            &app,
            post_form(
                "/tickets/new",
                "title=Broken+ladder&category=safety&priority=high&description=The+ladder+in+bay+4+is+cracked",
                Some(&cookie),
            ),
        )
        .await;
        assert_eq!(location(response.headers()), "/tickets");

        let page = body_text(send(&app, get_with("/tickets", Some(&cookie))).await).await;
        assert!(page.contains("Ticket Created"));
    }

    #[tokio::test]
    async fn test_accessibility_settings_persist() {
        let app = test_app();

        let response = send(
            &app,
            post_form(
                "/settings/accessibility",
                "setting=high-contrast&next=/signin",
                None,
            ),
        )
        .await;
        assert_eq!(location(response.headers()), "/signin");
        let cookie = session_cookie(response.headers()).expect("setting should start a session");

        for _ in 0..2 {
            let page = body_text(send(&app, get_with("/signin", Some(&cookie))).await).await;
            assert!(page.contains(r#"high-contrast font-normal""#));
        }
    }

    #[tokio::test]
    async fn test_receipt_download() {
        let app = test_app();
        let cookie = sign_in(&app, "user", "user").await;

        let response = send(&app, get_with("/payments/PAY-001/receipt", Some(&cookie))).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"receipt-PAY-001.txt\""
        );

        let response = send(&app, get_with("/payments/PAY-999/receipt", Some(&cookie))).await;
        assert!(location(response.headers()).starts_with("/payments?err="));
    }

    #[tokio::test]
    async fn test_sign_out_forgets_user() {
        let app = test_app();
        let cookie = sign_in(&app, "super", "super").await;

        let response = send(&app, post_form("/signout", "", Some(&cookie))).await;
        assert_eq!(location(response.headers()), "/signin");

        let response = send(&app, get_with("/", Some(&cookie))).await;
        assert!(location(response.headers()).starts_with("/signin"));
    }

    #[tokio::test]
    async fn test_padded_credentials_are_rejected() {
        let app = test_app();
        for body in [
            "username=user&password=%20%20user%20%20",
            "username=%20user&password=user",
        ] {
            let response = send(&app, post_form("/signin", body, None)).await;
            let target = location(response.headers());
            assert!(target.starts_with("/signin?err="), "{} got {}", body, target);
            assert!(target.contains("LoginFailed"), "{} got {}", body, target);
        }
    }

    #[tokio::test]
    async fn test_sign_in_ignores_offsite_next() {
        let app = test_app();
        for next in ["%2F%5Cevil.example", "%2F%2Fevil.example", "https%3A%2F%2Fevil.example"] {
            let response = send(
                &app,
                post_form(
                    "/signin",
                    &format!("username=user&password=user&next={}", next),
                    None,
                ),
            )
            .await;
            assert_eq!(location(response.headers()), "/", "next={}", next);
        }

        let response = send(
            &app,
            post_form("/signin", "username=user&password=user&next=%2Fprofile", None),
        )
        .await;
        assert_eq!(location(response.headers()), "/profile");
    }

    #[tokio::test]
    async fn test_offline_assets_resolve() {
        let app = test_app();
        for path in STATIC_ASSETS {
            let status = send(&app, get_with(path, None)).await.status();
            assert!(
                status.is_success() || status.is_redirection(),
                "{} answered {}",
                path,
                status
            );
        }

        let response = send(&app, get_with("/assets/css/index.css", None)).await;
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/css; charset=utf-8"
        );
        assert!(body_text(response).await.contains("html.high-contrast"));

        let response = send(&app, get_with("/assets/js/main.js", None)).await;
        assert!(body_text(response).await.contains("register('/sw.js')"));

        let response = send(&app, get_with("/index.html", None)).await;
        assert_eq!(location(response.headers()), "/");
    }

    #[tokio::test]
    async fn test_unhealthy_report_does_not_feed_itself() {
        let state = test_state();
        for i in 0..11 {
            state.errors.log_error(
                format!("upstream failure {}", i),
                serde_json::Value::Null,
                ErrorOrigin::default(),
            );
        }
        let errors = state.errors.clone();
        let app = app(state);

        for _ in 0..3 {
            let response = send(&app, get_with("/health", None)).await;
            assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

            let report: serde_json::Value =
                serde_json::from_str(&body_text(response).await).expect("health report is json");
            assert_eq!(report["status"], "unhealthy");
            assert_eq!(
                report["app_errors"].as_array().map(Vec::len),
                Some(10)
            );
            assert_eq!(report["app_errors"][0]["message"], "upstream failure 10");
        }
        assert_eq!(errors.count(), 11);
    }

    #[tokio::test]
    async fn test_ticket_approval_needs_capability() {
        let app = test_app();
        let body = "ticket=Ticket+%231256+-+Overtime+Pay+Request";

        let member = sign_in(&app, "user", "user").await;
        let response = send(&app, post_form("/tickets/approve", body, Some(&member))).await;
        let target = location(response.headers()).to_string();
        assert!(target.starts_with("/?err="));
        assert!(target.contains("PermissionError"));

        let manager = sign_in(&app, "manager", "manager").await;
        // drain the sign-in toast
        send(&app, get_with("/", Some(&manager))).await;

        let response = send(&app, post_form("/tickets/approve", body, Some(&manager))).await;
        assert_eq!(location(response.headers()), "/");
        let page = body_text(send(&app, get_with("/", Some(&manager))).await).await;
        assert!(page.contains("Ticket Approved"));

        let response = send(
            &app,
            post_form("/tickets/approve", "ticket=Ticket+%239999", Some(&manager)),
        )
        .await;
        assert!(location(response.headers()).contains("NotFound"));
    }
}
