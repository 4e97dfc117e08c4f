use axum::http::HeaderName;
use axum::http::HeaderValue;
use axum::http::header;

const CSP_DIRECTIVES: &[(&str, &[&str])] = &[
    ("default-src", &["'self'"]),
    (
        "script-src",
        &[
            "'self'",
            "'unsafe-inline'",
            "'unsafe-eval'",
            "https://cdn.jsdelivr.net",
        ],
    ),
    (
        "style-src",
        &["'self'", "'unsafe-inline'", "https://fonts.googleapis.com"],
    ),
    ("font-src", &["'self'", "https://fonts.gstatic.com"]),
    ("img-src", &["'self'", "data:", "blob:", "https:"]),
    ("connect-src", &["'self'", "https://api.github.com", "wss:"]),
    ("frame-ancestors", &["'none'"]),
    ("base-uri", &["'self'"]),
    ("form-action", &["'self'"]),
];

pub fn content_security_policy() -> String {
    CSP_DIRECTIVES
        .iter()
        .map(|(directive, sources)| format!("{} {}", directive, sources.join(" ")))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Headers attached to every response that doesn't already carry them.
pub fn security_headers() -> Vec<(HeaderName, HeaderValue)> {
    let mut headers = vec![
        (
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ),
        (header::X_FRAME_OPTIONS, HeaderValue::from_static("DENY")),
        (
            header::X_XSS_PROTECTION,
            HeaderValue::from_static("1; mode=block"),
        ),
        (
            header::REFERRER_POLICY,
            HeaderValue::from_static("strict-origin-when-cross-origin"),
        ),
        (
            HeaderName::from_static("permissions-policy"),
            HeaderValue::from_static("geolocation=(), microphone=(), camera=()"),
        ),
    ];

    match HeaderValue::from_str(&content_security_policy()) {
        Ok(csp) => headers.push((header::CONTENT_SECURITY_POLICY, csp)),
        Err(e) => tracing::error!("content security policy is not a valid header: {}", e),
    }

    headers
}
