use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SanitizeKind {
    Text,
    Email,
    Phone,
    Url,
    Html,
    Filename,
}

const ALLOWED_TAGS: &[&str] = &[
    "p", "br", "strong", "em", "u", "b", "i", "h1", "h2", "h3", "h4", "h5", "h6", "ul", "ol", "li",
];

const MAX_FILENAME_LEN: usize = 255;

static SCRIPT_BLOCK: Lazy<Regex> = Lazy::new(|| compile(r"(?is)<script\b[^>]*>.*?</script\s*>"));
static EVENT_HANDLER: Lazy<Regex> =
    Lazy::new(|| compile(r#"(?i)\s*on\w+\s*=\s*["'][^"']*["']"#));
static DANGEROUS_SCHEME: Lazy<Regex> = Lazy::new(|| compile(r"(?i)(javascript|vbscript|data):"));
static TAG: Lazy<Regex> = Lazy::new(|| compile(r"<(/?)(\w+)([^>]*)>"));
static CONTROL: Lazy<Regex> = Lazy::new(|| compile(r"[\x00-\x08\x0B\x0C\x0E-\x1F\x7F]"));
static EMAIL_DISALLOWED: Lazy<Regex> = Lazy::new(|| compile(r"[^\w.@+-]"));
static PHONE_DISALLOWED: Lazy<Regex> = Lazy::new(|| compile(r"[^\d+\-\s()]"));
static FILENAME_DISALLOWED: Lazy<Regex> = Lazy::new(|| compile(r"[^a-zA-Z0-9.\-_]"));
static DOT_RUN: Lazy<Regex> = Lazy::new(|| compile(r"\.{2,}"));

static SQL_KEYWORD: Lazy<Regex> = Lazy::new(|| {
    compile(r"(?i)\b(SELECT|INSERT|UPDATE|DELETE|DROP|CREATE|ALTER|EXEC|UNION|SCRIPT)\b")
});
static SQL_OPERATOR: Lazy<Regex> = Lazy::new(|| compile(r"(--|/\*|\*/|;|\||&)"));
static SQL_QUOTE: Lazy<Regex> = Lazy::new(|| compile(r#"('|"|(\\")|(%27)|(%22))"#));
static SQL_ASSIGNMENT: Lazy<Regex> =
    Lazy::new(|| compile(r"(?i)((%3D)|(=))[^\n]*((%27)|(')|(--)|(%3B)|(;))"));
static SQL_OR: Lazy<Regex> =
    Lazy::new(|| compile(r"(?i)\w*((%27)|('))((%6F)|o|(%4F))((%72)|r|(%52))"));

// patterns are literals, a bad one fails every test in this module
fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("sanitizer pattern should compile")
}

/// Keeps only the safe formatting subset, with every attribute stripped.
pub fn sanitize_html(input: &str) -> String {
    let sanitized = SCRIPT_BLOCK.replace_all(input, "");
    let sanitized = EVENT_HANDLER.replace_all(&sanitized, "");
    let sanitized = DANGEROUS_SCHEME.replace_all(&sanitized, "");

    TAG.replace_all(&sanitized, |caps: &regex::Captures| {
        let closing = &caps[1];
        let tag = &caps[2];
        if ALLOWED_TAGS.contains(&tag.to_lowercase().as_str()) {
            format!("<{}{}>", closing, tag)
        } else {
            String::new()
        }
    })
    .into_owned()
}

pub fn sanitize_text(input: &str) -> String {
    CONTROL.replace_all(input, "").trim().to_string()
}

pub fn sanitize_email(input: &str) -> String {
    EMAIL_DISALLOWED
        .replace_all(input.trim().to_lowercase().as_str(), "")
        .into_owned()
}

pub fn sanitize_phone(input: &str) -> String {
    PHONE_DISALLOWED.replace_all(input, "").into_owned()
}

/// Empty unless the input parses as an absolute http(s) URL.
pub fn sanitize_url(input: &str) -> String {
    match Url::parse(input.trim()) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => url.to_string(),
        _ => String::new(),
    }
}

pub fn sanitize_filename(input: &str) -> String {
    let cleaned = FILENAME_DISALLOWED.replace_all(input, "");
    let collapsed = DOT_RUN.replace_all(&cleaned, ".");
    collapsed
        .strip_prefix('.')
        .unwrap_or(&collapsed)
        .chars()
        .take(MAX_FILENAME_LEN)
        .collect()
}

pub fn sanitize(input: &str, kind: SanitizeKind) -> String {
    match kind {
        SanitizeKind::Text => sanitize_text(input),
        SanitizeKind::Email => sanitize_email(input),
        SanitizeKind::Phone => sanitize_phone(input),
        SanitizeKind::Url => sanitize_url(input),
        SanitizeKind::Html => sanitize_html(input),
        SanitizeKind::Filename => sanitize_filename(input),
    }
}

pub fn has_sql_injection_pattern(input: &str) -> bool {
    [
        &SQL_KEYWORD,
        &SQL_OPERATOR,
        &SQL_QUOTE,
        &SQL_ASSIGNMENT,
        &SQL_OR,
    ]
    .iter()
    .any(|pattern| pattern.is_match(input))
}

pub fn sanitize_sql_input(input: &str) -> String {
    let cleaned = SQL_KEYWORD.replace_all(input, "");
    let cleaned = SQL_OPERATOR.replace_all(&cleaned, "");
    SQL_QUOTE.replace_all(&cleaned, "").trim().to_string()
}

/// Entry point for form fields: anything that looks like an injection
/// attempt is dropped entirely, the rest is cleaned for its kind.
pub fn sanitize_input(input: &str, kind: SanitizeKind) -> String {
    if has_sql_injection_pattern(input) {
        tracing::warn!("potential SQL injection attempt detected and blocked");
        return String::new();
    }

    sanitize(input, kind)
}
