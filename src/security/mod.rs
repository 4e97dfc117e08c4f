pub mod headers;
pub mod rate_limit;
pub mod sanitize;
pub mod secure_storage;
pub mod validation;

pub use rate_limit::RateLimiter;
pub use sanitize::SanitizeKind;
pub use secure_storage::SecureStorage;
