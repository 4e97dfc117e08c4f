pub mod app;
pub mod appstate;
pub mod auth;
pub mod config;
pub mod i18n;
pub mod known_errors;
pub mod notfoundpage;
pub mod offline;
pub mod portal;
pub mod preferences;
pub mod security;
pub mod seo;
pub mod telemetry;
pub mod theme;
pub mod toast;
