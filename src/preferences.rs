use crate::i18n;
use crate::i18n::Language;
use crate::known_errors::KnownErrors;
use crate::known_errors::RedirectOnError;
use axum::Form;
use axum::response::Redirect;
use serde::Deserialize;
use serde::Serialize;
use tower_sessions::Session;
use url::Url;

const HIGH_CONTRAST: &str = "accessibility-high-contrast";
const REDUCED_MOTION: &str = "accessibility-reduced-motion";
const FONT_SIZE: &str = "accessibility-font-size";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontSize {
    Small,
    #[default]
    Normal,
    Large,
}

impl FontSize {
    pub const ALL: [FontSize; 3] = [FontSize::Small, FontSize::Normal, FontSize::Large];

    pub fn as_str(&self) -> &'static str {
        match self {
            FontSize::Small => "small",
            FontSize::Normal => "normal",
            FontSize::Large => "large",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        FontSize::ALL.into_iter().find(|f| f.as_str() == value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Preferences {
    pub high_contrast: bool,
    pub reduced_motion: bool,
    pub font_size: FontSize,
    pub language: Language,
}

impl Preferences {
    pub async fn load(session: &Session) -> Result<Self, tower_sessions::session::Error> {
        Ok(Self {
            high_contrast: session.get(HIGH_CONTRAST).await?.unwrap_or_default(),
            reduced_motion: session.get(REDUCED_MOTION).await?.unwrap_or_default(),
            font_size: session.get(FONT_SIZE).await?.unwrap_or_default(),
            language: session.get(i18n::SESSION_KEY).await?.unwrap_or_default(),
        })
    }

    /// Classes for the `<html>` element.
    pub fn html_classes(&self) -> String {
        let mut classes = Vec::new();
        if self.high_contrast {
            classes.push("high-contrast".to_string());
        }
        if self.reduced_motion {
            classes.push("reduced-motion".to_string());
        }
        classes.push(format!("font-{}", self.font_size.as_str()));
        classes.join(" ")
    }
}

/// Only same-site paths; anything else goes home.
pub fn safe_return_path(next: Option<&str>) -> &str {
    match next {
        Some(path) if is_local_path(path) => path,
        _ => "/",
    }
}

// browsers read `\` as `/`, so `/\host` would leave the site
fn is_local_path(path: &str) -> bool {
    if !path.starts_with('/')
        || path.starts_with("//")
        || path.contains('\\')
        || path.chars().any(char::is_control)
    {
        return false;
    }

    let Ok(base) = Url::parse("http://localhost/") else {
        return false;
    };
    base.join(path)
        .is_ok_and(|joined| joined.origin() == base.origin())
}

#[derive(Deserialize)]
pub struct AccessibilityForm {
    setting: String,
    value: Option<String>,
    next: Option<String>,
}

pub async fn update_accessibility(
    session: Session,
    Form(form): Form<AccessibilityForm>,
) -> Result<Redirect, Redirect> {
    let callback_url = safe_return_path(form.next.as_deref());
    let prefs = Preferences::load(&session).await.or_redirect(callback_url)?;

    match form.setting.as_str() {
        "high-contrast" => session
            .insert(HIGH_CONTRAST, !prefs.high_contrast)
            .await
            .or_redirect(callback_url)?,
        "reduced-motion" => session
            .insert(REDUCED_MOTION, !prefs.reduced_motion)
            .await
            .or_redirect(callback_url)?,
        "font-size" => {
            let size = form
                .value
                .as_deref()
                .and_then(FontSize::parse)
                .ok_or_else(|| KnownErrors::invalid_input("Unknown font size"))
                .or_redirect(callback_url)?;
            session
                .insert(FONT_SIZE, size)
                .await
                .or_redirect(callback_url)?
        }
        _ => {
            return Err(KnownErrors::invalid_input("Unknown accessibility setting")
                .redirect(callback_url));
        }
    }

    tracing::debug!("accessibility setting {} updated", form.setting);
    Ok(Redirect::to(callback_url))
}

#[derive(Deserialize)]
pub struct LanguageForm {
    language: String,
    next: Option<String>,
}

pub async fn update_language(
    session: Session,
    Form(form): Form<LanguageForm>,
) -> Result<Redirect, Redirect> {
    let callback_url = safe_return_path(form.next.as_deref());

    let language = Language::from_code(&form.language)
        .ok_or_else(|| KnownErrors::invalid_input("Unsupported language"))
        .or_redirect(callback_url)?;

    session
        .insert(i18n::SESSION_KEY, language)
        .await
        .or_redirect(callback_url)?;

    Ok(Redirect::to(callback_url))
}
