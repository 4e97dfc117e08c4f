use serde::Deserialize;
use serde::Serialize;

pub const SESSION_KEY: &str = "language";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Te,
}

impl Language {
    pub const ALL: [Language; 2] = [Language::En, Language::Te];

    pub fn code(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Te => "te",
        }
    }

    /// Name of the language in itself, for the switcher.
    pub fn native_name(&self) -> &'static str {
        match self {
            Language::En => "English",
            Language::Te => "తెలుగు",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Language::ALL.into_iter().find(|l| l.code() == code)
    }

    fn table(&self) -> &'static [(&'static str, &'static str)] {
        match self {
            Language::En => EN,
            Language::Te => TE,
        }
    }
}

const EN: &[(&str, &str)] = &[
    ("app.name", "TEE 1104 Union"),
    ("nav.home", "Home"),
    ("nav.tickets", "Tickets"),
    ("nav.news", "News"),
    ("nav.connect", "Connect"),
    ("nav.profile", "Profile"),
    ("nav.payments", "Payments"),
    ("login.title", "Sign in"),
    ("login.subtitle", "Welcome to TEE 1104 Union"),
    ("login.username", "Username"),
    ("login.password", "Password"),
    ("login.submit", "Sign in"),
    ("home.welcome", "Welcome Back"),
    ("home.quick_actions", "Quick Actions"),
    ("home.recent_activity", "Recent Activity"),
    ("common.sign_out", "Sign out"),
    ("common.search", "Search"),
    ("common.submit", "Submit"),
    ("common.cancel", "Cancel"),
    ("common.language", "Language"),
    ("common.accessibility", "Accessibility"),
];

const TE: &[(&str, &str)] = &[
    ("app.name", "TEE 1104 యూనియన్"),
    ("nav.home", "హోమ్"),
    ("nav.tickets", "టికెట్లు"),
    ("nav.news", "వార్తలు"),
    ("nav.connect", "కనెక్ట్"),
    ("nav.profile", "ప్రొఫైల్"),
    ("nav.payments", "చెల్లింపులు"),
    ("login.title", "సైన్ ఇన్"),
    ("login.subtitle", "TEE 1104 యూనియన్‌కు స్వాగతం"),
    ("login.username", "వినియోగదారు పేరు"),
    ("login.password", "పాస్‌వర్డ్"),
    ("login.submit", "సైన్ ఇన్ చేయండి"),
    ("home.welcome", "తిరిగి స్వాగతం"),
    ("home.quick_actions", "త్వరిత చర్యలు"),
    ("common.sign_out", "సైన్ అవుట్"),
    ("common.search", "శోధించండి"),
    ("common.submit", "సమర్పించండి"),
    ("common.cancel", "రద్దు చేయండి"),
    ("common.language", "భాష"),
];

/// Looks the key up in the chosen language, then English, then gives the
/// key back unchanged.
pub fn t(lang: Language, key: &'static str) -> &'static str {
    lookup(lang.table(), key)
        .or_else(|| lookup(EN, key))
        .unwrap_or(key)
}

fn lookup(table: &'static [(&'static str, &'static str)], key: &str) -> Option<&'static str> {
    table.iter().find(|(k, _)| *k == key).map(|(_, v)| *v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_translation_and_fallback() {
        assert_eq!(t(Language::En, "nav.tickets"), "Tickets");
        assert_eq!(t(Language::Te, "nav.tickets"), "టికెట్లు");
        // missing in Telugu, falls back to English
        assert_eq!(t(Language::Te, "home.recent_activity"), "Recent Activity");
        assert_eq!(t(Language::Te, "no.such.key"), "no.such.key");
    }

    #[test]
    fn test_every_telugu_key_exists_in_english() {
        for (key, _) in TE {
            assert!(lookup(EN, key).is_some(), "{} has no English text", key);
        }
    }

    #[test]
    fn test_codes() {
        assert_eq!(Language::from_code("te"), Some(Language::Te));
        assert_eq!(Language::from_code("fr"), None);
        assert_eq!(Language::default().code(), "en");
    }
}
