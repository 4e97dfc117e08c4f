use crate::preferences::Preferences;
use maud::DOCTYPE;
use maud::Markup;
use maud::html;

/// Served as `/assets/css/index.css`.
pub const PREFERENCE_CSS: &str = "html.font-small { font-size: 14px; }\n\
html.font-normal { font-size: 16px; }\n\
html.font-large { font-size: 19px; }\n\
html.high-contrast { filter: contrast(1.4); }\n\
html.reduced-motion *, html.reduced-motion *::before, html.reduced-motion *::after \
{ animation: none !important; transition: none !important; scroll-behavior: auto !important; }\n";

/// Served as `/assets/js/main.js`.
pub const MAIN_JS: &str =
    "if ('serviceWorker' in navigator) { navigator.serviceWorker.register('/sw.js'); }\n";

/// Document shell shared by every page. Accessibility preferences land on
/// the `<html>` element so the stylesheet can react to them.
pub fn theme(prefs: &Preferences, head: Markup, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html
            lang=(prefs.language.code())
            class={"h-full bg-gray-50 dark:bg-gray-900 text-gray-900 dark:text-white " (prefs.html_classes())} {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                meta name="theme-color" content="#4f46e5";
                link rel="manifest" href="/manifest.json";
                link rel="icon" href="/logo.svg" type="image/svg+xml";
                script src="https://cdn.jsdelivr.net/npm/@tailwindcss/browser@4" {}
                link rel="stylesheet" href="/assets/css/index.css";
                (head)
            }
            body class="h-full" {
                (content)
                script src="/assets/js/main.js" {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::Language;
    use crate::preferences::FontSize;

    #[test]
    fn test_preferences_reach_html_element() {
        let prefs = Preferences {
            high_contrast: true,
            reduced_motion: false,
            font_size: FontSize::Large,
            language: Language::Te,
        };
        let page = theme(&prefs, html! {}, html! { p { "hi" } }).into_string();

        assert!(page.starts_with("<!DOCTYPE html>"));
        assert!(page.contains(r#"lang="te""#));
        assert!(page.contains("high-contrast font-large\""));
        assert!(page.contains(r#"href="/assets/css/index.css""#));
        assert!(page.contains(r#"src="/assets/js/main.js""#));
        assert!(MAIN_JS.contains("/sw.js"));
    }
}
