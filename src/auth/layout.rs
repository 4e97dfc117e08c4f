use crate::i18n::Language;
use crate::i18n::t;
use crate::preferences::Preferences;
use crate::seo::PageSeo;
use crate::seo::SeoManager;
use crate::theme::theme;
use maud::Markup;
use maud::html;

/// Centered single-column shell for the pages shown around a session:
/// sign in and sign out.
pub fn layout(
    seo: &SeoManager,
    prefs: &Preferences,
    title: &str,
    path: &str,
    content: Markup,
) -> Markup {
    theme(
        prefs,
        seo.head(&PageSeo::titled(title), path),
        html! {
            div class="flex min-h-full flex-col justify-center px-6 py-12 lg:px-8" {
                div class="sm:mx-auto sm:w-full sm:max-w-sm" {
                    img src="/logo.svg" alt="TEE 1104 Union" class="mx-auto h-24 w-auto";

                    h2 class="mt-8 text-center text-2xl/9 font-bold tracking-tight text-gray-900 dark:text-white" {
                        (title)
                    }
                }

                div class="mt-10 sm:mx-auto sm:w-full sm:max-w-sm" {
                    (content)
                }

                div class="mt-10 sm:mx-auto sm:w-full sm:max-w-sm" {
                    (language_switcher(prefs.language, path))
                }
            }
        },
    )
}

pub fn language_switcher(current: Language, next: &str) -> Markup {
    html! {
        form action="/settings/language" method="post" class="flex items-center justify-center gap-2" {
            input type="hidden" name="next" value=(next);
            label for="language" class="text-xs text-gray-500 dark:text-gray-400" {
                (t(current, "common.language"))
            }
            select
                id="language"
                name="language"
                class="rounded-md bg-white px-2 py-1 text-xs text-gray-900 outline-1 outline-gray-300 dark:bg-white/5 dark:text-white dark:outline-white/10" {
                @for language in Language::ALL {
                    option value=(language.code()) selected[language == current] {
                        (language.native_name())
                    }
                }
            }
            button
                type="submit"
                class="rounded-md bg-gray-100 px-2 py-1 text-xs font-medium text-gray-700 hover:bg-gray-200 dark:bg-gray-700 dark:text-gray-200" {
                "OK"
            }
        }
    }
}
