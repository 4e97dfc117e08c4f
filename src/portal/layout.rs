use crate::i18n::t;
use crate::known_errors::KnownErrors;
use crate::known_errors::UrlError;
use crate::preferences::Preferences;
use crate::seo::PageSeo;
use crate::seo::SeoManager;
use crate::theme::theme;
use crate::toast::Toast;
use axum::extract::FromRequestParts;
use axum::extract::Query;
use axum::http::request::Parts;
use axum::response::IntoResponse;
use axum::response::Response;
use maud::Markup;
use maud::html;
use tower_sessions::Session;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Home,
    Tickets,
    News,
    Connect,
    Profile,
    None,
}

const NAV_ITEMS: &[(Tab, &str, &str)] = &[
    (Tab::Home, "nav.home", "/"),
    (Tab::Tickets, "nav.tickets", "/tickets"),
    (Tab::News, "nav.news", "/announcements"),
    (Tab::Connect, "nav.connect", "/connect"),
    (Tab::Profile, "nav.profile", "/profile"),
];

/// Per-request view state read from the session: preferences, the pending
/// toast (consumed here) and any error carried in the query string.
pub struct PageContext {
    pub prefs: Preferences,
    pub toast: Option<Toast>,
    pub error: Option<KnownErrors>,
    pub path: String,
}

impl<S> FromRequestParts<S> for PageContext
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state)
            .await
            .map_err(IntoResponse::into_response)?;

        let prefs = Preferences::load(&session).await.unwrap_or_else(|e| {
            tracing::warn!("failed to load preferences: {}", e);
            Preferences::default()
        });
        let toast = Toast::take(&session).await.unwrap_or_else(|e| {
            tracing::warn!("failed to read toast: {}", e);
            None
        });
        let error = Query::<UrlError>::try_from_uri(&parts.uri)
            .ok()
            .and_then(|Query(err)| err.known());

        Ok(Self {
            prefs,
            toast,
            error,
            path: parts.uri.path().to_string(),
        })
    }
}

pub struct Page {
    pub heading: String,
    pub tab: Tab,
    pub seo: PageSeo,
}

impl Page {
    pub fn new(heading: impl Into<String>, tab: Tab) -> Self {
        let heading = heading.into();
        Self {
            seo: PageSeo::titled(heading.clone()),
            heading,
            tab,
        }
    }

    pub fn with_seo(mut self, seo: PageSeo) -> Self {
        self.seo = seo;
        self
    }
}

pub fn error_banner(error: &Option<KnownErrors>) -> Markup {
    html! {
        @if let Some(e) = error {
            div role="alert" class="rounded-lg border border-red-200 bg-red-50 p-3 text-sm text-red-700 dark:border-red-800 dark:bg-red-900/40 dark:text-red-200" {
                (e.user_message())
            }
        }
    }
}

pub fn layout(seo: &SeoManager, ctx: &PageContext, page: &Page, content: Markup) -> Markup {
    let lang = ctx.prefs.language;

    theme(
        &ctx.prefs,
        seo.head(&page.seo, &ctx.path),
        html! {
            div class="min-h-full pb-20" {
                header class="sticky top-0 z-40 bg-gradient-to-r from-indigo-600 to-violet-600 text-white shadow" {
                    div class="mx-auto flex max-w-3xl items-center justify-between px-4 py-4" {
                        div class="flex items-center gap-3" {
                            img src="/logo.svg" alt="TEE 1104 Union" class="h-8 w-auto";
                            div {
                                h1 class="text-lg font-semibold" { (page.heading) }
                                p class="text-xs text-white/80" { (t(lang, "app.name")) }
                            }
                        }
                        form action="/signout" method="post" {
                            button
                                type="submit"
                                class="rounded px-2 py-1 text-xs text-white/80 hover:bg-white/10 hover:text-white" {
                                (t(lang, "common.sign_out"))
                            }
                        }
                    }
                }

                @if let Some(toast) = &ctx.toast {
                    (toast.render())
                }

                main class="mx-auto flex max-w-3xl flex-col gap-6 p-4" {
                    (error_banner(&ctx.error))
                    (content)
                }

                nav class="fixed bottom-0 left-0 right-0 border-t border-gray-200 bg-white dark:border-gray-700 dark:bg-gray-800" {
                    div class="mx-auto flex h-16 max-w-md items-center justify-around px-4" {
                        @for &(tab, key, href) in NAV_ITEMS {
                            @let active = tab == page.tab;
                            a
                                href=(href)
                                aria-current=[active.then_some("page")]
                                class={
                                    "flex flex-col items-center rounded-lg px-3 py-2 text-xs font-medium "
                                    @if active { "bg-indigo-50 text-indigo-600 dark:bg-indigo-900/40 dark:text-indigo-300" }
                                    @else { "text-gray-500 hover:bg-gray-100 hover:text-gray-900 dark:text-gray-400 dark:hover:bg-gray-700" }
                                } {
                                (t(lang, key))
                            }
                        }
                    }
                }
            }
        },
    )
}
