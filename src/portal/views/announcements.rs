use super::CARD;
use super::badge;
use super::section_title;
use crate::appstate::AppState;
use crate::auth::AuthSession;
use crate::auth::user;
use crate::portal::ANNOUNCEMENTS;
use crate::portal::Announcement;
use crate::portal::featured_announcement;
use crate::portal::layout::Page;
use crate::portal::layout::PageContext;
use crate::portal::layout::Tab;
use crate::portal::layout::layout;
use crate::security::sanitize::sanitize_html;
use crate::seo::PageSeo;
use crate::seo::PageType;
use axum::extract::State;
use axum::response::Redirect;
use maud::Markup;
use maud::PreEscaped;
use maud::html;

// bodies may carry formatting, everything outside the safe subset is dropped
fn body(announcement: &Announcement) -> PreEscaped<String> {
    PreEscaped(sanitize_html(announcement.content))
}

pub async fn announcements_page(
    State(state): State<AppState>,
    session: AuthSession,
    ctx: PageContext,
) -> Result<Markup, Redirect> {
    user::get_user(session)?;

    let featured = featured_announcement();

    let content = html! {
        (state.seo.breadcrumbs(&[("Home", "/"), ("News", "/announcements")]))

        article class="rounded-xl bg-gradient-to-br from-indigo-600 to-violet-600 p-5 text-white shadow" {
            div class="flex items-center gap-2" {
                (badge("Featured", "bg-white/20 text-white"))
                (badge(&format!("{} Priority", featured.priority.label()), "bg-white/20 text-white"))
            }
            h2 class="mt-3 text-lg font-semibold" { (featured.title) }
            div class="mt-2 text-sm text-white/90" { (body(featured)) }
            div class="mt-3 flex items-center gap-4 text-xs text-white/80" {
                span { (featured.date) }
                span { (featured.author) }
            }
        }

        section class="space-y-3" {
            (section_title("All Announcements"))
            @for announcement in ANNOUNCEMENTS {
                article class={(CARD) " " (announcement.priority.border_class())} {
                    h3 class="text-sm font-medium text-gray-900 dark:text-white" { (announcement.title) }
                    div class="mt-1" {
                        (badge(announcement.category.label(), announcement.category.badge_class()))
                    }
                    div class="mt-2 text-sm text-gray-600 dark:text-gray-300" { (body(announcement)) }
                    div class="mt-3 flex items-center gap-4 text-xs text-gray-500 dark:text-gray-400" {
                        span { (announcement.date) }
                        span { (announcement.author) }
                    }
                }
            }
        }
    };

    let seo = PageSeo {
        page_type: PageType::Article,
        published_time: Some(featured.date.to_string()),
        author: Some(featured.author.to_string()),
        ..PageSeo::titled("Union News").describe("Latest announcements from TEE 1104 Union.")
    };

    Ok(layout(
        &state.seo,
        &ctx,
        &Page::new("Union News", Tab::News).with_seo(seo),
        content,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_keeps_safe_formatting() {
        let rendered = html! { (body(&ANNOUNCEMENTS[0])) }.into_string();
        assert!(rendered.contains("<strong>improved benefits</strong>"));
    }
}
