use super::CARD;
use super::INPUT;
use super::LABEL;
use super::PRIMARY_BUTTON;
use super::SearchQuery;
use super::badge;
use super::search_form;
use super::section_title;
use crate::appstate::AppState;
use crate::auth::AuthSession;
use crate::auth::user;
use crate::portal::Contact;
use crate::portal::EMERGENCY_HOTLINE;
use crate::portal::MemberGroup;
use crate::portal::layout::Page;
use crate::portal::layout::PageContext;
use crate::portal::layout::Tab;
use crate::portal::layout::layout;
use crate::portal::search_directory;
use axum::extract::Query;
use axum::extract::State;
use axum::response::Redirect;
use maud::Markup;
use maud::html;

fn tel_href(phone: &str) -> String {
    let digits: String = phone
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '+')
        .collect();
    format!("tel:{}", digits)
}

fn contact_card(contact: &Contact) -> Markup {
    html! {
        div class={(CARD) " flex items-start gap-3"} {
            div class="relative shrink-0" {
                div class="flex h-12 w-12 items-center justify-center rounded-full bg-indigo-600 font-medium text-white" {
                    (contact.avatar)
                }
                span
                    title=(contact.presence.label())
                    class={"absolute -bottom-1 -right-1 h-4 w-4 rounded-full border-2 border-white dark:border-gray-800 " (contact.presence.dot_class())} {}
            }
            div class="min-w-0 flex-1" {
                div class="flex items-center justify-between gap-2" {
                    h3 class="text-sm font-medium text-gray-900 dark:text-white" { (contact.name) }
                    (badge(contact.role, "bg-gray-100 text-gray-700 dark:bg-gray-700 dark:text-gray-200"))
                }
                p class="text-xs text-gray-500 dark:text-gray-400" { (contact.department) }
                div class="mt-2 space-y-1 text-xs text-gray-500 dark:text-gray-400" {
                    a href={"mailto:" (contact.email)} class="block hover:text-indigo-600" { (contact.email) }
                    a href=(tel_href(contact.phone)) class="block hover:text-indigo-600" { (contact.phone) }
                    p { (contact.location) }
                }
            }
        }
    }
}

fn group_card(group: &MemberGroup) -> Markup {
    html! {
        div class={(CARD) " flex items-start justify-between gap-3"} {
            div class="flex-1" {
                div class="mb-1 flex items-center gap-2" {
                    h3 class="text-sm font-medium text-gray-900 dark:text-white" { (group.name) }
                    (badge(group.category, "border border-gray-300 text-gray-600 dark:border-gray-600 dark:text-gray-300"))
                }
                p class="mb-2 text-xs text-gray-500 dark:text-gray-400" { (group.description) }
                p class="text-xs text-gray-500 dark:text-gray-400" { (group.members) " members" }
            }
            form action="/connect/join" method="post" {
                input type="hidden" name="group" value=(group.name);
                button
                    type="submit"
                    class="rounded-md bg-indigo-600 px-3 py-1 text-sm font-semibold text-white hover:bg-indigo-500" {
                    "Join"
                }
            }
        }
    }
}

fn message_form() -> Markup {
    html! {
        section class=(CARD) {
            h2 class="mb-4 text-lg font-semibold text-gray-900 dark:text-white" { "Message Leadership" }
            form action="/connect/message" method="post" class="space-y-4" {
                div class="grid grid-cols-2 gap-4" {
                    div class="space-y-2" {
                        label for="name" class=(LABEL) { "Name *" }
                        input id="name" name="name" type="text" required class=(INPUT);
                    }
                    div class="space-y-2" {
                        label for="email" class=(LABEL) { "Email *" }
                        input id="email" name="email" type="email" required class=(INPUT);
                    }
                }
                div class="space-y-2" {
                    label for="subject" class=(LABEL) { "Subject *" }
                    input id="subject" name="subject" type="text" maxlength="100" required class=(INPUT);
                }
                div class="space-y-2" {
                    label for="message" class=(LABEL) { "Message *" }
                    textarea id="message" name="message" rows="4" maxlength="1000" required class=(INPUT) {}
                }
                button type="submit" class=(PRIMARY_BUTTON) { "Send Message" }
            }
        }
    }
}

pub async fn connect_page(
    State(state): State<AppState>,
    session: AuthSession,
    ctx: PageContext,
    Query(query): Query<SearchQuery>,
) -> Result<Markup, Redirect> {
    user::get_user(session)?;

    let term = query.term();
    let (contacts, groups) = search_directory(term);

    let content = html! {
        (search_form("/connect", term, "Search members and groups..."))

        section class="space-y-3" {
            (section_title("Union Leadership"))
            @for contact in &contacts {
                (contact_card(contact))
            }
            @if contacts.is_empty() {
                p class="text-sm text-gray-500 dark:text-gray-400" { "No leaders match your search." }
            }
        }

        section class="space-y-3" {
            (section_title("Member Groups"))
            @for group in &groups {
                (group_card(group))
            }
            @if groups.is_empty() {
                p class="text-sm text-gray-500 dark:text-gray-400" { "No groups match your search." }
            }
        }

        (message_form())

        section class="rounded-xl bg-gradient-to-br from-indigo-600 to-violet-600 p-5 text-white shadow" {
            h2 class="text-lg font-semibold" { "Emergency Union Hotline" }
            p class="mt-1 text-sm text-white/90" { "For urgent union matters outside office hours" }
            a
                href=(tel_href(EMERGENCY_HOTLINE))
                class="mt-3 flex w-full justify-center rounded-md bg-white px-3 py-1.5 text-sm font-semibold text-indigo-700 hover:bg-gray-100" {
                "Call " (EMERGENCY_HOTLINE)
            }
        }
    };

    Ok(layout(
        &state.seo,
        &ctx,
        &Page::new("Connect", Tab::Connect),
        content,
    ))
}
