use super::CARD;
use super::badge;
use super::section_title;
use super::stat_grid;
use crate::appstate::AppState;
use crate::auth::AuthSession;
use crate::auth::user;
use crate::auth::user::Capabilities;
use crate::auth::user::User;
use crate::i18n::Language;
use crate::i18n::t;
use crate::portal::ADMIN_STATS;
use crate::portal::Activity;
use crate::portal::PENDING_APPROVALS;
use crate::portal::RECENT_ACTIVITY;
use crate::portal::UNION_STATS;
use crate::portal::layout::Page;
use crate::portal::layout::PageContext;
use crate::portal::layout::Tab;
use crate::portal::layout::layout;
use axum::extract::State;
use axum::response::Redirect;
use maud::Markup;
use maud::html;

const ADMIN_ACTIONS: &[(Capabilities, &str, &str)] = &[
    (
        Capabilities::APPROVE_TICKETS,
        "Approve Tickets",
        "Review and approve pending tickets",
    ),
    (
        Capabilities::CREATE_NEWS,
        "Create News",
        "Post news and events",
    ),
    (
        Capabilities::MANAGE_USERS,
        "Manage Users",
        "User roles and permissions",
    ),
    (
        Capabilities::ACCESS_SETTINGS,
        "Settings",
        "System configuration",
    ),
];

pub async fn home_page(
    State(state): State<AppState>,
    session: AuthSession,
    ctx: PageContext,
) -> Result<Markup, Redirect> {
    let user = user::get_user(session)?;
    let lang = ctx.prefs.language;

    let (heading, content) = if user.is_admin_level() {
        (
            format!("{} Dashboard", user.highest_role().display_name()),
            admin_dashboard(&user, lang),
        )
    } else {
        (t(lang, "home.welcome").to_string(), member_home(lang))
    };

    Ok(layout(
        &state.seo,
        &ctx,
        &Page::new(heading, Tab::Home),
        content,
    ))
}

fn quick_actions(lang: Language) -> Markup {
    html! {
        section class="space-y-4" {
            (section_title(t(lang, "home.quick_actions")))
            div class="grid grid-cols-2 gap-3" {
                a href="/tickets/new" class={(CARD) " flex flex-col items-center gap-1 text-center hover:bg-gray-50 dark:hover:bg-gray-700"} {
                    span class="font-medium text-gray-900 dark:text-white" { "Create Ticket" }
                    span class="text-xs text-gray-500 dark:text-gray-400" { "Report an issue or request help" }
                }
                a href="/payments" class={(CARD) " flex flex-col items-center gap-1 text-center hover:bg-gray-50 dark:hover:bg-gray-700"} {
                    span class="font-medium text-gray-900 dark:text-white" { "Payments" }
                    span class="text-xs text-gray-500 dark:text-gray-400" { "View dues and payment history" }
                }
            }
        }
    }
}

fn activity_list(title: &str, link: &str, items: &[Activity]) -> Markup {
    html! {
        section class="space-y-4" {
            div class="flex items-center justify-between" {
                (section_title(title))
                a href=(link) class="text-sm font-medium text-indigo-600 hover:text-indigo-500 dark:text-indigo-400" {
                    "View All"
                }
            }
            div class="space-y-3" {
                @for item in items {
                    div class={(CARD) " flex items-start justify-between gap-3"} {
                        div {
                            h3 class="text-sm font-medium text-gray-900 dark:text-white" { (item.title) }
                            p class="mt-1 text-xs text-gray-500 dark:text-gray-400" { (item.detail) }
                        }
                        span class="shrink-0 text-xs text-gray-500 dark:text-gray-400" { (item.when) }
                    }
                }
            }
        }
    }
}

fn approval_list(items: &[Activity]) -> Markup {
    html! {
        section class="space-y-4" {
            (section_title("Pending Approvals"))
            div class="space-y-3" {
                @for item in items {
                    div class={(CARD) " flex items-start justify-between gap-3"} {
                        div {
                            h3 class="text-sm font-medium text-gray-900 dark:text-white" { (item.title) }
                            p class="mt-1 text-xs text-gray-500 dark:text-gray-400" { (item.detail) }
                        }
                        form action="/tickets/approve" method="post" class="shrink-0" {
                            input type="hidden" name="ticket" value=(item.title);
                            button
                                type="submit"
                                class="rounded-md bg-green-600 px-3 py-1 text-xs font-semibold text-white hover:bg-green-500" {
                                "Approve"
                            }
                        }
                    }
                }
            }
        }
    }
}

fn member_home(lang: Language) -> Markup {
    html! {
        (quick_actions(lang))
        (activity_list(t(lang, "home.recent_activity"), "/tickets", RECENT_ACTIVITY))
        section class="space-y-4" {
            (section_title("Union Overview"))
            (stat_grid(UNION_STATS))
        }
    }
}

fn admin_dashboard(user: &User, lang: Language) -> Markup {
    html! {
        div class="flex flex-wrap justify-center gap-2" {
            @for role in &user.roles {
                (badge(role.display_name(), "bg-indigo-100 text-indigo-700 dark:bg-indigo-900/50 dark:text-indigo-200"))
            }
        }

        section class="space-y-4" {
            (section_title("Admin Actions"))
            div class="grid grid-cols-2 gap-3" {
                @for (required, title, description) in ADMIN_ACTIONS {
                    @if user.can(*required) {
                        div class="flex flex-col items-center gap-1 rounded-xl bg-gradient-to-br from-indigo-600 to-violet-600 p-4 text-center text-white shadow" {
                            span class="font-medium" { (title) }
                            span class="text-xs text-white/90" { (description) }
                            span class="mt-1 text-[10px] uppercase tracking-wide text-white/70" { "Coming soon" }
                        }
                    }
                }
            }
        }

        (quick_actions(lang))

        @if user.can(Capabilities::APPROVE_TICKETS) {
            (approval_list(PENDING_APPROVALS))
        }

        section class="space-y-4" {
            (section_title("Union Overview"))
            (stat_grid(ADMIN_STATS))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::user::UserId;
    use crate::auth::user::UserRole;

    fn user_with(role: UserRole) -> User {
        User {
            id: UserId::new(),
            username: role.as_str().to_string(),
            roles: vec![role],
            name: "Test".to_string(),
        }
    }

    #[test]
    fn test_admin_cards_follow_capabilities() {
        let manager = admin_dashboard(&user_with(UserRole::Manager), Language::En).into_string();
        assert!(manager.contains("Approve Tickets"));
        assert!(manager.contains("Pending Approvals"));
        assert!(manager.contains(r#"action="/tickets/approve""#));
        assert!(!manager.contains("Create News"));
        assert!(!manager.contains("System configuration"));

        let admin = admin_dashboard(&user_with(UserRole::Super), Language::En).into_string();
        for (_, title, _) in ADMIN_ACTIONS {
            assert!(admin.contains(title), "{} missing for super", title);
        }
        assert!(admin.contains("Super Admin"));
    }

    #[test]
    fn test_member_home() {
        let home = member_home(Language::En).into_string();
        assert!(home.contains("Quick Actions"));
        assert!(home.contains("Ticket #1234 - Workplace Safety"));
        assert!(home.contains("Resolution Rate"));
        assert!(!home.contains("Admin Actions"));
    }
}
