use super::CARD;
use super::INPUT;
use super::LABEL;
use super::PRIMARY_BUTTON;
use super::badge;
use super::section_title;
use crate::appstate::AppState;
use crate::auth::AuthSession;
use crate::auth::layout::language_switcher;
use crate::auth::user;
use crate::auth::user::User;
use crate::portal::MEMBERSHIP_STATS;
use crate::portal::PROFILE;
use crate::portal::layout::Page;
use crate::portal::layout::PageContext;
use crate::portal::layout::Tab;
use crate::portal::layout::layout;
use crate::preferences::FontSize;
use crate::preferences::Preferences;
use crate::security::SecureStorage;
use crate::security::validation::ProfileForm;
use crate::seo::PageSeo;
use crate::seo::PageType;
use axum::extract::State;
use axum::response::Redirect;
use maud::Markup;
use maud::html;

/// Secure storage key for the member's own edits.
pub const PROFILE_KEY: &str = "profile";

const BENEFITS: &[&str] = &[
    "Healthcare Coverage",
    "Dental Insurance",
    "Legal Protection",
    "Retirement Plan",
];

const SETTINGS_LINKS: &[&str] = &[
    "Notification Settings",
    "Privacy & Security",
    "Download Membership Card",
];

/// The fixture profile with any saved edits laid over it.
fn current_profile(saved: Option<ProfileForm>) -> ProfileForm {
    saved.unwrap_or_else(|| ProfileForm {
        name: PROFILE.name.to_string(),
        email: PROFILE.email.to_string(),
        phone: PROFILE.phone.to_string(),
        department: PROFILE.department.to_string(),
        position: PROFILE.position.to_string(),
    })
}

fn initials(name: &str) -> String {
    name.split_whitespace()
        .filter_map(|part| part.chars().next())
        .take(2)
        .collect::<String>()
        .to_uppercase()
}

fn profile_header(profile: &ProfileForm) -> Markup {
    html! {
        section class=(CARD) {
            div class="flex items-center gap-4" {
                div class="flex h-20 w-20 shrink-0 items-center justify-center rounded-full bg-indigo-600 text-xl font-bold text-white" {
                    (initials(&profile.name))
                }
                div {
                    h2 class="text-xl font-bold text-gray-900 dark:text-white" { (profile.name) }
                    p class="text-gray-500 dark:text-gray-400" { (profile.position) }
                    p class="text-sm text-gray-500 dark:text-gray-400" { (profile.department) }
                    div class="mt-2 flex gap-2" {
                        (badge(PROFILE.membership_status, "bg-green-100 text-green-800"))
                        (badge(&format!("ID: {}", PROFILE.member_id), "bg-gray-100 text-gray-700 dark:bg-gray-700 dark:text-gray-200"))
                    }
                }
            }

            dl class="mt-4 space-y-2 text-sm text-gray-700 dark:text-gray-300" {
                div { dt class="sr-only" { "Email" } dd { (profile.email) } }
                @if !profile.phone.is_empty() {
                    div { dt class="sr-only" { "Phone" } dd { (profile.phone) } }
                }
                div { dt class="sr-only" { "Location" } dd { (PROFILE.location) } }
                div { dt class="sr-only" { "Joined" } dd { "Member since " (PROFILE.join_date) } }
            }
        }
    }
}

fn edit_form(profile: &ProfileForm) -> Markup {
    let fields = [
        ("name", "Full Name *", "text", &profile.name),
        ("email", "Email *", "email", &profile.email),
        ("phone", "Phone", "tel", &profile.phone),
        ("department", "Department *", "text", &profile.department),
        ("position", "Position *", "text", &profile.position),
    ];

    html! {
        details class=(CARD) {
            summary class="cursor-pointer text-lg font-semibold text-gray-900 dark:text-white" { "Edit Profile" }
            form action="/profile" method="post" class="mt-4 space-y-4" {
                @for (name, label, kind, value) in fields {
                    div class="space-y-2" {
                        label for=(name) class=(LABEL) { (label) }
                        input id=(name) name=(name) type=(kind) value=(value) class=(INPUT);
                    }
                }
                button type="submit" class=(PRIMARY_BUTTON) { "Save Changes" }
            }
        }
    }
}

fn toggle(setting: &str, label: &str, on: bool) -> Markup {
    html! {
        form action="/settings/accessibility" method="post" class="flex items-center justify-between" {
            input type="hidden" name="setting" value=(setting);
            input type="hidden" name="next" value="/profile";
            span class="text-sm text-gray-700 dark:text-gray-300" { (label) }
            button
                type="submit"
                role="switch"
                aria-checked=(if on { "true" } else { "false" })
                aria-label=(label)
                class={
                    "rounded-full px-3 py-1 text-xs font-medium "
                    @if on { "bg-indigo-600 text-white" } @else { "bg-gray-200 text-gray-700 dark:bg-gray-700 dark:text-gray-200" }
                } {
                @if on { "On" } @else { "Off" }
            }
        }
    }
}

fn accessibility_settings(prefs: &Preferences) -> Markup {
    html! {
        section class={(CARD) " space-y-3"} {
            (section_title("Accessibility"))
            (toggle("high-contrast", "High contrast", prefs.high_contrast))
            (toggle("reduced-motion", "Reduce motion", prefs.reduced_motion))
            form action="/settings/accessibility" method="post" class="flex items-center justify-between" {
                input type="hidden" name="setting" value="font-size";
                input type="hidden" name="next" value="/profile";
                span class="text-sm text-gray-700 dark:text-gray-300" { "Text size" }
                div class="flex gap-1" {
                    @for size in FontSize::ALL {
                        button
                            type="submit"
                            name="value"
                            value=(size.as_str())
                            aria-pressed=(if size == prefs.font_size { "true" } else { "false" })
                            class={
                                "rounded px-2 py-1 text-xs capitalize "
                                @if size == prefs.font_size { "bg-indigo-600 text-white" } @else { "bg-gray-200 text-gray-700 dark:bg-gray-700 dark:text-gray-200" }
                            } {
                            (size.as_str())
                        }
                    }
                }
            }
            (language_switcher(prefs.language, "/profile"))
        }
    }
}

fn signed_in_as(user: &User) -> Markup {
    html! {
        section class=(CARD) {
            (section_title("Signed In"))
            p class="mt-2 text-sm text-gray-700 dark:text-gray-300" {
                (user.name) " (" (user.username) ")"
            }
            div class="mt-2 flex flex-wrap gap-2" {
                @for role in &user.roles {
                    (badge(role.display_name(), "bg-indigo-100 text-indigo-700 dark:bg-indigo-900/50 dark:text-indigo-200"))
                }
            }
        }
    }
}

pub async fn profile_page(
    State(state): State<AppState>,
    session: AuthSession,
    ctx: PageContext,
) -> Result<Markup, Redirect> {
    let storage = SecureStorage::new(&session.session);
    let saved = storage
        .get::<ProfileForm>(PROFILE_KEY)
        .await
        .unwrap_or_else(|e| {
            tracing::warn!("could not read saved profile: {}", e);
            None
        });
    let user = user::get_user(session)?;
    let profile = current_profile(saved);

    let content = html! {
        (profile_header(&profile))

        section class=(CARD) {
            h2 class="mb-3 text-lg font-semibold text-gray-900 dark:text-white" { "Membership Overview" }
            div class="grid grid-cols-2 gap-4" {
                @for (label, value) in MEMBERSHIP_STATS {
                    div class="rounded-lg bg-gray-50 p-3 text-center dark:bg-gray-700/50" {
                        p class="font-bold text-indigo-600 dark:text-indigo-400" { (value) }
                        p class="text-xs text-gray-500 dark:text-gray-400" { (label) }
                    }
                }
            }
        }

        (edit_form(&profile))

        section class={(CARD) " space-y-2"} {
            (section_title("Account Settings"))
            @for link in SETTINGS_LINKS {
                p class="rounded-md border border-gray-200 px-3 py-2 text-sm text-gray-500 dark:border-gray-700 dark:text-gray-400" {
                    (link) " · Coming soon"
                }
            }
        }

        section class="rounded-xl bg-gradient-to-br from-indigo-600 to-violet-600 p-5 text-white shadow" {
            h2 class="text-lg font-semibold" { "Your Union Benefits" }
            ul class="mt-3 space-y-2 text-sm" {
                @for benefit in BENEFITS {
                    li class="flex items-center justify-between" {
                        span { (benefit) }
                        (badge("Active", "bg-white/20 text-white"))
                    }
                }
            }
        }

        (accessibility_settings(&ctx.prefs))

        (signed_in_as(&user))

        form action="/signout" method="post" {
            button
                type="submit"
                class="flex w-full justify-center rounded-md bg-red-600 px-3 py-2 text-sm font-semibold text-white hover:bg-red-500" {
                "Sign Out"
            }
        }
    };

    let seo = PageSeo {
        page_type: PageType::Profile,
        ..PageSeo::titled("My Profile")
    };

    Ok(layout(
        &state.seo,
        &ctx,
        &Page::new("My Profile", Tab::Profile).with_seo(seo),
        content,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::Language;

    #[test]
    fn test_saved_edits_replace_fixture() {
        assert_eq!(current_profile(None).name, "John Smith");

        let saved = ProfileForm {
            name: "Jane Doe".into(),
            email: "jane@example.com".into(),
            phone: String::new(),
            department: "Quality".into(),
            position: "Inspector".into(),
        };
        assert_eq!(current_profile(Some(saved.clone())), saved);
    }

    #[test]
    fn test_initials() {
        assert_eq!(initials("John Smith"), "JS");
        assert_eq!(initials("cher"), "C");
    }

    #[test]
    fn test_accessibility_settings_reflect_preferences() {
        let prefs = Preferences {
            high_contrast: true,
            reduced_motion: false,
            font_size: FontSize::Large,
            language: Language::En,
        };
        let markup = accessibility_settings(&prefs).into_string();
        assert!(markup.contains(r#"aria-checked="true" aria-label="High contrast""#));
        assert!(markup.contains(r#"aria-checked="false" aria-label="Reduce motion""#));
        assert!(markup.contains(r#"value="large" aria-pressed="true""#));
    }
}
