pub mod announcements;
pub mod connect;
pub mod home;
pub mod payments;
pub mod profile;
pub mod tickets;

use maud::Markup;
use maud::html;
use serde::Deserialize;

pub const CARD: &str = "rounded-xl border border-gray-200 bg-white p-4 dark:border-gray-700 dark:bg-gray-800";

pub const INPUT: &str = "block w-full rounded-md bg-white px-3 py-1.5 text-base text-gray-900 outline-1 -outline-offset-1 outline-gray-300 placeholder:text-gray-400 focus:outline-2 focus:-outline-offset-2 focus:outline-indigo-600 sm:text-sm/6 dark:bg-white/5 dark:text-white dark:outline-white/10 dark:placeholder:text-gray-500 dark:focus:outline-indigo-500";

pub const LABEL: &str = "block text-sm/6 font-medium text-gray-900 dark:text-gray-100";

pub const PRIMARY_BUTTON: &str = "flex w-full justify-center rounded-md bg-indigo-600 px-3 py-1.5 text-sm/6 font-semibold text-white shadow-xs hover:bg-indigo-500 focus-visible:outline-2 focus-visible:outline-offset-2 focus-visible:outline-indigo-600 dark:bg-indigo-500 dark:shadow-none dark:hover:bg-indigo-400";

pub const SECONDARY_BUTTON: &str = "flex w-full justify-center rounded-md bg-gray-100 px-3 py-1.5 text-sm/6 font-medium text-gray-700 hover:bg-gray-200 dark:bg-gray-700 dark:text-gray-200 dark:hover:bg-gray-600";

#[derive(Deserialize, Default)]
pub struct SearchQuery {
    pub q: Option<String>,
}

impl SearchQuery {
    pub fn term(&self) -> &str {
        self.q.as_deref().map(str::trim).unwrap_or_default()
    }
}

pub fn badge(label: &str, class: &str) -> Markup {
    html! {
        span class={"inline-flex items-center rounded-full px-2 py-0.5 text-xs font-medium " (class)} {
            (label)
        }
    }
}

pub fn section_title(title: &str) -> Markup {
    html! {
        h2 class="text-lg font-semibold text-gray-900 dark:text-white" { (title) }
    }
}

pub fn search_form(action: &str, term: &str, placeholder: &str) -> Markup {
    html! {
        form action=(action) method="get" role="search" class="flex gap-2" {
            input
                type="search"
                name="q"
                value=(term)
                placeholder=(placeholder)
                aria-label=(placeholder)
                class=(INPUT);
            button
                type="submit"
                class="rounded-md bg-indigo-600 px-3 py-1.5 text-sm font-semibold text-white hover:bg-indigo-500" {
                "Search"
            }
        }
    }
}

pub fn stat_grid(stats: &[(&str, &str)]) -> Markup {
    html! {
        div class="grid grid-cols-2 gap-3 sm:grid-cols-3" {
            @for (label, value) in stats {
                div class=(CARD) {
                    p class="text-2xl font-bold text-indigo-600 dark:text-indigo-400" { (value) }
                    p class="text-xs text-gray-500 dark:text-gray-400" { (label) }
                }
            }
        }
    }
}
