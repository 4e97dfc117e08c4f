use super::CARD;
use super::INPUT;
use super::LABEL;
use super::PRIMARY_BUTTON;
use super::SearchQuery;
use super::badge;
use super::search_form;
use crate::appstate::AppState;
use crate::auth::AuthSession;
use crate::auth::user;
use crate::portal::Ticket;
use crate::portal::TicketCategory;
use crate::portal::TicketPriority;
use crate::portal::layout::Page;
use crate::portal::layout::PageContext;
use crate::portal::layout::Tab;
use crate::portal::layout::layout;
use crate::portal::search_tickets;
use crate::seo::PageSeo;
use axum::extract::Query;
use axum::extract::State;
use axum::response::Redirect;
use maud::Markup;
use maud::html;

pub async fn ticket_list(
    State(state): State<AppState>,
    session: AuthSession,
    ctx: PageContext,
    Query(query): Query<SearchQuery>,
) -> Result<Markup, Redirect> {
    user::get_user(session)?;

    let term = query.term();
    let tickets = search_tickets(term);

    let content = html! {
        (state.seo.breadcrumbs(&[("Home", "/"), ("Tickets", "/tickets")]))

        (search_form("/tickets", term, "Search tickets..."))

        a href="/tickets/new" class=(PRIMARY_BUTTON) {
            "Raise New Ticket"
        }

        div class="space-y-3" {
            @for ticket in &tickets {
                (ticket_card(ticket))
            }
            @if tickets.is_empty() {
                p class="py-8 text-center text-sm text-gray-500 dark:text-gray-400" {
                    "No tickets match \"" (term) "\""
                }
            }
        }
    };

    Ok(layout(
        &state.seo,
        &ctx,
        &Page::new("My Tickets", Tab::Tickets).with_seo(
            PageSeo::titled("My Tickets").describe("Track the status of your union tickets."),
        ),
        content,
    ))
}

fn ticket_card(ticket: &Ticket) -> Markup {
    html! {
        article class={(CARD) " " (ticket.priority.border_class())} {
            div class="flex items-start justify-between gap-3" {
                div {
                    h3 class="text-sm font-medium text-gray-900 dark:text-white" { (ticket.title) }
                    p class="mt-1 text-xs text-gray-500 dark:text-gray-400" { "#" (ticket.id) }
                }
                div class="flex flex-col items-end gap-1" {
                    (badge(ticket.status.label(), ticket.status.badge_class()))
                    (badge(ticket.priority.label(), ticket.priority.badge_class()))
                }
            }
            p class="mt-2 text-sm text-gray-600 dark:text-gray-300" { (ticket.description) }
            div class="mt-2 flex items-center justify-between text-xs text-gray-500 dark:text-gray-400" {
                span { "Category: " (ticket.category.label()) }
                span { (ticket.date) }
            }
        }
    }
}

pub async fn create_ticket_page(
    State(state): State<AppState>,
    session: AuthSession,
    ctx: PageContext,
) -> Result<Markup, Redirect> {
    user::get_user(session)?;

    let content = html! {
        a href="/tickets" class="text-sm font-medium text-indigo-600 hover:text-indigo-500 dark:text-indigo-400" {
            "← Back to Tickets"
        }

        div class=(CARD) {
            h2 class="mb-4 text-lg font-semibold text-gray-900 dark:text-white" { "Submit New Ticket" }

            form action="/tickets/new" method="post" class="space-y-4" {
                div class="space-y-2" {
                    label for="title" class=(LABEL) { "Ticket Title *" }
                    input
                        id="title"
                        name="title"
                        type="text"
                        placeholder="Brief description of your issue"
                        maxlength="100"
                        required
                        class=(INPUT);
                }

                div class="grid grid-cols-2 gap-4" {
                    div class="space-y-2" {
                        label for="category" class=(LABEL) { "Category *" }
                        select id="category" name="category" required class=(INPUT) {
                            option value="" { "Select category" }
                            @for category in TicketCategory::ALL {
                                option value=(category.value()) { (category.label()) }
                            }
                        }
                    }

                    div class="space-y-2" {
                        label for="priority" class=(LABEL) { "Priority *" }
                        select id="priority" name="priority" required class=(INPUT) {
                            option value="" { "Select priority" }
                            @for priority in TicketPriority::ALL {
                                option value=(priority.value()) { (priority.label()) }
                            }
                        }
                    }
                }

                div class="space-y-2" {
                    label for="description" class=(LABEL) { "Description *" }
                    textarea
                        id="description"
                        name="description"
                        rows="6"
                        maxlength="1000"
                        placeholder="Please provide detailed information about your issue..."
                        required
                        class=(INPUT) {}
                }

                div class="rounded-md bg-gray-100 p-3 dark:bg-gray-700/50" {
                    p class="text-sm text-gray-600 dark:text-gray-300" {
                        strong { "Note: " }
                        "All ticket submissions are confidential and will be reviewed by union representatives. "
                        "You will receive updates on your ticket status via email."
                    }
                }

                button type="submit" class=(PRIMARY_BUTTON) { "Submit Ticket" }
            }
        }
    };

    Ok(layout(
        &state.seo,
        &ctx,
        &Page::new("Create Ticket", Tab::Tickets),
        content,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::portal::TICKETS;

    #[test]
    fn test_ticket_card_shows_badges() {
        let card = ticket_card(&TICKETS[0]).into_string();
        assert!(card.contains(TICKETS[0].title));
        assert!(card.contains(TICKETS[0].status.label()));
        assert!(card.contains(TICKETS[0].priority.border_class()));
    }
}
