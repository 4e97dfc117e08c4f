use super::CARD;
use super::badge;
use super::section_title;
use crate::appstate::AppState;
use crate::auth::AuthSession;
use crate::auth::user;
use crate::known_errors::KnownErrors;
use crate::portal::MONTHLY_DUES_CENTS;
use crate::portal::NEXT_DUE_DATE;
use crate::portal::PAYMENTS;
use crate::portal::PROFILE;
use crate::portal::Payment;
use crate::portal::find_payment;
use crate::portal::format_cents;
use crate::portal::layout::Page;
use crate::portal::layout::PageContext;
use crate::portal::layout::Tab;
use crate::portal::layout::layout;
use crate::security::sanitize::sanitize_filename;
use crate::telemetry::analytics::Visitor;
use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;
use axum::http::header;
use axum::response::IntoResponse;
use axum::response::Redirect;
use axum::response::Response;
use maud::Markup;
use maud::html;
use serde_json::json;

fn payment_row(payment: &Payment) -> Markup {
    html! {
        div class={(CARD) " flex items-start justify-between gap-3"} {
            div class="flex-1" {
                h3 class="text-sm font-medium text-gray-900 dark:text-white" { (payment.description) }
                p class="mt-1 text-xs text-gray-500 dark:text-gray-400" { "ID: " (payment.id) }
                div class="mt-2 flex gap-4 text-xs text-gray-500 dark:text-gray-400" {
                    span { (payment.date) }
                    span { (payment.method) }
                }
            }
            div class="flex flex-col items-end gap-1" {
                p class="text-sm font-bold text-gray-900 dark:text-white" { (payment.amount()) }
                (badge(payment.status.label(), payment.status.badge_class()))
                a
                    href={"/payments/" (payment.id) "/receipt"}
                    class="text-xs font-medium text-indigo-600 hover:text-indigo-500 dark:text-indigo-400" {
                    "Receipt"
                }
            }
        }
    }
}

pub async fn payments_page(
    State(state): State<AppState>,
    session: AuthSession,
    ctx: PageContext,
) -> Result<Markup, Redirect> {
    user::get_user(session)?;

    let content = html! {
        section class="rounded-xl bg-gradient-to-br from-indigo-600 to-violet-600 p-5 text-white shadow" {
            h2 class="text-lg font-semibold" { "Dues Summary" }
            div class="mt-3 grid grid-cols-2 gap-4" {
                div {
                    p class="text-sm text-white/80" { "Monthly Dues" }
                    p class="text-2xl font-bold" { (format_cents(MONTHLY_DUES_CENTS)) }
                }
                div {
                    p class="text-sm text-white/80" { "Next Due Date" }
                    p class="text-lg font-semibold" { (NEXT_DUE_DATE) }
                }
            }
            form action="/payments/pay" method="post" class="mt-4" {
                button
                    type="submit"
                    class="flex w-full justify-center rounded-md bg-white px-3 py-1.5 text-sm font-semibold text-indigo-700 hover:bg-gray-100" {
                    "Pay Now"
                }
            }
        }

        section class="space-y-3" {
            (section_title("Payment History"))
            @for payment in PAYMENTS {
                (payment_row(payment))
            }
        }

        section class={(CARD) " space-y-3"} {
            (section_title("Need Help?"))
            p class="text-sm text-gray-500 dark:text-gray-400" {
                "If you have questions about payments, dues, or billing, please contact our member services team."
            }
            div class="space-y-1 text-sm text-gray-700 dark:text-gray-300" {
                p { strong { "Phone: " } "(555) UNION-PAY" }
                p { strong { "Email: " } "billing@tee1104.org" }
                p { strong { "Office Hours: " } "Mon-Fri 9AM-5PM" }
            }
        }
    };

    Ok(layout(
        &state.seo,
        &ctx,
        &Page::new("Payments & Dues", Tab::None),
        content,
    ))
}

fn receipt_text(payment: &Payment) -> String {
    format!(
        "TEE 1104 Union - Payment Receipt\n\
         ================================\n\
         Receipt ID:  {}\n\
         Member:      {} ({})\n\
         Description: {}\n\
         Amount:      {}\n\
         Date:        {}\n\
         Method:      {}\n\
         Status:      {}\n",
        payment.id,
        PROFILE.name,
        PROFILE.member_id,
        payment.description,
        payment.amount(),
        payment.date,
        payment.method,
        payment.status.label(),
    )
}

pub async fn download_receipt(
    State(state): State<AppState>,
    session: AuthSession,
    Path(id): Path<String>,
) -> Result<Response, Redirect> {
    let visitor = Visitor::from_session(&session.session, None, "/payments").await;
    let user = user::get_user(session)?;

    let payment = find_payment(&id).ok_or_else(|| {
        KnownErrors::NotFound {
            what: format!("Payment {}", id),
        }
        .redirect("/payments")
    })?;

    match visitor {
        Ok(visitor) => state.analytics.track(
            &Visitor {
                user_id: Some(user.id.to_string()),
                ..visitor
            },
            "receipt_download",
            json!({ "payment_id": payment.id }),
        ),
        Err(e) => tracing::warn!("could not resolve analytics session: {}", e),
    }

    let filename = sanitize_filename(&format!("receipt-{}.txt", payment.id));

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        receipt_text(payment),
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_receipt_text() {
        let receipt = receipt_text(&PAYMENTS[1]);
        assert!(receipt.contains("Receipt ID:  PAY-002"));
        assert!(receipt.contains("Amount:      $10.00"));
        assert!(receipt.contains("TEE-1104-5678"));
    }

    #[test]
    fn test_payment_row_links_receipt() {
        let row = payment_row(&PAYMENTS[0]).into_string();
        assert!(row.contains(r#"href="/payments/PAY-001/receipt""#));
        assert!(row.contains("$25.00"));
    }
}
