use super::views::profile::PROFILE_KEY;
use crate::appstate::AppState;
use crate::auth::AuthSession;
use crate::auth::user;
use crate::known_errors::KnownErrors;
use crate::known_errors::RedirectOnError;
use crate::auth::user::Capabilities;
use crate::portal::MEMBER_GROUPS;
use crate::portal::find_pending_approval;
use crate::security::SanitizeKind;
use crate::security::SecureStorage;
use crate::security::sanitize::sanitize;
use crate::security::validation::ContactForm;
use crate::security::validation::ProfileForm;
use crate::security::validation::TicketForm;
use crate::security::validation::validate_contact;
use crate::security::validation::validate_profile;
use crate::security::validation::validate_ticket;
use crate::telemetry::analytics::Visitor;
use crate::toast::Toast;
use axum::Form;
use axum::extract::State;
use axum::response::Redirect;
use serde::Deserialize;
use serde_json::json;

/// Minutes a saved profile edit stays readable.
const PROFILE_TTL_MINUTES: i64 = 60;

async fn resolve_visitor(session: &AuthSession, page: &str) -> Result<Visitor, KnownErrors> {
    let user_id = session.user.as_ref().map(|u| u.id.to_string());
    Ok(Visitor::from_session(&session.session, user_id, page).await?)
}

pub async fn create_ticket(
    State(state): State<AppState>,
    session: AuthSession,
    Form(form): Form<TicketForm>,
) -> Result<Redirect, Redirect> {
    const CALLBACK_URL: &str = "/tickets/new";

    let visitor = resolve_visitor(&session, CALLBACK_URL).await.or_redirect(CALLBACK_URL)?;
    let user = user::get_user(session.clone())?;

    let form = TicketForm {
        title: sanitize(&form.title, SanitizeKind::Text),
        category: sanitize(&form.category, SanitizeKind::Text),
        priority: sanitize(&form.priority, SanitizeKind::Text),
        description: sanitize(&form.description, SanitizeKind::Text),
    };

    let draft = match validate_ticket(&form) {
        Ok(draft) => draft,
        Err(messages) => {
            state
                .analytics
                .track_form_submit(&visitor, "create_ticket", false);
            return Err(KnownErrors::InvalidInput { messages }.redirect(CALLBACK_URL));
        }
    };

    state
        .performance
        .measure_async("ticket_submit", state.simulate_latency())
        .await;

    tracing::info!(
        "{} raised a {} priority {} ticket: {}",
        user.username,
        draft.priority.value(),
        draft.category.value(),
        draft.title
    );
    state
        .analytics
        .track_form_submit(&visitor, "create_ticket", true);

    Toast::success("Ticket Created", "Your ticket has been submitted successfully!")
        .push(&session.session)
        .await
        .or_redirect(CALLBACK_URL)?;

    Ok(Redirect::to("/tickets"))
}

pub async fn send_message(
    State(state): State<AppState>,
    session: AuthSession,
    Form(form): Form<ContactForm>,
) -> Result<Redirect, Redirect> {
    const CALLBACK_URL: &str = "/connect";

    let visitor = resolve_visitor(&session, CALLBACK_URL).await.or_redirect(CALLBACK_URL)?;
    user::get_user(session.clone())?;

    let form = ContactForm {
        name: sanitize(&form.name, SanitizeKind::Text),
        email: sanitize(&form.email, SanitizeKind::Email),
        subject: sanitize(&form.subject, SanitizeKind::Text),
        message: sanitize(&form.message, SanitizeKind::Text),
    };

    if let Err(messages) = validate_contact(&form) {
        state
            .analytics
            .track_form_submit(&visitor, "contact_leadership", false);
        return Err(KnownErrors::InvalidInput { messages }.redirect(CALLBACK_URL));
    }

    state.simulate_latency().await;
    state
        .analytics
        .track_form_submit(&visitor, "contact_leadership", true);

    Toast::success(
        "Message Sent",
        "Union leadership will get back to you soon.",
    )
    .push(&session.session)
    .await
    .or_redirect(CALLBACK_URL)?;

    Ok(Redirect::to(CALLBACK_URL))
}

#[derive(Deserialize)]
pub struct JoinGroupForm {
    group: String,
}

pub async fn join_group(
    State(state): State<AppState>,
    session: AuthSession,
    Form(form): Form<JoinGroupForm>,
) -> Result<Redirect, Redirect> {
    const CALLBACK_URL: &str = "/connect";

    let visitor = resolve_visitor(&session, CALLBACK_URL).await.or_redirect(CALLBACK_URL)?;
    user::get_user(session.clone())?;

    let group = MEMBER_GROUPS
        .iter()
        .find(|g| g.name == form.group)
        .ok_or_else(|| KnownErrors::NotFound {
            what: "That group".to_string(),
        })
        .or_redirect(CALLBACK_URL)?;

    state.analytics.track(
        &visitor,
        "group_join_requested",
        json!({ "group": group.name }),
    );

    Toast::success(
        "Request Sent",
        format!("Your request to join {} has been sent.", group.name),
    )
    .push(&session.session)
    .await
    .or_redirect(CALLBACK_URL)?;

    Ok(Redirect::to(CALLBACK_URL))
}

pub async fn update_profile(
    State(state): State<AppState>,
    session: AuthSession,
    Form(form): Form<ProfileForm>,
) -> Result<Redirect, Redirect> {
    const CALLBACK_URL: &str = "/profile";

    let visitor = resolve_visitor(&session, CALLBACK_URL).await.or_redirect(CALLBACK_URL)?;
    user::get_user(session.clone())?;

    let form = ProfileForm {
        name: sanitize(&form.name, SanitizeKind::Text),
        email: sanitize(&form.email, SanitizeKind::Email),
        phone: sanitize(&form.phone, SanitizeKind::Phone).trim().to_string(),
        department: sanitize(&form.department, SanitizeKind::Text),
        position: sanitize(&form.position, SanitizeKind::Text),
    };

    if let Err(messages) = validate_profile(&form) {
        state
            .analytics
            .track_form_submit(&visitor, "profile", false);
        return Err(KnownErrors::InvalidInput { messages }.redirect(CALLBACK_URL));
    }

    SecureStorage::new(&session.session)
        .set(PROFILE_KEY, &form, Some(PROFILE_TTL_MINUTES))
        .await
        .or_redirect(CALLBACK_URL)?;

    state
        .analytics
        .track_form_submit(&visitor, "profile", true);

    Toast::success("Profile Updated", "Your changes have been saved.")
        .push(&session.session)
        .await
        .or_redirect(CALLBACK_URL)?;

    Ok(Redirect::to(CALLBACK_URL))
}

#[derive(Deserialize)]
pub struct ApproveTicketForm {
    ticket: String,
}

pub async fn approve_ticket(
    State(state): State<AppState>,
    session: AuthSession,
    Form(form): Form<ApproveTicketForm>,
) -> Result<Redirect, Redirect> {
    const CALLBACK_URL: &str = "/";

    let visitor = resolve_visitor(&session, CALLBACK_URL).await.or_redirect(CALLBACK_URL)?;
    let user = user::get_user(session.clone())?;

    user.require(Capabilities::APPROVE_TICKETS)
        .or_redirect(CALLBACK_URL)?;

    let ticket = find_pending_approval(&form.ticket)
        .ok_or_else(|| KnownErrors::NotFound {
            what: "That ticket".to_string(),
        })
        .or_redirect(CALLBACK_URL)?;

    tracing::info!("{} approved {}", user.username, ticket.title);
    state.analytics.track(
        &visitor,
        "ticket_approved",
        json!({ "ticket": ticket.title }),
    );

    Toast::success("Ticket Approved", format!("{} was approved.", ticket.title))
        .push(&session.session)
        .await
        .or_redirect(CALLBACK_URL)?;

    Ok(Redirect::to(CALLBACK_URL))
}

/// Payments are not wired to a processor yet; the member is told so.
pub async fn pay_now(
    State(state): State<AppState>,
    session: AuthSession,
) -> Result<Redirect, Redirect> {
    const CALLBACK_URL: &str = "/payments";

    let visitor = resolve_visitor(&session, CALLBACK_URL).await.or_redirect(CALLBACK_URL)?;
    user::get_user(session)?;

    state.analytics.track_feature_usage(&visitor, "pay_now");

    Err(KnownErrors::PaymentUnavailable.redirect(CALLBACK_URL))
}
