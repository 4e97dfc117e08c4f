use crate::appstate::AppState;
use crate::portal::layout::PageContext;
use crate::portal::views::PRIMARY_BUTTON;
use crate::seo::PageSeo;
use crate::theme::theme;
use axum::extract::State;
use axum::http::StatusCode;
use axum::http::Uri;
use axum::response::IntoResponse;
use maud::html;

pub async fn not_found_page(
    State(state): State<AppState>,
    ctx: PageContext,
    uri: Uri,
) -> impl IntoResponse {
    tracing::warn!("404: no route for {}", uri.path());

    let seo = PageSeo::titled("Page not found");

    (
        StatusCode::NOT_FOUND,
        theme(
            &ctx.prefs,
            state.seo.head(&seo, &ctx.path),
            html! {
                div class="flex min-h-full flex-col items-center justify-center gap-4 px-6 py-12 text-center" {
                    h1 class="text-4xl font-bold text-gray-900 dark:text-white" { "404" }
                    p class="text-xl text-gray-600 dark:text-gray-400" { "Oops! Page not found" }
                    div class="w-full max-w-xs" {
                        a href="/" class=(PRIMARY_BUTTON) { "Return to Home" }
                    }
                }
            },
        ),
    )
}
