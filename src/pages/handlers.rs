//! Page handlers

use axum::extract::{Extension, Json, Path};
use axum::http::StatusCode;
use axum::response::Html;
use tracing::debug;

use crate::common::{escape_html, AppState};
use crate::i18n::Locale;

/// GET /:locale/graphql-client
/// Renders the localized GraphQL client introduction
pub async fn graphql_client_page(
    Extension(state): Extension<AppState>,
    Path(locale): Path<String>,
) -> Result<Html<String>, StatusCode> {
    let Some(locale) = Locale::from_tag(&locale) else {
        debug!(locale = %locale, "Page requested for unsupported locale");
        return Err(StatusCode::NOT_FOUND);
    };

    let t = state.catalog.translator(locale, "GRAPHQL_CLIENT");
    let title = escape_html(&t.t("title"));
    let description = escape_html(&t.t("description"));

    Ok(Html(format!(
        "<!DOCTYPE html>\n\
         <html lang=\"{lang}\">\n\
         <head><meta charset=\"utf-8\"><title>{title}</title></head>\n\
         <body>\n\
         <main>\n\
         <h1>{title}</h1>\n\
         <p>{description}</p>\n\
         </main>\n\
         </body>\n\
         </html>\n",
        lang = locale.code(),
        title = title,
        description = description,
    )))
}

/// GET /health
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
