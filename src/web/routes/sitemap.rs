use axum::{extract::State, http::header};
use chrono::Utc;
use tera::Context;

use crate::{web::WebResult, AppState};

/// A single entry sitemap pointing at the landing page, last modified "today".
pub async fn sitemap(
    State(app_state): State<AppState>,
) -> WebResult<([(header::HeaderName, &'static str); 1], String)> {
    let mut ctx = Context::new();
    ctx.insert("base_url", app_state.base_url.trim_end_matches('/'));
    ctx.insert("lastmod", &Utc::now().format("%Y-%m-%d").to_string());

    let body = app_state
        .templ_mgr
        .render_xml_to_string(&ctx, "sitemap.xml")?;

    Ok(([(header::CONTENT_TYPE, "application/xml")], body))
}
