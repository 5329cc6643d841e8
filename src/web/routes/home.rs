use axum::{extract::State, response::Html};
use tera::Context;

use crate::{web::WebResult, AppState};

pub async fn home(State(app_state): State<AppState>) -> WebResult<Html<String>> {
    let mut ctx = Context::new();
    ctx.insert("base_url", app_state.base_url.trim_end_matches('/'));
    if let Some(site_key) = &app_state.site_key {
        ctx.insert("site_key", site_key);
    }

    let body = app_state.templ_mgr.render_html_to_string(&ctx, "home.html")?;

    Ok(Html(body))
}
