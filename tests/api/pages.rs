use anyhow::Result;
use reqwest::StatusCode;

use crate::helpers::TestApp;

#[tokio::test]
async fn home_renders_signup_form() -> Result<()> {
    let app = TestApp::spawn().await?;

    let res = app.http_client.get(app.url("/")).send().await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body = res.text().await?;
    assert!(body.contains(r#"id="signup-form""#));
    assert!(!body.contains("data-sitekey"));

    Ok(())
}

#[tokio::test]
async fn home_renders_turnstile_widget_when_configured() -> Result<()> {
    let app = TestApp::spawn_with_turnstile().await?;

    let body = app.http_client.get(app.url("/")).send().await?.text().await?;

    assert!(body.contains(r#"data-sitekey="test-site-key""#));

    Ok(())
}

#[tokio::test]
async fn sitemap_is_xml() -> Result<()> {
    let app = TestApp::spawn().await?;

    let res = app.http_client.get(app.url("/sitemap.xml")).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(
        res.headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok()),
        Some("application/xml")
    );

    let body = res.text().await?;
    assert!(body.contains("<urlset"));
    assert!(body.contains("<loc>"));

    Ok(())
}
