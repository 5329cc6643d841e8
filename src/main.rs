use beta_signup::{config::get_or_init_config, App, Result};

#[tokio::main]
async fn main() -> Result<()> {
    // We have a different logging mechanism for production
    #[cfg(not(debug_assertions))]
    {
        beta_signup::init_production_tracing()
    }
    #[cfg(debug_assertions)]
    {
        beta_signup::init_dbg_tracing();
    }

    let config = get_or_init_config();
    let app = App::build_from_config(config).await?;

    beta_signup::serve(app).await?;

    Ok(())
}
