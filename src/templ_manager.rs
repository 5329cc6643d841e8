use std::sync::OnceLock;

use tera::{Context, Tera};
use tracing::info;

#[derive(Debug)]
pub struct TemplateManager {
    tera: &'static Tera,
}

impl TemplateManager {
    /// Panics if the templates under `templates/` fail to parse.
    pub fn init() -> Self {
        info!("{:<20} - Initializing the Template manager", "templ_manager");
        static TERA: OnceLock<Tera> = OnceLock::new();
        let tera = TERA.get_or_init(|| {
            Tera::new("templates/**/*").unwrap_or_else(|e| panic!("Parsing error(s): {e}"))
        });
        Self { tera }
    }

    /// Renders a template file from the 'html/' directory.
    pub fn render_html_to_string(
        &self,
        ctx: &Context,
        template_file: &str,
    ) -> Result<String, tera::Error> {
        self.tera.render(&format!("html/{template_file}"), ctx)
    }

    /// Renders a template file from the 'xml/' directory.
    pub fn render_xml_to_string(
        &self,
        ctx: &Context,
        template_file: &str,
    ) -> Result<String, tera::Error> {
        self.tera.render(&format!("xml/{template_file}"), ctx)
    }
}
