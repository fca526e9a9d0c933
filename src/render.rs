use tera::{Context, Tera};

use crate::error::RenderError;
use crate::view::ViewModel;

const TEMPLATE_NAME: &str = "visualiser.html";

/// Renders the page from a template compiled once at startup.
#[derive(Debug)]
pub struct Renderer {
    tera: Tera,
}

impl Renderer {
    pub fn new(template_content: &str) -> Result<Self, RenderError> {
        let mut tera = Tera::default();
        tera.add_raw_template(TEMPLATE_NAME, template_content)
            .map_err(RenderError::TemplateParse)?;
        Ok(Self { tera })
    }

    pub fn render(&self, view: &ViewModel) -> Result<String, RenderError> {
        let value = serde_json::to_value(view)?;
        let context = Context::from_value(value).map_err(RenderError::TemplateRender)?;
        self.tera
            .render(TEMPLATE_NAME, &context)
            .map_err(RenderError::TemplateRender)
    }
}
