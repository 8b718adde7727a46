use handlebars::Handlebars;
use serde_json::json;

use crate::error::Result;
use crate::report::{CorrelatedRow, ReportHeader};

const REMIND_TEMPLATE: &str = "remind";
const LINKS_PARTIAL: &str = "links";

/// Turns one owner's rows into the document that gets mailed.
pub trait ReportRenderer {
    fn render(&self, header: &ReportHeader, rows: &[CorrelatedRow]) -> Result<String>;
}

/// Renders the HTML reminder embedded in the binary.
pub struct HandlebarsRenderer<'a> {
    registry: Handlebars<'a>,
}

impl HandlebarsRenderer<'_> {
    pub fn new() -> Result<Self> {
        let mut registry = Handlebars::new();

        registry.register_template_string(
            REMIND_TEMPLATE,
            include_str!("../../templates/remind.html.hbs"),
        )?;
        registry.register_partial(
            LINKS_PARTIAL,
            r#"<ul>{{#each items}}<li>{{#if url}}<a href="{{url}}">{{name}}</a>{{else}}{{name}}{{/if}}</li>{{/each}}</ul>"#,
        )?;

        Ok(Self { registry })
    }
}

impl ReportRenderer for HandlebarsRenderer<'_> {
    fn render(&self, header: &ReportHeader, rows: &[CorrelatedRow]) -> Result<String> {
        let data = json!({
            "header": header,
            "rows": rows,
        });

        Ok(self.registry.render(REMIND_TEMPLATE, &data)?)
    }
}
