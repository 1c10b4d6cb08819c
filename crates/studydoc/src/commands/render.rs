//! `studydoc render` command implementation.

use std::path::PathBuf;

use clap::Args;
use studydoc_config::Config;
use studydoc_consent::print_pipeline_with;
use studydoc_pipeline::residual_placeholders;

use super::template::{self, TemplateArgs};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the render command.
#[derive(Args)]
pub(crate) struct RenderArgs {
    #[command(flatten)]
    template: TemplateArgs,

    /// Write the HTML to this file instead of stdout.
    #[arg(short, long)]
    out: Option<PathBuf>,
}

impl RenderArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let config = self.template.load_config(None)?;
        let html = render_html(&self.template, &config, &output)?;

        match self.out {
            Some(path) => {
                std::fs::write(&path, html)?;
                output.success(&format!("Rendered {}", path.display()));
            }
            None => output.document(&html)?,
        }
        Ok(())
    }
}

/// Run the print pipeline over the template, warning about variables that
/// stayed unfilled.
pub(crate) fn render_html(
    args: &TemplateArgs,
    config: &Config,
    output: &Output,
) -> Result<String, CliError> {
    let markup = args.read_template()?;
    let record = args.read_record()?;
    let variables = args.variables(&record)?;

    let labels = template::labels(&config.consent.labels);
    let mut pipeline = print_pipeline_with(template::compiler(config), &record, &labels);
    let html = pipeline.render_html(&markup, &variables)?;

    let unfilled = residual_placeholders(&html);
    if !unfilled.is_empty() {
        output.warning(&format!("Unfilled variables: {}", unfilled.join(", ")));
    }
    Ok(html)
}
