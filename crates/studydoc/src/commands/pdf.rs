//! `studydoc pdf` command implementation.

use std::path::PathBuf;

use clap::Args;
use studydoc_config::{CliSettings, Config};
use studydoc_consent::{ConsentLabels, ConsentRecord};
use studydoc_pdf::{PageMargins, PdfGenerator, PdfOptions, PrintLayout};

use super::render::render_html;
use super::template::{self, TemplateArgs};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the pdf command.
#[derive(Args)]
pub(crate) struct PdfArgs {
    #[command(flatten)]
    template: TemplateArgs,

    /// Output PDF file.
    #[arg(short, long)]
    out: PathBuf,

    /// Conversion service URL (overrides config).
    #[arg(long, env = "STUDYDOC_ENGINE_URL")]
    engine_url: Option<String>,

    /// Render timeout in seconds (overrides config).
    #[arg(long)]
    timeout: Option<u64>,
}

impl PdfArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let settings = CliSettings {
            engine_url: self.engine_url.clone(),
            timeout_secs: self.timeout,
        };
        let config = self.template.load_config(Some(&settings))?;

        let body = render_html(&self.template, &config, &output)?;
        let record = self.template.read_record()?;
        let labels = template::labels(&config.consent.labels);
        let layout = print_layout(&config, &record, &labels);
        let options = layout.apply_to(pdf_options(&config));

        output.info(&format!("Rendering with {}", config.pdf.engine_url));
        let generator = PdfGenerator::http(&config.pdf.engine_url, config.pdf.timeout());
        let result = generator.render(&layout.page(&body), &options);
        generator.close();
        let pdf = result?;

        std::fs::write(&self.out, pdf)?;
        output.success(&format!("Wrote {}", self.out.display()));
        Ok(())
    }
}

fn pdf_options(config: &Config) -> PdfOptions {
    PdfOptions::new()
        .with_margins(PageMargins {
            top: config.pdf.margin_top.clone(),
            bottom: config.pdf.margin_bottom.clone(),
            left: config.pdf.margin_left.clone(),
            right: config.pdf.margin_right.clone(),
        })
        .with_timeout(config.pdf.timeout())
}

/// Header with the configured title; footer with consent date and study.
fn print_layout(config: &Config, record: &ConsentRecord, labels: &ConsentLabels) -> PrintLayout {
    let timestamp = record.timestamp.as_deref().unwrap_or_default();
    let study = record.study.as_deref().unwrap_or_default();

    PrintLayout::new(&config.pdf.header_title)
        .with_lang(&config.pdf.lang)
        .with_footer_cell(format!("{}: {timestamp}", labels.consent_on))
        .with_footer_cell(format!("{} {study}", labels.compliance))
        .with_page_label(&labels.page)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_pdf_options_from_config() {
        let mut config = Config::default();
        config.pdf.margin_top = "1cm".to_owned();
        config.pdf.timeout_secs = 7;

        let options = pdf_options(&config);
        assert_eq!(options.margins.top, "1cm");
        assert_eq!(options.margins.bottom, "4cm");
        assert_eq!(options.timeout, std::time::Duration::from_secs(7));
    }

    #[test]
    fn test_footer_shows_date_and_study() {
        let record = ConsentRecord {
            timestamp: Some("01.02.2024".to_owned()),
            study: Some("Study A".to_owned()),
            ..ConsentRecord::default()
        };
        let labels = ConsentLabels {
            consent_on: "Eingewilligt am".to_owned(),
            compliance: "Einwilligung".to_owned(),
            page: "Seite".to_owned(),
            ..ConsentLabels::default()
        };
        let footer = print_layout(&Config::default(), &record, &labels).footer_template();

        assert!(footer.contains("<td>Eingewilligt am: 01.02.2024</td>"), "{footer}");
        assert!(footer.contains("<td>Einwilligung Study A</td>"), "{footer}");
        assert!(footer.contains("Seite <span class=\"pageNumber\">"), "{footer}");
    }
}
