//! `studydoc segment` command implementation.

use std::path::PathBuf;

use clap::Args;
use studydoc_config::Config;
use studydoc_pipeline::TemplatePipeline;

use super::template;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the segment command.
#[derive(Args)]
pub(crate) struct SegmentArgs {
    /// Markdown template file.
    file: PathBuf,

    /// Print compact JSON.
    #[arg(long)]
    compact: bool,

    /// Path to configuration file (default: auto-discover studydoc.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,
}

impl SegmentArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let config = Config::load(self.config.as_deref(), None)?;
        let markup = std::fs::read_to_string(&self.file)?;

        let compiler = template::compiler(&config);
        let mut pipeline =
            TemplatePipeline::new(compiler.allow_list().clone()).with_compiler(compiler);
        let segments = pipeline.segment(&markup)?;

        let json = if self.compact {
            serde_json::to_string(&segments)?
        } else {
            serde_json::to_string_pretty(&segments)?
        };
        output.document(&json)?;
        Ok(())
    }
}
