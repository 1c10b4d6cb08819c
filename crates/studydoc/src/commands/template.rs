//! Inputs shared by all commands: template file, consent record, variables.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use clap::Args;
use studydoc_config::{CliSettings, Config, LabelsConfig};
use studydoc_consent::{ConsentLabels, ConsentRecord};
use studydoc_markup::{MarkupCompiler, TagAllowList};

use crate::error::CliError;

/// Arguments naming a template and the data to fill it with.
#[derive(Args)]
pub(crate) struct TemplateArgs {
    /// Markdown template file.
    pub(crate) file: PathBuf,

    /// Consent record (JSON) whose answers are printed into the widgets.
    #[arg(short, long)]
    pub(crate) record: Option<PathBuf>,

    /// Extra template variable as `name=value` (repeatable).
    #[arg(long = "var", value_name = "NAME=VALUE")]
    pub(crate) vars: Vec<String>,

    /// Path to configuration file (default: auto-discover studydoc.toml).
    #[arg(short, long)]
    pub(crate) config: Option<PathBuf>,
}

impl TemplateArgs {
    pub(crate) fn load_config(&self, settings: Option<&CliSettings>) -> Result<Config, CliError> {
        Ok(Config::load(self.config.as_deref(), settings)?)
    }

    pub(crate) fn read_template(&self) -> Result<String, CliError> {
        Ok(std::fs::read_to_string(&self.file)?)
    }

    pub(crate) fn read_record(&self) -> Result<ConsentRecord, CliError> {
        match &self.record {
            Some(path) => load_record(path),
            None => Ok(ConsentRecord::default()),
        }
    }

    /// Record variables overlaid with `--var` values.
    pub(crate) fn variables(&self, record: &ConsentRecord) -> Result<HashMap<String, String>, CliError> {
        let mut vars = record.variables();
        for var in &self.vars {
            let (name, value) = parse_var(var)?;
            vars.insert(name.to_owned(), value.to_owned());
        }
        Ok(vars)
    }
}

fn load_record(path: &Path) -> Result<ConsentRecord, CliError> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Split `name=value`. The value may contain `=`.
pub(crate) fn parse_var(var: &str) -> Result<(&str, &str), CliError> {
    match var.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => Ok((name.trim(), value)),
        _ => Err(CliError::Validation(format!(
            "invalid variable `{var}`, expected NAME=VALUE"
        ))),
    }
}

/// Markup compiler for the configured allow-list.
pub(crate) fn compiler(config: &Config) -> MarkupCompiler {
    let allow_list = match &config.markup.allowed_tags {
        Some(tags) => TagAllowList::new(tags),
        None => studydoc_consent::allow_list(),
    };
    MarkupCompiler::new(allow_list).with_inline_formatting(config.markup.inline_formatting)
}

/// Built-in labels with the configured overrides applied.
pub(crate) fn labels(config: &LabelsConfig) -> ConsentLabels {
    let mut labels = ConsentLabels::default();
    let overrides = [
        (&config.yes, &mut labels.yes),
        (&config.no, &mut labels.no),
        (&config.firstname, &mut labels.firstname),
        (&config.lastname, &mut labels.lastname),
        (&config.location, &mut labels.location),
        (&config.birthdate, &mut labels.birthdate),
        (&config.date, &mut labels.date),
        (&config.consent_on, &mut labels.consent_on),
        (&config.compliance, &mut labels.compliance),
        (&config.page, &mut labels.page),
    ];
    for (value, label) in overrides {
        if let Some(value) = value {
            label.clone_from(value);
        }
    }
    labels
}
