//! A participant's given consent and the variables derived from it.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use studydoc_tree::escape_text;

/// Variable prefix of free-text answers to generic fields.
pub const GENERIC_TEXT_PREFIX: &str = "genericText";

/// Placeholder key for a generic field name.
///
/// Field names are chosen by study authors and may contain anything; the
/// key is a fixed-length hex digest that is always a valid placeholder.
#[must_use]
pub fn generic_key(name: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(name.trim().as_bytes());
    let result = hasher.finalize();
    hex::encode(&result[..16])
}

/// Variable name under which a generic text answer is rendered.
#[must_use]
pub fn generic_text_variable(name: &str) -> String {
    format!("{GENERIC_TEXT_PREFIX}.{}", generic_key(name))
}

/// Consent questions every study template may ask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SystemDecision {
    App,
    Samples,
    Bloodsamples,
    Labresults,
}

impl SystemDecision {
    pub const ALL: [Self; 4] = [Self::App, Self::Samples, Self::Bloodsamples, Self::Labresults];

    /// Name used by switch widgets (`<pia-consent-switch-radio-system name="app">`).
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::App => "app",
            Self::Samples => "samples",
            Self::Bloodsamples => "bloodsamples",
            Self::Labresults => "labresults",
        }
    }

    /// Look up a decision by its switch name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|d| d.name().eq_ignore_ascii_case(name.trim()))
    }
}

/// Personal data fields printed as text lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SystemText {
    Firstname,
    Lastname,
    Location,
    Birthdate,
    Date,
}

impl SystemText {
    pub const ALL: [Self; 5] = [
        Self::Firstname,
        Self::Lastname,
        Self::Location,
        Self::Birthdate,
        Self::Date,
    ];

    /// Template variable holding the field's value.
    #[must_use]
    pub fn variable(self) -> &'static str {
        match self {
            Self::Firstname => "firstname",
            Self::Lastname => "lastname",
            Self::Location => "location",
            Self::Birthdate => "birthdate",
            Self::Date => "timestamp",
        }
    }
}

/// Answers a participant gave when agreeing to a consent template.
///
/// Read from the JSON the study service stores:
///
/// ```
/// use studydoc_consent::{ConsentRecord, SystemDecision};
///
/// let record: ConsentRecord = serde_json::from_str(r#"{
///     "firstname": "Erika",
///     "complianceApp": true,
///     "genericCompliance": { "newsletter": false }
/// }"#).unwrap();
///
/// assert_eq!(record.decision(SystemDecision::App), Some(true));
/// assert_eq!(record.generic_decision("newsletter"), Some(false));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ConsentRecord {
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    pub location: Option<String>,
    /// Formatted date of birth.
    pub birthdate: Option<String>,
    /// Formatted date the consent was given.
    pub timestamp: Option<String>,
    /// Study the consent belongs to.
    pub study: Option<String>,

    pub compliance_app: Option<bool>,
    pub compliance_samples: Option<bool>,
    pub compliance_bloodsamples: Option<bool>,
    pub compliance_labresults: Option<bool>,

    /// Free-text answers by generic field name.
    pub generic_text: BTreeMap<String, String>,
    /// Yes/no answers by generic field name.
    pub generic_compliance: BTreeMap<String, bool>,
}

impl ConsentRecord {
    /// Answer to one of the system questions.
    #[must_use]
    pub fn decision(&self, decision: SystemDecision) -> Option<bool> {
        match decision {
            SystemDecision::App => self.compliance_app,
            SystemDecision::Samples => self.compliance_samples,
            SystemDecision::Bloodsamples => self.compliance_bloodsamples,
            SystemDecision::Labresults => self.compliance_labresults,
        }
    }

    /// System answers keyed by their switch names.
    #[must_use]
    pub fn system_decisions(&self) -> BTreeMap<String, bool> {
        SystemDecision::ALL
            .into_iter()
            .filter_map(|d| Some((d.name().to_owned(), self.decision(d)?)))
            .collect()
    }

    /// Answer to a generic yes/no field.
    #[must_use]
    pub fn generic_decision(&self, name: &str) -> Option<bool> {
        self.generic_compliance.get(name.trim()).copied()
    }

    /// Value of a personal data field.
    #[must_use]
    pub fn text(&self, field: SystemText) -> Option<&str> {
        match field {
            SystemText::Firstname => self.firstname.as_deref(),
            SystemText::Lastname => self.lastname.as_deref(),
            SystemText::Location => self.location.as_deref(),
            SystemText::Birthdate => self.birthdate.as_deref(),
            SystemText::Date => self.timestamp.as_deref(),
        }
        .map(str::trim)
    }

    /// Template variables for the rendered artifact.
    ///
    /// Values are HTML-escaped, since the renderer inserts them verbatim.
    /// Missing fields render as empty strings so no placeholder of a consent
    /// widget survives.
    #[must_use]
    pub fn variables(&self) -> HashMap<String, String> {
        let mut vars: HashMap<String, String> = SystemText::ALL
            .into_iter()
            .map(|f| {
                (
                    f.variable().to_owned(),
                    escape_text(self.text(f).unwrap_or_default()),
                )
            })
            .collect();

        if let Some(study) = &self.study {
            vars.insert("study".to_owned(), escape_text(study));
        }
        for (name, value) in &self.generic_text {
            vars.insert(generic_text_variable(name), escape_text(value));
        }
        vars
    }
}
