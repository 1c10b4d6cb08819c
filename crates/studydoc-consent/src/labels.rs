//! Text printed next to consent widgets.

/// Labels of printed widgets and of the page footer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsentLabels {
    pub yes: String,
    pub no: String,
    pub firstname: String,
    pub lastname: String,
    pub location: String,
    pub birthdate: String,
    pub date: String,
    /// Footer prefix of the consent date.
    pub consent_on: String,
    /// Footer prefix of the study name.
    pub compliance: String,
    /// Word before the page counter.
    pub page: String,
}

impl Default for ConsentLabels {
    fn default() -> Self {
        Self {
            yes: "Yes".to_owned(),
            no: "No".to_owned(),
            firstname: "First name".to_owned(),
            lastname: "Last name".to_owned(),
            location: "Location".to_owned(),
            birthdate: "Date of birth".to_owned(),
            date: "Date".to_owned(),
            consent_on: "Consent given on".to_owned(),
            compliance: "Consent".to_owned(),
            page: "Page".to_owned(),
        }
    }
}
