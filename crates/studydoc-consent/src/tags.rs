//! Custom tags of consent templates.

use studydoc_markup::TagAllowList;

pub const RADIO_APP: &str = "pia-consent-input-radio-app";
pub const RADIO_SAMPLES: &str = "pia-consent-input-radio-samples";
pub const RADIO_BLOODSAMPLES: &str = "pia-consent-input-radio-bloodsamples";
pub const RADIO_LABRESULTS: &str = "pia-consent-input-radio-labresults";
pub const RADIO_GENERIC: &str = "pia-consent-input-radio-generic";

pub const TEXT_FIRSTNAME: &str = "pia-consent-input-text-firstname";
pub const TEXT_LASTNAME: &str = "pia-consent-input-text-lastname";
pub const TEXT_LOCATION: &str = "pia-consent-input-text-location";
pub const TEXT_BIRTHDATE: &str = "pia-consent-input-text-birthdate";
pub const TEXT_DATE: &str = "pia-consent-input-text-date";
pub const TEXT_GENERIC: &str = "pia-consent-input-text-generic";

pub const SWITCH_SYSTEM: &str = "pia-consent-switch-radio-system";
pub const SWITCH_GENERIC: &str = "pia-consent-switch-radio-generic";
/// One branch of a switch, selected by its `value` attribute.
pub const CASE: &str = "pia-case";

/// Every tag a consent template may use.
pub const TEMPLATE_TAGS: &[&str] = &[
    RADIO_APP,
    RADIO_SAMPLES,
    RADIO_BLOODSAMPLES,
    RADIO_LABRESULTS,
    RADIO_GENERIC,
    TEXT_FIRSTNAME,
    TEXT_LASTNAME,
    TEXT_LOCATION,
    TEXT_BIRTHDATE,
    TEXT_DATE,
    TEXT_GENERIC,
    SWITCH_SYSTEM,
    SWITCH_GENERIC,
    CASE,
];

/// Allow-list holding [`TEMPLATE_TAGS`].
#[must_use]
pub fn allow_list() -> TagAllowList {
    TagAllowList::new(TEMPLATE_TAGS)
}
