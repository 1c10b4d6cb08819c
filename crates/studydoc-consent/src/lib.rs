//! Consent widgets for study templates.
//!
//! Consent texts embed widgets such as
//! `<pia-consent-input-radio-app></pia-consent-input-radio-app>` in their
//! markup. Interactive clients receive them as segments; for the printed
//! document, [`print_converters`] replaces each widget with the answer from
//! a [`ConsentRecord`].
//!
//! ```
//! use studydoc_consent::{ConsentLabels, ConsentRecord, print_pipeline};
//!
//! let record = ConsentRecord {
//!     firstname: Some("Erika".to_owned()),
//!     ..ConsentRecord::default()
//! };
//! let markup = "Name: <pia-consent-input-text-firstname></pia-consent-input-text-firstname>";
//!
//! let html = print_pipeline(&record, &ConsentLabels::default())
//!     .render_html(markup, &record.variables())?;
//! assert!(html.contains("<span class=\"text\">Erika</span>"));
//! # Ok::<(), studydoc_pipeline::PipelineError>(())
//! ```

mod labels;
mod print;
mod record;
pub mod tags;

pub use labels::ConsentLabels;
pub use print::{
    DecisionSource, RadioConverter, SwitchConverter, TextConverter, TextSource, print_converters,
    print_pipeline, print_pipeline_with,
};
pub use record::{
    ConsentRecord, GENERIC_TEXT_PREFIX, SystemDecision, SystemText, generic_key,
    generic_text_variable,
};
pub use tags::{TEMPLATE_TAGS, allow_list};
