//! Pipeline error types.

use studydoc_tree::TreeError;

use crate::document::RepresentationKind;

/// Error that aborts a pipeline run.
///
/// Compilation never produces one of these; everything after it does, and
/// no partial output is returned once one occurred.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum PipelineError {
    /// A stage was applied to a representation it cannot consume.
    #[error("stage `{stage}` expects {expected}, but the document holds {found}")]
    StageMismatch {
        /// Stage name.
        stage: String,
        /// Representation(s) the stage accepts.
        expected: &'static str,
        /// Representation the document held.
        found: RepresentationKind,
    },

    /// The tree was found in an inconsistent state while restructuring it.
    #[error("tree structure error: {0}")]
    Structure(#[from] TreeError),

    /// HTML text could not be read into a tree.
    #[error("failed to parse HTML: {0}")]
    Parse(#[source] TreeError),

    /// A custom tag has no handler in this pipeline.
    #[error("custom tag <{tag}> is not handled by this pipeline")]
    UnresolvedTag {
        /// Tag name.
        tag: String,
    },

    /// A converter could not rewrite one of its elements.
    #[error("converter for <{tag}> failed: {message}")]
    Converter {
        /// Tag the converter handles.
        tag: String,
        /// Failure description.
        message: String,
    },
}

impl PipelineError {
    pub(crate) fn mismatch(
        stage: &str,
        expected: &'static str,
        found: RepresentationKind,
    ) -> Self {
        Self::StageMismatch {
            stage: stage.to_owned(),
            expected,
            found,
        }
    }
}
