//! Transform error types.

use thiserror::Error;

/// A fatal error that aborts processing of the current compilation unit.
///
/// Soft misses (absent parameter annotations, unresolved references in
/// optional contexts, non-structural descriptors at annotation time) are
/// logged and skipped instead; they never surface here.
#[derive(Debug, Clone, Error)]
pub enum TransformError {
    /// A type alias declaration without a usable name.
    #[error("did not find a name for type alias")]
    MissingAliasName,

    /// An annotation that is neither a reference nor a structural type
    /// expression. Inputs that parse should never reach this.
    #[error("expected prop types, but found none; this is a bug in proptypes-gen")]
    ExpectedPropTypes,

    /// A class `props` field whose annotation resolved to nothing.
    #[error("did not find type annotation for `{name}`")]
    MissingPropTypes {
        /// The component's binding name.
        name: String,
    },

    /// A literal type outside string/number/boolean.
    #[error("unsupported literal of kind {found}; this is a bug in proptypes-gen")]
    UnsupportedLiteral {
        /// A description of the literal kind encountered.
        found: String,
    },

    /// The source could not be parsed as a TSX module.
    #[error("failed to parse module: {message}")]
    Parse {
        /// The parser's error message.
        message: String,
    },
}
