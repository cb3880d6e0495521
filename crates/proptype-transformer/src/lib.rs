//! Static prop-shape types to runtime validators for TSX modules.
//!
//! This crate transforms one parsed TSX compilation unit at a time: it
//! resolves declared prop-shape type annotations to canonical descriptors,
//! classifies which function and class definitions are components, and
//! inserts runtime validator statements next to them. It handles:
//! - `<Name>.propTypes = ...` assignments for components
//! - Conditional `Object.defineProperty(exports, ...)` statements for
//!   exported type aliases
//! - `var` shims binding type-only imports to their cross-module validator
//!   exports, with an `any` fallback
//!
//! The transform never deletes or rewrites existing nodes; it only inserts
//! new sibling statements after existing ones.
//!
//! # Example
//!
//! ```
//! use proptype_transformer::{annotate_source, AnnotateOptions};
//!
//! let source = r#"
//! type Props = { label: string, count?: number };
//! const Badge = (props: Props) => <span>{props.label}</span>;
//! "#;
//!
//! let annotated = annotate_source(source, &AnnotateOptions::default()).unwrap();
//! assert_eq!(annotated.summary.attached, 1);
//! ```

mod classify;
mod context;
mod error;
mod resolve;
mod synth;
mod transform;

pub use context::{
    export_name_for_type, ModuleCtx, PROP_TYPES_MODULE, SUPPRESS_DIRECTIVE, VENDOR_SEGMENT,
};
pub use error::TransformError;
pub use transform::{
    annotate_module, annotate_source, AnnotateOptions, AnnotateSummary, AnnotatedSource,
};
