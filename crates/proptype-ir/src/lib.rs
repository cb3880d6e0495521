//! Canonical prop-type descriptors for proptypes-gen.
//!
//! This crate defines the data model shared by the transformer: a resolved,
//! source-syntax-independent description of the value shape a component
//! accepts. Descriptors are built once per compilation unit by the resolution
//! engine and consumed by the code synthesizer; they carry no behavior beyond
//! construction and merging.
//!
//! # Example
//!
//! ```
//! use proptype_ir::{Primitive, PropType, Shape, ShapeField};
//!
//! let mut shape = Shape::new();
//! shape.insert(
//!     "label".into(),
//!     ShapeField {
//!         ty: PropType::Primitive(Primitive::String),
//!         required: true,
//!     },
//! );
//! assert_eq!(shape.len(), 1);
//! ```

mod descriptor;

pub use descriptor::{LiteralValue, Primitive, PropType, Shape, ShapeField};
