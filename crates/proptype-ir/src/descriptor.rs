//! The prop-type descriptor and its building blocks.

use indexmap::IndexMap;
use smol_str::SmolStr;

/// A primitive validator kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    String,
    Number,
    Bool,
    Func,
    Object,
    Array,
    Node,
    Element,
    Symbol,
}

impl Primitive {
    /// The validator factory name exported by the runtime validator library.
    pub fn validator_name(self) -> &'static str {
        match self {
            Primitive::String => "string",
            Primitive::Number => "number",
            Primitive::Bool => "bool",
            Primitive::Func => "func",
            Primitive::Object => "object",
            Primitive::Array => "array",
            Primitive::Node => "node",
            Primitive::Element => "element",
            Primitive::Symbol => "symbol",
        }
    }
}

/// A literal constant accepted by a `oneOf` validator.
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    Str(SmolStr),
    Num(f64),
    Bool(bool),
}

/// A single field of a [`Shape`].
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeField {
    /// The field's resolved descriptor.
    pub ty: PropType,
    /// Whether the field must be present (`false` for optional properties).
    pub required: bool,
}

/// An object shape: field name to descriptor, names unique.
///
/// Field order is semantically irrelevant but preserved for deterministic
/// output.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Shape {
    fields: IndexMap<SmolStr, ShapeField>,
}

impl Shape {
    /// Creates an empty shape.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a field, replacing any existing field of the same name.
    pub fn insert(&mut self, name: SmolStr, field: ShapeField) {
        self.fields.insert(name, field);
    }

    /// Looks up a field by name.
    pub fn get(&self, name: &str) -> Option<&ShapeField> {
        self.fields.get(name)
    }

    /// Iterates over the fields in insertion order.
    pub fn fields(&self) -> impl Iterator<Item = (&SmolStr, &ShapeField)> {
        self.fields.iter()
    }

    /// The number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if the shape has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Merges shapes left-to-right into a new shape.
    ///
    /// Later fields override earlier ones of the same name. The inputs are
    /// never mutated in place; the result is always a rebuilt field set.
    pub fn merged<I>(shapes: I) -> Shape
    where
        I: IntoIterator<Item = Shape>,
    {
        let mut fields = IndexMap::new();
        for shape in shapes {
            for (name, field) in shape.fields {
                fields.insert(name, field);
            }
        }
        Shape { fields }
    }
}

/// Canonical, composable description of an accepted prop value shape.
///
/// Descriptor trees are finite and acyclic: recursive type aliases resolve
/// to [`PropType::Unresolved`] rather than looping.
#[derive(Debug, Clone, PartialEq)]
pub enum PropType {
    /// Unknown or unresolvable type; validates anything.
    Any,
    /// A primitive validator.
    Primitive(Primitive),
    /// Value must be an instance of the named constructor.
    InstanceOf(SmolStr),
    /// Value must literal-equal one of an ordered set of constants.
    OneOf(Vec<LiteralValue>),
    /// Value must satisfy at least one of an ordered list of descriptors.
    OneOfType(Vec<PropType>),
    /// Array with a uniform element type.
    ArrayOf(Box<PropType>),
    /// Mapping with arbitrary keys and a uniform value type.
    ObjectOf(Box<PropType>),
    /// An object shape with named fields.
    Shape(Shape),
    /// Wraps any descriptor, making it non-required.
    Nullable(Box<PropType>),
    /// Deferred cross-module lookup: the synthesized code dereferences the
    /// generated export identifier at runtime.
    ImportedRef(SmolStr),
    /// A named reference found in neither symbol table; validates anything.
    Unresolved(SmolStr),
}

impl PropType {
    /// Returns the shape if this descriptor has a structural field list.
    pub fn as_shape(&self) -> Option<&Shape> {
        match self {
            PropType::Shape(shape) => Some(shape),
            _ => None,
        }
    }

    /// Wraps this descriptor, making it non-required.
    pub fn nullable(self) -> PropType {
        PropType::Nullable(Box::new(self))
    }
}
