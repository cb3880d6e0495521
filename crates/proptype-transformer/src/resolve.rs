//! Type resolution: TSX type expressions to canonical descriptors.
//!
//! Resolution is a pure function of the type expression and the symbol
//! tables: it never mutates the tree and resolving the same expression twice
//! yields descriptor-equal results.

use proptype_ir::{LiteralValue, Primitive, PropType, Shape, ShapeField};
use smol_str::SmolStr;
use swc_ecma_ast::{
    Expr, Lit, TsEntityName, TsIndexSignature, TsIntersectionType, TsKeywordTypeKind, TsLit,
    TsPropertySignature, TsType, TsTypeElement, TsTypeLit, TsTypeRef,
    TsUnionOrIntersectionType, TsUnionType,
};
use tracing::debug;

use crate::error::TransformError;

/// Resolves type reference names against the per-unit symbol tables.
///
/// A local alias yields a clone of its resolved descriptor, an imported
/// alias defers to the generated cross-module export identifier, and an
/// unknown name yields `None`.
pub(crate) trait LookupTypes {
    fn lookup(&mut self, name: &str) -> Result<Option<PropType>, TransformError>;
}

/// Built-in constructor names that resolve to `instanceOf` validators.
const INSTANCE_OF_TYPES: [&str; 6] = ["Date", "RegExp", "Error", "Map", "Set", "Promise"];

/// Converts a type expression into a descriptor, recursively.
pub(crate) fn resolve(
    ty: &TsType,
    scope: &mut dyn LookupTypes,
) -> Result<PropType, TransformError> {
    match ty {
        TsType::TsKeywordType(keyword) => Ok(resolve_keyword(keyword.kind)),
        TsType::TsTypeLit(type_lit) => resolve_type_lit(type_lit, scope),
        TsType::TsArrayType(array) => {
            let element = resolve(&array.elem_type, scope)?;
            Ok(PropType::ArrayOf(Box::new(element)))
        }
        TsType::TsFnOrConstructorType(_) => Ok(PropType::Primitive(Primitive::Func)),
        TsType::TsLitType(lit) => Ok(PropType::OneOf(vec![literal_value(&lit.lit)?])),
        TsType::TsUnionOrIntersectionType(TsUnionOrIntersectionType::TsUnionType(union)) => {
            resolve_union(union, scope)
        }
        TsType::TsUnionOrIntersectionType(TsUnionOrIntersectionType::TsIntersectionType(
            intersection,
        )) => resolve_intersection(intersection, scope),
        TsType::TsParenthesizedType(paren) => resolve(&paren.type_ann, scope),
        TsType::TsTypeRef(type_ref) => resolve_type_ref(type_ref, scope),
        _ => Ok(PropType::Any),
    }
}

/// Resolves an annotation at a component's props position.
///
/// A bare named reference consults the symbol tables only; a miss is logged
/// and yields `None` so the caller can skip annotation. Structural
/// expressions resolve recursively. Expressions that are neither are a
/// defect-class hard failure.
pub(crate) fn props_for_annotation(
    ty: &TsType,
    scope: &mut dyn LookupTypes,
) -> Result<Option<PropType>, TransformError> {
    match ty {
        TsType::TsTypeRef(type_ref) => {
            let TsEntityName::Ident(ident) = &type_ref.type_name else {
                debug!("did not find type annotation for qualified reference");
                return Ok(None);
            };
            let name = ident.sym.as_str();
            match scope.lookup(name)? {
                Some(descriptor) => Ok(Some(descriptor)),
                None => {
                    debug!("did not find type annotation for reference `{name}`");
                    Ok(None)
                }
            }
        }
        TsType::TsKeywordType(_)
        | TsType::TsTypeLit(_)
        | TsType::TsArrayType(_)
        | TsType::TsFnOrConstructorType(_)
        | TsType::TsLitType(_)
        | TsType::TsUnionOrIntersectionType(_)
        | TsType::TsParenthesizedType(_)
        | TsType::TsTupleType(_)
        | TsType::TsTypeOperator(_)
        | TsType::TsMappedType(_)
        | TsType::TsIndexedAccessType(_)
        | TsType::TsConditionalType(_)
        | TsType::TsOptionalType(_)
        | TsType::TsTypeQuery(_)
        | TsType::TsImportType(_) => resolve(ty, scope).map(Some),
        _ => Err(TransformError::ExpectedPropTypes),
    }
}

fn resolve_keyword(kind: TsKeywordTypeKind) -> PropType {
    match kind {
        TsKeywordTypeKind::TsStringKeyword => PropType::Primitive(Primitive::String),
        TsKeywordTypeKind::TsNumberKeyword => PropType::Primitive(Primitive::Number),
        TsKeywordTypeKind::TsBooleanKeyword => PropType::Primitive(Primitive::Bool),
        TsKeywordTypeKind::TsSymbolKeyword => PropType::Primitive(Primitive::Symbol),
        TsKeywordTypeKind::TsObjectKeyword => PropType::Primitive(Primitive::Object),
        _ => PropType::Any,
    }
}

fn resolve_type_lit(
    type_lit: &TsTypeLit,
    scope: &mut dyn LookupTypes,
) -> Result<PropType, TransformError> {
    // A lone string index signature is a uniform-value mapping.
    if let [TsTypeElement::TsIndexSignature(index)] = type_lit.members.as_slice() {
        return Ok(PropType::ObjectOf(Box::new(index_value_type(index, scope)?)));
    }

    let mut shape = Shape::new();
    for member in &type_lit.members {
        match member {
            TsTypeElement::TsPropertySignature(property) => {
                let Some(name) = property_key(property) else {
                    debug!("skipping object property with unsupported key");
                    continue;
                };
                let ty = match &property.type_ann {
                    Some(ann) => resolve(&ann.type_ann, scope)?,
                    None => PropType::Any,
                };
                shape.insert(
                    name,
                    ShapeField {
                        ty,
                        required: !property.optional,
                    },
                );
            }
            TsTypeElement::TsMethodSignature(method) => {
                let Some(name) = key_name(&method.key) else {
                    continue;
                };
                shape.insert(
                    name,
                    ShapeField {
                        ty: PropType::Primitive(Primitive::Func),
                        required: !method.optional,
                    },
                );
            }
            _ => {}
        }
    }
    Ok(PropType::Shape(shape))
}

fn index_value_type(
    index: &TsIndexSignature,
    scope: &mut dyn LookupTypes,
) -> Result<PropType, TransformError> {
    let Some(ann) = &index.type_ann else {
        return Ok(PropType::Any);
    };
    resolve(&ann.type_ann, scope)
}

fn property_key(property: &TsPropertySignature) -> Option<SmolStr> {
    if property.computed {
        return None;
    }
    key_name(&property.key)
}

fn key_name(key: &Expr) -> Option<SmolStr> {
    match key {
        Expr::Ident(ident) => Some(SmolStr::new(ident.sym.as_str())),
        Expr::Lit(Lit::Str(s)) => s.value.as_str().map(SmolStr::new),
        _ => None,
    }
}

fn resolve_union(
    union: &TsUnionType,
    scope: &mut dyn LookupTypes,
) -> Result<PropType, TransformError> {
    let mut nullable = false;
    let mut members = Vec::new();
    for member in &union.types {
        if is_null_or_undefined(member) {
            nullable = true;
            continue;
        }
        members.push(&**member);
    }

    let descriptor = if members.is_empty() {
        PropType::Any
    } else if members.iter().all(|m| matches!(m, TsType::TsLitType(_))) {
        let mut values = Vec::with_capacity(members.len());
        for member in &members {
            if let TsType::TsLitType(lit) = member {
                values.push(literal_value(&lit.lit)?);
            }
        }
        PropType::OneOf(values)
    } else if members.len() == 1 {
        resolve(members[0], scope)?
    } else {
        let mut descriptors = Vec::with_capacity(members.len());
        for member in members {
            descriptors.push(resolve(member, scope)?);
        }
        PropType::OneOfType(descriptors)
    };

    Ok(if nullable {
        descriptor.nullable()
    } else {
        descriptor
    })
}

fn is_null_or_undefined(ty: &TsType) -> bool {
    matches!(
        ty,
        TsType::TsKeywordType(keyword) if matches!(
            keyword.kind,
            TsKeywordTypeKind::TsNullKeyword
                | TsKeywordTypeKind::TsUndefinedKeyword
                | TsKeywordTypeKind::TsVoidKeyword
        )
    )
}

/// Merges the object-typed members of an intersection left-to-right, later
/// fields overriding earlier ones. Non-object members are silently dropped;
/// this matches legacy behavior and must be preserved.
fn resolve_intersection(
    intersection: &TsIntersectionType,
    scope: &mut dyn LookupTypes,
) -> Result<PropType, TransformError> {
    let mut shapes = Vec::new();
    for member in &intersection.types {
        if let PropType::Shape(shape) = resolve(member, scope)? {
            shapes.push(shape);
        }
    }
    if shapes.is_empty() {
        return Ok(PropType::Any);
    }
    Ok(PropType::Shape(Shape::merged(shapes)))
}

fn resolve_type_ref(
    type_ref: &TsTypeRef,
    scope: &mut dyn LookupTypes,
) -> Result<PropType, TransformError> {
    match &type_ref.type_name {
        TsEntityName::Ident(ident) => {
            let name = ident.sym.as_str();
            match name {
                "Array" | "$ReadOnlyArray" => {
                    let Some(param) = first_type_param(type_ref) else {
                        return Ok(PropType::Primitive(Primitive::Array));
                    };
                    let element = resolve(param, scope)?;
                    Ok(PropType::ArrayOf(Box::new(element)))
                }
                "ReactNode" => Ok(PropType::Primitive(Primitive::Node)),
                "ReactElement" => Ok(PropType::Primitive(Primitive::Element)),
                "Object" => Ok(PropType::Primitive(Primitive::Object)),
                "Function" => Ok(PropType::Primitive(Primitive::Func)),
                _ if INSTANCE_OF_TYPES.contains(&name) => {
                    Ok(PropType::InstanceOf(SmolStr::new(name)))
                }
                _ => match scope.lookup(name)? {
                    Some(descriptor) => Ok(descriptor),
                    None => {
                        debug!("did not find type annotation for reference `{name}`");
                        Ok(PropType::Unresolved(SmolStr::new(name)))
                    }
                },
            }
        }
        TsEntityName::TsQualifiedName(qualified) => {
            let path = qualified_path(&type_ref.type_name);
            match path.as_str() {
                "React.ReactNode" | "React.Node" => Ok(PropType::Primitive(Primitive::Node)),
                "React.ReactElement" | "React.Element" | "JSX.Element" => {
                    Ok(PropType::Primitive(Primitive::Element))
                }
                _ => {
                    let name = qualified.right.sym.as_str();
                    debug!("did not find type annotation for qualified reference `{path}`");
                    Ok(PropType::Unresolved(SmolStr::new(name)))
                }
            }
        }
    }
}

fn first_type_param(type_ref: &TsTypeRef) -> Option<&TsType> {
    type_ref
        .type_params
        .as_ref()
        .and_then(|params| params.params.first())
        .map(|param| &**param)
}

fn qualified_path(entity: &TsEntityName) -> String {
    match entity {
        TsEntityName::Ident(ident) => ident.sym.to_string(),
        TsEntityName::TsQualifiedName(qualified) => {
            format!("{}.{}", qualified_path(&qualified.left), qualified.right.sym)
        }
    }
}

fn literal_value(lit: &TsLit) -> Result<LiteralValue, TransformError> {
    match lit {
        TsLit::Str(s) => match s.value.as_str() {
            Some(value) => Ok(LiteralValue::Str(SmolStr::new(value))),
            None => Err(TransformError::UnsupportedLiteral {
                found: "lossy string".to_string(),
            }),
        },
        TsLit::Number(n) => Ok(LiteralValue::Num(n.value)),
        TsLit::Bool(b) => Ok(LiteralValue::Bool(b.value)),
        TsLit::BigInt(_) => Err(TransformError::UnsupportedLiteral {
            found: "bigint".to_string(),
        }),
        TsLit::Tpl(_) => Err(TransformError::UnsupportedLiteral {
            found: "template literal".to_string(),
        }),
    }
}
