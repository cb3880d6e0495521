//! Statement synthesis: descriptors to runtime validator code.
//!
//! Every emitted expression references the validator library through a fresh
//! `require("prop-types")` call so generated statements never depend on
//! module-level bindings the unit may not have.

use proptype_ir::{LiteralValue, PropType, Shape};
use swc_common::{SyntaxContext, DUMMY_SP};
use swc_ecma_ast::{
    ArrayLit, AssignExpr, AssignOp, AssignTarget, BinExpr, BinaryOp, BindingIdent, Bool, CallExpr,
    Callee, Decl, Expr, ExprOrSpread, ExprStmt, Ident, IdentName, IfStmt, KeyValueProp, Lit,
    MemberExpr, MemberProp, Number, ObjectLit, Pat, Prop, PropName, PropOrSpread,
    SimpleAssignTarget, Stmt, Str, UnaryExpr, UnaryOp, VarDecl, VarDeclKind, VarDeclarator,
};
use tracing::debug;

use crate::context::PROP_TYPES_MODULE;

fn ident(name: &str) -> Ident {
    Ident::new(name.into(), DUMMY_SP, SyntaxContext::empty())
}

fn ident_expr(name: &str) -> Expr {
    Expr::Ident(ident(name))
}

fn str_lit(value: &str) -> Expr {
    Expr::Lit(Lit::Str(Str {
        span: DUMMY_SP,
        value: value.into(),
        raw: None,
    }))
}

fn member(obj: Expr, name: &str) -> Expr {
    Expr::Member(MemberExpr {
        span: DUMMY_SP,
        obj: Box::new(obj),
        prop: MemberProp::Ident(IdentName::new(name.into(), DUMMY_SP)),
    })
}

fn call(callee: Expr, args: Vec<Expr>) -> Expr {
    Expr::Call(CallExpr {
        span: DUMMY_SP,
        ctxt: SyntaxContext::empty(),
        callee: Callee::Expr(Box::new(callee)),
        args: args
            .into_iter()
            .map(|expr| ExprOrSpread {
                spread: None,
                expr: Box::new(expr),
            })
            .collect(),
        type_args: None,
    })
}

fn require_call(module: &str) -> Expr {
    call(ident_expr("require"), vec![str_lit(module)])
}

/// A member access on a fresh `require("prop-types")` expression.
fn validator(name: &str) -> Expr {
    member(require_call(PROP_TYPES_MODULE), name)
}

fn array_lit(elems: Vec<Expr>) -> Expr {
    Expr::Array(ArrayLit {
        span: DUMMY_SP,
        elems: elems
            .into_iter()
            .map(|expr| {
                Some(ExprOrSpread {
                    spread: None,
                    expr: Box::new(expr),
                })
            })
            .collect(),
    })
}

fn literal_expr(value: &LiteralValue) -> Expr {
    match value {
        LiteralValue::Str(s) => str_lit(s.as_str()),
        LiteralValue::Num(n) => Expr::Lit(Lit::Num(Number {
            span: DUMMY_SP,
            value: *n,
            raw: None,
        })),
        LiteralValue::Bool(b) => Expr::Lit(Lit::Bool(Bool {
            span: DUMMY_SP,
            value: *b,
        })),
    }
}

/// Builds the validator expression for a descriptor.
pub(crate) fn synthesize(descriptor: &PropType) -> Expr {
    match descriptor {
        PropType::Any | PropType::Unresolved(_) => validator("any"),
        PropType::Primitive(primitive) => validator(primitive.validator_name()),
        PropType::InstanceOf(name) => {
            call(validator("instanceOf"), vec![ident_expr(name.as_str())])
        }
        PropType::OneOf(values) => {
            let elems = values.iter().map(literal_expr).collect();
            call(validator("oneOf"), vec![array_lit(elems)])
        }
        PropType::OneOfType(members) => {
            let elems = members.iter().map(synthesize).collect();
            call(validator("oneOfType"), vec![array_lit(elems)])
        }
        PropType::ArrayOf(element) => call(validator("arrayOf"), vec![synthesize(element)]),
        PropType::ObjectOf(value) => call(validator("objectOf"), vec![synthesize(value)]),
        PropType::Shape(shape) => call(validator("shape"), vec![shape_object(shape)]),
        PropType::Nullable(inner) => synthesize(inner),
        PropType::ImportedRef(export_name) => ident_expr(export_name.as_str()),
    }
}

/// The object literal mapping field names to validators, with `.isRequired`
/// on required non-nullable fields.
pub(crate) fn shape_object(shape: &Shape) -> Expr {
    let props = shape
        .fields()
        .map(|(name, field)| {
            let required = field.required && !matches!(field.ty, PropType::Nullable(_));
            let mut value = synthesize(&field.ty);
            if required {
                value = member(value, "isRequired");
            }
            let key = if is_valid_identifier(name) {
                PropName::Ident(IdentName::new(name.as_str().into(), DUMMY_SP))
            } else {
                PropName::Str(Str {
                    span: DUMMY_SP,
                    value: name.as_str().into(),
                    raw: None,
                })
            };
            PropOrSpread::Prop(Box::new(Prop::KeyValue(KeyValueProp {
                key,
                value: Box::new(value),
            })))
        })
        .collect();
    Expr::Object(ObjectLit {
        span: DUMMY_SP,
        props,
    })
}

fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if !(first.is_ascii_alphabetic() || first == '_' || first == '$') {
        return false;
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

/// The `<name>.propTypes = <validators>` assignment for a component, or
/// `None` when the descriptor is not a prop shape.
pub(crate) fn annotate(name: &str, descriptor: &PropType) -> Option<Stmt> {
    let PropType::Shape(shape) = descriptor else {
        debug!("skipping `{name}`: resolved type is not a prop shape");
        return None;
    };
    let target = MemberExpr {
        span: DUMMY_SP,
        obj: Box::new(ident_expr(name)),
        prop: MemberProp::Ident(IdentName::new("propTypes".into(), DUMMY_SP)),
    };
    Some(Stmt::Expr(ExprStmt {
        span: DUMMY_SP,
        expr: Box::new(Expr::Assign(AssignExpr {
            span: DUMMY_SP,
            op: AssignOp::Assign,
            left: AssignTarget::Simple(SimpleAssignTarget::Member(target)),
            right: Box::new(call(validator("shape"), vec![shape_object(shape)])),
        })),
    }))
}

/// A guarded CommonJS export of a validator value:
///
/// ```js
/// if (typeof exports !== "undefined")
///     Object.defineProperty(exports, "<name>", { value: ... });
/// ```
pub(crate) fn conditional_export_stmt(export_name: &str, value: Expr) -> Stmt {
    let test = Expr::Bin(BinExpr {
        span: DUMMY_SP,
        op: BinaryOp::NotEqEq,
        left: Box::new(Expr::Unary(UnaryExpr {
            span: DUMMY_SP,
            op: UnaryOp::TypeOf,
            arg: Box::new(ident_expr("exports")),
        })),
        right: Box::new(str_lit("undefined")),
    });
    let value_descriptor = Expr::Object(ObjectLit {
        span: DUMMY_SP,
        props: vec![PropOrSpread::Prop(Box::new(Prop::KeyValue(KeyValueProp {
            key: PropName::Ident(IdentName::new("value".into(), DUMMY_SP)),
            value: Box::new(value),
        })))],
    });
    let define = call(
        member(ident_expr("Object"), "defineProperty"),
        vec![ident_expr("exports"), str_lit(export_name), value_descriptor],
    );
    Stmt::If(IfStmt {
        span: DUMMY_SP,
        test: Box::new(test),
        cons: Box::new(Stmt::Expr(ExprStmt {
            span: DUMMY_SP,
            expr: Box::new(define),
        })),
        alt: None,
    })
}

/// A `var` binding for a type-only import, falling back to the permissive
/// validator when the source module was compiled without this transform:
///
/// ```js
/// var <name> = require("<src>").<name> || require("prop-types").any;
/// ```
pub(crate) fn import_shim_stmt(export_name: &str, src: &str) -> Stmt {
    let init = Expr::Bin(BinExpr {
        span: DUMMY_SP,
        op: BinaryOp::LogicalOr,
        left: Box::new(member(require_call(src), export_name)),
        right: Box::new(validator("any")),
    });
    Stmt::Decl(Decl::Var(Box::new(VarDecl {
        span: DUMMY_SP,
        ctxt: SyntaxContext::empty(),
        kind: VarDeclKind::Var,
        declare: false,
        decls: vec![VarDeclarator {
            span: DUMMY_SP,
            name: Pat::Ident(BindingIdent {
                id: ident(export_name),
                type_ann: None,
            }),
            init: Some(Box::new(init)),
            definite: false,
        }],
    })))
}
