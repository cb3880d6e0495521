//! End-to-end annotation tests on TSX source.

use pretty_assertions::assert_eq;
use proptype_transformer::{
    annotate_source, export_name_for_type, AnnotateOptions, AnnotateSummary, AnnotatedSource,
};
use swc_ecma_ast::{
    AssignTarget, BinaryOp, Callee, Decl, Expr, ExprOrSpread, Lit, MemberProp, Module, ModuleItem,
    Pat, Prop, PropName, PropOrSpread, SimpleAssignTarget, Stmt,
};

fn annotate(src: &str) -> AnnotatedSource {
    annotate_source(src, &AnnotateOptions::default()).expect("annotate")
}

/// Matches `require("prop-types").<name>(...)`, returning the validator name
/// and its arguments.
fn validator_call(expr: &Expr) -> Option<(&str, &[ExprOrSpread])> {
    let Expr::Call(call) = expr else {
        return None;
    };
    let Callee::Expr(callee) = &call.callee else {
        return None;
    };
    let name = validator_member(callee)?;
    Some((name, &call.args))
}

/// Matches `require("prop-types").<name>` without a call.
fn validator_member(expr: &Expr) -> Option<&str> {
    let Expr::Member(member) = expr else {
        return None;
    };
    let Expr::Call(require) = &*member.obj else {
        return None;
    };
    let Callee::Expr(require_callee) = &require.callee else {
        return None;
    };
    let Expr::Ident(require_ident) = &**require_callee else {
        return None;
    };
    if require_ident.sym.as_str() != "require" {
        return None;
    }
    let MemberProp::Ident(prop) = &member.prop else {
        return None;
    };
    Some(prop.sym.as_str())
}

/// Finds the right-hand side of `<name>.propTypes = ...` at module top level.
fn find_prop_types<'a>(module: &'a Module, name: &str) -> Option<&'a Expr> {
    for item in &module.body {
        let ModuleItem::Stmt(Stmt::Expr(stmt)) = item else {
            continue;
        };
        let Expr::Assign(assign) = &*stmt.expr else {
            continue;
        };
        let AssignTarget::Simple(SimpleAssignTarget::Member(member)) = &assign.left else {
            continue;
        };
        let Expr::Ident(obj) = &*member.obj else {
            continue;
        };
        let MemberProp::Ident(prop) = &member.prop else {
            continue;
        };
        if obj.sym.as_str() == name && prop.sym.as_str() == "propTypes" {
            return Some(&assign.right);
        }
    }
    None
}

/// Unpacks a `shape({...})` expression into `(field name, is required)`
/// pairs in declaration order.
fn shape_fields(expr: &Expr) -> Vec<(String, bool)> {
    let (name, args) = validator_call(expr).expect("validator call");
    assert_eq!(name, "shape");
    let Expr::Object(object) = &*args[0].expr else {
        panic!("expected object literal argument to shape()");
    };
    object
        .props
        .iter()
        .map(|prop| {
            let PropOrSpread::Prop(prop) = prop else {
                panic!("expected key-value prop");
            };
            let Prop::KeyValue(kv) = &**prop else {
                panic!("expected key-value prop");
            };
            let name = match &kv.key {
                PropName::Ident(ident) => ident.sym.to_string(),
                PropName::Str(s) => s.value.as_str().expect("string key").to_string(),
                other => panic!("unexpected key: {other:?}"),
            };
            let required = matches!(
                &*kv.value,
                Expr::Member(m) if matches!(
                    &m.prop,
                    MemberProp::Ident(p) if p.sym.as_str() == "isRequired"
                )
            );
            (name, required)
        })
        .collect()
}

/// The validator expression for one field of a `shape({...})`, with any
/// `.isRequired` wrapper removed.
fn field_value<'a>(expr: &'a Expr, field: &str) -> &'a Expr {
    let (_, args) = validator_call(expr).expect("validator call");
    let Expr::Object(object) = &*args[0].expr else {
        panic!("expected object literal argument to shape()");
    };
    for prop in &object.props {
        let PropOrSpread::Prop(prop) = prop else {
            continue;
        };
        let Prop::KeyValue(kv) = &**prop else {
            continue;
        };
        let PropName::Ident(ident) = &kv.key else {
            continue;
        };
        if ident.sym.as_str() != field {
            continue;
        }
        if let Expr::Member(member) = &*kv.value {
            if matches!(&member.prop, MemberProp::Ident(p) if p.sym.as_str() == "isRequired") {
                return &member.obj;
            }
        }
        return &kv.value;
    }
    panic!("field `{field}` not found in shape");
}

#[test]
fn test_alias_reference_on_arrow_component() {
    let annotated = annotate(
        r#"
type Props = { name: string, age?: number };
const Badge = (props: Props) => <span>{props.name}</span>;
"#,
    );
    assert_eq!(annotated.summary.attached, 1);
    let prop_types = find_prop_types(&annotated.module, "Badge").expect("Badge.propTypes");
    assert_eq!(
        shape_fields(prop_types),
        vec![("name".to_string(), true), ("age".to_string(), false)]
    );
}

#[test]
fn test_inline_annotation_on_function_decl() {
    let annotated = annotate(
        r#"
function Label(props: { text: string }) {
    return <em>{props.text}</em>;
}
"#,
    );
    assert_eq!(annotated.summary.attached, 1);
    let prop_types = find_prop_types(&annotated.module, "Label").expect("Label.propTypes");
    assert_eq!(shape_fields(prop_types), vec![("text".to_string(), true)]);
}

#[test]
fn test_destructured_props_param() {
    let annotated = annotate(
        r#"
const Tag = ({ label }: { label: string }) => <i>{label}</i>;
"#,
    );
    assert_eq!(annotated.summary.attached, 1);
    assert!(find_prop_types(&annotated.module, "Tag").is_some());
}

#[test]
fn test_intersection_later_member_overrides() {
    let annotated = annotate(
        r#"
type Base = { x: string, y: boolean };
type Override = { x: number };
type Props = Base & Override;
const Panel = (props: Props) => <div />;
"#,
    );
    let prop_types = find_prop_types(&annotated.module, "Panel").expect("Panel.propTypes");
    assert_eq!(
        shape_fields(prop_types),
        vec![("x".to_string(), true), ("y".to_string(), true)]
    );
    assert_eq!(validator_member(field_value(prop_types, "x")), Some("number"));
}

#[test]
fn test_component_without_annotation_is_skipped() {
    let annotated = annotate(
        r#"
const Plain = (props) => <div>{props.children}</div>;
"#,
    );
    assert_eq!(annotated.summary, AnnotateSummary::default());
    assert!(find_prop_types(&annotated.module, "Plain").is_none());
}

#[test]
fn test_suppression_directive() {
    let annotated = annotate(
        r#""no proptypes-gen";
type Props = { name: string };
const Badge = (props: Props) => <span />;
"#,
    );
    assert_eq!(annotated.summary, AnnotateSummary::default());
    assert!(find_prop_types(&annotated.module, "Badge").is_none());
}

#[test]
fn test_vendor_path_is_suppressed() {
    let src = r#"
type Props = { name: string };
const Badge = (props: Props) => <span />;
"#;
    let options = AnnotateOptions::with_filename("node_modules/widgets/badge.tsx");
    let annotated = annotate_source(src, &options).expect("annotate");
    assert_eq!(annotated.summary, AnnotateSummary::default());
}

#[test]
fn test_exported_intersection_alias() {
    let annotated = annotate(
        r#"
type Other = { x: string };
export type Props = Other & { y: number };
const Card = (props: Props) => <div />;
"#,
    );
    assert_eq!(annotated.summary.exported, 1);
    assert_eq!(annotated.summary.attached, 1);

    // The component sees the full merge through the symbol table.
    let prop_types = find_prop_types(&annotated.module, "Card").expect("Card.propTypes");
    assert_eq!(
        shape_fields(prop_types),
        vec![("x".to_string(), true), ("y".to_string(), true)]
    );

    // The cross-module export carries only the final intersection member.
    let exported = find_conditional_export(&annotated.module, "proptypesGen_proptype_Props")
        .expect("conditional export");
    assert_eq!(shape_fields(exported), vec![("y".to_string(), true)]);
}

/// Finds the exported value inside
/// `if (typeof exports !== "undefined") Object.defineProperty(exports, "<name>", { value })`.
fn find_conditional_export<'a>(module: &'a Module, export_name: &str) -> Option<&'a Expr> {
    for item in &module.body {
        let ModuleItem::Stmt(Stmt::If(if_stmt)) = item else {
            continue;
        };
        let Expr::Bin(test) = &*if_stmt.test else {
            continue;
        };
        if test.op != BinaryOp::NotEqEq {
            continue;
        }
        let Stmt::Expr(cons) = &*if_stmt.cons else {
            continue;
        };
        let Expr::Call(call) = &*cons.expr else {
            continue;
        };
        let name_arg = call.args.get(1)?;
        let Expr::Lit(Lit::Str(name)) = &*name_arg.expr else {
            continue;
        };
        if name.value.as_str() != Some(export_name) {
            continue;
        }
        let value_arg = call.args.get(2)?;
        let Expr::Object(descriptor) = &*value_arg.expr else {
            continue;
        };
        for prop in &descriptor.props {
            let PropOrSpread::Prop(prop) = prop else {
                continue;
            };
            let Prop::KeyValue(kv) = &**prop else {
                continue;
            };
            if matches!(&kv.key, PropName::Ident(i) if i.sym.as_str() == "value") {
                return Some(&kv.value);
            }
        }
    }
    None
}

#[test]
fn test_type_only_import_generates_shim() {
    let annotated = annotate(
        r#"
import type { Props } from "./types";
const Card = (props: Props) => <div />;
"#,
    );
    assert_eq!(annotated.summary.import_shims, 1);
    assert_eq!(annotated.summary.attached, 0);

    let shim_name = export_name_for_type("Props");
    let shim = find_var_init(&annotated.module, shim_name.as_str()).expect("shim var");
    let Expr::Bin(init) = shim else {
        panic!("expected fallback expression");
    };
    assert_eq!(init.op, BinaryOp::LogicalOr);
    assert_eq!(validator_member(&init.right), Some("any"));
}

fn find_var_init<'a>(module: &'a Module, name: &str) -> Option<&'a Expr> {
    for item in &module.body {
        let ModuleItem::Stmt(Stmt::Decl(Decl::Var(var))) = item else {
            continue;
        };
        for declarator in &var.decls {
            let Pat::Ident(binding) = &declarator.name else {
                continue;
            };
            if binding.id.sym.as_str() == name {
                return declarator.init.as_deref();
            }
        }
    }
    None
}

#[test]
fn test_class_props_field() {
    let annotated = annotate(
        r#"
class Avatar extends React.Component {
    props: { url: string, alt?: string };
    render() {
        return <img src={this.props.url} />;
    }
}
"#,
    );
    assert_eq!(annotated.summary.attached, 1);
    let prop_types = find_prop_types(&annotated.module, "Avatar").expect("Avatar.propTypes");
    assert_eq!(
        shape_fields(prop_types),
        vec![("url".to_string(), true), ("alt".to_string(), false)]
    );
}

#[test]
fn test_class_super_type_param() {
    let annotated = annotate(
        r#"
type Props = { id: number };
class Row extends React.Component<void, Props, void> {
    render() {
        return <tr />;
    }
}
"#,
    );
    assert_eq!(annotated.summary.attached, 1);
    let prop_types = find_prop_types(&annotated.module, "Row").expect("Row.propTypes");
    assert_eq!(shape_fields(prop_types), vec![("id".to_string(), true)]);
}

#[test]
fn test_export_default_function_component() {
    let annotated = annotate(
        r#"
export default function Hero(props: { title: string }) {
    return <h1>{props.title}</h1>;
}
"#,
    );
    assert_eq!(annotated.summary.attached, 1);
    let prop_types = find_prop_types(&annotated.module, "Hero").expect("Hero.propTypes");
    assert_eq!(shape_fields(prop_types), vec![("title".to_string(), true)]);
}

#[test]
fn test_export_default_class_component() {
    let annotated = annotate(
        r#"
type Props = { id: number };
export default class Panel extends React.Component<void, Props, void> {
    render() {
        return <div />;
    }
}
"#,
    );
    assert_eq!(annotated.summary.attached, 1);
    let prop_types = find_prop_types(&annotated.module, "Panel").expect("Panel.propTypes");
    assert_eq!(shape_fields(prop_types), vec![("id".to_string(), true)]);
}

#[test]
fn test_anonymous_default_export_is_skipped() {
    let annotated = annotate(
        r#"
export default function (props: { a: string }) {
    return <i />;
}
"#,
    );
    assert_eq!(annotated.summary, AnnotateSummary::default());
}

#[test]
fn test_nested_component_in_default_export_body() {
    let annotated = annotate(
        r#"
export default function make() {
    const Inner = (props: { a: string }) => <b />;
    return Inner;
}
"#,
    );
    assert_eq!(annotated.summary.attached, 1);
}

#[test]
fn test_decorated_class_component() {
    let annotated = annotate(
        r#"
@observer
class Store extends React.Component {
    props: { open: boolean };
    render() {
        return <div />;
    }
}
"#,
    );
    assert_eq!(annotated.summary.attached, 1);
    let prop_types = find_prop_types(&annotated.module, "Store").expect("Store.propTypes");
    assert_eq!(shape_fields(prop_types), vec![("open".to_string(), true)]);
}

#[test]
fn test_unresolvable_param_without_element_output() {
    // Not a component (no element output), so the unresolvable annotation is
    // never consulted: nothing inserted, no error.
    let annotated = annotate(
        r#"
const format = (value: Mystery) => value.toString();
"#,
    );
    assert_eq!(annotated.summary, AnnotateSummary::default());
    assert!(find_prop_types(&annotated.module, "format").is_none());
}

#[test]
fn test_non_component_is_untouched() {
    let annotated = annotate(
        r#"
type Config = { retries: number };
function readConfig(raw: Config) {
    return raw.retries;
}
"#,
    );
    assert_eq!(annotated.summary, AnnotateSummary::default());
}

#[test]
fn test_create_element_body_classifies() {
    let annotated = annotate(
        r#"
function Chip(props: { label: string }) {
    return React.createElement("span", null, props.label);
}
"#,
    );
    assert_eq!(annotated.summary.attached, 1);
}

#[test]
fn test_forward_reference_resolves() {
    let annotated = annotate(
        r#"
const Late = (props: Props) => <b />;
type Props = { ok: boolean };
"#,
    );
    assert_eq!(annotated.summary.attached, 1);
    let prop_types = find_prop_types(&annotated.module, "Late").expect("Late.propTypes");
    assert_eq!(shape_fields(prop_types), vec![("ok".to_string(), true)]);
}

#[test]
fn test_recursive_alias_degrades_to_any() {
    let annotated = annotate(
        r#"
type TreeNode = { value: string, next: TreeNode };
const Tree = (props: TreeNode) => <ul />;
"#,
    );
    assert_eq!(annotated.summary.attached, 1);
    let prop_types = find_prop_types(&annotated.module, "Tree").expect("Tree.propTypes");
    assert_eq!(validator_member(field_value(prop_types, "next")), Some("any"));
}

#[test]
fn test_insertion_is_adjacent_to_declaration() {
    let annotated = annotate(
        r#"
type Props = { a: string };
const First = (props: Props) => <i />;
const unrelated = 1;
"#,
    );
    // The assignment lands directly after First's declaration, before the
    // unrelated statement.
    let position = annotated
        .module
        .body
        .iter()
        .position(|item| matches!(
            item,
            ModuleItem::Stmt(Stmt::Expr(stmt)) if matches!(&*stmt.expr, Expr::Assign(_))
        ))
        .expect("assignment present");
    assert_eq!(position, 2);
}

#[test]
fn test_nested_component_in_function_body() {
    let annotated = annotate(
        r#"
function build() {
    const Inner = (props: { a: string }) => <b />;
    return Inner;
}
"#,
    );
    assert_eq!(annotated.summary.attached, 1);
    // The assignment lives inside build's body, not at module top level.
    assert!(find_prop_types(&annotated.module, "Inner").is_none());
}

#[test]
fn test_parse_error_surfaces() {
    let err = annotate_source("const = ;", &AnnotateOptions::default());
    assert!(err.is_err());
}
