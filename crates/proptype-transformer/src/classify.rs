//! Component classification.
//!
//! A definition is a component when it produces UI elements: its body
//! contains element syntax or a factory call, its declared return type is the
//! element type, or (for classes) it extends a framework base class.
//! Classification never looks at how a definition is used elsewhere.

use swc_ecma_ast::{
    ArrowExpr, CallExpr, Callee, Class, Expr, Function, JSXElement, MemberProp, Stmt, TsEntityName,
    TsType, TsTypeAnn,
};
use swc_ecma_visit::{Visit, VisitWith};

const NAMESPACE: &str = "React";
const BASE_COMPONENTS: [&str; 2] = ["Component", "PureComponent"];
const ELEMENT_TYPE: &str = "ReactElement";
const CREATE_ELEMENT: &str = "createElement";

pub(crate) fn fn_is_component(function: &Function) -> bool {
    returns_ui_element(function.return_type.as_deref()) || contains_element_output(function)
}

pub(crate) fn arrow_is_component(arrow: &ArrowExpr) -> bool {
    returns_ui_element(arrow.return_type.as_deref()) || contains_element_output(arrow)
}

/// A class is a component when it extends the framework base class, bare or
/// namespace-qualified.
pub(crate) fn class_is_component(class: &Class) -> bool {
    let Some(super_class) = class.super_class.as_deref() else {
        return false;
    };
    match super_class {
        Expr::Ident(ident) => BASE_COMPONENTS.contains(&ident.sym.as_str()),
        Expr::Member(member) => {
            let Expr::Ident(obj) = &*member.obj else {
                return false;
            };
            let MemberProp::Ident(prop) = &member.prop else {
                return false;
            };
            obj.sym.as_str() == NAMESPACE && BASE_COMPONENTS.contains(&prop.sym.as_str())
        }
        _ => false,
    }
}

fn returns_ui_element(return_type: Option<&TsTypeAnn>) -> bool {
    let Some(ann) = return_type else {
        return false;
    };
    let TsType::TsTypeRef(type_ref) = &*ann.type_ann else {
        return false;
    };
    match &type_ref.type_name {
        TsEntityName::Ident(ident) => ident.sym.as_str() == ELEMENT_TYPE,
        TsEntityName::TsQualifiedName(qualified) => {
            let TsEntityName::Ident(left) = &qualified.left else {
                return false;
            };
            left.sym.as_str() == NAMESPACE && qualified.right.sym.as_str() == ELEMENT_TYPE
        }
    }
}

fn contains_element_output<N>(node: &N) -> bool
where
    N: VisitWith<ElementFinder>,
{
    let mut finder = ElementFinder { found: false };
    node.visit_with(&mut finder);
    finder.found
}

/// Looks for element syntax or a `React.createElement` call anywhere in a
/// definition body, including nested closures.
struct ElementFinder {
    found: bool,
}

impl Visit for ElementFinder {
    fn visit_jsx_element(&mut self, _element: &JSXElement) {
        self.found = true;
    }

    fn visit_call_expr(&mut self, call: &CallExpr) {
        if self.found {
            return;
        }
        if let Callee::Expr(callee) = &call.callee {
            if let Expr::Member(member) = &**callee {
                if let (Expr::Ident(obj), MemberProp::Ident(prop)) = (&*member.obj, &member.prop) {
                    if obj.sym.as_str() == NAMESPACE && prop.sym.as_str() == CREATE_ELEMENT {
                        self.found = true;
                        return;
                    }
                }
            }
        }
        call.visit_children_with(self);
    }

    fn visit_stmt(&mut self, stmt: &Stmt) {
        if self.found {
            return;
        }
        stmt.visit_children_with(self);
    }

    fn visit_expr(&mut self, expr: &Expr) {
        if self.found {
            return;
        }
        expr.visit_children_with(self);
    }
}
