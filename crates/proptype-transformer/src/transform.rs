//! Declaration processing: walks a unit and inserts validator statements.
//!
//! The walk never mutates existing nodes. Each insertion point is computed
//! from an immutable view of the declaration, then the generated statements
//! are spliced in as siblings immediately after it, and the walk resumes
//! past them so its own output is never reprocessed.

use swc_common::{sync::Lrc, FileName, SourceMap};
use swc_ecma_ast::{
    BlockStmtOrExpr, Class, ClassDecl, ClassMember, Decl, DefaultDecl, Expr, FnDecl, Function,
    Module, ModuleDecl, ModuleItem, Pat, PropName, Stmt, TsEntityName, TsType, TsTypeAliasDecl,
    TsTypeAnn, TsUnionOrIntersectionType, VarDecl,
};
use swc_ecma_parser::{lexer::Lexer, Parser, StringInput, Syntax, TsSyntax};
use tracing::debug;

use crate::classify::{arrow_is_component, class_is_component, fn_is_component};
use crate::context::{build_context, export_name_for_type, imported_type_name, ModuleCtx};
use crate::error::TransformError;
use crate::resolve::{props_for_annotation, resolve};
use crate::synth;

/// Options for one annotation run.
#[derive(Debug, Clone, Default)]
pub struct AnnotateOptions {
    /// Path of the compilation unit, used for vendor-path suppression.
    pub filename: Option<String>,
}

impl AnnotateOptions {
    pub fn with_filename(filename: impl Into<String>) -> Self {
        Self {
            filename: Some(filename.into()),
        }
    }
}

/// Counts of statements inserted by one annotation run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnnotateSummary {
    /// `propTypes` assignments attached to components.
    pub attached: usize,
    /// Conditional cross-module exports for exported type aliases.
    pub exported: usize,
    /// `var` shims generated for type-only imports.
    pub import_shims: usize,
}

/// A parsed module together with the run's summary.
#[derive(Debug, Clone)]
pub struct AnnotatedSource {
    pub module: Module,
    pub summary: AnnotateSummary,
}

/// Annotates a parsed module in place.
pub fn annotate_module(
    module: &mut Module,
    options: &AnnotateOptions,
) -> Result<AnnotateSummary, TransformError> {
    let mut ctx = build_context(module, options.filename.as_deref())?;
    let mut summary = AnnotateSummary::default();
    if ctx.suppressed {
        debug!("unit is suppressed, leaving it untouched");
        return Ok(summary);
    }
    process_module_items(&mut module.body, &mut ctx, &mut summary)?;
    Ok(summary)
}

/// Parser settings for TSX compilation units, shared by the entry point and
/// the test helpers.
pub(crate) fn tsx_syntax() -> Syntax {
    Syntax::Typescript(TsSyntax {
        tsx: true,
        decorators: true,
        dts: false,
        no_early_errors: true,
        disallow_ambiguous_jsx_like: false,
    })
}

/// Parses TSX source and annotates the resulting module.
pub fn annotate_source(
    source: &str,
    options: &AnnotateOptions,
) -> Result<AnnotatedSource, TransformError> {
    let cm: Lrc<SourceMap> = Default::default();
    let fm = cm.new_source_file(Lrc::new(FileName::Anon), source.to_string());
    let lexer = Lexer::new(tsx_syntax(), Default::default(), StringInput::from(&*fm), None);
    let mut parser = Parser::new_from(lexer);
    let mut module = parser
        .parse_module()
        .map_err(|e| TransformError::Parse {
            message: e.into_kind().msg().to_string(),
        })?;
    let summary = annotate_module(&mut module, options)?;
    Ok(AnnotatedSource { module, summary })
}

fn process_module_items(
    items: &mut Vec<ModuleItem>,
    ctx: &mut ModuleCtx,
    summary: &mut AnnotateSummary,
) -> Result<(), TransformError> {
    let mut i = 0;
    while i < items.len() {
        let generated = generated_for_item(&items[i], ctx, summary)?;
        descend_item(&mut items[i], ctx, summary)?;
        let n = generated.len();
        for (offset, stmt) in generated.into_iter().enumerate() {
            items.insert(i + 1 + offset, ModuleItem::Stmt(stmt));
        }
        i += 1 + n;
    }
    Ok(())
}

fn process_stmts(
    stmts: &mut Vec<Stmt>,
    ctx: &mut ModuleCtx,
    summary: &mut AnnotateSummary,
) -> Result<(), TransformError> {
    let mut i = 0;
    while i < stmts.len() {
        let generated = match &stmts[i] {
            Stmt::Decl(decl) => generated_for_decl(decl, ctx, summary)?,
            _ => Vec::new(),
        };
        descend_stmt(&mut stmts[i], ctx, summary)?;
        let n = generated.len();
        for (offset, stmt) in generated.into_iter().enumerate() {
            stmts.insert(i + 1 + offset, stmt);
        }
        i += 1 + n;
    }
    Ok(())
}

fn generated_for_item(
    item: &ModuleItem,
    ctx: &mut ModuleCtx,
    summary: &mut AnnotateSummary,
) -> Result<Vec<Stmt>, TransformError> {
    match item {
        ModuleItem::ModuleDecl(ModuleDecl::Import(import)) if import.type_only => {
            let Some(src) = import.src.value.as_str() else {
                return Ok(Vec::new());
            };
            let mut generated = Vec::new();
            for specifier in &import.specifiers {
                let Some(name) = imported_type_name(specifier) else {
                    continue;
                };
                let export_name = export_name_for_type(&name);
                generated.push(synth::import_shim_stmt(&export_name, src));
                summary.import_shims += 1;
            }
            Ok(generated)
        }
        ModuleItem::ModuleDecl(ModuleDecl::ExportDecl(export)) => match &export.decl {
            Decl::TsTypeAlias(alias) => generated_for_exported_alias(alias, ctx, summary),
            decl => generated_for_decl(decl, ctx, summary),
        },
        ModuleItem::ModuleDecl(ModuleDecl::ExportDefaultDecl(export)) => match &export.decl {
            DefaultDecl::Fn(fn_expr) => match &fn_expr.ident {
                Some(ident) => {
                    generated_for_function(ident.sym.as_str(), &fn_expr.function, ctx, summary)
                }
                None => {
                    debug!("anonymous default-exported function cannot be annotated");
                    Ok(Vec::new())
                }
            },
            DefaultDecl::Class(class_expr) => match &class_expr.ident {
                Some(ident) => {
                    generated_for_class(ident.sym.as_str(), &class_expr.class, ctx, summary)
                }
                None => {
                    debug!("anonymous default-exported class cannot be annotated");
                    Ok(Vec::new())
                }
            },
            DefaultDecl::TsInterfaceDecl(_) => Ok(Vec::new()),
        },
        ModuleItem::Stmt(Stmt::Decl(decl)) => generated_for_decl(decl, ctx, summary),
        _ => Ok(Vec::new()),
    }
}

/// An exported object-typed alias becomes a guarded cross-module export.
///
/// For an intersection only the final member is exported, even though the
/// alias resolves to the full merge in the symbol table. Consumers in other
/// units see the narrower value; in-unit references see the merge.
fn generated_for_exported_alias(
    alias: &TsTypeAliasDecl,
    ctx: &mut ModuleCtx,
    summary: &mut AnnotateSummary,
) -> Result<Vec<Stmt>, TransformError> {
    let name = alias.id.sym.as_str();
    let exported_ty: &TsType = match &*alias.type_ann {
        lit @ TsType::TsTypeLit(_) => lit,
        TsType::TsUnionOrIntersectionType(TsUnionOrIntersectionType::TsIntersectionType(
            intersection,
        )) => match intersection.types.last().map(|t| &**t) {
            Some(last @ TsType::TsTypeLit(_)) => last,
            _ => {
                debug!("exported alias `{name}` does not end in an object type, not exporting");
                return Ok(Vec::new());
            }
        },
        _ => {
            debug!("exported alias `{name}` is not an object type, not exporting");
            return Ok(Vec::new());
        }
    };
    let descriptor = resolve(exported_ty, ctx)?;
    let value = synth::synthesize(&descriptor);
    let export_name = export_name_for_type(name);
    summary.exported += 1;
    Ok(vec![synth::conditional_export_stmt(&export_name, value)])
}

fn generated_for_decl(
    decl: &Decl,
    ctx: &mut ModuleCtx,
    summary: &mut AnnotateSummary,
) -> Result<Vec<Stmt>, TransformError> {
    match decl {
        Decl::Fn(fn_decl) => generated_for_fn_decl(fn_decl, ctx, summary),
        Decl::Class(class_decl) => generated_for_class_decl(class_decl, ctx, summary),
        Decl::Var(var) => generated_for_var_decl(var, ctx, summary),
        _ => Ok(Vec::new()),
    }
}

fn generated_for_fn_decl(
    fn_decl: &FnDecl,
    ctx: &mut ModuleCtx,
    summary: &mut AnnotateSummary,
) -> Result<Vec<Stmt>, TransformError> {
    generated_for_function(fn_decl.ident.sym.as_str(), &fn_decl.function, ctx, summary)
}

fn generated_for_function(
    name: &str,
    function: &Function,
    ctx: &mut ModuleCtx,
    summary: &mut AnnotateSummary,
) -> Result<Vec<Stmt>, TransformError> {
    if !fn_is_component(function) {
        return Ok(Vec::new());
    }
    let ann = function
        .params
        .first()
        .and_then(|param| pat_type_ann(&param.pat));
    match annotate_fn_candidate(name, ann, ctx)? {
        Some(stmt) => {
            summary.attached += 1;
            Ok(vec![stmt])
        }
        None => Ok(Vec::new()),
    }
}

fn generated_for_class_decl(
    class_decl: &ClassDecl,
    ctx: &mut ModuleCtx,
    summary: &mut AnnotateSummary,
) -> Result<Vec<Stmt>, TransformError> {
    generated_for_class(class_decl.ident.sym.as_str(), &class_decl.class, ctx, summary)
}

fn generated_for_class(
    name: &str,
    class: &Class,
    ctx: &mut ModuleCtx,
    summary: &mut AnnotateSummary,
) -> Result<Vec<Stmt>, TransformError> {
    if !class_is_component(class) {
        debug!("class `{name}` does not extend a component base, skipping");
        return Ok(Vec::new());
    }
    let mut generated = Vec::new();

    // Source one: a `props` instance field with a type annotation.
    for member in &class.body {
        let ClassMember::ClassProp(prop) = member else {
            continue;
        };
        let PropName::Ident(key) = &prop.key else {
            continue;
        };
        if key.sym.as_str() != "props" {
            continue;
        }
        let Some(ann) = prop.type_ann.as_deref() else {
            continue;
        };
        let Some(descriptor) = props_for_annotation(&ann.type_ann, ctx)? else {
            return Err(TransformError::MissingPropTypes {
                name: name.to_string(),
            });
        };
        if let Some(stmt) = synth::annotate(name, &descriptor) {
            summary.attached += 1;
            generated.push(stmt);
        }
    }

    // Source two: the second type argument on the superclass.
    if let Some(type_params) = class.super_type_params.as_deref() {
        if let Some(TsType::TsTypeRef(type_ref)) = type_params.params.get(1).map(|t| &**t) {
            if let TsEntityName::Ident(ident) = &type_ref.type_name {
                if let Some(descriptor) = ctx.local_aliases.get(ident.sym.as_str()).cloned() {
                    if let Some(stmt) = synth::annotate(name, &descriptor) {
                        summary.attached += 1;
                        generated.push(stmt);
                    }
                }
            }
        }
    }

    Ok(generated)
}

fn generated_for_var_decl(
    var: &VarDecl,
    ctx: &mut ModuleCtx,
    summary: &mut AnnotateSummary,
) -> Result<Vec<Stmt>, TransformError> {
    let mut generated = Vec::new();
    for declarator in &var.decls {
        let Pat::Ident(binding) = &declarator.name else {
            continue;
        };
        let Some(init) = declarator.init.as_deref() else {
            continue;
        };
        let name = binding.id.sym.as_str();
        let ann = match init {
            Expr::Arrow(arrow) if arrow_is_component(arrow) => {
                arrow.params.first().and_then(pat_type_ann)
            }
            Expr::Fn(fn_expr) if fn_is_component(&fn_expr.function) => fn_expr
                .function
                .params
                .first()
                .and_then(|param| pat_type_ann(&param.pat)),
            _ => continue,
        };
        if let Some(stmt) = annotate_fn_candidate(name, ann, ctx)? {
            summary.attached += 1;
            generated.push(stmt);
        }
    }
    Ok(generated)
}

fn annotate_fn_candidate(
    name: &str,
    ann: Option<&TsTypeAnn>,
    ctx: &mut ModuleCtx,
) -> Result<Option<Stmt>, TransformError> {
    let Some(ann) = ann else {
        debug!("component `{name}` has no props annotation, skipping");
        return Ok(None);
    };
    let Some(descriptor) = props_for_annotation(&ann.type_ann, ctx)? else {
        return Ok(None);
    };
    Ok(synth::annotate(name, &descriptor))
}

/// The type annotation carried by a props parameter pattern, including
/// destructured and defaulted forms.
fn pat_type_ann(pat: &Pat) -> Option<&TsTypeAnn> {
    match pat {
        Pat::Ident(binding) => binding.type_ann.as_deref(),
        Pat::Object(object) => object.type_ann.as_deref(),
        Pat::Array(array) => array.type_ann.as_deref(),
        Pat::Rest(rest) => rest.type_ann.as_deref(),
        Pat::Assign(assign) => pat_type_ann(&assign.left),
        _ => None,
    }
}

fn descend_item(
    item: &mut ModuleItem,
    ctx: &mut ModuleCtx,
    summary: &mut AnnotateSummary,
) -> Result<(), TransformError> {
    match item {
        ModuleItem::Stmt(stmt) => descend_stmt(stmt, ctx, summary),
        ModuleItem::ModuleDecl(ModuleDecl::ExportDecl(export)) => {
            descend_decl(&mut export.decl, ctx, summary)
        }
        ModuleItem::ModuleDecl(ModuleDecl::ExportDefaultDecl(export)) => match &mut export.decl {
            DefaultDecl::Fn(fn_expr) => {
                if let Some(body) = fn_expr.function.body.as_mut() {
                    process_stmts(&mut body.stmts, ctx, summary)?;
                }
                Ok(())
            }
            DefaultDecl::Class(class_expr) => descend_class(&mut class_expr.class, ctx, summary),
            DefaultDecl::TsInterfaceDecl(_) => Ok(()),
        },
        _ => Ok(()),
    }
}

fn descend_stmt(
    stmt: &mut Stmt,
    ctx: &mut ModuleCtx,
    summary: &mut AnnotateSummary,
) -> Result<(), TransformError> {
    match stmt {
        Stmt::Decl(decl) => descend_decl(decl, ctx, summary),
        Stmt::Block(block) => process_stmts(&mut block.stmts, ctx, summary),
        Stmt::If(if_stmt) => {
            descend_stmt(&mut if_stmt.cons, ctx, summary)?;
            if let Some(alt) = if_stmt.alt.as_deref_mut() {
                descend_stmt(alt, ctx, summary)?;
            }
            Ok(())
        }
        _ => Ok(()),
    }
}

fn descend_class(
    class: &mut Class,
    ctx: &mut ModuleCtx,
    summary: &mut AnnotateSummary,
) -> Result<(), TransformError> {
    for member in &mut class.body {
        match member {
            ClassMember::Method(method) => {
                if let Some(body) = method.function.body.as_mut() {
                    process_stmts(&mut body.stmts, ctx, summary)?;
                }
            }
            ClassMember::Constructor(constructor) => {
                if let Some(body) = constructor.body.as_mut() {
                    process_stmts(&mut body.stmts, ctx, summary)?;
                }
            }
            _ => {}
        }
    }
    Ok(())
}

fn descend_decl(
    decl: &mut Decl,
    ctx: &mut ModuleCtx,
    summary: &mut AnnotateSummary,
) -> Result<(), TransformError> {
    match decl {
        Decl::Fn(fn_decl) => {
            if let Some(body) = fn_decl.function.body.as_mut() {
                process_stmts(&mut body.stmts, ctx, summary)?;
            }
            Ok(())
        }
        Decl::Class(class_decl) => descend_class(&mut class_decl.class, ctx, summary),
        Decl::Var(var) => {
            for declarator in &mut var.decls {
                let Some(init) = declarator.init.as_deref_mut() else {
                    continue;
                };
                match init {
                    Expr::Arrow(arrow) => {
                        if let BlockStmtOrExpr::BlockStmt(block) = &mut *arrow.body {
                            process_stmts(&mut block.stmts, ctx, summary)?;
                        }
                    }
                    Expr::Fn(fn_expr) => {
                        if let Some(body) = fn_expr.function.body.as_mut() {
                            process_stmts(&mut body.stmts, ctx, summary)?;
                        }
                    }
                    _ => {}
                }
            }
            Ok(())
        }
        _ => Ok(()),
    }
}
