//! Per-unit symbol tables, suppression, and naming conventions.
//!
//! A [`ModuleCtx`] is constructed fresh for every compilation unit and never
//! shared or merged across units; cross-unit isolation depends entirely on
//! that discipline, so nothing in this module holds state beyond one unit.

use proptype_ir::PropType;
use rustc_hash::FxHashMap;
use smol_str::{format_smolstr, SmolStr};
use swc_ecma_ast::{
    Expr, ImportDecl, ImportSpecifier, Lit, Module, ModuleExportName, ModuleItem, Stmt,
    TsTypeAliasDecl,
};
use swc_ecma_visit::{Visit, VisitWith};
use tracing::debug;

use crate::error::TransformError;
use crate::resolve::{resolve, LookupTypes};

/// Directive string that disables the transform for a whole unit.
pub const SUPPRESS_DIRECTIVE: &str = "no proptypes-gen";

/// Units whose path contains this segment are never touched.
pub const VENDOR_SEGMENT: &str = "node_modules";

/// Module specifier of the runtime validator library.
pub const PROP_TYPES_MODULE: &str = "prop-types";

/// Deterministic cross-module export identifier for a type alias name.
///
/// Collaborating tools must reproduce this exactly for type-only imports to
/// resolve across compilation units.
pub fn export_name_for_type(name: &str) -> SmolStr {
    format_smolstr!("proptypesGen_proptype_{name}")
}

/// Symbol tables and suppression state for one compilation unit.
#[derive(Debug, Default)]
pub struct ModuleCtx {
    /// Local type alias name to resolved descriptor.
    pub(crate) local_aliases: FxHashMap<SmolStr, PropType>,
    /// Imported type alias name to generated cross-module export identifier.
    pub(crate) imported_aliases: FxHashMap<SmolStr, SmolStr>,
    /// Whether the unit opted out of processing entirely.
    pub(crate) suppressed: bool,
}

impl LookupTypes for ModuleCtx {
    fn lookup(&mut self, name: &str) -> Result<Option<PropType>, TransformError> {
        if let Some(descriptor) = self.local_aliases.get(name) {
            return Ok(Some(descriptor.clone()));
        }
        if let Some(export_name) = self.imported_aliases.get(name) {
            return Ok(Some(PropType::ImportedRef(export_name.clone())));
        }
        Ok(None)
    }
}

/// Builds the context for a unit: suppression, imports, and all type aliases
/// fully resolved.
///
/// Aliases are collected before any of them is resolved, and resolved on
/// demand with memoization, so a reference to an alias declared later in the
/// file resolves exactly like a backward reference. Recursive aliases are
/// logged and degrade to [`PropType::Unresolved`].
pub(crate) fn build_context(
    module: &Module,
    filename: Option<&str>,
) -> Result<ModuleCtx, TransformError> {
    if is_suppressed(module, filename) {
        return Ok(ModuleCtx {
            suppressed: true,
            ..Default::default()
        });
    }

    let mut collector = AliasCollector::default();
    module.visit_with(&mut collector);

    let imported: FxHashMap<SmolStr, SmolStr> = collector.imports.into_iter().collect();

    let mut names = Vec::with_capacity(collector.aliases.len());
    let mut decls = FxHashMap::default();
    for (name, ty) in collector.aliases {
        if name.is_empty() {
            return Err(TransformError::MissingAliasName);
        }
        names.push(name.clone());
        decls.insert(name, ty);
    }

    let mut resolver = AliasResolver {
        decls,
        resolved: FxHashMap::default(),
        in_progress: Vec::new(),
        imported: imported.clone(),
    };
    for name in &names {
        resolver.lookup(name)?;
    }

    Ok(ModuleCtx {
        local_aliases: resolver.resolved,
        imported_aliases: imported,
        suppressed: false,
    })
}

fn is_suppressed(module: &Module, filename: Option<&str>) -> bool {
    if let Some(name) = filename {
        if name.contains(VENDOR_SEGMENT) {
            return true;
        }
    }
    if let Some(ModuleItem::Stmt(Stmt::Expr(first))) = module.body.first() {
        if let Expr::Lit(Lit::Str(directive)) = &*first.expr {
            if directive.value.as_str() == Some(SUPPRESS_DIRECTIVE) {
                return true;
            }
        }
    }
    false
}

/// Collects every type alias declaration and type-only import in the unit.
#[derive(Default)]
struct AliasCollector {
    aliases: Vec<(SmolStr, swc_ecma_ast::TsType)>,
    imports: Vec<(SmolStr, SmolStr)>,
}

impl Visit for AliasCollector {
    fn visit_ts_type_alias_decl(&mut self, alias: &TsTypeAliasDecl) {
        self.aliases
            .push((SmolStr::new(alias.id.sym.as_str()), (*alias.type_ann).clone()));
    }

    fn visit_import_decl(&mut self, import: &ImportDecl) {
        if !import.type_only {
            return;
        }
        for specifier in &import.specifiers {
            let Some(name) = imported_type_name(specifier) else {
                continue;
            };
            self.imports
                .push((name.clone(), export_name_for_type(&name)));
        }
    }
}

/// The local binding name under which a type-only import specifier is
/// referenced: the default import's local name, or the named specifier's
/// imported name.
pub(crate) fn imported_type_name(specifier: &ImportSpecifier) -> Option<SmolStr> {
    match specifier {
        ImportSpecifier::Default(default) => Some(SmolStr::new(default.local.sym.as_str())),
        ImportSpecifier::Named(named) => match &named.imported {
            Some(ModuleExportName::Ident(ident)) => Some(SmolStr::new(ident.sym.as_str())),
            Some(ModuleExportName::Str(s)) => s.value.as_str().map(SmolStr::new),
            None => Some(SmolStr::new(named.local.sym.as_str())),
        },
        ImportSpecifier::Namespace(_) => None,
    }
}

/// Order-independent alias resolution with cycle detection.
struct AliasResolver {
    decls: FxHashMap<SmolStr, swc_ecma_ast::TsType>,
    resolved: FxHashMap<SmolStr, PropType>,
    in_progress: Vec<SmolStr>,
    imported: FxHashMap<SmolStr, SmolStr>,
}

impl LookupTypes for AliasResolver {
    fn lookup(&mut self, name: &str) -> Result<Option<PropType>, TransformError> {
        if let Some(descriptor) = self.resolved.get(name) {
            return Ok(Some(descriptor.clone()));
        }
        if self.in_progress.iter().any(|n| n == name) {
            debug!("recursive type alias `{name}` cannot be resolved");
            return Ok(Some(PropType::Unresolved(SmolStr::new(name))));
        }
        if let Some(ty) = self.decls.get(name).cloned() {
            self.in_progress.push(SmolStr::new(name));
            let descriptor = resolve(&ty, self)?;
            self.in_progress.pop();
            self.resolved.insert(SmolStr::new(name), descriptor.clone());
            return Ok(Some(descriptor));
        }
        if let Some(export_name) = self.imported.get(name) {
            return Ok(Some(PropType::ImportedRef(export_name.clone())));
        }
        Ok(None)
    }
}
