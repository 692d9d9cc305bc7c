//! Namespace Binder
//!
//! Scans top-level import statements and binds the local identifiers that
//! name a compound-component namespace from a configured module specifier.
//! Also builds the import index the source rewriter needs later: every
//! imported local name (to avoid duplicate injected imports) and the end
//! offset of the last top-level import (the insertion point for synthesized
//! declarations).

use oxc_ast::ast::{ImportDeclarationSpecifier, ModuleExportName, Program, Statement};
use std::collections::HashSet;

use crate::options::LiftOptions;

/// A locally-bound component-library namespace. One per imported namespace
/// identifier in the file; immutable; file-scoped.
#[derive(Debug, Clone)]
pub struct BoundNamespace {
    /// The identifier the file uses (`A` in `import { Accordion as A }`).
    pub local_name: String,
    /// The library's name for the namespace (`Accordion`).
    pub canonical_name: String,
    /// The specifier it was imported from.
    pub import_source: String,
}

/// What the rewriter needs to know about the file's existing imports.
#[derive(Debug, Clone, Default)]
pub struct ImportIndex {
    /// Every local name introduced by a value import in this file.
    pub imported_locals: HashSet<String>,
    /// End offset of the last top-level import statement.
    pub last_import_end: u32,
}

#[derive(Debug, Default)]
pub struct BindResult {
    pub namespaces: Vec<BoundNamespace>,
    pub imports: ImportIndex,
}

/// Walks the program's import statements. Returns an empty namespace set if
/// no configured specifier is imported, in which case the engine
/// short-circuits with a pass-through result.
pub fn bind_namespaces(program: &Program, options: &LiftOptions) -> BindResult {
    let mut result = BindResult::default();

    for stmt in &program.body {
        let import_decl = match stmt {
            Statement::ImportDeclaration(decl) => decl,
            _ => continue,
        };

        result.imports.last_import_end = import_decl.span.end;

        if import_decl.import_kind.is_type() {
            continue;
        }

        let source = import_decl.source.value.to_string();
        let from_kit = options.matches_specifier(&source);

        let specifiers = match &import_decl.specifiers {
            Some(specifiers) => specifiers,
            None => continue, // side-effect import
        };

        for specifier in specifiers {
            match specifier {
                ImportDeclarationSpecifier::ImportNamespaceSpecifier(s) => {
                    let local = s.local.name.to_string();
                    result.imports.imported_locals.insert(local.clone());
                    if from_kit {
                        result.namespaces.push(BoundNamespace {
                            canonical_name: local.clone(),
                            local_name: local,
                            import_source: source.clone(),
                        });
                    }
                }
                ImportDeclarationSpecifier::ImportSpecifier(s) => {
                    let local = s.local.name.to_string();
                    result.imports.imported_locals.insert(local.clone());
                    if from_kit && !s.import_kind.is_type() {
                        let imported = match &s.imported {
                            ModuleExportName::IdentifierName(id) => id.name.to_string(),
                            ModuleExportName::StringLiteral(lit) => lit.value.to_string(),
                            _ => local.clone(),
                        };
                        result.namespaces.push(BoundNamespace {
                            local_name: local,
                            canonical_name: imported,
                            import_source: source.clone(),
                        });
                    }
                }
                ImportDeclarationSpecifier::ImportDefaultSpecifier(s) => {
                    // Default imports are not a grouped namespace export.
                    result.imports.imported_locals.insert(s.local.name.to_string());
                }
            }
        }
    }

    result
}

/// Index of a bound namespace by its local identifier name.
pub fn namespace_index(namespaces: &[BoundNamespace], local_name: &str) -> Option<usize> {
    namespaces.iter().position(|ns| ns.local_name == local_name)
}
