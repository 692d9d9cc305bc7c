//! Reference Collector
//!
//! One pass over the immutable tree producing a record per state-accessor
//! property access. The common case is an empty result: a bound namespace
//! used only for its structural exports (`<Accordion.Root>` etc), which
//! short-circuits the whole transform.

use oxc_ast::ast::{Expression, Program, StaticMemberExpression};
use oxc_ast_visit::{walk, Visit};

use crate::binder::{namespace_index, BoundNamespace};
use crate::classifier::AccessorClassifier;
use crate::diagnostics::TextSpan;

/// A state-accessor property access (`ns.GetExpanded`), with its descriptor
/// resolved. Immutable once created.
#[derive(Debug, Clone)]
pub struct AccessorReference {
    /// Span of the whole `ns.Accessor` member expression.
    pub span: TextSpan,
    /// Index into the bound-namespace table.
    pub namespace: usize,
    pub accessor_name: String,
    pub context_field: String,
    pub context_ident: String,
    pub context_import_source: String,
}

pub fn collect_references(
    program: &Program,
    namespaces: &[BoundNamespace],
    classifier: &dyn AccessorClassifier,
) -> Vec<AccessorReference> {
    let mut collector = ReferenceCollector {
        namespaces,
        classifier,
        references: Vec::new(),
    };
    collector.visit_program(program);
    collector.references
}

struct ReferenceCollector<'b> {
    namespaces: &'b [BoundNamespace],
    classifier: &'b dyn AccessorClassifier,
    references: Vec<AccessorReference>,
}

impl<'a> Visit<'a> for ReferenceCollector<'_> {
    fn visit_static_member_expression(&mut self, expr: &StaticMemberExpression<'a>) {
        if let Expression::Identifier(object) = &expr.object {
            if let Some(ns_index) = namespace_index(self.namespaces, object.name.as_str()) {
                let namespace = &self.namespaces[ns_index];
                let property = expr.property.name.as_str();
                if let Some(desc) = self.classifier.classify(namespace, property) {
                    self.references.push(AccessorReference {
                        span: expr.span.into(),
                        namespace: ns_index,
                        accessor_name: property.to_string(),
                        context_field: desc.context_field,
                        context_ident: desc.context_ident,
                        context_import_source: desc.context_import_source,
                    });
                }
            }
        }
        walk::walk_static_member_expression(self, expr);
    }
}
