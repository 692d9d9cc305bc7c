//! Alias & Destructure Tracker
//!
//! Resolves local bindings that refer back to a collected accessor
//! reference: direct assignment (`const a = ns.GetX`) and object-pattern
//! destructuring off a bound namespace (`const { GetX } = ns`, renamed
//! `const { GetX: y } = ns`). A later assignment to an alias name
//! invalidates the binding from that offset forward; uses strictly before
//! the reassignment remain valid. Nested destructuring of an accessor
//! cannot be tracked soundly and is a fatal error.

use oxc_ast::ast::{
    AssignmentExpression, AssignmentTarget, BindingPattern, Expression, Program, PropertyKey,
    VariableDeclarator,
};
use oxc_ast_visit::{walk, Visit};
use std::collections::HashMap;

use crate::binder::{namespace_index, BoundNamespace};
use crate::classifier::AccessorClassifier;
use crate::collect::AccessorReference;
use crate::diagnostics::{DiagnosticSink, TextSpan, ERR_NESTED_DESTRUCTURE, WARN_REASSIGNED};

/// A local name standing in for an accessor reference. The validity flag
/// transitions exactly once: `invalidated_at` is set by the first
/// reassignment of `local_name` after the binding.
#[derive(Debug, Clone)]
pub struct AliasBinding {
    pub local_name: String,
    pub namespace: usize,
    pub accessor_name: String,
    pub context_field: String,
    pub context_ident: String,
    pub context_import_source: String,
    /// Offset from which uses of `local_name` resolve to this alias.
    pub valid_from: u32,
    /// Offset of the invalidating reassignment, if any.
    pub invalidated_at: Option<u32>,
}

impl AliasBinding {
    /// Whether a use at `offset` resolves to this alias.
    pub fn live_at(&self, offset: u32) -> bool {
        offset >= self.valid_from && self.invalidated_at.map_or(true, |at| offset < at)
    }
}

pub fn track_aliases(
    program: &Program,
    namespaces: &[BoundNamespace],
    classifier: &dyn AccessorClassifier,
    references: &[AccessorReference],
    sink: &mut DiagnosticSink,
) -> Vec<AliasBinding> {
    let by_span = references
        .iter()
        .enumerate()
        .map(|(i, r)| ((r.span.start, r.span.end), i))
        .collect();
    let mut tracker = AliasTracker {
        namespaces,
        classifier,
        references,
        reference_by_span: by_span,
        aliases: Vec::new(),
        sink,
    };
    tracker.visit_program(program);
    tracker.aliases
}

struct AliasTracker<'b> {
    namespaces: &'b [BoundNamespace],
    classifier: &'b dyn AccessorClassifier,
    references: &'b [AccessorReference],
    reference_by_span: HashMap<(u32, u32), usize>,
    aliases: Vec<AliasBinding>,
    sink: &'b mut DiagnosticSink,
}

impl AliasTracker<'_> {
    fn alias_from_reference(&mut self, local_name: &str, reference: usize, valid_from: u32) {
        let r = &self.references[reference];
        self.aliases.push(AliasBinding {
            local_name: local_name.to_string(),
            namespace: r.namespace,
            accessor_name: r.accessor_name.clone(),
            context_field: r.context_field.clone(),
            context_ident: r.context_ident.clone(),
            context_import_source: r.context_import_source.clone(),
            valid_from,
            invalidated_at: None,
        });
    }

    fn track_destructured_property(
        &mut self,
        ns_index: usize,
        accessor_name: &str,
        binding: &BindingPattern<'_>,
        property_span: TextSpan,
        valid_from: u32,
    ) {
        let namespace = &self.namespaces[ns_index];
        let desc = match self.classifier.classify(namespace, accessor_name) {
            Some(desc) => desc,
            // Structural destructure (`const { Root } = Accordion`), not ours.
            None => return,
        };
        match binding {
            BindingPattern::BindingIdentifier(id) => {
                self.aliases.push(AliasBinding {
                    local_name: id.name.to_string(),
                    namespace: ns_index,
                    accessor_name: accessor_name.to_string(),
                    context_field: desc.context_field,
                    context_ident: desc.context_ident,
                    context_import_source: desc.context_import_source,
                    valid_from,
                    invalidated_at: None,
                });
            }
            // `const { GetX = fallback } = ns` still binds one name.
            BindingPattern::AssignmentPattern(assignment) => {
                self.track_destructured_property(
                    ns_index,
                    accessor_name,
                    &assignment.left,
                    property_span,
                    valid_from,
                );
            }
            _ => {
                self.sink.error(
                    ERR_NESTED_DESTRUCTURE,
                    property_span,
                    format!(
                        "State accessor \"{}.{}\" cannot be destructured further; bind it to a single name instead.",
                        namespace.local_name, accessor_name
                    ),
                );
            }
        }
    }
}

impl<'a> Visit<'a> for AliasTracker<'_> {
    fn visit_variable_declarator(&mut self, decl: &VariableDeclarator<'a>) {
        let valid_from = decl.span.end;
        match (&decl.id, &decl.init) {
            // const a = ns.GetX;
            (BindingPattern::BindingIdentifier(id), Some(Expression::StaticMemberExpression(member))) => {
                let key = (member.span.start, member.span.end);
                if let Some(&reference) = self.reference_by_span.get(&key) {
                    self.alias_from_reference(id.name.as_str(), reference, valid_from);
                }
            }
            // const { GetX } = ns;  /  const { GetX: y } = ns;
            (BindingPattern::ObjectPattern(pattern), Some(Expression::Identifier(object))) => {
                if let Some(ns_index) = namespace_index(self.namespaces, object.name.as_str()) {
                    for property in &pattern.properties {
                        let accessor_name = match &property.key {
                            PropertyKey::StaticIdentifier(key) => key.name.to_string(),
                            _ => continue,
                        };
                        self.track_destructured_property(
                            ns_index,
                            &accessor_name,
                            &property.value,
                            property.span.into(),
                            valid_from,
                        );
                    }
                }
            }
            _ => {}
        }
        walk::walk_variable_declarator(self, decl);
    }

    fn visit_assignment_expression(&mut self, expr: &AssignmentExpression<'a>) {
        if let AssignmentTarget::AssignmentTargetIdentifier(target) = &expr.left {
            let at = expr.span.start;
            let mut invalidated = None;
            for alias in self.aliases.iter_mut() {
                if alias.local_name == target.name.as_str()
                    && alias.invalidated_at.is_none()
                    && at >= alias.valid_from
                {
                    alias.invalidated_at = Some(at);
                    invalidated = Some(alias.local_name.clone());
                }
            }
            if let Some(name) = invalidated {
                self.sink.warning(
                    WARN_REASSIGNED,
                    expr.span.into(),
                    format!(
                        "\"{}\" no longer aliases a state accessor after this assignment; later uses are left untransformed.",
                        name
                    ),
                );
            }
        }
        walk::walk_assignment_expression(self, expr);
    }
}
