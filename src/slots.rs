//! Slot Locator
//!
//! Finds, for each accessor reference or live alias use, the smallest
//! enclosing template-expression slot. Uses sharing a slot merge into one
//! `SlotTarget`; a target nested inside another target folds into the
//! outer one so that no two targets overlap in span. Slots in attribute
//! position and slots whose uses sit inside an isolated single-expression
//! callback boundary are recorded but routed to diagnostics, never to
//! synthesis.
//!
//! Parent/position tracking is done with an explicit frame stack threaded
//! through the traversal; the tree itself is never annotated.

use oxc_ast::ast::{
    CallExpression, Expression, IdentifierReference, JSXAttributeItem, JSXAttributeValue,
    JSXChild, JSXElement, JSXExpressionContainer, JSXFragment, Program, StaticMemberExpression,
};
use oxc_ast_visit::{walk, Visit};
use oxc_span::GetSpan;
use std::collections::HashMap;

use crate::alias::AliasBinding;
use crate::collect::AccessorReference;
use crate::diagnostics::{DiagnosticSink, TextSpan, WARN_CALLBACK};
use crate::options::LiftOptions;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotKind {
    /// The slot is a child of an element or fragment.
    Child,
    /// The slot is the value of an element attribute.
    AttributeValue,
}

/// One accessor read inside a slot: either a direct `ns.GetX` reference or
/// an alias identifier standing in for one. `span` is exactly the text that
/// gets replaced by a context-field read.
#[derive(Debug, Clone)]
pub struct AccessorUse {
    pub span: TextSpan,
    pub namespace: usize,
    pub accessor_name: String,
    pub context_field: String,
    pub context_ident: String,
    pub context_import_source: String,
    /// Callback-boundary nesting depth at the use site (absolute).
    callback_depth: u32,
}

/// A template-expression slot containing at least one live accessor use.
#[derive(Debug, Clone)]
pub struct SlotTarget {
    /// Span of the whole container, braces included.
    pub slot_span: TextSpan,
    /// Span of the expression inside the braces.
    pub expr_span: TextSpan,
    pub kind: SlotKind,
    pub inside_callback_boundary: bool,
    /// In span order.
    pub uses: Vec<AccessorUse>,
    /// Callback-boundary nesting depth when the container was entered.
    entry_callback_depth: u32,
}

pub fn locate_slots(
    program: &Program,
    references: &[AccessorReference],
    aliases: &[AliasBinding],
    options: &LiftOptions,
    sink: &mut DiagnosticSink,
) -> Vec<SlotTarget> {
    let reference_by_span = references
        .iter()
        .map(|r| ((r.span.start, r.span.end), r))
        .collect();
    let mut locator = SlotLocator {
        reference_by_span,
        aliases,
        options,
        frames: Vec::new(),
        callback_depth: 0,
        targets: Vec::new(),
        sink,
    };
    locator.visit_program(program);
    merge_nested_targets(locator.targets)
}

struct Frame {
    slot_span: TextSpan,
    expr_span: TextSpan,
    kind: SlotKind,
    entry_callback_depth: u32,
    uses: Vec<AccessorUse>,
}

struct SlotLocator<'b, 'r> {
    reference_by_span: HashMap<(u32, u32), &'r AccessorReference>,
    aliases: &'b [AliasBinding],
    options: &'b LiftOptions,
    frames: Vec<Frame>,
    callback_depth: u32,
    targets: Vec<SlotTarget>,
    sink: &'b mut DiagnosticSink,
}

impl SlotLocator<'_, '_> {
    fn enter_container<'a>(&mut self, container: &JSXExpressionContainer<'a>, kind: SlotKind) {
        let expr = match container.expression.as_expression() {
            Some(expr) => expr,
            None => return, // comment-only container
        };
        self.frames.push(Frame {
            slot_span: container.span.into(),
            expr_span: expr.span().into(),
            kind,
            entry_callback_depth: self.callback_depth,
            uses: Vec::new(),
        });
        self.visit_expression(expr);
        if let Some(frame) = self.frames.pop() {
            if !frame.uses.is_empty() {
                self.targets.push(SlotTarget {
                    slot_span: frame.slot_span,
                    expr_span: frame.expr_span,
                    kind: frame.kind,
                    inside_callback_boundary: false, // computed after merging
                    uses: frame.uses,
                    entry_callback_depth: frame.entry_callback_depth,
                });
            }
        }
    }

    fn record_use(
        &mut self,
        span: TextSpan,
        namespace: usize,
        accessor_name: &str,
        context_field: &str,
        context_ident: &str,
        context_import_source: &str,
    ) {
        let depth = self.callback_depth;
        if let Some(frame) = self.frames.last_mut() {
            frame.uses.push(AccessorUse {
                span,
                namespace,
                accessor_name: accessor_name.to_string(),
                context_field: context_field.to_string(),
                context_ident: context_ident.to_string(),
                context_import_source: context_import_source.to_string(),
                callback_depth: depth,
            });
        } else if depth > 0 {
            // Statement-level accessor use inside a boundary callee: there is
            // no slot to lift, so the use can only be reported.
            self.sink.warning(
                WARN_CALLBACK,
                span,
                "State accessor referenced inside an isolated single-expression callback \
                 cannot be lifted; the expression is left untransformed."
                    .to_string(),
            );
        }
    }

    fn scan_children<'a>(&mut self, children: &[JSXChild<'a>]) {
        for child in children {
            match child {
                JSXChild::Element(element) => self.visit_jsx_element(element),
                JSXChild::Fragment(fragment) => self.visit_jsx_fragment(fragment),
                JSXChild::ExpressionContainer(container) => {
                    self.enter_container(container, SlotKind::Child);
                }
                JSXChild::Spread(spread) => self.visit_expression(&spread.expression),
                JSXChild::Text(_) => {}
            }
        }
    }
}

impl<'a> Visit<'a> for SlotLocator<'_, '_> {
    fn visit_jsx_element(&mut self, element: &JSXElement<'a>) {
        for item in &element.opening_element.attributes {
            match item {
                JSXAttributeItem::Attribute(attribute) => match &attribute.value {
                    Some(JSXAttributeValue::ExpressionContainer(container)) => {
                        self.enter_container(container, SlotKind::AttributeValue);
                    }
                    Some(JSXAttributeValue::Element(inner)) => self.visit_jsx_element(inner),
                    Some(JSXAttributeValue::Fragment(inner)) => self.visit_jsx_fragment(inner),
                    _ => {}
                },
                JSXAttributeItem::SpreadAttribute(spread) => {
                    self.visit_expression(&spread.argument);
                }
            }
        }
        self.scan_children(&element.children);
    }

    fn visit_jsx_fragment(&mut self, fragment: &JSXFragment<'a>) {
        self.scan_children(&fragment.children);
    }

    fn visit_call_expression(&mut self, expr: &CallExpression<'a>) {
        let is_boundary = match &expr.callee {
            Expression::Identifier(callee) => {
                self.options.is_callback_boundary_callee(callee.name.as_str())
            }
            _ => false,
        };
        if is_boundary {
            self.callback_depth += 1;
        }
        walk::walk_call_expression(self, expr);
        if is_boundary {
            self.callback_depth -= 1;
        }
    }

    fn visit_static_member_expression(&mut self, expr: &StaticMemberExpression<'a>) {
        let key = (expr.span.start, expr.span.end);
        if let Some(reference) = self.reference_by_span.get(&key).copied() {
            self.record_use(
                reference.span,
                reference.namespace,
                &reference.accessor_name,
                &reference.context_field,
                &reference.context_ident,
                &reference.context_import_source,
            );
        }
        walk::walk_static_member_expression(self, expr);
    }

    fn visit_identifier_reference(&mut self, ident: &IdentifierReference<'a>) {
        // The most recent live binding of this name wins.
        let alias = self
            .aliases
            .iter()
            .rev()
            .find(|a| a.local_name == ident.name.as_str() && a.live_at(ident.span.start));
        if let Some(alias) = alias {
            let (namespace, accessor_name, context_field, context_ident, context_import_source) = (
                alias.namespace,
                alias.accessor_name.clone(),
                alias.context_field.clone(),
                alias.context_ident.clone(),
                alias.context_import_source.clone(),
            );
            self.record_use(
                ident.span.into(),
                namespace,
                &accessor_name,
                &context_field,
                &context_ident,
                &context_import_source,
            );
        }
    }
}

/// Folds targets nested inside another target into the enclosing one, then
/// fixes span ordering and the callback flag. Guarantees the rewriter's
/// non-overlap invariant.
fn merge_nested_targets(mut targets: Vec<SlotTarget>) -> Vec<SlotTarget> {
    targets.sort_by_key(|t| (t.slot_span.start, std::cmp::Reverse(t.slot_span.end)));

    let mut merged: Vec<SlotTarget> = Vec::new();
    for target in targets {
        match merged.last_mut() {
            Some(outer) if outer.slot_span.contains_span(target.slot_span) => {
                outer.uses.extend(target.uses);
            }
            _ => merged.push(target),
        }
    }

    for target in merged.iter_mut() {
        target.uses.sort_by_key(|u| (u.span.start, u.span.end));
        target.inside_callback_boundary = target
            .uses
            .iter()
            .any(|u| u.callback_depth > target.entry_callback_depth);
    }
    merged
}
