//! Accessor Classifier
//!
//! Decides whether `Namespace.Property` is a read-only state accessor and,
//! if so, which context field it reads. The engine depends only on the
//! `AccessorClassifier` trait; the convention and registry strategies are
//! interchangeable behind it. Both must agree with what the component's
//! state container exports at runtime; that correspondence is an external
//! contract, not enforced here.

use std::collections::BTreeMap;

use crate::binder::BoundNamespace;
use crate::options::{ClassifierStrategy, LiftOptions, RegistryEntry};

/// Everything the synthesizer needs to rewrite one accessor read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateDescriptor {
    /// Field on the owning component's state container.
    pub context_field: String,
    /// Identifier of the context object to resolve.
    pub context_ident: String,
    /// Where that identifier is imported from.
    pub context_import_source: String,
    /// Whether the field is derived/computed rather than stored.
    pub derived: bool,
}

/// Total, side-effect-free classification of namespace properties.
/// `None` means the property is a structural/component export.
pub trait AccessorClassifier {
    fn classify(&self, namespace: &BoundNamespace, property: &str) -> Option<StateDescriptor>;
}

pub fn build_classifier(options: &LiftOptions) -> Box<dyn AccessorClassifier> {
    match &options.strategy {
        ClassifierStrategy::Convention { prefix } => Box::new(ConventionClassifier {
            prefix: prefix.clone(),
        }),
        ClassifierStrategy::Registry { namespaces } => Box::new(RegistryClassifier {
            namespaces: namespaces.clone(),
        }),
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// CONVENTION STRATEGY
// ═══════════════════════════════════════════════════════════════════════════════

/// `{prefix}{Field}` properties are state accessors; the context field is
/// the remainder with its first letter lowercased, and the context
/// identifier is `{CanonicalName}Context` from the namespace's own import
/// source.
pub struct ConventionClassifier {
    prefix: String,
}

impl AccessorClassifier for ConventionClassifier {
    fn classify(&self, namespace: &BoundNamespace, property: &str) -> Option<StateDescriptor> {
        let remainder = property.strip_prefix(self.prefix.as_str())?;
        if remainder.is_empty() {
            return None;
        }
        // Coincidental prefixes like `Getaway` leave a lowercase remainder
        // and are not accessors.
        let first = remainder.chars().next()?;
        if !first.is_ascii_uppercase() {
            return None;
        }
        Some(StateDescriptor {
            context_field: lower_first(remainder),
            context_ident: format!("{}Context", namespace.canonical_name),
            context_import_source: namespace.import_source.clone(),
            derived: false,
        })
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// REGISTRY STRATEGY
// ═══════════════════════════════════════════════════════════════════════════════

/// Static per-namespace lookup from property name to an explicit descriptor.
pub struct RegistryClassifier {
    namespaces: BTreeMap<String, BTreeMap<String, RegistryEntry>>,
}

impl AccessorClassifier for RegistryClassifier {
    fn classify(&self, namespace: &BoundNamespace, property: &str) -> Option<StateDescriptor> {
        let entry = self
            .namespaces
            .get(&namespace.canonical_name)?
            .get(property)?;
        Some(StateDescriptor {
            context_field: entry.context_field.clone(),
            context_ident: entry.context_ident.clone(),
            context_import_source: entry.import_source.clone(),
            derived: entry.derived,
        })
    }
}

pub fn lower_first(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_ascii_lowercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}
