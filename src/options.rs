//! Session Options for the Scope-Lift Pass
//!
//! One `LiftOptions` value is constructed per build session and shared
//! read-only across every file transform. Hosts pass it over the NAPI
//! bridge as camelCase JSON; missing fields fall back to the defaults.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Default component-library package. Namespace imports from this specifier
/// are inspected for state accessors, and the runtime helpers
/// (`defineBoundary`, `readContext`) are injected from it.
pub const DEFAULT_KIT_SPECIFIER: &str = "@zenith/kit";

/// Default accessor prefix for the convention strategy:
/// `Accordion.GetExpanded` reads the `expanded` context field.
pub const DEFAULT_ACCESSOR_PREFIX: &str = "Get";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LiftOptions {
    /// Module specifiers whose imports bind compound-component namespaces.
    pub module_specifiers: Vec<String>,
    /// Strategy deciding which namespace properties are state accessors.
    pub strategy: ClassifierStrategy,
    /// Callee names that create isolated single-expression callback
    /// boundaries. Accessor reads inside these cannot be lifted.
    pub callback_boundary_callees: Vec<String>,
    /// Module the scope-boundary constructor and context resolver are
    /// imported from. Defaults to the first module specifier.
    pub runtime_module: Option<String>,
    /// Name of the scope-boundary constructor.
    pub boundary_constructor: String,
    /// Name of the context-resolution function.
    pub context_resolver: String,
    /// Prefix for generated boundary-unit identifiers.
    pub unit_prefix: String,
    /// File extensions that carry the declarative-markup dialect.
    /// Anything else is skipped without inspection.
    pub markup_extensions: Vec<String>,
}

impl Default for LiftOptions {
    fn default() -> Self {
        LiftOptions {
            module_specifiers: vec![DEFAULT_KIT_SPECIFIER.to_string()],
            strategy: ClassifierStrategy::Convention {
                prefix: DEFAULT_ACCESSOR_PREFIX.to_string(),
            },
            callback_boundary_callees: vec!["snippet".to_string()],
            runtime_module: None,
            boundary_constructor: "defineBoundary".to_string(),
            context_resolver: "readContext".to_string(),
            unit_prefix: "Lifted".to_string(),
            markup_extensions: vec!["tsx".to_string(), "jsx".to_string()],
        }
    }
}

impl LiftOptions {
    /// Module the injected runtime imports come from.
    pub fn runtime_module(&self) -> &str {
        self.runtime_module
            .as_deref()
            .or_else(|| self.module_specifiers.first().map(|s| s.as_str()))
            .unwrap_or(DEFAULT_KIT_SPECIFIER)
    }

    pub fn matches_specifier(&self, source: &str) -> bool {
        self.module_specifiers.iter().any(|s| s == source)
    }

    pub fn is_callback_boundary_callee(&self, name: &str) -> bool {
        self.callback_boundary_callees.iter().any(|c| c == name)
    }

    /// Whether the file's extension marks it as declarative markup.
    pub fn is_markup_path(&self, path: &str) -> bool {
        match Path::new(path).extension().and_then(|e| e.to_str()) {
            Some(ext) => self
                .markup_extensions
                .iter()
                .any(|m| m.eq_ignore_ascii_case(ext)),
            None => false,
        }
    }
}

/// Pluggable classification configuration. `Convention` derives everything
/// from naming rules; `Registry` spells each accessor out.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ClassifierStrategy {
    Convention {
        prefix: String,
    },
    Registry {
        /// canonical namespace name -> property name -> descriptor.
        /// Ordered maps so the serialized form is stable; the incremental
        /// cache fingerprints options by their JSON.
        namespaces: BTreeMap<String, BTreeMap<String, RegistryEntry>>,
    },
}

/// Explicit per-accessor descriptor for the registry strategy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryEntry {
    pub context_field: String,
    pub context_ident: String,
    pub import_source: String,
    /// Derived/computed fields are resolved identically; the flag is carried
    /// for hosts that want to report on them.
    #[serde(default)]
    pub derived: bool,
}
