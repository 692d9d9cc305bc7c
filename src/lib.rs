//! # Scope-Lift Pass Ground Truth
//!
//! ## Lifting Invariants
//!
//! 1. **Read-Only Rewrite**: only state accessor READS (`ns.GetX` and local
//!    aliases of them) are ever rewritten. Structural exports, setters, and
//!    everything else pass through byte-for-byte.
//!
//! 2. **Slot Granularity**: the unit of extraction is the smallest enclosing
//!    template-expression slot, never the bare accessor. Every accessor use
//!    sharing a slot lands in one synthesized unit.
//!
//! 3. **Context From Below**: a synthesized unit resolves the owning
//!    component's context inside its own body, once per distinct namespace
//!    used in the slot. The host component never touches the context.
//!
//! 4. **Textual Fidelity**: the tree is never re-serialized. Rewrites are
//!    non-overlapping span replacements over the original text, plus one
//!    insertion block after the last top-level import, and every output
//!    offset maps back through the `PositionMap`.
//!
//! 5. **Failure Containment**: parse failures and nested destructuring abort
//!    the file's rewrite (`LIFT-ERR-PARSE`, `LIFT-ERR-NESTED-DESTRUCTURE`).
//!    Attribute-position accessors are per-usage errors; callback-boundary
//!    and reassigned-alias cases warn and leave the usage untransformed.
//!
//! 6. **Idempotence**: rewritten output contains no liftable accessor reads,
//!    so running the pass on its own output yields `Unchanged`.

#[cfg(feature = "napi")]
use napi_derive::napi;

mod alias;
mod binder;
mod cache;
mod classifier;
mod collect;
mod diagnostics;
mod discovery;
mod options;
mod pass;
mod rewrite;
mod slots;
mod synth;

#[cfg(test)]
mod pass_tests;

// Internal Rust-to-Rust API (for bundler plugins)
pub use cache::TransformCache;
pub use diagnostics::{Diagnostic, Severity, TextSpan};
pub use discovery::find_markup_files;
pub use options::{ClassifierStrategy, LiftOptions, RegistryEntry};
pub use pass::{transform_file, transform_files, transform_source, TransformOutcome, TransformResult};
pub use rewrite::PositionMap;

#[cfg(feature = "napi")]
pub use discovery::discover_markup_files_native;
#[cfg(feature = "napi")]
pub use pass::{transform_files_native, transform_source_native};

#[cfg(feature = "napi")]
#[napi]
pub fn lift_bridge() -> String {
    "Scope-Lift Native Bridge Connected".to_string()
}
