//! Scope-Lift Pass Orchestrator
//!
//! Runs the stages as sequential pure passes over one immutable tree:
//! bind namespaces, collect references, track aliases, locate slots,
//! synthesize units, rewrite. Processing is synchronous and single-threaded
//! per file; files share nothing mutable, so a file set is transformed in
//! parallel with rayon.
//!
//! Fatal diagnostics (parse failure, nested destructuring) abort the file's
//! rewrite entirely; warnings leave the offending slot untransformed and
//! let the rest of the file proceed.

use oxc_allocator::Allocator;
use oxc_parser::Parser;
use oxc_span::SourceType;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;

#[cfg(feature = "napi")]
use napi_derive::napi;

use crate::alias::track_aliases;
use crate::binder::bind_namespaces;
use crate::cache::TransformCache;
use crate::classifier::build_classifier;
use crate::collect::collect_references;
use crate::diagnostics::{Diagnostic, DiagnosticSink, Severity, TextSpan, ERR_PARSE};
use crate::options::LiftOptions;
use crate::rewrite::{apply_edits, build_edits, PositionMap};
use crate::slots::locate_slots;
use crate::synth::synthesize_units;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum TransformOutcome {
    /// No rewrite needed; the original text stands.
    Unchanged,
    /// Rewritten text plus the map from output offsets back to input
    /// offsets.
    Rewritten { code: String, map: PositionMap },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformResult {
    pub file: String,
    pub outcome: TransformOutcome,
    /// Ordered by span.
    pub diagnostics: Vec<Diagnostic>,
}

impl TransformResult {
    fn unchanged(file: &str, diagnostics: Vec<Diagnostic>) -> Self {
        TransformResult {
            file: file.to_string(),
            outcome: TransformOutcome::Unchanged,
            diagnostics,
        }
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }
}

/// Transforms one already-loaded markup source file. Files whose extension
/// is not in the configured markup set are skipped without inspection.
pub fn transform_source(file_path: &str, source: &str, options: &LiftOptions) -> TransformResult {
    if !options.is_markup_path(file_path) {
        return TransformResult::unchanged(file_path, Vec::new());
    }

    let allocator = Allocator::default();
    let source_type = SourceType::default()
        .with_module(true)
        .with_typescript(true)
        .with_jsx(true);
    let ret = Parser::new(&allocator, source, source_type).parse();

    let mut sink = DiagnosticSink::new(file_path);
    if !ret.errors.is_empty() {
        for error in &ret.errors {
            // The parser's first label points at the malformed text.
            let span = error
                .labels
                .as_ref()
                .and_then(|labels| labels.first())
                .map(|label| {
                    let start = label.offset() as u32;
                    TextSpan::new(start, start + label.len() as u32)
                })
                .unwrap_or_default();
            sink.error(ERR_PARSE, span, error.to_string());
        }
        return TransformResult::unchanged(file_path, sink.into_sorted());
    }
    let program = ret.program;

    let bound = bind_namespaces(&program, options);
    if bound.namespaces.is_empty() {
        // The common case: no recognized namespace import at all.
        return TransformResult::unchanged(file_path, Vec::new());
    }

    let classifier = build_classifier(options);
    let references = collect_references(&program, &bound.namespaces, classifier.as_ref());
    let aliases = track_aliases(
        &program,
        &bound.namespaces,
        classifier.as_ref(),
        &references,
        &mut sink,
    );
    if references.is_empty() && aliases.is_empty() {
        // Namespace used only for its structural exports.
        return TransformResult::unchanged(file_path, sink.into_sorted());
    }

    let targets = locate_slots(&program, &references, &aliases, options, &mut sink);
    if sink.has_fatal() {
        // Nested destructuring: tracking cannot be made sound, no partial
        // rewrite for this file.
        return TransformResult::unchanged(file_path, sink.into_sorted());
    }

    let synthesis = synthesize_units(source, &targets, &bound.namespaces, options, &mut sink);
    if synthesis.units.is_empty() {
        return TransformResult::unchanged(file_path, sink.into_sorted());
    }

    let edits = build_edits(&synthesis, &bound.imports);
    let (code, map) = apply_edits(source, edits);
    TransformResult {
        file: file_path.to_string(),
        outcome: TransformOutcome::Rewritten { code, map },
        diagnostics: sink.into_sorted(),
    }
}

/// Reads and transforms one file from disk, consulting the incremental
/// cache first.
pub fn transform_file(path: &str, options: &LiftOptions, cache: &TransformCache) -> TransformResult {
    let source = match fs::read_to_string(path) {
        Ok(source) => source,
        Err(error) => {
            let mut sink = DiagnosticSink::new(path);
            sink.error(
                ERR_PARSE,
                TextSpan::default(),
                format!("Failed to read {}: {}", path, error),
            );
            return TransformResult::unchanged(path, sink.into_sorted());
        }
    };
    let fingerprint = TransformCache::options_fingerprint(options);
    if let Some(cached) = cache.get(path, &source, &fingerprint) {
        return cached;
    }
    let result = transform_source(path, &source, options);
    cache.set(path, &source, &fingerprint, &result);
    result
}

/// Transforms a file set in parallel. Each file is independent; the only
/// shared state is the read-only options value.
pub fn transform_files(paths: &[String], options: &LiftOptions) -> Vec<TransformResult> {
    let cache = TransformCache::new();
    paths
        .par_iter()
        .map(|path| transform_file(path, options, &cache))
        .collect()
}

// ═══════════════════════════════════════════════════════════════════════════════
// NAPI WRAPPERS
// ═══════════════════════════════════════════════════════════════════════════════

#[cfg(feature = "napi")]
fn parse_options(options_json: Option<String>) -> napi::Result<LiftOptions> {
    match options_json {
        Some(json) => serde_json::from_str(&json)
            .map_err(|e| napi::Error::from_reason(format!("Options parse error: {}", e))),
        None => Ok(LiftOptions::default()),
    }
}

#[cfg(feature = "napi")]
#[napi]
pub fn transform_source_native(
    file_path: String,
    source: String,
    options_json: Option<String>,
) -> napi::Result<String> {
    let options = parse_options(options_json)?;
    let result = transform_source(&file_path, &source, &options);
    serde_json::to_string(&result)
        .map_err(|e| napi::Error::from_reason(format!("Serialize error: {}", e)))
}

#[cfg(feature = "napi")]
#[napi]
pub fn transform_files_native(
    paths: Vec<String>,
    options_json: Option<String>,
) -> napi::Result<String> {
    let options = parse_options(options_json)?;
    let results = transform_files(&paths, &options);
    serde_json::to_string(&results)
        .map_err(|e| napi::Error::from_reason(format!("Serialize error: {}", e)))
}
