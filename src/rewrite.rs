//! Source Rewriter
//!
//! Applies the minimal textual edits: each synthesized slot becomes a
//! self-closing reference to its unit, and one block of injected imports
//! followed by the unit declarations is inserted immediately after the
//! last top-level import. Edits are non-overlapping `(span, replacement)`
//! pairs applied in a single forward pass over the original text; the tree
//! is never re-serialized, so unrelated formatting is untouched.
//!
//! Alongside the rewritten text a `PositionMap` is produced so any output
//! offset maps back to the originating input offset.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};

use crate::binder::ImportIndex;
use crate::diagnostics::TextSpan;
use crate::synth::SynthesisOutput;

// ═══════════════════════════════════════════════════════════════════════════════
// POSITION MAP
// ═══════════════════════════════════════════════════════════════════════════════

/// One contiguous run of output text. Copied runs map exactly back to the
/// input; synthetic runs (replacements, insertions) map to their source
/// anchor offset.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapSegment {
    pub out_start: u32,
    pub out_end: u32,
    pub src_start: u32,
    pub synthetic: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionMap {
    pub segments: Vec<MapSegment>,
}

impl PositionMap {
    /// Maps an offset in the rewritten text back to the originating offset
    /// in the input. Synthetic text maps to its anchor.
    pub fn original_offset(&self, out_offset: u32) -> Option<u32> {
        let idx = match self
            .segments
            .binary_search_by(|s| s.out_start.cmp(&out_offset))
        {
            Ok(idx) => idx,
            Err(0) => return None,
            Err(idx) => idx - 1,
        };
        let segment = &self.segments[idx];
        if out_offset >= segment.out_end {
            return None; // past the end of the output
        }
        if segment.synthetic {
            Some(segment.src_start)
        } else {
            Some(segment.src_start + (out_offset - segment.out_start))
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// EDITS
// ═══════════════════════════════════════════════════════════════════════════════

/// A single span replacement. Insertions use an empty span.
#[derive(Debug, Clone)]
pub struct Edit {
    pub span: TextSpan,
    pub replacement: String,
}

/// Builds the edit list for one file: the insertion block after the last
/// import, then one replacement per synthesized slot. Imports are injected
/// only for names not already imported somewhere in the file.
pub fn build_edits(synthesis: &SynthesisOutput, imports: &ImportIndex) -> Vec<Edit> {
    let mut edits = Vec::new();
    if synthesis.units.is_empty() {
        return edits;
    }

    let insert_at = imports.last_import_end;
    let mut block = String::new();
    for line in missing_import_lines(&synthesis.required_imports, &imports.imported_locals) {
        block.push('\n');
        block.push_str(&line);
    }
    for unit in &synthesis.units {
        block.push_str("\n\n");
        block.push_str(&unit.declaration);
    }
    edits.push(Edit {
        span: TextSpan::new(insert_at, insert_at),
        replacement: block,
    });

    for unit in &synthesis.units {
        edits.push(Edit {
            span: unit.slot_span,
            replacement: format!("<{} />", unit.generated_name),
        });
    }
    edits
}

fn missing_import_lines(
    required: &BTreeMap<String, BTreeSet<String>>,
    already_imported: &HashSet<String>,
) -> Vec<String> {
    let mut lines = Vec::new();
    for (source, names) in required {
        let missing: Vec<&str> = names
            .iter()
            .filter(|n| !already_imported.contains(*n))
            .map(|n| n.as_str())
            .collect();
        if !missing.is_empty() {
            lines.push(format!(
                "import {{ {} }} from \"{}\";",
                missing.join(", "),
                source
            ));
        }
    }
    lines
}

/// Applies non-overlapping edits in one pass, producing the rewritten text
/// and its position map. Overlap is ruled out upstream by the slot
/// locator's merge invariant; an out-of-order edit is skipped rather than
/// corrupting the output.
pub fn apply_edits(source: &str, mut edits: Vec<Edit>) -> (String, PositionMap) {
    edits.sort_by_key(|e| (e.span.start, e.span.end));

    let mut output = String::with_capacity(source.len());
    let mut map = PositionMap::default();
    let mut cursor: u32 = 0;

    for edit in &edits {
        if edit.span.start < cursor {
            continue;
        }
        if edit.span.start > cursor {
            push_segment(&mut map, &mut output, cursor, false);
            output.push_str(&source[cursor as usize..edit.span.start as usize]);
            finish_segment(&mut map, &output);
        }
        if !edit.replacement.is_empty() {
            push_segment(&mut map, &mut output, edit.span.start, true);
            output.push_str(&edit.replacement);
            finish_segment(&mut map, &output);
        }
        cursor = edit.span.end;
    }
    if (cursor as usize) < source.len() {
        push_segment(&mut map, &mut output, cursor, false);
        output.push_str(&source[cursor as usize..]);
        finish_segment(&mut map, &output);
    }

    (output, map)
}

fn push_segment(map: &mut PositionMap, output: &mut String, src_start: u32, synthetic: bool) {
    map.segments.push(MapSegment {
        out_start: output.len() as u32,
        out_end: output.len() as u32,
        src_start,
        synthetic,
    });
}

fn finish_segment(map: &mut PositionMap, output: &str) {
    if let Some(segment) = map.segments.last_mut() {
        segment.out_end = output.len() as u32;
    }
}
