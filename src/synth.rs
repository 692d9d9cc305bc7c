//! Unit Synthesizer
//!
//! Builds one boundary-unit declaration per valid slot target. The unit
//! resolves one context per distinct namespace used in the slot and
//! reproduces the original slot expression verbatim, except that every
//! accessor sub-expression is replaced at its exact original span by a
//! context-field read. The rewrite operates strictly at the accessor
//! boundary; the rest of any access chain is untouched.
//!
//! Attribute-position targets and callback-boundary targets never reach
//! synthesis; they are diagnosed here instead.

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::binder::BoundNamespace;
use crate::classifier::lower_first;
use crate::diagnostics::{DiagnosticSink, TextSpan, ERR_ATTR_VALUE, WARN_CALLBACK};
use crate::options::LiftOptions;
use crate::slots::{SlotKind, SlotTarget};

/// A synthesized boundary unit, ready for insertion as a top-level
/// declaration. `generated_name` is unique within the file by construction.
#[derive(Debug, Clone)]
pub struct SynthesizedUnit {
    pub generated_name: String,
    /// Container span this unit replaces.
    pub slot_span: TextSpan,
    /// Full `const ... = defineBoundary(...)` declaration text.
    pub declaration: String,
}

#[derive(Debug, Default)]
pub struct SynthesisOutput {
    /// In source order of their slots.
    pub units: Vec<SynthesizedUnit>,
    /// import source -> names the units need from it.
    pub required_imports: BTreeMap<String, BTreeSet<String>>,
}

pub fn synthesize_units(
    source_text: &str,
    targets: &[SlotTarget],
    namespaces: &[BoundNamespace],
    options: &LiftOptions,
    sink: &mut DiagnosticSink,
) -> SynthesisOutput {
    let mut output = SynthesisOutput::default();
    let mut name_counters: HashMap<String, u32> = HashMap::new();

    for target in targets {
        if target.uses.is_empty() {
            continue;
        }
        if target.kind == SlotKind::AttributeValue {
            sink.error(
                ERR_ATTR_VALUE,
                target.slot_span,
                "State accessor used as an attribute value cannot be lifted. \
                 Transform the consuming component instead, use a two-way binding prop \
                 if the component provides one, or pass the unwrapped snapshot value."
                    .to_string(),
            );
            continue;
        }
        if target.inside_callback_boundary {
            sink.warning(
                WARN_CALLBACK,
                target.slot_span,
                "State accessor referenced inside an isolated single-expression callback \
                 cannot be lifted; the expression is left untransformed."
                    .to_string(),
            );
            continue;
        }
        let unit = synthesize_one(source_text, target, namespaces, options, &mut name_counters, &mut output);
        output.units.push(unit);
    }

    output
}

lazy_static! {
    // Canonical names can come from string-literal imports, so anything
    // outside the identifier alphabet is folded to '_' before it reaches a
    // generated name.
    static ref NON_IDENT: Regex = Regex::new(r"[^A-Za-z0-9_$]").unwrap();
}

fn ident_safe(name: &str) -> String {
    NON_IDENT.replace_all(name, "_").into_owned()
}

fn synthesize_one(
    source_text: &str,
    target: &SlotTarget,
    namespaces: &[BoundNamespace],
    options: &LiftOptions,
    name_counters: &mut HashMap<String, u32>,
    output: &mut SynthesisOutput,
) -> SynthesizedUnit {
    // `targets` arrive in source order, so per-base indices increase in
    // source order too.
    let first = &target.uses[0];
    let base = format!(
        "{}_{}_{}",
        options.unit_prefix,
        ident_safe(&namespaces[first.namespace].canonical_name),
        ident_safe(&first.accessor_name)
    );
    let index = name_counters.entry(base.clone()).or_insert(0);
    let generated_name = format!("{}_{}", base, *index);
    *index += 1;

    // One context resolution per distinct namespace, in order of first use.
    // The first use's descriptor decides the context identifier.
    let mut resolutions: Vec<(usize, String, String)> = Vec::new(); // (ns, var, ident)
    for u in &target.uses {
        if resolutions.iter().any(|(ns, _, _)| *ns == u.namespace) {
            continue;
        }
        let mut var = format!(
            "{}Ctx",
            ident_safe(&lower_first(&namespaces[u.namespace].canonical_name))
        );
        while resolutions.iter().any(|(_, v, _)| *v == var) {
            var.push('_');
        }
        resolutions.push((u.namespace, var, u.context_ident.clone()));

        output
            .required_imports
            .entry(u.context_import_source.clone())
            .or_default()
            .insert(u.context_ident.clone());
    }
    output
        .required_imports
        .entry(options.runtime_module().to_string())
        .or_default()
        .insert(options.boundary_constructor.clone());
    output
        .required_imports
        .entry(options.runtime_module().to_string())
        .or_default()
        .insert(options.context_resolver.clone());

    // Reproduce the slot expression, replacing accessor spans in reverse so
    // earlier offsets stay valid.
    let expr_start = target.expr_span.start as usize;
    let mut expr_text =
        source_text[expr_start..target.expr_span.end as usize].to_string();
    for u in target.uses.iter().rev() {
        let var = resolutions
            .iter()
            .find(|(ns, _, _)| *ns == u.namespace)
            .map(|(_, v, _)| v.as_str())
            .unwrap_or_default();
        let replacement = format!("{}.{}", var, u.context_field);
        expr_text.replace_range(
            (u.span.start as usize - expr_start)..(u.span.end as usize - expr_start),
            &replacement,
        );
    }

    let mut declaration = format!(
        "const {} = {}(() => {{\n",
        generated_name, options.boundary_constructor
    );
    for (_, var, ident) in &resolutions {
        declaration.push_str(&format!(
            "    const {} = {}({});\n",
            var, options.context_resolver, ident
        ));
    }
    declaration.push_str(&format!("    return <>{{{}}}</>;\n}});", expr_text));

    SynthesizedUnit {
        generated_name,
        slot_span: target.slot_span,
        declaration,
    }
}
