//! End-to-End Pass Tests
//!
//! Each test feeds one markup source through `transform_source` and checks
//! the rewritten text and diagnostics against the lifting invariants:
//! pass-through when nothing is liftable, slot-granular extraction,
//! alias/destructure equivalence, failure containment, and idempotence.

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use crate::cache::TransformCache;
    use crate::diagnostics::{
        Severity, ERR_ATTR_VALUE, ERR_NESTED_DESTRUCTURE, ERR_PARSE, WARN_CALLBACK,
        WARN_REASSIGNED,
    };
    use crate::options::{ClassifierStrategy, LiftOptions, RegistryEntry};
    use crate::pass::{transform_file, transform_source, TransformOutcome, TransformResult};

    fn lift(source: &str) -> TransformResult {
        transform_source("panel.tsx", source, &LiftOptions::default())
    }

    fn rewritten(result: &TransformResult) -> &str {
        match &result.outcome {
            TransformOutcome::Rewritten { code, .. } => code,
            TransformOutcome::Unchanged => panic!(
                "expected a rewrite, got Unchanged; diagnostics: {:?}",
                result.diagnostics
            ),
        }
    }

    fn assert_unchanged(result: &TransformResult) {
        assert!(
            matches!(result.outcome, TransformOutcome::Unchanged),
            "expected Unchanged, got a rewrite; diagnostics: {:?}",
            result.diagnostics
        );
    }

    const SINGLE_SLOT: &str = r#"import { Accordion } from "@zenith/kit";

export function Panel() {
    return (
        <Accordion.Root>
            <span>{Accordion.GetExpanded ? "open" : "closed"}</span>
        </Accordion.Root>
    );
}
"#;

    // ═══════════════════════════════════════════════════════════════════════════════
    // PASS-THROUGH CASES
    // ═══════════════════════════════════════════════════════════════════════════════

    #[test]
    fn test_no_kit_import_passes_through() {
        let result = lift("export function Panel() {\n    return <div>hello</div>;\n}\n");
        assert_unchanged(&result);
        assert!(result.diagnostics.is_empty(), "expected no diagnostics");
    }

    #[test]
    fn test_namespace_used_only_structurally() {
        let source = r#"import { Accordion } from "@zenith/kit";

export function Panel() {
    return (
        <Accordion.Root>
            <Accordion.Item>static</Accordion.Item>
        </Accordion.Root>
    );
}
"#;
        let result = lift(source);
        assert_unchanged(&result);
        assert!(result.diagnostics.is_empty(), "expected no diagnostics");
    }

    #[test]
    fn test_non_markup_extension_skipped() {
        let result = transform_source("panel.ts", SINGLE_SLOT, &LiftOptions::default());
        assert_unchanged(&result);
        assert!(result.diagnostics.is_empty());
    }

    #[test]
    fn test_parse_error_reported() {
        let result = lift("import { from ;;; <<<");
        assert_unchanged(&result);
        assert!(result.has_errors());
        assert!(result.diagnostics.iter().any(|d| d.code == ERR_PARSE));
    }

    #[test]
    fn test_parse_error_carries_source_span() {
        let source = "const a = 1;\nconst b = ;\n";
        let result = lift(source);
        assert_unchanged(&result);
        let diag = result
            .diagnostics
            .iter()
            .find(|d| d.code == ERR_PARSE)
            .expect("parse diagnostic");
        // The span points into the malformed second line, not at offset 0.
        assert!(
            diag.span.start as usize >= 13,
            "span should point at the malformed text, got: {:?}",
            diag.span
        );
        assert!((diag.span.end as usize) <= source.len());
    }

    // ═══════════════════════════════════════════════════════════════════════════════
    // SLOT EXTRACTION
    // ═══════════════════════════════════════════════════════════════════════════════

    #[test]
    fn test_single_slot_lifted() {
        let result = lift(SINGLE_SLOT);
        let code = rewritten(&result);
        assert!(result.diagnostics.is_empty(), "expected no diagnostics");

        // The slot becomes a self-closing reference to the unit.
        assert!(
            code.contains("<span><Lifted_Accordion_GetExpanded_0 /></span>"),
            "slot not replaced, got: {}",
            code
        );
        assert!(
            !code.contains("{Accordion.GetExpanded"),
            "original slot text survived, got: {}",
            code
        );

        // The unit resolves its own context and reproduces the expression.
        assert!(code.contains("const Lifted_Accordion_GetExpanded_0 = defineBoundary(() => {"));
        assert!(code.contains("const accordionCtx = readContext(AccordionContext);"));
        assert!(code.contains(r#"return <>{accordionCtx.expanded ? "open" : "closed"}</>;"#));

        // Runtime helpers and the context ident are imported once.
        assert!(
            code.contains(
                r#"import { AccordionContext, defineBoundary, readContext } from "@zenith/kit";"#
            ),
            "injected import missing, got: {}",
            code
        );

        // Declarations land between the imports and the host component.
        let decl_at = code.find("const Lifted_Accordion_GetExpanded_0").unwrap();
        assert!(code.find("import { Accordion }").unwrap() < decl_at);
        assert!(decl_at < code.find("export function Panel").unwrap());
    }

    #[test]
    fn test_repeated_accessor_slots_get_increasing_indices() {
        let source = r#"import { Accordion } from "@zenith/kit";

export function Panel() {
    return (
        <div>
            <b>{Accordion.GetExpanded}</b>
            <i>{Accordion.GetExpanded}</i>
        </div>
    );
}
"#;
        let result = lift(source);
        let code = rewritten(&result);
        let first = code.find("<b><Lifted_Accordion_GetExpanded_0 /></b>");
        let second = code.find("<i><Lifted_Accordion_GetExpanded_1 /></i>");
        assert!(first.is_some(), "first slot not replaced, got: {}", code);
        assert!(second.is_some(), "second slot not replaced, got: {}", code);
        assert!(first.unwrap() < second.unwrap(), "indices out of source order");
    }

    #[test]
    fn test_distinct_accessors_count_independently() {
        let source = r#"import { Accordion } from "@zenith/kit";

export function Panel() {
    return (
        <div>
            <b>{Accordion.GetExpanded}</b>
            <i>{Accordion.GetDisabled}</i>
        </div>
    );
}
"#;
        let result = lift(source);
        let code = rewritten(&result);
        assert!(code.contains("<Lifted_Accordion_GetExpanded_0 />"));
        assert!(code.contains("<Lifted_Accordion_GetDisabled_0 />"));
    }

    #[test]
    fn test_rewrite_stops_at_accessor_boundary() {
        let source = r#"import { Accordion } from "@zenith/kit";

export function Panel() {
    return <div>{Accordion.GetItems.length}</div>;
}
"#;
        let result = lift(source);
        let code = rewritten(&result);
        // The chain past the accessor is reproduced untouched.
        assert!(code.contains("return <>{accordionCtx.items.length}</>;"), "got: {}", code);
        assert!(code.contains("<Lifted_Accordion_GetItems_0 />"));
    }

    #[test]
    fn test_namespace_star_import_form() {
        let source = r#"import * as Accordion from "@zenith/kit";

export function Panel() {
    return <div>{Accordion.GetExpanded}</div>;
}
"#;
        let result = lift(source);
        let code = rewritten(&result);
        assert!(code.contains("<Lifted_Accordion_GetExpanded_0 />"));
        assert!(code.contains("readContext(AccordionContext)"));
    }

    #[test]
    fn test_renamed_import_uses_canonical_names() {
        let source = r#"import { Accordion as A } from "@zenith/kit";

export function Panel() {
    return <div>{A.GetExpanded}</div>;
}
"#;
        let result = lift(source);
        let code = rewritten(&result);
        // Generated names and the context follow the library's name for the
        // namespace, not the local rename.
        assert!(code.contains("<Lifted_Accordion_GetExpanded_0 />"), "got: {}", code);
        assert!(code.contains("const accordionCtx = readContext(AccordionContext);"));
        assert!(code.contains("return <>{accordionCtx.expanded}</>;"));
    }

    #[test]
    fn test_existing_imports_not_duplicated() {
        let source = r#"import { Accordion, AccordionContext, defineBoundary, readContext } from "@zenith/kit";

export function Panel() {
    return <div>{Accordion.GetExpanded}</div>;
}
"#;
        let result = lift(source);
        let code = rewritten(&result);
        assert_eq!(
            code.matches(r#"from "@zenith/kit""#).count(),
            1,
            "duplicate import injected, got: {}",
            code
        );
        assert!(code.contains("<Lifted_Accordion_GetExpanded_0 />"));
    }

    // ═══════════════════════════════════════════════════════════════════════════════
    // ALIASES AND DESTRUCTURING
    // ═══════════════════════════════════════════════════════════════════════════════

    #[test]
    fn test_direct_alias_matches_inline_form() {
        let source = r#"import { Accordion } from "@zenith/kit";

export function Panel() {
    const expanded = Accordion.GetExpanded;
    return <div>{expanded ? "open" : "closed"}</div>;
}
"#;
        let result = lift(source);
        let code = rewritten(&result);
        assert!(code.contains("<div><Lifted_Accordion_GetExpanded_0 /></div>"), "got: {}", code);
        assert!(code.contains(r#"return <>{accordionCtx.expanded ? "open" : "closed"}</>;"#));
    }

    #[test]
    fn test_destructured_accessor_lifted() {
        let source = r#"import { Accordion } from "@zenith/kit";

export function Panel() {
    const { GetExpanded } = Accordion;
    return <div>{GetExpanded}</div>;
}
"#;
        let result = lift(source);
        let code = rewritten(&result);
        assert!(code.contains("<div><Lifted_Accordion_GetExpanded_0 /></div>"), "got: {}", code);
        assert!(code.contains("return <>{accordionCtx.expanded}</>;"));
    }

    #[test]
    fn test_renamed_destructured_accessor_lifted() {
        let source = r#"import { Accordion } from "@zenith/kit";

export function Panel() {
    const { GetExpanded: open } = Accordion;
    return <div>{open}</div>;
}
"#;
        let result = lift(source);
        let code = rewritten(&result);
        assert!(code.contains("<div><Lifted_Accordion_GetExpanded_0 /></div>"), "got: {}", code);
        assert!(code.contains("return <>{accordionCtx.expanded}</>;"));
    }

    #[test]
    fn test_nested_destructure_aborts_file() {
        let source = r#"import { Accordion } from "@zenith/kit";

export function Panel() {
    const { GetExpanded: { deep } } = Accordion;
    return <div>{Accordion.GetDisabled}</div>;
}
"#;
        let result = lift(source);
        // The valid slot in the same file must not be rewritten either.
        assert_unchanged(&result);
        assert!(result.has_errors());
        let diag = result
            .diagnostics
            .iter()
            .find(|d| d.code == ERR_NESTED_DESTRUCTURE)
            .expect("nested destructure diagnostic");
        assert_eq!(diag.severity, Severity::Error);
        assert!(diag.message.contains("Accordion.GetExpanded"), "got: {}", diag.message);
    }

    #[test]
    fn test_reassigned_alias_lifts_only_earlier_uses() {
        let source = r#"import { Accordion } from "@zenith/kit";

export function Panel() {
    let flag = Accordion.GetExpanded;
    const early = <span>{flag}</span>;
    flag = false;
    return <div>{flag}{early}</div>;
}
"#;
        let result = lift(source);
        let code = rewritten(&result);
        assert!(
            code.contains("<span><Lifted_Accordion_GetExpanded_0 /></span>"),
            "pre-reassignment use not lifted, got: {}",
            code
        );
        assert!(
            code.contains("<div>{flag}{early}</div>"),
            "post-reassignment use must stay, got: {}",
            code
        );
        let warn = result
            .diagnostics
            .iter()
            .find(|d| d.code == WARN_REASSIGNED)
            .expect("reassignment warning");
        assert_eq!(warn.severity, Severity::Warning);
        assert!(!result.has_errors());
    }

    // ═══════════════════════════════════════════════════════════════════════════════
    // REJECTED POSITIONS
    // ═══════════════════════════════════════════════════════════════════════════════

    #[test]
    fn test_attribute_value_rejected_with_alternatives() {
        let source = r#"import { Accordion } from "@zenith/kit";

export function Panel() {
    return <Accordion.Trigger disabled={Accordion.GetExpanded} />;
}
"#;
        let result = lift(source);
        assert_unchanged(&result);
        let diag = result
            .diagnostics
            .iter()
            .find(|d| d.code == ERR_ATTR_VALUE)
            .expect("attribute-value diagnostic");
        assert_eq!(diag.severity, Severity::Error);
        assert!(diag.message.contains("two-way binding"), "got: {}", diag.message);
    }

    #[test]
    fn test_attribute_error_does_not_block_other_slots() {
        let source = r#"import { Accordion } from "@zenith/kit";

export function Panel() {
    return (
        <Accordion.Root>
            <Accordion.Trigger disabled={Accordion.GetDisabled} />
            <div>{Accordion.GetExpanded}</div>
        </Accordion.Root>
    );
}
"#;
        let result = lift(source);
        let code = rewritten(&result);
        assert!(code.contains("<div><Lifted_Accordion_GetExpanded_0 /></div>"), "got: {}", code);
        // The rejected attribute usage stays exactly as written.
        assert!(code.contains("disabled={Accordion.GetDisabled}"));
        assert!(result.diagnostics.iter().any(|d| d.code == ERR_ATTR_VALUE));
    }

    #[test]
    fn test_callback_boundary_use_warns_and_stays() {
        let source = r#"import { Accordion } from "@zenith/kit";

export function Panel() {
    return <div>{snippet(() => Accordion.GetExpanded)}</div>;
}
"#;
        let result = lift(source);
        assert_unchanged(&result);
        assert!(!result.has_errors());
        let warn = result
            .diagnostics
            .iter()
            .find(|d| d.code == WARN_CALLBACK)
            .expect("callback warning");
        assert_eq!(warn.severity, Severity::Warning);
    }

    #[test]
    fn test_mixed_callback_slot_flagged_whole() {
        let source = r#"import { Accordion } from "@zenith/kit";

export function Panel() {
    return <div>{Accordion.GetExpanded && snippet(() => Accordion.GetDisabled)}</div>;
}
"#;
        let result = lift(source);
        assert_unchanged(&result);
        assert!(result.diagnostics.iter().any(|d| d.code == WARN_CALLBACK));
    }

    #[test]
    fn test_statement_level_callback_use_warns() {
        let source = r#"import { Accordion } from "@zenith/kit";

const v = snippet(() => Accordion.GetExpanded);
"#;
        let result = lift(source);
        assert_unchanged(&result);
        assert!(!result.has_errors());
        let warn = result
            .diagnostics
            .iter()
            .find(|d| d.code == WARN_CALLBACK)
            .expect("callback warning");
        assert_eq!(warn.severity, Severity::Warning);
    }

    #[test]
    fn test_slot_wholly_inside_callback_is_lifted() {
        let source = r#"import { Accordion } from "@zenith/kit";

const v = snippet(() => <b>{Accordion.GetExpanded}</b>);
"#;
        let result = lift(source);
        // The container and its use sit at the same callback depth, so the
        // unit resolves context below the callback's render point and the
        // lift is sound.
        let code = rewritten(&result);
        assert!(
            code.contains("snippet(() => <b><Lifted_Accordion_GetExpanded_0 /></b>)"),
            "got: {}",
            code
        );
        assert!(result.diagnostics.is_empty(), "got: {:?}", result.diagnostics);
    }

    // ═══════════════════════════════════════════════════════════════════════════════
    // MULTI-NAMESPACE AND STRATEGY VARIANTS
    // ═══════════════════════════════════════════════════════════════════════════════

    #[test]
    fn test_two_namespaces_resolve_two_contexts() {
        let source = r#"import { Accordion, Tabs } from "@zenith/kit";

export function Panel() {
    return <div>{Accordion.GetExpanded && Tabs.GetSelected}</div>;
}
"#;
        let result = lift(source);
        let code = rewritten(&result);
        assert!(code.contains("const accordionCtx = readContext(AccordionContext);"));
        assert!(code.contains("const tabsCtx = readContext(TabsContext);"));
        assert!(code.contains("return <>{accordionCtx.expanded && tabsCtx.selected}</>;"));
        // Unit is named after the first use in the slot.
        assert!(code.contains("<Lifted_Accordion_GetExpanded_0 />"));
    }

    #[test]
    fn test_registry_strategy_end_to_end() {
        let mut props = BTreeMap::new();
        props.insert(
            "Expanded".to_string(),
            RegistryEntry {
                context_field: "isExpanded".to_string(),
                context_ident: "AccordionStateContext".to_string(),
                import_source: "@zenith/kit/accordion".to_string(),
                derived: true,
            },
        );
        let mut namespaces = BTreeMap::new();
        namespaces.insert("Accordion".to_string(), props);
        let options = LiftOptions {
            strategy: ClassifierStrategy::Registry { namespaces },
            ..LiftOptions::default()
        };

        let source = r#"import { Accordion } from "@zenith/kit";

export function Panel() {
    return <div>{Accordion.Expanded}</div>;
}
"#;
        let result = transform_source("panel.tsx", source, &options);
        let code = rewritten(&result);
        assert!(code.contains("<Lifted_Accordion_Expanded_0 />"));
        assert!(code.contains("const accordionCtx = readContext(AccordionStateContext);"));
        assert!(code.contains("return <>{accordionCtx.isExpanded}</>;"));
        assert!(code.contains(r#"import { AccordionStateContext } from "@zenith/kit/accordion";"#));
        assert!(code.contains(r#"import { defineBoundary, readContext } from "@zenith/kit";"#));
    }

    // ═══════════════════════════════════════════════════════════════════════════════
    // IDEMPOTENCE AND POSITION MAP
    // ═══════════════════════════════════════════════════════════════════════════════

    #[test]
    fn test_cache_never_serves_across_option_changes() {
        let path = std::env::temp_dir().join(format!("lift-options-{}.tsx", std::process::id()));
        std::fs::write(&path, SINGLE_SLOT).unwrap();
        let path = path.to_str().unwrap().to_string();

        let cache = TransformCache::new();
        let first = transform_file(&path, &LiftOptions::default(), &cache);
        assert!(
            matches!(first.outcome, TransformOutcome::Rewritten { .. }),
            "expected a rewrite under default options"
        );

        // Under a configuration that does not recognize the import, the same
        // source must re-analyze to Unchanged instead of hitting the entry
        // cached above.
        let other = LiftOptions {
            module_specifiers: vec!["@other/kit".to_string()],
            ..LiftOptions::default()
        };
        let second = transform_file(&path, &other, &cache);
        assert_unchanged(&second);

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_idempotent_on_own_output() {
        let first = lift(SINGLE_SLOT);
        let code = rewritten(&first).to_string();
        let second = lift(&code);
        assert_unchanged(&second);
        assert!(second.diagnostics.is_empty(), "got: {:?}", second.diagnostics);
    }

    #[test]
    fn test_position_map_tracks_copied_text() {
        let result = lift(SINGLE_SLOT);
        let (code, map) = match &result.outcome {
            TransformOutcome::Rewritten { code, map } => (code, map),
            TransformOutcome::Unchanged => panic!("expected a rewrite"),
        };
        let needle = "<Accordion.Root>";
        let out_pos = code.find(needle).unwrap() as u32;
        let src_pos = map.original_offset(out_pos).expect("offset maps back") as usize;
        assert_eq!(&SINGLE_SLOT[src_pos..src_pos + needle.len()], needle);
    }
}
