//! # Section Enforcement
//!
//! Guarantees that a report contains every section its tier pair requires,
//! whatever the generator returned. Missing sections get a placeholder;
//! present sections are left byte-for-byte alone.
//!
//! Enforcement is idempotent: running it on its own output injects nothing.

use diiac_core::TierRequirement;

use crate::report::{GovernedReport, Section};

/// The note carried by a placeholder section.
pub fn placeholder_note(requirement: &TierRequirement) -> String {
    format!(
        "Section required by {} but not provided by AI",
        requirement.label()
    )
}

/// Inject placeholders for every required section absent from `report`.
///
/// Returns the names of the injected sections in requirement order.
pub fn enforce(report: &mut GovernedReport, requirement: &TierRequirement) -> Vec<String> {
    let note = placeholder_note(requirement);
    let mut enforced = Vec::new();
    for section in requirement.sections() {
        let inserted = report.insert_if_absent(
            section,
            Section::Enforced {
                note: note.clone(),
            },
        );
        if inserted {
            enforced.push((*section).to_string());
        }
    }
    if !enforced.is_empty() {
        tracing::debug!(
            tier = %requirement.label(),
            enforced = ?enforced,
            "injected placeholder sections"
        );
    }
    enforced
}

#[cfg(test)]
mod tests {
    use super::*;
    use diiac_core::tier::sections::*;
    use diiac_core::{PolicyLevel, ReasoningLevel, TierPolicy};
    use serde_json::json;

    #[test]
    fn apac_scenario_enforces_strategic_context() {
        let req = TierPolicy::required_sections(ReasoningLevel::R2, PolicyLevel::P1);
        let mut report = GovernedReport::from_value(json!({
            "executive_summary": "Enter Singapore first, then Japan."
        }))
        .unwrap();

        let enforced = enforce(&mut report, &req);

        assert_eq!(enforced, vec![STRATEGIC_CONTEXT.to_string()]);
        assert_eq!(
            report.get(STRATEGIC_CONTEXT),
            Some(&Section::Enforced {
                note: "Section required by R2/P1 but not provided by AI".into()
            })
        );
        assert_eq!(
            report.get(EXECUTIVE_SUMMARY),
            Some(&Section::AiAuthored(json!(
                "Enter Singapore first, then Japan."
            )))
        );
    }

    #[test]
    fn forged_placeholder_from_generator_is_kept_as_content() {
        let req = TierPolicy::required_sections(ReasoningLevel::R2, PolicyLevel::P1);
        let forged = json!({"enforced": true, "note": placeholder_note(&req)});
        let mut report = GovernedReport::from_value(json!({
            "executive_summary": "Go.",
            "strategic_context": forged.clone()
        }))
        .unwrap();

        let enforced = enforce(&mut report, &req);

        assert!(enforced.is_empty());
        assert_eq!(report.get(STRATEGIC_CONTEXT), Some(&Section::AiAuthored(forged)));
    }

    #[test]
    fn empty_r5_p5_report_gets_eleven_placeholders() {
        let req = TierPolicy::required_sections(ReasoningLevel::R5, PolicyLevel::P5);
        let mut report = GovernedReport::empty();

        let enforced = enforce(&mut report, &req);

        assert_eq!(enforced.len(), 11);
        assert_eq!(enforced.last().map(String::as_str), Some(TRACE_MANIFEST));
        assert!(report.iter().all(|(_, s)| s.is_enforced()));
    }

    #[test]
    fn enforcement_is_idempotent() {
        let req = TierPolicy::required_sections(ReasoningLevel::R4, PolicyLevel::P3);
        let mut report = GovernedReport::from_value(json!({"market_analysis": "ok"})).unwrap();

        enforce(&mut report, &req);
        let once = report.clone();
        let second = enforce(&mut report, &req);

        assert!(second.is_empty());
        assert_eq!(report, once);
    }

    #[test]
    fn extra_ai_sections_are_kept() {
        let req = TierPolicy::required_sections(ReasoningLevel::R0, PolicyLevel::P0);
        let mut report = GovernedReport::from_value(json!({
            "executive_summary": "x",
            "appendix": {"notes": []}
        }))
        .unwrap();

        assert!(enforce(&mut report, &req).is_empty());
        assert!(report.contains("appendix"));
    }

    #[test]
    fn null_section_is_enforced() {
        let req = TierPolicy::required_sections(ReasoningLevel::R1, PolicyLevel::P4);
        let mut report = GovernedReport::from_value(json!({
            "executive_summary": null,
            "audit_trail": []
        }))
        .unwrap();

        assert_eq!(enforce(&mut report, &req), vec![EXECUTIVE_SUMMARY.to_string()]);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use diiac_core::{PolicyLevel, ReasoningLevel, TierPolicy};
    use proptest::prelude::*;

    fn tier() -> impl Strategy<Value = (ReasoningLevel, PolicyLevel)> {
        (0usize..6, 0usize..6).prop_map(|(r, p)| (ReasoningLevel::ALL[r], PolicyLevel::ALL[p]))
    }

    proptest! {
        /// After enforcement every required section is present and every
        /// section the generator supplied is unchanged.
        #[test]
        fn enforcement_completes_without_altering(
            (r, p) in tier(),
            supplied in prop::collection::btree_map(
                prop::sample::select(vec![
                    "executive_summary", "strategic_context", "market_analysis",
                    "risk_matrix", "financial_model", "audit_trail", "trace_manifest", "extra",
                ]),
                "[a-z ]{0,20}",
                0..8,
            ),
        ) {
            let req = TierPolicy::required_sections(r, p);
            let value = serde_json::Value::Object(
                supplied.iter().map(|(k, v)| (k.to_string(), serde_json::json!(v))).collect(),
            );
            let original = GovernedReport::from_value(value).unwrap();
            let mut report = original.clone();

            let enforced = enforce(&mut report, &req);

            for s in req.sections() {
                prop_assert!(report.contains(s));
            }
            for (name, section) in original.iter() {
                prop_assert_eq!(report.get(name), Some(section));
            }
            for name in &enforced {
                prop_assert!(!original.contains(name));
            }
        }
    }
}
