//! End-to-end session walkthrough against a scripted generator: one idea
//! taken from raw sentence to a launched plan with features, build briefs,
//! and an export.

use blueprint_core::export::{ExportFormat, Exporter, MarkupExporter};
use blueprint_core::gate::Phase;
use blueprint_core::plan::Impact;
use blueprint_core::section::SectionId;
use blueprint_core::session::{PlanSession, SessionError, StagedResult};
use blueprint_test_utils::{ScriptedGenerator, payloads};

#[tokio::test]
async fn idea_to_launch() {
    let generator = ScriptedGenerator::new()
        .push_ok(payloads::improvements())
        .push_ok(payloads::market_validation())
        .push_ok(payloads::persona())
        .push_ok(payloads::pricing())
        .push_ok(payloads::tech_stacks())
        .push_ok(payloads::feature_suggestions())
        .push_ok(payloads::prompt())
        .push_ok(payloads::design_document());
    let mut session = PlanSession::new(Box::new(generator));
    assert_eq!(session.phase(), Phase::Setup);

    // Foundations: each generation is reviewed before it merges.
    session.start_plan("Meal planner for students").unwrap();
    assert_eq!(session.phase(), Phase::Foundations);

    session.improve_idea().await.unwrap();
    assert!(matches!(session.staged(), Some(StagedResult::Improvements(_))));
    session.accept_improvements(None).unwrap();
    assert_eq!(session.plan().unwrap().idea_improvements.len(), 5);

    session.request_market_validation().await.unwrap();
    session.accept_market_validation(None).unwrap();

    session.generate_persona().await.unwrap();
    session.accept_persona(None).unwrap();
    assert_eq!(session.plan().unwrap().personas[0].name, "Alex");

    session.outline_pricing().await.unwrap();
    session.accept_pricing(None).unwrap();
    assert_eq!(session.plan().unwrap().pricing.len(), 3);

    session.recommend_tech_stack().await.unwrap();
    session.choose_tech_stack(1).unwrap();
    assert_eq!(
        session.plan().unwrap().tech_stack.as_ref().unwrap().category,
        "Best for full-stack web apps"
    );

    // The MVP checklist is a template, not a generation.
    session.generate_mvp_plan().unwrap();
    assert_eq!(session.phase(), Phase::Features);
    let ids: Vec<u32> = session.plan().unwrap().mvp_plan.iter().map(|s| s.id).collect();
    assert_eq!(ids, vec![1, 2, 3, 4, 5, 6]);

    // Features merge in place after unlocking the section.
    session.set_locked(SectionId::Features, false);
    session.add_custom_feature("Dark mode").unwrap();
    session.suggest_features().await.unwrap();
    let features = &session.plan().unwrap().features;
    assert_eq!(features.len(), 4);
    assert_eq!(features[0].impact, Impact::Medium);

    // A build brief lands back on its step.
    session.set_locked(SectionId::MvpPlan, false);
    let brief = session.generate_mvp_step_prompt(1, false).await.unwrap();
    assert!(!brief.context.is_empty());
    assert!(session.plan().unwrap().mvp_plan[0].prompt.is_some());

    session.generate_design_doc().await.unwrap();
    session.accept_design_document().unwrap();
    assert!(session.design_document().is_some());

    // Export walks the populated sections.
    let bytes = MarkupExporter
        .export(session.plan().unwrap(), ExportFormat::Markdown)
        .unwrap();
    let text = String::from_utf8(bytes).unwrap();
    assert!(text.contains("# App Plan: Meal planner for students"));
    assert!(text.contains("## Customer Persona: Alex"));
    assert!(text.contains("Dark mode"));

    session.mark_launched().unwrap();
    assert_eq!(session.phase(), Phase::Launch);
}

#[tokio::test]
async fn malformed_response_fails_the_operation_only() {
    let generator = ScriptedGenerator::new()
        // Wrong shape for the improvements contract.
        .push_ok(serde_json::json!({ "improvements": "not a list" }))
        .push_ok(payloads::improvements());
    let mut session = PlanSession::new(Box::new(generator));
    session.start_plan("Meal planner for students").unwrap();

    let err = session.improve_idea().await.unwrap_err();
    assert!(matches!(err, SessionError::Generation(_)));

    // The plan is exactly as it was and the session is not stuck busy.
    assert!(session.plan().unwrap().idea_improvements.is_empty());
    assert!(session.staged().is_none());
    assert!(!session.busy());

    // Retrying with a well-formed response succeeds.
    session.improve_idea().await.unwrap();
    session.accept_improvements(None).unwrap();
    assert_eq!(session.plan().unwrap().idea_improvements.len(), 5);
}
