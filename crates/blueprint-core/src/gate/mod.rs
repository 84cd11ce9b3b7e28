//! Phase classification and the per-action gate.
//!
//! The gate is the sole invariant-enforcement point while the action graph
//! is traversed: the plan model itself permits any field combination, and
//! every predicate here is a pure function of the document, so the whole
//! module is trivially unit-testable.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::plan::PlanDocument;

// ---------------------------------------------------------------------------
// Phase
// ---------------------------------------------------------------------------

/// Progress classification of a planning session.
///
/// Derived, never stored on the plan. `Launch` is the exception: it is
/// entered only by an explicit signal (the `launched` argument to
/// [`phase`]) and never computed backward from plan data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Setup,
    Foundations,
    Features,
    Launch,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Setup => "Setup",
            Self::Foundations => "Foundations",
            Self::Features => "Features",
            Self::Launch => "Launch",
        };
        f.write_str(s)
    }
}

impl FromStr for Phase {
    type Err = PhaseParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Setup" => Ok(Self::Setup),
            "Foundations" => Ok(Self::Foundations),
            "Features" => Ok(Self::Features),
            "Launch" => Ok(Self::Launch),
            other => Err(PhaseParseError(other.to_owned())),
        }
    }
}

/// Error returned when parsing an invalid [`Phase`] string.
#[derive(Debug, Clone)]
pub struct PhaseParseError(pub String);

impl fmt::Display for PhaseParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid phase: {:?}", self.0)
    }
}

impl std::error::Error for PhaseParseError {}

/// Classify the current phase.
///
/// Setup while no document exists; Launch once the explicit signal is set;
/// Features once the MVP plan is populated; Foundations otherwise.
pub fn phase(plan: Option<&PlanDocument>, launched: bool) -> Phase {
    match plan {
        None => Phase::Setup,
        Some(_) if launched => Phase::Launch,
        Some(p) if !p.mvp_plan.is_empty() => Phase::Features,
        Some(_) => Phase::Foundations,
    }
}

// ---------------------------------------------------------------------------
// Actions
// ---------------------------------------------------------------------------

/// Every user-triggerable action in the planning graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Generate three idea candidates for a category (Setup only).
    GenerateIdeas,
    /// Generate a random idea plus category to seed the Setup inputs.
    Inspire,
    ImproveIdea,
    MarketValidation,
    AddPersona,
    OutlinePricing,
    RecommendTechStack,
    GenerateMvpPlan,
    GenerateDesignDoc,
    SuggestFeatures,
    AddCustomFeature,
    MvpStepPrompt,
    FeaturePrompt,
}

impl Action {
    /// All actions, in graph order.
    pub const ALL: [Action; 13] = [
        Action::GenerateIdeas,
        Action::Inspire,
        Action::ImproveIdea,
        Action::MarketValidation,
        Action::AddPersona,
        Action::OutlinePricing,
        Action::RecommendTechStack,
        Action::GenerateMvpPlan,
        Action::GenerateDesignDoc,
        Action::SuggestFeatures,
        Action::AddCustomFeature,
        Action::MvpStepPrompt,
        Action::FeaturePrompt,
    ];
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::GenerateIdeas => "generate-ideas",
            Self::Inspire => "inspire",
            Self::ImproveIdea => "improve-idea",
            Self::MarketValidation => "market-validation",
            Self::AddPersona => "add-persona",
            Self::OutlinePricing => "outline-pricing",
            Self::RecommendTechStack => "recommend-tech-stack",
            Self::GenerateMvpPlan => "generate-mvp-plan",
            Self::GenerateDesignDoc => "generate-design-doc",
            Self::SuggestFeatures => "suggest-features",
            Self::AddCustomFeature => "add-custom-feature",
            Self::MvpStepPrompt => "mvp-step-prompt",
            Self::FeaturePrompt => "feature-prompt",
        };
        f.write_str(s)
    }
}

/// Which persona gate rule is in force.
///
/// The two rules come from two observed schema versions of the planner and
/// differ meaningfully, so they are kept distinct rather than merged: the
/// single-persona variant disables "Add Persona" once one persona exists,
/// the plural variant keeps it enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PersonaMode {
    Single,
    #[default]
    Multi,
}

// ---------------------------------------------------------------------------
// Gate predicates
// ---------------------------------------------------------------------------

/// Whether an action is currently permitted for a plan.
///
/// Pure: depends only on the enumerated plan fields and the persona mode.
/// Setup-only actions ([`Action::GenerateIdeas`], [`Action::Inspire`]) are
/// never enabled once a plan exists; they are evaluated by the session on
/// `None` plans instead.
pub fn is_enabled(plan: &PlanDocument, action: Action, mode: PersonaMode) -> bool {
    match action {
        Action::GenerateIdeas | Action::Inspire => false,
        Action::ImproveIdea => plan.idea_improvements.is_empty(),
        Action::MarketValidation => {
            !plan.idea_improvements.is_empty() && plan.market_validation.is_none()
        }
        Action::AddPersona => {
            plan.market_validation.is_some()
                && (mode == PersonaMode::Multi || plan.personas.is_empty())
        }
        Action::OutlinePricing => !plan.personas.is_empty() && plan.pricing.is_empty(),
        Action::RecommendTechStack => !plan.pricing.is_empty() && plan.tech_stack.is_none(),
        Action::GenerateMvpPlan => plan.tech_stack.is_some() && plan.mvp_plan.is_empty(),
        Action::GenerateDesignDoc => !plan.mvp_plan.is_empty(),
        Action::SuggestFeatures | Action::AddCustomFeature => !plan.mvp_plan.is_empty(),
        // Prompt generation is keyed to an element that must already exist;
        // the per-element id check happens at dispatch.
        Action::MvpStepPrompt => !plan.mvp_plan.is_empty(),
        Action::FeaturePrompt => !plan.features.is_empty(),
    }
}

/// The set of actions currently enabled for a plan, in graph order.
pub fn enabled_actions(plan: &PlanDocument, mode: PersonaMode) -> Vec<Action> {
    Action::ALL
        .into_iter()
        .filter(|a| is_enabled(plan, *a, mode))
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::{
        MarketValidation, Persona, PlanPatch, PricingTier, TechStack, mvp_checklist,
    };

    fn validation() -> MarketValidation {
        MarketValidation {
            core_problem: "p".to_string(),
            founder_profile: "f".to_string(),
            community_research: vec![],
            competitors: vec![],
            differentiation: vec![],
            risk_assessment: "r".to_string(),
        }
    }

    fn persona(name: &str) -> Persona {
        Persona {
            name: name.to_string(),
            demographics: String::new(),
            psychographics: String::new(),
            bio: String::new(),
            goals: vec![],
            pain_points: vec![],
        }
    }

    fn stack() -> TechStack {
        TechStack {
            category: "c".to_string(),
            backend: "b".to_string(),
            database: "d".to_string(),
            authentication: "a".to_string(),
            payments: "p".to_string(),
            services: vec![],
        }
    }

    /// Build a plan populated up to a given depth of the prerequisite chain.
    fn plan_at(depth: usize) -> PlanDocument {
        let mut plan = PlanDocument::new("idea");
        if depth >= 1 {
            plan = plan.update(PlanPatch {
                idea_improvements: Some(vec!["i".to_string()]),
                ..Default::default()
            });
        }
        if depth >= 2 {
            plan = plan.update(PlanPatch {
                market_validation: Some(validation()),
                ..Default::default()
            });
        }
        if depth >= 3 {
            plan = plan.update(PlanPatch {
                personas: Some(vec![persona("Alex")]),
                ..Default::default()
            });
        }
        if depth >= 4 {
            plan = plan.update(PlanPatch {
                pricing: Some(vec![PricingTier {
                    name: "Free".to_string(),
                    price: "$0/mo".to_string(),
                    features: vec![],
                }]),
                ..Default::default()
            });
        }
        if depth >= 5 {
            plan = plan.update(PlanPatch {
                tech_stack: Some(stack()),
                ..Default::default()
            });
        }
        if depth >= 6 {
            plan = plan.update(PlanPatch {
                mvp_plan: Some(mvp_checklist()),
                ..Default::default()
            });
        }
        plan
    }

    #[test]
    fn phase_is_setup_without_a_plan() {
        assert_eq!(phase(None, false), Phase::Setup);
    }

    #[test]
    fn phase_foundations_until_mvp_plan_exists() {
        let plan = plan_at(5);
        assert_eq!(phase(Some(&plan), false), Phase::Foundations);
    }

    #[test]
    fn phase_features_once_mvp_plan_exists() {
        let plan = plan_at(6);
        assert_eq!(phase(Some(&plan), false), Phase::Features);
    }

    #[test]
    fn phase_launch_only_by_explicit_signal() {
        let plan = plan_at(6);
        assert_eq!(phase(Some(&plan), true), Phase::Launch);
        // Never derived from data alone.
        assert_ne!(phase(Some(&plan), false), Phase::Launch);
    }

    #[test]
    fn gate_is_deterministic() {
        let plan = plan_at(3);
        let first = enabled_actions(&plan, PersonaMode::Multi);
        let second = enabled_actions(&plan, PersonaMode::Multi);
        assert_eq!(first, second);
    }

    #[test]
    fn improve_idea_enabled_only_while_improvements_empty() {
        assert!(is_enabled(&plan_at(0), Action::ImproveIdea, PersonaMode::Multi));
        assert!(!is_enabled(&plan_at(1), Action::ImproveIdea, PersonaMode::Multi));
    }

    #[test]
    fn market_validation_unlocks_monotonically() {
        // Disabled before improvements exist.
        assert!(!is_enabled(&plan_at(0), Action::MarketValidation, PersonaMode::Multi));
        // Enabled for every state between improvements and validation.
        assert!(is_enabled(&plan_at(1), Action::MarketValidation, PersonaMode::Multi));
        // Disabled again once validation is set (idempotent re-check).
        assert!(!is_enabled(&plan_at(2), Action::MarketValidation, PersonaMode::Multi));
    }

    #[test]
    fn persona_gate_differs_by_mode() {
        let with_persona = plan_at(3);
        assert!(is_enabled(&with_persona, Action::AddPersona, PersonaMode::Multi));
        assert!(!is_enabled(&with_persona, Action::AddPersona, PersonaMode::Single));

        let without_persona = plan_at(2);
        assert!(is_enabled(&without_persona, Action::AddPersona, PersonaMode::Single));
    }

    #[test]
    fn pricing_requires_persona_and_empty_pricing() {
        assert!(!is_enabled(&plan_at(2), Action::OutlinePricing, PersonaMode::Multi));
        assert!(is_enabled(&plan_at(3), Action::OutlinePricing, PersonaMode::Multi));
        assert!(!is_enabled(&plan_at(4), Action::OutlinePricing, PersonaMode::Multi));
    }

    #[test]
    fn tech_stack_requires_pricing() {
        assert!(!is_enabled(&plan_at(3), Action::RecommendTechStack, PersonaMode::Multi));
        assert!(is_enabled(&plan_at(4), Action::RecommendTechStack, PersonaMode::Multi));
        assert!(!is_enabled(&plan_at(5), Action::RecommendTechStack, PersonaMode::Multi));
    }

    #[test]
    fn mvp_plan_requires_tech_stack() {
        assert!(!is_enabled(&plan_at(4), Action::GenerateMvpPlan, PersonaMode::Multi));
        assert!(is_enabled(&plan_at(5), Action::GenerateMvpPlan, PersonaMode::Multi));
        assert!(!is_enabled(&plan_at(6), Action::GenerateMvpPlan, PersonaMode::Multi));
    }

    #[test]
    fn feature_actions_follow_mvp_plan() {
        assert!(!is_enabled(&plan_at(5), Action::SuggestFeatures, PersonaMode::Multi));
        assert!(is_enabled(&plan_at(6), Action::SuggestFeatures, PersonaMode::Multi));
        assert!(is_enabled(&plan_at(6), Action::GenerateDesignDoc, PersonaMode::Multi));
        assert!(is_enabled(&plan_at(6), Action::AddCustomFeature, PersonaMode::Multi));
    }

    #[test]
    fn setup_actions_never_enabled_with_a_plan() {
        for depth in 0..=6 {
            let plan = plan_at(depth);
            assert!(!is_enabled(&plan, Action::GenerateIdeas, PersonaMode::Multi));
            assert!(!is_enabled(&plan, Action::Inspire, PersonaMode::Multi));
        }
    }

    #[test]
    fn phase_display_roundtrip() {
        for v in [Phase::Setup, Phase::Foundations, Phase::Features, Phase::Launch] {
            let parsed: Phase = v.to_string().parse().expect("should parse");
            assert_eq!(v, parsed);
        }
    }
}
