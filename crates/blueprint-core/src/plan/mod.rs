//! The plan document model.
//!
//! [`PlanDocument`] is the root aggregate: one evolving record describing an
//! app idea through every planning phase. The model is deliberately
//! permissive -- any combination of populated fields is representable, and
//! no validation happens here. Which mutations are currently *permitted* is
//! the gate evaluator's job ([`crate::gate`]); this module only knows how to
//! create a document and shallow-merge updates into it.

pub mod template;

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use template::mvp_checklist;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Expected impact of a feature on the product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Impact {
    High,
    Medium,
    Low,
}

impl fmt::Display for Impact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        };
        f.write_str(s)
    }
}

impl FromStr for Impact {
    type Err = ImpactParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "High" => Ok(Self::High),
            "Medium" => Ok(Self::Medium),
            "Low" => Ok(Self::Low),
            other => Err(ImpactParseError(other.to_owned())),
        }
    }
}

/// Error returned when parsing an invalid [`Impact`] string.
#[derive(Debug, Clone)]
pub struct ImpactParseError(pub String);

impl fmt::Display for ImpactParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid impact level: {:?}", self.0)
    }
}

impl std::error::Error for ImpactParseError {}

// ---------------------------------------------------------------------------
// Section records
// ---------------------------------------------------------------------------

/// Market validation report for the idea.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketValidation {
    pub core_problem: String,
    pub founder_profile: String,
    pub community_research: Vec<String>,
    pub competitors: Vec<String>,
    pub differentiation: Vec<String>,
    pub risk_assessment: String,
}

/// A customer persona.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Persona {
    pub name: String,
    pub demographics: String,
    pub psychographics: String,
    pub bio: String,
    pub goals: Vec<String>,
    pub pain_points: Vec<String>,
}

/// One tier of the pricing model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingTier {
    pub name: String,
    /// Display price, e.g. `"$9/mo"`.
    pub price: String,
    pub features: Vec<String>,
}

/// A recommended technology stack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TechStack {
    /// What the stack is best for, e.g. "Best for simple web apps".
    pub category: String,
    pub backend: String,
    pub database: String,
    pub authentication: String,
    pub payments: String,
    pub services: Vec<String>,
}

/// One step of the MVP checklist.
///
/// Ids are stable and come from the fixed template
/// ([`template::mvp_checklist`]); they are the key used when a generated
/// prompt is stored back onto a step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MvpStep {
    pub id: u32,
    pub title: String,
    pub completed: bool,
    pub prompt: Option<Prompt>,
}

/// A planned product feature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feature {
    /// Assigned locally when the feature enters the plan, never by the
    /// generation capability.
    pub id: Uuid,
    pub title: String,
    pub impact: Impact,
    pub category: String,
    pub prompt: Option<Prompt>,
}

/// A five-part build brief for a downstream AI coding assistant.
///
/// Always produced as a complete unit by one generation call; never
/// partially filled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prompt {
    pub context: String,
    pub user_journey: String,
    pub technology: String,
    pub design: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub negative_prompt: Option<String>,
}

/// The founder's profile and preferences, fed into tech-stack generation.
///
/// Owned by the session rather than the plan: it describes the user, not
/// the app being planned.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub name: String,
    pub phone: String,
    pub address: String,
    pub bio: String,
    pub website: String,
    pub tech_preferences: Vec<String>,
}

// ---------------------------------------------------------------------------
// PlanDocument
// ---------------------------------------------------------------------------

/// The root aggregate: one app plan and all of its derived artifacts.
///
/// Exactly one instance exists per session. It is only ever mutated through
/// [`PlanDocument::update`], which returns a fresh document and leaves the
/// previous one untouched, so references held by presentation code during an
/// in-flight generation call stay stable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanDocument {
    pub idea: String,
    pub idea_improvements: Vec<String>,
    pub market_validation: Option<MarketValidation>,
    pub personas: Vec<Persona>,
    pub pricing: Vec<PricingTier>,
    pub tech_stack: Option<TechStack>,
    pub mvp_plan: Vec<MvpStep>,
    pub features: Vec<Feature>,
    pub created_at: DateTime<Utc>,
}

impl PlanDocument {
    /// Create a fresh plan for an idea, all downstream fields empty.
    pub fn new(idea: impl Into<String>) -> Self {
        Self {
            idea: idea.into(),
            idea_improvements: Vec::new(),
            market_validation: None,
            personas: Vec::new(),
            pricing: Vec::new(),
            tech_stack: None,
            mvp_plan: Vec::new(),
            features: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Shallow-merge a patch into this document, returning the new document.
    ///
    /// Fields absent from the patch are carried over unchanged. The receiver
    /// is not mutated.
    #[must_use]
    pub fn update(&self, patch: PlanPatch) -> Self {
        let mut next = self.clone();
        if let Some(idea) = patch.idea {
            next.idea = idea;
        }
        if let Some(improvements) = patch.idea_improvements {
            next.idea_improvements = improvements;
        }
        if let Some(validation) = patch.market_validation {
            next.market_validation = Some(validation);
        }
        if let Some(personas) = patch.personas {
            next.personas = personas;
        }
        if let Some(pricing) = patch.pricing {
            next.pricing = pricing;
        }
        if let Some(stack) = patch.tech_stack {
            next.tech_stack = Some(stack);
        }
        if let Some(steps) = patch.mvp_plan {
            next.mvp_plan = steps;
        }
        if let Some(features) = patch.features {
            next.features = features;
        }
        next
    }
}

/// A partial plan update: every field optional, `Some` replaces wholesale.
///
/// There is intentionally no way to clear an already-populated optional
/// field -- the only path backward is a full session reset.
#[derive(Debug, Clone, Default)]
pub struct PlanPatch {
    pub idea: Option<String>,
    pub idea_improvements: Option<Vec<String>>,
    pub market_validation: Option<MarketValidation>,
    pub personas: Option<Vec<Persona>>,
    pub pricing: Option<Vec<PricingTier>>,
    pub tech_stack: Option<TechStack>,
    pub mvp_plan: Option<Vec<MvpStep>>,
    pub features: Option<Vec<Feature>>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
