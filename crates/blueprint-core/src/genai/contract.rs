//! Contract validation for generation responses.
//!
//! A generator only promises valid JSON; these functions decide whether that
//! JSON actually satisfies the capability contract (shape, element counts,
//! enum values) and decode it into plan records. Every violation is reported
//! as [`GenerationError::Contract`] and the calling operation fails without
//! touching the plan.

use serde::Deserialize;
use serde_json::Value;

use super::GenerationError;
use crate::plan::{Impact, MarketValidation, Persona, PricingTier, Prompt, TechStack};

/// A suggested feature before it enters the plan: no id yet, no prompt.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FeatureSuggestion {
    pub title: String,
    pub impact: Impact,
    pub category: String,
}

/// A randomly generated idea plus its category.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Inspiration {
    pub idea: String,
    pub category: String,
}

fn decode<T: serde::de::DeserializeOwned>(value: Value, what: &str) -> Result<T, GenerationError> {
    serde_json::from_value(value)
        .map_err(|e| GenerationError::Contract(format!("{what}: {e}")))
}

fn require_len<T>(items: &[T], expected: usize, what: &str) -> Result<(), GenerationError> {
    if items.len() != expected {
        return Err(GenerationError::Contract(format!(
            "{what}: expected {expected} entries, got {}",
            items.len()
        )));
    }
    Ok(())
}

fn require_nonempty_strings(items: &[String], what: &str) -> Result<(), GenerationError> {
    if items.iter().any(|s| s.trim().is_empty()) {
        return Err(GenerationError::Contract(format!("{what}: contains an empty entry")));
    }
    Ok(())
}

/// `{ ideas: [..] }` with exactly three non-empty entries.
pub fn ideas(value: Value) -> Result<Vec<String>, GenerationError> {
    #[derive(Deserialize)]
    struct Body {
        ideas: Vec<String>,
    }
    let body: Body = decode(value, "ideas")?;
    require_len(&body.ideas, 3, "ideas")?;
    require_nonempty_strings(&body.ideas, "ideas")?;
    Ok(body.ideas)
}

/// `{ idea, category }`, both non-empty.
pub fn inspiration(value: Value) -> Result<Inspiration, GenerationError> {
    let body: Inspiration = decode(value, "inspiration")?;
    if body.idea.trim().is_empty() || body.category.trim().is_empty() {
        return Err(GenerationError::Contract(
            "inspiration: idea and category must be non-empty".to_string(),
        ));
    }
    Ok(body)
}

/// `{ improvements: [..] }` with exactly five non-empty entries, one per
/// sharpening lens.
pub fn improvements(value: Value) -> Result<Vec<String>, GenerationError> {
    #[derive(Deserialize)]
    struct Body {
        improvements: Vec<String>,
    }
    let body: Body = decode(value, "improvements")?;
    require_len(&body.improvements, 5, "improvements")?;
    require_nonempty_strings(&body.improvements, "improvements")?;
    Ok(body.improvements)
}

/// The full six-field market validation record.
pub fn market_validation(value: Value) -> Result<MarketValidation, GenerationError> {
    let report: MarketValidation = decode(value, "market validation")?;
    if report.core_problem.trim().is_empty() {
        return Err(GenerationError::Contract(
            "market validation: coreProblem must be non-empty".to_string(),
        ));
    }
    Ok(report)
}

/// A complete persona with a non-empty name.
pub fn persona(value: Value) -> Result<Persona, GenerationError> {
    let persona: Persona = decode(value, "persona")?;
    if persona.name.trim().is_empty() {
        return Err(GenerationError::Contract(
            "persona: name must be non-empty".to_string(),
        ));
    }
    Ok(persona)
}

/// Exactly three pricing tiers.
pub fn pricing(value: Value) -> Result<Vec<PricingTier>, GenerationError> {
    let tiers: Vec<PricingTier> = decode(value, "pricing")?;
    require_len(&tiers, 3, "pricing")?;
    Ok(tiers)
}

/// Exactly three categorized tech stack candidates.
pub fn tech_stacks(value: Value) -> Result<Vec<TechStack>, GenerationError> {
    let stacks: Vec<TechStack> = decode(value, "tech stacks")?;
    require_len(&stacks, 3, "tech stacks")?;
    Ok(stacks)
}

/// A five-part build brief. The negative part is tolerated as absent; the
/// four core parts must be present and non-empty.
pub fn prompt(value: Value) -> Result<Prompt, GenerationError> {
    let prompt: Prompt = decode(value, "prompt")?;
    for (part, name) in [
        (&prompt.context, "context"),
        (&prompt.user_journey, "userJourney"),
        (&prompt.technology, "technology"),
        (&prompt.design, "design"),
    ] {
        if part.trim().is_empty() {
            return Err(GenerationError::Contract(format!(
                "prompt: {name} must be non-empty"
            )));
        }
    }
    Ok(prompt)
}

/// Exactly three suggestions, impact restricted to the [`Impact`] enum.
pub fn feature_suggestions(value: Value) -> Result<Vec<FeatureSuggestion>, GenerationError> {
    let suggestions: Vec<FeatureSuggestion> = decode(value, "feature suggestions")?;
    require_len(&suggestions, 3, "feature suggestions")?;
    for s in &suggestions {
        if s.title.trim().is_empty() {
            return Err(GenerationError::Contract(
                "feature suggestions: title must be non-empty".to_string(),
            ));
        }
    }
    Ok(suggestions)
}

/// `{ document }`, a non-empty Markdown string.
pub fn design_document(value: Value) -> Result<String, GenerationError> {
    #[derive(Deserialize)]
    struct Body {
        document: String,
    }
    let body: Body = decode(value, "design document")?;
    if body.document.trim().is_empty() {
        return Err(GenerationError::Contract(
            "design document: document must be non-empty".to_string(),
        ));
    }
    Ok(body.document)
}
