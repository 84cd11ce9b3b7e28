//! Request builders: one prompt/schema pair per generation capability.
//!
//! Prompts are assembled from the current plan; schemas are written in the
//! Gemini `responseSchema` dialect (uppercase type names). Builders are pure
//! and infallible, so they are exercised directly by unit tests without any
//! generator in the loop.

use serde_json::json;

use super::GenerationRequest;
use crate::plan::{Feature, MvpStep, PlanDocument, UserProfile};

/// Shared plan context prepended to the prompt-generation and
/// feature-suggestion calls.
fn build_context(plan: &PlanDocument) -> String {
    let improvements = if plan.idea_improvements.is_empty() {
        "None".to_string()
    } else {
        plan.idea_improvements.join(", ")
    };
    let mut context = format!(
        "Current App Plan Context:\n- Idea: {}\n- Improvements: {}\n",
        plan.idea, improvements
    );
    if let Some(persona) = plan.personas.first() {
        context.push_str(&format!("- Persona: {}, {}\n", persona.name, persona.bio));
    }
    if let Some(stack) = &plan.tech_stack {
        context.push_str(&format!(
            "- Tech Stack: Backend: {}, DB: {}\n",
            stack.backend, stack.database
        ));
    }
    context
}

fn prompt_schema() -> serde_json::Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "context": { "type": "STRING" },
            "userJourney": { "type": "STRING" },
            "technology": { "type": "STRING" },
            "design": { "type": "STRING" },
            "negativePrompt": { "type": "STRING" },
        },
        "required": ["context", "userJourney", "technology", "design", "negativePrompt"],
    })
}

/// Three idea candidates for a category.
pub fn initial_ideas(category: &str) -> GenerationRequest {
    GenerationRequest {
        prompt: format!(
            "Generate 3 innovative and specific app ideas for the category \"{category}\". \
             For example, if the category is 'fitness', suggest something like 'A fitness app \
             for new parents that offers 15-minute, baby-friendly workouts'."
        ),
        schema: json!({
            "type": "OBJECT",
            "properties": {
                "ideas": { "type": "ARRAY", "items": { "type": "STRING" } },
            },
            "required": ["ideas"],
        }),
    }
}

/// A random idea plus category to seed the setup inputs.
pub fn inspiration() -> GenerationRequest {
    GenerationRequest {
        prompt: "Generate a random, creative, and innovative app idea. Provide a short \
                 description of the idea and a 1-2 word category it belongs to."
            .to_string(),
        schema: json!({
            "type": "OBJECT",
            "properties": {
                "idea": {
                    "type": "STRING",
                    "description": "A short description of the app idea (1 sentence).",
                },
                "category": { "type": "STRING", "description": "A 1-2 word category." },
            },
            "required": ["idea", "category"],
        }),
    }
}

/// Five improvement suggestions, one per sharpening lens.
pub fn idea_improvements(idea: &str) -> GenerationRequest {
    GenerationRequest {
        prompt: format!(
            "Based on the app idea \"{idea}\", suggest one specific improvement for each of \
             the following 5 areas:\n\
             1. Target a more specific customer.\n\
             2. Deliver a more specific outcome.\n\
             3. Reduce the time to deliver the outcome.\n\
             4. Increase the value of the outcome.\n\
             5. Solve a more painful problem.\n\
             Phrase each suggestion as a concise action item."
        ),
        schema: json!({
            "type": "OBJECT",
            "properties": {
                "improvements": { "type": "ARRAY", "items": { "type": "STRING" } },
            },
            "required": ["improvements"],
        }),
    }
}

/// The six-part market validation report.
pub fn market_validation(plan: &PlanDocument) -> GenerationRequest {
    GenerationRequest {
        prompt: format!(
            "Analyze the app idea: \"{}\" with improvements: \"{}\".\n\
             Provide a market validation report covering:\n\
             - The core problem being solved.\n\
             - An ideal founder profile for this app.\n\
             - 3 specific subreddits for community research.\n\
             - A brief competitive landscape analysis.\n\
             - Key differentiation opportunities.\n\
             - A primary risk assessment.",
            plan.idea,
            plan.idea_improvements.join(", ")
        ),
        schema: json!({
            "type": "OBJECT",
            "properties": {
                "coreProblem": { "type": "STRING" },
                "founderProfile": { "type": "STRING" },
                "communityResearch": { "type": "ARRAY", "items": { "type": "STRING" } },
                "competitors": { "type": "ARRAY", "items": { "type": "STRING" } },
                "differentiation": { "type": "ARRAY", "items": { "type": "STRING" } },
                "riskAssessment": { "type": "STRING" },
            },
            "required": [
                "coreProblem", "founderProfile", "communityResearch",
                "competitors", "differentiation", "riskAssessment",
            ],
        }),
    }
}

/// One named customer persona.
pub fn persona(plan: &PlanDocument) -> GenerationRequest {
    GenerationRequest {
        prompt: format!(
            "For the app idea \"{}\" (improved with: {}), create a detailed customer \
             persona. Give them a name.",
            plan.idea,
            plan.idea_improvements.join(", ")
        ),
        schema: json!({
            "type": "OBJECT",
            "properties": {
                "name": { "type": "STRING" },
                "demographics": { "type": "STRING" },
                "psychographics": { "type": "STRING" },
                "bio": { "type": "STRING" },
                "goals": { "type": "ARRAY", "items": { "type": "STRING" } },
                "painPoints": { "type": "ARRAY", "items": { "type": "STRING" } },
            },
            "required": ["name", "demographics", "psychographics", "bio", "goals", "painPoints"],
        }),
    }
}

/// A three-tier pricing model.
pub fn pricing(plan: &PlanDocument) -> GenerationRequest {
    GenerationRequest {
        prompt: format!(
            "Based on the app idea \"{}\", suggest a 3-tier pricing model (e.g., Free, Pro, \
             Annual Pro). For each tier, provide a name, price (e.g., '$0/mo', '$9/mo'), and \
             a list of 3-4 key features.",
            plan.idea
        ),
        schema: json!({
            "type": "ARRAY",
            "items": {
                "type": "OBJECT",
                "properties": {
                    "name": { "type": "STRING" },
                    "price": { "type": "STRING" },
                    "features": { "type": "ARRAY", "items": { "type": "STRING" } },
                },
                "required": ["name", "price", "features"],
            },
        }),
    }
}

/// Three categorized tech stack candidates, steered by the founder's
/// recorded technology preferences when present.
pub fn tech_stack(plan: &PlanDocument, profile: &UserProfile) -> GenerationRequest {
    let mut prompt = format!(
        "For the app idea \"{}\", recommend 3 different tech stacks. Categorize them \
         (e.g., \"Best for simple web apps\", \"Best for full-stack web apps\", \"Best for \
         complex mobile apps\"). For each stack, specify the backend, database, \
         authentication, payments (suggest Stripe or RevenueCat), and 2-3 relevant \
         services/APIs.",
        plan.idea
    );
    if !profile.tech_preferences.is_empty() {
        prompt.push_str(&format!(
            " The founder prefers working with: {}. Favor these where they fit.",
            profile.tech_preferences.join(", ")
        ));
    }
    GenerationRequest {
        prompt,
        schema: json!({
            "type": "ARRAY",
            "items": {
                "type": "OBJECT",
                "properties": {
                    "category": { "type": "STRING" },
                    "backend": { "type": "STRING" },
                    "database": { "type": "STRING" },
                    "authentication": { "type": "STRING" },
                    "payments": { "type": "STRING" },
                    "services": { "type": "ARRAY", "items": { "type": "STRING" } },
                },
                "required": [
                    "category", "backend", "database", "authentication", "payments", "services",
                ],
            },
        }),
    }
}

/// A five-part build brief for an MVP checklist step.
pub fn mvp_step_prompt(plan: &PlanDocument, step: &MvpStep) -> GenerationRequest {
    GenerationRequest {
        prompt: format!(
            "{}\n\
             Generate a 5-part prompt for an AI coding assistant to complete the following \
             MVP step: \"{}\".\n\n\
             The prompt should include:\n\
             1. Context: Why this step is crucial for the app.\n\
             2. User Journey: What the user (or developer) does. If not user-facing, \
             describe the technical outcome.\n\
             3. Technology/Implementation Details: Referencing the tech stack.\n\
             4. Design Direction: Suggest a simple, clean implementation.\n\
             5. Negative Prompt: What not to change.",
            build_context(plan),
            step.title
        ),
        schema: prompt_schema(),
    }
}

/// A five-part build brief for a planned feature.
pub fn feature_prompt(plan: &PlanDocument, feature: &Feature) -> GenerationRequest {
    GenerationRequest {
        prompt: format!(
            "{}\n\
             Generate a 5-part prompt for an AI coding assistant to build the feature: \
             \"{}\".\n\n\
             The prompt should include:\n\
             1. Context: Why this feature is valuable to the user.\n\
             2. User Journey: The precise steps the user takes to interact with it.\n\
             3. Technology/Implementation Details: Referencing the tech stack.\n\
             4. Design Direction: Keep it consistent with a minimal style.\n\
             5. Negative Prompt: What not to change in the existing codebase.",
            build_context(plan),
            feature.title
        ),
        schema: prompt_schema(),
    }
}

/// Three feature suggestions, each with a title, impact level, and category.
pub fn feature_suggestions(plan: &PlanDocument) -> GenerationRequest {
    GenerationRequest {
        prompt: format!(
            "{}\n\
             Suggest 3 new features for this app. For each feature, provide a title, \
             categorize it by impact (High, Medium, or Low), and give it a type (e.g., \
             \"Voice Task Prioritization\", \"Collaborative Sharing\").",
            build_context(plan)
        ),
        schema: json!({
            "type": "ARRAY",
            "items": {
                "type": "OBJECT",
                "properties": {
                    "title": { "type": "STRING" },
                    "impact": { "type": "STRING", "enum": ["High", "Medium", "Low"] },
                    "category": { "type": "STRING" },
                },
                "required": ["title", "impact", "category"],
            },
        }),
    }
}

/// A single-document technical design brief covering the whole plan.
pub fn design_document(plan: &PlanDocument) -> GenerationRequest {
    let mut prompt = format!(
        "{}\n\
         Write a concise technical design document for this app as Markdown text. Cover: \
         the product goal, the chosen architecture, the data model, the main user flows, \
         and an implementation order that follows the MVP checklist",
        build_context(plan)
    );
    if !plan.mvp_plan.is_empty() {
        let titles: Vec<&str> = plan.mvp_plan.iter().map(|s| s.title.as_str()).collect();
        prompt.push_str(&format!(" ({}).", titles.join("; ")));
    } else {
        prompt.push('.');
    }
    GenerationRequest {
        prompt,
        schema: json!({
            "type": "OBJECT",
            "properties": {
                "document": { "type": "STRING" },
            },
            "required": ["document"],
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::{Persona, PlanPatch, TechStack};

    fn plan_with_context() -> PlanDocument {
        PlanDocument::new("Meal planner for students").update(PlanPatch {
            idea_improvements: Some(vec!["budget-first".to_string()]),
            personas: Some(vec![Persona {
                name: "Alex".to_string(),
                demographics: String::new(),
                psychographics: String::new(),
                bio: "broke sophomore".to_string(),
                goals: vec![],
                pain_points: vec![],
            }]),
            tech_stack: Some(TechStack {
                category: "Best for simple web apps".to_string(),
                backend: "Rails".to_string(),
                database: "Postgres".to_string(),
                authentication: "Devise".to_string(),
                payments: "Stripe".to_string(),
                services: vec![],
            }),
            ..Default::default()
        })
    }

    #[test]
    fn context_includes_persona_and_stack_when_present() {
        let context = build_context(&plan_with_context());
        assert!(context.contains("Alex, broke sophomore"));
        assert!(context.contains("Backend: Rails, DB: Postgres"));
    }

    #[test]
    fn context_marks_missing_improvements() {
        let context = build_context(&PlanDocument::new("idea"));
        assert!(context.contains("Improvements: None"));
        assert!(!context.contains("Persona:"));
    }

    #[test]
    fn ideas_request_embeds_category() {
        let request = initial_ideas("fitness");
        assert!(request.prompt.contains("\"fitness\""));
        assert_eq!(request.schema["required"][0], "ideas");
    }

    #[test]
    fn improvements_request_lists_five_areas() {
        let request = idea_improvements("Meal planner");
        assert!(request.prompt.contains("5. Solve a more painful problem."));
    }

    #[test]
    fn tech_stack_request_mentions_preferences_only_when_set() {
        let plan = plan_with_context();
        let blank = UserProfile::default();
        assert!(!tech_stack(&plan, &blank).prompt.contains("founder prefers"));

        let opinionated = UserProfile {
            tech_preferences: vec!["Rust".to_string(), "Postgres".to_string()],
            ..Default::default()
        };
        let request = tech_stack(&plan, &opinionated);
        assert!(request.prompt.contains("Rust, Postgres"));
    }

    #[test]
    fn prompt_requests_share_the_five_part_schema() {
        let plan = plan_with_context();
        let step = crate::plan::mvp_checklist().remove(0);
        let feature = Feature {
            id: uuid::Uuid::new_v4(),
            title: "Weekly digest".to_string(),
            impact: crate::plan::Impact::Medium,
            category: "Engagement".to_string(),
            prompt: None,
        };
        let a = mvp_step_prompt(&plan, &step);
        let b = feature_prompt(&plan, &feature);
        assert_eq!(a.schema, b.schema);
        assert!(a.prompt.contains(&step.title));
        assert!(b.prompt.contains("Weekly digest"));
    }

    #[test]
    fn design_document_request_lists_step_titles() {
        let plan = plan_with_context().update(PlanPatch {
            mvp_plan: Some(crate::plan::mvp_checklist()),
            ..Default::default()
        });
        let request = design_document(&plan);
        assert!(request.prompt.contains("Add and test database"));
        assert_eq!(request.schema["required"][0], "document");
    }
}
