//! Test helpers shared across the workspace: a scripted in-memory
//! [`Generator`] and canned response payloads for each generation
//! capability.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{Value, json};

use blueprint_core::genai::{GenerationError, GenerationRequest, Generator};

/// A [`Generator`] that replays a fixed script of responses.
///
/// Each call to [`Generator::generate`] pops the next scripted outcome.
/// An exhausted script answers with an API error, which surfaces in tests
/// as an unexpected extra generation call.
pub struct ScriptedGenerator {
    responses: Mutex<VecDeque<Result<Value, GenerationError>>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedGenerator {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Queue a successful response.
    pub fn push_ok(self, value: Value) -> Self {
        self.responses
            .lock()
            .unwrap()
            .push_back(Ok(value));
        self
    }

    /// Queue a failure.
    pub fn push_err(self, error: GenerationError) -> Self {
        self.responses.lock().unwrap().push_back(Err(error));
        self
    }

    /// Prompts of every call made so far, in order.
    pub fn recorded_prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    /// Number of scripted responses not yet consumed.
    pub fn remaining(&self) -> usize {
        self.responses.lock().unwrap().len()
    }
}

impl Default for ScriptedGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Generator for ScriptedGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<Value, GenerationError> {
        self.prompts.lock().unwrap().push(request.prompt.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Err(GenerationError::Api(
                    "scripted generator exhausted".to_string(),
                ))
            })
    }
}

// ---------------------------------------------------------------------------
// Canned payloads
// ---------------------------------------------------------------------------

/// Well-formed response payloads, one per generation capability.
pub mod payloads {
    use super::*;

    pub fn ideas() -> Value {
        json!({ "ideas": [
            "A meal planner that builds grocery lists from campus store stock",
            "A flashcard app that schedules reviews around class timetables",
            "A laundry-room tracker for shared dorm machines",
        ] })
    }

    pub fn inspiration() -> Value {
        json!({ "idea": "An app that turns leftovers into recipes", "category": "Food" })
    }

    pub fn improvements() -> Value {
        json!({ "improvements": [
            "Target first-year students living in dorms",
            "Deliver a full week of meals under a fixed budget",
            "Generate the plan in under one minute",
            "Include a shareable grocery list",
            "Solve the end-of-month empty-wallet problem",
        ] })
    }

    pub fn market_validation() -> Value {
        json!({
            "coreProblem": "Students overspend on food they end up wasting",
            "founderProfile": "A recent graduate who cooked through college",
            "communityResearch": ["r/EatCheapAndHealthy", "r/MealPrepSunday", "r/college"],
            "competitors": ["Mealime", "Paprika"],
            "differentiation": ["Budget-first planning", "Campus store integration"],
            "riskAssessment": "Crowded market with low willingness to pay",
        })
    }

    pub fn persona() -> Value {
        json!({
            "name": "Alex",
            "demographics": "19, sophomore, shared apartment",
            "psychographics": "Budget-conscious, time-poor",
            "bio": "Engineering student juggling classes and a part-time job",
            "goals": ["Eat better for less", "Stop wasting groceries"],
            "painPoints": ["No time to plan meals", "Overspends at the store"],
        })
    }

    pub fn pricing() -> Value {
        json!([
            { "name": "Free", "price": "$0/mo", "features": ["3 plans per month", "Basic grocery list"] },
            { "name": "Pro", "price": "$4/mo", "features": ["Unlimited plans", "Budget tracking", "Shared lists"] },
            { "name": "Annual Pro", "price": "$36/yr", "features": ["Everything in Pro", "2 months free", "Priority support"] },
        ])
    }

    pub fn tech_stacks() -> Value {
        json!([
            {
                "category": "Best for simple web apps",
                "backend": "Rails",
                "database": "Postgres",
                "authentication": "Devise",
                "payments": "Stripe",
                "services": ["SendGrid", "Cloudinary"],
            },
            {
                "category": "Best for full-stack web apps",
                "backend": "Node.js with Express",
                "database": "Postgres",
                "authentication": "Auth0",
                "payments": "Stripe",
                "services": ["Redis", "S3"],
            },
            {
                "category": "Best for complex mobile apps",
                "backend": "Firebase",
                "database": "Firestore",
                "authentication": "Firebase Auth",
                "payments": "RevenueCat",
                "services": ["Cloud Functions", "FCM"],
            },
        ])
    }

    pub fn prompt() -> Value {
        json!({
            "context": "This step establishes the project skeleton",
            "userJourney": "The developer runs the scaffold and sees a running app",
            "technology": "Use the chosen backend and database",
            "design": "Keep the layout minimal",
            "negativePrompt": "Do not add features beyond the scaffold",
        })
    }

    pub fn feature_suggestions() -> Value {
        json!([
            { "title": "Pantry photo import", "impact": "High", "category": "Input" },
            { "title": "Roommate shared plans", "impact": "Medium", "category": "Collaboration" },
            { "title": "Seasonal recipe themes", "impact": "Low", "category": "Content" },
        ])
    }

    pub fn design_document() -> Value {
        json!({ "document": "# Design\n\nA budget-first meal planner built as a web app." })
    }
}
