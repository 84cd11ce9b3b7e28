//! The planning session: dispatch, review/merge, and section editing.
//!
//! [`PlanSession`] owns the plan document, the founder profile, the staged
//! generation result awaiting review, and the per-section lock/edit state.
//! Every operation follows the same shape: check the gate, check the busy
//! flag, run the generation call, validate the response against the
//! capability contract, then either stage the result for review or merge it
//! directly. A failure at any point leaves the plan exactly as it was.

use anyhow::Result as AnyResult;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::gate::{self, Action, PersonaMode, Phase};
use crate::genai::contract::{self, FeatureSuggestion, Inspiration};
use crate::genai::{GenerationError, GenerationRequest, Generator, requests};
use crate::plan::{
    Feature, Impact, MarketValidation, Persona, PlanDocument, PlanPatch, PricingTier, Prompt,
    TechStack, UserProfile, mvp_checklist,
};
use crate::section::{SectionDraft, SectionId, SectionStates};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Failure modes of session operations.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("invalid input: {0}")]
    Input(String),

    /// The gate currently forbids this action.
    #[error("action not available: {0}")]
    Gated(Action),

    #[error("a generation call is already in flight")]
    Busy,

    #[error("section is locked: {0}")]
    Locked(SectionId),

    #[error("no staged result to review")]
    NoStagedResult,

    /// A staged result exists but belongs to a different operation.
    #[error("staged result does not match this operation")]
    WrongStage,

    #[error("no active plan")]
    NoPlan,

    #[error("no open draft for section: {0}")]
    NoDraft(SectionId),

    #[error("unknown id: {0}")]
    UnknownId(String),

    #[error("selection out of range: {0}")]
    Selection(usize),

    #[error(transparent)]
    Generation(#[from] GenerationError),
}

// ---------------------------------------------------------------------------
// Staged results
// ---------------------------------------------------------------------------

/// A validated generation result parked for user review.
///
/// At most one exists at a time; a new generation call replaces it. Merging
/// happens only through the matching `accept_*`/`choose_*` method, or never,
/// via [`PlanSession::discard_staged`].
#[derive(Debug, Clone)]
pub enum StagedResult {
    Ideas(Vec<String>),
    Improvements(Vec<String>),
    Validation(MarketValidation),
    Persona(Persona),
    Pricing(Vec<PricingTier>),
    TechStackOptions(Vec<TechStack>),
    DesignDoc(String),
}

// ---------------------------------------------------------------------------
// Tutorial flag persistence
// ---------------------------------------------------------------------------

/// Durable storage for the one persisted preference: whether to show the
/// tutorial on startup. Everything else in a session is in-memory only.
pub trait TutorialFlagStore: Send + Sync {
    /// Load the flag; absence means the tutorial has never been dismissed.
    fn load(&self) -> AnyResult<bool>;

    fn store(&self, show: bool) -> AnyResult<()>;
}

const _: () = {
    fn _assert_object_safe(_: &dyn TutorialFlagStore) {}
};

// ---------------------------------------------------------------------------
// PlanSession
// ---------------------------------------------------------------------------

/// One interactive planning session.
pub struct PlanSession {
    generator: Box<dyn Generator>,
    plan: Option<PlanDocument>,
    profile: UserProfile,
    persona_mode: PersonaMode,
    launched: bool,
    busy: bool,
    staged: Option<StagedResult>,
    design_document: Option<String>,
    sections: SectionStates,
}

impl PlanSession {
    pub fn new(generator: Box<dyn Generator>) -> Self {
        Self {
            generator,
            plan: None,
            profile: UserProfile::default(),
            persona_mode: PersonaMode::default(),
            launched: false,
            busy: false,
            staged: None,
            design_document: None,
            sections: SectionStates::new(),
        }
    }

    // -- accessors ----------------------------------------------------------

    pub fn plan(&self) -> Option<&PlanDocument> {
        self.plan.as_ref()
    }

    pub fn profile(&self) -> &UserProfile {
        &self.profile
    }

    pub fn staged(&self) -> Option<&StagedResult> {
        self.staged.as_ref()
    }

    pub fn design_document(&self) -> Option<&str> {
        self.design_document.as_deref()
    }

    pub fn busy(&self) -> bool {
        self.busy
    }

    pub fn launched(&self) -> bool {
        self.launched
    }

    pub fn phase(&self) -> Phase {
        gate::phase(self.plan.as_ref(), self.launched)
    }

    pub fn persona_mode(&self) -> PersonaMode {
        self.persona_mode
    }

    pub fn set_persona_mode(&mut self, mode: PersonaMode) {
        self.persona_mode = mode;
    }

    /// Actions the gate currently permits. Empty during setup.
    pub fn enabled_actions(&self) -> Vec<Action> {
        match &self.plan {
            Some(plan) => gate::enabled_actions(plan, self.persona_mode),
            None => Vec::new(),
        }
    }

    // -- internal helpers ---------------------------------------------------

    /// Run one generation call behind the busy flag. The flag is cleared on
    /// both the success and the failure path.
    async fn generate(&mut self, request: GenerationRequest) -> Result<serde_json::Value, SessionError> {
        if self.busy {
            return Err(SessionError::Busy);
        }
        self.busy = true;
        let result = self.generator.generate(&request).await;
        self.busy = false;
        match result {
            Ok(value) => Ok(value),
            Err(e) => {
                warn!(error = %e, "generation call failed");
                Err(e.into())
            }
        }
    }

    fn require_enabled(&self, action: Action) -> Result<&PlanDocument, SessionError> {
        let plan = self.plan.as_ref().ok_or(SessionError::NoPlan)?;
        if !gate::is_enabled(plan, action, self.persona_mode) {
            return Err(SessionError::Gated(action));
        }
        Ok(plan)
    }

    fn require_unlocked(&self, id: SectionId) -> Result<(), SessionError> {
        if self.sections.is_locked(id) {
            return Err(SessionError::Locked(id));
        }
        Ok(())
    }

    fn apply(&mut self, patch: PlanPatch) -> Result<(), SessionError> {
        let plan = self.plan.as_ref().ok_or(SessionError::NoPlan)?;
        self.plan = Some(plan.update(patch));
        Ok(())
    }

    fn take_staged(&mut self) -> Result<StagedResult, SessionError> {
        self.staged.take().ok_or(SessionError::NoStagedResult)
    }

    // -- setup --------------------------------------------------------------

    /// Generate three idea candidates for a category and stage them.
    pub async fn generate_ideas(&mut self, category: &str) -> Result<(), SessionError> {
        if self.plan.is_some() {
            return Err(SessionError::Gated(Action::GenerateIdeas));
        }
        if category.trim().is_empty() {
            return Err(SessionError::Input("category must not be empty".to_string()));
        }
        let value = self.generate(requests::initial_ideas(category)).await?;
        let ideas = contract::ideas(value)?;
        self.staged = Some(StagedResult::Ideas(ideas));
        Ok(())
    }

    /// Generate a random idea plus category to seed the setup inputs.
    ///
    /// Returned directly rather than staged: there is nothing to merge.
    pub async fn inspire(&mut self) -> Result<Inspiration, SessionError> {
        if self.plan.is_some() {
            return Err(SessionError::Gated(Action::Inspire));
        }
        let value = self.generate(requests::inspiration()).await?;
        Ok(contract::inspiration(value)?)
    }

    /// Start a plan from an idea typed by the user.
    pub fn start_plan(&mut self, idea: &str) -> Result<(), SessionError> {
        if self.plan.is_some() {
            return Err(SessionError::Input("a plan already exists".to_string()));
        }
        if idea.trim().is_empty() {
            return Err(SessionError::Input("idea must not be empty".to_string()));
        }
        info!(idea, "plan started");
        self.plan = Some(PlanDocument::new(idea));
        self.staged = None;
        Ok(())
    }

    /// Start a plan from one of the staged idea candidates.
    pub fn choose_idea(&mut self, index: usize) -> Result<(), SessionError> {
        match self.take_staged()? {
            StagedResult::Ideas(ideas) => {
                let Some(idea) = ideas.get(index) else {
                    self.staged = Some(StagedResult::Ideas(ideas));
                    return Err(SessionError::Selection(index));
                };
                info!(idea = %idea, "plan started from candidate");
                self.plan = Some(PlanDocument::new(idea.clone()));
                Ok(())
            }
            other => {
                self.staged = Some(other);
                Err(SessionError::WrongStage)
            }
        }
    }

    // -- staged generation --------------------------------------------------

    /// Generate the five improvement suggestions and stage them.
    pub async fn improve_idea(&mut self) -> Result<(), SessionError> {
        let request = {
            let plan = self.require_enabled(Action::ImproveIdea)?;
            requests::idea_improvements(&plan.idea)
        };
        let value = self.generate(request).await?;
        let improvements = contract::improvements(value)?;
        self.staged = Some(StagedResult::Improvements(improvements));
        Ok(())
    }

    /// Merge the staged improvements, optionally as edited by the user.
    pub fn accept_improvements(&mut self, edited: Option<Vec<String>>) -> Result<(), SessionError> {
        match self.take_staged()? {
            StagedResult::Improvements(generated) => {
                let improvements = edited.unwrap_or(generated);
                info!(count = improvements.len(), "idea improvements accepted");
                self.apply(PlanPatch {
                    idea_improvements: Some(improvements),
                    ..Default::default()
                })
            }
            other => {
                self.staged = Some(other);
                Err(SessionError::WrongStage)
            }
        }
    }

    /// Generate the market validation report and stage it.
    pub async fn request_market_validation(&mut self) -> Result<(), SessionError> {
        let request = {
            let plan = self.require_enabled(Action::MarketValidation)?;
            requests::market_validation(plan)
        };
        let value = self.generate(request).await?;
        let report = contract::market_validation(value)?;
        self.staged = Some(StagedResult::Validation(report));
        Ok(())
    }

    pub fn accept_market_validation(
        &mut self,
        edited: Option<MarketValidation>,
    ) -> Result<(), SessionError> {
        match self.take_staged()? {
            StagedResult::Validation(generated) => {
                info!("market validation accepted");
                self.apply(PlanPatch {
                    market_validation: Some(edited.unwrap_or(generated)),
                    ..Default::default()
                })
            }
            other => {
                self.staged = Some(other);
                Err(SessionError::WrongStage)
            }
        }
    }

    /// Generate a customer persona and stage it.
    pub async fn generate_persona(&mut self) -> Result<(), SessionError> {
        let request = {
            let plan = self.require_enabled(Action::AddPersona)?;
            requests::persona(plan)
        };
        let value = self.generate(request).await?;
        let persona = contract::persona(value)?;
        self.staged = Some(StagedResult::Persona(persona));
        Ok(())
    }

    /// Append the staged persona to the plan.
    pub fn accept_persona(&mut self, edited: Option<Persona>) -> Result<(), SessionError> {
        match self.take_staged()? {
            StagedResult::Persona(generated) => {
                let persona = edited.unwrap_or(generated);
                let plan = self.plan.as_ref().ok_or(SessionError::NoPlan)?;
                let mut personas = plan.personas.clone();
                info!(name = %persona.name, "persona accepted");
                personas.push(persona);
                self.apply(PlanPatch {
                    personas: Some(personas),
                    ..Default::default()
                })
            }
            other => {
                self.staged = Some(other);
                Err(SessionError::WrongStage)
            }
        }
    }

    /// Generate the three-tier pricing model and stage it.
    pub async fn outline_pricing(&mut self) -> Result<(), SessionError> {
        let request = {
            let plan = self.require_enabled(Action::OutlinePricing)?;
            requests::pricing(plan)
        };
        let value = self.generate(request).await?;
        let tiers = contract::pricing(value)?;
        self.staged = Some(StagedResult::Pricing(tiers));
        Ok(())
    }

    pub fn accept_pricing(&mut self, edited: Option<Vec<PricingTier>>) -> Result<(), SessionError> {
        match self.take_staged()? {
            StagedResult::Pricing(generated) => {
                info!("pricing accepted");
                self.apply(PlanPatch {
                    pricing: Some(edited.unwrap_or(generated)),
                    ..Default::default()
                })
            }
            other => {
                self.staged = Some(other);
                Err(SessionError::WrongStage)
            }
        }
    }

    /// Generate three tech stack candidates and stage them.
    pub async fn recommend_tech_stack(&mut self) -> Result<(), SessionError> {
        let request = {
            let plan = self.require_enabled(Action::RecommendTechStack)?;
            requests::tech_stack(plan, &self.profile)
        };
        let value = self.generate(request).await?;
        let stacks = contract::tech_stacks(value)?;
        self.staged = Some(StagedResult::TechStackOptions(stacks));
        Ok(())
    }

    /// Adopt one of the staged tech stack candidates.
    pub fn choose_tech_stack(&mut self, index: usize) -> Result<(), SessionError> {
        match self.take_staged()? {
            StagedResult::TechStackOptions(stacks) => {
                let Some(stack) = stacks.get(index) else {
                    self.staged = Some(StagedResult::TechStackOptions(stacks));
                    return Err(SessionError::Selection(index));
                };
                info!(category = %stack.category, "tech stack chosen");
                let stack = stack.clone();
                self.apply(PlanPatch {
                    tech_stack: Some(stack),
                    ..Default::default()
                })
            }
            other => {
                self.staged = Some(other);
                Err(SessionError::WrongStage)
            }
        }
    }

    /// Generate the technical design document and stage it.
    pub async fn generate_design_doc(&mut self) -> Result<(), SessionError> {
        let request = {
            let plan = self.require_enabled(Action::GenerateDesignDoc)?;
            requests::design_document(plan)
        };
        let value = self.generate(request).await?;
        let document = contract::design_document(value)?;
        self.staged = Some(StagedResult::DesignDoc(document));
        Ok(())
    }

    pub fn accept_design_document(&mut self) -> Result<(), SessionError> {
        match self.take_staged()? {
            StagedResult::DesignDoc(document) => {
                info!("design document accepted");
                self.design_document = Some(document);
                Ok(())
            }
            other => {
                self.staged = Some(other);
                Err(SessionError::WrongStage)
            }
        }
    }

    /// Throw away the staged result without merging anything.
    pub fn discard_staged(&mut self) -> Result<(), SessionError> {
        self.take_staged().map(|_| ())
    }

    // -- direct operations --------------------------------------------------

    /// Instantiate the fixed MVP checklist. No generation call is involved,
    /// and completing this moves the session into the Features phase.
    pub fn generate_mvp_plan(&mut self) -> Result<(), SessionError> {
        self.require_enabled(Action::GenerateMvpPlan)?;
        info!("mvp checklist instantiated");
        self.apply(PlanPatch {
            mvp_plan: Some(mvp_checklist()),
            ..Default::default()
        })
    }

    /// Flip the completion state of one MVP step.
    pub fn toggle_mvp_step(&mut self, id: u32) -> Result<(), SessionError> {
        self.require_unlocked(SectionId::MvpPlan)?;
        let plan = self.plan.as_ref().ok_or(SessionError::NoPlan)?;
        let mut steps = plan.mvp_plan.clone();
        let step = steps
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| SessionError::UnknownId(id.to_string()))?;
        step.completed = !step.completed;
        self.apply(PlanPatch {
            mvp_plan: Some(steps),
            ..Default::default()
        })
    }

    /// Generate three feature suggestions and append them immediately.
    ///
    /// Unlike the staged capabilities, suggestions merge in place: existing
    /// features are untouched and each new one gets a fresh id.
    pub async fn suggest_features(&mut self) -> Result<Vec<FeatureSuggestion>, SessionError> {
        self.require_unlocked(SectionId::Features)?;
        let request = {
            let plan = self.require_enabled(Action::SuggestFeatures)?;
            requests::feature_suggestions(plan)
        };
        let value = self.generate(request).await?;
        let suggestions = contract::feature_suggestions(value)?;

        let plan = self.plan.as_ref().ok_or(SessionError::NoPlan)?;
        let mut features = plan.features.clone();
        features.extend(suggestions.iter().map(|s| Feature {
            id: Uuid::new_v4(),
            title: s.title.clone(),
            impact: s.impact,
            category: s.category.clone(),
            prompt: None,
        }));
        info!(added = suggestions.len(), total = features.len(), "features suggested");
        self.apply(PlanPatch {
            features: Some(features),
            ..Default::default()
        })?;
        Ok(suggestions)
    }

    /// Add a user-written feature with default impact and category.
    pub fn add_custom_feature(&mut self, title: &str) -> Result<Uuid, SessionError> {
        self.require_unlocked(SectionId::Features)?;
        self.require_enabled(Action::AddCustomFeature)?;
        if title.trim().is_empty() {
            return Err(SessionError::Input("feature title must not be empty".to_string()));
        }
        let plan = self.plan.as_ref().ok_or(SessionError::NoPlan)?;
        let id = Uuid::new_v4();
        let mut features = plan.features.clone();
        features.push(Feature {
            id,
            title: title.to_string(),
            impact: Impact::Medium,
            category: "Custom".to_string(),
            prompt: None,
        });
        self.apply(PlanPatch {
            features: Some(features),
            ..Default::default()
        })?;
        Ok(id)
    }

    /// Produce (or fetch) the build brief for an MVP step.
    ///
    /// A stored prompt is returned as-is unless `force` is set; a fresh one
    /// is stored back onto the step by id before being returned.
    pub async fn generate_mvp_step_prompt(
        &mut self,
        id: u32,
        force: bool,
    ) -> Result<Prompt, SessionError> {
        self.require_unlocked(SectionId::MvpPlan)?;
        let request = {
            let plan = self.require_enabled(Action::MvpStepPrompt)?;
            let step = plan
                .mvp_plan
                .iter()
                .find(|s| s.id == id)
                .ok_or_else(|| SessionError::UnknownId(id.to_string()))?;
            if let Some(existing) = (!force).then_some(step.prompt.as_ref()).flatten() {
                return Ok(existing.clone());
            }
            requests::mvp_step_prompt(plan, step)
        };
        let value = self.generate(request).await?;
        let prompt = contract::prompt(value)?;

        let plan = self.plan.as_ref().ok_or(SessionError::NoPlan)?;
        let mut steps = plan.mvp_plan.clone();
        if let Some(step) = steps.iter_mut().find(|s| s.id == id) {
            step.prompt = Some(prompt.clone());
        }
        self.apply(PlanPatch {
            mvp_plan: Some(steps),
            ..Default::default()
        })?;
        Ok(prompt)
    }

    /// Produce (or fetch) the build brief for a feature.
    pub async fn generate_feature_prompt(
        &mut self,
        id: Uuid,
        force: bool,
    ) -> Result<Prompt, SessionError> {
        self.require_unlocked(SectionId::Features)?;
        let request = {
            let plan = self.require_enabled(Action::FeaturePrompt)?;
            let feature = plan
                .features
                .iter()
                .find(|f| f.id == id)
                .ok_or_else(|| SessionError::UnknownId(id.to_string()))?;
            if let Some(existing) = (!force).then_some(feature.prompt.as_ref()).flatten() {
                return Ok(existing.clone());
            }
            requests::feature_prompt(plan, feature)
        };
        let value = self.generate(request).await?;
        let prompt = contract::prompt(value)?;

        let plan = self.plan.as_ref().ok_or(SessionError::NoPlan)?;
        let mut features = plan.features.clone();
        if let Some(feature) = features.iter_mut().find(|f| f.id == id) {
            feature.prompt = Some(prompt.clone());
        }
        self.apply(PlanPatch {
            features: Some(features),
            ..Default::default()
        })?;
        Ok(prompt)
    }

    /// Remove a persona by position.
    pub fn remove_persona(&mut self, index: usize) -> Result<(), SessionError> {
        self.require_unlocked(SectionId::Persona)?;
        let plan = self.plan.as_ref().ok_or(SessionError::NoPlan)?;
        if index >= plan.personas.len() {
            return Err(SessionError::Selection(index));
        }
        let mut personas = plan.personas.clone();
        personas.remove(index);
        self.apply(PlanPatch {
            personas: Some(personas),
            ..Default::default()
        })
    }

    pub fn update_profile(&mut self, profile: UserProfile) {
        self.profile = profile;
    }

    /// Mark the app as launched. Requires an MVP plan; there is no way back
    /// short of [`PlanSession::reset`].
    pub fn mark_launched(&mut self) -> Result<(), SessionError> {
        let plan = self.plan.as_ref().ok_or(SessionError::NoPlan)?;
        if plan.mvp_plan.is_empty() {
            return Err(SessionError::Input(
                "launch requires an MVP plan".to_string(),
            ));
        }
        info!("app marked as launched");
        self.launched = true;
        Ok(())
    }

    /// Discard the plan and start over. The founder profile survives.
    pub fn reset(&mut self) {
        info!("session reset");
        self.plan = None;
        self.staged = None;
        self.launched = false;
        self.busy = false;
        self.design_document = None;
        self.sections = SectionStates::new();
        self.sections
            .open_draft(SectionDraft::Profile(self.profile.clone()));
    }

    // -- section lock/edit --------------------------------------------------

    pub fn is_locked(&self, id: SectionId) -> bool {
        self.sections.is_locked(id)
    }

    pub fn set_locked(&mut self, id: SectionId, locked: bool) {
        self.sections.set_locked(id, locked);
    }

    /// Open an editing draft snapshotted from the current content.
    pub fn begin_edit(&mut self, id: SectionId) -> Result<(), SessionError> {
        self.require_unlocked(id)?;
        if id == SectionId::Profile {
            self.sections
                .open_draft(SectionDraft::Profile(self.profile.clone()));
            return Ok(());
        }
        let plan = self.plan.as_ref().ok_or(SessionError::NoPlan)?;
        let draft = match id {
            SectionId::Idea => SectionDraft::Idea {
                idea: plan.idea.clone(),
                improvements: plan.idea_improvements.clone(),
            },
            SectionId::Persona => SectionDraft::Personas(plan.personas.clone()),
            SectionId::Pricing => SectionDraft::Pricing(plan.pricing.clone()),
            SectionId::TechStack => {
                let stack = plan
                    .tech_stack
                    .clone()
                    .ok_or_else(|| SessionError::Input("no tech stack to edit".to_string()))?;
                SectionDraft::TechStack(stack)
            }
            SectionId::MvpPlan => SectionDraft::MvpPlan(plan.mvp_plan.clone()),
            SectionId::Features => SectionDraft::Features(plan.features.clone()),
            SectionId::Profile => return Err(SessionError::NoDraft(id)),
        };
        self.sections.open_draft(draft);
        Ok(())
    }

    pub fn draft(&self, id: SectionId) -> Option<&SectionDraft> {
        self.sections.draft(id)
    }

    pub fn draft_mut(&mut self, id: SectionId) -> Result<&mut SectionDraft, SessionError> {
        self.sections.draft_mut(id).ok_or(SessionError::NoDraft(id))
    }

    /// Apply the open draft atomically and close it.
    pub fn save_edit(&mut self, id: SectionId) -> Result<(), SessionError> {
        let draft = self
            .sections
            .take_draft(id)
            .ok_or(SessionError::NoDraft(id))?;
        match draft {
            SectionDraft::Profile(profile) => {
                self.profile = profile;
                Ok(())
            }
            SectionDraft::Idea { idea, improvements } => self.apply(PlanPatch {
                idea: Some(idea),
                idea_improvements: Some(improvements),
                ..Default::default()
            }),
            SectionDraft::Personas(personas) => self.apply(PlanPatch {
                personas: Some(personas),
                ..Default::default()
            }),
            SectionDraft::Pricing(pricing) => self.apply(PlanPatch {
                pricing: Some(pricing),
                ..Default::default()
            }),
            SectionDraft::TechStack(stack) => self.apply(PlanPatch {
                tech_stack: Some(stack),
                ..Default::default()
            }),
            SectionDraft::MvpPlan(steps) => self.apply(PlanPatch {
                mvp_plan: Some(steps),
                ..Default::default()
            }),
            SectionDraft::Features(features) => self.apply(PlanPatch {
                features: Some(features),
                ..Default::default()
            }),
        }
    }

    /// Close the open draft without applying it.
    pub fn cancel_edit(&mut self, id: SectionId) -> Result<(), SessionError> {
        self.sections
            .take_draft(id)
            .map(|_| ())
            .ok_or(SessionError::NoDraft(id))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    // Import from the library crate rather than `super::*` so these tests
    // use the same copy of the types that blueprint-test-utils links.
    use blueprint_core::gate::{Action, PersonaMode, Phase};
    use blueprint_core::genai::GenerationError;
    use blueprint_core::plan::{Impact, UserProfile};
    use blueprint_core::section::{SectionDraft, SectionId};
    use blueprint_core::session::{PlanSession, SessionError, StagedResult};
    use uuid::Uuid;

    use blueprint_test_utils::{ScriptedGenerator, payloads};

    fn session_with(generator: ScriptedGenerator) -> PlanSession {
        PlanSession::new(Box::new(generator))
    }

    /// Drive a session through the whole Foundations chain, with `extras`
    /// scripted for whatever the test does afterwards.
    async fn session_through_stack(extras: Vec<serde_json::Value>) -> PlanSession {
        let mut generator = ScriptedGenerator::new()
            .push_ok(payloads::improvements())
            .push_ok(payloads::market_validation())
            .push_ok(payloads::persona())
            .push_ok(payloads::pricing())
            .push_ok(payloads::tech_stacks());
        for extra in extras {
            generator = generator.push_ok(extra);
        }
        let mut session = session_with(generator);
        session.start_plan("Meal planner for students").unwrap();
        session.improve_idea().await.unwrap();
        session.accept_improvements(None).unwrap();
        session.request_market_validation().await.unwrap();
        session.accept_market_validation(None).unwrap();
        session.generate_persona().await.unwrap();
        session.accept_persona(None).unwrap();
        session.outline_pricing().await.unwrap();
        session.accept_pricing(None).unwrap();
        session.recommend_tech_stack().await.unwrap();
        session.choose_tech_stack(1).unwrap();
        session
    }

    #[tokio::test]
    async fn generate_ideas_rejects_blank_category() {
        let mut session = session_with(ScriptedGenerator::new());
        let err = session.generate_ideas("  ").await.unwrap_err();
        assert!(matches!(err, SessionError::Input(_)));
    }

    #[tokio::test]
    async fn choose_idea_starts_the_plan() {
        let mut session = session_with(ScriptedGenerator::new().push_ok(payloads::ideas()));
        session.generate_ideas("student life").await.unwrap();
        session.choose_idea(0).unwrap();
        assert!(session.plan().unwrap().idea.contains("meal planner"));
        assert!(session.staged().is_none());
        assert_eq!(session.phase(), Phase::Foundations);
    }

    #[tokio::test]
    async fn choose_idea_out_of_range_keeps_staged() {
        let mut session = session_with(ScriptedGenerator::new().push_ok(payloads::ideas()));
        session.generate_ideas("student life").await.unwrap();
        let err = session.choose_idea(9).unwrap_err();
        assert!(matches!(err, SessionError::Selection(9)));
        assert!(session.staged().is_some());
        assert!(session.plan().is_none());
    }

    #[tokio::test]
    async fn setup_actions_rejected_once_plan_exists() {
        let mut session = session_with(ScriptedGenerator::new());
        session.start_plan("idea").unwrap();
        let err = session.generate_ideas("food").await.unwrap_err();
        assert!(matches!(err, SessionError::Gated(Action::GenerateIdeas)));
        let err = session.inspire().await.unwrap_err();
        assert!(matches!(err, SessionError::Gated(Action::Inspire)));
    }

    #[tokio::test]
    async fn generation_failure_leaves_plan_untouched_and_clears_busy() {
        let generator = ScriptedGenerator::new()
            .push_err(GenerationError::Transport("connection refused".to_string()))
            .push_ok(payloads::improvements());
        let mut session = session_with(generator);
        session.start_plan("idea").unwrap();

        let err = session.improve_idea().await.unwrap_err();
        assert!(matches!(err, SessionError::Generation(_)));
        assert!(session.plan().unwrap().idea_improvements.is_empty());
        assert!(session.staged().is_none());
        assert!(!session.busy());

        // The session stays usable after a failure.
        session.improve_idea().await.unwrap();
        session.accept_improvements(None).unwrap();
        assert_eq!(session.plan().unwrap().idea_improvements.len(), 5);
    }

    #[tokio::test]
    async fn contract_violation_is_a_failed_operation() {
        let generator =
            ScriptedGenerator::new().push_ok(serde_json::json!({ "improvements": ["only one"] }));
        let mut session = session_with(generator);
        session.start_plan("idea").unwrap();
        let err = session.improve_idea().await.unwrap_err();
        assert!(matches!(
            err,
            SessionError::Generation(GenerationError::Contract(_))
        ));
        assert!(session.staged().is_none());
    }

    #[tokio::test]
    async fn gated_action_is_rejected() {
        let mut session = session_with(ScriptedGenerator::new());
        session.start_plan("idea").unwrap();
        // Market validation needs improvements first.
        let err = session.request_market_validation().await.unwrap_err();
        assert!(matches!(err, SessionError::Gated(Action::MarketValidation)));
    }

    #[tokio::test]
    async fn accept_with_edits_overrides_generated_values() {
        let generator = ScriptedGenerator::new().push_ok(payloads::improvements());
        let mut session = session_with(generator);
        session.start_plan("idea").unwrap();
        session.improve_idea().await.unwrap();
        session
            .accept_improvements(Some(vec![
                "a".to_string(),
                "b".to_string(),
                "c".to_string(),
                "d".to_string(),
                "e".to_string(),
            ]))
            .unwrap();
        assert_eq!(session.plan().unwrap().idea_improvements[0], "a");
    }

    #[tokio::test]
    async fn wrong_stage_accept_preserves_the_staged_result() {
        let generator = ScriptedGenerator::new().push_ok(payloads::improvements());
        let mut session = session_with(generator);
        session.start_plan("idea").unwrap();
        session.improve_idea().await.unwrap();

        let err = session.accept_pricing(None).unwrap_err();
        assert!(matches!(err, SessionError::WrongStage));
        assert!(matches!(
            session.staged(),
            Some(StagedResult::Improvements(_))
        ));
    }

    #[tokio::test]
    async fn discard_staged_merges_nothing() {
        let generator = ScriptedGenerator::new().push_ok(payloads::improvements());
        let mut session = session_with(generator);
        session.start_plan("idea").unwrap();
        session.improve_idea().await.unwrap();
        session.discard_staged().unwrap();
        assert!(session.staged().is_none());
        assert!(session.plan().unwrap().idea_improvements.is_empty());
        assert!(matches!(
            session.discard_staged().unwrap_err(),
            SessionError::NoStagedResult
        ));
    }

    #[tokio::test]
    async fn full_foundations_chain_reaches_features_phase() {
        let mut session = session_through_stack(vec![]).await;
        let plan = session.plan().unwrap();
        assert_eq!(plan.idea_improvements.len(), 5);
        assert!(plan.market_validation.is_some());
        assert_eq!(plan.personas[0].name, "Alex");
        assert_eq!(plan.pricing.len(), 3);
        assert_eq!(plan.tech_stack.as_ref().unwrap().backend, "Node.js with Express");

        assert_eq!(session.phase(), Phase::Foundations);
        session.generate_mvp_plan().unwrap();
        assert_eq!(session.plan().unwrap().mvp_plan.len(), 6);
        assert_eq!(session.phase(), Phase::Features);
    }

    #[tokio::test]
    async fn toggle_requires_unlocked_section() {
        let mut session = session_through_stack(vec![]).await;
        session.generate_mvp_plan().unwrap();

        // Sections start locked.
        let err = session.toggle_mvp_step(1).unwrap_err();
        assert!(matches!(err, SessionError::Locked(SectionId::MvpPlan)));

        session.set_locked(SectionId::MvpPlan, false);
        session.toggle_mvp_step(1).unwrap();
        assert!(session.plan().unwrap().mvp_plan[0].completed);
        session.toggle_mvp_step(1).unwrap();
        assert!(!session.plan().unwrap().mvp_plan[0].completed);
    }

    #[tokio::test]
    async fn suggestions_append_without_touching_existing_features() {
        let mut session = session_through_stack(vec![payloads::feature_suggestions()]).await;
        session.generate_mvp_plan().unwrap();
        session.set_locked(SectionId::Features, false);

        let custom_id = session.add_custom_feature("Dark mode").unwrap();
        session.suggest_features().await.unwrap();

        let features = &session.plan().unwrap().features;
        assert_eq!(features.len(), 4);
        assert_eq!(features[0].id, custom_id);
        assert_eq!(features[0].impact, Impact::Medium);
        assert_eq!(features[0].category, "Custom");

        // Every feature carries a distinct id.
        let mut ids: Vec<Uuid> = features.iter().map(|f| f.id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 4);
    }

    #[tokio::test]
    async fn step_prompt_is_stored_and_reused() {
        let mut session = session_through_stack(vec![payloads::prompt()]).await;
        session.generate_mvp_plan().unwrap();
        session.set_locked(SectionId::MvpPlan, false);

        let first = session.generate_mvp_step_prompt(2, false).await.unwrap();
        assert!(session.plan().unwrap().mvp_plan[1].prompt.is_some());

        // Only one response was scripted: a second call must reuse the
        // stored prompt rather than generating again.
        let second = session.generate_mvp_step_prompt(2, false).await.unwrap();
        assert_eq!(first, second);

        let err = session.generate_mvp_step_prompt(99, false).await.unwrap_err();
        assert!(matches!(err, SessionError::UnknownId(_)));
    }

    #[tokio::test]
    async fn forced_regeneration_replaces_the_stored_prompt() {
        let mut replacement = payloads::prompt();
        replacement["context"] = serde_json::json!("revised context");
        let mut session = session_through_stack(vec![payloads::prompt(), replacement]).await;
        session.generate_mvp_plan().unwrap();
        session.set_locked(SectionId::MvpPlan, false);

        session.generate_mvp_step_prompt(1, false).await.unwrap();
        let regenerated = session.generate_mvp_step_prompt(1, true).await.unwrap();
        assert_eq!(regenerated.context, "revised context");
    }

    #[tokio::test]
    async fn feature_prompt_round_trip() {
        let mut session = session_through_stack(vec![payloads::prompt()]).await;
        session.generate_mvp_plan().unwrap();
        session.set_locked(SectionId::Features, false);
        let id = session.add_custom_feature("Weekly digest").unwrap();

        let prompt = session.generate_feature_prompt(id, false).await.unwrap();
        assert!(!prompt.context.is_empty());
        let stored = &session.plan().unwrap().features[0];
        assert_eq!(stored.prompt.as_ref().unwrap(), &prompt);
    }

    #[tokio::test]
    async fn design_document_is_staged_then_stored() {
        let mut session = session_through_stack(vec![payloads::design_document()]).await;
        session.generate_mvp_plan().unwrap();

        session.generate_design_doc().await.unwrap();
        assert!(session.design_document().is_none());
        session.accept_design_document().unwrap();
        assert!(session.design_document().unwrap().starts_with("# Design"));
    }

    #[tokio::test]
    async fn persona_mode_single_blocks_second_persona() {
        let mut session = session_through_stack(vec![]).await;
        session.set_persona_mode(PersonaMode::Single);
        let err = session.generate_persona().await.unwrap_err();
        assert!(matches!(err, SessionError::Gated(Action::AddPersona)));
    }

    #[tokio::test]
    async fn remove_persona_respects_lock_and_bounds() {
        let mut session = session_through_stack(vec![]).await;
        let err = session.remove_persona(0).unwrap_err();
        assert!(matches!(err, SessionError::Locked(SectionId::Persona)));

        session.set_locked(SectionId::Persona, false);
        assert!(matches!(
            session.remove_persona(5).unwrap_err(),
            SessionError::Selection(5)
        ));
        session.remove_persona(0).unwrap();
        assert!(session.plan().unwrap().personas.is_empty());
    }

    #[tokio::test]
    async fn edit_draft_save_and_cancel() {
        let mut session = session_through_stack(vec![]).await;
        session.set_locked(SectionId::Idea, false);

        // Cancelled edits change nothing.
        session.begin_edit(SectionId::Idea).unwrap();
        if let SectionDraft::Idea { idea, .. } = session.draft_mut(SectionId::Idea).unwrap() {
            *idea = "scrapped".to_string();
        }
        session.cancel_edit(SectionId::Idea).unwrap();
        assert_eq!(session.plan().unwrap().idea, "Meal planner for students");

        // Saved edits apply atomically.
        session.begin_edit(SectionId::Idea).unwrap();
        if let SectionDraft::Idea { idea, .. } = session.draft_mut(SectionId::Idea).unwrap() {
            *idea = "Meal planner for athletes".to_string();
        }
        session.save_edit(SectionId::Idea).unwrap();
        assert_eq!(session.plan().unwrap().idea, "Meal planner for athletes");
    }

    #[tokio::test]
    async fn begin_edit_rejects_locked_section() {
        let mut session = session_through_stack(vec![]).await;
        let err = session.begin_edit(SectionId::Pricing).unwrap_err();
        assert!(matches!(err, SessionError::Locked(SectionId::Pricing)));
    }

    #[tokio::test]
    async fn profile_draft_saves_to_the_session() {
        let mut session = session_with(ScriptedGenerator::new());
        // The profile draft is open from the start.
        if let SectionDraft::Profile(profile) = session.draft_mut(SectionId::Profile).unwrap() {
            profile.name = "Sam".to_string();
            profile.tech_preferences = vec!["Rust".to_string()];
        }
        session.save_edit(SectionId::Profile).unwrap();
        assert_eq!(session.profile().name, "Sam");
    }

    #[tokio::test]
    async fn launch_requires_an_mvp_plan() {
        let mut session = session_through_stack(vec![]).await;
        assert!(matches!(
            session.mark_launched().unwrap_err(),
            SessionError::Input(_)
        ));
        session.generate_mvp_plan().unwrap();
        session.mark_launched().unwrap();
        assert_eq!(session.phase(), Phase::Launch);
    }

    #[tokio::test]
    async fn reset_clears_the_plan_but_keeps_the_profile() {
        let mut session = session_through_stack(vec![]).await;
        session.update_profile(UserProfile {
            name: "Sam".to_string(),
            ..Default::default()
        });
        session.reset();
        assert!(session.plan().is_none());
        assert_eq!(session.phase(), Phase::Setup);
        assert_eq!(session.profile().name, "Sam");
        // The profile draft reopens seeded with the kept profile.
        match session.draft(SectionId::Profile) {
            Some(SectionDraft::Profile(profile)) => assert_eq!(profile.name, "Sam"),
            other => panic!("expected profile draft, got {other:?}"),
        }
    }
}
