//! Per-section lock and edit state.
//!
//! Each plan section carries two independent bits of presentation-adjacent
//! state: a lock (a locked section rejects every mutation, including
//! in-place augmentation) and an optional open draft (a local snapshot the
//! user edits; the plan only changes when the draft is saved). The state
//! lives outside the [`crate::plan::PlanDocument`] so that document merges
//! never disturb locks or in-progress edits.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::plan::{Feature, MvpStep, Persona, PricingTier, TechStack, UserProfile};

// ---------------------------------------------------------------------------
// Section identity
// ---------------------------------------------------------------------------

/// The lockable/editable sections of a planning session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SectionId {
    Profile,
    Idea,
    Persona,
    Pricing,
    TechStack,
    MvpPlan,
    Features,
}

impl SectionId {
    pub const ALL: [SectionId; 7] = [
        SectionId::Profile,
        SectionId::Idea,
        SectionId::Persona,
        SectionId::Pricing,
        SectionId::TechStack,
        SectionId::MvpPlan,
        SectionId::Features,
    ];
}

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Profile => "profile",
            Self::Idea => "idea",
            Self::Persona => "persona",
            Self::Pricing => "pricing",
            Self::TechStack => "tech-stack",
            Self::MvpPlan => "mvp-plan",
            Self::Features => "features",
        };
        f.write_str(s)
    }
}

impl FromStr for SectionId {
    type Err = SectionIdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "profile" => Ok(Self::Profile),
            "idea" => Ok(Self::Idea),
            "persona" => Ok(Self::Persona),
            "pricing" => Ok(Self::Pricing),
            "tech-stack" => Ok(Self::TechStack),
            "mvp-plan" => Ok(Self::MvpPlan),
            "features" => Ok(Self::Features),
            other => Err(SectionIdParseError(other.to_owned())),
        }
    }
}

/// Error returned when parsing an invalid [`SectionId`] string.
#[derive(Debug, Clone)]
pub struct SectionIdParseError(pub String);

impl fmt::Display for SectionIdParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid section: {:?}", self.0)
    }
}

impl std::error::Error for SectionIdParseError {}

// ---------------------------------------------------------------------------
// Drafts
// ---------------------------------------------------------------------------

/// A local editing snapshot for one section.
///
/// Opened from the current plan (or profile) content, mutated freely, and
/// either saved back atomically or discarded. The variant always matches the
/// section it was opened for.
#[derive(Debug, Clone, PartialEq)]
pub enum SectionDraft {
    Profile(UserProfile),
    Idea {
        idea: String,
        improvements: Vec<String>,
    },
    Personas(Vec<Persona>),
    Pricing(Vec<PricingTier>),
    TechStack(TechStack),
    MvpPlan(Vec<MvpStep>),
    Features(Vec<Feature>),
}

impl SectionDraft {
    /// The section this draft belongs to.
    pub fn section(&self) -> SectionId {
        match self {
            Self::Profile(_) => SectionId::Profile,
            Self::Idea { .. } => SectionId::Idea,
            Self::Personas(_) => SectionId::Persona,
            Self::Pricing(_) => SectionId::Pricing,
            Self::TechStack(_) => SectionId::TechStack,
            Self::MvpPlan(_) => SectionId::MvpPlan,
            Self::Features(_) => SectionId::Features,
        }
    }
}

/// Lock plus optional open draft for one section.
#[derive(Debug, Clone, Default)]
pub struct SectionState {
    pub locked: bool,
    pub draft: Option<SectionDraft>,
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Lock/edit state for every section.
///
/// Every section starts locked except the profile, which starts unlocked
/// with its draft open so a fresh session can be filled in immediately.
#[derive(Debug, Clone)]
pub struct SectionStates {
    states: BTreeMap<SectionId, SectionState>,
}

impl SectionStates {
    pub fn new() -> Self {
        let mut states = BTreeMap::new();
        for id in SectionId::ALL {
            states.insert(
                id,
                SectionState {
                    locked: id != SectionId::Profile,
                    draft: if id == SectionId::Profile {
                        Some(SectionDraft::Profile(UserProfile::default()))
                    } else {
                        None
                    },
                },
            );
        }
        Self { states }
    }

    pub fn is_locked(&self, id: SectionId) -> bool {
        self.states.get(&id).map(|s| s.locked).unwrap_or(false)
    }

    /// Lock or unlock a section. Locking discards any open draft.
    pub fn set_locked(&mut self, id: SectionId, locked: bool) {
        if let Some(state) = self.states.get_mut(&id) {
            state.locked = locked;
            if locked {
                state.draft = None;
            }
        }
    }

    pub fn draft(&self, id: SectionId) -> Option<&SectionDraft> {
        self.states.get(&id).and_then(|s| s.draft.as_ref())
    }

    pub fn draft_mut(&mut self, id: SectionId) -> Option<&mut SectionDraft> {
        self.states.get_mut(&id).and_then(|s| s.draft.as_mut())
    }

    /// Open a draft, replacing any previous one for the same section.
    pub fn open_draft(&mut self, draft: SectionDraft) {
        let id = draft.section();
        if let Some(state) = self.states.get_mut(&id) {
            state.draft = Some(draft);
        }
    }

    /// Close and return the open draft, if any.
    pub fn take_draft(&mut self, id: SectionId) -> Option<SectionDraft> {
        self.states.get_mut(&id).and_then(|s| s.draft.take())
    }
}

impl Default for SectionStates {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
