//! Core of the blueprint planner: the plan document model, the phase-gated
//! action graph, generation contracts, and the session protocols
//! (dispatch, review/merge, per-section lock/edit).
//!
//! This crate performs no I/O. The AI generation capability is reached
//! through the [`genai::Generator`] trait; durable storage is reached
//! through [`session::TutorialFlagStore`]; file export is reached through
//! [`export::Exporter`]. Presentation layers (the CLI) consume the plan
//! document read-only and drive mutations through [`session::PlanSession`].

pub mod export;
pub mod gate;
pub mod genai;
pub mod plan;
pub mod section;
pub mod session;
