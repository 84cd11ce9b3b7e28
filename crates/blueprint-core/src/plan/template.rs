//! The fixed MVP checklist template.

use super::MvpStep;

/// Titles for the six-step MVP checklist, in order. Ids are 1-based and
/// stable: generated prompts are stored back onto steps by id.
const MVP_STEP_TITLES: [&str; 6] = [
    "Set up your app (Project initialization, basic structure)",
    "Add and test database",
    "Add and test authentication",
    "Add and test payments",
    "Build and test core features (e.g., first feature, brain dump, SMS reminders)",
    "Test and deploy your app",
];

/// Instantiate the MVP checklist: six steps, none completed, no prompts.
pub fn mvp_checklist() -> Vec<MvpStep> {
    MVP_STEP_TITLES
        .iter()
        .enumerate()
        .map(|(i, title)| MvpStep {
            id: (i + 1) as u32,
            title: (*title).to_string(),
            completed: false,
            prompt: None,
        })
        .collect()
}
