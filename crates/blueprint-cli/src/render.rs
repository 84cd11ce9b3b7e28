//! Plain-text rendering for the REPL.

use blueprint_core::gate::Phase;
use blueprint_core::plan::{PlanDocument, Prompt, UserProfile};
use blueprint_core::section::SectionId;
use blueprint_core::session::{PlanSession, StagedResult};

pub fn help() -> &'static str {
    "\
Setup:
  idea <text>            start a plan from your own idea
  ideas <category>       generate three idea candidates (then: pick <n>)
  inspire                generate a random idea and category

Foundations:
  improve                suggest five idea improvements     (then: accept | discard)
  validate               market validation report           (then: accept | discard)
  persona                generate a customer persona        (then: accept | discard)
  remove persona <n>     drop a persona
  pricing                three-tier pricing model           (then: accept | discard)
  tech                   three tech stack candidates        (then: pick <n> | discard)
  mvp                    instantiate the MVP checklist

Features:
  design                 technical design document          (then: accept | discard)
  suggest                three feature suggestions (added immediately)
  feature <title>        add a custom feature
  toggle <id>            flip an MVP step's completion
  prompt step <id>       build brief for an MVP step   (--force to regenerate)
  prompt feature <n>     build brief for a feature     (--force to regenerate)
  launch                 mark the app as launched

Sections (profile, idea, persona, pricing, tech-stack, mvp-plan, features):
  lock/unlock <section>  toggle the section lock
  edit <section>         open an editing draft
  set <field> [n] <val>  change a field on the open draft
  save/cancel <section>  apply or drop the draft

Other:
  mode single|multi      persona gate variant
  profile                show the founder profile
  status                 show phase, plan summary, available actions
  export markdown|doc|pdf
  tutorial               show the walkthrough again
  new                    discard the plan and start over
  quit"
}

pub fn tutorial() -> &'static str {
    "\
Welcome to blueprint. The planner walks one app idea from a raw sentence to
a validated MVP checklist:

  1. Start with `idea <text>`, `ideas <category>`, or `inspire`.
  2. Work the chain: improve -> validate -> persona -> pricing -> tech -> mvp.
     Each AI result is staged for review; `accept` (or `pick <n>`) merges it,
     `discard` throws it away. Nothing changes without your say-so.
  3. After `mvp`, add features (`suggest`, `feature <title>`), tick off steps
     (`toggle <id>`), and generate build briefs (`prompt step <id>`).
  4. Unlock a section before changing it; `edit` + `set` + `save` for edits.
  5. `export markdown` writes the plan to a file; `launch` when you ship.

`status` shows what is available right now. `help` lists every command."
}

pub fn status(session: &PlanSession) -> String {
    let mut out = format!("phase: {}\n", session.phase());
    match session.plan() {
        None => {
            out.push_str("no plan yet; start with `idea <text>`, `ideas <category>`, or `inspire`\n");
        }
        Some(plan) => {
            out.push_str(&format!("idea: {}\n", plan.idea));
            out.push_str(&summary_line("improvements", plan.idea_improvements.len()));
            out.push_str(&format!(
                "  validation: {}\n",
                if plan.market_validation.is_some() { "done" } else { "-" }
            ));
            out.push_str(&summary_line("personas", plan.personas.len()));
            out.push_str(&summary_line("pricing tiers", plan.pricing.len()));
            out.push_str(&format!(
                "  tech stack: {}\n",
                plan.tech_stack.as_ref().map(|s| s.backend.as_str()).unwrap_or("-")
            ));
            if plan.mvp_plan.is_empty() {
                out.push_str("  mvp plan: -\n");
            } else {
                let done = plan.mvp_plan.iter().filter(|s| s.completed).count();
                out.push_str(&format!("  mvp plan: {done}/{} steps done\n", plan.mvp_plan.len()));
            }
            out.push_str(&summary_line("features", plan.features.len()));
        }
    }
    if session.design_document().is_some() {
        out.push_str("design document: ready\n");
    }
    let locked: Vec<String> = SectionId::ALL
        .into_iter()
        .filter(|id| session.is_locked(*id))
        .map(|id| id.to_string())
        .collect();
    if !locked.is_empty() {
        out.push_str(&format!("locked sections: {}\n", locked.join(", ")));
    }
    if session.phase() != Phase::Setup {
        let actions: Vec<String> = session
            .enabled_actions()
            .into_iter()
            .map(|a| a.to_string())
            .collect();
        if actions.is_empty() {
            out.push_str("available actions: none\n");
        } else {
            out.push_str(&format!("available actions: {}\n", actions.join(", ")));
        }
    }
    if let Some(staged) = session.staged() {
        out.push_str(&format!("awaiting review:\n{}", self::staged(staged)));
    }
    out
}

fn summary_line(label: &str, count: usize) -> String {
    if count == 0 {
        format!("  {label}: -\n")
    } else {
        format!("  {label}: {count}\n")
    }
}

pub fn staged(result: &StagedResult) -> String {
    match result {
        StagedResult::Ideas(ideas) => {
            let mut out = String::from("idea candidates:\n");
            for (i, idea) in ideas.iter().enumerate() {
                out.push_str(&format!("  {}. {idea}\n", i + 1));
            }
            out.push_str("pick <n> to start, or discard\n");
            out
        }
        StagedResult::Improvements(improvements) => {
            let mut out = String::from("suggested improvements:\n");
            for (i, item) in improvements.iter().enumerate() {
                out.push_str(&format!("  {}. {item}\n", i + 1));
            }
            out.push_str("accept to merge, or discard\n");
            out
        }
        StagedResult::Validation(v) => format!(
            "market validation:\n  core problem: {}\n  founder profile: {}\n  community research: {}\n  competitors: {}\n  differentiation: {}\n  risk: {}\naccept to merge, or discard\n",
            v.core_problem,
            v.founder_profile,
            v.community_research.join(", "),
            v.competitors.join(", "),
            v.differentiation.join(", "),
            v.risk_assessment,
        ),
        StagedResult::Persona(p) => format!(
            "persona: {}\n  demographics: {}\n  psychographics: {}\n  bio: {}\n  goals: {}\n  pain points: {}\naccept to merge, or discard\n",
            p.name,
            p.demographics,
            p.psychographics,
            p.bio,
            p.goals.join(", "),
            p.pain_points.join(", "),
        ),
        StagedResult::Pricing(tiers) => {
            let mut out = String::from("pricing tiers:\n");
            for tier in tiers {
                out.push_str(&format!(
                    "  {} ({}): {}\n",
                    tier.name,
                    tier.price,
                    tier.features.join(", ")
                ));
            }
            out.push_str("accept to merge, or discard\n");
            out
        }
        StagedResult::TechStackOptions(stacks) => {
            let mut out = String::from("tech stack candidates:\n");
            for (i, s) in stacks.iter().enumerate() {
                out.push_str(&format!(
                    "  {}. {} -- backend {}, db {}, auth {}, payments {}, services: {}\n",
                    i + 1,
                    s.category,
                    s.backend,
                    s.database,
                    s.authentication,
                    s.payments,
                    s.services.join(", "),
                ));
            }
            out.push_str("pick <n> to adopt, or discard\n");
            out
        }
        StagedResult::DesignDoc(doc) => {
            format!("design document:\n{doc}\naccept to keep, or discard\n")
        }
    }
}

pub fn prompt(prompt: &Prompt) -> String {
    let mut out = format!(
        "1. Context: {}\n2. User Journey: {}\n3. Technology: {}\n4. Design: {}\n",
        prompt.context, prompt.user_journey, prompt.technology, prompt.design,
    );
    if let Some(negative) = &prompt.negative_prompt {
        out.push_str(&format!("5. Negative Prompt: {negative}\n"));
    }
    out
}

pub fn profile(profile: &UserProfile) -> String {
    format!(
        "name: {}\nphone: {}\naddress: {}\nbio: {}\nwebsite: {}\ntech preferences: {}\n",
        blank(&profile.name),
        blank(&profile.phone),
        blank(&profile.address),
        blank(&profile.bio),
        blank(&profile.website),
        if profile.tech_preferences.is_empty() {
            "-".to_string()
        } else {
            profile.tech_preferences.join(", ")
        },
    )
}

pub fn mvp_plan(plan: &PlanDocument) -> String {
    let mut out = String::from("mvp checklist:\n");
    for step in &plan.mvp_plan {
        let mark = if step.completed { "x" } else { " " };
        let brief = if step.prompt.is_some() { " [brief ready]" } else { "" };
        out.push_str(&format!("  [{mark}] {}. {}{brief}\n", step.id, step.title));
    }
    out
}

pub fn features(plan: &PlanDocument) -> String {
    let mut out = String::from("features:\n");
    for (i, f) in plan.features.iter().enumerate() {
        let brief = if f.prompt.is_some() { " [brief ready]" } else { "" };
        out.push_str(&format!(
            "  {}. {} ({} Impact, {}){brief}\n",
            i + 1,
            f.title,
            f.impact,
            f.category,
        ));
    }
    out
}

fn blank(value: &str) -> &str {
    if value.trim().is_empty() { "-" } else { value }
}
