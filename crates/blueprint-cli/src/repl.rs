//! The interactive planning loop.
//!
//! Reads one command per line, drives the [`PlanSession`], and prints the
//! result. All rendering goes through [`crate::render`] and all parsing
//! through [`crate::command`], so this module is mostly glue.

use std::io::{BufRead, Write};

use anyhow::Result;
use tracing::warn;

use blueprint_core::export::{ExportFormat, Exporter, MarkupExporter, suggested_filename};
use blueprint_core::section::SectionId;
use blueprint_core::session::{PlanSession, SessionError, StagedResult, TutorialFlagStore};

use crate::command::{self, ReplCommand};
use crate::{edit, render};

pub struct Repl {
    session: PlanSession,
    tutorial: Box<dyn TutorialFlagStore>,
    exporter: MarkupExporter,
    /// Section whose draft `set` currently targets. The profile draft is
    /// open from the start.
    editing: Option<SectionId>,
}

impl Repl {
    pub fn new(session: PlanSession, tutorial: Box<dyn TutorialFlagStore>) -> Self {
        Self {
            session,
            tutorial,
            exporter: MarkupExporter,
            editing: Some(SectionId::Profile),
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        if self.tutorial.load().unwrap_or(true) {
            println!("{}\n", render::tutorial());
            if let Err(e) = self.tutorial.store(false) {
                warn!(error = %e, "could not persist tutorial dismissal");
            }
        }

        let stdin = std::io::stdin();
        let mut line = String::new();
        loop {
            print!("blueprint> ");
            std::io::stdout().flush()?;

            line.clear();
            if stdin.lock().read_line(&mut line)? == 0 {
                break; // EOF
            }

            match command::parse(&line) {
                Ok(None) => {}
                Ok(Some(ReplCommand::Quit)) => break,
                Ok(Some(cmd)) => match self.execute(cmd).await {
                    Ok(output) => {
                        if !output.is_empty() {
                            println!("{}", output.trim_end());
                        }
                    }
                    Err(e) => eprintln!("error: {e}"),
                },
                Err(msg) => eprintln!("{msg}"),
            }
        }
        Ok(())
    }

    async fn execute(&mut self, cmd: ReplCommand) -> Result<String, SessionError> {
        match cmd {
            ReplCommand::Idea(text) => {
                self.session.start_plan(&text)?;
                Ok("plan started; `improve` is a good next step".to_string())
            }
            ReplCommand::Ideas(category) => {
                self.session.generate_ideas(&category).await?;
                Ok(self.render_staged())
            }
            ReplCommand::Inspire => {
                let inspiration = self.session.inspire().await?;
                Ok(format!(
                    "idea: {}\ncategory: {}\nstart it with `idea {}`",
                    inspiration.idea, inspiration.category, inspiration.idea,
                ))
            }
            ReplCommand::Improve => {
                self.session.improve_idea().await?;
                Ok(self.render_staged())
            }
            ReplCommand::Validate => {
                self.session.request_market_validation().await?;
                Ok(self.render_staged())
            }
            ReplCommand::Persona => {
                self.session.generate_persona().await?;
                Ok(self.render_staged())
            }
            ReplCommand::RemovePersona(position) => {
                self.session.remove_persona(position - 1)?;
                Ok(format!("persona {position} removed"))
            }
            ReplCommand::Pricing => {
                self.session.outline_pricing().await?;
                Ok(self.render_staged())
            }
            ReplCommand::Tech => {
                self.session.recommend_tech_stack().await?;
                Ok(self.render_staged())
            }
            ReplCommand::Mvp => {
                self.session.generate_mvp_plan()?;
                match self.session.plan() {
                    Some(plan) => Ok(render::mvp_plan(plan)),
                    None => Ok(String::new()),
                }
            }
            ReplCommand::Design => {
                self.session.generate_design_doc().await?;
                Ok(self.render_staged())
            }
            ReplCommand::Suggest => {
                let suggestions = self.session.suggest_features().await?;
                let titles: Vec<&str> = suggestions.iter().map(|s| s.title.as_str()).collect();
                let list = match self.session.plan() {
                    Some(plan) => render::features(plan),
                    None => String::new(),
                };
                Ok(format!("added: {}\n{list}", titles.join(", ")))
            }
            ReplCommand::Feature(title) => {
                self.session.add_custom_feature(&title)?;
                let list = match self.session.plan() {
                    Some(plan) => render::features(plan),
                    None => String::new(),
                };
                Ok(format!("feature added: {title}\n{list}"))
            }
            ReplCommand::PromptStep { id, force } => {
                let prompt = self.session.generate_mvp_step_prompt(id, force).await?;
                Ok(render::prompt(&prompt))
            }
            ReplCommand::PromptFeature { position, force } => {
                let id = self
                    .session
                    .plan()
                    .ok_or(SessionError::NoPlan)?
                    .features
                    .get(position - 1)
                    .map(|f| f.id)
                    .ok_or(SessionError::Selection(position))?;
                let prompt = self.session.generate_feature_prompt(id, force).await?;
                Ok(render::prompt(&prompt))
            }
            ReplCommand::Toggle(id) => {
                self.session.toggle_mvp_step(id)?;
                match self.session.plan() {
                    Some(plan) => Ok(render::mvp_plan(plan)),
                    None => Ok(String::new()),
                }
            }
            ReplCommand::Accept => self.accept_staged(),
            ReplCommand::Pick(position) => self.pick_staged(position - 1),
            ReplCommand::Discard => {
                self.session.discard_staged()?;
                Ok("discarded".to_string())
            }
            ReplCommand::Lock(section) => {
                self.session.set_locked(section, true);
                if self.editing == Some(section) {
                    self.editing = None;
                }
                Ok(format!("{section} locked"))
            }
            ReplCommand::Unlock(section) => {
                self.session.set_locked(section, false);
                Ok(format!("{section} unlocked"))
            }
            ReplCommand::Edit(section) => {
                self.session.begin_edit(section)?;
                self.editing = Some(section);
                Ok(format!(
                    "editing {section}; `set <field> [n] <value>`, then `save {section}` or `cancel {section}`"
                ))
            }
            ReplCommand::Set(args) => {
                let section = self
                    .editing
                    .ok_or_else(|| SessionError::Input("no draft open; `edit <section>` first".to_string()))?;
                let draft = self.session.draft_mut(section)?;
                edit::apply_set(draft, &args).map_err(SessionError::Input)
            }
            ReplCommand::Save(section) => {
                self.session.save_edit(section)?;
                if self.editing == Some(section) {
                    self.editing = None;
                }
                Ok(format!("{section} saved"))
            }
            ReplCommand::Cancel(section) => {
                self.session.cancel_edit(section)?;
                if self.editing == Some(section) {
                    self.editing = None;
                }
                Ok(format!("{section} edit cancelled"))
            }
            ReplCommand::Mode(mode) => {
                self.session.set_persona_mode(mode);
                Ok("persona mode updated".to_string())
            }
            ReplCommand::Profile => Ok(render::profile(self.session.profile())),
            ReplCommand::Status => Ok(render::status(&self.session)),
            ReplCommand::Launch => {
                self.session.mark_launched()?;
                Ok("launched -- congratulations".to_string())
            }
            ReplCommand::Export(format) => self.export(format),
            ReplCommand::Tutorial => Ok(render::tutorial().to_string()),
            ReplCommand::New => {
                self.session.reset();
                self.editing = Some(SectionId::Profile);
                Ok("session reset".to_string())
            }
            ReplCommand::Help => Ok(render::help().to_string()),
            ReplCommand::Quit => Ok(String::new()),
        }
    }

    fn render_staged(&self) -> String {
        match self.session.staged() {
            Some(result) => render::staged(result),
            None => String::new(),
        }
    }

    fn accept_staged(&mut self) -> Result<String, SessionError> {
        match self.session.staged() {
            Some(StagedResult::Improvements(_)) => {
                self.session.accept_improvements(None)?;
                Ok("improvements merged".to_string())
            }
            Some(StagedResult::Validation(_)) => {
                self.session.accept_market_validation(None)?;
                Ok("market validation merged".to_string())
            }
            Some(StagedResult::Persona(_)) => {
                self.session.accept_persona(None)?;
                Ok("persona added".to_string())
            }
            Some(StagedResult::Pricing(_)) => {
                self.session.accept_pricing(None)?;
                Ok("pricing merged".to_string())
            }
            Some(StagedResult::DesignDoc(_)) => {
                self.session.accept_design_document()?;
                Ok("design document stored".to_string())
            }
            Some(StagedResult::Ideas(_)) | Some(StagedResult::TechStackOptions(_)) => {
                Err(SessionError::Input("this result is a list; use `pick <n>`".to_string()))
            }
            None => Err(SessionError::NoStagedResult),
        }
    }

    fn pick_staged(&mut self, index: usize) -> Result<String, SessionError> {
        match self.session.staged() {
            Some(StagedResult::Ideas(_)) => {
                self.session.choose_idea(index)?;
                Ok("plan started; `improve` is a good next step".to_string())
            }
            Some(StagedResult::TechStackOptions(_)) => {
                self.session.choose_tech_stack(index)?;
                Ok("tech stack adopted".to_string())
            }
            Some(_) => Err(SessionError::Input("this result is not a list; use `accept`".to_string())),
            None => Err(SessionError::NoStagedResult),
        }
    }

    fn export(&self, format: ExportFormat) -> Result<String, SessionError> {
        let plan = self.session.plan().ok_or(SessionError::NoPlan)?;
        let bytes = self
            .exporter
            .export(plan, format)
            .map_err(|e| SessionError::Input(e.to_string()))?;
        let filename = suggested_filename(plan, format);
        std::fs::write(&filename, &bytes)
            .map_err(|e| SessionError::Input(format!("could not write {filename}: {e}")))?;
        Ok(format!("wrote {filename} ({} bytes)", bytes.len()))
    }
}
