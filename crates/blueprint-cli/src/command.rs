//! Parsing of interactive REPL commands.
//!
//! One line of input becomes one [`ReplCommand`]. Parsing is pure so the
//! whole command surface is unit-tested without a terminal.

use blueprint_core::export::ExportFormat;
use blueprint_core::gate::PersonaMode;
use blueprint_core::section::SectionId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    /// Start a plan from a typed idea.
    Idea(String),
    /// Generate idea candidates for a category.
    Ideas(String),
    Inspire,
    Improve,
    Validate,
    Persona,
    RemovePersona(usize),
    Pricing,
    Tech,
    Mvp,
    Design,
    Suggest,
    /// Add a custom feature by title.
    Feature(String),
    /// Generate (or show) the build brief for an MVP step.
    PromptStep { id: u32, force: bool },
    /// Generate (or show) the build brief for a feature, by list position.
    PromptFeature { position: usize, force: bool },
    Toggle(u32),
    Accept,
    /// 1-based selection from a staged candidate list.
    Pick(usize),
    Discard,
    Lock(SectionId),
    Unlock(SectionId),
    Edit(SectionId),
    /// Field assignment on the open draft; raw tokens after `set`.
    Set(Vec<String>),
    Save(SectionId),
    Cancel(SectionId),
    Mode(PersonaMode),
    Profile,
    Status,
    Launch,
    Export(ExportFormat),
    Tutorial,
    New,
    Help,
    Quit,
}

/// Parse one input line. Empty lines are `None`; anything unparseable is a
/// user-facing error string.
pub fn parse(line: &str) -> Result<Option<ReplCommand>, String> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let Some((&head, args)) = tokens.split_first() else {
        return Ok(None);
    };
    let rest = || args.join(" ");
    let command = match head {
        "idea" => {
            if args.is_empty() {
                return Err("usage: idea <your app idea>".to_string());
            }
            ReplCommand::Idea(rest())
        }
        "ideas" => {
            if args.is_empty() {
                return Err("usage: ideas <category>".to_string());
            }
            ReplCommand::Ideas(rest())
        }
        "inspire" => ReplCommand::Inspire,
        "improve" => ReplCommand::Improve,
        "validate" => ReplCommand::Validate,
        "persona" => ReplCommand::Persona,
        "remove" => match args {
            ["persona", n] => ReplCommand::RemovePersona(parse_position(n)?),
            _ => return Err("usage: remove persona <n>".to_string()),
        },
        "pricing" => ReplCommand::Pricing,
        "tech" => ReplCommand::Tech,
        "mvp" => ReplCommand::Mvp,
        "design" => ReplCommand::Design,
        "suggest" => ReplCommand::Suggest,
        "feature" => {
            if args.is_empty() {
                return Err("usage: feature <title>".to_string());
            }
            ReplCommand::Feature(rest())
        }
        "prompt" => match args {
            ["step", id, flags @ ..] => ReplCommand::PromptStep {
                id: id
                    .parse()
                    .map_err(|_| format!("invalid step id: {id:?}"))?,
                force: parse_force(flags)?,
            },
            ["feature", n, flags @ ..] => ReplCommand::PromptFeature {
                position: parse_position(n)?,
                force: parse_force(flags)?,
            },
            _ => return Err("usage: prompt step <id> [--force] | prompt feature <n> [--force]".to_string()),
        },
        "toggle" => match args {
            [id] => ReplCommand::Toggle(
                id.parse().map_err(|_| format!("invalid step id: {id:?}"))?,
            ),
            _ => return Err("usage: toggle <step id>".to_string()),
        },
        "accept" => ReplCommand::Accept,
        "pick" => match args {
            [n] => ReplCommand::Pick(parse_position(n)?),
            _ => return Err("usage: pick <n>".to_string()),
        },
        "discard" => ReplCommand::Discard,
        "lock" => ReplCommand::Lock(parse_section(args)?),
        "unlock" => ReplCommand::Unlock(parse_section(args)?),
        "edit" => ReplCommand::Edit(parse_section(args)?),
        "set" => {
            if args.len() < 2 {
                return Err("usage: set <field> [n] <value>".to_string());
            }
            ReplCommand::Set(args.iter().map(|s| s.to_string()).collect())
        }
        "save" => ReplCommand::Save(parse_section(args)?),
        "cancel" => ReplCommand::Cancel(parse_section(args)?),
        "mode" => match args {
            ["single"] => ReplCommand::Mode(PersonaMode::Single),
            ["multi"] => ReplCommand::Mode(PersonaMode::Multi),
            _ => return Err("usage: mode single|multi".to_string()),
        },
        "profile" => ReplCommand::Profile,
        "status" => ReplCommand::Status,
        "launch" => ReplCommand::Launch,
        "export" => match args {
            [format] => ReplCommand::Export(
                format
                    .parse()
                    .map_err(|_| format!("unknown export format: {format:?} (markdown, doc, pdf)"))?,
            ),
            _ => return Err("usage: export markdown|doc|pdf".to_string()),
        },
        "tutorial" => ReplCommand::Tutorial,
        "new" => ReplCommand::New,
        "help" | "?" => ReplCommand::Help,
        "quit" | "exit" | "q" => ReplCommand::Quit,
        other => return Err(format!("unknown command: {other:?} (try `help`)")),
    };
    Ok(Some(command))
}

fn parse_position(token: &str) -> Result<usize, String> {
    let n: usize = token
        .parse()
        .map_err(|_| format!("invalid number: {token:?}"))?;
    if n == 0 {
        return Err("positions are 1-based".to_string());
    }
    Ok(n)
}

fn parse_force(flags: &[&str]) -> Result<bool, String> {
    match flags {
        [] => Ok(false),
        ["--force"] => Ok(true),
        other => Err(format!("unexpected arguments: {}", other.join(" "))),
    }
}

fn parse_section(args: &[&str]) -> Result<SectionId, String> {
    match args {
        [section] => section
            .parse()
            .map_err(|_| format!("unknown section: {section:?} (profile, idea, persona, pricing, tech-stack, mvp-plan, features)")),
        _ => Err("expected a section name".to_string()),
    }
}
