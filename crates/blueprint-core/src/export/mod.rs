//! Plan export.
//!
//! Export walks the populated sections of a plan in a fixed order
//! (improvements, validation, personas, tech stack, MVP plan, features) and
//! renders them to a byte buffer. Writing the buffer to disk is the
//! presentation layer's job.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::plan::{MvpStep, PlanDocument};

// ---------------------------------------------------------------------------
// Formats and errors
// ---------------------------------------------------------------------------

/// Supported export targets.
///
/// `Doc` is Word-compatible HTML with the Office namespace header; `Pdf` is
/// recognized but has no renderer in this process and always fails with
/// [`ExportError::RendererUnavailable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Markdown,
    Doc,
    Pdf,
}

impl ExportFormat {
    /// File extension for the format, without the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Markdown => "md",
            Self::Doc => "doc",
            Self::Pdf => "pdf",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Markdown => "markdown",
            Self::Doc => "doc",
            Self::Pdf => "pdf",
        };
        f.write_str(s)
    }
}

impl FromStr for ExportFormat {
    type Err = ExportFormatParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "markdown" | "md" => Ok(Self::Markdown),
            "doc" | "word" => Ok(Self::Doc),
            "pdf" => Ok(Self::Pdf),
            other => Err(ExportFormatParseError(other.to_owned())),
        }
    }
}

/// Error returned when parsing an invalid [`ExportFormat`] string.
#[derive(Debug, Clone)]
pub struct ExportFormatParseError(pub String);

impl fmt::Display for ExportFormatParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid export format: {:?}", self.0)
    }
}

impl std::error::Error for ExportFormatParseError {}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("no renderer available for {0} in this environment")]
    RendererUnavailable(ExportFormat),
}

// ---------------------------------------------------------------------------
// Exporter
// ---------------------------------------------------------------------------

/// Renders a plan to bytes in a given format.
pub trait Exporter: Send + Sync {
    fn export(&self, plan: &PlanDocument, format: ExportFormat) -> Result<Vec<u8>, ExportError>;
}

const _: () = {
    fn _assert_object_safe(_: &dyn Exporter) {}
};

/// Suggested output filename: the idea with spaces collapsed to
/// underscores, plus the format extension.
pub fn suggested_filename(plan: &PlanDocument, format: ExportFormat) -> String {
    let stem = if plan.idea.trim().is_empty() {
        "app_plan".to_string()
    } else {
        plan.idea.replace(' ', "_")
    };
    format!("{stem}.{}", format.extension())
}

// ---------------------------------------------------------------------------
// Markup exporter
// ---------------------------------------------------------------------------

/// The built-in exporter: Markdown and Word-compatible HTML.
#[derive(Debug, Default)]
pub struct MarkupExporter;

impl Exporter for MarkupExporter {
    fn export(&self, plan: &PlanDocument, format: ExportFormat) -> Result<Vec<u8>, ExportError> {
        match format {
            ExportFormat::Markdown => Ok(render_markdown(plan).into_bytes()),
            ExportFormat::Doc => Ok(render_doc(plan).into_bytes()),
            ExportFormat::Pdf => Err(ExportError::RendererUnavailable(format)),
        }
    }
}

fn step_label(step: &MvpStep) -> String {
    let status = if step.completed { "Completed" } else { "Pending" };
    format!("{} ({status})", step.title)
}

fn render_markdown(plan: &PlanDocument) -> String {
    let mut out = format!("# App Plan: {}\n", plan.idea);
    let mut section = |title: &str, body: String| {
        out.push_str(&format!("\n## {title}\n\n{body}"));
    };
    let list = |items: &[String]| -> String {
        items.iter().map(|i| format!("- {i}\n")).collect()
    };

    if !plan.idea_improvements.is_empty() {
        section("Idea Improvements", list(&plan.idea_improvements));
    }
    if let Some(v) = &plan.market_validation {
        section(
            "Market Validation",
            format!(
                "**Core Problem:** {}\n\n**Founder Profile:** {}\n\n**Community Research:**\n{}\n**Competitors:**\n{}\n**Differentiation:**\n{}\n**Risk Assessment:** {}\n",
                v.core_problem,
                v.founder_profile,
                list(&v.community_research),
                list(&v.competitors),
                list(&v.differentiation),
                v.risk_assessment,
            ),
        );
    }
    for persona in &plan.personas {
        section(
            &format!("Customer Persona: {}", persona.name),
            format!(
                "**Bio:** {}\n\n**Demographics:** {}\n\n**Goals:**\n{}\n**Pain Points:**\n{}",
                persona.bio,
                persona.demographics,
                list(&persona.goals),
                list(&persona.pain_points),
            ),
        );
    }
    if let Some(s) = &plan.tech_stack {
        section(
            "Tech Stack",
            format!(
                "**Category:** {}\n\n**Backend:** {}\n\n**Database:** {}\n\n**Authentication:** {}\n\n**Payments:** {}\n\n**Services:**\n{}",
                s.category, s.backend, s.database, s.authentication, s.payments, list(&s.services),
            ),
        );
    }
    if !plan.mvp_plan.is_empty() {
        let steps: Vec<String> = plan.mvp_plan.iter().map(step_label).collect();
        section("MVP Plan", list(&steps));
    }
    if !plan.features.is_empty() {
        let features: Vec<String> = plan
            .features
            .iter()
            .map(|f| format!("{} ({} Impact, {})", f.title, f.impact, f.category))
            .collect();
        section("Features", list(&features));
    }
    out
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

fn render_doc(plan: &PlanDocument) -> String {
    let mut body = format!("<h1>App Plan: {}</h1>", escape_html(&plan.idea));
    let mut section = |title: &str, content: String| {
        body.push_str(&format!("<h2>{}</h2><div>{content}</div><br/>", escape_html(title)));
    };
    let list = |items: &[String]| -> String {
        let entries: String = items
            .iter()
            .map(|i| format!("<li>{}</li>", escape_html(i)))
            .collect();
        format!("<ul>{entries}</ul>")
    };

    if !plan.idea_improvements.is_empty() {
        section("Idea Improvements", list(&plan.idea_improvements));
    }
    if let Some(v) = &plan.market_validation {
        section(
            "Market Validation",
            format!(
                "<p><b>Core Problem:</b> {}</p><p><b>Founder Profile:</b> {}</p><p><b>Community Research:</b> {}</p><p><b>Competitors:</b> {}</p><p><b>Differentiation:</b> {}</p><p><b>Risk Assessment:</b> {}</p>",
                escape_html(&v.core_problem),
                escape_html(&v.founder_profile),
                list(&v.community_research),
                list(&v.competitors),
                list(&v.differentiation),
                escape_html(&v.risk_assessment),
            ),
        );
    }
    for persona in &plan.personas {
        section(
            &format!("Customer Persona: {}", persona.name),
            format!(
                "<p><b>Bio:</b> {}</p><p><b>Demographics:</b> {}</p><b>Goals:</b>{}<b>Pain Points:</b>{}",
                escape_html(&persona.bio),
                escape_html(&persona.demographics),
                list(&persona.goals),
                list(&persona.pain_points),
            ),
        );
    }
    if let Some(s) = &plan.tech_stack {
        section(
            "Tech Stack",
            format!(
                "<p><b>Category:</b> {}</p><p><b>Backend:</b> {}</p><p><b>Database:</b> {}</p><p><b>Authentication:</b> {}</p><p><b>Payments:</b> {}</p><b>Services:</b> {}",
                escape_html(&s.category),
                escape_html(&s.backend),
                escape_html(&s.database),
                escape_html(&s.authentication),
                escape_html(&s.payments),
                list(&s.services),
            ),
        );
    }
    if !plan.mvp_plan.is_empty() {
        let steps: Vec<String> = plan.mvp_plan.iter().map(step_label).collect();
        section("MVP Plan", list(&steps));
    }
    if !plan.features.is_empty() {
        let features: Vec<String> = plan
            .features
            .iter()
            .map(|f| format!("{} ({} Impact, {})", f.title, f.impact, f.category))
            .collect();
        section("Features", list(&features));
    }

    // Office namespace header makes Word open the file natively.
    format!(
        "<html xmlns:o='urn:schemas-microsoft-com:office:office' \
         xmlns:w='urn:schemas-microsoft-com:office:word' \
         xmlns='http://www.w3.org/TR/REC-html40'>\
         <head><meta charset='utf-8'><title>App Plan</title></head><body>{body}</body></html>"
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
