//! Field assignment on open section drafts.
//!
//! `set <field> [n] <value>` from the REPL lands here. Which fields exist
//! depends on the draft variant; positions are 1-based to match how lists
//! are displayed.

use blueprint_core::section::SectionDraft;

/// Apply one `set` command to a draft. Returns a confirmation line.
pub fn apply_set(draft: &mut SectionDraft, args: &[String]) -> Result<String, String> {
    let (field, rest) = args
        .split_first()
        .ok_or_else(|| "usage: set <field> [n] <value>".to_string())?;

    match draft {
        SectionDraft::Profile(profile) => {
            let value = join(rest)?;
            match field.as_str() {
                "name" => profile.name = value,
                "phone" => profile.phone = value,
                "address" => profile.address = value,
                "bio" => profile.bio = value,
                "website" => profile.website = value,
                "tech" => profile.tech_preferences = split_list(&value),
                other => return Err(unknown_field(other, "name, phone, address, bio, website, tech")),
            }
            Ok(format!("profile.{field} updated"))
        }
        SectionDraft::Idea { idea, improvements } => match field.as_str() {
            "idea" => {
                *idea = join(rest)?;
                Ok("idea updated".to_string())
            }
            "improvement" => {
                let (index, value) = indexed(rest, improvements.len())?;
                improvements[index] = value;
                Ok(format!("improvement {} updated", index + 1))
            }
            other => Err(unknown_field(other, "idea, improvement <n>")),
        },
        SectionDraft::Personas(personas) => {
            let (index, value) = indexed(rest, personas.len())?;
            let persona = &mut personas[index];
            match field.as_str() {
                "name" => persona.name = value,
                "bio" => persona.bio = value,
                "demographics" => persona.demographics = value,
                "psychographics" => persona.psychographics = value,
                other => {
                    return Err(unknown_field(
                        other,
                        "name <n>, bio <n>, demographics <n>, psychographics <n>",
                    ));
                }
            }
            Ok(format!("persona {}.{field} updated", index + 1))
        }
        SectionDraft::Pricing(tiers) => {
            let (index, value) = indexed(rest, tiers.len())?;
            let tier = &mut tiers[index];
            match field.as_str() {
                "name" => tier.name = value,
                "price" => tier.price = value,
                "features" => tier.features = split_list(&value),
                other => return Err(unknown_field(other, "name <n>, price <n>, features <n>")),
            }
            Ok(format!("tier {}.{field} updated", index + 1))
        }
        SectionDraft::TechStack(stack) => {
            let value = join(rest)?;
            match field.as_str() {
                "category" => stack.category = value,
                "backend" => stack.backend = value,
                "database" => stack.database = value,
                "authentication" => stack.authentication = value,
                "payments" => stack.payments = value,
                "services" => stack.services = split_list(&value),
                other => {
                    return Err(unknown_field(
                        other,
                        "category, backend, database, authentication, payments, services",
                    ));
                }
            }
            Ok(format!("tech-stack.{field} updated"))
        }
        SectionDraft::MvpPlan(steps) => match field.as_str() {
            "title" => {
                let (index, value) = indexed(rest, steps.len())?;
                steps[index].title = value;
                Ok(format!("step {} title updated", index + 1))
            }
            other => Err(unknown_field(other, "title <n>")),
        },
        SectionDraft::Features(features) => {
            let (index, value) = indexed(rest, features.len())?;
            let feature = &mut features[index];
            match field.as_str() {
                "title" => feature.title = value,
                "category" => feature.category = value,
                "impact" => {
                    feature.impact = value
                        .parse()
                        .map_err(|_| "impact must be High, Medium, or Low".to_string())?;
                }
                other => return Err(unknown_field(other, "title <n>, category <n>, impact <n>")),
            }
            Ok(format!("feature {}.{field} updated", index + 1))
        }
    }
}

fn join(rest: &[String]) -> Result<String, String> {
    if rest.is_empty() {
        return Err("missing value".to_string());
    }
    Ok(rest.join(" "))
}

/// Split `<n> <value...>` with a 1-based bounds check against `len`.
fn indexed(rest: &[String], len: usize) -> Result<(usize, String), String> {
    let (n, value) = rest
        .split_first()
        .ok_or_else(|| "missing position".to_string())?;
    let n: usize = n.parse().map_err(|_| format!("invalid position: {n:?}"))?;
    if n == 0 || n > len {
        return Err(format!("position {n} is out of range (1-{len})"));
    }
    Ok((n - 1, join(value)?))
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn unknown_field(field: &str, available: &str) -> String {
    format!("unknown field {field:?}; available: {available}")
}
