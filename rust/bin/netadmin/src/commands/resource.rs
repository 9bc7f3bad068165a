//! Entity commands driven through the admin shell.
//!
//! `netadmin list ont`, `netadmin create cable --set name=Feeder ...`.
//! Writes go through the same form controller the pages use, so the
//! field whitelist and rule table apply on the command line too.

use anyhow::Result;
use clap::ValueEnum;
use netadmin_core::ListParams;
use netadmin_form::{FormSession, SubmitOutcome};
use netadmin_inventory::{AdminShell, EntityKind, Page, all_routes};
use serde_json::Value;

/// Output format of read commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Output {
    Table,
    Json,
}

/// Split a `key=value` assignment.
pub fn parse_assignment(raw: &str) -> Result<(String, String)> {
    let Some((key, value)) = raw.split_once('=') else {
        anyhow::bail!("Invalid assignment \"{}\", expected key=value.", raw);
    };
    let key = key.trim();
    if key.is_empty() {
        anyhow::bail!("Invalid assignment \"{}\", empty key.", raw);
    }
    Ok((key.to_string(), value.to_string()))
}

/// Render `rows` as a fixed-width table over `columns`.
pub fn render_table(rows: &[Value], columns: &[&str]) -> String {
    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|row| columns.iter().map(|c| cell(row.get(*c))).collect())
        .collect();

    let widths: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(i, c)| {
            cells
                .iter()
                .map(|r| r[i].chars().count())
                .chain(std::iter::once(c.len()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = String::new();
    let header: Vec<String> = columns.iter().map(|c| c.to_uppercase()).collect();
    push_line(&mut out, &header, &widths);
    for row in &cells {
        push_line(&mut out, row, &widths);
    }
    out
}

fn push_line(out: &mut String, cells: &[String], widths: &[usize]) {
    let line: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(c, w)| format!("{:w$}", c, w = *w))
        .collect();
    out.push_str(line.join("  ").trim_end());
    out.push('\n');
}

fn cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => "-".to_string(),
        Some(Value::String(s)) if s.is_empty() => "-".to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// `id` followed by the entity's form fields.
fn columns(entity: EntityKind) -> Vec<&'static str> {
    let schema = entity.schema();
    std::iter::once("id")
        .chain(schema.fields.iter().map(|f| f.name))
        .collect()
}

fn print_rows(entity: EntityKind, rows: &[Value], output: Output) -> Result<()> {
    match output {
        Output::Json => println!("{}", serde_json::to_string_pretty(rows)?),
        Output::Table if rows.is_empty() => println!("No {} records.", entity),
        Output::Table => print!("{}", render_table(rows, &columns(entity))),
    }
    Ok(())
}

fn print_record(entity: EntityKind, record: &Value, output: Output) -> Result<()> {
    match output {
        Output::Json => println!("{}", serde_json::to_string_pretty(record)?),
        Output::Table => {
            for name in columns(entity) {
                println!("{:16} {}", name, cell(record.get(name)));
            }
        }
    }
    Ok(())
}

/// Print the route table.
pub fn routes() {
    println!("{:36} {}", "PATTERN", "PAGE");
    for route in all_routes() {
        println!("{:36} {}", route.pattern(), route.title());
    }
}

pub fn menu(shell: &AdminShell) {
    for item in shell.menu() {
        println!("{:28} {}", item.label, item.path);
    }
}

/// Navigate to `path` and print the resulting page.
pub async fn open(shell: &AdminShell, path: &str, output: Output) -> Result<()> {
    match shell.navigate(path).await? {
        Page::Login => println!("Login page. Run `netadmin login`."),
        Page::Dashboard { menu } => {
            println!("Dashboard");
            for item in menu {
                println!("  {:28} {}", item.label, item.path);
            }
        }
        Page::List {
            entity,
            location_id,
            rows,
        } => {
            if let Some(loc) = location_id {
                println!("{} at location {}", entity.label(), loc);
            }
            print_rows(entity, &rows, output)?;
        }
        Page::Form { entity, mode, session } => {
            println!("{} form ({})", entity.label(), mode.as_str());
            print_draft(session.as_ref());
        }
    }
    Ok(())
}

fn print_draft(session: &dyn FormSession) {
    let draft = session.draft();
    for field in &session.schema().fields {
        let marker = if session.schema().is_required(field.name) { "*" } else { " " };
        println!(
            "  {}{:16} {:10} {}",
            marker,
            field.name,
            field.kind.as_str(),
            draft.get(field.name)
        );
    }
}

pub async fn list(
    shell: &AdminShell,
    entity: EntityKind,
    location: Option<&str>,
    output: Output,
) -> Result<()> {
    if location.is_some() && !entity.scoped_by_location() {
        anyhow::bail!("{} records cannot be filtered by location.", entity.label());
    }
    let params = location.map(ListParams::by_location).unwrap_or_default();
    let rows = shell.list(entity, &params).await?;
    print_rows(entity, &rows, output)
}

pub async fn get(shell: &AdminShell, entity: EntityKind, id: &str, output: Output) -> Result<()> {
    let record = shell.get(entity, id).await?;
    print_record(entity, &record, output)
}

/// Create (no `id`) or update record `id` from `key=value` assignments.
///
/// Returns the saved record; invalid input is reported per field and
/// turned into an error.
pub async fn save(
    shell: &AdminShell,
    entity: EntityKind,
    id: Option<&str>,
    assignments: &[String],
) -> Result<Value> {
    let session = shell.open_form(entity, id).await?;
    for raw in assignments {
        let (key, value) = parse_assignment(raw)?;
        session.set_field(&key, &value)?;
    }

    match session.submit().await? {
        SubmitOutcome::Saved(response) => {
            let verb = if id.is_some() { "updated" } else { "created" };
            match response.message.as_deref() {
                Some(msg) => println!("{} {}: {}", entity, verb, msg),
                None => println!("{} {}.", entity, verb),
            }
            Ok(response.data)
        }
        SubmitOutcome::Invalid(errors) => {
            for (field, message) in errors.iter() {
                eprintln!("  {}: {}", field, message);
            }
            anyhow::bail!("{} is invalid ({} field(s)).", entity.label(), errors.len())
        }
        SubmitOutcome::Busy => anyhow::bail!("A submit for {} is already in progress.", entity),
    }
}

pub async fn delete(shell: &AdminShell, entity: EntityKind, id: &str) -> Result<()> {
    shell.delete(entity, id).await?;
    println!("{} \"{}\" deleted.", entity, id);
    Ok(())
}
