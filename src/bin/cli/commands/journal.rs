use anyhow::Result;

use nanshe_client::journal::{JournalDraft, JournalTransport};

use crate::app::App;
use crate::render::{paint, Color};
use crate::OutputFormat;

pub async fn run_list(app: &App, format: &OutputFormat, use_color: bool) -> Result<()> {
    let entries = app.client.list_journal_entries().await?;

    match format {
        OutputFormat::Json => {
            let output: Vec<serde_json::Value> = entries
                .iter()
                .map(|e| {
                    serde_json::json!({
                        "id": e.id,
                        "title": e.title,
                        "summary": e.summary,
                        "tags": e.tags,
                        "capsuleId": e.capsule_id,
                        "createdAt": e.created_at,
                        "updatedAt": e.updated_at,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            if entries.is_empty() {
                println!("No journal entries.");
                return Ok(());
            }

            for entry in &entries {
                let created = entry
                    .created_at
                    .as_deref()
                    .map(|d| d.chars().take(10).collect::<String>())
                    .unwrap_or_default();
                println!(
                    "{}  {}",
                    paint(&entry.title, Color::BOLD, use_color),
                    paint(&created, Color::GRAY, use_color),
                );
                if !entry.summary.is_empty() {
                    println!("  {}", entry.summary);
                }
                if !entry.tags.is_empty() {
                    let tags = entry
                        .tags
                        .iter()
                        .map(|t| format!("#{}", t))
                        .collect::<Vec<_>>()
                        .join(" ");
                    println!("  {}", paint(&tags, Color::CYAN, use_color));
                }
                println!("  {}", paint(&entry.id, Color::DIM, use_color));
                println!();
            }

            println!("{} entries total", entries.len());
        }
    }

    Ok(())
}

pub async fn run_add(
    app: &App,
    title: &str,
    content: Option<String>,
    tags: Option<&str>,
    capsule: Option<&str>,
    format: &OutputFormat,
    use_color: bool,
) -> Result<()> {
    let tag_list: Vec<String> = tags
        .map(|t| {
            t.split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        })
        .unwrap_or_default();

    let draft = JournalDraft {
        title: title.to_string(),
        content: content.unwrap_or_default(),
        tags: tag_list,
        capsule_id: capsule.map(str::to_string),
        molecule_id: None,
    };

    let entry = app.client.create_journal_entry(&draft).await?;

    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "id": entry.id,
                "title": entry.title,
                "summary": entry.summary,
                "tags": entry.tags,
                "createdAt": entry.created_at,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            println!("Added journal entry \"{}\"", entry.title);
            if !entry.tags.is_empty() {
                let tags = entry
                    .tags
                    .iter()
                    .map(|t| format!("#{}", t))
                    .collect::<Vec<_>>()
                    .join(" ");
                println!("  Tags: {}", paint(&tags, Color::CYAN, use_color));
            }
            println!("  ID: {}", entry.id);
        }
    }

    Ok(())
}

pub async fn run_rm(app: &App, id: &str, format: &OutputFormat) -> Result<()> {
    app.client.delete_journal_entry(id).await?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&serde_json::json!({ "deleted": id }))?);
        }
        OutputFormat::Plain => {
            println!("Deleted journal entry {}", id);
        }
    }

    Ok(())
}
