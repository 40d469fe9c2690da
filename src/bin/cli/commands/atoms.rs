use anyhow::Result;

use nanshe_client::catalog::GenerationStatus;

use crate::app::App;
use crate::render::{paint, status_color, status_glyph, Color};
use crate::OutputFormat;

pub async fn run(
    app: &App,
    molecule_id: &str,
    format: &OutputFormat,
    use_color: bool,
) -> Result<()> {
    let batch = app.client.fetch_molecule_atoms(molecule_id).await?;

    if batch.generation_status == GenerationStatus::Pending {
        match format {
            OutputFormat::Json => {
                let output = serde_json::json!({
                    "moleculeId": molecule_id,
                    "generationStatus": "pending",
                    "atoms": [],
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            }
            OutputFormat::Plain => {
                println!("Atoms are still being generated. Try again shortly.");
            }
        }
        return Ok(());
    }

    match format {
        OutputFormat::Json => {
            let output: Vec<serde_json::Value> = batch
                .atoms
                .iter()
                .map(|a| {
                    serde_json::json!({
                        "id": a.id,
                        "order": a.order,
                        "contentType": a.content_type.name(),
                        "progressStatus": a.progress_status.as_str(),
                        "rewardXp": a.reward_xp,
                        "isBonus": a.is_bonus,
                        "isLocked": a.is_locked,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            if batch.atoms.is_empty() {
                println!("No atoms in this molecule.");
                return Ok(());
            }

            for atom in &batch.atoms {
                let glyph = paint(
                    status_glyph(atom.progress_status),
                    status_color(atom.progress_status),
                    use_color,
                );
                let mut markers = String::new();
                if atom.is_bonus {
                    markers.push_str(" [bonus]");
                }
                if atom.is_locked {
                    markers.push_str(" [locked]");
                }
                let xp = if atom.reward_xp > 0 {
                    paint(&format!(" +{} xp", atom.reward_xp), Color::CYAN, use_color)
                } else {
                    String::new()
                };
                println!(
                    "{} {:<24} {}{}{}",
                    glyph,
                    atom.content_type.name(),
                    atom.id,
                    xp,
                    markers,
                );
            }

            println!("\n{} atoms total", batch.atoms.len());
        }
    }

    Ok(())
}
