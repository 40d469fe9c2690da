use anyhow::Result;

use nanshe_client::catalog::GenerationStatus;

use crate::app::App;
use crate::render::{paint, status_color, status_glyph, xp_bar, Color};
use crate::OutputFormat;

pub async fn run(
    app: &App,
    domain: &str,
    area: &str,
    id: &str,
    format: &OutputFormat,
    use_color: bool,
) -> Result<()> {
    let capsule = app.client.fetch_capsule(domain, area, id).await?;

    match format {
        OutputFormat::Json => {
            let granules: Vec<serde_json::Value> = capsule
                .granules
                .iter()
                .map(|g| {
                    let molecules: Vec<serde_json::Value> = g
                        .molecules
                        .iter()
                        .map(|m| {
                            serde_json::json!({
                                "id": m.id,
                                "atomCount": m.atom_count,
                                "generationStatus": format!("{:?}", m.generation_status).to_lowercase(),
                                "progressStatus": m.progress_status.as_str(),
                            })
                        })
                        .collect();
                    serde_json::json!({
                        "id": g.id,
                        "title": g.title,
                        "molecules": molecules,
                    })
                })
                .collect();

            let output = serde_json::json!({
                "id": capsule.id,
                "title": capsule.title,
                "domain": capsule.domain,
                "area": capsule.area,
                "progressStatus": capsule.progress_status.as_str(),
                "progressPercentage": capsule.progress_percentage,
                "xpCurrent": capsule.xp_current,
                "xpTarget": capsule.xp_target,
                "levelCount": capsule.level_count,
                "atomCount": capsule.atom_count,
                "lessonCount": capsule.lesson_count,
                "tags": capsule.tags,
                "granules": granules,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            let title = if capsule.title.is_empty() {
                capsule.id.clone()
            } else {
                capsule.title.clone()
            };
            println!("{}", paint(&title, Color::BOLD, use_color));
            if !capsule.description.is_empty() {
                println!("{}", paint(&capsule.description, Color::DIM, use_color));
            }

            let glyph = paint(
                status_glyph(capsule.progress_status),
                status_color(capsule.progress_status),
                use_color,
            );
            println!(
                "{} {}  {}  {:.0}%",
                glyph,
                capsule.progress_status.as_str(),
                xp_bar(capsule.xp_current, capsule.xp_target, 20),
                capsule.progress_percentage,
            );
            if !capsule.tags.is_empty() {
                let tags = capsule
                    .tags
                    .iter()
                    .map(|t| format!("#{}", t))
                    .collect::<Vec<_>>()
                    .join(" ");
                println!("{}", paint(&tags, Color::CYAN, use_color));
            }
            println!();

            for granule in &capsule.granules {
                println!("{}", paint(&granule.title, Color::BOLD, use_color));
                let count = granule.molecules.len();
                for (i, molecule) in granule.molecules.iter().enumerate() {
                    let connector = if i + 1 == count {
                        "\u{2514}\u{2500}"
                    } else {
                        "\u{251C}\u{2500}"
                    };
                    let glyph = paint(
                        status_glyph(molecule.progress_status),
                        status_color(molecule.progress_status),
                        use_color,
                    );
                    let pending = if molecule.generation_status == GenerationStatus::Pending {
                        " (generating...)"
                    } else {
                        ""
                    };
                    println!(
                        "  {} {} {} ({} atoms){}",
                        connector, glyph, molecule.id, molecule.atom_count, pending,
                    );
                }
            }

            println!(
                "\n{} levels, {} lessons, {} atoms",
                capsule.level_count, capsule.lesson_count, capsule.atom_count,
            );
        }
    }

    Ok(())
}
