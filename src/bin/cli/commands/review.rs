use std::io::Write;

use anyhow::Result;

use nanshe_client::srs::{ReviewFlow, ReviewPhase, ReviewRating};

use crate::app::App;
use crate::render::{paint, Color};

pub async fn run(app: &App, capsule: Option<&str>, use_color: bool) -> Result<()> {
    let mut flow = ReviewFlow::new(&app.client);
    flow.start(capsule).await?;

    if flow.phase() == ReviewPhase::Completed {
        println!("Nothing due for review.");
        return Ok(());
    }

    let mut reviewed = 0u32;
    loop {
        match flow.phase() {
            ReviewPhase::Reviewing => {
                let item = match flow.current_item() {
                    Some(item) => item,
                    None => break,
                };
                println!();
                println!("{} {}", paint("Q:", Color::BOLD, use_color), item.prompt);
                if !item.hint.is_empty() {
                    let hint = format!("hint: {}", item.hint);
                    println!("   {}", paint(&hint, Color::DIM, use_color));
                }
                print!("{} left  [Enter] reveal, [q] quit: ", flow.remaining());
                std::io::stdout().flush().ok();

                if read_line().eq_ignore_ascii_case("q") {
                    break;
                }
                flow.reveal()?;
            }
            ReviewPhase::Revealed => {
                let item = match flow.current_item() {
                    Some(item) => item,
                    None => break,
                };
                println!("{} {}", paint("A:", Color::BOLD, use_color), item.answer);
                print!("[1] again  [2] hard  [3] good  [4] easy  [q] quit: ");
                std::io::stdout().flush().ok();

                let line = read_line();
                if line.eq_ignore_ascii_case("q") {
                    break;
                }
                let rating = match line.parse::<u8>().ok().and_then(ReviewRating::from_grade) {
                    Some(rating) => rating,
                    None => {
                        println!("Enter a rating from 1 to 4.");
                        continue;
                    }
                };
                flow.rate(rating).await?;
                reviewed += 1;
            }
            ReviewPhase::Completed => {
                println!();
                println!("Review complete. {} cards rated.", reviewed);
                break;
            }
            _ => break,
        }
    }

    Ok(())
}

fn read_line() -> String {
    let mut buf = String::new();
    std::io::stdin().read_line(&mut buf).ok();
    buf.trim().to_string()
}
