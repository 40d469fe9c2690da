mod app;
mod commands;
mod render;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "nanshe-cli", about = "Nanshe learning platform CLI", version)]
struct Cli {
    /// Override the API base URL (default: config file, then NANSHE_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Output format
    #[arg(long, global = true, default_value = "plain")]
    format: OutputFormat,

    /// Disable ANSI colors
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Plain,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// Show a capsule with its granule and molecule tree
    Capsule {
        /// Learning domain (e.g. "languages")
        domain: String,
        /// Area within the domain (e.g. "japanese")
        area: String,
        /// Capsule id
        id: String,
    },

    /// List a molecule's atoms
    Atoms {
        /// Molecule id
        molecule_id: String,
    },

    /// Run an interactive spaced-repetition review session
    Review {
        /// Restrict the session to one capsule
        #[arg(long)]
        capsule: Option<String>,
    },

    /// Journal entries
    #[command(subcommand)]
    Journal(JournalCommand),
}

#[derive(Subcommand)]
enum JournalCommand {
    /// List journal entries
    List,

    /// Add a journal entry
    Add {
        /// Entry title
        title: String,
        /// Entry content (use "-" to read from stdin)
        #[arg(long)]
        content: Option<String>,
        /// Comma-separated tags
        #[arg(long)]
        tags: Option<String>,
        /// Attach to a capsule
        #[arg(long)]
        capsule: Option<String>,
    },

    /// Delete a journal entry
    Rm {
        /// Entry id
        id: String,
    },
}

/// Read content from stdin if piped, or resolve "-" as stdin
fn resolve_content(content: Option<String>) -> Option<String> {
    match content.as_deref() {
        Some("-") => {
            // Explicit stdin read
            let mut buf = String::new();
            std::io::Read::read_to_string(&mut std::io::stdin(), &mut buf).ok();
            Some(buf)
        }
        Some(_) => content,
        None => {
            // Auto-detect piped stdin
            if !stdin_is_tty() {
                let mut buf = String::new();
                std::io::Read::read_to_string(&mut std::io::stdin(), &mut buf).ok();
                if buf.is_empty() { None } else { Some(buf) }
            } else {
                None
            }
        }
    }
}

/// Check if stdin is a terminal (not piped)
fn stdin_is_tty() -> bool {
    unsafe { libc_isatty(0) != 0 }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let use_color = !cli.no_color && atty_check();
    let app = app::App::new(cli.api_url.as_deref())?;

    match cli.command {
        Command::Capsule { domain, area, id } => {
            commands::capsule::run(&app, &domain, &area, &id, &cli.format, use_color).await?;
        }
        Command::Atoms { molecule_id } => {
            commands::atoms::run(&app, &molecule_id, &cli.format, use_color).await?;
        }
        Command::Review { capsule } => {
            commands::review::run(&app, capsule.as_deref(), use_color).await?;
        }
        Command::Journal(subcmd) => match subcmd {
            JournalCommand::List => {
                commands::journal::run_list(&app, &cli.format, use_color).await?;
            }
            JournalCommand::Add { title, content, tags, capsule } => {
                let content = resolve_content(content);
                commands::journal::run_add(
                    &app,
                    &title,
                    content,
                    tags.as_deref(),
                    capsule.as_deref(),
                    &cli.format,
                    use_color,
                )
                .await?;
            }
            JournalCommand::Rm { id } => {
                commands::journal::run_rm(&app, &id, &cli.format).await?;
            }
        },
    }

    Ok(())
}

/// Check if stdout is a terminal (for color support)
fn atty_check() -> bool {
    unsafe { libc_isatty(1) != 0 }
}

extern "C" {
    #[link_name = "isatty"]
    fn libc_isatty(fd: i32) -> i32;
}
