use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde::Serialize;

use lingo_bridge::api::commands::{self, CommandContext};
use lingo_bridge::core::session::Session;
use lingo_bridge::shared::error::AppResult;

#[derive(Parser)]
#[command(name = "lingo-bridge", version, about = "Translate text with cache, remote backends and an offline fallback")]
struct Cli {
    /// Settings file (defaults to the platform config directory)
    #[arg(long, global = true, env = "LINGO_CONFIG")]
    config: Option<PathBuf>,

    /// Print machine-readable JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Translate text
    Translate {
        text: String,
        /// Source language code, or `auto`
        #[arg(short, long)]
        from: Option<String>,
        /// Target language code
        #[arg(short, long)]
        to: Option<String>,
    },
    /// Detect the language of text
    Detect { text: String },
    /// Look text up in the offline dictionaries only
    Offline {
        text: String,
        #[arg(short, long)]
        from: String,
        #[arg(short, long)]
        to: String,
    },
    /// List supported languages
    Languages {
        /// Hide `auto`
        #[arg(long)]
        targets: bool,
    },
    /// Translation history
    History {
        #[command(subcommand)]
        action: Option<HistoryAction>,
    },
    /// Translation cache maintenance
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
    /// Probe the remote backends
    Status,
    /// Show the effective settings
    Settings,
    /// Interactive session on stdin
    Interactive,
}

#[derive(Subcommand)]
enum HistoryAction {
    List {
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },
    Show { id: String },
    Delete { id: String },
    Clear,
}

#[derive(Subcommand)]
enum CacheAction {
    Stats,
    Purge,
    Clear,
}

fn print_json<T: Serialize>(value: &T) -> AppResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn run(cli: Cli) -> AppResult<()> {
    let ctx = CommandContext::load(cli.config.as_deref()).await?;
    let json = cli.json;

    match cli.command {
        Command::Translate { text, from, to } => {
            let result =
                commands::translate::translate(&ctx, &text, from.as_deref(), to.as_deref()).await?;
            if json {
                print_json(&result)?;
            } else {
                println!("{}", result.translated_text);
                let mut origin = result.source.to_string();
                if let Some(provider) = &result.provider {
                    origin.push_str(&format!(" via {}", provider));
                }
                if let Some(code) = &result.detected_language {
                    origin.push_str(&format!(", detected {}", code));
                }
                eprintln!("[{}]", origin);
            }
        }
        Command::Detect { text } => {
            let report = commands::translate::detect(&ctx, &text).await?;
            if json {
                print_json(&report)?;
            } else {
                let note = if report.detected { "" } else { " (default)" };
                println!("{} {}{}", report.language, report.name, note);
            }
        }
        Command::Offline { text, from, to } => {
            match commands::translate::offline(&ctx, &text, &from, &to) {
                Some(translated) => println!("{}", translated),
                None => eprintln!("no offline entry for {} -> {}", from, to),
            }
        }
        Command::Languages { targets } => {
            let rows = commands::languages::list(targets);
            if json {
                print_json(&rows)?;
            } else {
                for row in rows {
                    let offline = if row.offline { " [offline]" } else { "" };
                    println!(
                        "{:<6} {:<24} {}{}",
                        row.language.code, row.language.name, row.language.native_name, offline
                    );
                }
            }
        }
        Command::History { action } => match action.unwrap_or(HistoryAction::List { limit: None }) {
            HistoryAction::List { limit } => {
                let rows = commands::history::list(&ctx, limit)?;
                if json {
                    print_json(&rows)?;
                } else if rows.is_empty() {
                    println!("No translation history yet");
                } else {
                    for row in rows {
                        println!(
                            "{}  {} -> {}  {}\n    {}\n    => {}",
                            row.entry.id,
                            row.from_name,
                            row.to_name,
                            row.age,
                            row.entry.source_text,
                            row.entry.translated_text
                        );
                    }
                }
            }
            HistoryAction::Show { id } => match commands::history::show(&ctx, &id)? {
                Some(row) => print_json(&row)?,
                None => eprintln!("No history entry {}", id),
            },
            HistoryAction::Delete { id } => {
                let deleted = commands::history::delete(&ctx, &id)?;
                println!("{}", if deleted { "Deleted" } else { "Not found" });
            }
            HistoryAction::Clear => {
                println!("Removed {} entries", commands::history::clear(&ctx)?);
            }
        },
        Command::Cache { action } => match action {
            CacheAction::Stats => {
                let stats = commands::cache::stats(&ctx)?;
                if json {
                    print_json(&stats)?;
                } else {
                    println!("{} entries, {} day TTL", stats.entries, stats.ttl_days);
                }
            }
            CacheAction::Purge => println!("Purged {} expired entries", commands::cache::purge(&ctx)?),
            CacheAction::Clear => println!("Removed {} entries", commands::cache::clear(&ctx)?),
        },
        Command::Status => {
            let report = commands::status::status(&ctx).await;
            if json {
                print_json(&report)?;
            } else {
                for backend in &report.backends.backends {
                    let state = if backend.reachable { "up" } else { "down" };
                    println!("{:<16} {:<18} {}", backend.name, backend.source.label(), state);
                }
                println!(
                    "{:<16} {:<18} {}",
                    "Offline",
                    "Dictionary",
                    report.backends.offline_languages.join(", ")
                );
            }
        }
        Command::Settings => print_json(&commands::settings::show(&ctx))?,
        Command::Interactive => {
            let session = Session::new(
                ctx.translator.clone(),
                &ctx.settings.preferences,
                ctx.settings.storage.history_limit,
            );
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            let mut stdout = tokio::io::stdout();
            commands::interactive::run(&session, stdin, &mut stdout).await?;
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    lingo_bridge::init_tracing();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}
