//! xmage-maintenance - collection of maintenance tools for XMage
//!
//! Checks which cards are implemented, builds tracking issues and changelogs,
//! and copies the results to the clipboard.

use clap::{Parser, Subcommand};
use std::io::BufRead;
use std::path::PathBuf;
use std::process::ExitCode;
use xmage_maintenance::config::{DEFAULT_MASTER, SCRYFALL_API_URL};
use xmage_maintenance::{commands, history, Config, Output, OutputMode, Result, ScryfallClient};

/// Collection of maintenance tools for XMage
#[derive(Parser, Debug)]
#[command(name = "xmage-maintenance")]
#[command(version, about, long_about = None)]
struct Args {
    /// Pull master before performing maintenance
    #[arg(short, long, global = true)]
    pull: bool,

    /// Print progress updates while performing maintenance
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Print to stdout instead of copying to clipboard
    #[arg(long, global = true)]
    stdout: bool,

    /// With `oracle-update`, only produce the Cards section
    #[arg(long, global = true)]
    patch: bool,

    /// Path to the XMage master checkout
    #[arg(long, env = "XMAGE_MASTER", default_value = DEFAULT_MASTER, global = true)]
    master: PathBuf,

    /// Path to the XMage checkout rewritten by change-set-code
    #[arg(long, env = "XMAGE_STAGE", global = true)]
    stage: Option<PathBuf>,

    #[arg(long, env = "SCRYFALL_API_URL", default_value = SCRYFALL_API_URL, hide = true)]
    scryfall_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Rewrite the set code of every file in a set directory of the stage checkout
    ChangeSetCode {
        set_dir: PathBuf,
        new_set_code: String,
    },
    /// Build implementation checklists from a full spoiler page
    FullSpoiler {
        set_code: String,
        spoiler_url: String,
    },
    /// Exit successfully iff the card is implemented (in the given set)
    Implemented {
        card_name: String,
        set_code: Option<String>,
    },
    /// Print the names of all implemented cards
    ImplementedList,
    /// Build a changelog of cards implemented since a revision
    ImplementedSince { revision: String },
    /// Print a markdown link to a card
    MarkdownLink {
        card_name: String,
        set_code: Option<String>,
    },
    /// Build the tracking issue for a new set
    OracleUpdate { set_code: String },
    /// Print the number of implemented cards
    Total,
}

impl Args {
    fn config(&self) -> Config {
        Config {
            master: self.master.clone(),
            stage: self.stage.clone(),
            scryfall_url: self.scryfall_url.clone(),
            output: if self.stdout {
                OutputMode::Stdout
            } else {
                OutputMode::Clipboard
            },
            verbose: self.verbose,
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    let default_filter = if args.verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let config = args.config();
    match run(&args, &config) {
        Ok(code) => code,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args, config: &Config) -> Result<ExitCode> {
    if args.pull {
        history::pull(&config.master)?;
    }

    let output = Output::new(config.output);
    let db = ScryfallClient::new(&config.scryfall_url);

    match &args.command {
        Command::ChangeSetCode {
            set_dir,
            new_set_code,
        } => {
            let summary = commands::change_set_code(config, set_dir, new_set_code)?;
            println!(
                "Rewrote {} of {} files: {} -> {}",
                summary.files_rewritten,
                summary.files_total,
                summary.old_codes.iter().cloned().collect::<Vec<_>>().join(", "),
                summary.new_code
            );
        }
        Command::FullSpoiler {
            set_code,
            spoiler_url,
        } => {
            let checklist = commands::full_spoiler(config, &db, set_code, spoiler_url)?;
            if output.is_stdout() {
                println!("[ ** ] reprints");
                output.emit(&checklist.reprints.join("\n"))?;
                println!("[ ** ] new cards");
                output.emit(&checklist.new_cards.join("\n"))?;
            } else {
                output.emit(&checklist.reprints.join("\n"))?;
                println!("[ ** ] reprints copied to clipboard, press return to copy new cards");
                wait_for_return()?;
                output.emit(&checklist.new_cards.join("\n"))?;
                println!("[ ** ] new cards copied to clipboard");
            }
        }
        Command::Implemented {
            card_name,
            set_code,
        } => {
            let found = commands::implemented(config, card_name, set_code.as_deref())?;
            if config.verbose {
                println!(
                    "{}",
                    commands::implemented_status(card_name, set_code.as_deref(), found)
                );
            }
            if !found {
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::ImplementedList => {
            println!("{}", commands::implemented_list(config)?);
        }
        Command::ImplementedSince { revision } => {
            match commands::implemented_since(config, &db, revision)? {
                Some(text) => {
                    output.emit(&text)?;
                    if output.mode() == OutputMode::Clipboard {
                        log::info!("New cards copied to clipboard");
                    }
                }
                None => log::info!("No new cards since {}", revision),
            }
        }
        Command::MarkdownLink {
            card_name,
            set_code,
        } => {
            println!(
                "{}",
                commands::markdown_link(&db, card_name, set_code.as_deref())?
            );
        }
        Command::OracleUpdate { set_code } => {
            let body = commands::oracle_update(config, &db, set_code, args.patch)?;
            output.emit(&body)?;
            if !output.is_stdout() {
                println!("[ ** ] text copied to clipboard");
            }
        }
        Command::Total => {
            println!("{}", commands::total(config)?);
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn wait_for_return() -> Result<()> {
    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .map_err(|e| xmage_maintenance::Error::io("<stdin>", e))?;
    Ok(())
}
