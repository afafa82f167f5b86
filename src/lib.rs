//! XMage maintenance tools
//!
//! Scans a checkout of the XMage repository for implemented cards and turns
//! what it finds, together with Scryfall set data and spoiler pages, into
//! tracking issues, changelogs and counts for maintainers.

pub mod commands;
pub mod config;
pub mod error;
pub mod formatters;
pub mod history;
pub mod legacy;
pub mod models;
pub mod output;
pub mod rewriter;
pub mod scanner;
pub mod scryfall;
pub mod spoiler;

pub use config::Config;
pub use error::{Error, Result};
pub use models::{CardRecord, DatabaseCard, DatabaseSet, SetSpoilerEntry};
pub use output::{Output, OutputMode};
pub use scanner::{is_implemented, scan_set_dir, scan_sets_tree};
pub use scryfall::ScryfallClient;
