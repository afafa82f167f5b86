//! Subcommand pipelines
//!
//! Each pipeline reads its inputs through the scanner, the card database and
//! the spoiler parser, and returns formatted text. Routing the text to the
//! clipboard or stdout is left to the caller.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::formatters::{
    changelog, checklist_line, image_link, markdown_card_link, name_list, oracle_update_body,
    total_line,
};
use crate::history::{newly_implemented, scan_revision};
use crate::models::{CardRecord, DatabaseSet, SetSpoilerEntry};
use crate::rewriter::{rewrite_set_code, RewriteSummary};
use crate::scanner::{is_implemented, scan_sets_tree};
use crate::scryfall::ScryfallClient;
use crate::spoiler::{fetch_spoiler, parse_spoiler};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::Path;

/// Checklists produced by `full-spoiler`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpoilerChecklist {
    pub reprints: Vec<String>,
    pub new_cards: Vec<String>,
}

/// Card counts produced by `total`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Totals {
    pub unique: usize,
    pub total: usize,
}

impl Totals {
    pub fn from_records(records: &[CardRecord]) -> Self {
        let unique = records
            .iter()
            .map(|r| r.name.as_str())
            .collect::<HashSet<_>>()
            .len();
        Self {
            unique,
            total: records.len(),
        }
    }
}

impl std::fmt::Display for Totals {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&total_line(self.unique, self.total))
    }
}

fn scan_master(config: &Config) -> Result<Vec<CardRecord>> {
    scan_sets_tree(&config.sets_dir())
}

// ── change-set-code ──────────────────────────────────────────────────

pub fn change_set_code(config: &Config, set_dir: &Path, new_set_code: &str) -> Result<RewriteSummary> {
    let dir = config.resolve_stage_set_dir(set_dir)?;
    rewrite_set_code(&dir, new_set_code)
}

// ── full-spoiler ─────────────────────────────────────────────────────

/// Split spoiler entries into reprints and new cards, each line linked to its image
pub fn build_spoiler_checklist<F>(
    entries: &[SetSpoilerEntry],
    records: &[CardRecord],
    set_code: &str,
    mut is_reprint: F,
) -> Result<SpoilerChecklist>
where
    F: FnMut(&str) -> Result<bool>,
{
    let mut sorted: Vec<&SetSpoilerEntry> = entries.iter().collect();
    sorted.sort_by(|a, b| a.name.cmp(&b.name));

    let mut checklist = SpoilerChecklist::default();
    for entry in sorted {
        let link = match entry.image_url {
            Some(ref url) => image_link(&entry.name, url),
            None => entry.name.clone(),
        };
        let line = checklist_line(is_implemented(records, &entry.name, Some(set_code)), &link);
        if is_reprint(&entry.name)? {
            checklist.reprints.push(line);
        } else {
            checklist.new_cards.push(line);
        }
    }
    Ok(checklist)
}

/// A split card counts as a reprint when all of its halves were printed before
fn printed_before(db: &ScryfallClient, name: &str, set_code: &str) -> Result<bool> {
    if db.printed_outside(name, set_code)? {
        return Ok(true);
    }
    if name.contains(" // ") {
        for part in name.split(" // ") {
            if !db.printed_outside(part, set_code)? {
                return Ok(false);
            }
        }
        return Ok(true);
    }
    Ok(false)
}

pub fn full_spoiler(
    config: &Config,
    db: &ScryfallClient,
    set_code: &str,
    spoiler_url: &str,
) -> Result<SpoilerChecklist> {
    let html = fetch_spoiler(spoiler_url)?;
    let entries = parse_spoiler(&html)?;
    let records = scan_master(config)?;

    log::info!("Checking {} spoiled cards for earlier printings", entries.len());
    build_spoiler_checklist(&entries, &records, set_code, |name| {
        printed_before(db, name, set_code)
    })
}

// ── implemented / implemented-list ───────────────────────────────────

pub fn implemented(config: &Config, card_name: &str, set_code: Option<&str>) -> Result<bool> {
    let records = scan_master(config)?;
    Ok(is_implemented(&records, card_name, set_code))
}

/// One status line for `implemented --verbose`
pub fn implemented_status(card_name: &str, set_code: Option<&str>, found: bool) -> String {
    format!(
        "[{}] {}{}",
        if found { " ok " } else { "FAIL" },
        set_code.map(|c| format!("({}) ", c)).unwrap_or_default(),
        card_name
    )
}

pub fn implemented_list(config: &Config) -> Result<String> {
    let records = scan_master(config)?;
    Ok(name_list(records.iter().map(|r| r.name.as_str())))
}

// ── implemented-since ────────────────────────────────────────────────

/// Changelog for the given additions; sets unknown to `lookup` fall back to search links
pub fn build_changelog<F>(added: &BTreeMap<String, BTreeSet<String>>, mut lookup: F) -> Result<String>
where
    F: FnMut(&str) -> Result<Option<DatabaseSet>>,
{
    let mut links_by_set = BTreeMap::new();
    for (set_code, names) in added {
        if names.is_empty() {
            continue;
        }
        let set = lookup(set_code)?;
        let links = names
            .iter()
            .map(|name| markdown_card_link(name, set.as_ref()))
            .collect();
        links_by_set.insert(set_code.clone(), links);
    }
    Ok(changelog(&links_by_set))
}

/// Fetch a set, treating a set unknown to the database as absent
fn lookup_set(db: &ScryfallClient, set_code: &str) -> Result<Option<DatabaseSet>> {
    match db.fetch_set(set_code) {
        Ok(set) => Ok(Some(set)),
        Err(Error::SetNotFound(code)) => {
            log::warn!("Set {} unknown to Scryfall, linking by name", code);
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// Changelog of cards added since `revision`, or `None` if nothing was added
pub fn implemented_since(config: &Config, db: &ScryfallClient, revision: &str) -> Result<Option<String>> {
    let current = scan_revision(&config.master, "HEAD")?;
    let previous = scan_revision(&config.master, revision)?;
    let added = newly_implemented(&current, &previous);

    if added.is_empty() {
        return Ok(None);
    }
    log::info!(
        "{} new cards in {} sets",
        added.values().map(BTreeSet::len).sum::<usize>(),
        added.len()
    );
    build_changelog(&added, |code| lookup_set(db, code)).map(Some)
}

// ── markdown-link ────────────────────────────────────────────────────

pub fn markdown_link(db: &ScryfallClient, card_name: &str, set_code: Option<&str>) -> Result<String> {
    match set_code {
        Some(code) => {
            let set = db.fetch_set(code)?;
            Ok(markdown_card_link(card_name, Some(&set)))
        }
        None => Ok(markdown_card_link(card_name, None)),
    }
}

// ── oracle-update ────────────────────────────────────────────────────

/// Tracking issue body for `set`, checking off the cards already implemented
pub fn build_oracle_update(set: &DatabaseSet, records: &[CardRecord], patch: bool) -> String {
    let mut reprints = Vec::new();
    let mut new_cards = Vec::new();

    for card in set.cards_by_name() {
        let done = is_implemented(records, &card.name, Some(&set.code));
        let line = checklist_line(done, &markdown_card_link(&card.name, Some(set)));
        if card.reprint {
            reprints.push(line);
        } else {
            new_cards.push(line);
        }
    }

    oracle_update_body(&set.code, &reprints, &new_cards, patch)
}

pub fn oracle_update(config: &Config, db: &ScryfallClient, set_code: &str, patch: bool) -> Result<String> {
    let set = db.fetch_set(set_code)?;
    let records = scan_master(config)?;
    Ok(build_oracle_update(&set, &records, patch))
}

// ── total ────────────────────────────────────────────────────────────

pub fn total(config: &Config) -> Result<Totals> {
    let records = scan_master(config)?;
    Ok(Totals::from_records(&records))
}

#[cfg(test)]
#[path = "commands_tests.rs"]
mod tests;
