//! Repository scanner: extracts card records from XMage card source files

use crate::error::{Error, Result};
use crate::legacy::{listing_set_code, parse_card_class, parse_set_listing, CardClass, ClassRef, LegacyIndex};
use crate::models::CardRecord;
use lazy_static::lazy_static;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};

lazy_static! {
    /// `super("Dominaria", "DOM", ...)` in a set class constructor
    static ref SET_CLASS_CODE: Regex = Regex::new(r#"(?m)^\s*super\("[^"]+",\s*"([A-Z0-9]+)""#).unwrap();
    static ref SET_CARD_INFO: Regex = Regex::new(r#"cards\.add\(new SetCardInfo\("([^"]+)","#).unwrap();
}

/// Subdirectory of the sets tree that holds tokens rather than cards
pub const TOKENS_DIR: &str = "tokens";

/// What a single card source file declares
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedSource {
    SetClass {
        set_code: String,
        card_names: Vec<String>,
    },
    /// Pre-refactor class for one printing of a card
    CardClass(CardClass),
}

/// Parse the text of a set class or a per-card class
pub fn parse_card_source(text: &str) -> Result<ParsedSource> {
    if let Some(caps) = SET_CLASS_CODE.captures(text) {
        let card_names = SET_CARD_INFO
            .captures_iter(text)
            .map(|c| c[1].to_string())
            .collect();
        return Ok(ParsedSource::SetClass {
            set_code: caps[1].to_string(),
            card_names,
        });
    }

    let card = parse_card_class(text);
    if card.is_empty() {
        Err(Error::Parse("no set declaration found".into()))
    } else {
        Ok(ParsedSource::CardClass(card))
    }
}

/// The set code a source file declares, if any
pub fn declared_set_code(text: &str) -> Option<String> {
    match parse_card_source(text).ok()? {
        ParsedSource::SetClass { set_code, .. } => Some(set_code),
        ParsedSource::CardClass(card) => card.set_code,
    }
}

/// Collects the records of a sets tree file by file
///
/// Set classes produce their records immediately. Per-card classes go through
/// a [`LegacyIndex`] so that reprints can be resolved once every class of the
/// tree has been seen.
#[derive(Debug)]
pub struct TreeScan {
    records: Vec<CardRecord>,
    legacy: LegacyIndex,
}

impl TreeScan {
    /// `listings` selects the oldest layout (see [`LegacyIndex::new`])
    pub fn new(listings: bool) -> Self {
        TreeScan {
            records: Vec::new(),
            legacy: LegacyIndex::new(listings),
        }
    }

    /// Add a file that sits directly in the sets root
    pub fn add_root_file(&mut self, path: &Path, text: &str) {
        let stem = file_stem(path);
        if self.legacy.uses_listings() {
            if let Some(set_code) = listing_set_code(stem) {
                self.legacy.add_set_listing(set_code, parse_set_listing(text));
                return;
            }
        }
        let package = path
            .parent()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.add_file(&package, path, text);
    }

    /// Add a file of the set directory `package`
    pub fn add_file(&mut self, package: &str, path: &Path, text: &str) {
        match parse_card_source(text) {
            Ok(ParsedSource::SetClass {
                set_code,
                card_names,
            }) => {
                self.records.extend(card_names.into_iter().map(|name| CardRecord {
                    name,
                    set_code: set_code.clone(),
                    file_path: path.to_path_buf(),
                }));
            }
            Ok(ParsedSource::CardClass(card)) => {
                let class = ClassRef::new(package, file_stem(path));
                if let Some(record) = self.legacy.add_card_class(class, card, path) {
                    self.records.push(record);
                }
            }
            Err(e) => log::warn!("Skipping {}: {}", path.display(), e),
        }
    }

    pub fn finish(self) -> Vec<CardRecord> {
        let mut records = self.records;
        records.extend(self.legacy.resolve());
        records
    }
}

fn file_stem(path: &Path) -> &str {
    path.file_stem().and_then(|s| s.to_str()).unwrap_or_default()
}

/// Regular files directly inside `dir`, sorted by path
pub fn list_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(Error::DirectoryNotFound(dir.to_path_buf()));
    }

    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| Error::io(dir, e))? {
        let path = entry.map_err(|e| Error::io(dir, e))?.path();
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Read a source file, replacing invalid UTF-8
pub fn read_source(path: &Path) -> Result<String> {
    let bytes = fs::read(path).map_err(|e| Error::io(path, e))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn dir_name(dir: &Path) -> String {
    dir.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn add_set_dir(scan: &mut TreeScan, dir: &Path) -> Result<()> {
    let package = dir_name(dir);
    for path in list_files(dir)? {
        let text = read_source(&path)?;
        scan.add_file(&package, &path, &text);
    }
    Ok(())
}

/// Scan the files of one set directory (non-recursive)
pub fn scan_set_dir(dir: &Path) -> Result<Vec<CardRecord>> {
    let mut scan = TreeScan::new(false);
    add_set_dir(&mut scan, dir)?;
    let records = scan.finish();
    log::debug!("Scanned {}: {} cards", dir.display(), records.len());
    Ok(records)
}

/// Scan the sets root and each set directory one level below it
pub fn scan_sets_tree(root: &Path) -> Result<Vec<CardRecord>> {
    let mut scan = TreeScan::new(false);
    for path in list_files(root)? {
        let text = read_source(&path)?;
        scan.add_root_file(&path, &text);
    }

    let mut subdirs: Vec<PathBuf> = fs::read_dir(root)
        .map_err(|e| Error::io(root, e))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_dir())
        .filter(|path| path.file_name().is_some_and(|n| n != TOKENS_DIR))
        .collect();
    subdirs.sort();

    for dir in subdirs {
        add_set_dir(&mut scan, &dir)?;
    }

    let records = scan.finish();
    log::info!("Found {} implemented cards in {}", records.len(), root.display());
    Ok(records)
}

/// Exact (case-sensitive) name match, restricted to `set_code` when given
pub fn is_implemented(records: &[CardRecord], name: &str, set_code: Option<&str>) -> bool {
    records
        .iter()
        .any(|r| r.name == name && set_code.is_none_or(|code| r.set_code == code))
}

#[cfg(test)]
#[path = "scanner_tests.rs"]
mod tests;
