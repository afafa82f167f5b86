//! Full spoiler page fetching and parsing
//!
//! Tied to the markup of one spoiler site: card images are `<img>` elements
//! inside `div.resizing-cig` or `div.rtecenter` blocks, named by their `alt`.

use crate::error::{Error, Result};
use crate::models::SetSpoilerEntry;
use lazy_static::lazy_static;
use scraper::{Html, Selector};
use std::collections::HashMap;

lazy_static! {
    static ref CARD_IMAGE: Selector =
        Selector::parse("div.resizing-cig img[src][alt], div.rtecenter img[src][alt]").unwrap();
}

/// Fetch the spoiler page at `url`
pub fn fetch_spoiler(url: &str) -> Result<String> {
    log::info!("Fetching full spoiler: {}", url);

    let response = reqwest::blocking::Client::new()
        .get(url)
        .header("User-Agent", "xmage-maintenance/0.1")
        .send()?;

    if response.status().is_success() {
        Ok(response.text()?)
    } else {
        Err(Error::HttpStatus(response.status()))
    }
}

/// Card name as used by the card database
pub fn normalize_card_name(name: &str) -> String {
    name.trim().replace('’', "'")
}

/// Extract the card entries of a spoiler page, in page order
///
/// A card shown more than once keeps the position of its first image and the
/// attributes of its last one.
pub fn parse_spoiler(html: &str) -> Result<Vec<SetSpoilerEntry>> {
    let document = Html::parse_document(html);
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut entries: Vec<SetSpoilerEntry> = Vec::new();

    for img in document.select(&CARD_IMAGE) {
        let element = img.value();
        let name = match element.attr("alt").map(normalize_card_name) {
            Some(name) if !name.is_empty() => name,
            _ => continue,
        };
        let entry = SetSpoilerEntry {
            name: name.clone(),
            image_url: element.attr("src").map(str::to_string),
            rarity: element.attr("data-rarity").map(str::to_string),
            number: element.attr("data-number").map(str::to_string),
        };
        match positions.get(&name) {
            Some(&index) => {
                log::debug!("{} appears again, using its later image", name);
                entries[index] = entry;
            }
            None => {
                positions.insert(name, entries.len());
                entries.push(entry);
            }
        }
    }

    if entries.is_empty() {
        return Err(Error::Parse(
            "no card images found in spoiler page (unrecognized page structure)".into(),
        ));
    }

    log::info!("Parsed {} cards from full spoiler", entries.len());
    Ok(entries)
}

#[cfg(test)]
#[path = "spoiler_tests.rs"]
mod tests;
