//! Scryfall API client, the card database behind set lookups

use crate::error::{Error, Result};
use crate::models::{DatabaseCard, DatabaseSet};
use reqwest::blocking::Response;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;

const USER_AGENT: &str = "xmage-maintenance/0.1";

/// Scryfall set object
#[derive(Debug, Deserialize)]
pub struct ScryfallSet {
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub card_count: Option<u32>,
}

/// Scryfall card object, only the fields the formatters need
#[derive(Debug, Deserialize)]
pub struct ScryfallCard {
    pub name: String,
    pub collector_number: String,
    pub rarity: String,
    #[serde(default)]
    pub type_line: Option<String>,
    /// For double-faced cards, the type line lives on the faces
    #[serde(default)]
    pub card_faces: Option<Vec<CardFace>>,
    #[serde(default)]
    pub reprint: bool,
}

#[derive(Debug, Deserialize)]
pub struct CardFace {
    pub name: String,
    #[serde(default)]
    pub type_line: Option<String>,
}

impl ScryfallCard {
    /// Type line of the card, or of its front face
    pub fn type_line(&self) -> Option<&str> {
        if let Some(ref line) = self.type_line {
            return Some(line);
        }
        self.card_faces
            .as_ref()
            .and_then(|faces| faces.first())
            .and_then(|face| face.type_line.as_deref())
    }
}

impl From<ScryfallCard> for DatabaseCard {
    fn from(card: ScryfallCard) -> Self {
        DatabaseCard {
            type_line: card.type_line().map(str::to_string),
            name: card.name,
            collector_number: card.collector_number,
            rarity: card.rarity,
            reprint: card.reprint,
        }
    }
}

/// One page of a Scryfall list response
#[derive(Debug, Deserialize)]
pub struct CardList {
    pub data: Vec<ScryfallCard>,
    #[serde(default)]
    pub has_more: bool,
    #[serde(default)]
    pub next_page: Option<String>,
    #[serde(default)]
    pub total_cards: Option<u32>,
}

/// Read a response body and parse it as JSON
fn parse_body<T: DeserializeOwned>(response: Response) -> Result<T> {
    let response_text = response.text()?;
    Ok(serde_json::from_str(&response_text)?)
}

/// Blocking Scryfall client with a configurable base URL
pub struct ScryfallClient {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl ScryfallClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::blocking::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Fetch a set and all its printings, in set order
    pub fn fetch_set(&self, set_code: &str) -> Result<DatabaseSet> {
        let url = format!("{}/sets/{}", self.base_url, set_code.to_lowercase());
        log::info!("Fetching set from Scryfall: {}", set_code);

        let response = self.client.get(&url).header("User-Agent", USER_AGENT).send()?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(Error::SetNotFound(set_code.to_string()));
        }
        if !response.status().is_success() {
            return Err(Error::HttpStatus(response.status()));
        }
        let set: ScryfallSet = parse_body(response)?;

        let query = format!("e:{}", set.code);
        let cards = self.search_all(&query)?;
        log::info!(
            "Fetched {} printings of {} ({})",
            cards.len(),
            set.name,
            set.code.to_uppercase()
        );

        if let Some(expected) = set.card_count {
            if cards.len() != expected as usize {
                log::debug!("Scryfall lists {} cards, search returned {}", expected, cards.len());
            }
        }

        Ok(DatabaseSet {
            code: set.code.to_uppercase(),
            name: set.name,
            cards: cards.into_iter().map(DatabaseCard::from).collect(),
        })
    }

    /// Whether a card with exactly this name was printed outside `set_code`
    pub fn printed_outside(&self, name: &str, set_code: &str) -> Result<bool> {
        let query = format!("!\"{}\" -e:{}", name, set_code.to_lowercase());
        let url = format!("{}/cards/search", self.base_url);
        log::debug!("Searching Scryfall: {}", query);

        let response = self
            .client
            .get(&url)
            .query(&[("q", query.as_str()), ("unique", "cards")])
            .header("User-Agent", USER_AGENT)
            .send()?;

        // Scryfall answers an empty search with 404
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(false);
        }
        if !response.status().is_success() {
            return Err(Error::HttpStatus(response.status()));
        }
        let list: CardList = parse_body(response)?;
        Ok(list.total_cards.map_or(!list.data.is_empty(), |n| n > 0))
    }

    /// Run a search and follow `next_page` until exhausted
    fn search_all(&self, query: &str) -> Result<Vec<ScryfallCard>> {
        let first = self
            .client
            .get(format!("{}/cards/search", self.base_url))
            .query(&[
                ("q", query),
                ("unique", "prints"),
                ("order", "set"),
                ("include_extras", "true"),
            ])
            .header("User-Agent", USER_AGENT)
            .send()?;

        let mut cards = Vec::new();
        let mut response = first;
        loop {
            if response.status() == StatusCode::NOT_FOUND {
                // No cards known yet for this set
                break;
            }
            if !response.status().is_success() {
                return Err(Error::HttpStatus(response.status()));
            }
            let page: CardList = parse_body(response)?;
            cards.extend(page.data);

            match page.next_page {
                Some(next) if page.has_more => {
                    log::debug!("Fetching next page: {}", next);
                    response = self.client.get(&next).header("User-Agent", USER_AGENT).send()?;
                }
                _ => break,
            }
        }
        Ok(cards)
    }
}

#[cfg(test)]
#[path = "scryfall_tests.rs"]
mod tests;
