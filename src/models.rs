use std::path::PathBuf;

/// A card declared by a card source file in the repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardRecord {
    pub name: String,
    pub set_code: String,
    pub file_path: PathBuf,
}

/// One card image found on a spoiler page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetSpoilerEntry {
    pub name: String,
    pub image_url: Option<String>,
    pub rarity: Option<String>,
    pub number: Option<String>,
}

/// A card printing as reported by the card database
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseCard {
    pub name: String,
    pub collector_number: String,
    pub rarity: String,
    pub type_line: Option<String>,
    /// Printed in an earlier set
    pub reprint: bool,
}

impl DatabaseCard {
    /// Planes and phenomena, which mtg.wtf numbers from 1000 upwards
    pub fn is_planar(&self) -> bool {
        self.type_line
            .as_deref()
            .map(|line| {
                line.split(|c: char| c.is_whitespace() || c == '—')
                    .any(|word| word == "Plane" || word == "Phenomenon")
            })
            .unwrap_or(false)
    }
}

/// A set and its printings, in set order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseSet {
    pub code: String,
    pub name: String,
    pub cards: Vec<DatabaseCard>,
}

impl DatabaseSet {
    /// First printing with the given name
    pub fn card(&self, name: &str) -> Option<&DatabaseCard> {
        self.cards.iter().find(|card| card.name == name)
    }

    /// One printing per card name, sorted by name
    pub fn cards_by_name(&self) -> Vec<&DatabaseCard> {
        let mut seen = std::collections::HashSet::new();
        let mut cards: Vec<&DatabaseCard> = self
            .cards
            .iter()
            .filter(|card| seen.insert(card.name.as_str()))
            .collect();
        cards.sort_by(|a, b| a.name.cmp(&b.name));
        cards
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(name: &str, number: &str, type_line: &str) -> DatabaseCard {
        DatabaseCard {
            name: name.to_string(),
            collector_number: number.to_string(),
            rarity: "common".to_string(),
            type_line: Some(type_line.to_string()),
            reprint: false,
        }
    }

    #[test]
    fn test_is_planar_plane_and_phenomenon() {
        assert!(card("Tazeem", "1", "Plane — Zendikar").is_planar());
        assert!(card("Chaotic Aether", "2", "Phenomenon").is_planar());
    }

    #[test]
    fn test_is_planar_rejects_planeswalker() {
        assert!(!card("Jace Beleren", "3", "Legendary Planeswalker — Jace").is_planar());
        assert!(!card("Plains", "4", "Basic Land — Plains").is_planar());
    }

    #[test]
    fn test_cards_by_name_dedupes_and_sorts() {
        let set = DatabaseSet {
            code: "DOM".to_string(),
            name: "Dominaria".to_string(),
            cards: vec![
                card("Plains", "250", "Basic Land — Plains"),
                card("Academy Drake", "40", "Creature — Drake"),
                card("Plains", "251", "Basic Land — Plains"),
            ],
        };

        let names: Vec<&str> = set.cards_by_name().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Academy Drake", "Plains"]);
        assert_eq!(set.card("Plains").unwrap().collector_number, "250");
    }
}
