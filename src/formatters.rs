use crate::models::DatabaseSet;
use std::collections::{BTreeMap, BTreeSet};

const MTG_WTF: &str = "https://mtg.wtf/card";

/// Link to an exact-name search on mtg.wtf
pub fn search_link(name: &str) -> String {
    let query = urlencoding::encode(name).replace("%20", "+");
    format!("[{name}]({MTG_WTF}?q=%21{query})")
}

/// Markdown link to a card, pointing at its printing in `set` when known
pub fn markdown_card_link(name: &str, set: Option<&DatabaseSet>) -> String {
    let Some(set) = set else {
        return search_link(name);
    };
    let Some(card) = set.card(name) else {
        return search_link(name);
    };
    if card.collector_number.is_empty() {
        return search_link(name);
    }

    let number = match card.collector_number.parse::<u32>() {
        Ok(n) if card.is_planar() => (n + 1000).to_string(),
        _ => card.collector_number.clone(),
    };
    format!(
        "[{name}]({MTG_WTF}/{}/{})",
        set.code.to_lowercase(),
        urlencoding::encode(&number)
    )
}

/// Markdown link to an image, percent-encoding what would end the link destination
pub fn image_link(name: &str, url: &str) -> String {
    let mut destination = String::with_capacity(url.len());
    for c in url.chars() {
        match c {
            ' ' => destination.push_str("%20"),
            '(' => destination.push_str("%28"),
            ')' => destination.push_str("%29"),
            '<' => destination.push_str("%3C"),
            '>' => destination.push_str("%3E"),
            c => destination.push(c),
        }
    }
    format!("[{name}]({destination})")
}

/// A GitHub task list item
pub fn checklist_line(done: bool, text: &str) -> String {
    format!("- [{}] {}", if done { "x" } else { " " }, text)
}

/// Tracking issue body for a set; `patch` keeps only the Cards section
pub fn oracle_update_body(
    set_code: &str,
    reprints: &[String],
    new_cards: &[String],
    patch: bool,
) -> String {
    let mut output = String::new();

    if !patch {
        output.push_str(&format!(
            "# Rules\n\n\
             The following rules changes from {set_code} may be relevant for XMage:\n\n\
             **TODO**\n\n\
             # Oracle\n\n\
             In {set_code}, there have been the following Oracle changes which will have to be implemented. \
             Functional errata are marked in boldface, and unimplemented cards are omitted.\n\n\
             ## Multiple cards\n\n\
             **TODO**\n\n\
             ## Single card\n\n\
             **TODO**\n\n"
        ));
    }

    output.push_str(&format!(
        "# Cards\n\n\
         The following cards have been printed in {set_code} and will have to be implemented.\n\n\
         ## Reprints\n\n\
         {}\n\n\
         ## New cards\n\n\
         {}\n",
        reprints.join("\n"),
        new_cards.join("\n")
    ));

    output
}

/// Changelog of newly implemented cards: one bullet per set with `;`-separated links
pub fn changelog(links_by_set: &BTreeMap<String, Vec<String>>) -> String {
    links_by_set
        .iter()
        .filter(|(_, links)| !links.is_empty())
        .map(|(set_code, links)| format!("* {}: {}", set_code, links.join("; ")))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn total_line(unique: usize, total: usize) -> String {
    format!("{unique} unique, {total} total")
}

/// Sorted, deduplicated card names
pub fn name_list<'a>(names: impl IntoIterator<Item = &'a str>) -> String {
    names
        .into_iter()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DatabaseCard;

    fn set_with(cards: &[(&str, &str, &str)]) -> DatabaseSet {
        DatabaseSet {
            code: "HOP".to_string(),
            name: "Planechase".to_string(),
            cards: cards
                .iter()
                .map(|(name, number, type_line)| DatabaseCard {
                    name: name.to_string(),
                    collector_number: number.to_string(),
                    rarity: "common".to_string(),
                    type_line: Some(type_line.to_string()),
                    reprint: false,
                })
                .collect(),
        }
    }

    #[test]
    fn test_search_link() {
        assert_eq!(
            search_link("Lightning Bolt"),
            "[Lightning Bolt](https://mtg.wtf/card?q=%21Lightning+Bolt)"
        );
    }

    #[test]
    fn test_search_link_escapes_punctuation() {
        assert_eq!(
            search_link("Fire // Ice"),
            "[Fire // Ice](https://mtg.wtf/card?q=%21Fire+%2F%2F+Ice)"
        );
    }

    #[test]
    fn test_markdown_card_link_without_set() {
        assert_eq!(
            markdown_card_link("Lightning Bolt", None),
            search_link("Lightning Bolt")
        );
    }

    #[test]
    fn test_markdown_card_link_with_set() {
        let set = set_with(&[("Lightning Bolt", "42", "Instant")]);
        assert_eq!(
            markdown_card_link("Lightning Bolt", Some(&set)),
            "[Lightning Bolt](https://mtg.wtf/card/hop/42)"
        );
    }

    #[test]
    fn test_markdown_card_link_planes_offset() {
        let set = set_with(&[
            ("Tazeem", "40", "Plane — Zendikar"),
            ("Chaotic Aether", "2", "Phenomenon"),
        ]);
        assert_eq!(
            markdown_card_link("Tazeem", Some(&set)),
            "[Tazeem](https://mtg.wtf/card/hop/1040)"
        );
        assert_eq!(
            markdown_card_link("Chaotic Aether", Some(&set)),
            "[Chaotic Aether](https://mtg.wtf/card/hop/1002)"
        );
    }

    #[test]
    fn test_markdown_card_link_non_numeric_number() {
        let set = set_with(&[("Plains", "250a", "Basic Land — Plains")]);
        assert_eq!(
            markdown_card_link("Plains", Some(&set)),
            "[Plains](https://mtg.wtf/card/hop/250a)"
        );
    }

    #[test]
    fn test_markdown_card_link_card_missing_from_set() {
        let set = set_with(&[("Tazeem", "40", "Plane — Zendikar")]);
        assert_eq!(
            markdown_card_link("Lightning Bolt", Some(&set)),
            search_link("Lightning Bolt")
        );
    }

    #[test]
    fn test_image_link_escapes_destination() {
        assert_eq!(
            image_link("Academy Drake", "https://img/ad.png"),
            "[Academy Drake](https://img/ad.png)"
        );
        assert_eq!(
            image_link("Fire // Ice", "https://img/fire ice (1).png"),
            "[Fire // Ice](https://img/fire%20ice%20%281%29.png)"
        );
        assert_eq!(image_link("X", "https://img/<x>.png"), "[X](https://img/%3Cx%3E.png)");
    }

    #[test]
    fn test_checklist_line() {
        assert_eq!(checklist_line(true, "[A](u)"), "- [x] [A](u)");
        assert_eq!(checklist_line(false, "[A](u)"), "- [ ] [A](u)");
    }

    #[test]
    fn test_oracle_update_body_full() {
        let body = oracle_update_body(
            "DOM",
            &["- [x] A".to_string()],
            &["- [ ] B".to_string(), "- [ ] C".to_string()],
            false,
        );

        assert!(body.starts_with("# Rules\n\nThe following rules changes from DOM may be relevant"));
        assert!(body.contains("# Oracle\n\nIn DOM, there have been"));
        assert!(body.contains("## Multiple cards\n\n**TODO**\n\n## Single card\n\n**TODO**\n\n# Cards"));
        assert!(body.ends_with("## Reprints\n\n- [x] A\n\n## New cards\n\n- [ ] B\n- [ ] C\n"));
    }

    #[test]
    fn test_oracle_update_body_patch() {
        let body = oracle_update_body("DOM", &[], &["- [ ] B".to_string()], true);

        assert!(body.starts_with(
            "# Cards\n\nThe following cards have been printed in DOM and will have to be implemented."
        ));
        assert!(!body.contains("# Rules"));
        assert!(!body.contains("# Oracle"));
    }

    #[test]
    fn test_changelog_skips_empty_sets() {
        let mut links = BTreeMap::new();
        links.insert("M10".to_string(), vec!["[A](a)".to_string(), "[B](b)".to_string()]);
        links.insert("DOM".to_string(), vec!["[C](c)".to_string()]);
        links.insert("ZEN".to_string(), vec![]);

        assert_eq!(changelog(&links), "* DOM: [C](c)\n* M10: [A](a); [B](b)");
    }

    #[test]
    fn test_total_line() {
        assert_eq!(total_line(2, 3), "2 unique, 3 total");
    }

    #[test]
    fn test_name_list_sorted_unique() {
        assert_eq!(name_list(["Shock", "Bolt", "Shock"]), "Bolt\nShock");
    }
}
