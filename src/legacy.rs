//! Card classes from before the set-class refactor
//!
//! Older checkouts keep one class per printing under
//! `Mage.Sets/src/mage/sets/<package>/`. A reprint extends the class of an
//! earlier printing and usually declares only its own set code, so its name
//! has to be looked up through the superclass chain. The oldest checkouts
//! declare no set code on the cards at all: set classes in the sets root list
//! their cards with `this.cards.add(Card.class)` instead.

use crate::models::CardRecord;
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::{Path, PathBuf};

lazy_static! {
    /// `this.expansionSetCode = "M10";`
    static ref CARD_SET_CODE: Regex = Regex::new(r#"this\.expansionSetCode\s*=\s*"([0-9A-Z]+)";"#).unwrap();
    static ref CARD_NAME: Regex = Regex::new(r#"(?m)^\s*super\([A-Za-z]+,\s*(?:[0-9]+,)?\s*"(.+?)","#).unwrap();
    static ref IMPORT_CLASS: Regex = Regex::new(r"(?m)^import mage\.sets\.([0-9a-z]+)\.([0-9A-Za-z]+);").unwrap();
    static ref EXTENDS_BASIC_LAND: Regex = Regex::new(
        r"(?m)^public class [0-9A-Za-z]+ extends (?:mage\.cards\.basiclands\.)?(Plains|Island|Swamp|Mountain|Forest)(?:<[0-9A-Za-z]+>)?\s*\{"
    ).unwrap();
    static ref EXTENDS_QUALIFIED: Regex = Regex::new(
        r"(?m)^public class [0-9A-Za-z]+ extends mage\.sets\.([0-9a-z]+)\.([0-9A-Za-z]+)\s*\{"
    ).unwrap();
    static ref EXTENDS_SIMPLE: Regex = Regex::new(r"(?m)^public class [0-9A-Za-z]+ extends ([0-9A-Za-z]+)\s*\{").unwrap();
    static ref IMPORT_PACKAGE: Regex = Regex::new(r"^import mage\.sets\.([0-9a-z]+)\.\*;").unwrap();
    static ref ADD_CARD_CLASS: Regex = Regex::new(r"^\s*this\.cards\.add\(([0-9A-Za-z]+)\.class\);").unwrap();
}

/// Set classes of the oldest layout, by file stem
const LISTING_SET_CODES: &[(&str, &str)] = &[
    ("AlaraReborn", "ARB"),
    ("Conflux", "CON"),
    ("Magic2010", "M10"),
    ("Magic2011", "M11"),
    ("Planechase", "HOP"),
    ("RiseOfTheEldrazi", "ROE"),
    ("ShardsOfAlara", "ALA"),
    ("Tenth", "10E"),
    ("Worldwake", "WWK"),
    ("Zendikar", "ZEN"),
];

/// A card class, named by its set package and class name
/// (`mage.sets.magic2010.LightningBolt` is `magic2010` / `LightningBolt`)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClassRef {
    pub package: String,
    pub class: String,
}

impl ClassRef {
    pub fn new(package: &str, class: &str) -> Self {
        ClassRef {
            package: package.to_string(),
            class: class.to_string(),
        }
    }
}

/// What a per-card class declares; any part may be missing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CardClass {
    pub set_code: Option<String>,
    pub card_name: Option<String>,
    pub superclass: Option<ClassRef>,
}

impl CardClass {
    pub fn is_empty(&self) -> bool {
        self.set_code.is_none() && self.card_name.is_none() && self.superclass.is_none()
    }
}

/// Parse a per-card class
pub fn parse_card_class(text: &str) -> CardClass {
    let imports: HashMap<&str, &str> = IMPORT_CLASS
        .captures_iter(text)
        .map(|c| {
            let (_, [package, class]) = c.extract();
            (class, package)
        })
        .collect();

    let superclass = EXTENDS_QUALIFIED
        .captures(text)
        .map(|c| ClassRef::new(&c[1], &c[2]))
        .or_else(|| {
            let class = EXTENDS_SIMPLE.captures(text)?.get(1)?.as_str();
            imports.get(class).map(|package| ClassRef::new(package, class))
        });

    let card_name = CARD_NAME
        .captures(text)
        .or_else(|| EXTENDS_BASIC_LAND.captures(text))
        .map(|c| c[1].to_string());

    CardClass {
        set_code: CARD_SET_CODE.captures(text).map(|c| c[1].to_string()),
        card_name,
        superclass,
    }
}

/// Set code of an oldest-layout set class, by its file stem
pub fn listing_set_code(stem: &str) -> Option<&'static str> {
    LISTING_SET_CODES
        .iter()
        .find(|(name, _)| *name == stem)
        .map(|(_, code)| *code)
}

/// Card classes listed by an oldest-layout set class
///
/// Each `import mage.sets.<package>.*;` line sets the package of the
/// `this.cards.add(<Class>.class);` lines that follow it.
pub fn parse_set_listing(text: &str) -> Vec<ClassRef> {
    let mut package: Option<&str> = None;
    let mut classes = Vec::new();
    for line in text.lines() {
        if let Some(caps) = IMPORT_PACKAGE.captures(line) {
            package = caps.get(1).map(|m| m.as_str());
        } else if let (Some(caps), Some(package)) = (ADD_CARD_CLASS.captures(line), package) {
            classes.push(ClassRef::new(package, &caps[1]));
        }
    }
    classes
}

#[derive(Debug)]
struct Reprint {
    superclass: ClassRef,
    set_code: Option<String>,
    path: PathBuf,
}

/// Card classes collected across a sets tree, resolved once all are known
#[derive(Debug, Default)]
pub struct LegacyIndex {
    listings: bool,
    printings: BTreeMap<ClassRef, (String, String)>,
    reprints: BTreeMap<ClassRef, Reprint>,
    listed_in: BTreeMap<ClassRef, BTreeSet<String>>,
    unlisted: Vec<(ClassRef, String, PathBuf)>,
}

impl LegacyIndex {
    /// `listings` selects the oldest layout, where set classes list their cards
    pub fn new(listings: bool) -> Self {
        LegacyIndex {
            listings,
            ..Default::default()
        }
    }

    pub fn uses_listings(&self) -> bool {
        self.listings
    }

    /// Record the cards listed by an oldest-layout set class
    pub fn add_set_listing(&mut self, set_code: &str, classes: Vec<ClassRef>) {
        for class in classes {
            self.listed_in
                .entry(class)
                .or_default()
                .insert(set_code.to_string());
        }
    }

    /// Add a card class; returns its record when it names both card and set
    pub fn add_card_class(&mut self, class: ClassRef, card: CardClass, path: &Path) -> Option<CardRecord> {
        match card {
            CardClass {
                set_code: Some(set_code),
                card_name: Some(name),
                ..
            } => {
                self.printings
                    .insert(class, (set_code.clone(), name.clone()));
                Some(CardRecord {
                    name,
                    set_code,
                    file_path: path.to_path_buf(),
                })
            }
            CardClass {
                superclass: Some(superclass),
                set_code,
                ..
            } => {
                self.reprints.insert(
                    class,
                    Reprint {
                        superclass,
                        set_code,
                        path: path.to_path_buf(),
                    },
                );
                None
            }
            CardClass {
                card_name: Some(name),
                ..
            } if self.listings => {
                self.unlisted.push((class, name, path.to_path_buf()));
                None
            }
            _ => {
                log::warn!("Skipping {}: no set code or superclass", path.display());
                None
            }
        }
    }

    /// Records of the reprints and listed cards
    pub fn resolve(self) -> Vec<CardRecord> {
        let mut records = Vec::new();

        if self.listings {
            for (class, name, path) in self.unlisted {
                for set_code in self.listed_in.get(&class).into_iter().flatten() {
                    records.push(CardRecord {
                        name: name.clone(),
                        set_code: set_code.clone(),
                        file_path: path.clone(),
                    });
                }
            }
            return records;
        }

        for (class, reprint) in &self.reprints {
            let mut superclass = &reprint.superclass;
            let mut set_code = reprint.set_code.as_ref();
            let mut seen = BTreeSet::from([class]);
            while let Some(parent) = self.reprints.get(superclass) {
                if !seen.insert(superclass) {
                    break;
                }
                set_code = set_code.or(parent.set_code.as_ref());
                superclass = &parent.superclass;
            }

            match self.printings.get(superclass) {
                Some((base_code, name)) => records.push(CardRecord {
                    name: name.clone(),
                    set_code: set_code.unwrap_or(base_code).clone(),
                    file_path: reprint.path.clone(),
                }),
                None => log::warn!(
                    "Skipping {}: superclass {}.{} not found",
                    reprint.path.display(),
                    superclass.package,
                    superclass.class
                ),
            }
        }
        records
    }
}
