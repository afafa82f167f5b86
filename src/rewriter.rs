//! Set-code rewriter for one set directory
//!
//! Files are all read before any is written, so unreadable files abort the run
//! without touching the directory. A failed write can still leave the directory
//! partially rewritten; there is no backup.

use crate::error::{Error, Result};
use crate::scanner::{declared_set_code, list_files, read_source};
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

lazy_static! {
    static ref SET_CODE: Regex = Regex::new(r"^[A-Z0-9]+$").unwrap();
}

/// Outcome of a set-code rewrite
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteSummary {
    pub old_codes: BTreeSet<String>,
    pub new_code: String,
    pub files_total: usize,
    pub files_rewritten: usize,
}

/// Check that a set code only uses uppercase letters and digits
pub fn validate_set_code(code: &str) -> Result<()> {
    if SET_CODE.is_match(code) {
        Ok(())
    } else {
        Err(Error::InvalidSetCode(code.to_string()))
    }
}

/// Set codes declared by the given sources
pub fn declared_codes<'a>(sources: impl IntoIterator<Item = (&'a Path, &'a str)>) -> BTreeSet<String> {
    let mut codes = BTreeSet::new();
    for (path, text) in sources {
        match declared_set_code(text) {
            Some(code) => {
                codes.insert(code);
            }
            None => log::debug!("No set code in {}", path.display()),
        }
    }
    codes
}

/// Replace every quoted occurrence of the old codes with the new one
pub fn replace_codes(text: &str, old_codes: &BTreeSet<String>, new_code: &str) -> String {
    let quoted_new = format!("\"{}\"", new_code);
    old_codes
        .iter()
        .filter(|old| old.as_str() != new_code)
        .fold(text.to_string(), |acc, old| {
            acc.replace(&format!("\"{}\"", old), &quoted_new)
        })
}

/// Rewrite the set code of every file in `dir` to `new_code`
pub fn rewrite_set_code(dir: &Path, new_code: &str) -> Result<RewriteSummary> {
    validate_set_code(new_code)?;

    let files = list_files(dir)?;
    let sources: Vec<(PathBuf, String)> = files
        .into_iter()
        .map(|path| read_source(&path).map(|text| (path, text)))
        .collect::<Result<_>>()?;

    let old_codes = declared_codes(sources.iter().map(|(p, t)| (p.as_path(), t.as_str())));
    if old_codes.is_empty() {
        return Err(Error::Parse(format!(
            "no set code declared in any file of {}",
            dir.display()
        )));
    }
    if old_codes.len() > 1 {
        log::warn!(
            "{} declares several set codes ({}), rewriting all of them",
            dir.display(),
            old_codes.iter().cloned().collect::<Vec<_>>().join(", ")
        );
    }

    let mut files_rewritten = 0;
    for (path, text) in &sources {
        let rewritten = replace_codes(text, &old_codes, new_code);
        if rewritten != *text {
            fs::write(path, rewritten).map_err(|e| Error::io(path, e))?;
            files_rewritten += 1;
            log::debug!("Rewrote {}", path.display());
        }
    }

    log::info!(
        "Rewrote {} of {} files in {} to {}",
        files_rewritten,
        sources.len(),
        dir.display(),
        new_code
    );

    Ok(RewriteSummary {
        old_codes,
        new_code: new_code.to_string(),
        files_total: sources.len(),
        files_rewritten,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn card_file(name: &str, code: &str) -> String {
        format!(
            "public class X extends CardImpl {{\n    public X(UUID ownerId) {{\n        super(ownerId, 1, \"{}\", Rarity.COMMON, new CardType[]{{CardType.INSTANT}}, \"{{R}}\");\n        this.expansionSetCode = \"{}\";\n    }}\n}}\n",
            name, code
        )
    }

    fn count_quoted(dir: &Path, code: &str) -> usize {
        let needle = format!("\"{}\"", code);
        list_files(dir)
            .unwrap()
            .iter()
            .map(|p| fs::read_to_string(p).unwrap().matches(&needle).count())
            .sum()
    }

    #[test]
    fn test_validate_set_code() {
        assert!(validate_set_code("XYZ").is_ok());
        assert!(validate_set_code("M21").is_ok());
        assert!(matches!(validate_set_code("xyz"), Err(Error::InvalidSetCode(_))));
        assert!(matches!(validate_set_code(""), Err(Error::InvalidSetCode(_))));
        assert!(matches!(validate_set_code("AB C"), Err(Error::InvalidSetCode(_))));
    }

    #[test]
    fn test_replace_codes_only_touches_quoted_tokens() {
        let codes = BTreeSet::from(["ABC".to_string()]);
        let text = "super(\"Alphabet\", \"ABC\"); // ABC\nString x = \"ABCD\";";
        let out = replace_codes(text, &codes, "XYZ");
        assert_eq!(out, "super(\"Alphabet\", \"XYZ\"); // ABC\nString x = \"ABCD\";");
    }

    #[test]
    fn test_rewrite_set_code_rewrites_every_file() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("Bolt.java"), card_file("Bolt", "ABC")).unwrap();
        fs::write(dir.path().join("Shock.java"), card_file("Shock", "ABC")).unwrap();
        fs::write(dir.path().join("README"), "no code here").unwrap();

        let summary = rewrite_set_code(dir.path(), "XYZ").unwrap();

        assert_eq!(summary.files_total, 3);
        assert_eq!(summary.files_rewritten, 2);
        assert_eq!(summary.old_codes, BTreeSet::from(["ABC".to_string()]));
        assert_eq!(count_quoted(dir.path(), "ABC"), 0);
        assert_eq!(list_files(dir.path()).unwrap().len(), 3);

        let records = crate::scanner::scan_set_dir(dir.path()).unwrap();
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.set_code == "XYZ"));
    }

    #[test]
    fn test_rewrite_set_code_stale_directory() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("A.java"), card_file("A", "ABC")).unwrap();
        fs::write(dir.path().join("B.java"), card_file("B", "OLD")).unwrap();

        let summary = rewrite_set_code(dir.path(), "XYZ").unwrap();

        assert_eq!(summary.old_codes.len(), 2);
        assert_eq!(count_quoted(dir.path(), "ABC"), 0);
        assert_eq!(count_quoted(dir.path(), "OLD"), 0);
    }

    #[test]
    fn test_rewrite_set_code_reprint_classes() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("LightningBolt.java"),
            "public class LightningBolt extends mage.sets.magic2010.LightningBolt {\n    public LightningBolt(UUID ownerId) {\n        super(ownerId);\n        this.expansionSetCode = \"M11\";\n    }\n}\n",
        )
        .unwrap();

        let summary = rewrite_set_code(dir.path(), "XYZ").unwrap();

        assert_eq!(summary.old_codes, BTreeSet::from(["M11".to_string()]));
        assert_eq!(summary.files_rewritten, 1);
        assert_eq!(count_quoted(dir.path(), "XYZ"), 1);
    }

    #[test]
    fn test_rewrite_set_code_missing_directory() {
        let dir = TempDir::new().unwrap();
        let result = rewrite_set_code(&dir.path().join("missing"), "XYZ");
        assert!(matches!(result, Err(Error::DirectoryNotFound(_))));
    }

    #[test]
    fn test_rewrite_set_code_without_declaration() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("README"), "nothing").unwrap();
        let result = rewrite_set_code(dir.path(), "XYZ");
        assert!(matches!(result, Err(Error::Parse(_))));
    }

    #[test]
    fn test_rewrite_set_code_invalid_code_leaves_files() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("A.java"), card_file("A", "ABC")).unwrap();

        assert!(rewrite_set_code(dir.path(), "xyz").is_err());
        assert_eq!(count_quoted(dir.path(), "ABC"), 1);
    }
}
