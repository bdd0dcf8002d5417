use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

const LAYS_LOGO_KEYWORDS: &[&str] = &[
    "lays",
    "lay's",
    "lay s",
    "lais",
    "lai's",
    "frito-lay",
    "frito lay",
];

const LAYS_TEXT_KEYWORDS: &[&str] = &[
    "lays",
    "lay's",
    "lay s",
    "lais",
    "lai's",
    "lays classic",
    "lays masala",
    "lays magic masala",
    "lays american style cream & onion",
    "lays india's magic masala",
    "lays spanish tomato tango",
    "lays french cheese & herbs",
    "lays maxx macho chilli",
    "lays maxx",
    "lays wavy",
    "lays stax",
    "lays poppables",
    "lays french cheese",
    "lays cream onion",
    "lays cheese herbs",
    "lays tomato tango",
    "lays macho chilli",
];

/// Brand gate for detection. Logo keywords are matched against logo
/// annotations, text keywords against the OCR transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrandKeywords {
    pub brand: String,
    #[serde(default)]
    pub logo_keywords: Vec<String>,
    #[serde(default)]
    pub text_keywords: Vec<String>,
}

impl Default for BrandKeywords {
    fn default() -> Self {
        Self::lays()
    }
}

impl BrandKeywords {
    /// Built-in keyword lists for Lay's, including common OCR misreads.
    #[must_use]
    pub fn lays() -> Self {
        Self {
            brand: "Lay's".to_string(),
            logo_keywords: LAYS_LOGO_KEYWORDS.iter().map(|&k| k.to_string()).collect(),
            text_keywords: LAYS_TEXT_KEYWORDS.iter().map(|&k| k.to_string()).collect(),
        }
    }

    /// Case-insensitive substring match of a logo description.
    #[must_use]
    pub fn matches_logo(&self, description: &str) -> bool {
        contains_any(description, &self.logo_keywords)
    }

    /// Case-insensitive substring match of OCR text.
    #[must_use]
    pub fn matches_text(&self, text: &str) -> bool {
        contains_any(text, &self.text_keywords)
    }
}

fn contains_any(haystack: &str, keywords: &[String]) -> bool {
    if haystack.is_empty() {
        return false;
    }
    let haystack = haystack.to_lowercase();
    keywords
        .iter()
        .map(|k| k.trim())
        .filter(|k| !k.is_empty())
        .any(|k| haystack.contains(&k.to_lowercase()))
}

/// Load and validate brand keywords from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_keywords(path: &Path) -> Result<BrandKeywords, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::KeywordsFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let keywords: BrandKeywords =
        serde_yaml::from_str(&content).map_err(ConfigError::KeywordsFileParse)?;

    validate_keywords(&keywords)?;

    tracing::debug!(
        brand = %keywords.brand,
        logo_keywords = keywords.logo_keywords.len(),
        text_keywords = keywords.text_keywords.len(),
        "loaded brand keywords"
    );
    Ok(keywords)
}

/// Load keywords from `path` when given, otherwise the built-in Lay's lists.
///
/// # Errors
///
/// Returns `ConfigError` if a path is given and [`load_keywords`] fails.
pub fn load_keywords_or_default(path: Option<&Path>) -> Result<BrandKeywords, ConfigError> {
    match path {
        Some(path) => load_keywords(path),
        None => Ok(BrandKeywords::default()),
    }
}

fn validate_keywords(keywords: &BrandKeywords) -> Result<(), ConfigError> {
    if keywords.brand.trim().is_empty() {
        return Err(ConfigError::Validation(
            "brand name must be non-empty".to_string(),
        ));
    }

    if keywords.logo_keywords.is_empty() && keywords.text_keywords.is_empty() {
        return Err(ConfigError::Validation(format!(
            "brand '{}' has no logo or text keywords",
            keywords.brand
        )));
    }

    for (list, entries) in [
        ("logo_keywords", &keywords.logo_keywords),
        ("text_keywords", &keywords.text_keywords),
    ] {
        let mut seen = HashSet::new();
        for keyword in entries {
            if keyword.trim().is_empty() {
                return Err(ConfigError::Validation(format!(
                    "{list} contains a blank keyword"
                )));
            }
            if !seen.insert(keyword.trim().to_lowercase()) {
                return Err(ConfigError::Validation(format!(
                    "duplicate keyword in {list}: '{keyword}'"
                )));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "keywords_test.rs"]
mod tests;
