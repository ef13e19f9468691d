//! Configuration management for fignos.
//!
//! Resolves the rendering options of a run from document metadata. The
//! options are read once, before any traversal, and stay fixed for the rest
//! of the run.
//!
//! ## Recognized Metadata
//!
//! Where two spellings exist the first one present wins:
//!
//! - `fignos-warning-level` / `xnos-warning-level` - `0`, `1` (default) or `2`
//! - `fignos-caption-name` - caption prefix (default `Figure`)
//! - `fignos-cleveref` / `xnos-cleveref` - clever references
//! - `xnos-capitalise` / `xnos-capitalize` - capitalise mid-sentence names
//! - `fignos-plus-name` - mid-sentence names (default `fig.`, `figs.`)
//! - `fignos-star-name` - sentence-initial names (default `Figure`, `Figures`)
//! - `fignos-number-sections` / `xnos-number-sections` - number by section
//!
//! # Example
//!
//! ```
//! use fignos_ast::{Meta, MetaValue};
//! use fignos_config::Config;
//!
//! let mut meta = Meta::new();
//! meta.insert("fignos-caption-name".to_owned(), MetaValue::MetaString("Fig.".to_owned()));
//!
//! let config = Config::from_meta(&meta).unwrap();
//! assert_eq!(config.caption_name, "Fig.");
//! assert!(config.caption_name_changed);
//! ```

use fignos_ast::{Meta, MetaValue};

/// Caption prefix used when `fignos-caption-name` is absent.
pub const DEFAULT_CAPTION_NAME: &str = "Figure";

/// Metadata keys understood by the filter.
const KNOWN_KEYS: &[&str] = &[
    "fignos-warning-level",
    "xnos-warning-level",
    "fignos-caption-name",
    "fignos-cleveref",
    "xnos-cleveref",
    "xnos-capitalise",
    "xnos-capitalize",
    "fignos-plus-name",
    "fignos-star-name",
    "fignos-number-sections",
    "xnos-number-sections",
];

/// Key prefixes reserved for numbering filters.
const RESERVED_PREFIXES: &[&str] = &["fignos", "xnos"];

/// How much diagnostic output a run produces.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum WarningLevel {
    /// No warnings at all.
    None,
    /// Warnings about problems in the document.
    #[default]
    Some,
    /// Everything, including notices about injected header includes.
    All,
}

/// Singular and plural forms of a reference name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NamePair {
    pub singular: String,
    pub plural: String,
}

impl NamePair {
    /// Create a name pair.
    #[must_use]
    pub fn new(singular: impl Into<String>, plural: impl Into<String>) -> Self {
        Self {
            singular: singular.into(),
            plural: plural.into(),
        }
    }

    /// The form for one (`false`) or several (`true`) targets.
    #[must_use]
    pub fn form(&self, plural: bool) -> &str {
        if plural { &self.plural } else { &self.singular }
    }

    /// Both forms title-cased (`fig.` becomes `Fig.`).
    #[must_use]
    pub fn title_case(&self) -> Self {
        Self {
            singular: title_case(&self.singular),
            plural: title_case(&self.plural),
        }
    }
}

/// Rendering options resolved from document metadata.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Caption prefix text.
    pub caption_name: String,
    /// Render references as clever-reference macros.
    pub cleveref: bool,
    /// Capitalise the mid-sentence clever-reference names.
    pub capitalise: bool,
    /// Names used for mid-sentence references.
    pub plus_name: NamePair,
    /// Names used for references at the start of a sentence.
    pub star_name: NamePair,
    /// Number figures within sections.
    pub number_by_section: bool,
    /// Diagnostic verbosity.
    pub warning_level: WarningLevel,
    /// Whether `caption_name` differs from its default.
    pub caption_name_changed: bool,
    /// Whether `plus_name` differs from its default.
    pub plus_name_changed: bool,
    /// Whether `star_name` differs from its default, including a star name
    /// derived from a changed plus name.
    pub star_name_changed: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            caption_name: DEFAULT_CAPTION_NAME.to_owned(),
            cleveref: false,
            capitalise: false,
            plus_name: NamePair::new("fig.", "figs."),
            star_name: NamePair::new("Figure", "Figures"),
            number_by_section: false,
            warning_level: WarningLevel::default(),
            caption_name_changed: false,
            plus_name_changed: false,
            star_name_changed: false,
        }
    }
}

impl Config {
    /// Resolve the configuration from document metadata.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when an option has the wrong shape. The
    /// error is fatal: every later numbering decision depends on it.
    pub fn from_meta(meta: &Meta) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some((key, value)) = lookup(meta, &["fignos-warning-level", "xnos-warning-level"]) {
            config.warning_level = read_warning_level(key, value)?;
        }

        if let Some(value) = meta.get("fignos-caption-name") {
            let name = read_string("fignos-caption-name", value)?;
            config.caption_name_changed = name != config.caption_name;
            config.caption_name = name;
        }

        if let Some((key, value)) = lookup(meta, &["fignos-cleveref", "xnos-cleveref"]) {
            config.cleveref = read_bool(key, value)?;
        }

        if let Some((key, value)) = lookup(meta, &["xnos-capitalise", "xnos-capitalize"]) {
            config.capitalise = read_bool(key, value)?;
        }

        if let Some(value) = meta.get("fignos-plus-name") {
            let names = read_names("fignos-plus-name", value, &config.plus_name)?;
            config.plus_name_changed = names != config.plus_name;
            config.plus_name = names;
            if config.plus_name_changed {
                config.star_name = config.plus_name.title_case();
            }
        }

        if let Some(value) = meta.get("fignos-star-name") {
            config.star_name = read_names("fignos-star-name", value, &config.star_name)?;
        }
        config.star_name_changed = config.star_name != Self::default().star_name;

        if let Some((key, value)) =
            lookup(meta, &["fignos-number-sections", "xnos-number-sections"])
        {
            config.number_by_section = read_bool(key, value)?;
        }

        Ok(config)
    }

    /// Names used for mid-sentence references.
    ///
    /// Title-cased when `capitalise` is set, unless the plus name was given
    /// explicitly.
    #[must_use]
    pub fn reference_plus_name(&self) -> NamePair {
        if self.capitalise && !self.plus_name_changed {
            self.plus_name.title_case()
        } else {
            self.plus_name.clone()
        }
    }
}

/// Metadata keys with a reserved prefix that the filter does not understand.
#[must_use]
pub fn unknown_keys(meta: &Meta) -> Vec<&str> {
    meta.keys()
        .map(String::as_str)
        .filter(|key| RESERVED_PREFIXES.iter().any(|p| key.starts_with(p)))
        .filter(|key| !KNOWN_KEYS.contains(key))
        .collect()
}

/// Configuration error.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// Option value has the wrong type.
    #[error("Configuration error: {key} must be {expected}")]
    WrongType {
        /// Metadata key.
        key: String,
        /// Human-readable description of the expected shape.
        expected: &'static str,
    },
    /// Name-pair option with other than two forms.
    #[error("Configuration error: {key} must give exactly 2 names (singular, plural), found {found}")]
    NamePairLength {
        /// Metadata key.
        key: String,
        /// Number of names given.
        found: usize,
    },
    /// Warning level outside 0..=2.
    #[error("Configuration error: {key} must be 0, 1 or 2, found {value:?}")]
    WarningLevel {
        /// Metadata key.
        key: String,
        /// Value as written.
        value: String,
    },
}

fn lookup<'a>(meta: &'a Meta, keys: &[&'static str]) -> Option<(&'static str, &'a MetaValue)> {
    keys.iter()
        .find_map(|&key| meta.get(key).map(|value| (key, value)))
}

fn read_string(key: &str, value: &MetaValue) -> Result<String, ConfigError> {
    value.as_text().ok_or_else(|| ConfigError::WrongType {
        key: key.to_owned(),
        expected: "a string",
    })
}

fn read_bool(key: &str, value: &MetaValue) -> Result<bool, ConfigError> {
    let wrong_type = || ConfigError::WrongType {
        key: key.to_owned(),
        expected: "true or false",
    };
    if let MetaValue::MetaBool(b) = value {
        return Ok(*b);
    }
    let text = value.as_text().ok_or_else(wrong_type)?;
    match text.trim().to_ascii_lowercase().as_str() {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(wrong_type()),
    }
}

fn read_warning_level(key: &str, value: &MetaValue) -> Result<WarningLevel, ConfigError> {
    let text = read_string(key, value)?;
    match text.trim() {
        "0" => Ok(WarningLevel::None),
        "1" => Ok(WarningLevel::Some),
        "2" => Ok(WarningLevel::All),
        _ => Err(ConfigError::WarningLevel {
            key: key.to_owned(),
            value: text,
        }),
    }
}

/// Read a name option: a single string replaces the singular form only.
fn read_names(key: &str, value: &MetaValue, current: &NamePair) -> Result<NamePair, ConfigError> {
    match value {
        MetaValue::MetaList(items) => {
            let [singular, plural] = items.as_slice() else {
                return Err(ConfigError::NamePairLength {
                    key: key.to_owned(),
                    found: items.len(),
                });
            };
            Ok(NamePair::new(
                read_string(key, singular)?,
                read_string(key, plural)?,
            ))
        }
        _ => Ok(NamePair::new(read_string(key, value)?, current.plural.clone())),
    }
}

/// Upper-case the first letter of every word and lower-case the rest.
fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_word = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }
    out
}
