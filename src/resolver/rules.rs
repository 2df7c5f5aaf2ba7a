//! Retention rule configuration.
//!
//! A [`RuleConfig`] is compiled once at startup and then shared by
//! reference with every resolver call. Patterns are regular expressions
//! searched anywhere in the full path.

use std::fmt;

use regex::Regex;

/// Delete patterns that are always active, ahead of any user pattern.
pub const DEFAULT_DELETE_PATTERNS: [&str; 2] = ["(?i)copie|copy", "~$"];

/// Errors raised while building a [`RuleConfig`].
#[derive(thiserror::Error, Debug)]
pub enum RuleError {
    /// A pattern failed to compile.
    #[error("invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        /// The offending pattern text
        pattern: String,
        /// Compiler diagnostic
        #[source]
        source: regex::Error,
    },

    /// Both `--keep-oldest` and `--keep-newest` were requested.
    #[error("--keep-oldest and --keep-newest are mutually exclusive")]
    ConflictingAgePreference,
}

/// Ordered list of compiled patterns.
#[derive(Debug, Clone, Default)]
pub struct PatternList {
    patterns: Vec<Regex>,
}

impl PatternList {
    /// Compile every pattern, in order.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::InvalidPattern`] for the first pattern that
    /// does not compile.
    pub fn new<I, S>(patterns: I) -> Result<Self, RuleError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = patterns
            .into_iter()
            .map(|p| {
                Regex::new(p.as_ref()).map_err(|source| RuleError::InvalidPattern {
                    pattern: p.as_ref().to_string(),
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    /// First pattern found anywhere in `path`, in list order.
    #[must_use]
    pub fn first_match(&self, path: &str) -> Option<&Regex> {
        self.patterns.iter().find(|re| re.is_match(path))
    }

    /// Whether any pattern is found in `path`.
    #[must_use]
    pub fn is_match(&self, path: &str) -> bool {
        self.first_match(path).is_some()
    }

    /// Number of patterns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// True when the list holds no pattern.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Source text of each pattern, in order.
    pub fn as_strs(&self) -> impl Iterator<Item = &str> {
        self.patterns.iter().map(Regex::as_str)
    }
}

/// Which copy survives when no pattern says anything about a set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AgePreference {
    /// Leave the set undecided.
    #[default]
    None,
    /// Keep the member with the earliest creation time.
    KeepOldest,
    /// Keep the member with the latest creation time.
    KeepNewest,
}

impl AgePreference {
    /// Combine the two mutually exclusive CLI flags.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::ConflictingAgePreference`] if both are set.
    pub fn from_flags(keep_oldest: bool, keep_newest: bool) -> Result<Self, RuleError> {
        match (keep_oldest, keep_newest) {
            (true, true) => Err(RuleError::ConflictingAgePreference),
            (true, false) => Ok(Self::KeepOldest),
            (false, true) => Ok(Self::KeepNewest),
            (false, false) => Ok(Self::None),
        }
    }

    /// Whether set members need to be ordered by age.
    #[must_use]
    pub fn is_active(self) -> bool {
        self != Self::None
    }
}

impl fmt::Display for AgePreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::KeepOldest => write!(f, "keep oldest"),
            Self::KeepNewest => write!(f, "keep newest"),
        }
    }
}

/// Immutable rule set for one run.
#[derive(Debug, Clone)]
pub struct RuleConfig {
    min_size: Option<u64>,
    delete: PatternList,
    keep: PatternList,
    age: AgePreference,
    dry_run: bool,
}

impl RuleConfig {
    /// Start building a rule set.
    #[must_use]
    pub fn builder() -> RuleConfigBuilder {
        RuleConfigBuilder::default()
    }

    /// Minimum file size considered, if any.
    #[must_use]
    pub fn min_size(&self) -> Option<u64> {
        self.min_size
    }

    /// Delete patterns, built-ins first.
    #[must_use]
    pub fn delete_patterns(&self) -> &PatternList {
        &self.delete
    }

    /// Keep patterns.
    #[must_use]
    pub fn keep_patterns(&self) -> &PatternList {
        &self.keep
    }

    /// Age fallback.
    #[must_use]
    pub fn age_preference(&self) -> AgePreference {
        self.age
    }

    /// Whether deletions are only reported.
    #[must_use]
    pub fn dry_run(&self) -> bool {
        self.dry_run
    }
}

/// Builder for [`RuleConfig`].
///
/// # Example
///
/// ```
/// use refdup::resolver::{AgePreference, RuleConfig};
///
/// let rules = RuleConfig::builder()
///     .delete_pattern(r"\(1\)")
///     .keep_pattern("^/photos/")
///     .age_preference(AgePreference::KeepOldest)
///     .dry_run(true)
///     .build()
///     .unwrap();
///
/// assert_eq!(rules.delete_patterns().len(), 3);
/// ```
#[derive(Debug, Clone, Default)]
pub struct RuleConfigBuilder {
    min_size: Option<u64>,
    delete: Vec<String>,
    keep: Vec<String>,
    age: AgePreference,
    dry_run: bool,
}

impl RuleConfigBuilder {
    /// Exclude files below `min_size` bytes.
    #[must_use]
    pub fn min_size(mut self, min_size: Option<u64>) -> Self {
        self.min_size = min_size;
        self
    }

    /// Append one delete pattern.
    #[must_use]
    pub fn delete_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.delete.push(pattern.into());
        self
    }

    /// Append several delete patterns.
    #[must_use]
    pub fn delete_patterns<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.delete.extend(patterns.into_iter().map(Into::into));
        self
    }

    /// Append one keep pattern.
    #[must_use]
    pub fn keep_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.keep.push(pattern.into());
        self
    }

    /// Append several keep patterns.
    #[must_use]
    pub fn keep_patterns<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keep.extend(patterns.into_iter().map(Into::into));
        self
    }

    /// Set the age fallback.
    #[must_use]
    pub fn age_preference(mut self, age: AgePreference) -> Self {
        self.age = age;
        self
    }

    /// Report deletions without performing them.
    #[must_use]
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Compile all patterns. The built-in delete patterns are prepended.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::InvalidPattern`] if any user pattern is invalid.
    pub fn build(self) -> Result<RuleConfig, RuleError> {
        let delete = PatternList::new(
            DEFAULT_DELETE_PATTERNS
                .iter()
                .map(|s| (*s).to_string())
                .chain(self.delete),
        )?;
        let keep = PatternList::new(self.keep)?;

        Ok(RuleConfig {
            min_size: self.min_size,
            delete,
            keep,
            age: self.age,
            dry_run: self.dry_run,
        })
    }
}
