//! Retention resolver: decides which members of a duplicate set survive.
//!
//! # Overview
//!
//! [`resolve`] is a pure function of a [`DuplicateSet`] and a
//! [`RuleConfig`]. It classifies every member against the delete and keep
//! pattern lists and then applies the rule classes in a fixed order:
//!
//! 1. No pattern matched any member: fall back to the age preference, or
//!    leave the whole set undecided when none is configured.
//! 2. Every member matched a delete pattern: delete nothing.
//! 3. Members matching a delete pattern are deleted.
//! 4. With two or more members left, those matching no keep pattern are
//!    deleted; if none of them matches a keep pattern the remainder is left
//!    undecided.
//!
//! The age preference is only a fallback for step 1, never a tiebreaker
//! once patterns have matched. A verdict never deletes every member.
//!
//! # Example
//!
//! ```
//! use refdup::duplicates::DuplicateSet;
//! use refdup::resolver::{resolve, Action, RuleConfig};
//! use refdup::scanner::FileRecord;
//! use std::path::PathBuf;
//! use std::time::SystemTime;
//!
//! let set = DuplicateSet::new([0; 32], 3, vec![
//!     FileRecord::new(PathBuf::from("a.txt"), 3, SystemTime::UNIX_EPOCH),
//!     FileRecord::new(PathBuf::from("a copy.txt"), 3, SystemTime::UNIX_EPOCH),
//! ]).unwrap();
//!
//! let verdict = resolve(&set, &RuleConfig::builder().build().unwrap());
//! assert_eq!(verdict.decisions()[0].action, Action::Keep);
//! assert_eq!(verdict.decisions()[1].action, Action::Delete);
//! ```

pub mod rules;

use std::cmp::Reverse;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::duplicates::DuplicateSet;
use crate::scanner::Digest;

pub use rules::{
    AgePreference, PatternList, RuleConfig, RuleConfigBuilder, RuleError,
    DEFAULT_DELETE_PATTERNS,
};

/// What happens to one member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Remove the file.
    Delete,
    /// Leave the file; it is a survivor.
    Keep,
    /// Leave the file; no rule decided it.
    Undecided,
}

/// Why a member received its [`Action`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reason {
    /// Matched the named delete pattern.
    MatchedDeletePattern(String),
    /// Matched the named keep pattern.
    MatchedKeepPattern(String),
    /// Left over after delete patterns matched no keep pattern while
    /// other survivors did.
    NoKeepMatch,
    /// Only member left once delete patterns were applied.
    LastCopy,
    /// Removed by the age fallback.
    NotPreferredByAge(AgePreference),
    /// Survivor chosen by the age fallback.
    PreferredByAge(AgePreference),
    /// No pattern matched and no age preference is configured.
    NoRuleMatched,
    /// Every member matched a delete pattern.
    AllMatchedDelete,
    /// Several members remain and none matched a keep pattern.
    NoKeepRule,
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MatchedDeletePattern(p) => write!(f, "matched delete pattern '{}'", p),
            Self::MatchedKeepPattern(p) => write!(f, "matched keep pattern '{}'", p),
            Self::NoKeepMatch => write!(f, "did not match keep pattern"),
            Self::LastCopy => write!(f, "last remaining copy"),
            Self::NotPreferredByAge(AgePreference::KeepNewest) => {
                write!(f, "not the newest copy (keep newest)")
            }
            Self::NotPreferredByAge(_) => write!(f, "not the oldest copy (keep oldest)"),
            Self::PreferredByAge(AgePreference::KeepNewest) => {
                write!(f, "newest copy (keep newest)")
            }
            Self::PreferredByAge(_) => write!(f, "oldest copy (keep oldest)"),
            Self::NoRuleMatched => write!(f, "no pattern matched and no age preference set"),
            Self::AllMatchedDelete => write!(f, "all members matched delete rules"),
            Self::NoKeepRule => write!(f, "remaining files matched no keep rule"),
        }
    }
}

/// The decision for one member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    /// Member path
    pub path: PathBuf,
    /// Chosen action
    pub action: Action,
    /// Human-readable justification
    pub reason: Reason,
}

/// Overall result for a set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Every member is either deleted or kept.
    Resolved,
    /// No pattern matched and no age preference: nothing done.
    NoSignal,
    /// Every member matched a delete pattern: nothing done.
    AllMatchedDelete,
    /// Delete patterns applied, but the survivors matched no keep rule.
    RemainderUndecided,
}

impl Outcome {
    /// Whether some member was left undecided.
    #[must_use]
    pub fn is_undecided(self) -> bool {
        self != Self::Resolved
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Resolved => write!(f, "resolved"),
            Self::NoSignal => write!(f, "not matching any rule, nothing to decide on"),
            Self::AllMatchedDelete => write!(f, "all members matched delete rules"),
            Self::RemainderUndecided => write!(f, "remaining files matched no keep rule"),
        }
    }
}

/// The partition of one duplicate set into delete, keep and undecided.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    digest: Digest,
    size: u64,
    decisions: Vec<Decision>,
    outcome: Outcome,
}

impl Verdict {
    /// Digest of the set this verdict covers.
    #[must_use]
    pub fn digest(&self) -> &Digest {
        &self.digest
    }

    /// Byte size of each member at scan time.
    #[must_use]
    pub fn size(&self) -> u64 {
        self.size
    }

    /// One decision per member, in set order.
    #[must_use]
    pub fn decisions(&self) -> &[Decision] {
        &self.decisions
    }

    /// Overall outcome.
    #[must_use]
    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    /// Whether any member was left undecided.
    #[must_use]
    pub fn is_undecided(&self) -> bool {
        self.outcome.is_undecided()
    }

    /// Decisions with the given action.
    pub fn with_action(&self, action: Action) -> impl Iterator<Item = &Decision> {
        self.decisions.iter().filter(move |d| d.action == action)
    }

    /// Paths marked for deletion.
    #[must_use]
    pub fn delete_paths(&self) -> Vec<&Path> {
        self.with_action(Action::Delete)
            .map(|d| d.path.as_path())
            .collect()
    }

    /// Paths that survive.
    #[must_use]
    pub fn keep_paths(&self) -> Vec<&Path> {
        self.with_action(Action::Keep)
            .map(|d| d.path.as_path())
            .collect()
    }

    /// Paths no rule decided.
    #[must_use]
    pub fn undecided_paths(&self) -> Vec<&Path> {
        self.with_action(Action::Undecided)
            .map(|d| d.path.as_path())
            .collect()
    }
}

/// Decide the fate of every member of `set`.
#[must_use]
pub fn resolve(set: &DuplicateSet, rules: &RuleConfig) -> Verdict {
    let members = set.members();
    let paths: Vec<String> = members
        .iter()
        .map(|m| m.path.to_string_lossy().into_owned())
        .collect();

    let delete_hits: Vec<Option<&str>> = paths
        .iter()
        .map(|p| rules.delete_patterns().first_match(p).map(|re| re.as_str()))
        .collect();
    let keep_hits: Vec<Option<&str>> = paths
        .iter()
        .map(|p| rules.keep_patterns().first_match(p).map(|re| re.as_str()))
        .collect();

    let verdict = |decisions: Vec<(Action, Reason)>, outcome: Outcome| Verdict {
        digest: *set.digest(),
        size: set.size(),
        decisions: members
            .iter()
            .zip(decisions)
            .map(|(m, (action, reason))| Decision {
                path: m.path.clone(),
                action,
                reason,
            })
            .collect(),
        outcome,
    };

    let any_delete = delete_hits.iter().any(Option::is_some);
    let any_keep = keep_hits.iter().any(Option::is_some);

    if !any_delete && !any_keep {
        let age = rules.age_preference();
        let survivor = match age {
            AgePreference::None => {
                let decisions = members
                    .iter()
                    .map(|_| (Action::Undecided, Reason::NoRuleMatched))
                    .collect();
                return verdict(decisions, Outcome::NoSignal);
            }
            AgePreference::KeepOldest => members
                .iter()
                .enumerate()
                .min_by_key(|(i, m)| (m.created, *i))
                .map_or(0, |(i, _)| i),
            AgePreference::KeepNewest => members
                .iter()
                .enumerate()
                .max_by_key(|(i, m)| (m.created, Reverse(*i)))
                .map_or(0, |(i, _)| i),
        };
        let decisions = (0..members.len())
            .map(|i| {
                if i == survivor {
                    (Action::Keep, Reason::PreferredByAge(age))
                } else {
                    (Action::Delete, Reason::NotPreferredByAge(age))
                }
            })
            .collect();
        return verdict(decisions, Outcome::Resolved);
    }

    if delete_hits.iter().all(Option::is_some) {
        let decisions = members
            .iter()
            .map(|_| (Action::Undecided, Reason::AllMatchedDelete))
            .collect();
        return verdict(decisions, Outcome::AllMatchedDelete);
    }

    let remaining: Vec<usize> = (0..members.len())
        .filter(|&i| delete_hits[i].is_none())
        .collect();
    let remaining_keep = remaining.iter().any(|&i| keep_hits[i].is_some());

    let outcome = if remaining.len() > 1 && !remaining_keep {
        Outcome::RemainderUndecided
    } else {
        Outcome::Resolved
    };

    let decisions = (0..members.len())
        .map(|i| {
            if let Some(pattern) = delete_hits[i] {
                return (Action::Delete, Reason::MatchedDeletePattern(pattern.to_string()));
            }
            if remaining.len() == 1 {
                return match keep_hits[i] {
                    Some(pattern) => (Action::Keep, Reason::MatchedKeepPattern(pattern.to_string())),
                    None => (Action::Keep, Reason::LastCopy),
                };
            }
            match (outcome, keep_hits[i]) {
                (Outcome::RemainderUndecided, _) => (Action::Undecided, Reason::NoKeepRule),
                (_, Some(pattern)) => {
                    (Action::Keep, Reason::MatchedKeepPattern(pattern.to_string()))
                }
                (_, None) => (Action::Delete, Reason::NoKeepMatch),
            }
        })
        .collect();

    verdict(decisions, outcome)
}

/// Resolve every set, in order.
#[must_use]
pub fn resolve_all(sets: &[DuplicateSet], rules: &RuleConfig) -> Vec<Verdict> {
    sets.iter().map(|set| resolve(set, rules)).collect()
}
