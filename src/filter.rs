// midodebug - troubleshooting CLI for MidoNet virtual topologies
// Copyright (C) 2024 Mathias Uhl <mathiasuhl@gmx.de>
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Attribute-based selection over fetched resources.
//!
//! A [`Criteria`] maps attribute names to patterns. [`filter`] keeps the
//! resources whose attributes satisfy every pattern under a
//! [`MatchPredicate`]. The input slice is only borrowed; the result is a
//! list of references into it, in input order.

use crate::resource::{Resource, value_to_str};
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use thiserror::Error;
use tracing::{debug, error};

#[derive(Debug, Error)]
pub enum PredicateError {
    #[error("invalid regular expression: {0}")]
    Regex(#[from] regex::Error),
}

#[derive(Debug, Error)]
pub enum FilterError {
    #[error("criterion `{0}` must look like KEY=PATTERN")]
    InvalidCriterion(String),
    #[error("error while evaluating {predicate}(\"{pattern}\", \"{value}\") on attribute `{attribute}`")]
    Predicate {
        predicate: String,
        attribute: String,
        pattern: String,
        value: String,
        #[source]
        source: PredicateError,
    },
}

/// Compares an expected pattern against the string form of an attribute.
pub trait MatchPredicate {
    fn name(&self) -> &str;

    fn matches(&self, pattern: &str, actual: &str) -> Result<bool, PredicateError>;
}

impl<F> MatchPredicate for F
where
    F: Fn(&str, &str) -> Result<bool, PredicateError>,
{
    fn name(&self) -> &str {
        "custom"
    }

    fn matches(&self, pattern: &str, actual: &str) -> Result<bool, PredicateError> {
        self(pattern, actual)
    }
}

/// Unanchored regex search: the pattern may match anywhere in the value.
#[derive(Debug, Clone, Copy, Default)]
pub struct RegexSearch;

impl MatchPredicate for RegexSearch {
    fn name(&self) -> &str {
        "regex-search"
    }

    fn matches(&self, pattern: &str, actual: &str) -> Result<bool, PredicateError> {
        Ok(compiled(pattern)?.is_match(actual))
    }
}

lazy_static! {
    static ref COMPILED: Mutex<HashMap<String, Regex>> = Mutex::new(HashMap::new());
}

/// Compiles each distinct pattern once; invalid patterns are not cached.
fn compiled(pattern: &str) -> Result<Regex, regex::Error> {
    let mut cache = COMPILED.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(regex) = cache.get(pattern) {
        return Ok(regex.clone());
    }
    let regex = Regex::new(pattern)?;
    cache.insert(pattern.to_string(), regex.clone());
    Ok(regex)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Substring;

impl MatchPredicate for Substring {
    fn name(&self) -> &str {
        "substring"
    }

    fn matches(&self, pattern: &str, actual: &str) -> Result<bool, PredicateError> {
        Ok(actual.contains(pattern))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Exact;

impl MatchPredicate for Exact {
    fn name(&self) -> &str {
        "exact"
    }

    fn matches(&self, pattern: &str, actual: &str) -> Result<bool, PredicateError> {
        Ok(pattern == actual)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchMode {
    #[default]
    Regex,
    Substring,
    Exact,
}

impl MatchMode {
    pub fn predicate(self) -> &'static dyn MatchPredicate {
        match self {
            MatchMode::Regex => &RegexSearch,
            MatchMode::Substring => &Substring,
            MatchMode::Exact => &Exact,
        }
    }
}

/// What to do with a resource that lacks an attribute named in the criteria.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingAttribute {
    #[default]
    Keep,
    Exclude,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Criteria {
    entries: Vec<(String, String)>,
}

impl Criteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, attribute: impl Into<String>, pattern: impl Into<String>) -> Self {
        self.insert(attribute, pattern);
        self
    }

    /// Sets the pattern for `attribute`, replacing an earlier one.
    pub fn insert(&mut self, attribute: impl Into<String>, pattern: impl Into<String>) {
        let attribute = attribute.into();
        let pattern = pattern.into();
        match self.entries.iter_mut().find(|(key, _)| *key == attribute) {
            Some(entry) => entry.1 = pattern,
            None => self.entries.push((attribute, pattern)),
        }
    }

    /// Builds criteria from `KEY=PATTERN` strings as given on the command line.
    pub fn parse_pairs<S: AsRef<str>>(pairs: &[S]) -> Result<Self, FilterError> {
        let mut criteria = Self::new();
        for pair in pairs {
            let pair = pair.as_ref();
            let (key, pattern) = pair
                .split_once('=')
                .ok_or_else(|| FilterError::InvalidCriterion(pair.to_string()))?;
            let key = key.trim();
            if key.is_empty() {
                return Err(FilterError::InvalidCriterion(pair.to_string()));
            }
            criteria.insert(key, pattern);
        }
        Ok(criteria)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Keeps every resource whose attributes satisfy all criteria. Resources
/// lacking a named attribute are kept.
pub fn filter<'a, R, P>(
    resources: &'a [R],
    criteria: &Criteria,
    predicate: &P,
) -> Result<Vec<&'a R>, FilterError>
where
    R: Resource,
    P: MatchPredicate + ?Sized,
{
    filter_with(resources, criteria, predicate, MissingAttribute::Keep)
}

pub fn filter_with<'a, R, P>(
    resources: &'a [R],
    criteria: &Criteria,
    predicate: &P,
    missing: MissingAttribute,
) -> Result<Vec<&'a R>, FilterError>
where
    R: Resource,
    P: MatchPredicate + ?Sized,
{
    let mut kept = Vec::with_capacity(resources.len());

    'resources: for resource in resources {
        for (attribute, pattern) in criteria.iter() {
            let Some(value) = resource.attribute(attribute) else {
                if missing == MissingAttribute::Exclude {
                    debug!(resource = %resource.label(), attribute, "attribute missing, excluding");
                    continue 'resources;
                }
                continue;
            };

            let actual = value_to_str(value);
            match predicate.matches(pattern, &actual) {
                Ok(true) => {}
                Ok(false) => continue 'resources,
                Err(source) => {
                    error!(
                        predicate = predicate.name(),
                        attribute,
                        pattern,
                        value = %actual,
                        error = %source,
                        "error while evaluating match predicate"
                    );
                    return Err(FilterError::Predicate {
                        predicate: predicate.name().to_string(),
                        attribute: attribute.to_string(),
                        pattern: pattern.to_string(),
                        value: actual,
                        source,
                    });
                }
            }
        }
        kept.push(resource);
    }

    Ok(kept)
}
