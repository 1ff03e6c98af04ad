//! Field extraction helpers shared by every portal matcher
//!
//! The portal knowledge base describes *where* to look; this module holds the
//! one waterfall routine that walks those selector lists, plus the per-field
//! plausibility rules and the URL-based company fallback.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::Result;
use crate::page::{normalize_whitespace, Page};

/// Workday-style shard prefixes (`wd1`, `wd5`, ...) are infrastructure, not names
static SHARD_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^wd\d+$").expect("Invalid shard regex pattern")
});

const CURRENCY_SYMBOLS: &[char] = &['$', '€', '£', '¥', '₹'];

const SALARY_UNITS: &[&str] = &["hour", "year"];

const JOB_TYPES: &[&str] = &["full-time", "full time", "part-time", "part time", "contract", "temporary", "internship"];

/// Plausibility rule a candidate must pass before it is accepted for a field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRule {
    /// Any non-empty text
    Any,
    /// Must not look like pay (salary blocks often sit next to location)
    Location,
    /// Must look like pay
    Salary,
    /// Must name an employment type
    JobType,
}

impl FieldRule {
    pub fn accepts(&self, text: &str) -> bool {
        match self {
            FieldRule::Any => true,
            FieldRule::Location => !looks_like_salary(text),
            FieldRule::Salary => looks_like_salary(text),
            FieldRule::JobType => {
                let lower = text.to_lowercase();
                JOB_TYPES.iter().any(|t| lower.contains(t))
            }
        }
    }
}

/// Currency symbol or a pay period ("hour"/"year") anywhere in the text
pub fn looks_like_salary(text: &str) -> bool {
    if text.contains(CURRENCY_SYMBOLS) {
        return true;
    }
    let lower = text.to_lowercase();
    SALARY_UNITS.iter().any(|unit| lower.contains(unit))
}

/// One waterfall entry: a CSS selector, optionally reading an attribute
///
/// Written as `css` or `css@attr` (e.g. `meta[property='og:site_name']@content`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorSource {
    pub css: String,
    pub attr: Option<String>,
}

impl SelectorSource {
    pub fn parse(entry: &str) -> Self {
        if let Some((css, attr)) = entry.rsplit_once('@') {
            let attr = attr.trim();
            let is_attr_name = !attr.is_empty()
                && attr.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
            if is_attr_name && !css.trim().is_empty() {
                return Self {
                    css: css.trim().to_string(),
                    attr: Some(attr.to_string()),
                };
            }
        }
        Self {
            css: entry.trim().to_string(),
            attr: None,
        }
    }

    fn candidates(&self, page: &Page) -> Result<Vec<String>> {
        match &self.attr {
            Some(attr) => page.attrs(&self.css, attr),
            None => page.texts(&self.css),
        }
    }
}

/// Cut a candidate at the first inline-list separator and tidy it up
///
/// A candidate made only of separators (LinkedIn's ` · ` spans) comes back empty.
pub fn clean_candidate(text: &str, separators: &[String]) -> String {
    let mut text = text;
    for sep in separators.iter().filter(|s| !s.is_empty()) {
        text = text
            .split(sep.as_str())
            .map(str::trim)
            .find(|piece| !piece.is_empty())
            .unwrap_or("");
    }
    normalize_whitespace(text)
}

/// Walk an ordered selector list and return the first acceptable candidate.
///
/// Selectors are tried most-specific first; within one selector, matches are
/// tried in document order. The whole element text must pass `rule` before
/// separator cleaning, so pay sitting behind a bullet still disqualifies a
/// location. The cleaned candidate must be non-empty and pass `rule` too.
/// `None` means the field is unknown.
pub fn waterfall(
    page: &Page,
    selectors: &[SelectorSource],
    rule: FieldRule,
    separators: &[String],
) -> Result<Option<String>> {
    for source in selectors {
        for raw in source.candidates(page)? {
            if !rule.accepts(&normalize_whitespace(&raw)) {
                continue;
            }
            let candidate = clean_candidate(&raw, separators);
            if !candidate.is_empty() && rule.accepts(&candidate) {
                return Ok(Some(candidate));
            }
        }
    }
    Ok(None)
}

/// Where in a URL a portal keeps the employer's slug
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompanySource {
    /// First path segment: `boards.greenhouse.io/acme-corp/jobs/1`
    Path,
    /// Leftmost subdomain: `acme.wd5.myworkdayjobs.com`
    Subdomain,
}

/// Infer a company name from the URL when the page does not show one.
///
/// Infrastructure tokens (`excluded`, plus `wdN` shard prefixes) never count
/// as a company. Malformed URLs yield `None`.
pub fn company_from_url(url: &str, source: CompanySource, excluded: &[String]) -> Option<String> {
    let parsed = Url::parse(url).ok()?;

    let is_excluded = |token: &str| {
        let lower = token.to_lowercase();
        SHARD_RE.is_match(&lower) || excluded.iter().any(|e| e.eq_ignore_ascii_case(&lower))
    };

    let slug = match source {
        CompanySource::Path => {
            let first = parsed.path_segments()?.find(|s| !s.is_empty())?;
            if is_excluded(first) {
                return None;
            }
            first.to_string()
        }
        CompanySource::Subdomain => {
            let host = parsed.host_str()?;
            let labels: Vec<&str> = host.split('.').collect();
            if labels.len() <= 2 {
                return None;
            }
            labels[..labels.len() - 2]
                .iter()
                .find(|label| !is_excluded(**label))?
                .to_string()
        }
    };

    if !slug.chars().any(|c| c.is_alphabetic()) {
        return None;
    }

    let name = unslugify(&slug);
    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}

/// `acme-corp` -> `Acme Corp`
pub fn unslugify(slug: &str) -> String {
    slug.split('-')
        .filter(|token| !token.is_empty())
        .map(title_case)
        .collect::<Vec<_>>()
        .join(" ")
}

fn title_case(token: &str) -> String {
    let mut chars = token.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}
