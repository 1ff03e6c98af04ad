//! Portal knowledge base - data-driven matchers for named job boards
//!
//! Each Applicant Tracking System is described in TOML (see
//! `assets/portals.toml`): a URL pattern, the markers that prove a posting is
//! rendered, and ordered selector lists per field. One `Portal` type turns
//! any such description into a `PortalMatcher`, so adding a board means
//! adding data, not code.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use regex::Regex;
use serde::Deserialize;

use crate::config::Config;
use crate::detector::PortalMatcher;
use crate::error::{JobScoutError, Result};
use crate::extract::{self, CompanySource, FieldRule, SelectorSource};
use crate::generic::GENERIC_PORTAL;
use crate::job::JobData;
use crate::page::Page;

/// Built-in portal definitions
pub const DEFAULT_PORTALS: &str = include_str!("../assets/portals.toml");

const REQUIREMENT_HEADINGS: &[&str] = &["requirement", "qualification", "what you bring", "must have"];
const RESPONSIBILITY_HEADINGS: &[&str] = &["responsibilit", "what you'll do", "what you will do", "the role"];
const BENEFIT_HEADINGS: &[&str] = &["benefit", "perks", "what we offer"];

/// Ordered selector lists per job field
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FieldSelectors {
    #[serde(default)]
    pub job_title: Vec<String>,
    #[serde(default)]
    pub company: Vec<String>,
    #[serde(default)]
    pub location: Vec<String>,
    #[serde(default)]
    pub salary: Vec<String>,
    #[serde(default)]
    pub job_type: Vec<String>,
    #[serde(default)]
    pub remote_type: Vec<String>,
    #[serde(default)]
    pub description: Vec<String>,
    /// Kept apart from location; recorded as a description annotation
    #[serde(default)]
    pub department: Vec<String>,
    #[serde(default)]
    pub application_deadline: Vec<String>,
}

/// A portal definition as written in the knowledge base
#[derive(Debug, Clone, Deserialize)]
pub struct PortalDef {
    /// Display name; defaults to the table key
    #[serde(default)]
    pub name: Option<String>,
    /// Dispatch order, lowest first
    #[serde(default)]
    pub priority: i32,
    /// Regex the page URL must match before any DOM query
    pub url_pattern: String,
    /// URL substrings re-checked by the page test (any one suffices)
    #[serde(default)]
    pub host_markers: Vec<String>,
    /// CSS selectors proving a posting is rendered (any one suffices)
    #[serde(default)]
    pub page_markers: Vec<String>,
    /// Where to find the employer slug when the page shows no company
    #[serde(default)]
    pub company_from_url: Option<CompanySource>,
    /// URL tokens that are infrastructure, never a company
    #[serde(default)]
    pub url_excluded_tokens: Vec<String>,
    /// Inline-list separators to cut out of location candidates
    #[serde(default)]
    pub location_separators: Vec<String>,
    /// Leading noise removed from company text (e.g. "at ")
    #[serde(default)]
    pub company_prefixes: Vec<String>,
    #[serde(default)]
    pub fields: FieldSelectors,
}

/// Compiled selector lists
#[derive(Debug, Clone, Default)]
struct CompiledFields {
    job_title: Vec<SelectorSource>,
    company: Vec<SelectorSource>,
    location: Vec<SelectorSource>,
    salary: Vec<SelectorSource>,
    job_type: Vec<SelectorSource>,
    remote_type: Vec<SelectorSource>,
    description: Vec<SelectorSource>,
    department: Vec<SelectorSource>,
    application_deadline: Vec<SelectorSource>,
}

impl CompiledFields {
    fn from_def(fields: &FieldSelectors) -> Self {
        let compile = |list: &[String]| -> Vec<SelectorSource> {
            list.iter().map(|s| SelectorSource::parse(s)).collect()
        };
        Self {
            job_title: compile(&fields.job_title),
            company: compile(&fields.company),
            location: compile(&fields.location),
            salary: compile(&fields.salary),
            job_type: compile(&fields.job_type),
            remote_type: compile(&fields.remote_type),
            description: compile(&fields.description),
            department: compile(&fields.department),
            application_deadline: compile(&fields.application_deadline),
        }
    }
}

/// A named portal matcher built from a `PortalDef`
#[derive(Debug, Clone)]
pub struct Portal {
    id: String,
    name: String,
    priority: i32,
    pattern: Regex,
    def: PortalDef,
    fields: CompiledFields,
}

impl Portal {
    /// Validate and compile a definition
    pub fn from_def(id: &str, def: PortalDef) -> Result<Self> {
        let pattern = Regex::new(&def.url_pattern).map_err(|e| {
            JobScoutError::ConfigError(format!("Portal '{}' has an invalid url_pattern: {}", id, e))
        })?;

        if def.page_markers.is_empty() {
            return Err(JobScoutError::ConfigError(format!(
                "Portal '{}' needs at least one page marker",
                id
            )));
        }

        let name = def
            .name
            .clone()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| id.to_string());

        // The fallback's name carries its confidence discount
        if name.trim().eq_ignore_ascii_case(GENERIC_PORTAL) {
            return Err(JobScoutError::ConfigError(format!(
                "Portal '{}' may not be named '{}'; that name is reserved for the fallback matcher",
                id, GENERIC_PORTAL
            )));
        }

        Ok(Self {
            id: id.to_string(),
            name,
            priority: def.priority,
            pattern,
            fields: CompiledFields::from_def(&def.fields),
            def,
        })
    }

    /// Knowledge base key (e.g. "greenhouse")
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }

    fn field(&self, page: &Page, selectors: &[SelectorSource], rule: FieldRule) -> Result<Option<String>> {
        extract::waterfall(page, selectors, rule, &[])
    }

    fn company(&self, url: &str, page: &Page) -> Result<Option<String>> {
        let from_page = self
            .field(page, &self.fields.company, FieldRule::Any)?
            .map(|c| strip_prefixes(&c, &self.def.company_prefixes))
            .filter(|c| !c.is_empty());

        if from_page.is_some() {
            return Ok(from_page);
        }

        Ok(self
            .def
            .company_from_url
            .and_then(|source| extract::company_from_url(url, source, &self.def.url_excluded_tokens)))
    }

    fn description(&self, page: &Page) -> Result<Option<String>> {
        let department = self.field(page, &self.fields.department, FieldRule::Any)?;
        let body = self.field(page, &self.fields.description, FieldRule::Any)?;

        Ok(match (department, body) {
            (Some(dept), Some(body)) => Some(format!("Department: {}\n\n{}", dept, body)),
            (Some(dept), None) => Some(format!("Department: {}", dept)),
            (None, body) => body,
        })
    }
}

impl PortalMatcher for Portal {
    fn name(&self) -> &str {
        &self.name
    }

    fn url_pattern(&self) -> &Regex {
        &self.pattern
    }

    fn is_job_page(&self, url: &str, page: &Page) -> Result<bool> {
        let lower_url = url.to_lowercase();
        let on_portal = self.def.host_markers.is_empty()
            || self
                .def
                .host_markers
                .iter()
                .any(|m| lower_url.contains(&m.to_lowercase()));
        if !on_portal {
            return Ok(false);
        }

        for marker in &self.def.page_markers {
            if page.exists(marker)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn extract_fields(&self, url: &str, page: &Page) -> Result<Option<JobData>> {
        let job = JobData {
            job_title: self.field(page, &self.fields.job_title, FieldRule::Any)?,
            company: self.company(url, page)?,
            location: extract::waterfall(
                page,
                &self.fields.location,
                FieldRule::Location,
                &self.def.location_separators,
            )?,
            job_url: Some(url.to_string()),
            salary: self.field(page, &self.fields.salary, FieldRule::Salary)?,
            job_type: self.field(page, &self.fields.job_type, FieldRule::JobType)?,
            remote_type: self.field(page, &self.fields.remote_type, FieldRule::Any)?,
            description: self.description(page)?,
            requirements: page.section_items(REQUIREMENT_HEADINGS),
            responsibilities: page.section_items(RESPONSIBILITY_HEADINGS),
            benefits: page.section_items(BENEFIT_HEADINGS),
            application_deadline: self.field(page, &self.fields.application_deadline, FieldRule::Any)?,
        };
        Ok(Some(job))
    }
}

/// Remove the first matching prefix (case-insensitive) and trim
fn strip_prefixes(text: &str, prefixes: &[String]) -> String {
    let trimmed = text.trim();
    for prefix in prefixes.iter().filter(|p| !p.is_empty()) {
        if let Some(head) = trimmed.get(..prefix.len()) {
            if head.eq_ignore_ascii_case(prefix) {
                return trimmed[prefix.len()..].trim().to_string();
            }
        }
    }
    trimmed.to_string()
}

/// The portal knowledge base, in dispatch order
#[derive(Debug, Clone, Default)]
pub struct PortalKB {
    portals: Vec<Portal>,
}

impl PortalKB {
    /// Load KB from a TOML file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::parse_toml(&content)
    }

    /// Parse KB from a TOML string. Every top-level table is one portal.
    pub fn parse_toml(content: &str) -> Result<Self> {
        let defs: BTreeMap<String, PortalDef> = toml::from_str(content)?;

        let mut portals = defs
            .into_iter()
            .map(|(id, def)| Portal::from_def(&id, def))
            .collect::<Result<Vec<_>>>()?;
        portals.sort_by_key(|p| p.priority);

        Ok(Self { portals })
    }

    /// User KB from the config directory if present and valid, else the built-in one
    pub fn load_default() -> Self {
        if let Ok(path) = Self::user_kb_path() {
            if path.exists() {
                match Self::load_from_file(&path) {
                    Ok(kb) => return kb,
                    Err(e) => tracing::warn!(
                        path = %path.display(),
                        "ignoring user portals file: {e}"
                    ),
                }
            }
        }

        Self::embedded_defaults()
    }

    /// Built-in KB
    pub fn embedded_defaults() -> Self {
        Self::parse_toml(DEFAULT_PORTALS).unwrap_or_default()
    }

    /// Location of the user's KB override
    pub fn user_kb_path() -> Result<PathBuf> {
        Ok(Config::config_dir()?.join("portals.toml"))
    }

    /// Ensure user KB file exists (copy defaults if not)
    pub fn ensure_user_kb() -> Result<PathBuf> {
        let kb_path = Self::user_kb_path()?;

        if !kb_path.exists() {
            if let Some(parent) = kb_path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&kb_path, DEFAULT_PORTALS)?;
        }

        Ok(kb_path)
    }

    /// Get portal by KB key or display name (case-insensitive)
    pub fn get(&self, id_or_name: &str) -> Option<&Portal> {
        self.portals
            .iter()
            .find(|p| p.id.eq_ignore_ascii_case(id_or_name) || p.name.eq_ignore_ascii_case(id_or_name))
    }

    /// Display names in dispatch order
    pub fn names(&self) -> Vec<&str> {
        self.portals.iter().map(|p| p.name.as_str()).collect()
    }

    /// Owned matchers in dispatch order
    pub fn matchers(&self) -> Vec<Portal> {
        self.portals.clone()
    }

    pub fn len(&self) -> usize {
        self.portals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.portals.is_empty()
    }
}
