//! Generic heuristic matcher - the fallback for unknown job boards
//!
//! Scores a page by job-related keywords in its URL and job-description
//! phrasing in its content. Both scores must clear their thresholds; a
//! job-sounding URL on a non-job page (or the reverse) does not pass.

use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

use crate::detector::PortalMatcher;
use crate::error::Result;
use crate::extract::{self, FieldRule, SelectorSource};
use crate::job::{ExtractedField, JobData};
use crate::page::Page;

/// Name reported for fallback detections
pub const GENERIC_PORTAL: &str = "Generic";

static MATCH_ALL: Lazy<Regex> = Lazy::new(|| Regex::new(".*").expect("Invalid match-all regex"));

/// Large general-purpose sites that keyword matching would misfire on
pub const EXCLUDED_HOSTS: &[&str] = &[
    "google.com",
    "bing.com",
    "duckduckgo.com",
    "yahoo.com",
    "facebook.com",
    "twitter.com",
    "x.com",
    "instagram.com",
    "reddit.com",
    "amazon.com",
    "youtube.com",
];

const URL_KEYWORDS: &[&str] = &[
    "job",
    "career",
    "careers",
    "position",
    "opening",
    "opportunity",
    "hiring",
    "apply",
    "application",
    "vacancy",
    "recruit",
];
const URL_KEYWORD_WEIGHT: f64 = 0.2;

const ROLE_KEYWORDS: &[&str] = &["position", "role", "engineer", "manager", "designer", "developer"];
const ROLE_HEADING_WEIGHT: f64 = 0.3;

const JOB_PHRASES: &[&str] = &[
    "responsibilities",
    "qualifications",
    "requirements",
    "experience required",
    "full-time",
    "part-time",
    "apply now",
    "submit application",
    "salary range",
];
const PHRASE_COVERAGE_WEIGHT: f64 = 0.5;

const APPLY_WEIGHT: f64 = 0.2;

pub const URL_SCORE_THRESHOLD: f64 = 0.3;
pub const CONTENT_SCORE_THRESHOLD: f64 = 0.5;

/// Per-source trust for generic extraction
const TITLE_H1_CONFIDENCE: f64 = 0.6;
const TITLE_H2_CONFIDENCE: f64 = 0.4;
const COMPANY_META_CONFIDENCE: f64 = 0.8;
const COMPANY_HINT_CONFIDENCE: f64 = 0.5;
const LOCATION_HINT_CONFIDENCE: f64 = 0.5;

/// Fields found by the generic extractor, each with its own confidence
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenericFields {
    pub job_title: Option<ExtractedField<String>>,
    pub company: Option<ExtractedField<String>>,
    pub location: Option<ExtractedField<String>>,
}

/// Keyword-scoring fallback matcher
#[derive(Debug, Clone, Default)]
pub struct GenericMatcher {
    extra_excluded_hosts: Vec<String>,
}

impl GenericMatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add hosts (beyond the built-in list) that never count as job pages
    pub fn with_excluded_hosts(mut self, hosts: impl IntoIterator<Item = String>) -> Self {
        self.extra_excluded_hosts
            .extend(hosts.into_iter().map(|h| h.trim().to_lowercase()).filter(|h| !h.is_empty()));
        self
    }

    /// Whether the URL's host is on the exclusion list.
    ///
    /// An unparseable URL is not excluded; scoring proceeds on the raw string.
    pub fn is_excluded_host(&self, url: &str) -> bool {
        let host = match Url::parse(url) {
            Ok(parsed) => match parsed.host_str() {
                Some(h) => h.to_lowercase(),
                None => return false,
            },
            Err(_) => return false,
        };

        EXCLUDED_HOSTS
            .iter()
            .copied()
            .chain(self.extra_excluded_hosts.iter().map(String::as_str))
            .any(|domain| host == domain || host.ends_with(&format!(".{}", domain)))
    }

    /// 0.2 per job keyword found in the lowercased URL, capped at 1.0
    pub fn url_score(url: &str) -> f64 {
        let lower = url.to_lowercase();
        let hits = URL_KEYWORDS.iter().filter(|k| lower.contains(*k)).count();
        (hits as f64 * URL_KEYWORD_WEIGHT).clamp(0.0, 1.0)
    }

    /// Role-like heading, job-description phrase coverage, and an apply control
    pub fn content_score(page: &Page) -> Result<f64> {
        let mut score = 0.0;

        let has_role_heading = page.texts("h1, h2, h3")?.iter().any(|heading| {
            let lower = heading.to_lowercase();
            ROLE_KEYWORDS.iter().any(|k| lower.contains(k))
        });
        if has_role_heading {
            score += ROLE_HEADING_WEIGHT;
        }

        let text = page.visible_text().to_lowercase();
        let found = JOB_PHRASES.iter().filter(|p| text.contains(*p)).count();
        score += (found as f64 / JOB_PHRASES.len() as f64) * PHRASE_COVERAGE_WEIGHT;

        if has_apply_control(page)? {
            score += APPLY_WEIGHT;
        }

        Ok(score.clamp(0.0, 1.0))
    }

    /// Best-effort fields with per-field confidence
    pub fn extract_scored(&self, page: &Page) -> Result<GenericFields> {
        let job_title = match first_text(page, "h1", FieldRule::Any)? {
            Some(title) => Some(ExtractedField::new(title, TITLE_H1_CONFIDENCE)),
            None => first_text(page, "h2[class*='title'], h2[class*='job']", FieldRule::Any)?
                .map(|title| ExtractedField::new(title, TITLE_H2_CONFIDENCE)),
        };

        let company = match first_text(page, "meta[property='og:site_name']@content", FieldRule::Any)? {
            Some(name) => Some(ExtractedField::new(name, COMPANY_META_CONFIDENCE)),
            None => first_text(page, "[class*='company']", FieldRule::Any)?
                .map(|name| ExtractedField::new(name, COMPANY_HINT_CONFIDENCE)),
        };

        let location = first_text(page, "[class*='location']", FieldRule::Location)?
            .map(|loc| ExtractedField::new(loc, LOCATION_HINT_CONFIDENCE));

        Ok(GenericFields {
            job_title,
            company,
            location,
        })
    }
}

impl PortalMatcher for GenericMatcher {
    fn name(&self) -> &str {
        GENERIC_PORTAL
    }

    fn url_pattern(&self) -> &Regex {
        &MATCH_ALL
    }

    fn is_job_page(&self, url: &str, page: &Page) -> Result<bool> {
        if self.is_excluded_host(url) {
            return Ok(false);
        }

        let url_score = Self::url_score(url);
        if url_score <= URL_SCORE_THRESHOLD {
            return Ok(false);
        }

        Ok(Self::content_score(page)? > CONTENT_SCORE_THRESHOLD)
    }

    fn extract_fields(&self, url: &str, page: &Page) -> Result<Option<JobData>> {
        let fields = self.extract_scored(page)?;
        Ok(Some(JobData {
            job_title: fields.job_title.map(|f| f.value),
            company: fields.company.map(|f| f.value),
            location: fields.location.map(|f| f.value),
            job_url: Some(url.to_string()),
            ..Default::default()
        }))
    }
}

/// Single-selector lookup: only the first matched element is considered
fn first_text(page: &Page, entry: &str, rule: FieldRule) -> Result<Option<String>> {
    let source = SelectorSource::parse(entry);
    let first = match &source.attr {
        Some(attr) => page.attrs(&source.css, attr)?.into_iter().next(),
        None => page.texts(&source.css)?.into_iter().next(),
    };

    Ok(first
        .map(|text| extract::clean_candidate(&text, &[]))
        .filter(|text| !text.is_empty() && rule.accepts(text)))
}

fn has_apply_control(page: &Page) -> Result<bool> {
    for text in page.texts("button, a, [role='button']")? {
        if text.to_lowercase().contains("apply") {
            return Ok(true);
        }
    }

    for value in page.attrs("input[type='submit'], input[type='button']", "value")? {
        if value.to_lowercase().contains("apply") {
            return Ok(true);
        }
    }

    page.exists("[class*='apply'], [id*='apply']")
}

#[cfg(test)]
mod tests {
    use super::*;

    const JOB_CONTENT: &str = r#"
        <html><body>
            <h1>Senior Software Engineer</h1>
            <div class="company-name">Acme</div>
            <div class="job-location">Austin, TX</div>
            <h2>Responsibilities</h2>
            <h2>Qualifications</h2>
            <p>Requirements: 5+ years. Full-time. Salary range available on request.</p>
            <button>Apply now</button>
        </body></html>
    "#;

    #[test]
    fn test_url_score() {
        assert_eq!(GenericMatcher::url_score("https://example.com/about"), 0.0);
        // "careers" also contains "career"
        assert!((GenericMatcher::url_score("https://example.com/careers") - 0.4).abs() < 1e-9);
        assert_eq!(
            GenericMatcher::url_score("https://jobs.example.com/careers/job-opening/apply?position=1&hiring=1&recruit=1"),
            1.0
        );
    }

    #[test]
    fn test_content_score_of_rich_page() {
        let page = Page::parse(JOB_CONTENT);
        let score = GenericMatcher::content_score(&page).unwrap();
        assert!(score > CONTENT_SCORE_THRESHOLD, "score was {}", score);
    }

    #[test]
    fn test_content_score_of_plain_page() {
        let page = Page::parse("<html><body><h1>Our blog</h1><p>Hello there.</p></body></html>");
        assert_eq!(GenericMatcher::content_score(&page).unwrap(), 0.0);
    }

    #[test]
    fn test_excluded_hosts() {
        let matcher = GenericMatcher::new().with_excluded_hosts(vec!["Example.org".to_string()]);
        assert!(matcher.is_excluded_host("https://www.google.com/search?q=jobs"));
        assert!(matcher.is_excluded_host("https://x.com/careers"));
        assert!(matcher.is_excluded_host("https://jobs.example.org/careers"));
        assert!(!matcher.is_excluded_host("https://netflix.com/jobs"));
        assert!(!matcher.is_excluded_host("not a url"));
    }

    #[test]
    fn test_malformed_url_still_scored() {
        let page = Page::parse(JOB_CONTENT);
        let matcher = GenericMatcher::new();
        assert!(matcher.is_job_page("careers job opening", &page).unwrap());
    }

    #[test]
    fn test_extract_scored_prefers_meta_company() {
        let page = Page::parse(
            r#"<html><head><meta property="og:site_name" content="Globex"></head>
            <body><h2 class="job-title">Designer</h2><span class="company">Other</span></body></html>"#,
        );
        let fields = GenericMatcher::new().extract_scored(&page).unwrap();

        let title = fields.job_title.unwrap();
        assert_eq!(title.value, "Designer");
        assert_eq!(title.confidence, TITLE_H2_CONFIDENCE);

        let company = fields.company.unwrap();
        assert_eq!(company.value, "Globex");
        assert_eq!(company.confidence, COMPANY_META_CONFIDENCE);
        assert!(fields.location.is_none());
    }

    #[test]
    fn test_location_rejects_salary_text() {
        let page = Page::parse(
            r#"<html><body><h1>Engineer</h1><div class="location">$120,000 - $150,000</div></body></html>"#,
        );
        let job = GenericMatcher::new()
            .extract_fields("https://example.com/careers/1", &page)
            .unwrap()
            .unwrap();
        assert!(job.location.is_none());
        assert_eq!(job.job_title.as_deref(), Some("Engineer"));
    }
}
