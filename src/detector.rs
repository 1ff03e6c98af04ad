//! Detector - the registry/dispatcher that turns (url, page) into a detection
//!
//! Named portal matchers are tried in priority order, the generic fallback
//! last. The first matcher whose URL pattern and page check both pass wins;
//! nothing after it is consulted.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::confidence;
use crate::error::{JobScoutError, Result};
use crate::generic::GenericMatcher;
use crate::job::JobData;
use crate::page::Page;
use crate::portals::PortalKB;

/// One job-board recognizer
pub trait PortalMatcher {
    /// Stable name shown to users and used by confidence scoring
    fn name(&self) -> &str;

    /// Cheap first-pass URL filter, checked before any DOM query
    fn url_pattern(&self) -> &Regex;

    /// Authoritative check that this page is a rendered job posting
    fn is_job_page(&self, url: &str, page: &Page) -> Result<bool>;

    /// Pull structured fields from the page. `Ok(None)` means this matcher
    /// has no extractor; the match still counts.
    fn extract_fields(&self, _url: &str, _page: &Page) -> Result<Option<JobData>> {
        Ok(None)
    }
}

/// Outcome of a successful detection pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionResult {
    /// Name of the matcher that recognized the page
    pub portal: String,
    /// Always true; a pass with no match yields no result at all
    pub is_job_page: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub basic_data: Option<JobData>,
    /// 0.0 - 1.0
    pub confidence: f64,
}

impl DetectionResult {
    pub fn new(portal: &str, basic_data: Option<JobData>) -> Self {
        let confidence = confidence::score(portal, basic_data.as_ref());
        Self {
            portal: portal.to_string(),
            is_job_page: true,
            basic_data,
            confidence,
        }
    }
}

/// Receives dispatcher events. All hooks default to doing nothing.
pub trait DetectionLogger {
    fn matcher_failed(&self, _portal: &str, _error: &JobScoutError) {}
    fn matched(&self, _result: &DetectionResult) {}
    fn no_match(&self, _url: &str) {}
}

/// Discards every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopLogger;

impl DetectionLogger for NoopLogger {}

/// Forwards events to `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogger;

impl DetectionLogger for TracingLogger {
    fn matcher_failed(&self, portal: &str, error: &JobScoutError) {
        tracing::warn!(portal, "matcher failed, skipping: {error}");
    }

    fn matched(&self, result: &DetectionResult) {
        tracing::debug!(
            portal = %result.portal,
            confidence = result.confidence,
            "job page detected"
        );
    }

    fn no_match(&self, url: &str) {
        tracing::debug!(url, "no matcher recognized page");
    }
}

/// Ordered matcher registry
pub struct Detector {
    named: Vec<Box<dyn PortalMatcher>>,
    fallback: Option<Box<dyn PortalMatcher>>,
    logger: Box<dyn DetectionLogger>,
}

impl Default for Detector {
    fn default() -> Self {
        Self::with_kb(&PortalKB::embedded_defaults(), GenericMatcher::default())
    }
}

impl Detector {
    /// Empty registry: no named matchers, no fallback
    pub fn empty() -> Self {
        Self {
            named: Vec::new(),
            fallback: None,
            logger: Box::new(NoopLogger),
        }
    }

    /// Named matchers from `kb` in priority order, then `generic` as the fallback
    pub fn with_kb(kb: &PortalKB, generic: GenericMatcher) -> Self {
        let mut detector = Self::empty();
        for matcher in kb.matchers() {
            detector.named.push(Box::new(matcher));
        }
        detector.fallback = Some(Box::new(generic));
        detector
    }

    /// Append a named matcher. It runs after those already registered and
    /// always before the fallback.
    pub fn register(mut self, matcher: impl PortalMatcher + 'static) -> Self {
        self.named.push(Box::new(matcher));
        self
    }

    /// Replace (or clear) the fallback matcher
    pub fn fallback(mut self, matcher: Option<Box<dyn PortalMatcher>>) -> Self {
        self.fallback = matcher;
        self
    }

    pub fn with_logger(mut self, logger: impl DetectionLogger + 'static) -> Self {
        self.logger = Box::new(logger);
        self
    }

    /// Names of the named (non-fallback) matchers, in dispatch order
    pub fn supported_portals(&self) -> Vec<&str> {
        self.named.iter().map(|m| m.name()).collect()
    }

    /// Run one detection pass.
    ///
    /// Returns `None` when no matcher recognizes the page. A matcher that
    /// errors is logged and treated as not matching; it never produces a
    /// result.
    pub fn detect(&self, url: &str, page: &Page) -> Option<DetectionResult> {
        for matcher in self.named.iter().chain(self.fallback.iter()) {
            if !matcher.url_pattern().is_match(url) {
                continue;
            }

            match run_matcher(matcher.as_ref(), url, page) {
                Ok(Some(result)) => {
                    self.logger.matched(&result);
                    return Some(result);
                }
                Ok(None) => continue,
                Err(e) => {
                    self.logger.matcher_failed(matcher.name(), &e);
                    continue;
                }
            }
        }

        self.logger.no_match(url);
        None
    }
}

fn run_matcher(matcher: &dyn PortalMatcher, url: &str, page: &Page) -> Result<Option<DetectionResult>> {
    if !matcher.is_job_page(url, page)? {
        return Ok(None);
    }
    let data = matcher.extract_fields(url, page)?;
    Ok(Some(DetectionResult::new(matcher.name(), data)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    struct StubMatcher {
        name: &'static str,
        pattern: Regex,
        job_page: bool,
        fail: bool,
        checked: Rc<Cell<usize>>,
    }

    impl StubMatcher {
        fn new(name: &'static str, pattern: &str, job_page: bool) -> Self {
            Self {
                name,
                pattern: Regex::new(pattern).unwrap(),
                job_page,
                fail: false,
                checked: Rc::new(Cell::new(0)),
            }
        }
    }

    impl PortalMatcher for StubMatcher {
        fn name(&self) -> &str {
            self.name
        }

        fn url_pattern(&self) -> &Regex {
            &self.pattern
        }

        fn is_job_page(&self, _url: &str, _page: &Page) -> Result<bool> {
            self.checked.set(self.checked.get() + 1);
            if self.fail {
                return Err(JobScoutError::MatcherError {
                    portal: self.name.to_string(),
                    message: "unexpected layout".to_string(),
                });
            }
            Ok(self.job_page)
        }
    }

    #[derive(Clone, Default)]
    struct RecordingLogger {
        failures: Rc<RefCell<Vec<String>>>,
    }

    impl DetectionLogger for RecordingLogger {
        fn matcher_failed(&self, portal: &str, _error: &JobScoutError) {
            self.failures.borrow_mut().push(portal.to_string());
        }
    }

    fn blank_page() -> Page {
        Page::parse("<html><body></body></html>")
    }

    #[test]
    fn test_first_match_wins() {
        let detector = Detector::empty()
            .register(StubMatcher::new("First", "example", true))
            .register(StubMatcher::new("Second", "example", true));

        let result = detector.detect("https://example.com/jobs/1", &blank_page()).unwrap();
        assert_eq!(result.portal, "First");
        assert!(result.is_job_page);
        assert!(result.basic_data.is_none());
        assert!((result.confidence - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_url_pattern_short_circuits_page_check() {
        let skipped = StubMatcher::new("Skipped", "other-host", true);
        let checked = skipped.checked.clone();
        let detector = Detector::empty().register(skipped);

        assert!(detector.detect("https://example.com", &blank_page()).is_none());
        assert_eq!(checked.get(), 0);
    }

    #[test]
    fn test_failing_page_check_moves_on() {
        let detector = Detector::empty()
            .register(StubMatcher::new("NotAJob", "example", false))
            .register(StubMatcher::new("Job", "example", true));

        let result = detector.detect("https://example.com", &blank_page()).unwrap();
        assert_eq!(result.portal, "Job");
    }

    #[test]
    fn test_matcher_error_is_logged_and_skipped() {
        let mut broken = StubMatcher::new("Broken", "example", true);
        broken.fail = true;
        let logger = RecordingLogger::default();
        let failures = logger.failures.clone();

        let detector = Detector::empty()
            .register(broken)
            .with_logger(logger);

        assert!(detector.detect("https://example.com", &blank_page()).is_none());
        assert_eq!(*failures.borrow(), vec!["Broken".to_string()]);
    }

    #[test]
    fn test_fallback_runs_after_named_matchers() {
        let detector = Detector::empty()
            .fallback(Some(Box::new(StubMatcher::new("Fallback", ".*", true))))
            .register(StubMatcher::new("Named", "example", true));

        let result = detector.detect("https://example.com", &blank_page()).unwrap();
        assert_eq!(result.portal, "Named");
        assert_eq!(detector.supported_portals(), vec!["Named"]);
    }

    #[test]
    fn test_result_serializes_camel_case() {
        let result = DetectionResult::new("Lever", None);
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["portal"], "Lever");
        assert_eq!(json["isJobPage"], true);
        assert!(json.get("basicData").is_none());
    }
}
