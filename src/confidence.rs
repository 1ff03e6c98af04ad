//! Confidence scoring for a detection
//!
//! Additive model: a base for "some matcher recognized this page", bonuses
//! for each key field extracted, then a trust discount when the winner was
//! the keyword-based fallback rather than a portal-specific DOM match.

use crate::generic::GENERIC_PORTAL;
use crate::job::JobData;

pub const BASE_SCORE: f64 = 0.5;
pub const TITLE_BONUS: f64 = 0.2;
pub const COMPANY_BONUS: f64 = 0.2;
pub const LOCATION_BONUS: f64 = 0.1;
/// Multiplier applied when the generic fallback produced the match
pub const GENERIC_DISCOUNT: f64 = 0.7;

/// Score a detection made by `matcher_name` with the given extracted data
pub fn score(matcher_name: &str, extracted: Option<&JobData>) -> f64 {
    let mut total = BASE_SCORE;

    if let Some(data) = extracted {
        if data.has_title() {
            total += TITLE_BONUS;
        }
        if data.has_company() {
            total += COMPANY_BONUS;
        }
        if data.has_location() {
            total += LOCATION_BONUS;
        }
    }

    if matcher_name == GENERIC_PORTAL {
        total *= GENERIC_DISCOUNT;
    }

    total.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    fn job(title: bool, company: bool, location: bool) -> JobData {
        JobData {
            job_title: title.then(|| "Backend Engineer".to_string()),
            company: company.then(|| "Acme".to_string()),
            location: location.then(|| "Remote".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_base_score_without_data() {
        assert!((score("Greenhouse", None) - 0.5).abs() < EPSILON);
        assert!((score("Greenhouse", Some(&JobData::default())) - 0.5).abs() < EPSILON);
    }

    #[test]
    fn test_more_fields_score_higher() {
        let none = score("Lever", Some(&job(false, false, false)));
        let title = score("Lever", Some(&job(true, false, false)));
        let all = score("Lever", Some(&job(true, true, true)));

        assert!(all > title);
        assert!(title > none);
        assert!((all - 1.0).abs() < EPSILON);
    }

    #[test]
    fn test_generic_discount() {
        let data = job(true, true, false);
        let named = score("Workday", Some(&data));
        let generic = score(GENERIC_PORTAL, Some(&data));

        assert!((generic - named * GENERIC_DISCOUNT).abs() < EPSILON);
        assert!((named - 0.9).abs() < EPSILON);
    }

    #[test]
    fn test_blank_fields_earn_nothing() {
        let data = JobData {
            job_title: Some(String::new()),
            company: Some("  ".to_string()),
            ..Default::default()
        };
        assert!((score("Indeed", Some(&data)) - 0.5).abs() < EPSILON);
    }
}
