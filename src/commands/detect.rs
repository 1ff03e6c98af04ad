//! `jobscout detect` - run one detection pass over a page

use std::fs::OpenOptions;
use std::io::{self, Read};
use std::path::PathBuf;

use colored::Colorize;
use jobscout::badge::{self, BadgeState, ConfidenceLevel, JobSink, JsonLinesSink};
use jobscout::config::Config;
use jobscout::detector::{DetectionResult, Detector, TracingLogger};
use jobscout::error::Result;
use jobscout::fetch;
use jobscout::generic::GenericMatcher;
use jobscout::job::JobData;
use jobscout::page::Page;
use jobscout::portals::PortalKB;

use crate::utils;

/// Registry with the user's portal KB, excluded hosts and tracing output
pub fn build_detector(config: &Config) -> Detector {
    let generic = GenericMatcher::new().with_excluded_hosts(config.extra_excluded_hosts.clone());
    Detector::with_kb(&PortalKB::load_default(), generic).with_logger(TracingLogger)
}

pub fn cmd_detect(url: &str, html: Option<PathBuf>, json: bool, save: Option<PathBuf>) -> Result<()> {
    let config = Config::load()?;
    let (page_url, html) = load_page(url, html)?;

    let page = Page::parse(&html);
    let detector = build_detector(&config);
    let result = detector.detect(&page_url, &page);

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_result(result.as_ref(), config.high_confidence_threshold);
    }

    if let (Some(path), Some(result)) = (save, result.as_ref()) {
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let mut sink = JsonLinesSink::new(file);
        sink.accept(badge::capture(result))?;
        if !json {
            println!("\n  Saved to {}", path.display());
        }
    }

    Ok(())
}

/// HTML from `--html`, piped stdin, or an HTTP fetch, in that order
fn load_page(url: &str, html: Option<PathBuf>) -> Result<(String, String)> {
    if let Some(path) = html {
        return Ok((url.to_string(), std::fs::read_to_string(path)?));
    }

    if !atty::is(atty::Stream::Stdin) {
        let mut input = String::new();
        io::stdin().read_to_string(&mut input)?;
        if !input.trim().is_empty() {
            return Ok((url.to_string(), input));
        }
    }

    let fetched = fetch::fetch_html(url)?;
    Ok((fetched.url, fetched.html))
}

fn print_result(result: Option<&DetectionResult>, high_threshold: f64) {
    let state = BadgeState::from_result(result, high_threshold);

    match (&state, result) {
        (BadgeState::Detected { portal, confidence, level, has_data }, Some(result)) => {
            let level_str = match level {
                ConfidenceLevel::High => "high".green(),
                ConfidenceLevel::Low => "low".yellow(),
            };
            println!(
                "{} Job posting detected on {} (confidence {:.0}%, {})",
                "✓".green(),
                portal.bold(),
                confidence * 100.0,
                level_str
            );

            if !has_data {
                println!("  No details could be extracted; fill them in manually.");
                return;
            }
            if let Some(data) = &result.basic_data {
                print_job(data);
            }
        }
        _ => {
            println!("{} Not a recognized job posting", "✗".dimmed());
        }
    }
}

fn print_job(data: &JobData) {
    let rows = [
        ("Title", &data.job_title),
        ("Company", &data.company),
        ("Location", &data.location),
        ("Salary", &data.salary),
        ("Type", &data.job_type),
        ("Remote", &data.remote_type),
        ("Deadline", &data.application_deadline),
    ];
    for (label, value) in rows {
        if let Some(value) = value {
            println!("  {:<10} {}", format!("{}:", label).dimmed(), value);
        }
    }

    let lists = [
        ("Requirements", &data.requirements),
        ("Responsibilities", &data.responsibilities),
        ("Benefits", &data.benefits),
    ];
    for (label, items) in lists {
        if !items.is_empty() {
            println!("  {} {} item(s)", format!("{}:", label).dimmed(), items.len());
        }
    }

    if let Some(description) = &data.description {
        println!("\n  {}", utils::truncate_str(description, 200).dimmed());
    }
}
