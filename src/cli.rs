use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "jobscout")]
#[command(author, version, about = "Detect job postings and extract their details", long_about = None)]
#[command(after_help = r#"Examples:
  jobscout detect https://boards.greenhouse.io/acme/jobs/123           Fetch and detect
  jobscout detect https://www.linkedin.com/jobs/view/1 --html page.html Use a saved page
  curl -s <url> | jobscout detect <url> --json                           Read HTML from stdin
  jobscout portals                                                        List supported boards
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Check whether a page is a job posting and show what was extracted
    Detect {
        /// URL of the page (used for matching even when HTML comes from a file)
        url: String,

        /// Read HTML from a saved file instead of fetching
        #[arg(long, value_name = "FILE")]
        html: Option<PathBuf>,

        /// Output the detection result as JSON
        #[arg(long)]
        json: bool,

        /// Append the captured job record to a JSON Lines file
        #[arg(long, value_name = "FILE")]
        save: Option<PathBuf>,
    },

    /// List the job boards with dedicated support
    Portals {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Write default config.toml and portals.toml to the config directory
    Init,
}
