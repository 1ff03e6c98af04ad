//! `jobscout portals` and `jobscout init`

use colored::Colorize;
use jobscout::config::Config;
use jobscout::error::Result;
use jobscout::portals::PortalKB;

use super::build_detector;

/// List the job boards with dedicated matchers
pub fn cmd_portals(json: bool) -> Result<()> {
    let config = Config::load()?;
    let detector = build_detector(&config);
    let portals = detector.supported_portals();

    if json {
        println!("{}", serde_json::to_string_pretty(&portals)?);
    } else {
        println!("Works on {} + more", portals.join(", ").bold());
    }
    Ok(())
}

/// Write default config files so they can be customized
pub fn cmd_init() -> Result<()> {
    let kb_path = PortalKB::ensure_user_kb()?;

    let config_path = Config::config_path()?;
    if !config_path.exists() {
        Config::default().save()?;
    }

    println!("{} Config:  {}", "✓".green(), config_path.display());
    println!("{} Portals: {}", "✓".green(), kb_path.display());
    Ok(())
}
