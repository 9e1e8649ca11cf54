pub mod toml_config;

pub use toml_config::{EventAction, EventConfig, FacilityConfig};

#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use crate::utils::validation::{validate_path, Validate};
#[cfg(feature = "cli")]
use clap::Parser;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "small-parking")]
#[command(about = "Replay parking sessions against a configured facility")]
pub struct CliConfig {
    /// Path to the facility TOML file
    #[arg(short, long, default_value = "facility.toml")]
    pub config: String,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Print the session report as JSON")]
    pub json: bool,

    #[arg(long, help = "Log as JSON lines instead of compact text")]
    pub json_logs: bool,

    #[arg(long, help = "Show the inventory without replaying events")]
    pub dry_run: bool,
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_path("config", &self.config)
    }
}
