use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use shadow_core::AssetId;

pub mod global;

pub use global::{GlobalFlags, OutputFormat};

/// Top-level CLI parser for the `shadowctl` binary.
#[derive(Debug, Parser)]
#[command(name = "shadowctl", version, about = "Shadow state sync for fleets of assets")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format: json, raw
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Serve shadows from a JSON file (asset id -> shadow document) instead of the store
    #[arg(long, global = true)]
    pub fixture: Option<PathBuf>,
}

impl Cli {
    /// Extract ergonomic global flags struct for command handlers.
    #[must_use]
    pub fn global_flags(&self) -> GlobalFlags {
        GlobalFlags {
            format: self.format,
            fixture: self.fixture.clone(),
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Fetch unified reported state for one or more assets
    Status(StatusArgs),
    /// Merge a reported-state patch into one asset's shadow
    Report(ReportArgs),
    /// Register an asset and attach a policy
    Provision(ProvisionArgs),
}

#[derive(Debug, Args)]
pub struct StatusArgs {
    /// Asset ids, returned in this order
    #[arg(required = true)]
    pub assets: Vec<AssetId>,

    /// Override `batch.concurrency`
    #[arg(short, long)]
    pub concurrency: Option<usize>,
}

#[derive(Debug, Args)]
pub struct ReportArgs {
    pub asset: AssetId,

    /// JSON object merged into `state.reported` (`null` deletes a field)
    #[arg(long)]
    pub patch: String,
}

#[derive(Debug, Args)]
pub struct ProvisionArgs {
    pub asset: AssetId,

    /// Policy to attach (defaults to `provisioning.default_policy`)
    #[arg(long)]
    pub policy: Option<String>,

    /// Asset attribute as key=value, repeatable
    #[arg(long = "attr", value_parser = parse_attribute)]
    pub attributes: Vec<(String, String)>,
}

fn parse_attribute(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{raw}'"))?;
    if key.is_empty() {
        return Err(format!("attribute key is empty in '{raw}'"));
    }
    Ok((key.to_string(), value.to_string()))
}

#[cfg(test)]
mod tests {
    use clap::{CommandFactory, Parser};

    use super::{Cli, Commands, OutputFormat};

    #[test]
    fn clap_command_tree_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn status_keeps_asset_order() {
        let cli = Cli::try_parse_from(["shadowctl", "status", "c", "a", "b", "-c", "2"])
            .expect("cli should parse");
        let Commands::Status(args) = cli.command else {
            panic!("expected status");
        };
        let names: Vec<_> = args.assets.iter().map(|a| a.as_str().to_string()).collect();
        assert_eq!(names, ["c", "a", "b"]);
        assert_eq!(args.concurrency, Some(2));
    }

    #[test]
    fn status_requires_an_asset() {
        assert!(Cli::try_parse_from(["shadowctl", "status"]).is_err());
    }

    #[test]
    fn blank_asset_is_rejected() {
        assert!(Cli::try_parse_from(["shadowctl", "status", ""]).is_err());
    }

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli = Cli::try_parse_from([
            "shadowctl",
            "report",
            "car-1",
            "--patch",
            r#"{"speed":1}"#,
            "--format",
            "raw",
            "--fixture",
            "shadows.json",
        ])
        .expect("cli should parse");
        assert_eq!(cli.format, OutputFormat::Raw);
        assert_eq!(
            cli.fixture.as_deref(),
            Some(std::path::Path::new("shadows.json"))
        );
    }

    #[test]
    fn provision_attributes_split_on_first_equals() {
        let cli = Cli::try_parse_from([
            "shadowctl",
            "provision",
            "van-9",
            "--attr",
            "model=e-van",
            "--attr",
            "note=a=b",
        ])
        .expect("cli should parse");
        let Commands::Provision(args) = cli.command else {
            panic!("expected provision");
        };
        assert_eq!(
            args.attributes,
            vec![
                ("model".to_string(), "e-van".to_string()),
                ("note".to_string(), "a=b".to_string())
            ]
        );
        assert!(args.policy.is_none());
    }

    #[test]
    fn malformed_attribute_is_rejected() {
        assert!(Cli::try_parse_from(["shadowctl", "provision", "v", "--attr", "novalue"]).is_err());
    }
}
