use clap::Parser;
use std::path::PathBuf;

/// Fetch the earthquake feed and list one map pin per record.
#[derive(Debug, Parser)]
#[command(name = "quake", version)]
pub struct Cli {
    /// Configuration file (YAML/TOML/JSON). Defaults to ./quake.yaml when present.
    #[arg(short, long, env = "QUAKE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Read the large feed instead of the small one.
    #[arg(long)]
    pub large: bool,

    /// Print JSON instead of a table.
    #[arg(long)]
    pub json: bool,

    /// Mirror log events to stderr.
    #[arg(long)]
    pub log_stderr: bool,

    /// Give up if no load completes within this many seconds.
    #[arg(long, default_value_t = 30)]
    pub wait_secs: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_flags() {
        let cli = Cli::try_parse_from(["quake", "--large", "--json", "--wait-secs", "5"]).unwrap();
        assert!(cli.large);
        assert!(cli.json);
        assert!(!cli.log_stderr);
        assert_eq!(cli.wait_secs, 5);
    }
}
