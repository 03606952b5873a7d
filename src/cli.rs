use clap::Parser;
use std::path::PathBuf;

use crate::chat::Variant;

/// Flight-Chat: terminal client for a flight-search assistant
#[derive(Parser, Debug, Clone)]
#[command(name = "flight-chat")]
#[command(version)]
#[command(about = "Chat with a flight-search assistant and rate its inferred state", long_about = None)]
pub struct Cli {
    /// Replay script of inbound frames and user steps (JSON lines). Reads stdin when omitted.
    #[arg(value_name = "SCRIPT")]
    pub script: Option<PathBuf>,

    /// Run the interactive terminal interface instead of a headless replay
    #[arg(long, default_value_t = false)]
    pub tui: bool,

    /// Feature set to enable. Overrides config.
    #[arg(long, value_enum)]
    pub variant: Option<Variant>,

    /// Pause between replayed steps in milliseconds. Overrides config.
    #[arg(long, value_name = "MS")]
    pub delay_ms: Option<u64>,

    /// Configuration file (defaults to the platform config directory)
    #[arg(short = 'c', long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Write a default config file and exit
    #[arg(long, default_value_t = false)]
    pub init_config: bool,

    /// Log level (trace, debug, info, warn, error). Overrides config.
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log to this file instead of stderr
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["flight-chat"]);
        assert!(cli.script.is_none());
        assert!(!cli.tui);
        assert!(cli.variant.is_none());
        assert!(cli.delay_ms.is_none());
        assert!(cli.log_level.is_none());
        assert!(!cli.init_config);
    }

    #[test]
    fn test_script_and_variant() {
        let cli = Cli::parse_from(["flight-chat", "--variant", "feedback", "demo.jsonl"]);
        assert_eq!(cli.script, Some(PathBuf::from("demo.jsonl")));
        assert_eq!(cli.variant, Some(Variant::Feedback));
    }

    #[test]
    fn test_tui_flags() {
        let cli = Cli::parse_from([
            "flight-chat",
            "--tui",
            "--delay-ms",
            "250",
            "-c",
            "/tmp/fc.toml",
        ]);
        assert!(cli.tui);
        assert_eq!(cli.delay_ms, Some(250));
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/fc.toml")));
    }

    #[test]
    fn test_invalid_variant_rejected() {
        assert!(Cli::try_parse_from(["flight-chat", "--variant", "deluxe"]).is_err());
    }
}
