//! Command-line interface definitions using clap

use clap::{Parser, Subcommand};

/// trackdesk - marketing operations dashboard backend
#[derive(Parser)]
#[command(name = "trackdesk")]
#[command(version)]
#[command(about = "Sub-ID, GEO ranking and task reconciliation service", long_about = None)]
pub struct Cli {
    /// Configuration file (default: config.toml)
    #[arg(long, short = 'c', global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Start the HTTP server (default)
    Serve,

    /// Generate example configuration file
    ConfigGen {
        /// Output path (default: config.example.toml)
        output_path: Option<String>,
    },

    /// Normalize free-text GEO labels to canonical codes
    NormalizeGeo {
        #[arg(required = true)]
        labels: Vec<String>,
    },

    /// Build the lineup comment for a task description
    ///
    /// Reads the description from FILE, or stdin when omitted or "-".
    PreviewComment {
        #[arg(long)]
        task_id: String,

        #[arg(long)]
        sub_id: String,

        file: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_default_is_none() {
        let cli = Cli::try_parse_from(["trackdesk"]).unwrap();
        assert!(cli.command.is_none());
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_parse_preview_comment() {
        let cli = Cli::try_parse_from([
            "trackdesk",
            "-c",
            "prod.toml",
            "preview-comment",
            "--task-id",
            "86abc",
            "--sub-id",
            "SID-1",
            "desc.md",
        ])
        .unwrap();
        assert_eq!(cli.config.as_deref(), Some("prod.toml"));
        assert_eq!(
            cli.command,
            Some(Commands::PreviewComment {
                task_id: "86abc".into(),
                sub_id: "SID-1".into(),
                file: Some("desc.md".into()),
            })
        );
    }

    #[test]
    fn test_normalize_geo_requires_labels() {
        assert!(Cli::try_parse_from(["trackdesk", "normalize-geo"]).is_err());
    }
}
