//! CLI mode
//!
//! Offline commands; none of them touch the database or the task tracker.

use std::io::Read;

use anyhow::{Context, Result};
use colored::Colorize;

use crate::affiliate::comment::build_comment;
use crate::affiliate::geo::{lookup_geo, normalize_geo};
use crate::cli::Commands;
use crate::config::StaticConfig;

/// Run a CLI subcommand (everything except `serve`)
pub fn run_cli(command: Commands) -> Result<()> {
    match command {
        Commands::Serve => anyhow::bail!("`serve` is handled by server mode"),
        Commands::ConfigGen { output_path } => generate_config(output_path.as_deref()),
        Commands::NormalizeGeo { labels } => {
            for label in labels {
                println!("{}", format_geo_line(&label));
            }
            Ok(())
        }
        Commands::PreviewComment {
            task_id,
            sub_id,
            file,
        } => {
            let description = read_description(file.as_deref())?;
            let comment = build_comment(&description, &task_id, &sub_id);
            if comment.is_fallback() {
                eprintln!(
                    "{} no TOP PICKS LINEUP links found, using the fallback comment",
                    "[WARN]".yellow().bold()
                );
            }
            println!(
                "{}",
                serde_json::to_string_pretty(&comment).context("Failed to serialize comment")?
            );
            Ok(())
        }
    }
}

fn generate_config(output_path: Option<&str>) -> Result<()> {
    let path = output_path.unwrap_or("config.example.toml");
    StaticConfig::default()
        .save_to_file(path)
        .map_err(|e| anyhow::anyhow!(e.format_simple()))?;
    println!("{} Sample configuration written to {}", "[OK]".green().bold(), path);
    Ok(())
}

fn format_geo_line(label: &str) -> String {
    let code = normalize_geo(label);
    let marker = if lookup_geo(label).is_some() {
        "alias"
    } else {
        "normalized"
    };
    format!("{}\t{}\t({})", label, code, marker)
}

/// 从文件读取任务描述；未提供文件时读取 stdin
fn read_description(file: Option<&str>) -> Result<String> {
    match file {
        Some(path) if path != "-" => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read description from {}", path)),
        _ => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read description from stdin")?;
            Ok(buf)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_geo_line() {
        let line = format_geo_line("United Kingdom");
        assert!(line.starts_with("United Kingdom\tUK\t"));
        assert!(line.ends_with("(alias)"));
    }

    #[test]
    fn test_read_description_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("task.md");
        std::fs::write(&path, "TOP PICKS LINEUP\n1. https://a.example.com/?subid=x").unwrap();
        let text = read_description(path.to_str()).unwrap();
        assert!(text.contains("TOP PICKS LINEUP"));
    }

    #[test]
    fn test_generate_config_writes_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sample.toml");
        generate_config(path.to_str()).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("[server]"));
        assert!(content.contains("[tracker]"));
    }
}
