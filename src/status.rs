// System status display — configuration summary, moderation tallies, log sizes.

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;

use crate::accounts::AccountStore;
use crate::config::Config;
use crate::moderation::capabilities::QUARANTINE_ROLE;

/// Display system status to the terminal.
pub async fn show(config: &Config, accounts: Option<&Arc<dyn AccountStore>>) -> Result<()> {
    println!(
        "Threshold: {:.2}  |  Mode: {}",
        config.spam_threshold,
        if config.quarantine_mode {
            "quarantine"
        } else {
            "delete"
        }
    );
    println!(
        "Classifier: {}",
        match config.api_key {
            Some(_) => format!("enabled ({})", config.classifier_model),
            None => "disabled (REGGUARD_API_KEY not set)".to_string(),
        }
    );
    println!("Token alert threshold: {}", config.token_alert_threshold);

    println!("Spam log: {}", describe_file(&config.spam_log_path));
    println!("Usage log: {}", describe_file(&config.usage_log_path));

    let Some(accounts) = accounts else {
        println!("Database: not initialized");
        println!("\nRun `regguard init` to set up the database.");
        return Ok(());
    };
    println!("Database: {}", describe_file(&config.db_path));

    let caps = accounts.role_capabilities(QUARANTINE_ROLE).await?;
    if caps.is_empty() {
        println!("Quarantine role caps: none");
    } else {
        let caps: Vec<&str> = caps.iter().map(String::as_str).collect();
        println!("Quarantine role caps: {}", caps.join(", "));
    }

    let counters = accounts.counters().await?;
    if counters.is_empty() {
        println!("Screened registrations: none yet");
    } else {
        println!("Screened registrations:");
        for (key, value) in &counters {
            println!("  {key}: {value}");
        }
    }

    Ok(())
}

fn describe_file(path: &str) -> String {
    match std::fs::metadata(Path::new(path)) {
        Ok(meta) => format!("{} ({})", path, format_bytes(meta.len())),
        Err(_) => format!("{path} (not created yet)"),
    }
}

fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}
