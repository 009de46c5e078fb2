use anyhow::{Context, Result};
use biglabs_application::AppBootstrap;
use colored::Colorize;

use super::{print_profile, resolved};

pub async fn run(app: &AppBootstrap, json: bool) -> Result<()> {
    let snapshot = resolved(app).await?;

    if json {
        let rendered =
            serde_json::to_string_pretty(&snapshot).context("Failed to render session")?;
        println!("{rendered}");
        return Ok(());
    }

    let mode = if snapshot.is_demo {
        format!("{} (demo data)", snapshot.mode).yellow()
    } else {
        snapshot.mode.to_string().green()
    };
    println!("{:<14} {}", "Mode:".dimmed(), mode);

    if let Ok(dir) = app.paths.config_dir() {
        println!("{:<14} {}", "Config:".dimmed(), dir.display());
    }

    let insights = if app.insights.is_preview() {
        "preview answers".yellow()
    } else {
        app.config.insights.model.as_str().normal()
    };
    println!("{:<14} {}", "Insights:".dimmed(), insights);

    match (&snapshot.identity, &snapshot.profile) {
        (None, _) => println!("{:<14} {}", "Session:".dimmed(), "signed out".red()),
        (Some(identity), profile) => {
            let who = identity.email.as_deref().unwrap_or(identity.id.as_str());
            println!("{:<14} {}", "Session:".dimmed(), who.green());
            match profile {
                Some(profile) => {
                    println!();
                    print_profile(profile);
                }
                None => println!("{:<14} {}", "Profile:".dimmed(), "unavailable".yellow()),
            }
        }
    }

    Ok(())
}
