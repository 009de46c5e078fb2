pub mod account;
pub mod insight;
pub mod profile;
pub mod status;

use std::time::Duration;

use anyhow::{Result, bail};
use biglabs_application::AppBootstrap;
use biglabs_core::session::SessionSnapshot;
use biglabs_core::user::Profile;
use colored::Colorize;

/// Extra time allowed beyond one request timeout for session restore.
const RESOLVE_GRACE_SECS: u64 = 5;

fn resolve_timeout(app: &AppBootstrap) -> Duration {
    Duration::from_secs(app.config.auth.request_timeout_secs + RESOLVE_GRACE_SECS)
}

/// Waits for the initial session resolution.
pub(crate) async fn resolved(app: &AppBootstrap) -> Result<SessionSnapshot> {
    match tokio::time::timeout(resolve_timeout(app), app.session.wait_resolved()).await {
        Ok(snapshot) => Ok(snapshot),
        Err(_) => bail!("Timed out restoring the session"),
    }
}

/// Waits until the session manager reports `predicate`.
pub(crate) async fn settled<F>(app: &AppBootstrap, predicate: F) -> Result<SessionSnapshot>
where
    F: FnMut(&SessionSnapshot) -> bool,
{
    let mut receiver = app.session.watch();
    match tokio::time::timeout(resolve_timeout(app), receiver.wait_for(predicate)).await {
        Ok(Ok(snapshot)) => Ok(snapshot.clone()),
        Ok(Err(_)) => Ok(app.session.snapshot()),
        Err(_) => bail!("Timed out waiting for the session to update"),
    }
}

pub(crate) fn success(message: &str) {
    println!("{} {}", "✔".green().bold(), message);
}

pub(crate) fn print_profile(profile: &Profile) {
    println!(
        "{} {}",
        format!("[{}]", profile.initials()).cyan().bold(),
        profile.display_name().bold()
    );
    print_field("Email", Some(&profile.email));
    print_field("Company", profile.company_name.as_ref());
    print_field("Role", profile.role.as_ref());
    print_field("Phone", profile.phone.as_ref());
    print_field("Member since", Some(&profile.created_at));
}

fn print_field(label: &str, value: Option<&String>) {
    let value = value
        .map(|v| v.as_str())
        .filter(|v| !v.trim().is_empty())
        .map(|v| v.normal())
        .unwrap_or_else(|| "-".dimmed());
    println!("  {:<13} {}", format!("{label}:").dimmed(), value);
}
