use anyhow::{Result, bail};
use biglabs_application::AppBootstrap;
use biglabs_core::auth::AppMode;
use biglabs_core::user::ProfileUpdate;
use clap::Args;
use colored::Colorize;

use super::{print_profile, resolved, success};

#[derive(Args, Debug, Default)]
pub struct UpdateArgs {
    #[arg(long)]
    pub first_name: Option<String>,
    #[arg(long)]
    pub last_name: Option<String>,
    #[arg(long)]
    pub company_name: Option<String>,
    #[arg(long)]
    pub role: Option<String>,
    #[arg(long)]
    pub phone: Option<String>,
    #[arg(long)]
    pub avatar_url: Option<String>,
}

impl From<UpdateArgs> for ProfileUpdate {
    fn from(args: UpdateArgs) -> Self {
        Self {
            first_name: args.first_name,
            last_name: args.last_name,
            company_name: args.company_name,
            role: args.role,
            phone: args.phone,
            avatar_url: args.avatar_url,
        }
    }
}

pub async fn show(app: &AppBootstrap) -> Result<()> {
    let snapshot = resolved(app).await?;
    match (&snapshot.identity, &snapshot.profile) {
        (None, _) => bail!("Not signed in"),
        (Some(_), Some(profile)) => print_profile(profile),
        (Some(identity), None) => println!(
            "{} no profile found for {}",
            "!".yellow().bold(),
            identity.id
        ),
    }
    Ok(())
}

pub async fn update(app: &AppBootstrap, args: UpdateArgs) -> Result<()> {
    let update = ProfileUpdate::from(args);
    if update.is_empty() {
        bail!("Nothing to update; pass at least one field");
    }

    resolved(app).await?;
    app.accounts.save_profile(&update).await?;
    success("Profile saved.");

    let snapshot = app.session.snapshot();
    let Some(mut profile) = snapshot.profile else {
        return Ok(());
    };

    // Demo saves are accepted but not stored; show what would have been saved.
    if app.mode == AppMode::Demo {
        update.apply_to(&mut profile);
        println!("{}", "Demo mode: changes are not persisted.".yellow());
    }
    print_profile(&profile);
    Ok(())
}
