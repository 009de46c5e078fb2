use anyhow::Result;
use biglabs_application::{AppBootstrap, SignUpStatus};

use super::{print_profile, resolved, settled, success};

pub async fn sign_in(app: &AppBootstrap, email: &str, password: &str) -> Result<()> {
    resolved(app).await?;
    app.accounts.sign_in(email, password).await?;
    success("Signed in successfully.");

    let snapshot = settled(app, |snapshot| snapshot.is_authenticated()).await?;
    if let Some(profile) = &snapshot.profile {
        print_profile(profile);
    }
    Ok(())
}

pub async fn sign_up(
    app: &AppBootstrap,
    email: &str,
    password: &str,
    first_name: &str,
    last_name: &str,
) -> Result<()> {
    resolved(app).await?;
    match app
        .accounts
        .sign_up(email, password, first_name, last_name)
        .await?
    {
        SignUpStatus::Active => success("Account created. Welcome to Biglabs."),
        SignUpStatus::ConfirmationRequired => {
            success("Account created. Check your email for verification.")
        }
    }
    Ok(())
}

pub async fn sign_out(app: &AppBootstrap) -> Result<()> {
    resolved(app).await?;
    app.session.sign_out().await;
    success("Signed out.");
    Ok(())
}

pub async fn update_password(app: &AppBootstrap, password: &str, confirm: &str) -> Result<()> {
    resolved(app).await?;
    app.accounts.update_password(password, confirm).await?;
    success("Password updated.");
    Ok(())
}

pub async fn reset_password(app: &AppBootstrap, email: &str) -> Result<()> {
    app.accounts.request_password_reset(email).await?;
    success("If an account exists for that email, a reset link is on its way.");
    Ok(())
}
