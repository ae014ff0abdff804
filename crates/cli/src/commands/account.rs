//! Account commands: sign in and out, registration, profile changes.

#![allow(clippy::print_stdout)]

use cartwheel_client::models::{ProfileUpdate, Registration};
use tracing::info;

use super::{CliError, password_or_stdin};
use crate::app::App;
use crate::render;

pub async fn login(app: &App, email: &str, password: Option<String>) -> Result<(), CliError> {
    let password = password_or_stdin(password).await?;
    let session = app.session.login(email, &password).await?;
    println!("Signed in as {}", render::user(&session.user));
    Ok(())
}

pub async fn logout(app: &App) {
    app.session.logout().await;
    println!("Signed out.");
}

pub async fn register(
    app: &App,
    name: String,
    email: String,
    password: Option<String>,
) -> Result<(), CliError> {
    let password = password_or_stdin(password).await?;
    let user = app
        .session
        .register(&Registration {
            name,
            email,
            password,
        })
        .await?;
    println!("Created account {}", render::user(&user));
    println!("Run `cw login -e {}` to sign in.", user.email);
    Ok(())
}

pub fn whoami(app: &App) {
    match app.session.user() {
        Some(user) => println!("{}", render::user(&user)),
        None => println!("Not signed in."),
    }
}

pub async fn update_profile(
    app: &App,
    name: String,
    email: String,
    password: Option<String>,
) -> Result<(), CliError> {
    let update = ProfileUpdate {
        name,
        email,
        password: password.map(Into::into),
    };
    let user = app.session.update_profile(&update).await?;
    println!("Updated profile: {}", render::user(&user));
    Ok(())
}

pub async fn delete_account(app: &App, confirmed: bool) -> Result<(), CliError> {
    if !confirmed {
        return Err(CliError::NotConfirmed("delete the account"));
    }
    if !app.session.is_authenticated() {
        return Err(CliError::NotSignedIn);
    }
    let message = app.session.delete_account().await?;
    info!("Account deleted");
    println!("{message}");
    Ok(())
}
