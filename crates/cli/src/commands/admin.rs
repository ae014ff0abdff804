//! Admin console commands.
//!
//! Every command checks the signed-in role first; the backend enforces it
//! again.

#![allow(clippy::print_stdout)]

use cartwheel_client::models::{ProductInput, Registration};
use cartwheel_core::{OrderId, OrderStatus, ProductId, ReviewId, UserId};
use tracing::info;

use super::{CliError, password_or_stdin};
use crate::app::App;
use crate::render;

pub async fn list_admins(app: &App) -> Result<(), CliError> {
    let admins = app.api.list_admins(&app.admin_token()?).await?;
    println!("{}", render::list(&admins, "No admins.", render::user));
    Ok(())
}

pub async fn add_admin(
    app: &App,
    name: String,
    email: String,
    password: Option<String>,
) -> Result<(), CliError> {
    let token = app.admin_token()?;
    let password = password_or_stdin(password).await?;
    let admin = app
        .api
        .create_admin(
            &token,
            &Registration {
                name,
                email,
                password,
            },
        )
        .await?;
    info!(user_id = %admin.id, "Created admin");
    println!("Created admin {}", render::user(&admin));
    Ok(())
}

pub async fn remove_admin(app: &App, id: UserId) -> Result<(), CliError> {
    let message = app.api.delete_admin(&app.admin_token()?, id).await?;
    println!("{message}");
    Ok(())
}

pub async fn all_orders(app: &App) -> Result<(), CliError> {
    let orders = app.api.all_orders(&app.admin_token()?).await?;
    println!("{}", render::list(&orders, "No orders.", render::order_line));
    Ok(())
}

pub async fn set_status(app: &App, id: OrderId, status: OrderStatus) -> Result<(), CliError> {
    let order = app
        .api
        .update_order_status(&app.admin_token()?, id, status)
        .await?;
    println!("{}", render::order_line(&order));
    Ok(())
}

pub async fn add_product(app: &App, input: &ProductInput) -> Result<(), CliError> {
    let product = app.api.create_product(&app.admin_token()?, input).await?;
    println!("Created {}", render::product_line(&product));
    Ok(())
}

pub async fn remove_product(app: &App, id: ProductId) -> Result<(), CliError> {
    let message = app.api.delete_product(&app.admin_token()?, id).await?;
    println!("{message}");
    Ok(())
}

pub async fn remove_review(app: &App, id: ReviewId) -> Result<(), CliError> {
    app.api.delete_review(&app.admin_token()?, id).await?;
    println!("Review #{id} removed.");
    Ok(())
}
