//! Order history commands.

#![allow(clippy::print_stdout)]

use cartwheel_core::OrderId;

use super::CliError;
use crate::app::App;
use crate::render;

pub async fn list(app: &App) -> Result<(), CliError> {
    let orders = app.api.my_orders(&app.token()?).await?;
    println!(
        "{}",
        render::list(&orders, "No orders yet.", render::order_line)
    );
    Ok(())
}

pub async fn show(app: &App, id: OrderId) -> Result<(), CliError> {
    let order = app.api.get_order(&app.token()?, id).await?;
    println!("{}", render::order_detail(&order));
    Ok(())
}
