//! Cart commands. These work signed out.

#![allow(clippy::print_stdout)]

use cartwheel_core::ProductId;

use super::CliError;
use crate::app::App;
use crate::render;

pub fn show(app: &App) {
    println!("{}", render::cart(&app.cart.snapshot()));
}

/// Look the product up so the line records its current name and price.
pub async fn add(app: &App, product_id: ProductId) -> Result<(), CliError> {
    let product = app.api.get_product(product_id).await?;
    app.cart.add_to_cart(&product).await;
    println!("Added {} to the cart.", product.name);
    show(app);
    Ok(())
}

pub async fn remove(app: &App, product_id: ProductId) {
    app.cart.remove_from_cart(product_id).await;
    show(app);
}

pub async fn set(app: &App, product_id: ProductId, quantity: i64) -> Result<(), CliError> {
    app.cart.update_quantity(product_id, quantity).await?;
    show(app);
    Ok(())
}

pub async fn clear(app: &App) {
    app.cart.clear_cart().await;
    println!("Cart cleared.");
}
