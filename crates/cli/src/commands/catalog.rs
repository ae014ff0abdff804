//! Catalog, wishlist, and review commands.

#![allow(clippy::print_stdout)]

use cartwheel_client::models::ProductFilter;
use cartwheel_core::ProductId;

use super::CliError;
use crate::app::App;
use crate::render;

pub async fn list_products(app: &App, filter: &ProductFilter) -> Result<(), CliError> {
    let products = app.api.list_products(filter).await?;
    println!(
        "{}",
        render::list(&products, "No products found.", render::product_line)
    );
    Ok(())
}

pub async fn show_product(app: &App, id: ProductId) -> Result<(), CliError> {
    let product = app.api.get_product(id).await?;
    println!("{}", render::product_detail(&product));
    Ok(())
}

pub async fn wishlist(app: &App) -> Result<(), CliError> {
    let products = app.api.wishlist(&app.token()?).await?;
    println!(
        "{}",
        render::list(&products, "Your wishlist is empty.", render::product_line)
    );
    Ok(())
}

pub async fn add_to_wishlist(app: &App, product_id: ProductId) -> Result<(), CliError> {
    let message = app.api.add_to_wishlist(&app.token()?, product_id).await?;
    println!("{message}");
    Ok(())
}

pub async fn remove_from_wishlist(app: &App, product_id: ProductId) -> Result<(), CliError> {
    let message = app
        .api
        .remove_from_wishlist(&app.token()?, product_id)
        .await?;
    println!("{message}");
    Ok(())
}

pub async fn reviews(app: &App, product_id: ProductId) -> Result<(), CliError> {
    let reviews = app.api.reviews(product_id).await?;
    println!("{}", render::list(&reviews, "No reviews yet.", render::review));
    Ok(())
}

pub async fn add_review(
    app: &App,
    product_id: ProductId,
    rating: u8,
    comment: &str,
) -> Result<(), CliError> {
    let review = app
        .api
        .add_review(&app.token()?, product_id, rating, comment)
        .await?;
    println!("Posted review: {}", render::review(&review));
    Ok(())
}
