//! Checkout commands.
//!
//! `start` prints the payment URL and exits; the shopper pays in a browser
//! and then runs `complete`, which works from persisted state only.

#![allow(clippy::print_stdout)]

use cartwheel_client::{CheckoutOutcome, NotSavedReason};

use super::CliError;
use crate::app::App;
use crate::render;

pub async fn start(app: &App) -> Result<(), CliError> {
    let redirect = app.checkout().begin().await?;
    println!("Total due: {}", render::money(app.cart.total()));
    println!("Complete payment at:\n  {}", redirect.url);
    println!("Then run `cw checkout complete`.");
    Ok(())
}

pub async fn complete(app: &App) -> Result<(), CliError> {
    match app.checkout().complete().await {
        CheckoutOutcome::OrderSaved(order) => {
            println!("Thank you! {}", render::order_line(&order));
            Ok(())
        }
        CheckoutOutcome::NotSaved(reason) => Err(CliError::OrderNotSaved(not_saved_message(&reason))),
    }
}

fn not_saved_message(reason: &NotSavedReason) -> String {
    match reason {
        NotSavedReason::NoSession => "you are no longer signed in".to_string(),
        NotSavedReason::NoItems => "no cart items were found".to_string(),
        NotSavedReason::OrderRejected(message) => message.clone(),
    }
}
