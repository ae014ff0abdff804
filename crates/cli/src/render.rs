//! Plain-text rendering of client data.

use std::fmt::Write;

use cartwheel_client::Cart;
use cartwheel_client::models::{Order, Product, Review, User};
use cartwheel_core::Price;

pub fn money(price: Price) -> String {
    format!("${price}")
}

pub fn user(user: &User) -> String {
    format!(
        "{} <{}> (#{}, {})",
        user.name,
        user.email,
        user.id,
        user.role.as_str().to_lowercase()
    )
}

pub fn cart(cart: &Cart) -> String {
    if cart.is_empty() {
        return "Your cart is empty.".to_string();
    }
    let mut out = String::new();
    for line in cart.lines() {
        let _ = writeln!(
            out,
            "{:>3} x {} (#{})  {} each  {}",
            line.quantity,
            line.name,
            line.product_id,
            money(line.price),
            money(line.subtotal())
        );
    }
    let _ = write!(
        out,
        "{} item(s), total {}",
        cart.item_count(),
        money(cart.total())
    );
    out
}

pub fn product_line(product: &Product) -> String {
    let mut out = format!("#{:<5} {}  {}", product.id, product.name, money(product.price));
    if let Some(category) = &product.category {
        let _ = write!(out, "  [{category}]");
    }
    if product.stock == Some(0) {
        out.push_str("  (out of stock)");
    }
    out
}

pub fn product_detail(product: &Product) -> String {
    let mut out = product_line(product);
    if let Some(description) = product.description.as_deref().filter(|d| !d.is_empty()) {
        let _ = write!(out, "\n\n{description}");
    }
    if let Some(stock) = product.stock {
        let _ = write!(out, "\n\nIn stock: {stock}");
    }
    out
}

pub fn order_line(order: &Order) -> String {
    let placed = order
        .created_at
        .map(|at| at.format("%Y-%m-%d").to_string())
        .unwrap_or_default();
    format!(
        "Order #{}  {}  {}  {}",
        order.id,
        order.status,
        money(order.total()),
        placed
    )
    .trim_end()
    .to_string()
}

pub fn order_detail(order: &Order) -> String {
    let mut out = order_line(order);
    for item in &order.order_items {
        let name = item
            .product
            .as_ref()
            .map_or("(removed product)", |p| p.name.as_str());
        let _ = write!(
            out,
            "\n{:>3} x {}  {}",
            item.quantity,
            name,
            money(item.price.times(item.quantity))
        );
    }
    out
}

pub fn review(review: &Review) -> String {
    let stars = "*".repeat(usize::from(review.rating.min(5)));
    let author = review
        .user
        .as_ref()
        .map_or("anonymous", |u| u.name.as_str());
    if review.comment.is_empty() {
        format!("{stars:<5}  {author}")
    } else {
        format!("{stars:<5}  {author}: {}", review.comment)
    }
}

pub fn list<T>(items: &[T], empty: &str, render: impl Fn(&T) -> String) -> String {
    if items.is_empty() {
        return empty.to_string();
    }
    items.iter().map(render).collect::<Vec<_>>().join("\n")
}
