//! Catalog, orders, wishlist, and review endpoints.

use cartwheel_core::{OrderId, ProductId};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use super::{ApiError, HttpApiClient};
use crate::error::{Result, ValidationError};
use crate::models::{BearerToken, Order, Product, ProductFilter, Review};

/// Default page size when walking the paginated catalog.
const DEFAULT_PAGE_SIZE: u32 = 50;

/// Safety cap on pages fetched by a single listing.
const MAX_PAGES: u32 = 100;

/// Product listing: paginated, or a bare array from older backends.
#[derive(Deserialize)]
#[serde(untagged)]
enum ProductListing {
    Page {
        content: Vec<Product>,
        #[serde(rename = "totalPages", default)]
        total_pages: u32,
    },
    Plain(Vec<Product>),
}

#[derive(Serialize)]
struct NewReview<'a> {
    rating: u8,
    comment: &'a str,
}

impl HttpApiClient {
    /// List products matching a filter, following every page.
    ///
    /// # Errors
    ///
    /// Returns an error if any page request fails.
    #[instrument(skip(self))]
    pub async fn list_products(&self, filter: &ProductFilter) -> std::result::Result<Vec<Product>, ApiError> {
        let size = filter.page_size.unwrap_or(DEFAULT_PAGE_SIZE).max(1);
        let mut products = Vec::new();
        let mut page = 0;

        loop {
            let path = format!("/api/products?{}", listing_query(filter, page, size));
            let listing: ProductListing = self
                .send_json(self.request(Method::GET, &path, None))
                .await?;

            match listing {
                ProductListing::Plain(items) => {
                    products.extend(items);
                    break;
                }
                ProductListing::Page {
                    content,
                    total_pages,
                } => {
                    products.extend(content);
                    page += 1;
                    if page >= total_pages.min(MAX_PAGES) {
                        break;
                    }
                }
            }
        }

        debug!(count = products.len(), "Listed products");
        Ok(products)
    }

    /// Fetch a single product.
    ///
    /// # Errors
    ///
    /// Returns an error if the product does not exist or the request fails.
    #[instrument(skip(self))]
    pub async fn get_product(&self, id: ProductId) -> std::result::Result<Product, ApiError> {
        self.send_json(self.request(Method::GET, &format!("/api/products/{id}"), None))
            .await
    }

    /// Products in one category.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn products_by_category(
        &self,
        category: &str,
    ) -> std::result::Result<Vec<Product>, ApiError> {
        let path = format!(
            "/api/products/category/{}",
            urlencoding::encode(category.trim())
        );
        self.send_json(self.request(Method::GET, &path, None)).await
    }

    /// Orders placed by the signed-in user.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is rejected or the request fails.
    #[instrument(skip_all)]
    pub async fn my_orders(&self, token: &BearerToken) -> std::result::Result<Vec<Order>, ApiError> {
        self.send_json(self.request(Method::GET, "/api/orders/my", Some(token)))
            .await
    }

    /// One order belonging to the signed-in user.
    ///
    /// # Errors
    ///
    /// Returns an error if the order is not visible to this user.
    #[instrument(skip(self, token))]
    pub async fn get_order(
        &self,
        token: &BearerToken,
        id: OrderId,
    ) -> std::result::Result<Order, ApiError> {
        self.send_json(self.request(Method::GET, &format!("/api/orders/{id}"), Some(token)))
            .await
    }

    /// Products on the signed-in user's wishlist.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is rejected or the request fails.
    #[instrument(skip_all)]
    pub async fn wishlist(&self, token: &BearerToken) -> std::result::Result<Vec<Product>, ApiError> {
        self.send_json(self.request(Method::GET, "/api/wishlist", Some(token)))
            .await
    }

    /// Add a product to the wishlist. Returns the backend's confirmation text.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is rejected or the request fails.
    #[instrument(skip(self, token))]
    pub async fn add_to_wishlist(
        &self,
        token: &BearerToken,
        product_id: ProductId,
    ) -> std::result::Result<String, ApiError> {
        let path = format!("/api/wishlist/add/{product_id}");
        self.send_text(self.request(Method::POST, &path, Some(token)))
            .await
    }

    /// Remove a product from the wishlist. Returns the backend's confirmation text.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is rejected or the request fails.
    #[instrument(skip(self, token))]
    pub async fn remove_from_wishlist(
        &self,
        token: &BearerToken,
        product_id: ProductId,
    ) -> std::result::Result<String, ApiError> {
        let path = format!("/api/wishlist/remove/{product_id}");
        self.send_text(self.request(Method::DELETE, &path, Some(token)))
            .await
    }

    /// Reviews for a product, as returned by the backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn reviews(&self, product_id: ProductId) -> std::result::Result<Vec<Review>, ApiError> {
        self.send_json(self.request(Method::GET, &format!("/api/reviews/{product_id}"), None))
            .await
    }

    /// Post a review. Ratings are whole stars from 1 to 5.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an out-of-range rating, otherwise any
    /// backend error.
    #[instrument(skip(self, token, comment))]
    pub async fn add_review(
        &self,
        token: &BearerToken,
        product_id: ProductId,
        rating: u8,
        comment: &str,
    ) -> Result<Review> {
        if !(1..=5).contains(&rating) {
            return Err(ValidationError::Rating(rating).into());
        }
        let body = NewReview {
            rating,
            comment: comment.trim(),
        };
        let review: Review = self
            .send_json(
                self.request(Method::POST, &format!("/api/reviews/{product_id}"), Some(token))
                    .json(&body),
            )
            .await?;
        Ok(review)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

fn listing_query(filter: &ProductFilter, page: u32, size: u32) -> String {
    let mut params = vec![format!("page={page}"), format!("size={size}")];
    let optional = [
        ("category", &filter.category),
        ("search", &filter.search),
        ("sortBy", &filter.sort_by),
        ("sortDir", &filter.sort_dir),
    ];
    for (name, value) in optional {
        if let Some(value) = value.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
            params.push(format!("{name}={}", urlencoding::encode(value)));
        }
    }
    params.join("&")
}
