//! Cart route handlers.
//!
//! Cart operations use HTMX for dynamic updates without full page reloads.
//! Mutations answer with fragments plus an `HX-Trigger: cart-updated`
//! header; the cart count badge and the toast stack re-fetch on that
//! trigger. The trigger fires on failures too - the cart is unchanged then,
//! but the toast stack delivers the store's notifications through it.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{AppendHeaders, IntoResponse, Response},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::instrument;

use shoestring_core::{CurrencyCode, Price, ProductId};

use crate::cart::LineItem;
use crate::filters;
use crate::state::AppState;

/// Cart item display data for templates.
#[derive(Clone)]
pub struct CartItemView {
    pub id: i64,
    pub title: String,
    pub image: String,
    pub amount: i64,
    pub price: String,
    pub line_total: String,
}

impl CartItemView {
    fn build(item: &LineItem, currency: CurrencyCode) -> Self {
        let unit = Price::new(item.price, currency);
        Self {
            id: item.id.as_i64(),
            title: item.title.clone(),
            image: item.image.clone(),
            amount: item.amount,
            price: unit.display(),
            line_total: unit.times(item.amount).display(),
        }
    }
}

/// Cart display data for templates.
#[derive(Clone)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub total: String,
    pub item_count: i64,
}

impl CartView {
    /// Derive the display cart from the store's line items.
    #[must_use]
    pub fn build(items: &[LineItem], currency: CurrencyCode) -> Self {
        let total: Decimal = items
            .iter()
            .map(|item| item.price * Decimal::from(item.amount))
            .sum();

        Self {
            items: items
                .iter()
                .map(|item| CartItemView::build(item, currency))
                .collect(),
            total: Price::new(total, currency).display(),
            item_count: items.iter().map(|item| item.amount).sum(),
        }
    }
}

// =============================================================================
// Form Types
// =============================================================================

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: i64,
}

/// Update quantity form data.
#[derive(Debug, Deserialize)]
pub struct UpdateAmountForm {
    pub product_id: i64,
    pub amount: i64,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub product_id: i64,
}

// =============================================================================
// Templates
// =============================================================================

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub cart: CartView,
}

/// Cart items fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_items.html")]
pub struct CartItemsTemplate {
    pub cart: CartView,
}

/// Cart count badge fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: i64,
}

/// Toast stack fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/toasts.html")]
pub struct ToastsTemplate {
    pub toasts: Vec<String>,
}

fn current_view(state: &AppState) -> CartView {
    CartView::build(&state.cart().items(), state.config().currency)
}

// =============================================================================
// Handlers
// =============================================================================

/// Display cart page.
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>) -> impl IntoResponse {
    CartShowTemplate {
        cart: current_view(&state),
    }
}

/// Add one unit of a product to the cart (HTMX).
///
/// Returns the cart count badge with an HTMX trigger to update the other
/// cart elements.
#[instrument(skip(state))]
pub async fn add(State(state): State<AppState>, Form(form): Form<AddToCartForm>) -> Response {
    state.cart().add_product(ProductId::new(form.product_id)).await;

    (
        AppendHeaders([("HX-Trigger", "cart-updated")]),
        CartCountTemplate {
            count: state.cart().item_count(),
        },
    )
        .into_response()
}

/// Set a cart item's quantity (HTMX).
#[instrument(skip(state))]
pub async fn update(State(state): State<AppState>, Form(form): Form<UpdateAmountForm>) -> Response {
    state
        .cart()
        .update_product_amount(ProductId::new(form.product_id), form.amount)
        .await;

    (
        AppendHeaders([("HX-Trigger", "cart-updated")]),
        CartItemsTemplate {
            cart: current_view(&state),
        },
    )
        .into_response()
}

/// Remove a product from the cart (HTMX).
#[instrument(skip(state))]
pub async fn remove(
    State(state): State<AppState>,
    Form(form): Form<RemoveFromCartForm>,
) -> Response {
    state.cart().remove_product(ProductId::new(form.product_id)).await;

    (
        AppendHeaders([("HX-Trigger", "cart-updated")]),
        CartItemsTemplate {
            cart: current_view(&state),
        },
    )
        .into_response()
}

/// Get cart count badge (HTMX).
#[instrument(skip(state))]
pub async fn count(State(state): State<AppState>) -> impl IntoResponse {
    CartCountTemplate {
        count: state.cart().item_count(),
    }
}

/// Drain and render pending toast notifications (HTMX).
#[instrument(skip(state))]
pub async fn toasts(State(state): State<AppState>) -> impl IntoResponse {
    ToastsTemplate {
        toasts: state.toasts().drain(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn line_item(id: i64, price: &str, amount: i64) -> LineItem {
        LineItem {
            id: ProductId::new(id),
            title: format!("Product {id}"),
            price: price.parse().unwrap(),
            image: format!("https://cdn.example/{id}.jpg"),
            amount,
        }
    }

    #[test]
    fn test_cart_view_formats_rows_and_total() {
        let items = vec![line_item(1, "179.9", 2), line_item(2, "100", 1)];
        let view = CartView::build(&items, CurrencyCode::USD);

        assert_eq!(view.items.len(), 2);
        assert_eq!(view.items[0].price, "$179.90");
        assert_eq!(view.items[0].line_total, "$359.80");
        assert_eq!(view.items[1].line_total, "$100.00");
        assert_eq!(view.total, "$459.80");
        assert_eq!(view.item_count, 3);
    }

    #[test]
    fn test_empty_cart_view() {
        let view = CartView::build(&[], CurrencyCode::USD);
        assert!(view.items.is_empty());
        assert_eq!(view.total, "$0.00");
        assert_eq!(view.item_count, 0);
    }

    #[test]
    fn test_cart_items_fragment_disables_decrement_at_one() {
        let view = CartView::build(&[line_item(1, "50", 1)], CurrencyCode::USD);
        let html = CartItemsTemplate { cart: view }.render().unwrap();
        assert!(html.contains("disabled"));

        let view = CartView::build(&[line_item(1, "50", 2)], CurrencyCode::USD);
        let html = CartItemsTemplate { cart: view }.render().unwrap();
        assert!(!html.contains("disabled"));
    }

    #[test]
    fn test_cart_items_fragment_posts_adjacent_amounts() {
        let view = CartView::build(&[line_item(1, "50", 3)], CurrencyCode::USD);
        let html = CartItemsTemplate { cart: view }.render().unwrap();

        // Decrement posts current - 1, increment posts current + 1
        assert!(html.contains(r#"name="amount" value="2""#));
        assert!(html.contains(r#"name="amount" value="4""#));
    }
}
