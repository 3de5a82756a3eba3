//! Home page route handler.
//!
//! Lists the catalog with add-to-cart controls. This is the only page that
//! talks to the catalog directly; the cart page renders purely from the
//! store's state.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use tracing::instrument;

use shoestring_core::{CurrencyCode, Price};

use crate::catalog::Product;
use crate::error::Result;
use crate::filters;
use crate::state::AppState;

/// Product display data for templates.
#[derive(Clone)]
pub struct ProductCardView {
    pub id: i64,
    pub title: String,
    pub image: String,
    pub price: String,
}

impl ProductCardView {
    fn build(product: &Product, currency: CurrencyCode) -> Self {
        Self {
            id: product.id.as_i64(),
            title: product.title.clone(),
            image: product.image.clone(),
            price: Price::new(product.price, currency).display(),
        }
    }
}

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home/index.html")]
pub struct HomeTemplate {
    pub products: Vec<ProductCardView>,
}

/// Display the product listing.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<HomeTemplate> {
    let products = state.catalog().products().await?;
    let currency = state.config().currency;

    Ok(HomeTemplate {
        products: products
            .iter()
            .map(|product| ProductCardView::build(product, currency))
            .collect(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    use shoestring_core::ProductId;

    #[test]
    fn test_product_card_formats_price() {
        let product = Product {
            id: ProductId::new(3),
            title: "Court Classic".to_string(),
            price: "129.5".parse().unwrap(),
            image: "https://cdn.example/shoes/3.jpg".to_string(),
        };

        let card = ProductCardView::build(&product, CurrencyCode::USD);
        assert_eq!(card.id, 3);
        assert_eq!(card.price, "$129.50");
    }
}
