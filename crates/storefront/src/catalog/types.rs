//! Wire types for the catalog API.

use rust_decimal::Decimal;
use serde::Deserialize;

use shoestring_core::ProductId;

/// A product as served by `GET products/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    /// Unit price; the catalog serves it as a JSON number.
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    /// Product image URL.
    pub image: String,
}

/// Available stock for a product, as served by `GET stock/{id}`.
///
/// The amount may be zero or negative; callers decide what that means.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct StockLevel {
    pub amount: i64,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_product_deserializes_from_catalog_json() {
        let json = r#"{
            "id": 5,
            "title": "Trail Runner",
            "price": 179.9,
            "image": "https://cdn.example/shoes/trail-runner.jpg"
        }"#;

        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.id, ProductId::new(5));
        assert_eq!(product.title, "Trail Runner");
        assert_eq!(product.price, "179.9".parse::<Decimal>().unwrap());
        assert_eq!(product.image, "https://cdn.example/shoes/trail-runner.jpg");
    }

    #[test]
    fn test_stock_level_deserializes() {
        let stock: StockLevel = serde_json::from_str(r#"{"amount": 3}"#).unwrap();
        assert_eq!(stock.amount, 3);

        let stock: StockLevel = serde_json::from_str(r#"{"amount": 0}"#).unwrap();
        assert_eq!(stock.amount, 0);
    }
}
