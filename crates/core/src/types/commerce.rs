//! Commerce actions and the products they carry

use crate::constants::PRODUCT_CONTEXT_SCHEMA;
use crate::errors::{Error, Result, Validate};
use crate::types::payload::SelfDescribingJson;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Cart/product lifecycle transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommerceAction {
    Detail,
    Click,
    Add,
    AddToCart,
    Remove,
    Checkout,
    CheckoutOption,
    Purchase,
    Refund,
    Promo,
}

impl CommerceAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommerceAction::Detail => "detail",
            CommerceAction::Click => "click",
            CommerceAction::Add => "add",
            CommerceAction::AddToCart => "add_to_cart",
            CommerceAction::Remove => "remove",
            CommerceAction::Checkout => "checkout",
            CommerceAction::CheckoutOption => "checkout_option",
            CommerceAction::Purchase => "purchase",
            CommerceAction::Refund => "refund",
            CommerceAction::Promo => "promo",
        }
    }
}

impl fmt::Display for CommerceAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CommerceAction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let action = match s.trim().to_ascii_lowercase().as_str() {
            "detail" => CommerceAction::Detail,
            "click" => CommerceAction::Click,
            "add" => CommerceAction::Add,
            "add_to_cart" | "addtocart" => CommerceAction::AddToCart,
            "remove" => CommerceAction::Remove,
            "checkout" => CommerceAction::Checkout,
            "checkout_option" => CommerceAction::CheckoutOption,
            "purchase" => CommerceAction::Purchase,
            "refund" => CommerceAction::Refund,
            "promo" => CommerceAction::Promo,
            other => {
                return Err(Error::validation(
                    "commerce action",
                    format!("unknown action '{other}'"),
                ))
            }
        };
        Ok(action)
    }
}

/// A product in the commerce cart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: Option<String>,
    pub list: Option<String>,
    pub brand: Option<String>,
    pub category: Option<String>,
    pub variant: Option<String>,
    pub price: Option<f64>,
    pub quantity: Option<u32>,
    pub coupon: Option<String>,
    pub position: Option<u32>,
    pub currency: Option<String>,
}

impl Product {
    /// Start building a product with the given id
    pub fn builder(id: impl Into<String>) -> ProductBuilder {
        ProductBuilder::new(id)
    }

    pub fn validate(&self) -> Result<()> {
        Validate::not_empty(&self.id, "product id")?;
        if let Some(price) = self.price {
            Validate::with_predicate(
                price,
                |p| p.is_finite() && *p >= 0.0,
                "product price",
                "must be a finite, non-negative amount",
            )?;
        }
        if let Some(quantity) = self.quantity {
            Validate::in_range(quantity, 1, u32::MAX, "product quantity")?;
        }
        Ok(())
    }

    /// Wire representation; unset attributes are omitted
    pub fn to_value(&self) -> Value {
        let mut map = Map::new();
        map.insert("id".into(), Value::from(self.id.clone()));
        let optional_strings = [
            ("name", &self.name),
            ("list", &self.list),
            ("brand", &self.brand),
            ("category", &self.category),
            ("variant", &self.variant),
        ];
        for (key, value) in optional_strings {
            if let Some(value) = value {
                map.insert(key.into(), Value::from(value.clone()));
            }
        }
        if let Some(price) = self.price {
            map.insert("price".into(), Value::from(price));
        }
        if let Some(quantity) = self.quantity {
            map.insert("quantity".into(), Value::from(quantity));
        }
        if let Some(coupon) = &self.coupon {
            map.insert("coupon".into(), Value::from(coupon.clone()));
        }
        if let Some(position) = self.position {
            map.insert("position".into(), Value::from(position));
        }
        if let Some(currency) = &self.currency {
            map.insert("currency".into(), Value::from(currency.clone()));
        }
        Value::Object(map)
    }

    pub fn to_entity(&self) -> SelfDescribingJson {
        SelfDescribingJson::new(PRODUCT_CONTEXT_SCHEMA, self.to_value())
    }
}

/// Fluent builder for [`Product`]
#[derive(Debug, Clone)]
pub struct ProductBuilder {
    product: Product,
}

impl ProductBuilder {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            product: Product {
                id: id.into(),
                name: None,
                list: None,
                brand: None,
                category: None,
                variant: None,
                price: None,
                quantity: None,
                coupon: None,
                position: None,
                currency: None,
            },
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.product.name = Some(name.into());
        self
    }

    pub fn list(mut self, list: impl Into<String>) -> Self {
        self.product.list = Some(list.into());
        self
    }

    pub fn brand(mut self, brand: impl Into<String>) -> Self {
        self.product.brand = Some(brand.into());
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.product.category = Some(category.into());
        self
    }

    pub fn variant(mut self, variant: impl Into<String>) -> Self {
        self.product.variant = Some(variant.into());
        self
    }

    pub fn price(mut self, price: f64) -> Self {
        self.product.price = Some(price);
        self
    }

    pub fn quantity(mut self, quantity: u32) -> Self {
        self.product.quantity = Some(quantity);
        self
    }

    pub fn coupon(mut self, coupon: impl Into<String>) -> Self {
        self.product.coupon = Some(coupon.into());
        self
    }

    pub fn position(mut self, position: u32) -> Self {
        self.product.position = Some(position);
        self
    }

    pub fn currency(mut self, currency: impl Into<String>) -> Self {
        self.product.currency = Some(currency.into());
        self
    }

    /// Validate and return the product
    pub fn build(self) -> Result<Product> {
        self.product.validate()?;
        Ok(self.product)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_parsing() {
        assert_eq!(
            "purchase".parse::<CommerceAction>().unwrap(),
            CommerceAction::Purchase
        );
        assert_eq!(
            "Detail".parse::<CommerceAction>().unwrap(),
            CommerceAction::Detail
        );
        assert_eq!(
            "add_to_cart".parse::<CommerceAction>().unwrap(),
            CommerceAction::AddToCart
        );
        assert!("teleport".parse::<CommerceAction>().is_err());
    }

    #[test]
    fn test_full_product_serialization() {
        let product = Product::builder("demo-product-123")
            .name("Sample Product")
            .list("featured-products")
            .brand("Demo Brand")
            .category("Electronics")
            .variant("Blue")
            .price(29.99)
            .quantity(1)
            .coupon("SAVE10")
            .position(1)
            .currency("USD")
            .build()
            .unwrap();

        let value = product.to_value();
        assert_eq!(value["id"], "demo-product-123");
        assert_eq!(value["price"], 29.99);
        assert_eq!(value["coupon"], "SAVE10");
        assert_eq!(value.as_object().unwrap().len(), 11);
    }

    #[test]
    fn test_minimal_product_omits_unset_fields() {
        let product = Product::builder("P12345")
            .name("Premium Product")
            .price(29.99)
            .quantity(2)
            .build()
            .unwrap();
        let value = product.to_value();
        assert_eq!(value.as_object().unwrap().len(), 4);
        assert!(value.get("brand").is_none());
    }

    #[test]
    fn test_product_validation() {
        assert!(Product::builder("").build().is_err());
        assert!(Product::builder("p").price(-1.0).build().is_err());
        assert!(Product::builder("p").price(f64::NAN).build().is_err());
        assert!(Product::builder("p").quantity(0).build().is_err());
    }
}
