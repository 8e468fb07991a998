//! Product domain models: products, categories, inventories, discounts, and
//! the query criteria/sort types the catalog engine accepts.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use mossberry_core::{CategoryId, DiscountId, InventoryId, ProductId};

/// How a product image may be cropped when it doesn't fit its frame.
///
/// Stored as lowercase text; unknown stored values surface as data
/// corruption rather than silently defaulting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ImageCompromise {
    /// Crop horizontally, preserve full height.
    Horizontal,
    /// Crop vertically, preserve full width.
    Vertical,
    /// Let the renderer pick.
    #[default]
    Auto,
    /// Never crop; letterbox instead.
    Never,
}

/// Error for an unrecognized stored image-compromise value.
#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown image compromise value: {0}")]
pub struct ImageCompromiseError(pub String);

impl ImageCompromise {
    /// Parse the stored text form.
    ///
    /// # Errors
    ///
    /// Returns [`ImageCompromiseError`] for anything other than
    /// `horizontal`, `vertical`, `auto`, or `never`.
    pub fn parse(s: &str) -> Result<Self, ImageCompromiseError> {
        match s {
            "horizontal" => Ok(Self::Horizontal),
            "vertical" => Ok(Self::Vertical),
            "auto" => Ok(Self::Auto),
            "never" => Ok(Self::Never),
            other => Err(ImageCompromiseError(other.to_owned())),
        }
    }

    /// The text form persisted in the store.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Horizontal => "horizontal",
            Self::Vertical => "vertical",
            Self::Auto => "auto",
            Self::Never => "never",
        }
    }
}

/// A product category. Referenced by products via a nullable foreign key;
/// deleting a category nulls the reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductCategory {
    /// Unique category ID.
    pub id: CategoryId,
    /// Display name.
    pub name: String,
    /// Free-text description.
    pub description: String,
}

/// Stock on hand for a product. One-to-one-ish with a product via a
/// nullable foreign key; absence means "untracked".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductInventory {
    /// Unique inventory ID.
    pub id: InventoryId,
    /// Units on hand. Expected non-negative; not enforced by the store.
    pub quantity: i32,
}

/// A discount that may apply to any number of products.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Discount {
    /// Unique discount ID.
    pub id: DiscountId,
    /// Display name.
    pub name: String,
    /// Free-text description.
    pub description: String,
    /// Percentage off, 0-100.
    pub discount_percent: Decimal,
    /// Whether the discount is currently active.
    pub is_active: bool,
}

/// A fully hydrated product: the row itself plus its resolved optional
/// associations. Absence of an association means uncategorized / untracked /
/// undiscounted respectively.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    /// Unique product ID.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Free-text description.
    pub description: String,
    /// Stock-keeping unit, unique across the catalog.
    pub sku: String,
    /// Unit price.
    pub price: Decimal,
    /// Image location.
    pub image_url: String,
    /// Image cropping policy.
    pub image_compromise: ImageCompromise,
    /// Resolved category, when assigned.
    pub category: Option<ProductCategory>,
    /// Resolved inventory record, when tracked.
    pub inventory: Option<ProductInventory>,
    /// Resolved discount, when assigned.
    pub discount: Option<Discount>,
    /// When the row was created.
    pub created_at: DateTime<Utc>,
    /// When the row was last touched (store-side trigger).
    pub modified_at: DateTime<Utc>,
}

/// Fields for creating a product. The store assigns the ID.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub sku: String,
    pub price: Decimal,
    pub image_url: String,
    pub image_compromise: ImageCompromise,
    pub category_id: Option<CategoryId>,
    pub inventory_id: Option<InventoryId>,
    pub discount_id: Option<DiscountId>,
}

/// Full overwrite of a product's mutable fields (last-writer-wins; the
/// catalog carries no concurrency token).
#[derive(Debug, Clone)]
pub struct ProductChanges {
    pub name: String,
    pub description: String,
    pub sku: String,
    pub price: Decimal,
    pub image_url: String,
    pub image_compromise: ImageCompromise,
    pub category_id: Option<CategoryId>,
    pub inventory_id: Option<InventoryId>,
    pub discount_id: Option<DiscountId>,
}

/// Filter criteria for catalog queries.
///
/// The price bounds are always applied (`price BETWEEN min AND max`,
/// inclusive both ends); callers wanting an unbounded range use the
/// defaults. Keyword matching is a case-insensitive substring match on the
/// product name.
#[derive(Debug, Clone)]
pub struct ProductCriteria {
    /// Restrict to one category when set; otherwise products with and
    /// without a category both match.
    pub category: Option<CategoryId>,
    /// Case-insensitive substring of the product name.
    pub keyword: Option<String>,
    /// Inclusive lower price bound.
    pub min_price: Decimal,
    /// Inclusive upper price bound.
    pub max_price: Decimal,
}

impl Default for ProductCriteria {
    fn default() -> Self {
        Self {
            category: None,
            keyword: None,
            min_price: Decimal::ZERO,
            max_price: Decimal::MAX,
        }
    }
}

/// Orderings the catalog engine can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductSort {
    /// Most recently created first.
    Newest,
    /// Oldest first.
    Oldest,
    /// Lowest price first.
    Cheapest,
    /// Highest price first.
    MostExpensive,
    /// Total order-item quantity sold, descending. Products with no sales
    /// still appear, with an implicit total of zero.
    Bestsellers,
    /// Discount percent descending. Products without a discount are
    /// excluded entirely.
    TopDiscounted,
    /// Relevance proxy for keyword searches: shortest matching name first.
    SearchRelevance,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_compromise_parse_roundtrip() {
        for v in [
            ImageCompromise::Horizontal,
            ImageCompromise::Vertical,
            ImageCompromise::Auto,
            ImageCompromise::Never,
        ] {
            assert_eq!(ImageCompromise::parse(v.as_str()).unwrap(), v);
        }
    }

    #[test]
    fn test_image_compromise_rejects_unknown() {
        assert!(ImageCompromise::parse("diagonal").is_err());
        assert!(ImageCompromise::parse("").is_err());
        // Stored form is lowercase only.
        assert!(ImageCompromise::parse("Auto").is_err());
    }

    #[test]
    fn test_criteria_default_is_unbounded() {
        let criteria = ProductCriteria::default();
        assert!(criteria.category.is_none());
        assert!(criteria.keyword.is_none());
        assert_eq!(criteria.min_price, Decimal::ZERO);
        assert_eq!(criteria.max_price, Decimal::MAX);
    }
}
