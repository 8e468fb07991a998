//! Product repository: the catalog query engine.
//!
//! Answers "give me a page of products matching {category, price range,
//! keyword}, ordered by {criterion}" without loading the full catalog, plus
//! product CRUD. Filter predicates are composed at runtime with
//! [`sqlx::QueryBuilder`]; every bound value goes through `push_bind`.
//!
//! Result pages are hydrated in two steps: the page query returns bare rows,
//! then category/inventory/discount sub-records are resolved with one
//! batched `id = ANY($1)` fetch per association, preserving the nullable
//! semantics (a null FK stays `None`).

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, QueryBuilder};

use mossberry_core::ProductId;

use super::{
    CategoryRepository, DiscountRepository, InventoryRepository, RepositoryError, clamp_page,
    escape_like,
};
use crate::models::{
    Discount, ImageCompromise, NewProduct, Product, ProductCategory, ProductChanges,
    ProductCriteria, ProductInventory, ProductSort,
};

/// Columns selected for every product page, qualified with the `p` alias.
const PRODUCT_COLUMNS: &str = "p.id, p.name, p.description, p.sku, p.price, p.image_url, \
     p.image_compromise, p.category_id, p.inventory_id, p.discount_id, \
     p.created_at, p.modified_at";

/// Internal row type for product queries.
#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: i32,
    name: String,
    description: String,
    sku: String,
    price: Decimal,
    image_url: String,
    image_compromise: String,
    category_id: Option<i32>,
    inventory_id: Option<i32>,
    discount_id: Option<i32>,
    created_at: DateTime<Utc>,
    modified_at: DateTime<Utc>,
}

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Query a page of hydrated products matching `criteria`, ordered by
    /// `sort`, starting at `start_index` (clamped to 0) with at most `range`
    /// results. A non-positive `range` yields an empty page without a store
    /// round-trip.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails, or
    /// `RepositoryError::DataCorruption` if a stored row fails to map.
    pub async fn query(
        &self,
        criteria: &ProductCriteria,
        sort: ProductSort,
        start_index: i64,
        range: i64,
    ) -> Result<Vec<Product>, RepositoryError> {
        let Some((offset, limit)) = clamp_page(start_index, range) else {
            return Ok(Vec::new());
        };

        let mut builder = page_query(criteria, sort);
        builder.push(" LIMIT ");
        builder.push_bind(limit);
        builder.push(" OFFSET ");
        builder.push_bind(offset);

        let rows: Vec<ProductRow> = builder.build_query_as().fetch_all(self.pool).await?;
        self.hydrate(rows).await
    }

    /// Total number of products matching `criteria` (same predicate as
    /// [`query`](Self::query), no ordering), for pagination UI.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self, criteria: &ProductCriteria) -> Result<i64, RepositoryError> {
        let mut builder = QueryBuilder::new("SELECT COUNT(*) FROM products p");
        push_predicate(&mut builder, criteria);
        let count: i64 = builder.build_query_scalar().fetch_one(self.pool).await?;
        Ok(count)
    }

    /// Get a single hydrated product by ID. Absence is `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails, or
    /// `RepositoryError::DataCorruption` if the stored row fails to map.
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row: Option<ProductRow> = sqlx::query_as(
            "SELECT id, name, description, sku, price, image_url, image_compromise, \
             category_id, inventory_id, discount_id, created_at, modified_at \
             FROM products WHERE id = $1",
        )
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        match row {
            Some(row) => Ok(self.hydrate(vec![row]).await?.into_iter().next()),
            None => Ok(None),
        }
    }

    /// Whether a product with this ID exists.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn exists(&self, id: ProductId) -> Result<bool, RepositoryError> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM products WHERE id = $1)")
            .bind(id.as_i32())
            .fetch_one(self.pool)
            .await?;
        Ok(exists)
    }

    /// Create a product. The store assigns the ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the SKU already exists, and
    /// `RepositoryError::Database` for other database errors.
    pub async fn create(&self, product: &NewProduct) -> Result<Product, RepositoryError> {
        let row: ProductRow = sqlx::query_as(
            "INSERT INTO products \
             (name, description, sku, price, image_url, image_compromise, \
              category_id, inventory_id, discount_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING id, name, description, sku, price, image_url, image_compromise, \
                       category_id, inventory_id, discount_id, created_at, modified_at",
        )
        .bind(&product.name)
        .bind(&product.description)
        .bind(&product.sku)
        .bind(product.price)
        .bind(&product.image_url)
        .bind(product.image_compromise.as_str())
        .bind(product.category_id.map(|c| c.as_i32()))
        .bind(product.inventory_id.map(|i| i.as_i32()))
        .bind(product.discount_id.map(|d| d.as_i32()))
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict("sku already exists".to_owned());
            }
            tracing::error!(error = %e, "product insert failed");
            RepositoryError::Database(e)
        })?;

        self.hydrate(vec![row])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| RepositoryError::DataCorruption("insert returned no row".to_owned()))
    }

    /// Overwrite all mutable fields of a product (last-writer-wins).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist,
    /// `RepositoryError::Conflict` on a duplicate SKU, and
    /// `RepositoryError::Database` for other database errors.
    pub async fn update(
        &self,
        id: ProductId,
        changes: &ProductChanges,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE products SET \
             name = $2, description = $3, sku = $4, price = $5, image_url = $6, \
             image_compromise = $7, category_id = $8, inventory_id = $9, discount_id = $10 \
             WHERE id = $1",
        )
        .bind(id.as_i32())
        .bind(&changes.name)
        .bind(&changes.description)
        .bind(&changes.sku)
        .bind(changes.price)
        .bind(&changes.image_url)
        .bind(changes.image_compromise.as_str())
        .bind(changes.category_id.map(|c| c.as_i32()))
        .bind(changes.inventory_id.map(|i| i.as_i32()))
        .bind(changes.discount_id.map(|d| d.as_i32()))
        .execute(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict("sku already exists".to_owned());
            }
            tracing::error!(error = %e, product_id = %id, "product update failed");
            RepositoryError::Database(e)
        })?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Hard-delete a product.
    ///
    /// # Returns
    ///
    /// Returns `true` if the product was deleted, `false` if it didn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: ProductId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id.as_i32())
            .execute(self.pool)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, product_id = %id, "product delete failed");
                RepositoryError::Database(e)
            })?;

        Ok(result.rows_affected() > 0)
    }

    /// Resolve sub-records for a page of rows with one batched fetch per
    /// association, then map rows to domain products.
    async fn hydrate(&self, rows: Vec<ProductRow>) -> Result<Vec<Product>, RepositoryError> {
        let categories = CategoryRepository::new(self.pool)
            .map_by_ids(&collect_ids(&rows, |r| r.category_id))
            .await?;
        let inventories = InventoryRepository::new(self.pool)
            .map_by_ids(&collect_ids(&rows, |r| r.inventory_id))
            .await?;
        let discounts = DiscountRepository::new(self.pool)
            .map_by_ids(&collect_ids(&rows, |r| r.discount_id))
            .await?;

        rows.into_iter()
            .map(|row| to_product(row, &categories, &inventories, &discounts))
            .collect()
    }
}

/// Unique non-null association IDs across a page, in first-seen order.
fn collect_ids(rows: &[ProductRow], f: impl Fn(&ProductRow) -> Option<i32>) -> Vec<i32> {
    let mut ids = Vec::new();
    for row in rows {
        if let Some(id) = f(row)
            && !ids.contains(&id)
        {
            ids.push(id);
        }
    }
    ids
}

fn to_product(
    row: ProductRow,
    categories: &HashMap<i32, ProductCategory>,
    inventories: &HashMap<i32, ProductInventory>,
    discounts: &HashMap<i32, Discount>,
) -> Result<Product, RepositoryError> {
    let image_compromise = ImageCompromise::parse(&row.image_compromise).map_err(|e| {
        RepositoryError::DataCorruption(format!("product {}: {e}", row.id))
    })?;

    Ok(Product {
        id: ProductId::new(row.id),
        name: row.name,
        description: row.description,
        sku: row.sku,
        price: row.price,
        image_url: row.image_url,
        image_compromise,
        category: row.category_id.and_then(|id| categories.get(&id).cloned()),
        inventory: row.inventory_id.and_then(|id| inventories.get(&id).cloned()),
        discount: row.discount_id.and_then(|id| discounts.get(&id).cloned()),
        created_at: row.created_at,
        modified_at: row.modified_at,
    })
}

/// Build the page query for `criteria` + `sort`, without the LIMIT/OFFSET
/// tail. Bestsellers joins an order-item aggregate (LEFT, so zero-sales
/// products keep appearing); TopDiscounted inner-joins the discount table,
/// excluding undiscounted products.
fn page_query(criteria: &ProductCriteria, sort: ProductSort) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new(format!("SELECT {PRODUCT_COLUMNS} FROM products p"));

    match sort {
        ProductSort::Bestsellers => {
            builder.push(
                " LEFT JOIN (SELECT product_id, SUM(quantity) AS units_sold \
                 FROM order_items GROUP BY product_id) sales ON sales.product_id = p.id",
            );
        }
        ProductSort::TopDiscounted => {
            builder.push(" INNER JOIN discounts d ON d.id = p.discount_id");
        }
        _ => {}
    }

    push_predicate(&mut builder, criteria);
    builder.push(order_by(sort));
    builder
}

/// Append the shared `WHERE` predicate: inclusive price bounds always, then
/// category equality and escaped case-insensitive keyword match when given.
fn push_predicate(builder: &mut QueryBuilder<'static, Postgres>, criteria: &ProductCriteria) {
    builder.push(" WHERE p.price BETWEEN ");
    builder.push_bind(criteria.min_price);
    builder.push(" AND ");
    builder.push_bind(criteria.max_price);

    if let Some(category) = criteria.category {
        builder.push(" AND p.category_id = ");
        builder.push_bind(category.as_i32());
    }

    if let Some(keyword) = &criteria.keyword {
        builder.push(" AND p.name ILIKE ");
        builder.push_bind(format!("%{}%", escape_like(keyword)));
    }
}

/// The ORDER BY tail for each sort mode. Product ID breaks ties so
/// fixed-criteria pages are stable and non-overlapping.
const fn order_by(sort: ProductSort) -> &'static str {
    match sort {
        ProductSort::Newest => " ORDER BY p.created_at DESC, p.id DESC",
        ProductSort::Oldest => " ORDER BY p.created_at ASC, p.id ASC",
        ProductSort::Cheapest => " ORDER BY p.price ASC, p.id ASC",
        ProductSort::MostExpensive => " ORDER BY p.price DESC, p.id ASC",
        ProductSort::Bestsellers => " ORDER BY COALESCE(sales.units_sold, 0) DESC, p.id ASC",
        ProductSort::TopDiscounted => " ORDER BY d.discount_percent DESC, p.id ASC",
        ProductSort::SearchRelevance => " ORDER BY length(p.name) ASC, p.id ASC",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mossberry_core::CategoryId;

    fn sql_for(criteria: &ProductCriteria, sort: ProductSort) -> String {
        page_query(criteria, sort).into_sql()
    }

    #[test]
    fn test_price_predicate_always_present() {
        let sql = sql_for(&ProductCriteria::default(), ProductSort::Newest);
        assert!(sql.contains("p.price BETWEEN"));
        assert!(!sql.contains("category_id ="));
        assert!(!sql.contains("ILIKE"));
    }

    #[test]
    fn test_category_and_keyword_combine_with_and() {
        let criteria = ProductCriteria {
            category: Some(CategoryId::new(3)),
            keyword: Some("mug".to_owned()),
            ..ProductCriteria::default()
        };
        let sql = sql_for(&criteria, ProductSort::Cheapest);
        assert!(sql.contains("AND p.category_id ="));
        assert!(sql.contains("AND p.name ILIKE"));
    }

    #[test]
    fn test_bestsellers_uses_outer_join() {
        let sql = sql_for(&ProductCriteria::default(), ProductSort::Bestsellers);
        assert!(sql.contains("LEFT JOIN"));
        assert!(sql.contains("SUM(quantity)"));
        assert!(sql.contains("COALESCE(sales.units_sold, 0) DESC"));
    }

    #[test]
    fn test_top_discounted_excludes_undiscounted() {
        let sql = sql_for(&ProductCriteria::default(), ProductSort::TopDiscounted);
        assert!(sql.contains("INNER JOIN discounts"));
        assert!(sql.contains("d.discount_percent DESC"));
    }

    #[test]
    fn test_search_relevance_orders_by_name_length() {
        let sql = sql_for(&ProductCriteria::default(), ProductSort::SearchRelevance);
        assert!(sql.contains("length(p.name) ASC"));
    }

    #[test]
    fn test_sort_directions() {
        assert!(order_by(ProductSort::Newest).contains("created_at DESC"));
        assert!(order_by(ProductSort::Oldest).contains("created_at ASC"));
        assert!(order_by(ProductSort::Cheapest).contains("price ASC"));
        assert!(order_by(ProductSort::MostExpensive).contains("price DESC"));
    }

    #[test]
    fn test_collect_ids_dedupes_and_skips_null() {
        let base = ProductRow {
            id: 1,
            name: String::new(),
            description: String::new(),
            sku: String::new(),
            price: Decimal::ZERO,
            image_url: String::new(),
            image_compromise: "auto".to_owned(),
            category_id: None,
            inventory_id: None,
            discount_id: None,
            created_at: Utc::now(),
            modified_at: Utc::now(),
        };
        let rows = vec![
            ProductRow { category_id: Some(2), ..clone_row(&base) },
            ProductRow { category_id: None, ..clone_row(&base) },
            ProductRow { category_id: Some(2), ..clone_row(&base) },
            ProductRow { category_id: Some(5), ..clone_row(&base) },
        ];
        assert_eq!(collect_ids(&rows, |r| r.category_id), vec![2, 5]);
    }

    fn clone_row(row: &ProductRow) -> ProductRow {
        ProductRow {
            id: row.id,
            name: row.name.clone(),
            description: row.description.clone(),
            sku: row.sku.clone(),
            price: row.price,
            image_url: row.image_url.clone(),
            image_compromise: row.image_compromise.clone(),
            category_id: row.category_id,
            inventory_id: row.inventory_id,
            discount_id: row.discount_id,
            created_at: row.created_at,
            modified_at: row.modified_at,
        }
    }
}
