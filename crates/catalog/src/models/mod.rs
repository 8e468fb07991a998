//! Domain models for the catalog database.

pub mod post;
pub mod product;
pub mod visitor;

pub use post::{NewPost, Post, PostChanges};
pub use product::{
    Discount, ImageCompromise, ImageCompromiseError, NewProduct, Product, ProductCategory,
    ProductChanges, ProductCriteria, ProductInventory, ProductSort,
};
pub use visitor::{PageView, VisitorSession};
