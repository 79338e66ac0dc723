//! Search layer.
//!
//! - **[`query`]**: search specification and lenient query-string parsing.
//! - **[`filter`]**: text, category, brand and price predicates.
//! - **[`collate`]**: locale-aware name ordering.
//! - **[`sort`]**: stable, direction-aware sorting by name, price, rating or date.
//! - **[`paginate`]**: page slicing and pagination metadata.
//! - **[`facets`]**: whole-store category/brand/price summary.
//! - **[`engine`]**: the pipeline tying the above together.

pub mod collate;
pub mod engine;
pub mod facets;
pub mod filter;
pub mod paginate;
pub mod query;
pub mod sort;

pub use engine::{SearchEngine, SearchResult};
pub use query::{SearchSpecification, SortKey, SortOrder};
