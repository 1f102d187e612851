//! SQL construction and checking.
//!
//! Nothing in here touches a connection: identifier validation, per-family
//! dialect rules, statement building, the raw SQL guard and the result
//! normalizer are all pure functions over their inputs.

pub mod builder;
pub mod dialect;
pub mod guard;
pub mod identifier;
pub mod normalize;

pub use builder::QueryBuilder;
pub use dialect::{PaginationStrategy, SchemaListing};
pub use guard::authorize;
pub use identifier::{IdentifierKind, validate_identifier};
