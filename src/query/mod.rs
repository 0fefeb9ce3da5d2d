//! Read path: filter predicates, ordering, the fluent builder and the
//! `{ data, error }` envelope.

mod builder;
mod filter;
mod params;
mod response;
mod sorter;

pub use builder::{OrderOptions, QueryBuilder, Shape};
pub use filter::{values_equal, FilterExpr, FilterOperator};
pub use params::{OrderBy, QueryParamError, QueryParamResult, QueryParams};
pub use response::{Data, Response};
pub use sorter::{collate, compare_values, RowSorter};
