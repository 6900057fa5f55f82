/// List query building blocks
///
/// - `filter`: trashed selector and search predicate builder
/// - `pagination`: page boundaries and the windowed link list
///
/// Every index page goes through both: the filters produce one WHERE fragment
/// shared by the count and page queries, and the resulting total feeds the
/// pagination engine.

pub mod filter;
pub mod pagination;

pub use filter::{search_condition, ListFilters, PatternOperator, SqlFragment, TrashedFilter};
pub use pagination::{paginate, PageMeta, Paginated, PaginationLink, PER_PAGE};
