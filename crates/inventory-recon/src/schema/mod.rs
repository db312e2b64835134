//! Column roles and header-based column resolution.

mod resolver;
mod role;

pub use resolver::{
    ColumnResolver, ReferenceColumns, ResolvedColumn, TargetColumns, resolve_roles,
};
pub use role::{ColumnRole, TableSide};
