//! View models shared by list and detail pages.

pub mod data_table;
pub mod detail;
pub mod shell;

pub use data_table::{DataTable, FilterTab, PageLink, PaginationView};
pub use detail::Detail;
pub use shell::{NavItem, Shell};
