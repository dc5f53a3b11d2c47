pub mod page;
pub mod row;
