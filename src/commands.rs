pub mod merchants;
pub mod summary;
pub mod transactions;
