pub mod browser;
pub mod folders;
pub mod store;
