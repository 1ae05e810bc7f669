pub mod models;
pub mod sentiment;
