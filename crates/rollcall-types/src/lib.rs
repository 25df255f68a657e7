pub mod api;
pub mod ids;
pub mod interaction;
pub mod models;
pub mod slack;
