mod database {
    pub mod actions;
    pub mod error;
    pub mod form;
    pub mod memory;
    pub mod schema;
    pub mod store;
}
mod authentication {
    pub mod cryptography;
    pub mod jwt;
    pub mod middleware;
    pub mod registration;
}
mod api {
    pub mod attributes;
    pub mod context;
    pub mod recipes;
    pub mod rejection;
    pub mod server;
    pub mod users;
}
pub mod config;
mod constants;
pub mod validation;

pub use database::actions::PgStore;
pub use api::*;
pub use authentication::*;
pub use constants::*;
pub use database::*;
