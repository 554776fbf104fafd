pub mod discovery;
pub mod factory;
pub mod postman;
pub mod services;

pub use services::{build_services, Services};
