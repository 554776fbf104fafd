pub mod error;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;

pub use state::AppState;
