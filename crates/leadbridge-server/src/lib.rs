pub mod config;
pub mod handlers;
pub mod observability;
pub mod routes;
pub mod state;
pub mod tokens;

pub use config::{AppConfig, load_config};
pub use routes::build_router;
pub use state::AppState;
pub use tokens::StaticTokenProvider;
