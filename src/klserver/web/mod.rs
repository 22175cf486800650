pub mod handlers;
pub mod page;
pub mod server;

pub use handlers::AppState;
pub use server::{build_router, serve, start_web_server};
