pub mod config_handlers;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod router;
pub mod server;
pub mod state;

pub use error::{ApiError, Result};
pub use extract::{ApiJson, ApiPath, ApiQuery};
pub use router::create_router;
pub use server::{init_tracing, run_server};
pub use state::{AppState, LiveDashboard};
