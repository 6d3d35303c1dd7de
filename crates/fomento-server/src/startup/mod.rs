//! Server startup: logging, HTTP server, graceful shutdown

pub mod http;
pub mod logging;
pub mod shutdown;

pub use http::api_server;
pub use logging::init_logging;
pub use shutdown::{ShutdownSignal, wait_for_shutdown_signal};
