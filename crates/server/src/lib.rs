pub mod cli;
pub use cli::Cli;

mod routes;
pub use routes::app;
