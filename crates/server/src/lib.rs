pub mod routes;
pub mod startup;
pub mod state;
pub mod errors;
pub mod openapi;
pub mod shutdown;

pub use startup::run;
pub use state::ServerState;
