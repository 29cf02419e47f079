pub mod plan_handlers;
pub mod simulation_handlers;

pub use plan_handlers::*;
pub use simulation_handlers::*;
