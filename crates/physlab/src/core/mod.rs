pub mod history;
pub mod rng;
pub mod scheduler;
pub mod simulation;
pub mod time;
