pub mod engine;
pub mod guidance;
pub mod notifications;
pub mod portfolio;
pub mod signals;
pub mod simulation;
