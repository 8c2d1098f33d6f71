//! Command implementations

pub mod health;
pub mod replay;
pub mod reward;
pub mod verify;
