//! Blockwright - blueprint-driven construction for autonomous block agents

pub mod blueprint;
pub mod core;
pub mod engine;
pub mod world;
