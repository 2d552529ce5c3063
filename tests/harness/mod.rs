//! Integration test harness
//!
//! `TestServer` spawns the actual encounterd binary on a random port with a
//! temporary snapshot directory, exercising the complete server including
//! CLI parsing. Each instance is fully isolated and cleaned up on drop.

mod server;

pub use server::TestServer;
