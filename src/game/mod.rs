pub mod card;
pub mod choice;
pub mod game_coordinator;
pub mod registry;
pub mod session;
pub mod state_broadcaster;

/// Identity handed out by the session registry, starting at 1.
pub type PlayerId = u32;
