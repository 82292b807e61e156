// handlers/mod.rs - Handler tiers
//
// Public (no auth) → Protected (bearer JWT required)

pub mod health;
pub mod protected;
pub mod public;
