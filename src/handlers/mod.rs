// handlers/mod.rs - Two-tier handler layout
//
// Public (no auth) → Protected (bearer token, per-route validation policy)

pub mod protected;
pub mod public;
