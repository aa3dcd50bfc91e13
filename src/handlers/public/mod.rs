// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Token acquisition and liveness only. Everything else sits behind the
// bearer-token gate in `handlers::protected`.

pub mod admin;
pub mod health;

pub use admin::login;
pub use health::health;
