// handlers/protected/mod.rs - Protected handlers (bearer token required)
//
// Each route is wrapped in `middleware::auth_middleware` with the policy it
// needs, so handlers can read an `AuthContext` from the request extensions.

pub mod admin;
pub mod knowledge_base;
pub mod student;
pub mod study_program;
pub mod university;
pub mod upload;
