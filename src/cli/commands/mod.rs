pub mod admin;
pub mod db;
pub mod import;
pub mod server;
