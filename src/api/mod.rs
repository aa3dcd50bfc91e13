pub mod extract;
pub mod format;
pub mod requests;

pub use extract::JsonBody;
