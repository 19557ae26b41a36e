pub mod error;
pub mod topictree;
