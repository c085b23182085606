pub mod actions;
pub mod resolve;
