pub mod logger;
pub mod user;
pub mod visitor;
