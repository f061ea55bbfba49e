pub mod error;
pub mod group;
pub mod post;
pub mod user;
