//! Yatube: a small blogging service. Users write posts, optionally file them
//! under a group, and browse paginated feeds by group or author.

pub mod application;
pub mod data;
pub mod domain;
pub mod infrastructure;
pub mod presentation;
pub mod server;
