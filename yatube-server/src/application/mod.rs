pub mod auth_service;
pub mod group_service;
pub mod listing;
pub mod ownership;
pub mod pagination;
pub mod post_service;
