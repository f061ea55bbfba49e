use actix_web::web;

pub mod auth;
pub mod listing;
pub mod post;

/// Registers every public route. Services are expected as app data.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(auth::scope())
        .service(listing::index)
        .service(listing::group_posts)
        .service(listing::profile)
        .service(post::post_create_form)
        .service(post::post_create)
        .service(post::post_edit_form)
        .service(post::post_edit)
        .service(post::post_detail);
}
