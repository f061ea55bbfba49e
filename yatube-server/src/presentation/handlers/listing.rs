use crate::application::listing::{Listing, ListingContext, ListingScope, ListingService};
use crate::application::pagination::PageNumber;
use crate::domain::error::DomainError;
use crate::presentation::dto::{AuthorResponse, ListingResponse, PageQuery};
use crate::presentation::utils::request_id;
use actix_web::{HttpRequest, HttpResponse, get, web};
use tracing::info;

fn render(listing: Listing) -> HttpResponse {
    let (group, author) = match listing.context {
        ListingContext::All => (None, None),
        ListingContext::Group(group) => (Some(group), None),
        ListingContext::Author(user) => (None, Some(AuthorResponse::from(user))),
    };
    HttpResponse::Ok().json(ListingResponse {
        group,
        author,
        page_obj: listing.page,
    })
}

async fn list(
    req: &HttpRequest,
    listing: &ListingService,
    scope: ListingScope,
    query: &PageQuery,
) -> Result<HttpResponse, DomainError> {
    let number = PageNumber::parse(query.page.as_deref());
    let result = listing.list(scope, number).await?;

    info!(
        request_id = %request_id(req),
        page = number.get(),
        page_size = listing.page_size().get(),
        returned = result.page.len(),
        "posts retrieved"
    );

    Ok(render(result))
}

#[get("/")]
async fn index(
    req: HttpRequest,
    listing: web::Data<ListingService>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse, DomainError> {
    list(&req, &listing, ListingScope::AllPosts, &query).await
}

#[get("/group/{slug}/")]
async fn group_posts(
    req: HttpRequest,
    listing: web::Data<ListingService>,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse, DomainError> {
    let scope = ListingScope::PostsInGroup(path.into_inner());
    list(&req, &listing, scope, &query).await
}

#[get("/profile/{username}/")]
async fn profile(
    req: HttpRequest,
    listing: web::Data<ListingService>,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse, DomainError> {
    let scope = ListingScope::PostsByAuthor(path.into_inner());
    list(&req, &listing, scope, &query).await
}
