use axum::{
    extract::{Path, Query, State},
    middleware,
    response::IntoResponse,
    routing::{delete, get, patch, post},
    Json,
};
use http::StatusCode;
use libris_dal::{
    book::{Book, BookPatch, BookRepository, CreateBook, Isbn13, YearRangeRequest},
    messages,
    rating::{RateRequest, RatingSet, RatingSummary},
    validation::current_year,
    Error,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    auth::token::require_token, error::ApiResult, repository_from_request,
    rest_api::{Page, Paging},
    state::AppState,
    validate::{Garde, Payload},
};

repository_from_request!(BookRepository);

const MIN_SEARCH_YEAR: i32 = 1000;

#[derive(Debug, Serialize, Deserialize)]
pub struct RatingsUpdated {
    pub message: String,
    pub ratings: RatingSummary,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BookDeleted {
    pub message: String,
    pub book: Book,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BooksDeleted {
    pub message: String,
    pub count: usize,
    pub books: Vec<Book>,
}

fn parse_isbn(isbn: &str) -> ApiResult<Isbn13> {
    Ok(isbn.parse::<Isbn13>()?)
}

fn search_text<'a>(value: &'a str, invalid: &str) -> ApiResult<&'a str> {
    let value = value.trim();
    if value.is_empty() {
        return Err(Error::InvalidInput(invalid.to_string()).into());
    }
    Ok(value)
}

fn search_year(year: &str) -> ApiResult<i32> {
    year.trim()
        .parse::<i32>()
        .ok()
        .filter(|y| (MIN_SEARCH_YEAR..=current_year()).contains(y))
        .ok_or_else(|| Error::InvalidInput(messages::INVALID_SEARCH_YEAR.to_string()).into())
}

fn search_rating(rating: &str) -> ApiResult<f64> {
    rating
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|r| (1.0..=5.0).contains(r))
        .ok_or_else(|| Error::InvalidInput(messages::INVALID_SEARCH_RATING.to_string()).into())
}

fn found(books: Vec<Book>) -> ApiResult<Json<Vec<Book>>> {
    if books.is_empty() {
        return Err(Error::RecordNotFound(messages::NO_BOOKS_FOUND.to_string()).into());
    }
    Ok(Json(books))
}

pub async fn create(
    repository: BookRepository,
    Garde(Payload(payload)): Garde<Payload<CreateBook>>,
) -> ApiResult<impl IntoResponse> {
    let book = repository.create(payload).await?;
    debug!(isbn = book.isbn13, "{}", messages::BOOK_CREATED);
    Ok((StatusCode::CREATED, Json(book)))
}

pub async fn list(
    repository: BookRepository,
    State(state): State<AppState>,
    Query(paging): Query<Paging>,
) -> ApiResult<impl IntoResponse> {
    let params = paging.into_listing_params(state.get_app_config().default_page_size);
    let batch = repository.list(params).await?;
    Ok(Json(Page::from(batch)))
}

pub async fn get_by_isbn(
    Path(isbn): Path<String>,
    repository: BookRepository,
) -> ApiResult<impl IntoResponse> {
    let book = repository.get(parse_isbn(&isbn)?).await?;
    Ok(Json(book))
}

pub async fn find_by_author(
    Path(author): Path<String>,
    repository: BookRepository,
) -> ApiResult<impl IntoResponse> {
    let author = search_text(&author, messages::INVALID_AUTHOR)?;
    found(repository.find_by_author(author).await?)
}

pub async fn find_by_title(
    Path(title): Path<String>,
    repository: BookRepository,
) -> ApiResult<impl IntoResponse> {
    let title = search_text(&title, messages::INVALID_TITLE)?;
    found(repository.find_by_title(title).await?)
}

pub async fn find_by_year(
    Path(year): Path<String>,
    repository: BookRepository,
) -> ApiResult<impl IntoResponse> {
    found(repository.find_by_year(search_year(&year)?).await?)
}

pub async fn find_by_rating(
    Path(rating): Path<String>,
    repository: BookRepository,
) -> ApiResult<impl IntoResponse> {
    found(repository.find_by_rating(search_rating(&rating)?).await?)
}

pub async fn rate(
    Path(isbn): Path<String>,
    repository: BookRepository,
    Payload(request): Payload<RateRequest>,
) -> ApiResult<impl IntoResponse> {
    let isbn = parse_isbn(&isbn)?;
    let star = request.star()?;
    let ratings = repository.rate(isbn, star, request.change()).await?;
    Ok(Json(RatingsUpdated {
        message: messages::RATINGS_UPDATED.to_string(),
        ratings,
    }))
}

pub async fn set_ratings(
    Path(isbn): Path<String>,
    repository: BookRepository,
    Payload(ratings): Payload<RatingSet>,
) -> ApiResult<impl IntoResponse> {
    let isbn = parse_isbn(&isbn)?;
    let ratings = repository.set_ratings(isbn, &ratings).await?;
    Ok(Json(RatingsUpdated {
        message: messages::RATINGS_UPDATED.to_string(),
        ratings,
    }))
}

pub async fn update(
    Path(isbn): Path<String>,
    repository: BookRepository,
    Payload(patch): Payload<BookPatch>,
) -> ApiResult<impl IntoResponse> {
    let book = repository.update(parse_isbn(&isbn)?, &patch).await?;
    Ok(Json(book))
}

pub async fn delete_by_isbn(
    Path(isbn): Path<String>,
    repository: BookRepository,
) -> ApiResult<impl IntoResponse> {
    let book = repository.delete(parse_isbn(&isbn)?).await?;
    Ok(Json(BookDeleted {
        message: messages::BOOK_DELETED.to_string(),
        book,
    }))
}

pub async fn delete_range(
    repository: BookRepository,
    Payload(request): Payload<YearRangeRequest>,
) -> ApiResult<impl IntoResponse> {
    let range = request.range()?;
    let books = repository.delete_range(range).await?;
    debug!("Deleted {} books published {}-{}", books.len(), range.start, range.end);
    Ok(Json(BooksDeleted {
        message: messages::BOOKS_DELETED.to_string(),
        count: books.len(),
        books,
    }))
}

/// Builds books router, every route requires a valid access token.
pub fn router(state: AppState) -> axum::Router<AppState> {
    axum::Router::new()
        .route("/", post(create))
        .route("/all", get(list))
        .route("/isbn/{isbn}", get(get_by_isbn).delete(delete_by_isbn))
        .route("/author/{author}", get(find_by_author))
        .route("/title/{title}", get(find_by_title))
        .route("/year/{year}", get(find_by_year))
        .route("/rating/{rating}", get(find_by_rating))
        .route("/rate/{isbn}", patch(rate))
        .route("/update/ratings/{isbn}", patch(set_ratings))
        .route("/update/{isbn}", patch(update))
        .route("/range", delete(delete_range))
        .layer(middleware::from_fn_with_state(state, require_token))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_year() {
        assert_eq!(search_year("1999").unwrap(), 1999);
        assert!(search_year("999").is_err());
        assert!(search_year(&(current_year() + 1).to_string()).is_err());
        assert!(search_year("nineteen").is_err());
    }

    #[test]
    fn test_search_rating() {
        assert_eq!(search_rating("4.25").unwrap(), 4.25);
        assert!(search_rating("0.5").is_err());
        assert!(search_rating("5.01").is_err());
        assert!(search_rating("NaN").is_err());
    }

    #[test]
    fn test_search_text() {
        assert_eq!(search_text(" Lee ", messages::INVALID_AUTHOR).unwrap(), "Lee");
        assert!(search_text("  ", messages::INVALID_AUTHOR).is_err());
    }
}
