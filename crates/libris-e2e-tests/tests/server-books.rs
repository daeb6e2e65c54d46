use libris_app::rest_api::{
    Page,
    book::{BookDeleted, BooksDeleted, RatingsUpdated},
};
use libris_dal::book::Book;
use libris_e2e_tests::{launch_env, prepare_env, rest::create_book, spawn_server};
use serde_json::{Value, json};
use tracing::info;
use tracing_test::traced_test;

#[tokio::test]
#[traced_test]
async fn test_books_require_token() {
    let (args, _config_guard) = prepare_env("test_books_require_token").await.unwrap();
    let base_url = spawn_server(args).await.unwrap();

    let response = reqwest::Client::new()
        .get(base_url.join("books/all").unwrap())
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 401);
}

#[tokio::test]
#[traced_test]
async fn test_create_and_search() {
    let (args, _config_guard) = prepare_env("test_create_and_search").await.unwrap();
    let (client, base_url) = launch_env(args).await.unwrap();

    create_book(&client, &base_url, "9780000000001", "Alpha Book", 1999)
        .await
        .unwrap();
    create_book(&client, &base_url, "9780000000002", "Beta Book", 2005)
        .await
        .unwrap();
    assert!(
        create_book(&client, &base_url, "9780000000002", "Beta Again", 2005)
            .await
            .is_err()
    );

    let response = client
        .get(base_url.join("books/all?limit=1&offset=1").unwrap())
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
    let page: Page<Book> = response.json().await.unwrap();
    assert_eq!(page.books.len(), 1);
    assert_eq!(page.books[0].title, "Beta Book");
    assert_eq!(page.pagination.total_records, 2);
    assert_eq!(page.pagination.next_page, 2);

    let response = client
        .get(base_url.join("books/isbn/9780000000001").unwrap())
        .send()
        .await
        .unwrap();
    let book: Book = response.json().await.unwrap();
    assert_eq!(book.publication, 1999);

    let response = client
        .get(base_url.join("books/title/alpha").unwrap())
        .send()
        .await
        .unwrap();
    let books: Vec<Book> = response.json().await.unwrap();
    assert_eq!(books.len(), 1);

    let response = client
        .get(base_url.join("books/year/2005").unwrap())
        .send()
        .await
        .unwrap();
    let books: Vec<Book> = response.json().await.unwrap();
    assert_eq!(books[0].title, "Beta Book");

    let response = client
        .get(base_url.join("books/year/3000").unwrap())
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);

    let response = client
        .get(base_url.join("books/author/nobody").unwrap())
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
#[traced_test]
async fn test_ratings() {
    let (args, _config_guard) = prepare_env("test_ratings").await.unwrap();
    let (client, base_url) = launch_env(args).await.unwrap();
    create_book(&client, &base_url, "9780000000003", "Rated Book", 2010)
        .await
        .unwrap();

    let response = client
        .patch(base_url.join("books/update/ratings/9780000000003").unwrap())
        .json(&json!({"rating_1_star": 2, "rating_3_star": 1, "rating_5_star": 3}))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
    let updated: RatingsUpdated = response.json().await.unwrap();
    assert_eq!(updated.ratings.count, 6);
    assert!((updated.ratings.average - 20.0 / 6.0).abs() < 1e-9);

    let response = client
        .patch(base_url.join("books/rate/9780000000003").unwrap())
        .json(&json!({"stars": 5, "remove": true}))
        .send()
        .await
        .unwrap();
    let updated: RatingsUpdated = response.json().await.unwrap();
    assert_eq!(updated.ratings.rating_5, 2);
    assert_eq!(updated.ratings.count, 5);
    assert_eq!(updated.ratings.average, 3.0);

    let response = client
        .get(base_url.join("books/rating/3").unwrap())
        .send()
        .await
        .unwrap();
    let books: Vec<Book> = response.json().await.unwrap();
    assert_eq!(books.len(), 1);

    let response = client
        .patch(base_url.join("books/rate/9780000000003").unwrap())
        .json(&json!({"stars": 2, "remove": true}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);

    let response = client
        .patch(base_url.join("books/rate/9780000000003").unwrap())
        .json(&json!({"stars": 6}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);

    let response = client
        .patch(base_url.join("books/update/ratings/9780000000003").unwrap())
        .json(&json!({"rating_4_star": -1}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["fields"][0]["field"], "rating_4_star");
}

#[tokio::test]
#[traced_test]
async fn test_update_book() {
    let (args, _config_guard) = prepare_env("test_update_book").await.unwrap();
    let (client, base_url) = launch_env(args).await.unwrap();
    create_book(&client, &base_url, "9780000000004", "Old Title", 2000)
        .await
        .unwrap();

    let url = base_url.join("books/update/9780000000004").unwrap();
    let response = client
        .patch(url.clone())
        .json(&json!({"title": "New Title", "publication_year": "2001"}))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
    let book: Book = response.json().await.unwrap();
    assert_eq!(book.title, "New Title");
    assert_eq!(book.publication, 2001);

    let response = client.patch(url.clone()).json(&json!({})).send().await.unwrap();
    assert_eq!(response.status().as_u16(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["code"], "NO_FIELDS_PROVIDED");

    let response = client
        .patch(url)
        .json(&json!({"authors": "", "image_small_url": "ftp://x/y.gif"}))
        .send()
        .await
        .unwrap();
    let body: Value = response.json().await.unwrap();
    info!("Body: {body:#?}");
    assert_eq!(body["code"], "INVALID_FIELDS");
    assert_eq!(body["fields"][0]["field"], "authors");
    assert_eq!(body["fields"][1]["field"], "image_small_url");
}

#[tokio::test]
#[traced_test]
async fn test_delete_books() {
    let (args, _config_guard) = prepare_env("test_delete_books").await.unwrap();
    let (client, base_url) = launch_env(args).await.unwrap();
    for (isbn, title, year) in [
        ("9780000000005", "First", 1990),
        ("9780000000006", "Second", 1995),
        ("9780000000007", "Third", 2015),
    ] {
        create_book(&client, &base_url, isbn, title, year)
            .await
            .unwrap();
    }

    let range_url = base_url.join("books/range").unwrap();
    let response = client
        .delete(range_url.clone())
        .json(&json!({"startYear": 1900, "endYear": 1950}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 404);

    let response = client
        .delete(range_url.clone())
        .json(&json!({"startYear": 2000, "endYear": 1990}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);

    let response = client
        .delete(range_url)
        .json(&json!({"startYear": 1990, "endYear": "1999"}))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
    let deleted: BooksDeleted = response.json().await.unwrap();
    assert_eq!(deleted.count, 2);

    let isbn_url = base_url.join("books/isbn/9780000000007").unwrap();
    let response = client.delete(isbn_url.clone()).send().await.unwrap();
    let deleted: BookDeleted = response.json().await.unwrap();
    assert_eq!(deleted.book.title, "Third");

    let response = client.delete(isbn_url).send().await.unwrap();
    assert_eq!(response.status().as_u16(), 404);
}
