use anyhow::{Result, anyhow};
use libris_dal::book::Book;
use reqwest::Url;
use serde_json::json;
use tracing::info;

pub async fn create_book(
    client: &reqwest::Client,
    base_url: &Url,
    isbn: &str,
    title: &str,
    year: i32,
) -> Result<Book> {
    let payload = json!({
        "isbn13": isbn,
        "authors": "Test Author",
        "publication_year": year,
        "original_title": title,
        "title": title,
        "image_url": "https://images.example.com/large.jpg",
        "image_small_url": "https://images.example.com/small.jpg"
    });
    let api_url = base_url.join("books")?;

    let response = client.post(api_url).json(&payload).send().await?;
    info!("Create book response: {:#?}", response);
    if response.status().as_u16() != 201 {
        return Err(anyhow!("Book not created: {}", response.status()));
    }

    let book: Book = response.json().await?;
    Ok(book)
}
