use std::{fmt::Display, str::FromStr};

use garde::Validate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::{Pool, Row};
use tracing::{debug, error};

use crate::{
    Batch, ChosenDB, ChosenRow, ListingParams,
    error::{Error, FieldError, Result},
    messages,
    rating::{Histogram, RatingChange, RatingSet, RatingSummary, Star},
    validation::{
        is_string_provided, is_valid_image_url, is_valid_isbn, is_valid_publication_year,
        publication_year,
    },
};

const MAX_RATING_ATTEMPTS: usize = 100;

/// Escapes LIKE wildcards so `text` matches literally.
fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

const BOOK_COLUMNS: &str = "isbn13, authors, publication_year, original_title, title, \
    rating_avg, rating_count, rating_1_star, rating_2_star, rating_3_star, rating_4_star, \
    rating_5_star, image_url, image_small_url";

/// ISBN-13 identifying a book, kept as its integer value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Isbn13(i64);

impl Isbn13 {
    pub fn get(self) -> i64 {
        self.0
    }

    pub fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::String(s) => s.parse(),
            Value::Number(n) => n.to_string().parse(),
            _ => Err(Error::InvalidInput(messages::INVALID_ISBN.to_string())),
        }
    }
}

impl FromStr for Isbn13 {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if !is_valid_isbn(s) {
            return Err(Error::InvalidInput(messages::INVALID_ISBN.to_string()));
        }
        s.trim()
            .parse::<i64>()
            .map(Isbn13)
            .map_err(|_| Error::InvalidInput(messages::INVALID_ISBN.to_string()))
    }
}

impl Display for Isbn13 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:013}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Icons {
    pub large: String,
    pub small: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Book {
    pub isbn13: i64,
    pub authors: String,
    pub publication: i32,
    pub original_title: String,
    pub title: String,
    pub ratings: RatingSummary,
    pub icons: Icons,
}

impl sqlx::FromRow<'_, ChosenRow> for Book {
    fn from_row(row: &ChosenRow) -> Result<Self, sqlx::Error> {
        let ratings = RatingSummary {
            average: row.try_get("rating_avg")?,
            count: row.try_get("rating_count")?,
            rating_1: row.try_get("rating_1_star")?,
            rating_2: row.try_get("rating_2_star")?,
            rating_3: row.try_get("rating_3_star")?,
            rating_4: row.try_get("rating_4_star")?,
            rating_5: row.try_get("rating_5_star")?,
        };
        Ok(Book {
            isbn13: row.try_get("isbn13")?,
            authors: row.try_get("authors")?,
            publication: row.try_get("publication_year")?,
            original_title: row.try_get("original_title")?,
            title: row.try_get("title")?,
            ratings,
            icons: Icons {
                large: row.try_get("image_url")?,
                small: row.try_get("image_small_url")?,
            },
        })
    }
}

fn valid_isbn(value: &Value, _ctx: &()) -> garde::Result {
    Isbn13::from_value(value)
        .map(|_| ())
        .map_err(|_| garde::Error::new("must be a 13-digit number"))
}

fn valid_publication_year(value: &Value, _ctx: &()) -> garde::Result {
    if is_valid_publication_year(value) {
        Ok(())
    } else {
        Err(garde::Error::new(
            "publication years must be in C.E. and no more than 5 years in the future",
        ))
    }
}

fn valid_image_url(value: &str, _ctx: &()) -> garde::Result {
    if is_valid_image_url(value) {
        Ok(())
    } else {
        Err(garde::Error::new("must be a http(s) URL of an image"))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateBook {
    #[garde(custom(valid_isbn))]
    pub isbn13: Value,
    #[garde(length(min = 1))]
    pub authors: String,
    #[garde(custom(valid_publication_year))]
    pub publication_year: Value,
    #[garde(length(min = 1))]
    pub original_title: String,
    #[garde(length(min = 1))]
    pub title: String,
    #[garde(custom(valid_image_url))]
    pub image_url: String,
    #[garde(custom(valid_image_url))]
    pub image_small_url: String,
    #[garde(skip)]
    #[serde(flatten)]
    pub ratings: RatingSet,
}

impl CreateBook {
    pub fn isbn(&self) -> Result<Isbn13> {
        Isbn13::from_value(&self.isbn13)
    }

    pub fn year(&self) -> Result<i32> {
        publication_year(&self.publication_year)
            .ok_or_else(|| Error::InvalidInput(messages::INVALID_YEAR_FORMAT.to_string()))
    }

    /// Initial ratings, each missing or invalid bucket independently counts as 0.
    pub fn histogram(&self) -> Histogram {
        let updates = self.ratings.lenient_updates();
        Histogram::default()
            .apply_set(&updates)
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookColumn {
    Authors,
    PublicationYear,
    OriginalTitle,
    Title,
    ImageUrl,
    ImageSmallUrl,
}

impl BookColumn {
    pub fn as_str(self) -> &'static str {
        match self {
            BookColumn::Authors => "authors",
            BookColumn::PublicationYear => "publication_year",
            BookColumn::OriginalTitle => "original_title",
            BookColumn::Title => "title",
            BookColumn::ImageUrl => "image_url",
            BookColumn::ImageSmallUrl => "image_small_url",
        }
    }

    fn requirement(self) -> &'static str {
        match self {
            BookColumn::Authors | BookColumn::OriginalTitle | BookColumn::Title => {
                "must be a non-empty string"
            }
            BookColumn::PublicationYear => {
                "must be a year in C.E. no more than 5 years in the future"
            }
            BookColumn::ImageUrl | BookColumn::ImageSmallUrl => {
                "must be a http(s) URL of a png, jpg, jpeg, gif, bmp, webp or svg image"
            }
        }
    }

    fn parse(self, value: &Value) -> Option<ColumnValue> {
        match self {
            BookColumn::Authors | BookColumn::OriginalTitle | BookColumn::Title => {
                is_string_provided(value)
                    .then(|| value.as_str().map(|s| ColumnValue::Text(s.to_string())))
                    .flatten()
            }
            BookColumn::PublicationYear => {
                publication_year(value).map(|y| ColumnValue::Integer(y as i64))
            }
            BookColumn::ImageUrl | BookColumn::ImageSmallUrl => value
                .as_str()
                .filter(|s| is_valid_image_url(s))
                .map(|s| ColumnValue::Text(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValue {
    Text(String),
    Integer(i64),
}

/// Single `column = value` part of a book update.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub column: BookColumn,
    pub value: ColumnValue,
}

/// Sparse update of descriptive book fields, ratings and ISBN are never part of it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BookPatch {
    pub authors: Option<Value>,
    pub publication_year: Option<Value>,
    pub original_title: Option<Value>,
    pub title: Option<Value>,
    pub image_url: Option<Value>,
    pub image_small_url: Option<Value>,
}

impl BookPatch {
    fn fields(&self) -> [(BookColumn, Option<&Value>); 6] {
        [
            (BookColumn::Authors, self.authors.as_ref()),
            (BookColumn::PublicationYear, self.publication_year.as_ref()),
            (BookColumn::OriginalTitle, self.original_title.as_ref()),
            (BookColumn::Title, self.title.as_ref()),
            (BookColumn::ImageUrl, self.image_url.as_ref()),
            (BookColumn::ImageSmallUrl, self.image_small_url.as_ref()),
        ]
    }

    /// Assignments for all defined fields, in field order.
    ///
    /// Every invalid field is reported in a single [`Error::InvalidFields`].
    pub fn compose(&self) -> Result<Vec<Assignment>> {
        let mut assignments = Vec::new();
        let mut invalid = Vec::new();
        for (column, value) in self.fields() {
            let Some(value) = value.filter(|v| !v.is_null()) else {
                continue;
            };
            match column.parse(value) {
                Some(value) => assignments.push(Assignment { column, value }),
                None => invalid.push(FieldError::new(column.as_str(), column.requirement())),
            }
        }
        if !invalid.is_empty() {
            return Err(Error::InvalidFields(invalid));
        }
        if assignments.is_empty() {
            return Err(Error::NoFieldsProvided);
        }
        Ok(assignments)
    }
}

/// Inclusive interval of publication years.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearRange {
    pub start: i32,
    pub end: i32,
}

impl YearRange {
    pub fn new(start: i32, end: i32) -> Result<Self> {
        if start > end {
            return Err(Error::InvalidInput(messages::INVALID_YEAR_RANGE.to_string()));
        }
        Ok(Self { start, end })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YearRangeRequest {
    pub start_year: Option<Value>,
    pub end_year: Option<Value>,
}

impl YearRangeRequest {
    pub fn range(&self) -> Result<YearRange> {
        let (Some(start), Some(end)) = (
            self.start_year.as_ref().filter(|v| !v.is_null()),
            self.end_year.as_ref().filter(|v| !v.is_null()),
        ) else {
            return Err(Error::InvalidInput(messages::MISSING_YEAR_RANGE.to_string()));
        };
        match (publication_year(start), publication_year(end)) {
            (Some(start), Some(end)) => YearRange::new(start, end),
            _ => Err(Error::InvalidInput(messages::INVALID_YEAR_FORMAT.to_string())),
        }
    }
}

fn single<T>(mut rows: Vec<T>, isbn: Isbn13) -> Result<T> {
    match rows.len() {
        0 => Err(Error::RecordNotFound(messages::BOOK_NOT_FOUND.to_string())),
        1 => Ok(rows.remove(0)),
        n => {
            error!("{n} books matched ISBN {isbn}");
            Err(Error::MultipleMatched(messages::MULTIPLE_BOOKS.to_string()))
        }
    }
}

fn check_affected(rows_affected: u64, isbn: Isbn13) -> Result<()> {
    match rows_affected {
        0 => {
            debug!("Book {isbn} disappeared before write");
            Err(Error::RecordNotFound(messages::BOOK_NOT_FOUND.to_string()))
        }
        1 => Ok(()),
        n => {
            error!("{n} books updated for ISBN {isbn}");
            Err(Error::MultipleMatched(messages::MULTIPLE_BOOKS.to_string()))
        }
    }
}

pub type BookRepository = BookRepositoryImpl<Pool<ChosenDB>>;

pub struct BookRepositoryImpl<E> {
    executor: E,
}

impl<'c, E> BookRepositoryImpl<E>
where
    for<'a> &'a E: sqlx::Executor<'c, Database = ChosenDB>,
{
    pub fn new(executor: E) -> Self {
        Self { executor }
    }

    pub async fn get(&self, isbn: Isbn13) -> Result<Book> {
        let sql = format!("SELECT {BOOK_COLUMNS} FROM books WHERE isbn13 = ?");
        let rows = sqlx::query_as::<_, Book>(&sql)
            .bind(isbn.get())
            .fetch_all(&self.executor)
            .await?;
        single(rows, isbn)
    }

    pub async fn count(&self) -> Result<u64> {
        let count: i64 = sqlx::query_scalar("SELECT count(*) FROM books")
            .fetch_one(&self.executor)
            .await?;
        Ok(count as u64)
    }

    /// Books ordered by title.
    pub async fn list(&self, params: ListingParams) -> Result<Batch<Book>> {
        let sql = format!("SELECT {BOOK_COLUMNS} FROM books ORDER BY title ASC LIMIT ? OFFSET ?");
        let rows = sqlx::query_as::<_, Book>(&sql)
            .bind(params.limit)
            .bind(params.offset)
            .fetch_all(&self.executor)
            .await?;
        let total = self.count().await?;
        Ok(Batch {
            offset: params.offset,
            limit: params.limit,
            total,
            rows,
        })
    }

    async fn find_where<T>(&self, condition: &str, value: T) -> Result<Vec<Book>>
    where
        T: for<'q> sqlx::Encode<'q, ChosenDB> + sqlx::Type<ChosenDB> + Send,
    {
        let sql = format!("SELECT {BOOK_COLUMNS} FROM books WHERE {condition} ORDER BY title ASC");
        let rows = sqlx::query_as::<_, Book>(&sql)
            .bind(value)
            .fetch_all(&self.executor)
            .await?;
        Ok(rows)
    }

    /// Case insensitive substring search in authors.
    pub async fn find_by_author(&self, author: &str) -> Result<Vec<Book>> {
        self.find_where("authors LIKE '%' || ? || '%' ESCAPE '\\'", escape_like(author))
            .await
    }

    /// Case insensitive substring search in title.
    pub async fn find_by_title(&self, title: &str) -> Result<Vec<Book>> {
        self.find_where("title LIKE '%' || ? || '%' ESCAPE '\\'", escape_like(title))
            .await
    }

    pub async fn find_by_year(&self, year: i32) -> Result<Vec<Book>> {
        self.find_where("publication_year = ?", year).await
    }

    /// Books whose average rating rounds to `rating` at two decimals.
    pub async fn find_by_rating(&self, rating: f64) -> Result<Vec<Book>> {
        self.find_where("round(rating_avg, 2) = round(?, 2)", rating)
            .await
    }

    pub async fn list_by_year_range(&self, range: YearRange) -> Result<Vec<Book>> {
        let sql = format!(
            "SELECT {BOOK_COLUMNS} FROM books WHERE publication_year BETWEEN ? AND ? ORDER BY publication_year"
        );
        let rows = sqlx::query_as::<_, Book>(&sql)
            .bind(range.start)
            .bind(range.end)
            .fetch_all(&self.executor)
            .await?;
        Ok(rows)
    }

    pub async fn create(&self, payload: CreateBook) -> Result<Book> {
        let isbn = payload.isbn()?;
        let year = payload.year()?;
        let ratings = payload.histogram().summary();
        let sql = format!(
            "INSERT INTO books ({BOOK_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING {BOOK_COLUMNS}"
        );
        let rows = sqlx::query_as::<_, Book>(&sql)
            .bind(isbn.get())
            .bind(&payload.authors)
            .bind(year)
            .bind(&payload.original_title)
            .bind(&payload.title)
            .bind(ratings.average)
            .bind(ratings.count)
            .bind(ratings.rating_1)
            .bind(ratings.rating_2)
            .bind(ratings.rating_3)
            .bind(ratings.rating_4)
            .bind(ratings.rating_5)
            .bind(&payload.image_url)
            .bind(&payload.image_small_url)
            .fetch_all(&self.executor)
            .await
            .map_err(|e| match Error::from(e) {
                Error::AlreadyExists(_) => Error::AlreadyExists(messages::BOOK_EXISTS.to_string()),
                other => other,
            })?;
        single(rows, isbn)
    }

    /// Applies composed assignments as one statement and returns the updated book.
    pub async fn update_fields(&self, isbn: Isbn13, assignments: &[Assignment]) -> Result<Book> {
        if assignments.is_empty() {
            return Err(Error::NoFieldsProvided);
        }
        let mut builder = sqlx::QueryBuilder::<ChosenDB>::new("UPDATE books SET ");
        let mut set = builder.separated(", ");
        for assignment in assignments {
            set.push(assignment.column.as_str());
            set.push_unseparated(" = ");
            match &assignment.value {
                ColumnValue::Text(s) => set.push_bind_unseparated(s.clone()),
                ColumnValue::Integer(i) => set.push_bind_unseparated(*i),
            };
        }
        builder.push(" WHERE isbn13 = ");
        builder.push_bind(isbn.get());
        builder.push(" RETURNING ");
        builder.push(BOOK_COLUMNS);

        let rows = builder
            .build_query_as::<Book>()
            .fetch_all(&self.executor)
            .await?;
        single(rows, isbn)
    }

    pub async fn update(&self, isbn: Isbn13, patch: &BookPatch) -> Result<Book> {
        let assignments = patch.compose()?;
        self.update_fields(isbn, &assignments).await
    }

    async fn histogram(&self, isbn: Isbn13) -> Result<Histogram> {
        let rows: Vec<(i64, i64, i64, i64, i64)> = sqlx::query_as(
            "SELECT rating_1_star, rating_2_star, rating_3_star, rating_4_star, rating_5_star \
             FROM books WHERE isbn13 = ?",
        )
        .bind(isbn.get())
        .fetch_all(&self.executor)
        .await?;
        let (r1, r2, r3, r4, r5) = single(rows, isbn)?;
        Histogram::new([r1, r2, r3, r4, r5])
    }

    /// Persists the histogram together with its recomputed count and average.
    pub async fn update_ratings(&self, isbn: Isbn13, histogram: &Histogram) -> Result<RatingSummary> {
        let summary = histogram.summary();
        let res = sqlx::query(
            "UPDATE books SET rating_avg = ?, rating_count = ?, rating_1_star = ?, \
             rating_2_star = ?, rating_3_star = ?, rating_4_star = ?, rating_5_star = ? \
             WHERE isbn13 = ?",
        )
        .bind(summary.average)
        .bind(summary.count)
        .bind(summary.rating_1)
        .bind(summary.rating_2)
        .bind(summary.rating_3)
        .bind(summary.rating_4)
        .bind(summary.rating_5)
        .bind(isbn.get())
        .execute(&self.executor)
        .await?;
        check_affected(res.rows_affected(), isbn)?;
        Ok(summary)
    }

    /// Stores `next` only if the buckets still hold `current`.
    async fn replace_ratings(
        &self,
        isbn: Isbn13,
        current: &Histogram,
        next: &Histogram,
    ) -> Result<bool> {
        let summary = next.summary();
        let [c1, c2, c3, c4, c5] = current.buckets();
        let res = sqlx::query(
            "UPDATE books SET rating_avg = ?, rating_count = ?, rating_1_star = ?, \
             rating_2_star = ?, rating_3_star = ?, rating_4_star = ?, rating_5_star = ? \
             WHERE isbn13 = ? AND rating_1_star = ? AND rating_2_star = ? \
             AND rating_3_star = ? AND rating_4_star = ? AND rating_5_star = ?",
        )
        .bind(summary.average)
        .bind(summary.count)
        .bind(summary.rating_1)
        .bind(summary.rating_2)
        .bind(summary.rating_3)
        .bind(summary.rating_4)
        .bind(summary.rating_5)
        .bind(isbn.get())
        .bind(c1)
        .bind(c2)
        .bind(c3)
        .bind(c4)
        .bind(c5)
        .execute(&self.executor)
        .await?;
        Ok(res.rows_affected() > 0)
    }

    /// Read-modify-write of the histogram, repeated while a concurrent
    /// writer changes the buckets between the read and the write.
    async fn modify_ratings<F>(&self, isbn: Isbn13, modify: F) -> Result<RatingSummary>
    where
        F: Fn(&Histogram) -> Result<Histogram>,
    {
        for attempt in 1..=MAX_RATING_ATTEMPTS {
            let current = self.histogram(isbn).await?;
            let next = modify(&current)?;
            if self.replace_ratings(isbn, &current, &next).await? {
                return Ok(next.summary());
            }
            debug!("Ratings of {isbn} changed concurrently, attempt {attempt}");
        }
        error!("Ratings of {isbn} not stored after {MAX_RATING_ATTEMPTS} attempts");
        Err(Error::Contended(messages::RATINGS_CONTENDED.to_string()))
    }

    /// Adds or removes one rating, count and average are recomputed from buckets.
    pub async fn rate(&self, isbn: Isbn13, star: Star, change: RatingChange) -> Result<RatingSummary> {
        self.modify_ratings(isbn, |current| current.apply_delta(star, change))
            .await
    }

    /// Overwrites provided buckets. The payload is validated before the store is touched.
    pub async fn set_ratings(&self, isbn: Isbn13, ratings: &RatingSet) -> Result<RatingSummary> {
        let updates = ratings.updates()?;
        self.modify_ratings(isbn, |current| current.apply_set(&updates))
            .await
    }

    /// Deletes the book and returns it as it was before deletion.
    pub async fn delete(&self, isbn: Isbn13) -> Result<Book> {
        let sql = format!("DELETE FROM books WHERE isbn13 = ? RETURNING {BOOK_COLUMNS}");
        let rows = sqlx::query_as::<_, Book>(&sql)
            .bind(isbn.get())
            .fetch_all(&self.executor)
            .await?;
        single(rows, isbn)
    }

    /// Deletes all books published within `range` in one statement.
    pub async fn delete_range(&self, range: YearRange) -> Result<Vec<Book>> {
        let sql = format!(
            "DELETE FROM books WHERE publication_year BETWEEN ? AND ? RETURNING {BOOK_COLUMNS}"
        );
        let mut rows = sqlx::query_as::<_, Book>(&sql)
            .bind(range.start)
            .bind(range.end)
            .fetch_all(&self.executor)
            .await?;
        if rows.is_empty() {
            return Err(Error::RecordNotFound(
                messages::BOOKS_NOT_FOUND_IN_RANGE.to_string(),
            ));
        }
        rows.sort_by_key(|b| b.publication);
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn patch(value: Value) -> BookPatch {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("plain"), "plain");
        assert_eq!(escape_like("100%_\\"), "100\\%\\_\\\\");
    }

    #[test]
    fn test_isbn_parsing() {
        let isbn: Isbn13 = " 9780000000000 ".parse().unwrap();
        assert_eq!(isbn.get(), 9780000000000);
        assert_eq!(isbn.to_string(), "9780000000000");
        assert!("978".parse::<Isbn13>().is_err());
        assert!(Isbn13::from_value(&json!(9780000000000_i64)).is_ok());
        assert!(Isbn13::from_value(&json!(true)).is_err());
    }

    #[test]
    fn test_compose_single_title() {
        let assignments = patch(json!({"title": "New Title"})).compose().unwrap();
        assert_eq!(
            assignments,
            vec![Assignment {
                column: BookColumn::Title,
                value: ColumnValue::Text("New Title".to_string())
            }]
        );
    }

    #[test]
    fn test_compose_ignores_isbn_and_ratings() {
        let assignments = patch(json!({
            "isbn13": 9780000000001_i64,
            "rating_5_star": 10,
            "authors": "A. Author",
            "publication_year": "1999"
        }))
        .compose()
        .unwrap();
        assert_eq!(assignments.len(), 2);
        assert_eq!(assignments[0].column, BookColumn::Authors);
        assert_eq!(assignments[1].value, ColumnValue::Integer(1999));
    }

    #[test]
    fn test_compose_nothing_defined() {
        assert!(matches!(
            BookPatch::default().compose(),
            Err(Error::NoFieldsProvided)
        ));
        assert!(matches!(
            patch(json!({"title": null, "authors": null})).compose(),
            Err(Error::NoFieldsProvided)
        ));
    }

    #[test]
    fn test_compose_single_invalid_field() {
        let cases = [
            json!({"authors": ""}),
            json!({"publication_year": 99999}),
            json!({"original_title": 12}),
            json!({"title": ""}),
            json!({"image_url": "not a url"}),
            json!({"image_small_url": "http://x.com/a.txt"}),
        ];
        let expected = [
            "authors",
            "publication_year",
            "original_title",
            "title",
            "image_url",
            "image_small_url",
        ];
        for (case, field) in cases.into_iter().zip(expected) {
            match patch(case).compose() {
                Err(Error::InvalidFields(fields)) => {
                    assert_eq!(fields.len(), 1);
                    assert_eq!(fields[0].field, field);
                }
                other => panic!("unexpected result {other:?}"),
            }
        }
    }

    #[test]
    fn test_compose_reports_all_invalid() {
        let res = patch(json!({
            "image_url": "bad",
            "title": "",
            "authors": "Fine Author"
        }))
        .compose();
        match res {
            Err(Error::InvalidFields(fields)) => {
                let names: Vec<_> = fields.iter().map(|f| f.field).collect();
                assert_eq!(names, vec!["title", "image_url"]);
            }
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[test]
    fn test_year_range_request() {
        let req: YearRangeRequest =
            serde_json::from_value(json!({"startYear": 1999, "endYear": "2001"})).unwrap();
        assert_eq!(req.range().unwrap(), YearRange { start: 1999, end: 2001 });

        let req: YearRangeRequest = serde_json::from_value(json!({"startYear": 1999})).unwrap();
        assert!(
            matches!(req.range(), Err(Error::InvalidInput(m)) if m == messages::MISSING_YEAR_RANGE)
        );

        let req: YearRangeRequest =
            serde_json::from_value(json!({"startYear": 2001, "endYear": 1999})).unwrap();
        assert!(
            matches!(req.range(), Err(Error::InvalidInput(m)) if m == messages::INVALID_YEAR_RANGE)
        );

        let req: YearRangeRequest =
            serde_json::from_value(json!({"startYear": "x", "endYear": 1999})).unwrap();
        assert!(
            matches!(req.range(), Err(Error::InvalidInput(m)) if m == messages::INVALID_YEAR_FORMAT)
        );
    }

    #[test]
    fn test_create_book_ratings_default_per_bucket() {
        let payload: CreateBook = serde_json::from_value(json!({
            "isbn13": "9780000000000",
            "authors": "A. Author",
            "publication_year": 2000,
            "original_title": "Original",
            "title": "Title",
            "image_url": "http://example.com/l.jpg",
            "image_small_url": "http://example.com/s.jpg",
            "rating_1_star": 2,
            "rating_3_star": "bad",
            "rating_5_star": "3"
        }))
        .unwrap();
        assert!(payload.validate().is_ok());
        assert_eq!(payload.histogram().buckets(), [2, 0, 0, 0, 3]);
    }

    #[test]
    fn test_create_book_validation() {
        let payload: CreateBook = serde_json::from_value(json!({
            "isbn13": "97800",
            "authors": "",
            "publication_year": 2000,
            "original_title": "Original",
            "title": "Title",
            "image_url": "http://example.com/l.jpg",
            "image_small_url": "example.com/s.jpg"
        }))
        .unwrap();
        let report = payload.validate().unwrap_err();
        let fields: Vec<String> = report.iter().map(|(path, _)| path.to_string()).collect();
        assert!(fields.contains(&"isbn13".to_string()));
        assert!(fields.contains(&"authors".to_string()));
        assert!(fields.contains(&"image_small_url".to_string()));
        assert_eq!(fields.len(), 3);
    }
}
