pub const INVALID_ISBN: &str =
    "Invalid or missing ISBN - The provided ISBN must be a 13-digit numeric string.";
pub const BOOK_NOT_FOUND: &str = "Book not found - No book matches the provided ISBN.";
pub const BOOK_EXISTS: &str =
    "Book could not be created - Verify ISBN is not already in database.";
pub const MULTIPLE_BOOKS: &str = "Multiple books matched a single ISBN.";

pub const MISSING_YEAR_RANGE: &str =
    "Invalid year range - both startYear and endYear must be provided";
pub const INVALID_YEAR_FORMAT: &str =
    "Invalid year format - years must be valid publication years";
pub const INVALID_YEAR_RANGE: &str =
    "Invalid year range - startYear must be less than or equal to endYear";
pub const BOOKS_NOT_FOUND_IN_RANGE: &str = "No books found in the specified year range";

pub const INVALID_STARS: &str = "Invalid rating value - must be between 1 and 5 inclusive.";
pub const NEGATIVE_RATING: &str =
    "A star rating cannot have a negative count - Consider setting remove to false.";
pub const INVALID_BUCKET: &str =
    "Rating count must be a non-negative integer no greater than 1000000000000.";
pub const RATINGS_CONTENDED: &str =
    "Ratings are being changed by too many requests at once - Try again later.";
pub const BUCKET_OVERFLOW: &str = "A star rating count cannot exceed 1000000000000.";

pub const USER_NOT_FOUND: &str = "User not found.";
pub const ACCOUNT_EXISTS: &str = "Email or username already exists.";
pub const MULTIPLE_ACCOUNTS: &str = "Multiple accounts matched a single id.";
pub const PASSWORD_CHANGED: &str = "Password changed.";

pub const NO_BOOKS_FOUND: &str = "No books found - No books match the provided search.";
pub const INVALID_AUTHOR: &str =
    "Invalid or missing Author - The author name must be provided as a non-empty string.";
pub const INVALID_TITLE: &str =
    "Invalid or missing Title - The title must be provided as a non-empty string.";
pub const INVALID_SEARCH_YEAR: &str =
    "Invalid or missing year - The year must be a number between 1000 and the current year.";
pub const INVALID_SEARCH_RATING: &str =
    "Invalid or missing rating - The rating must be a number between 1 and 5.";

pub const BOOK_CREATED: &str = "Book successfully created";
pub const BOOK_DELETED: &str = "Book successfully deleted";
pub const BOOKS_DELETED: &str = "Books successfully deleted";
pub const RATINGS_UPDATED: &str = "Successfully updated book ratings.";
