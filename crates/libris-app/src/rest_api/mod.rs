use libris_dal::{Batch, ListingParams};
use serde::{Deserialize, Serialize};

pub mod book;

/// Query parameters of listing endpoints, unparsable values fall back to defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Paging {
    limit: Option<String>,
    offset: Option<String>,
}

fn parse_param(value: Option<&str>) -> Option<i64> {
    value.and_then(|v| v.trim().parse::<i64>().ok())
}

impl Paging {
    pub fn new(limit: Option<&str>, offset: Option<&str>) -> Self {
        Self {
            limit: limit.map(str::to_string),
            offset: offset.map(str::to_string),
        }
    }

    pub fn into_listing_params(self, default_page_size: u32) -> ListingParams {
        let limit = parse_param(self.limit.as_deref())
            .filter(|l| *l > 0)
            .unwrap_or(default_page_size.into());
        let offset = parse_param(self.offset.as_deref())
            .filter(|o| *o >= 0)
            .unwrap_or(0);
        ListingParams::new(offset, limit)
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub total_records: u64,
    pub limit: i64,
    pub offset: i64,
    pub next_page: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Page<T> {
    pub books: Vec<T>,
    pub pagination: Pagination,
}

impl<T> From<Batch<T>> for Page<T> {
    fn from(batch: Batch<T>) -> Self {
        Self {
            pagination: Pagination {
                total_records: batch.total,
                limit: batch.limit,
                offset: batch.offset,
                next_page: batch.offset + batch.limit,
            },
            books: batch.rows,
        }
    }
}
