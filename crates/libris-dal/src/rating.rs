//! Rating histogram of a book and the arithmetic keeping its count and
//! average consistent with the five star buckets.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    error::{Error, FieldError, Result},
    messages,
    validation::{coerce_integer, is_defined},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Star(u8);

impl Star {
    pub const ALL: [Star; 5] = [Star(1), Star(2), Star(3), Star(4), Star(5)];

    pub fn value(self) -> u8 {
        self.0
    }

    fn index(self) -> usize {
        (self.0 - 1) as usize
    }

    /// Name of the bucket column (and payload field) for this star value.
    pub fn bucket_name(self) -> &'static str {
        const NAMES: [&str; 5] = [
            "rating_1_star",
            "rating_2_star",
            "rating_3_star",
            "rating_4_star",
            "rating_5_star",
        ];
        NAMES[self.index()]
    }

    pub fn from_value(value: &Value) -> Result<Self> {
        coerce_integer(value)
            .ok_or_else(|| Error::InvalidInput(messages::INVALID_STARS.to_string()))
            .and_then(Star::try_from)
    }
}

impl TryFrom<i64> for Star {
    type Error = Error;

    fn try_from(value: i64) -> Result<Self> {
        if (1..=5).contains(&value) {
            Ok(Star(value as u8))
        } else {
            Err(Error::InvalidInput(messages::INVALID_STARS.to_string()))
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RatingChange {
    Add,
    Remove,
}

/// Requested bucket counts keyed by star value.
pub type BucketUpdates = BTreeMap<Star, i64>;

/// Largest count a single bucket may hold, keeps the weighted sum within `i64`.
pub const MAX_BUCKET: i64 = 1_000_000_000_000;

fn valid_bucket(count: i64) -> bool {
    (0..=MAX_BUCKET).contains(&count)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Histogram {
    buckets: [i64; 5],
}

impl Histogram {
    pub fn new(buckets: [i64; 5]) -> Result<Self> {
        if buckets.iter().any(|b| *b < 0) {
            return Err(Error::InvalidOperation(messages::NEGATIVE_RATING.to_string()));
        }
        if buckets.iter().any(|b| *b > MAX_BUCKET) {
            return Err(Error::InvalidOperation(messages::BUCKET_OVERFLOW.to_string()));
        }
        Ok(Self { buckets })
    }

    pub fn bucket(&self, star: Star) -> i64 {
        self.buckets[star.index()]
    }

    pub fn buckets(&self) -> [i64; 5] {
        self.buckets
    }

    pub fn count(&self) -> i64 {
        self.buckets.iter().sum()
    }

    fn weighted_sum(&self) -> i64 {
        Star::ALL
            .iter()
            .map(|s| s.value() as i64 * self.bucket(*s))
            .sum()
    }

    /// Weighted average of star values, 0 for a book without ratings.
    pub fn average(&self) -> f64 {
        match self.count() {
            0 => 0.0,
            count => self.weighted_sum() as f64 / count as f64,
        }
    }

    /// Adds or removes one rating of `star`.
    ///
    /// Removing from an empty bucket fails with [`Error::InvalidOperation`],
    /// `self` is never modified.
    pub fn apply_delta(&self, star: Star, change: RatingChange) -> Result<Histogram> {
        let mut buckets = self.buckets;
        let bucket = &mut buckets[star.index()];
        match change {
            RatingChange::Add if *bucket >= MAX_BUCKET => {
                return Err(Error::InvalidOperation(messages::BUCKET_OVERFLOW.to_string()));
            }
            RatingChange::Add => *bucket += 1,
            RatingChange::Remove if *bucket == 0 => {
                return Err(Error::InvalidOperation(messages::NEGATIVE_RATING.to_string()));
            }
            RatingChange::Remove => *bucket -= 1,
        }
        Ok(Histogram { buckets })
    }

    /// Overwrites buckets present in `updates`, others keep current counts.
    pub fn apply_set(&self, updates: &BucketUpdates) -> Result<Histogram> {
        if updates.is_empty() {
            return Err(Error::NoFieldsProvided);
        }
        let mut buckets = self.buckets;
        for (star, count) in updates {
            if !valid_bucket(*count) {
                return Err(Error::InvalidField(FieldError::new(
                    star.bucket_name(),
                    messages::INVALID_BUCKET,
                )));
            }
            buckets[star.index()] = *count;
        }
        Ok(Histogram { buckets })
    }

    pub fn summary(&self) -> RatingSummary {
        let [rating_1, rating_2, rating_3, rating_4, rating_5] = self.buckets;
        RatingSummary {
            average: self.average(),
            count: self.count(),
            rating_1,
            rating_2,
            rating_3,
            rating_4,
            rating_5,
        }
    }
}

/// Rating block of a book as persisted and returned to clients.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatingSummary {
    pub average: f64,
    pub count: i64,
    pub rating_1: i64,
    pub rating_2: i64,
    pub rating_3: i64,
    pub rating_4: i64,
    pub rating_5: i64,
}

/// Payload adding or removing a single rating.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RateRequest {
    pub stars: Option<Value>,
    pub remove: Option<Value>,
}

impl RateRequest {
    pub fn star(&self) -> Result<Star> {
        match &self.stars {
            Some(v) if !v.is_null() => Star::from_value(v),
            _ => Err(Error::InvalidInput("Invalid or missing rating.".to_string())),
        }
    }

    /// Any truthy `remove` value removes the rating, missing means add.
    pub fn change(&self) -> RatingChange {
        if self.remove.as_ref().is_some_and(is_truthy) {
            RatingChange::Remove
        } else {
            RatingChange::Add
        }
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Sparse payload overwriting any subset of the five buckets.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RatingSet {
    pub rating_1_star: Option<Value>,
    pub rating_2_star: Option<Value>,
    pub rating_3_star: Option<Value>,
    pub rating_4_star: Option<Value>,
    pub rating_5_star: Option<Value>,
}

impl RatingSet {
    fn fields(&self) -> [(Star, Option<&Value>); 5] {
        [
            (Star(1), self.rating_1_star.as_ref()),
            (Star(2), self.rating_2_star.as_ref()),
            (Star(3), self.rating_3_star.as_ref()),
            (Star(4), self.rating_4_star.as_ref()),
            (Star(5), self.rating_5_star.as_ref()),
        ]
    }

    /// Validated bucket updates.
    ///
    /// The first invalid bucket, in star order, is reported. An empty
    /// payload fails with [`Error::NoFieldsProvided`].
    pub fn updates(&self) -> Result<BucketUpdates> {
        let mut updates = BucketUpdates::new();
        for (star, value) in self.fields() {
            if !is_defined(value) {
                continue;
            }
            let count = value
                .and_then(coerce_integer)
                .filter(|c| valid_bucket(*c))
                .ok_or_else(|| {
                    Error::InvalidField(FieldError::new(
                        star.bucket_name(),
                        messages::INVALID_BUCKET,
                    ))
                })?;
            updates.insert(star, count);
        }
        if updates.is_empty() {
            return Err(Error::NoFieldsProvided);
        }
        Ok(updates)
    }

    /// Buckets holding a valid count, anything else is left out.
    pub fn lenient_updates(&self) -> BucketUpdates {
        self.fields()
            .into_iter()
            .filter_map(|(star, value)| {
                value
                    .and_then(coerce_integer)
                    .filter(|c| valid_bucket(*c))
                    .map(|c| (star, c))
            })
            .collect()
    }
}
