use chrono::NaiveDateTime;
use serde::{Serialize, Serializer};

/// Textual timestamp format of the `timestamp` column. Fractional seconds
/// are written only when present.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// Column set of the persisted table, in file order.
pub const COLUMNS: [&str; 3] = ["name", "price", "timestamp"];

/// One product as shown on a results page. The price is the display text,
/// currency symbol and separators included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listing {
    pub name: String,
    pub price: String,
}

impl Listing {
    pub fn new(name: impl Into<String>, price: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            price: price.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PriceRecord {
    pub name: String,
    pub price: String,
    #[serde(serialize_with = "serialize_timestamp")]
    pub timestamp: NaiveDateTime,
}

fn serialize_timestamp<S: Serializer>(ts: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(&ts.format(TIMESTAMP_FORMAT))
}

pub fn parse_timestamp(raw: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    NaiveDateTime::parse_from_str(raw.trim(), TIMESTAMP_FORMAT)
}

/// Price history in fetch order. Repeated names are expected: each fetch
/// adds another sample.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PriceTable {
    records: Vec<PriceRecord>,
}

impl PriceTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: Vec<PriceRecord>) -> Self {
        Self { records }
    }

    pub fn columns(&self) -> [&'static str; 3] {
        COLUMNS
    }

    pub fn records(&self) -> &[PriceRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns the table grown by one row per listing, all stamped `at`,
    /// after every existing row.
    pub fn append(mut self, listings: &[Listing], at: NaiveDateTime) -> Self {
        self.records.extend(listings.iter().map(|listing| PriceRecord {
            name: listing.name.clone(),
            price: listing.price.clone(),
            timestamp: at,
        }));
        self
    }
}
