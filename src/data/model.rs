use std::collections::BTreeSet;
use std::fmt;

// ---------------------------------------------------------------------------
// RawCell – a single untyped cell as delivered by a file reader
// ---------------------------------------------------------------------------

/// A dynamically-typed cell mirroring what spreadsheet / CSV / Parquet readers
/// hand back. Only the loader looks at these; everything downstream works on
/// the strictly-typed [`Record`].
#[derive(Debug, Clone, PartialEq)]
pub enum RawCell {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

impl fmt::Display for RawCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawCell::String(s) => write!(f, "{s}"),
            RawCell::Integer(i) => write!(f, "{i}"),
            RawCell::Float(v) => write!(f, "{v}"),
            RawCell::Bool(b) => write!(f, "{b}"),
            RawCell::Null => write!(f, "<null>"),
        }
    }
}

impl RawCell {
    /// Interpret the cell as a number; numeric strings are accepted.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            RawCell::Float(v) if v.is_finite() => Some(*v),
            RawCell::Integer(i) => Some(*i as f64),
            RawCell::String(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
            _ => None,
        }
    }

    /// `Null`, NaN and blank strings all count as missing, matching how
    /// spreadsheet exports represent empty cells.
    pub fn is_missing(&self) -> bool {
        match self {
            RawCell::Null => true,
            RawCell::Float(v) => v.is_nan(),
            RawCell::String(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Non-missing cell rendered as text.
    pub fn as_text(&self) -> Option<String> {
        if self.is_missing() {
            None
        } else {
            Some(self.to_string())
        }
    }
}

/// Header plus untyped rows, the common output of every format reader.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<RawCell>>,
}

impl RawTable {
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h.trim() == name)
    }
}

// ---------------------------------------------------------------------------
// TechDimension – the seven fixed technology categories
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TechDimension {
    ArtificialIntelligence,
    BigData,
    CloudComputing,
    InternetOfThings,
    Blockchain,
    DigitalInfrastructure,
    DigitalApplications,
}

impl TechDimension {
    pub const ALL: [TechDimension; 7] = [
        TechDimension::ArtificialIntelligence,
        TechDimension::BigData,
        TechDimension::CloudComputing,
        TechDimension::InternetOfThings,
        TechDimension::Blockchain,
        TechDimension::DigitalInfrastructure,
        TechDimension::DigitalApplications,
    ];

    /// Position in [`TechDimension::ALL`] and in [`Record::technology`].
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn label(self) -> &'static str {
        match self {
            TechDimension::ArtificialIntelligence => "Artificial intelligence",
            TechDimension::BigData => "Big data",
            TechDimension::CloudComputing => "Cloud computing",
            TechDimension::InternetOfThings => "Internet of things",
            TechDimension::Blockchain => "Blockchain",
            TechDimension::DigitalInfrastructure => "Digital infrastructure",
            TechDimension::DigitalApplications => "Digital application scenarios",
        }
    }

    /// Column header used by the published dataset.
    pub fn default_header(self) -> &'static str {
        match self {
            TechDimension::ArtificialIntelligence => "人工智能",
            TechDimension::BigData => "大数据",
            TechDimension::CloudComputing => "云计算",
            TechDimension::InternetOfThings => "物联网",
            TechDimension::Blockchain => "区块链",
            TechDimension::DigitalInfrastructure => "数字技术基础设施",
            TechDimension::DigitalApplications => "数字化应用场景",
        }
    }
}

impl fmt::Display for TechDimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Record – one firm-year row
// ---------------------------------------------------------------------------

/// A single firm-year observation after normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// Zero-padded to six characters when it was a short numeric code.
    pub stock_code: String,
    pub company_name: String,
    pub year: i32,
    /// Never empty: missing values carry the unknown-industry sentinel.
    pub industry_name: String,
    /// Documented range 0–100.
    pub index_score: f64,
    /// Word frequencies indexed by [`TechDimension::index`]; `None` where
    /// the cell (or the whole column) was missing.
    pub technology: [Option<f64>; 7],
    pub total_word_frequency: Option<f64>,
}

impl Record {
    pub fn dimension(&self, dim: TechDimension) -> Option<f64> {
        self.technology[dim.index()]
    }

    /// Case-insensitive substring match on company name OR stock code.
    /// The query must already be lower-cased.
    pub fn matches_query(&self, lowered_query: &str) -> bool {
        self.company_name.to_lowercase().contains(lowered_query)
            || self.stock_code.to_lowercase().contains(lowered_query)
    }
}

// ---------------------------------------------------------------------------
// Table – the complete loaded dataset
// ---------------------------------------------------------------------------

/// The immutable, loaded table. Filters borrow from it and never mutate it.
#[derive(Debug, Clone, Default)]
pub struct Table {
    records: Vec<Record>,
}

impl Table {
    pub fn from_records(records: Vec<Record>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct years, ascending.
    pub fn years(&self) -> Vec<i32> {
        self.records
            .iter()
            .map(|r| r.year)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Default year selection: the most recent one.
    pub fn latest_year(&self) -> Option<i32> {
        self.records.iter().map(|r| r.year).max()
    }

    /// Distinct industry names, sorted.
    pub fn industries(&self) -> Vec<String> {
        self.records
            .iter()
            .map(|r| r.industry_name.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    /// Global score bounds widened to whole numbers, so a range selector
    /// stepping in integers still covers every observed score.
    pub fn score_bounds(&self) -> Option<(f64, f64)> {
        let mut scores = self.records.iter().map(|r| r.index_score);
        let first = scores.next()?;
        let (min, max) = scores.fold((first, first), |(lo, hi), s| (lo.min(s), hi.max(s)));
        Some((min.floor(), max.ceil()))
    }
}
