use super::model::{Record, Table};

// ---------------------------------------------------------------------------
// Filter criteria: what the user selected in the sidebar
// ---------------------------------------------------------------------------

/// Industry selector state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum IndustrySelection {
    /// No industry constraint.
    #[default]
    All,
    /// Exact match on the industry name.
    Only(String),
}

impl IndustrySelection {
    /// Map a selector label to a selection; `all_label` is the "every
    /// industry" entry shown at the top of the list.
    pub fn from_label(label: &str, all_label: &str) -> Self {
        if label == all_label {
            IndustrySelection::All
        } else {
            IndustrySelection::Only(label.to_string())
        }
    }

    fn admits(&self, industry: &str) -> bool {
        match self {
            IndustrySelection::All => true,
            IndustrySelection::Only(name) => name == industry,
        }
    }
}

/// Inclusive score interval.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreRange {
    pub low: f64,
    pub high: f64,
}

impl ScoreRange {
    pub fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    pub fn contains(&self, score: f64) -> bool {
        self.low <= score && score <= self.high
    }
}

/// The complete sidebar selection.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterCriteria {
    pub year: i32,
    pub industry: IndustrySelection,
    pub index_range: ScoreRange,
    /// Free-text company / stock code query; empty means no constraint.
    pub search: String,
}

impl FilterCriteria {
    /// Criteria that keep every record of the table's latest year.
    /// `None` for an empty table.
    pub fn initial(table: &Table) -> Option<Self> {
        let year = table.latest_year()?;
        let (low, high) = table.score_bounds()?;
        Some(Self {
            year,
            industry: IndustrySelection::All,
            index_range: ScoreRange::new(low, high),
            search: String::new(),
        })
    }
}

// ---------------------------------------------------------------------------
// Filtering
// ---------------------------------------------------------------------------

/// Return the records passing every predicate, in table order:
/// year equality, industry (unless "all"), inclusive score range, then the
/// case-insensitive search on company name or stock code.
///
/// An empty result is a valid outcome. The table itself is never touched.
pub fn filter<'a>(table: &'a Table, criteria: &FilterCriteria) -> Vec<&'a Record> {
    let query = normalized_query(&criteria.search);
    table
        .records()
        .iter()
        .filter(|r| r.year == criteria.year)
        .filter(|r| criteria.industry.admits(&r.industry_name))
        .filter(|r| criteria.index_range.contains(r.index_score))
        .filter(|r| query.as_deref().map_or(true, |q| r.matches_query(q)))
        .collect()
}

/// Records of a single year, regardless of any other selection.
pub fn records_for_year(table: &Table, year: i32) -> Vec<&Record> {
    table.records().iter().filter(|r| r.year == year).collect()
}

/// Lower-cased query, or `None` when the search box is empty.
pub(crate) fn normalized_query(search: &str) -> Option<String> {
    if search.is_empty() {
        None
    } else {
        Some(search.to_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::tests::record;

    fn sample() -> Table {
        Table::from_records(vec![
            record("000001", "Ping An Bank", 2021, "Banking", 62.0),
            record("600519", "Kweichow Moutai", 2021, "Beverages", 18.5),
            record("000002", "Vanke", 2020, "Real Estate", 25.0),
            record("300750", "CATL", 2021, "Batteries", 80.0),
            record("601398", "ICBC", 2021, "Banking", 55.0),
        ])
    }

    fn criteria(year: i32) -> FilterCriteria {
        FilterCriteria {
            year,
            industry: IndustrySelection::All,
            index_range: ScoreRange::new(0.0, 100.0),
            search: String::new(),
        }
    }

    #[test]
    fn full_range_returns_exactly_the_year() {
        let table = sample();
        let out = filter(&table, &criteria(2021));
        assert_eq!(out.len(), 4);
        assert!(out.iter().all(|r| r.year == 2021));
        assert_eq!(out, records_for_year(&table, 2021));
    }

    #[test]
    fn industry_is_an_exact_match() {
        let table = sample();
        let mut c = criteria(2021);
        c.industry = IndustrySelection::Only("Banking".into());
        let names: Vec<_> = filter(&table, &c).iter().map(|r| r.company_name.as_str()).collect();
        assert_eq!(names, ["Ping An Bank", "ICBC"]);

        c.industry = IndustrySelection::Only("Bank".into());
        assert!(filter(&table, &c).is_empty());
    }

    #[test]
    fn range_is_inclusive_on_both_ends() {
        let table = sample();
        let mut c = criteria(2021);
        c.index_range = ScoreRange::new(55.0, 62.0);
        let codes: Vec<_> = filter(&table, &c).iter().map(|r| r.stock_code.as_str()).collect();
        assert_eq!(codes, ["000001", "601398"]);
    }

    #[test]
    fn search_matches_name_or_code_case_insensitively() {
        let table = sample();
        let mut c = criteria(2021);
        c.search = "moutai".into();
        assert_eq!(filter(&table, &c).len(), 1);

        c.search = "3007".into();
        assert_eq!(filter(&table, &c)[0].company_name, "CATL");

        c.search = String::new();
        assert_eq!(filter(&table, &c).len(), 4);
    }

    #[test]
    fn output_is_a_subset_that_keeps_every_passing_row() {
        let table = sample();
        let mut c = criteria(2021);
        c.index_range = ScoreRange::new(20.0, 70.0);
        c.search = "an".into();
        let out = filter(&table, &c);
        for r in table.records() {
            let passes = r.year == 2021
                && c.index_range.contains(r.index_score)
                && r.matches_query("an");
            assert_eq!(out.iter().any(|o| std::ptr::eq(*o, r)), passes);
        }
    }

    #[test]
    fn empty_combination_is_not_an_error() {
        let table = sample();
        let mut c = criteria(2020);
        c.industry = IndustrySelection::Only("Banking".into());
        assert!(filter(&table, &c).is_empty());
        assert_eq!(table.len(), 5);
    }

    #[test]
    fn selector_label_mapping() {
        assert_eq!(IndustrySelection::from_label("全部", "全部"), IndustrySelection::All);
        assert_eq!(
            IndustrySelection::from_label("Banking", "全部"),
            IndustrySelection::Only("Banking".into())
        );
    }

    #[test]
    fn initial_criteria_use_latest_year_and_full_range() {
        let c = FilterCriteria::initial(&sample()).unwrap();
        assert_eq!(c.year, 2021);
        assert_eq!(c.index_range, ScoreRange::new(18.0, 80.0));
        assert_eq!(c.industry, IndustrySelection::All);
        assert!(FilterCriteria::initial(&Table::default()).is_none());
    }
}
