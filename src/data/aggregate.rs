use std::collections::BTreeMap;

use super::filter::normalized_query;
use super::model::{Record, TechDimension};

// ---------------------------------------------------------------------------
// Summary statistics
// ---------------------------------------------------------------------------

/// Headline metrics. `mean`, `max` and `min` are `None` when there are no
/// records: the UI renders that as "N/A", never as 0.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Summary {
    pub count: usize,
    pub mean: Option<f64>,
    pub max: Option<f64>,
    pub min: Option<f64>,
}

pub fn summary<'a>(records: impl IntoIterator<Item = &'a Record>) -> Summary {
    let mut out = Summary::default();
    let mut sum = 0.0;
    for r in records {
        out.count += 1;
        sum += r.index_score;
        out.max = Some(out.max.map_or(r.index_score, |m| m.max(r.index_score)));
        out.min = Some(out.min.map_or(r.index_score, |m| m.min(r.index_score)));
    }
    if out.count > 0 {
        out.mean = Some(sum / out.count as f64);
    }
    out
}

// ---------------------------------------------------------------------------
// Technology profile (radar chart)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DimensionAverage {
    pub dimension: TechDimension,
    /// `None` on empty input.
    pub average: Option<f64>,
}

/// Mean of each technology dimension, in [`TechDimension::ALL`] order.
/// Missing cells are skipped, so each dimension averages only the records
/// that report it; a dimension nobody reports is `None`.
pub fn technology_profile<'a>(records: impl IntoIterator<Item = &'a Record>) -> Vec<DimensionAverage> {
    let mut sums = [0.0; 7];
    let mut counts = [0usize; 7];
    for r in records {
        for (i, value) in r.technology.iter().enumerate() {
            if let Some(v) = value {
                sums[i] += v;
                counts[i] += 1;
            }
        }
    }
    TechDimension::ALL
        .iter()
        .map(|&dimension| {
            let i = dimension.index();
            DimensionAverage {
                dimension,
                average: (counts[i] > 0).then(|| sums[i] / counts[i] as f64),
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Industry ranking (bar chart)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct IndustryAverage {
    pub industry: String,
    pub average: f64,
    pub count: usize,
}

/// Mean index score per industry, highest first.
///
/// Groups are formed in industry-name order and the sort is stable, so equal
/// averages keep that order. Callers pass every record of one year, not the
/// filtered selection.
pub fn industry_ranking<'a>(records: impl IntoIterator<Item = &'a Record>) -> Vec<IndustryAverage> {
    let mut groups: BTreeMap<&str, (f64, usize)> = BTreeMap::new();
    for r in records {
        let entry = groups.entry(r.industry_name.as_str()).or_default();
        entry.0 += r.index_score;
        entry.1 += 1;
    }

    let mut ranking: Vec<IndustryAverage> = groups
        .into_iter()
        .map(|(industry, (sum, count))| IndustryAverage {
            industry: industry.to_string(),
            average: sum / count as f64,
            count,
        })
        .collect();
    ranking.sort_by(|a, b| b.average.total_cmp(&a.average));
    ranking
}

// ---------------------------------------------------------------------------
// Company trend (line chart)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendPoint {
    pub year: i32,
    pub index_score: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompanyTrend {
    pub company_name: String,
    pub stock_code: String,
    /// Ascending by year.
    pub points: Vec<TrendPoint>,
}

/// Year series of the first company matching `search`.
///
/// Matching uses the same case-insensitive name-or-code rule as the filter.
/// Among the matches, the one with the earliest year wins (table order breaks
/// ties); the series then covers every year of that stock code. Firms carrying
/// the `unknown_code` sentinel share a code, so for them the company name must
/// match as well. `None` for an empty query or when nothing matches.
pub fn company_trend<'a>(
    records: impl IntoIterator<Item = &'a Record>,
    search: &str,
    unknown_code: &str,
) -> Option<CompanyTrend> {
    let query = normalized_query(search)?;
    let records: Vec<&Record> = records.into_iter().collect();

    let first = records
        .iter()
        .filter(|r| r.matches_query(&query))
        .min_by_key(|r| r.year)?;

    let code_known = first.stock_code != unknown_code;
    let mut points: Vec<TrendPoint> = records
        .iter()
        .filter(|r| {
            r.stock_code == first.stock_code
                && (code_known || r.company_name == first.company_name)
        })
        .map(|r| TrendPoint {
            year: r.year,
            index_score: r.index_score,
        })
        .collect();
    points.sort_by_key(|p| p.year);

    Some(CompanyTrend {
        company_name: first.company_name.clone(),
        stock_code: first.stock_code.clone(),
        points,
    })
}

// ---------------------------------------------------------------------------
// Histogram (distribution chart)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistogramBin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

impl HistogramBin {
    pub fn center(&self) -> f64 {
        (self.start + self.end) / 2.0
    }

    pub fn width(&self) -> f64 {
        self.end - self.start
    }
}

/// Equal-width bins spanning min..=max of `scores`; the last bin is closed.
/// Empty input gives no bins, a single distinct value gives one bin.
pub fn histogram(scores: &[f64], bins: usize) -> Vec<HistogramBin> {
    let Some(&first) = scores.first() else {
        return Vec::new();
    };
    if bins == 0 {
        return Vec::new();
    }
    let (min, max) = scores
        .iter()
        .fold((first, first), |(lo, hi), &s| (lo.min(s), hi.max(s)));

    if max == min {
        return vec![HistogramBin {
            start: min - 0.5,
            end: max + 0.5,
            count: scores.len(),
        }];
    }

    let width = (max - min) / bins as f64;
    let mut counts = vec![0usize; bins];
    for &s in scores {
        let idx = (((s - min) / width) as usize).min(bins - 1);
        counts[idx] += 1;
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| HistogramBin {
            start: min + width * i as f64,
            end: min + width * (i + 1) as f64,
            count,
        })
        .collect()
}

/// Gaussian kernel density estimate over min..=max of `scores`, scaled to
/// histogram counts (density × n × `bin_width`) so it overlays the bars.
/// Bandwidth follows Scott's rule on the sample standard deviation. Fewer
/// than two distinct values give an empty curve.
pub fn density_curve(scores: &[f64], bin_width: f64, samples: usize) -> Vec<[f64; 2]> {
    let n = scores.len();
    if n < 2 || samples < 2 {
        return Vec::new();
    }
    let mean = scores.iter().sum::<f64>() / n as f64;
    let variance = scores.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
    let bandwidth = variance.sqrt() * (n as f64).powf(-0.2);
    if bandwidth.is_nan() || bandwidth <= 0.0 {
        return Vec::new();
    }

    let (min, max) = scores
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &s| (lo.min(s), hi.max(s)));
    let norm = (2.0 * std::f64::consts::PI).sqrt() * bandwidth * n as f64;
    let step = (max - min) / (samples - 1) as f64;

    (0..samples)
        .map(|i| {
            let x = min + step * i as f64;
            let density = scores
                .iter()
                .map(|s| (-0.5 * ((x - s) / bandwidth).powi(2)).exp())
                .sum::<f64>()
                / norm;
            [x, density * n as f64 * bin_width]
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::tests::record;
    use crate::data::model::Table;

    #[test]
    fn summary_of_empty_input_is_not_available() {
        let s = summary(std::iter::empty());
        assert_eq!(s.count, 0);
        assert_eq!((s.mean, s.max, s.min), (None, None, None));
    }

    #[test]
    fn summary_of_one_row_collapses() {
        let r = record("000001", "Alpha", 2020, "Banking", 42.5);
        let s = summary([&r]);
        assert_eq!(s.count, 1);
        assert_eq!(s.mean, Some(42.5));
        assert_eq!(s.max, Some(42.5));
        assert_eq!(s.min, Some(42.5));
    }

    #[test]
    fn summary_of_several_rows() {
        let table = Table::from_records(vec![
            record("000001", "A", 2020, "X", 10.0),
            record("000002", "B", 2020, "X", 20.0),
            record("000003", "C", 2020, "Y", 60.0),
        ]);
        let s = summary(table.records());
        assert_eq!(s.count, 3);
        assert_eq!(s.mean, Some(30.0));
        assert_eq!(s.max, Some(60.0));
        assert_eq!(s.min, Some(10.0));
    }

    #[test]
    fn technology_profile_averages_each_dimension() {
        let mut a = record("000001", "A", 2020, "X", 10.0);
        let mut b = record("000002", "B", 2020, "X", 20.0);
        a.technology = [2.0, 0.0, 0.0, 0.0, 0.0, 0.0, 10.0].map(Some);
        b.technology = [4.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0].map(Some);
        let profile = technology_profile([&a, &b]);
        assert_eq!(profile.len(), 7);
        assert_eq!(profile[0].dimension, TechDimension::ArtificialIntelligence);
        assert_eq!(profile[0].average, Some(3.0));
        assert_eq!(profile[1].average, Some(0.5));
        assert_eq!(profile[6].average, Some(5.0));

        let empty = technology_profile(std::iter::empty());
        assert!(empty.iter().all(|d| d.average.is_none()));
    }

    #[test]
    fn technology_profile_skips_missing_cells() {
        let mut a = record("000001", "A", 2020, "X", 10.0);
        let mut b = record("000002", "B", 2020, "X", 20.0);
        a.technology = [Some(10.0), Some(4.0), None, None, None, None, None];
        b.technology = [None, Some(2.0), None, None, None, None, None];
        let profile = technology_profile([&a, &b]);
        assert_eq!(profile[0].average, Some(10.0));
        assert_eq!(profile[1].average, Some(3.0));
        assert_eq!(profile[2].average, None);
    }

    #[test]
    fn industry_ranking_is_descending_with_stable_ties() {
        let table = Table::from_records(vec![
            record("000001", "A", 2020, "Mining", 40.0),
            record("000002", "B", 2020, "Banking", 30.0),
            record("000003", "C", 2020, "Software", 90.0),
            record("000004", "D", 2020, "Software", 70.0),
            record("000005", "E", 2020, "Agriculture", 40.0),
        ]);
        let ranking = industry_ranking(table.records());
        let names: Vec<_> = ranking.iter().map(|i| i.industry.as_str()).collect();
        assert_eq!(names, ["Software", "Agriculture", "Mining", "Banking"]);
        assert_eq!(ranking[0].average, 80.0);
        assert_eq!(ranking[0].count, 2);
        assert!(ranking.windows(2).all(|w| w[0].average >= w[1].average));
    }

    #[test]
    fn company_trend_is_sorted_by_year() {
        let table = Table::from_records(vec![
            record("000009", "Other", 2021, "X", 10.0),
            record("000042", "Acme", 2021, "X", 90.0),
            record("000042", "Acme", 2020, "X", 80.0),
        ]);
        let trend = company_trend(table.records(), "acme", "未知").unwrap();
        assert_eq!(trend.company_name, "Acme");
        assert_eq!(
            trend.points,
            vec![
                TrendPoint { year: 2020, index_score: 80.0 },
                TrendPoint { year: 2021, index_score: 90.0 },
            ]
        );
    }

    #[test]
    fn company_trend_picks_earliest_match_and_handles_no_match() {
        let table = Table::from_records(vec![
            record("000001", "Bank of Ningbo", 2021, "Banking", 50.0),
            record("000002", "Bank of Beijing", 2019, "Banking", 40.0),
            record("000002", "Bank of Beijing", 2020, "Banking", 45.0),
        ]);
        let trend = company_trend(table.records(), "BANK", "未知").unwrap();
        assert_eq!(trend.stock_code, "000002");
        assert_eq!(trend.points.len(), 2);

        assert!(company_trend(table.records(), "insurance", "未知").is_none());
        assert!(company_trend(table.records(), "", "未知").is_none());
    }

    #[test]
    fn company_trend_does_not_merge_unknown_codes() {
        let table = Table::from_records(vec![
            record("未知", "Alpha", 2020, "X", 50.0),
            record("未知", "Beta", 2021, "X", 90.0),
            record("未知", "Alpha", 2021, "X", 55.0),
            record("未知", "Gamma", 2022, "X", 10.0),
        ]);
        let trend = company_trend(table.records(), "alpha", "未知").unwrap();
        assert_eq!(trend.company_name, "Alpha");
        assert_eq!(
            trend.points,
            vec![
                TrendPoint { year: 2020, index_score: 50.0 },
                TrendPoint { year: 2021, index_score: 55.0 },
            ]
        );
    }

    #[test]
    fn histogram_bins_cover_all_scores() {
        let scores = [0.0, 10.0, 20.0, 50.0, 100.0];
        let bins = histogram(&scores, 4);
        assert_eq!(bins.len(), 4);
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), scores.len());
        assert_eq!(bins[0].count, 3);
        assert_eq!(bins[3].count, 1);
        assert_eq!(bins[3].end, 100.0);
        assert_eq!(bins[1].width(), 25.0);
    }

    #[test]
    fn histogram_edge_cases() {
        assert!(histogram(&[], 20).is_empty());
        let single = histogram(&[42.0, 42.0], 20);
        assert_eq!(single.len(), 1);
        assert_eq!(single[0].count, 2);
        assert_eq!(single[0].center(), 42.0);
    }

    #[test]
    fn density_curve_spans_the_scores_and_peaks_in_the_middle() {
        let curve = density_curve(&[0.0, 10.0, 20.0], 5.0, 101);
        assert_eq!(curve.len(), 101);
        assert_eq!(curve[0][0], 0.0);
        assert!((curve[100][0] - 20.0).abs() < 1e-9);
        assert!(curve[50][1] > curve[0][1]);
        assert!((curve[0][1] - curve[100][1]).abs() < 1e-9);
    }

    #[test]
    fn density_curve_needs_spread() {
        assert!(density_curve(&[], 1.0, 50).is_empty());
        assert!(density_curve(&[42.0], 1.0, 50).is_empty());
        assert!(density_curve(&[42.0, 42.0], 1.0, 50).is_empty());
    }
}
