use super::aggregate::{
    self, CompanyTrend, DimensionAverage, HistogramBin, IndustryAverage, Summary,
};
use super::filter::{self, FilterCriteria};
use super::model::Table;
use super::present::{self, RankedRow};
use crate::config::{Sentinels, ViewConfig};

/// Points along the density curve drawn over the histogram.
const DENSITY_SAMPLES: usize = 200;

/// Everything one render of the dashboard needs, computed in a single pass
/// from the shared table and the current selection.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Dashboard {
    pub summary: Summary,
    /// Index scores of the filtered selection, for the distribution chart.
    pub scores: Vec<f64>,
    pub histogram: Vec<HistogramBin>,
    /// Smoothed density over the histogram, in count units.
    pub density: Vec<[f64; 2]>,
    /// Empty when the selection is empty.
    pub technology_profile: Vec<DimensionAverage>,
    pub ranking: Vec<RankedRow>,
    /// Every industry of the selected year, truncated to the chart limit.
    pub industry_ranking: Vec<IndustryAverage>,
    /// Only computed when the search box is non-empty.
    pub trend: Option<CompanyTrend>,
    /// Most populous industries of the whole table, offered when the
    /// selection is empty.
    pub suggested_industries: Vec<String>,
}

impl Dashboard {
    /// No record passed the filters.
    pub fn is_empty(&self) -> bool {
        self.summary.count == 0
    }
}

/// Run filter → aggregate → present for one interaction.
pub fn build_dashboard(
    table: &Table,
    criteria: &FilterCriteria,
    view: &ViewConfig,
    sentinels: &Sentinels,
) -> Dashboard {
    let selection = filter::filter(table, criteria);
    let summary = aggregate::summary(selection.iter().copied());
    let scores: Vec<f64> = selection.iter().map(|r| r.index_score).collect();

    let technology_profile = if selection.is_empty() {
        Vec::new()
    } else {
        aggregate::technology_profile(selection.iter().copied())
    };

    let mut industry_ranking =
        aggregate::industry_ranking(filter::records_for_year(table, criteria.year));
    industry_ranking.truncate(view.industry_chart_limit);

    let suggested_industries = if selection.is_empty() {
        present::top_n_by_count(
            table.records(),
            |r| r.industry_name.clone(),
            view.fallback_industries,
        )
    } else {
        Vec::new()
    };

    log::debug!(
        "Recomputed dashboard: year={} industry={:?} range={:?} search={:?} -> {} rows",
        criteria.year,
        criteria.industry,
        criteria.index_range,
        criteria.search,
        selection.len()
    );

    let histogram = aggregate::histogram(&scores, view.histogram_bins);
    let density = histogram
        .first()
        .map(|bin| aggregate::density_curve(&scores, bin.width(), DENSITY_SAMPLES))
        .unwrap_or_default();

    Dashboard {
        summary,
        histogram,
        density,
        scores,
        technology_profile,
        ranking: present::rank_and_truncate(selection.iter().copied(), view.ranking_limit),
        industry_ranking,
        trend: aggregate::company_trend(
            table.records(),
            &criteria.search,
            &sentinels.unknown_stock_code,
        ),
        suggested_industries,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::{IndustrySelection, ScoreRange};
    use crate::data::model::tests::record;

    fn sample() -> Table {
        let mut records = Vec::new();
        for i in 0..25 {
            let industry = if i % 3 == 0 { "Banking" } else { "Software" };
            records.push(record(
                &format!("{:06}", i + 1),
                &format!("Firm {i}"),
                2021,
                industry,
                i as f64 * 4.0,
            ));
        }
        records.push(record("000100", "Acme", 2020, "Mining", 80.0));
        records.push(record("000100", "Acme", 2021, "Mining", 90.0));
        Table::from_records(records)
    }

    fn criteria() -> FilterCriteria {
        FilterCriteria {
            year: 2021,
            industry: IndustrySelection::All,
            index_range: ScoreRange::new(0.0, 100.0),
            search: String::new(),
        }
    }

    #[test]
    fn populated_dashboard() {
        let table = sample();
        let view = ViewConfig::default();
        let dash = build_dashboard(&table, &criteria(), &view, &Sentinels::default());

        assert_eq!(dash.summary.count, 26);
        assert_eq!(dash.scores.len(), 26);
        assert_eq!(dash.ranking.len(), view.ranking_limit);
        assert_eq!(dash.ranking[0].company_name, "Firm 24");
        assert_eq!(dash.technology_profile.len(), 7);
        assert_eq!(dash.industry_ranking.len(), 3);
        assert_eq!(dash.industry_ranking[0].industry, "Mining");
        assert!(dash.trend.is_none());
        assert!(dash.suggested_industries.is_empty());
        assert_eq!(dash.histogram.iter().map(|b| b.count).sum::<usize>(), 26);
        assert_eq!(dash.density.len(), 200);
    }

    #[test]
    fn industry_chart_ignores_industry_and_search_filters() {
        let table = sample();
        let mut c = criteria();
        c.industry = IndustrySelection::Only("Banking".into());
        c.search = "acme".into();
        let dash = build_dashboard(&table, &c, &ViewConfig::default(), &Sentinels::default());

        assert!(dash.is_empty());
        assert_eq!(dash.industry_ranking.len(), 3);
        let trend = dash.trend.expect("trend spans all years");
        assert_eq!(trend.points.len(), 2);
        assert_eq!(trend.points[0].year, 2020);
    }

    #[test]
    fn empty_selection_offers_populous_industries() {
        let table = sample();
        let mut c = criteria();
        c.year = 1999;
        let dash = build_dashboard(&table, &c, &ViewConfig::default(), &Sentinels::default());

        assert!(dash.is_empty());
        assert_eq!(dash.summary.mean, None);
        assert!(dash.histogram.is_empty());
        assert!(dash.density.is_empty());
        assert!(dash.technology_profile.is_empty());
        assert!(dash.ranking.is_empty());
        assert!(dash.industry_ranking.is_empty());
        assert_eq!(dash.suggested_industries, ["Software", "Banking", "Mining"]);
    }
}
