use std::collections::HashMap;
use std::hash::Hash;
use std::io::Write;

use anyhow::{Context, Result};

use super::model::Record;

// ---------------------------------------------------------------------------
// Ranked table
// ---------------------------------------------------------------------------

/// One line of the ranking table.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedRow {
    /// 1-based position in descending score order.
    pub rank: usize,
    pub stock_code: String,
    pub company_name: String,
    pub industry_name: String,
    pub index_score: f64,
    pub total_word_frequency: Option<f64>,
}

/// Sort by index score (highest first, stable for equal scores), number the
/// rows from 1 and keep at most `limit` of them.
pub fn rank_and_truncate<'a>(
    records: impl IntoIterator<Item = &'a Record>,
    limit: usize,
) -> Vec<RankedRow> {
    let mut sorted: Vec<&Record> = records.into_iter().collect();
    sorted.sort_by(|a, b| b.index_score.total_cmp(&a.index_score));

    sorted
        .into_iter()
        .take(limit)
        .enumerate()
        .map(|(i, r)| RankedRow {
            rank: i + 1,
            stock_code: r.stock_code.clone(),
            company_name: r.company_name.clone(),
            industry_name: r.industry_name.clone(),
            index_score: r.index_score,
            total_word_frequency: r.total_word_frequency,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Most populous groups
// ---------------------------------------------------------------------------

/// The `n` keys with the most records, largest first. Equal counts keep the
/// order in which the keys were first seen.
pub fn top_n_by_count<'a, K, F>(
    records: impl IntoIterator<Item = &'a Record>,
    group_key: F,
    n: usize,
) -> Vec<K>
where
    K: Eq + Hash + Clone,
    F: Fn(&Record) -> K,
{
    let mut order: Vec<K> = Vec::new();
    let mut counts: HashMap<K, usize> = HashMap::new();
    for r in records {
        let key = group_key(r);
        let count = counts.entry(key.clone()).or_insert_with(|| {
            order.push(key);
            0
        });
        *count += 1;
    }

    let mut ranked: Vec<(K, usize)> = order
        .into_iter()
        .map(|k| {
            let c = counts.get(&k).copied().unwrap_or(0);
            (k, c)
        })
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked.into_iter().take(n).map(|(k, _)| k).collect()
}

// ---------------------------------------------------------------------------
// CSV export
// ---------------------------------------------------------------------------

/// Write the ranking table as CSV with a header row.
pub fn export_ranking_csv<W: Write>(rows: &[RankedRow], writer: W) -> Result<()> {
    let mut out = csv::Writer::from_writer(writer);
    out.write_record([
        "rank",
        "stock_code",
        "company_name",
        "industry_name",
        "index_score",
        "total_word_frequency",
    ])
    .context("writing CSV header")?;

    for row in rows {
        out.write_record([
            row.rank.to_string(),
            row.stock_code.clone(),
            row.company_name.clone(),
            row.industry_name.clone(),
            row.index_score.to_string(),
            row.total_word_frequency.map(|v| v.to_string()).unwrap_or_default(),
        ])
        .with_context(|| format!("writing rank {}", row.rank))?;
    }
    out.flush().context("flushing CSV")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::tests::record;
    use crate::data::model::Table;

    fn sample() -> Table {
        Table::from_records(vec![
            record("000001", "A", 2020, "Banking", 30.0),
            record("000002", "B", 2020, "Software", 90.0),
            record("000003", "C", 2020, "Banking", 60.0),
            record("000004", "D", 2021, "Mining", 75.0),
            record("000005", "E", 2021, "Software", 60.0),
            record("000006", "F", 2021, "Banking", 10.0),
        ])
    }

    #[test]
    fn ranks_are_contiguous_in_descending_order() {
        let table = sample();
        let rows = rank_and_truncate(table.records(), 20);
        assert_eq!(rows.len(), 6);
        assert_eq!(rows.iter().map(|r| r.rank).collect::<Vec<_>>(), (1..=6).collect::<Vec<_>>());
        assert!(rows.windows(2).all(|w| w[0].index_score >= w[1].index_score));
        // equal scores keep table order
        assert_eq!(rows[2].stock_code, "000003");
        assert_eq!(rows[3].stock_code, "000005");
    }

    #[test]
    fn truncates_to_limit() {
        let table = sample();
        let rows = rank_and_truncate(table.records(), 2);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].company_name, "B");
        assert_eq!(rows[1].rank, 2);
        assert!(rank_and_truncate(std::iter::empty(), 20).is_empty());
    }

    #[test]
    fn top_groups_by_count() {
        let table = sample();
        let top = top_n_by_count(table.records(), |r| r.industry_name.clone(), 2);
        assert_eq!(top, ["Banking", "Software"]);

        let all = top_n_by_count(table.records(), |r| r.industry_name.clone(), 10);
        assert_eq!(all, ["Banking", "Software", "Mining"]);
    }

    #[test]
    fn export_writes_header_and_rows() {
        let table = sample();
        let rows = rank_and_truncate(table.records(), 2);
        let mut buf = Vec::new();
        export_ranking_csv(&rows, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], "rank,stock_code,company_name,industry_name,index_score,total_word_frequency");
        assert_eq!(lines[1], "1,000002,B,Software,90,28");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn export_leaves_missing_word_frequency_blank() {
        let mut r = record("000007", "G", 2020, "Mining", 55.0);
        r.total_word_frequency = None;
        let rows = rank_and_truncate([&r], 20);
        let mut buf = Vec::new();
        export_ranking_csv(&rows, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text.lines().nth(1), Some("1,000007,G,Mining,55,"));
    }
}
