use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use dt_index_dashboard::config::ColumnNames;
use dt_index_dashboard::data::model::TechDimension;
use parquet::arrow::ArrowWriter;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }

    fn below(&mut self, n: usize) -> usize {
        (self.next_f64() * n as f64) as usize % n
    }
}

/// Industry label and its base digitalisation level.
const INDUSTRIES: [(&str, f64); 8] = [
    ("软件和信息技术服务业", 55.0),
    ("计算机、通信和其他电子设备制造业", 45.0),
    ("货币金融服务", 40.0),
    ("医药制造业", 25.0),
    ("汽车制造业", 28.0),
    ("房地产业", 15.0),
    ("电力、热力生产和供应业", 18.0),
    ("酒、饮料和精制茶制造业", 12.0),
];

const FIRMS: usize = 120;
const FIRST_YEAR: i64 = 1999;
const LAST_YEAR: i64 = 2023;

#[derive(Default)]
struct Columns {
    stock_code: Vec<i64>,
    company_name: Vec<String>,
    year: Vec<i64>,
    industry: Vec<Option<String>>,
    score: Vec<f64>,
    total: Vec<f64>,
    dimensions: [Vec<f64>; 7],
}

fn generate(rng: &mut SimpleRng) -> Columns {
    let mut cols = Columns::default();

    for firm in 0..FIRMS {
        // Mix of Shenzhen (short, padded on load) and Shanghai codes.
        let code = if firm % 2 == 0 { 1 + firm as i64 * 7 } else { 600000 + firm as i64 * 3 };
        let (industry, base) = INDUSTRIES[rng.below(INDUSTRIES.len())];
        let missing_industry = firm % 29 == 0;
        let listed = FIRST_YEAR + rng.below(12) as i64;
        let slope = rng.gauss(1.4, 0.5).max(0.1);

        for year in listed..=LAST_YEAR {
            let score = (base * 0.4 + slope * (year - FIRST_YEAR) as f64 + rng.gauss(0.0, 4.0))
                .clamp(0.0, 100.0);

            let mut total = 0.0;
            for dim in TechDimension::ALL {
                let freq = (score * rng.next_f64() * 0.6).round();
                cols.dimensions[dim.index()].push(freq);
                total += freq;
            }

            cols.stock_code.push(code);
            cols.company_name.push(format!("示例企业{firm:03}"));
            cols.year.push(year);
            cols.industry
                .push((!missing_industry).then(|| industry.to_string()));
            cols.score.push((score * 100.0).round() / 100.0);
            cols.total.push(total);
        }
    }
    cols
}

fn write_parquet(cols: &Columns, names: &ColumnNames, path: &str) -> Result<()> {
    let mut fields = vec![
        Field::new(&names.stock_code, DataType::Int64, false),
        Field::new(&names.company_name, DataType::Utf8, false),
        Field::new(&names.year, DataType::Int64, false),
        Field::new(&names.industry_name, DataType::Utf8, true),
        Field::new(&names.index_score, DataType::Float64, false),
        Field::new(&names.total_word_frequency, DataType::Float64, false),
    ];
    let mut arrays: Vec<ArrayRef> = vec![
        Arc::new(Int64Array::from(cols.stock_code.clone())),
        Arc::new(StringArray::from(cols.company_name.clone())),
        Arc::new(Int64Array::from(cols.year.clone())),
        Arc::new(StringArray::from(cols.industry.clone())),
        Arc::new(Float64Array::from(cols.score.clone())),
        Arc::new(Float64Array::from(cols.total.clone())),
    ];
    for dim in TechDimension::ALL {
        fields.push(Field::new(names.dimension(dim), DataType::Float64, false));
        arrays.push(Arc::new(Float64Array::from(cols.dimensions[dim.index()].clone())));
    }

    let schema = Arc::new(Schema::new(fields));
    let batch = RecordBatch::try_new(schema.clone(), arrays).context("building record batch")?;

    let file = std::fs::File::create(path).with_context(|| format!("creating {path}"))?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

fn write_csv(cols: &Columns, names: &ColumnNames, path: &str) -> Result<()> {
    let mut out = csv::Writer::from_path(path).with_context(|| format!("creating {path}"))?;

    let mut header = vec![
        names.stock_code.clone(),
        names.company_name.clone(),
        names.year.clone(),
        names.industry_name.clone(),
        names.index_score.clone(),
        names.total_word_frequency.clone(),
    ];
    header.extend(names.dimensions.iter().cloned());
    out.write_record(&header)?;

    for i in 0..cols.year.len() {
        let mut row = vec![
            cols.stock_code[i].to_string(),
            cols.company_name[i].clone(),
            cols.year[i].to_string(),
            cols.industry[i].clone().unwrap_or_default(),
            cols.score[i].to_string(),
            cols.total[i].to_string(),
        ];
        row.extend(cols.dimensions.iter().map(|d| d[i].to_string()));
        out.write_record(&row)?;
    }
    out.flush()?;
    Ok(())
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let cols = generate(&mut rng);
    let names = ColumnNames::default();

    write_parquet(&cols, &names, "sample_index.parquet")?;
    write_csv(&cols, &names, "sample_index.csv")?;

    println!(
        "Wrote {} firm-years for {FIRMS} firms to sample_index.parquet and sample_index.csv",
        cols.year.len()
    );
    Ok(())
}
