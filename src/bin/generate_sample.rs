use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::record_batch::RecordBatch;
use chrono::{Duration, NaiveDate};
use parquet::arrow::ArrowWriter;

const ROWS: usize = 10_000;

const COUNTRIES: [&str; 10] = [
    "USA", "China", "UK", "UAE", "Brazil", "India", "Russia", "Singapore", "Switzerland",
    "South Africa",
];
const TYPES: [&str; 5] = [
    "Offshore Transfer",
    "Stocks Transfer",
    "Cash Withdrawal",
    "Cryptocurrency",
    "Property Purchase",
];
const INDUSTRIES: [&str; 7] = [
    "Construction",
    "Luxury Goods",
    "Real Estate",
    "Oil & Gas",
    "Finance",
    "Casinos",
    "Arms Trade",
];
const TAX_HAVENS: [&str; 6] = [
    "Singapore",
    "Bahamas",
    "Switzerland",
    "Panama",
    "Luxembourg",
    "Cayman Islands",
];

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

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[(self.next_u64() % items.len() as u64) as usize]
    }

    fn range(&mut self, lo: i64, hi: i64) -> i64 {
        lo + (self.next_u64() % (hi - lo + 1) as u64) as i64
    }
}

struct Columns {
    id: Vec<String>,
    country: Vec<String>,
    amount: Vec<f64>,
    kind: Vec<String>,
    date: Vec<String>,
    industry: Vec<String>,
    risk: Vec<i64>,
    shell_companies: Vec<i64>,
    tax_haven: Vec<String>,
}

fn generate(rng: &mut SimpleRng, rows: usize) -> Columns {
    let start = NaiveDate::from_ymd_opt(2013, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .expect("valid start timestamp");

    let mut cols = Columns {
        id: Vec::with_capacity(rows),
        country: Vec::with_capacity(rows),
        amount: Vec::with_capacity(rows),
        kind: Vec::with_capacity(rows),
        date: Vec::with_capacity(rows),
        industry: Vec::with_capacity(rows),
        risk: Vec::with_capacity(rows),
        shell_companies: Vec::with_capacity(rows),
        tax_haven: Vec::with_capacity(rows),
    };

    for i in 0..rows {
        let kind = rng.pick(&TYPES);
        let risk = rng.range(1, 10);
        // Riskier transfers skew towards larger amounts.
        let amount = 10_000.0 + rng.next_f64() * 4_990_000.0 * (0.5 + risk as f64 / 20.0);

        cols.id.push(format!("TX{:010}", i + 1));
        cols.country.push(rng.pick(&COUNTRIES).to_string());
        cols.amount.push((amount * 100.0).round() / 100.0);
        cols.kind.push(kind.to_string());
        let timestamp = start + Duration::hours(i as i64);
        cols.date.push(timestamp.format("%Y-%m-%d %H:%M:%S").to_string());
        cols.industry.push(rng.pick(&INDUSTRIES).to_string());
        cols.risk.push(risk);
        cols.shell_companies.push(rng.range(0, 9));
        cols.tax_haven.push(rng.pick(&TAX_HAVENS).to_string());
    }
    cols
}

fn write_csv(cols: &Columns, path: &str) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("creating CSV output")?;
    writer.write_record([
        "Transaction ID",
        "Country",
        "Amount (USD)",
        "Transaction Type",
        "Date of Transaction",
        "Industry",
        "Money Laundering Risk Score",
        "Shell Companies Involved",
        "Tax Haven Country",
    ])?;
    for i in 0..cols.id.len() {
        let record = [
            cols.id[i].clone(),
            cols.country[i].clone(),
            cols.amount[i].to_string(),
            cols.kind[i].clone(),
            cols.date[i].clone(),
            cols.industry[i].clone(),
            cols.risk[i].to_string(),
            cols.shell_companies[i].to_string(),
            cols.tax_haven[i].clone(),
        ];
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}

fn write_parquet(cols: &Columns, path: &str) -> Result<()> {
    let strings = |v: &[String]| -> ArrayRef {
        Arc::new(StringArray::from(v.iter().map(String::as_str).collect::<Vec<_>>()))
    };

    let batch = RecordBatch::try_from_iter(vec![
        ("Transaction ID", strings(&cols.id)),
        ("Country", strings(&cols.country)),
        ("Amount (USD)", Arc::new(Float64Array::from(cols.amount.clone())) as ArrayRef),
        ("Transaction Type", strings(&cols.kind)),
        ("Date of Transaction", strings(&cols.date)),
        ("Industry", strings(&cols.industry)),
        (
            "Money Laundering Risk Score",
            Arc::new(Int64Array::from(cols.risk.clone())) as ArrayRef,
        ),
        (
            "Shell Companies Involved",
            Arc::new(Int64Array::from(cols.shell_companies.clone())) as ArrayRef,
        ),
        ("Tax Haven Country", strings(&cols.tax_haven)),
    ])
    .context("building record batch")?;

    let file = std::fs::File::create(path).context("creating Parquet output")?;
    let mut writer = ArrowWriter::try_new(file, batch.schema(), None)?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let cols = generate(&mut rng, ROWS);

    write_csv(&cols, "sample_transactions.csv")?;
    write_parquet(&cols, "sample_transactions.parquet")?;

    println!(
        "Wrote {ROWS} transactions to sample_transactions.csv and sample_transactions.parquet"
    );
    Ok(())
}
