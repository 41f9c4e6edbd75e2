use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

const HEADERS: [&str; 13] = [
    "Ref.",
    "Explanation Modality",
    "Explanation Format",
    "AI Model",
    "Application Domain",
    "XAI Type",
    "XAI Technique",
    "XAI Method",
    "Decision-Making Task",
    "Audience",
    "Over-reliance",
    "Under-reliance",
    "Appropriate reliance",
];

const MODALITIES: [(&str, &[&str]); 4] = [
    ("Visual", &["Saliency map", "Bar chart", "Heatmap"]),
    ("Textual", &["Natural language", "Rules"]),
    ("Numerical", &["Confidence score", "Feature weights"]),
    ("Example-based", &["Counterfactual", "Prototype"]),
];
const AI_MODELS: [&str; 4] = ["CNN", "Random forest", "Gradient boosting", "LLM"];
const DOMAINS: [&str; 4] = ["Healthcare", "Finance", "Recruitment", "Law"];
const XAI_TYPES: [(&str, &[(&str, &str)]); 2] = [
    ("Post-hoc", &[("Feature attribution", "SHAP"), ("Feature attribution", "LIME"), ("Visualisation", "Grad-CAM")]),
    ("Intrinsic", &[("Rule extraction", "Decision rules"), ("Example-based", "Nearest neighbour")]),
];
const TASKS: [&str; 4] = ["Diagnosis", "Loan approval", "Candidate screening", "Risk assessment"];
const AUDIENCES: [&str; 3] = ["Domain experts", "Lay users", "Data scientists"];

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

    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[(self.next_u64() % items.len() as u64) as usize]
    }

    /// `Increase`, `Decrease` or nothing recorded.
    fn effect(&mut self, recorded: f64) -> String {
        if self.next_f64() >= recorded {
            return String::new();
        }
        let label = if self.next_f64() < 0.5 { "Increase" } else { "Decrease" };
        label.to_string()
    }
}

fn generate_rows(n: usize, rng: &mut SimpleRng) -> Vec<[String; 13]> {
    (1..=n)
        .map(|i| {
            let (modality, formats) = rng.pick(&MODALITIES);
            let format = rng.pick(formats);
            let (xai_type, techniques) = rng.pick(&XAI_TYPES);
            let (technique, method) = rng.pick(techniques);
            [
                format!("R{i:03}"),
                modality.to_string(),
                format.to_string(),
                rng.pick(&AI_MODELS).to_string(),
                rng.pick(&DOMAINS).to_string(),
                xai_type.to_string(),
                technique.to_string(),
                method.to_string(),
                rng.pick(&TASKS).to_string(),
                rng.pick(&AUDIENCES).to_string(),
                rng.effect(0.6),
                rng.effect(0.35),
                rng.effect(0.5),
            ]
        })
        .collect()
}

fn write_csv(path: &str, rows: &[[String; 13]]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).with_context(|| format!("creating {path}"))?;
    writer.write_record(HEADERS)?;
    for row in rows {
        writer.write_record(row)?;
    }
    writer.flush()?;
    Ok(())
}

fn write_parquet(path: &str, rows: &[[String; 13]]) -> Result<()> {
    let schema = Arc::new(Schema::new(
        HEADERS
            .iter()
            .map(|h| Field::new(*h, DataType::Utf8, true))
            .collect::<Vec<_>>(),
    ));

    // Empty outcome cells become nulls, as pandas would write them.
    let columns: Vec<ArrayRef> = (0..HEADERS.len())
        .map(|col| {
            let values: Vec<Option<&str>> = rows
                .iter()
                .map(|row| Some(row[col].as_str()).filter(|s| !s.is_empty()))
                .collect();
            Arc::new(StringArray::from(values)) as ArrayRef
        })
        .collect();

    let batch = RecordBatch::try_new(schema.clone(), columns).context("building record batch")?;
    let file = std::fs::File::create(path).with_context(|| format!("creating {path}"))?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let rows = generate_rows(120, &mut rng);

    write_csv("sample_reviews.csv", &rows)?;
    write_parquet("sample_reviews.parquet", &rows)?;

    println!(
        "Wrote {} studies to sample_reviews.csv and sample_reviews.parquet",
        rows.len()
    );
    Ok(())
}
