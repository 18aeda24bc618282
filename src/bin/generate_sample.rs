//! Writes `sample_curves.parquet`: synthetic learning curves with the kinds of
//! defects the cleaners remove (missing tails, short runs, flat curves).

use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Float64Builder, Int64Array, ListBuilder};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

const N_LEARNERS: i64 = 24;
const CURVES_PER_LEARNER: usize = 10;
const ANCHORS: usize = 120;

/// Saturating power-law learning curve: accuracy rising towards `ceiling`.
fn learning_curve(n: usize, ceiling: f64, rate: f64, noise: f64, rng: &mut SplitMix) -> Vec<f64> {
    (1..=n)
        .map(|t| {
            let base = ceiling * (1.0 - (t as f64).powf(-rate));
            base + noise * (rng.next_f64() - 0.5)
        })
        .collect()
}

/// Tiny deterministic generator (SplitMix64), enough for sample data.
struct SplitMix(u64);

impl SplitMix {
    fn next_u64(&mut self) -> u64 {
        self.0 = self.0.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.0;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn below(&mut self, n: usize) -> usize {
        (self.next_u64() % n as u64) as usize
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let mut rng = SplitMix(42);

    let mut curve_builder = ListBuilder::new(Float64Builder::new());
    let mut labels = Vec::new();

    for learner in 0..N_LEARNERS {
        let ceiling = 0.6 + 0.35 * rng.next_f64();
        let rate = 0.3 + 0.7 * rng.next_f64();

        for _ in 0..CURVES_PER_LEARNER {
            let mut curve = match rng.below(10) {
                // flat: a learner that never improves
                0 => vec![ceiling; ANCHORS],
                // too short: run stopped early
                1 => learning_curve(20 + rng.below(30), ceiling, rate, 0.01, &mut rng),
                _ => learning_curve(ANCHORS, ceiling, rate, 0.01, &mut rng),
            };

            // missing tail, as when a run times out
            if rng.below(4) == 0 {
                let cut = curve.len() / 2 + rng.below(curve.len() / 2);
                curve[cut..].fill(f64::NAN);
            }

            let values = curve_builder.values();
            for v in &curve {
                if v.is_nan() {
                    values.append_null();
                } else {
                    values.append_value(*v);
                }
            }
            curve_builder.append(true);
            labels.push(learner);
        }
    }

    let curve_array = curve_builder.finish();
    let label_array = Int64Array::from(labels);

    let schema = Arc::new(Schema::new(vec![
        Field::new(
            "curve",
            DataType::List(Arc::new(Field::new("item", DataType::Float64, true))),
            false,
        ),
        Field::new("label", DataType::Int64, false),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![Arc::new(curve_array), Arc::new(label_array)],
    )
    .context("building record batch")?;

    let path = "sample_curves.parquet";
    let file = std::fs::File::create(path).context("creating output file")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("opening parquet writer")?;
    writer.write(&batch).context("writing batch")?;
    writer.close().context("closing parquet writer")?;

    log::info!("Wrote {} curves to {path}", batch.num_rows());
    println!("Wrote {} curves to {path}", batch.num_rows());
    Ok(())
}
