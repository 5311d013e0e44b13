//! Folding samples into fixed-duration forecast blocks.
//!
//! Partitions a request window into consecutive spans and folds the
//! samples inside each span into one representative value per field.
//! Spans with no contributing samples are omitted, never fabricated.
//!
//! Fold rules:
//! - temperature, wind speed, precipitation amount → arithmetic mean
//! - precipitation and thunder probability → maximum
//! - condition code → most severe present
//! - wind direction → circular mean of unit vectors, so {359°, 1°}
//!   folds to ≈0° rather than 180°

use chrono::{DateTime, Duration, Utc};

use crate::domain::{ConditionCode, ForecastBlock, ForecastSample};

/// Partition `[start, end)` into consecutive `block_size` spans and
/// fold the samples inside each.
///
/// Input ordering never affects the output. The final span keeps its
/// nominal `block_size` even when it extends past `end`; only samples
/// before `end` contribute anywhere.
///
/// # Panics
///
/// Panics if `block_size` is not positive.
pub fn aggregate(
    samples: &[ForecastSample],
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    block_size: Duration,
) -> Vec<ForecastBlock> {
    assert!(block_size > Duration::zero(), "block_size must be positive");

    // Sort a working copy into a total order over every field that
    // feeds a floating-point fold, so the folds are independent of
    // input order even among samples tied on the leading fields.
    let mut sorted: Vec<&ForecastSample> = samples.iter().filter(|s| s.timestamp < end).collect();
    sorted.sort_by(|a, b| {
        a.timestamp
            .cmp(&b.timestamp)
            .then_with(|| a.temperature_c.total_cmp(&b.temperature_c))
            .then_with(|| a.precipitation_mm.total_cmp(&b.precipitation_mm))
            .then_with(|| a.wind_speed_mps.total_cmp(&b.wind_speed_mps))
            .then_with(|| {
                match (a.wind_direction_deg, b.wind_direction_deg) {
                    (Some(x), Some(y)) => x.total_cmp(&y),
                    (Some(_), None) => std::cmp::Ordering::Greater,
                    (None, Some(_)) => std::cmp::Ordering::Less,
                    (None, None) => std::cmp::Ordering::Equal,
                }
            })
            .then_with(|| a.condition.cmp(&b.condition))
            .then_with(|| {
                (a.precipitation_probability, a.thunder_probability)
                    .cmp(&(b.precipitation_probability, b.thunder_probability))
            })
    });

    let mut blocks = Vec::new();
    let mut cursor = start;

    while cursor < end {
        let block_end = cursor + block_size;
        let in_block: Vec<&ForecastSample> = sorted
            .iter()
            .copied()
            .filter(|s| s.timestamp >= cursor && s.timestamp < block_end)
            .collect();

        if !in_block.is_empty() {
            blocks.push(fold(cursor, block_size, &in_block));
        }

        cursor = block_end;
    }

    blocks
}

fn fold(start: DateTime<Utc>, block_size: Duration, samples: &[&ForecastSample]) -> ForecastBlock {
    let n = samples.len() as f64;

    let temperature_c = samples.iter().map(|s| s.temperature_c).sum::<f64>() / n;
    let wind_speed_mps = samples.iter().map(|s| s.wind_speed_mps).sum::<f64>() / n;
    let precipitation_mm = samples.iter().map(|s| s.precipitation_mm).sum::<f64>() / n;

    let precipitation_probability = samples
        .iter()
        .map(|s| s.precipitation_probability)
        .max()
        .unwrap_or(0);
    let thunder_probability = samples
        .iter()
        .map(|s| s.thunder_probability)
        .max()
        .unwrap_or(0);

    // Most severe condition wins so the summary never under-reports
    // risk.
    let condition = samples
        .iter()
        .map(|s| s.condition)
        .max()
        .unwrap_or(ConditionCode::generic_fallback());

    ForecastBlock {
        start,
        block_size,
        sample: ForecastSample {
            timestamp: start,
            temperature_c,
            precipitation_mm,
            precipitation_probability,
            wind_speed_mps,
            wind_direction_deg: circular_mean(samples),
            condition,
            thunder_probability,
        },
    }
}

/// Circular mean of the reported wind directions, `None` when no
/// sample carries one. Summing unit vectors avoids the 359°/1° wrap
/// bug a plain arithmetic mean would have.
fn circular_mean(samples: &[&ForecastSample]) -> Option<f64> {
    let mut sum_sin = 0.0;
    let mut sum_cos = 0.0;
    let mut count = 0usize;

    for s in samples {
        if let Some(deg) = s.wind_direction_deg {
            let rad = deg.to_radians();
            sum_sin += rad.sin();
            sum_cos += rad.cos();
            count += 1;
        }
    }

    if count == 0 {
        return None;
    }

    Some(sum_sin.atan2(sum_cos).to_degrees().rem_euclid(360.0))
}
