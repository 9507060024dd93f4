//! Binned aggregation of perturbation deltas.
//!
//! Not a statistics framework: exactly the mean/std/count bins the `.stat`
//! tables need — one per algorithm, with the IST rows additionally split by
//! the truth temperature bands the ice retrieval itself switches on.

use serde::Serialize;

use crate::domain::Algorithm;
use crate::error::AppError;
use crate::store::{QueryFilter, ResultStore};

pub mod format;

/// Truth temperature edges for the IST sub-bins (K).
const IST_SPLITS: [(&str, f64, f64); 3] = [
    ("ist_lt_240", f64::NEG_INFINITY, 240.0),
    ("ist_gt_240_lt_260", 240.0, 260.0),
    ("ist_gt_260", 260.0, f64::INFINITY),
];

/// Mean/std/count of `(perturbed - truth)` for one bin.
#[derive(Debug, Clone, Serialize)]
pub struct AlgorithmStats {
    pub label: String,
    pub mean: f64,
    pub std: f64,
    pub n: usize,
}

/// Compute the per-algorithm delta statistics.
///
/// `base` supplies the cross-cutting filters (latitude, angle difference);
/// its `algorithm` field restricts the report to one algorithm's bins, and
/// its `temperature_range` applies to the plain per-algorithm rows (the IST
/// sub-bins carry their own ranges).
pub fn algorithm_stats(
    store: &ResultStore,
    base: &QueryFilter,
) -> Result<Vec<AlgorithmStats>, AppError> {
    let algorithms: Vec<Algorithm> = match base.algorithm {
        Some(algorithm) => vec![algorithm],
        None => Algorithm::ALL.to_vec(),
    };

    let mut out = Vec::new();
    for algorithm in algorithms {
        let mut filter = base.clone();
        filter.algorithm = Some(algorithm);
        out.push(bin_stats(store, algorithm.name(), &filter)?);

        if algorithm == Algorithm::Ist {
            for (label, low, high) in IST_SPLITS {
                let mut filter = base.clone();
                filter.algorithm = Some(Algorithm::Ist);
                filter.temperature_range = Some((low, high));
                out.push(bin_stats(store, label, &filter)?);
            }
        }
    }
    Ok(out)
}

fn bin_stats(store: &ResultStore, label: &str, filter: &QueryFilter) -> Result<AlgorithmStats, AppError> {
    let rows = store.query(filter, &[])?;
    let deltas: Vec<f64> = rows.iter().map(|r| r.delta).filter(|d| !d.is_nan()).collect();
    let (mean, std) = mean_and_std(&deltas);
    Ok(AlgorithmStats {
        label: label.to_string(),
        mean,
        std,
        n: deltas.len(),
    })
}

/// Population mean and standard deviation; `NaN` for an empty bin.
fn mean_and_std(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (f64::NAN, f64::NAN);
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n;
    (mean, variance.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{PerturbationRecord, SwathRecord};
    use chrono::NaiveDate;

    fn seed_store() -> ResultStore {
        let mut store = ResultStore::open_in_memory().unwrap();
        let insert = |store: &mut ResultStore, truth: f64, algorithm: Algorithm, deltas: &[f64]| {
            let record = SwathRecord {
                satellite: "noaa7".to_string(),
                surface_temp: truth,
                t11: truth - 0.5,
                t12: truth - 1.0,
                t37: f64::NAN,
                sat_zenith_angle: 30.0,
                sun_zenith_angle: 40.0,
                ice_fraction: None,
                cloud_mask: 1,
                datetime: NaiveDate::from_ymd_opt(2014, 8, 14)
                    .unwrap()
                    .and_hms_opt(12, 0, 0)
                    .unwrap(),
                lat: 78.0,
                lon: -10.0,
            };
            let ensemble: Vec<PerturbationRecord> = deltas
                .iter()
                .map(|d| PerturbationRecord {
                    algorithm,
                    epsilon_11: 0.0,
                    epsilon_12: 0.0,
                    epsilon_37: f64::NAN,
                    surface_temp: truth + d,
                })
                .collect();
            store.insert_pixel(&record, &ensemble).unwrap();
        };

        insert(&mut store, 271.5, Algorithm::SstDay, &[0.2, -0.2]);
        insert(&mut store, 235.0, Algorithm::Ist, &[0.5]);
        insert(&mut store, 250.0, Algorithm::Ist, &[-0.5]);
        store
    }

    #[test]
    fn per_algorithm_mean_and_std_match_hand_values() {
        let store = seed_store();
        let stats = algorithm_stats(&store, &QueryFilter::default()).unwrap();

        let sst_day = stats.iter().find(|s| s.label == "sst_day").unwrap();
        assert_eq!(sst_day.n, 2);
        assert!(sst_day.mean.abs() < 1e-9);
        assert!((sst_day.std - 0.2).abs() < 1e-9);

        let ist = stats.iter().find(|s| s.label == "ist").unwrap();
        assert_eq!(ist.n, 2);
        assert!(ist.mean.abs() < 1e-9);
        assert!((ist.std - 0.5).abs() < 1e-9);
    }

    #[test]
    fn ist_sub_bins_split_on_truth_temperature() {
        let store = seed_store();
        let stats = algorithm_stats(&store, &QueryFilter::default()).unwrap();

        let cold = stats.iter().find(|s| s.label == "ist_lt_240").unwrap();
        assert_eq!(cold.n, 1);
        assert!((cold.mean - 0.5).abs() < 1e-9);

        let mid = stats.iter().find(|s| s.label == "ist_gt_240_lt_260").unwrap();
        assert_eq!(mid.n, 1);
        assert!((mid.mean - (-0.5)).abs() < 1e-9);

        let warm = stats.iter().find(|s| s.label == "ist_gt_260").unwrap();
        assert_eq!(warm.n, 0);
        assert!(warm.mean.is_nan());
    }

    #[test]
    fn algorithm_filter_restricts_the_bins() {
        let store = seed_store();
        let filter = QueryFilter {
            algorithm: Some(Algorithm::SstDay),
            ..QueryFilter::default()
        };
        let stats = algorithm_stats(&store, &filter).unwrap();
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].label, "sst_day");
    }
}
