//! SQLite-backed result store.
//!
//! Schema: `satellites` and `algorithms` are small dimension tables;
//! `swath_inputs` holds one row per truth retrieval; `perturbations` holds
//! the ensemble, one row per valid Monte Carlo draw.
//!
//! A pixel's truth record and its full ensemble are committed in one
//! transaction, so a concurrent reader never observes a partial ensemble.

use std::collections::HashMap;
use std::path::Path;

use rusqlite::types::Value;
use rusqlite::{Connection, params, params_from_iter};
use tracing::debug;

use crate::domain::Algorithm;
use crate::error::AppError;
use crate::store::records::{Covariate, DeltaRow, PerturbationRecord, QueryFilter, SwathRecord};

const SETUP_SQLS: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS satellites (id INTEGER PRIMARY KEY, name TEXT NOT NULL)",
    "CREATE UNIQUE INDEX IF NOT EXISTS satellites_name_index ON satellites(name)",
    "CREATE TABLE IF NOT EXISTS algorithms (id INTEGER PRIMARY KEY, name TEXT NOT NULL)",
    "CREATE UNIQUE INDEX IF NOT EXISTS algorithms_name_index ON algorithms(name)",
    "CREATE TABLE IF NOT EXISTS swath_inputs (
       id INTEGER PRIMARY KEY,
       satellite_id INT NOT NULL,
       surface_temp REAL NOT NULL,
       t_11 REAL NOT NULL,
       t_12 REAL NOT NULL,
       t_37 REAL,
       sat_zenith_angle REAL NOT NULL,
       sun_zenith_angle REAL NOT NULL,
       ice_fraction REAL,
       cloud_mask INT NOT NULL,
       swath_datetime DATETIME NOT NULL,
       lat REAL NOT NULL,
       lon REAL NOT NULL,
       FOREIGN KEY(satellite_id) REFERENCES satellites(id)
    )",
    "CREATE INDEX IF NOT EXISTS swath_satellite_index ON swath_inputs(satellite_id)",
    "CREATE INDEX IF NOT EXISTS swath_datetime_index ON swath_inputs(swath_datetime)",
    "CREATE INDEX IF NOT EXISTS swath_lat_index ON swath_inputs(lat)",
    "CREATE INDEX IF NOT EXISTS swath_lon_index ON swath_inputs(lon)",
    "CREATE INDEX IF NOT EXISTS swath_sun_zenith_index ON swath_inputs(sun_zenith_angle)",
    "CREATE INDEX IF NOT EXISTS swath_sat_zenith_index ON swath_inputs(sat_zenith_angle)",
    "CREATE TABLE IF NOT EXISTS perturbations (
       id INTEGER PRIMARY KEY,
       swath_input_id INT NOT NULL,
       algorithm_id INT NOT NULL,
       epsilon_11 REAL NOT NULL,
       epsilon_12 REAL NOT NULL,
       epsilon_37 REAL,
       surface_temp REAL NOT NULL,
       FOREIGN KEY(swath_input_id) REFERENCES swath_inputs(id),
       FOREIGN KEY(algorithm_id) REFERENCES algorithms(id)
    )",
    "CREATE INDEX IF NOT EXISTS pert_swath_input_index ON perturbations(swath_input_id)",
    "CREATE INDEX IF NOT EXISTS pert_algorithm_index ON perturbations(algorithm_id)",
];

/// Name-to-id cache for the dimension tables, owned by the store.
#[derive(Debug, Default)]
struct IdCache {
    satellites: HashMap<String, i64>,
    algorithms: HashMap<Algorithm, i64>,
}

/// Handle to one result database.
pub struct ResultStore {
    conn: Connection,
    ids: IdCache,
}

impl ResultStore {
    /// Open (creating if needed) a result database file.
    pub fn open(path: &Path) -> Result<ResultStore, AppError> {
        let conn = Connection::open(path).map_err(|e| {
            AppError::storage(format!("Failed to open database '{}': {e}", path.display()))
        })?;
        ResultStore::from_connection(conn)
    }

    /// An in-memory store, used by tests.
    pub fn open_in_memory() -> Result<ResultStore, AppError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| AppError::storage(format!("Failed to open in-memory database: {e}")))?;
        ResultStore::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<ResultStore, AppError> {
        for sql in SETUP_SQLS {
            debug!(sql = %sql, "setup");
            conn.execute(sql, [])
                .map_err(|e| AppError::storage(format!("Schema setup failed: {e}")))?;
        }
        Ok(ResultStore {
            conn,
            ids: IdCache::default(),
        })
    }

    /// Insert one truth retrieval; returns its swath id.
    pub fn insert_swath(&mut self, record: &SwathRecord) -> Result<i64, AppError> {
        insert_swath(&self.conn, &mut self.ids, record)
    }

    /// Insert one swath's ensemble; returns the number of rows inserted.
    pub fn insert_perturbations(
        &mut self,
        swath_id: i64,
        records: &[PerturbationRecord],
    ) -> Result<usize, AppError> {
        insert_perturbations(&self.conn, &mut self.ids, swath_id, records)
    }

    /// Insert a pixel's truth record together with its full ensemble as one
    /// atomic unit.
    pub fn insert_pixel(
        &mut self,
        record: &SwathRecord,
        ensemble: &[PerturbationRecord],
    ) -> Result<(i64, usize), AppError> {
        let tx = self
            .conn
            .transaction()
            .map_err(|e| AppError::storage(format!("Failed to begin transaction: {e}")))?;
        let swath_id = insert_swath(&tx, &mut self.ids, record)?;
        let count = insert_perturbations(&tx, &mut self.ids, swath_id, ensemble)?;
        tx.commit()
            .map_err(|e| AppError::storage(format!("Failed to commit pixel: {e}")))?;
        Ok((swath_id, count))
    }

    /// Stream `(perturbed - truth, covariates...)` rows matching a filter.
    pub fn query(
        &self,
        filter: &QueryFilter,
        projection: &[Covariate],
    ) -> Result<Vec<DeltaRow>, AppError> {
        let mut sql = String::from("SELECT p.surface_temp - s.surface_temp");
        for covariate in projection {
            sql.push_str(", ");
            sql.push_str(covariate.column());
        }
        sql.push_str(
            " FROM perturbations p \
             JOIN swath_inputs s ON p.swath_input_id = s.id \
             JOIN algorithms a ON p.algorithm_id = a.id \
             WHERE 1 = 1",
        );

        let mut values: Vec<Value> = Vec::new();
        if let Some((low, high)) = filter.lat_range {
            sql.push_str(" AND s.lat >= ? AND s.lat < ?");
            values.push(Value::from(low));
            values.push(Value::from(high));
        }
        if let Some(limit) = filter.angle_difference_limit {
            sql.push_str(" AND ABS(s.sun_zenith_angle - s.sat_zenith_angle) <= ?");
            values.push(Value::from(limit));
        }
        if let Some(algorithm) = filter.algorithm {
            sql.push_str(" AND a.name = ?");
            values.push(Value::from(algorithm.name().to_string()));
        }
        if let Some((low, high)) = filter.temperature_range {
            sql.push_str(" AND s.surface_temp >= ? AND s.surface_temp < ?");
            values.push(Value::from(low));
            values.push(Value::from(high));
        }

        debug!(sql = %sql, params = values.len(), "query");
        let mut statement = self
            .conn
            .prepare(&sql)
            .map_err(|e| AppError::storage(format!("Failed to prepare query: {e}")))?;
        let rows = statement
            .query_map(params_from_iter(values), |row| {
                let delta: f64 = row.get(0)?;
                let mut covariates = Vec::with_capacity(projection.len());
                for i in 0..projection.len() {
                    let value: Option<f64> = row.get(i + 1)?;
                    covariates.push(value.unwrap_or(f64::NAN));
                }
                Ok(DeltaRow { delta, covariates })
            })
            .map_err(|e| AppError::storage(format!("Query failed: {e}")))?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row.map_err(|e| AppError::storage(format!("Query row failed: {e}")))?);
        }
        Ok(out)
    }
}

/// Find or create a satellite's dimension row, going through the cache.
fn satellite_id(conn: &Connection, ids: &mut IdCache, name: &str) -> Result<i64, AppError> {
    let name = name.trim().to_lowercase();
    if let Some(id) = ids.satellites.get(&name) {
        return Ok(*id);
    }
    let id = find_or_create(conn, "satellites", &name)?;
    ids.satellites.insert(name, id);
    Ok(id)
}

fn algorithm_id(conn: &Connection, ids: &mut IdCache, algorithm: Algorithm) -> Result<i64, AppError> {
    if let Some(id) = ids.algorithms.get(&algorithm) {
        return Ok(*id);
    }
    let id = find_or_create(conn, "algorithms", algorithm.name())?;
    ids.algorithms.insert(algorithm, id);
    Ok(id)
}

fn find_or_create(conn: &Connection, table: &str, name: &str) -> Result<i64, AppError> {
    let select = format!("SELECT id FROM {table} WHERE name = ? LIMIT 1");
    debug!(sql = %select, name, "lookup");
    let existing = conn
        .query_row(&select, params![name], |row| row.get::<_, i64>(0))
        .map(Some)
        .or_else(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => Ok(None),
            other => Err(other),
        })
        .map_err(|e| AppError::storage(format!("Lookup in {table} failed: {e}")))?;
    if let Some(id) = existing {
        return Ok(id);
    }

    let insert = format!("INSERT INTO {table} (name) VALUES (?)");
    debug!(sql = %insert, name, "insert");
    conn.execute(&insert, params![name])
        .map_err(|e| AppError::storage(format!("Insert into {table} failed: {e}")))?;
    Ok(conn.last_insert_rowid())
}

fn insert_swath(conn: &Connection, ids: &mut IdCache, record: &SwathRecord) -> Result<i64, AppError> {
    let satellite_id = satellite_id(conn, ids, &record.satellite)?;
    let t37: Option<f64> = finite_or_null(record.t37);
    conn.execute(
        "INSERT INTO swath_inputs (
           satellite_id, surface_temp, t_11, t_12, t_37,
           sat_zenith_angle, sun_zenith_angle, ice_fraction, cloud_mask,
           swath_datetime, lat, lon
         ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        params![
            satellite_id,
            record.surface_temp,
            record.t11,
            record.t12,
            t37,
            record.sat_zenith_angle,
            record.sun_zenith_angle,
            record.ice_fraction,
            record.cloud_mask,
            record.datetime,
            record.lat,
            record.lon,
        ],
    )
    .map_err(|e| AppError::storage(format!("Swath insert failed: {e}")))?;
    Ok(conn.last_insert_rowid())
}

fn insert_perturbations(
    conn: &Connection,
    ids: &mut IdCache,
    swath_id: i64,
    records: &[PerturbationRecord],
) -> Result<usize, AppError> {
    let mut statement = conn
        .prepare_cached(
            "INSERT INTO perturbations (
               swath_input_id, algorithm_id, epsilon_11, epsilon_12, epsilon_37, surface_temp
             ) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .map_err(|e| AppError::storage(format!("Failed to prepare perturbation insert: {e}")))?;

    for record in records {
        let algorithm_id = algorithm_id(conn, ids, record.algorithm)?;
        let epsilon_37: Option<f64> = finite_or_null(record.epsilon_37);
        statement
            .execute(params![
                swath_id,
                algorithm_id,
                record.epsilon_11,
                record.epsilon_12,
                epsilon_37,
                record.surface_temp,
            ])
            .map_err(|e| AppError::storage(format!("Perturbation insert failed: {e}")))?;
    }
    Ok(records.len())
}

/// SQLite has no NaN; the absent-channel sentinel maps to NULL.
fn finite_or_null(value: f64) -> Option<f64> {
    if value.is_nan() { None } else { Some(value) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn swath(satellite: &str, surface_temp: f64, lat: f64) -> SwathRecord {
        SwathRecord {
            satellite: satellite.to_string(),
            surface_temp,
            t11: surface_temp - 0.5,
            t12: surface_temp - 1.0,
            t37: f64::NAN,
            sat_zenith_angle: 30.0,
            sun_zenith_angle: 40.0,
            ice_fraction: None,
            cloud_mask: 1,
            datetime: NaiveDate::from_ymd_opt(2014, 8, 14)
                .unwrap()
                .and_hms_opt(12, 0, 0)
                .unwrap(),
            lat,
            lon: -10.0,
        }
    }

    fn draw(algorithm: Algorithm, delta: f64, truth: f64) -> PerturbationRecord {
        PerturbationRecord {
            algorithm,
            epsilon_11: 0.1,
            epsilon_12: -0.05,
            epsilon_37: f64::NAN,
            surface_temp: truth + delta,
        }
    }

    #[test]
    fn swath_and_ensemble_round_trip_through_a_delta_query() {
        let mut store = ResultStore::open_in_memory().unwrap();
        let truth = 271.4;
        let ensemble = [
            draw(Algorithm::SstDay, 0.25, truth),
            draw(Algorithm::SstDay, -0.15, truth),
            draw(Algorithm::MiztDay, 0.05, truth),
        ];
        let (swath_id, count) = store.insert_pixel(&swath("noaa7", truth, 78.0), &ensemble).unwrap();
        assert!(swath_id > 0);
        assert_eq!(count, 3);

        let filter = QueryFilter {
            algorithm: Some(Algorithm::SstDay),
            ..QueryFilter::default()
        };
        let rows = store.query(&filter, &[]).unwrap();
        let mut deltas: Vec<f64> = rows.iter().map(|r| r.delta).collect();
        deltas.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_eq!(deltas.len(), 2);
        assert!((deltas[0] - (-0.15)).abs() < 1e-9);
        assert!((deltas[1] - 0.25).abs() < 1e-9);
    }

    #[test]
    fn separate_inserts_match_the_combined_one() {
        let mut store = ResultStore::open_in_memory().unwrap();
        let truth = 262.0;
        let swath_id = store.insert_swath(&swath("noaa7", truth, 70.0)).unwrap();
        let inserted = store
            .insert_perturbations(swath_id, &[draw(Algorithm::Ist, 0.1, truth)])
            .unwrap();
        assert_eq!(inserted, 1);
        let rows = store.query(&QueryFilter::default(), &[]).unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn lat_range_filter_is_half_open() {
        let mut store = ResultStore::open_in_memory().unwrap();
        for (lat, truth) in [(65.0, 271.0), (75.0, 272.0), (85.0, 273.0)] {
            store
                .insert_pixel(&swath("noaa7", truth, lat), &[draw(Algorithm::SstDay, 0.1, truth)])
                .unwrap();
        }
        let filter = QueryFilter {
            lat_range: Some((70.0, 85.0)),
            ..QueryFilter::default()
        };
        let rows = store.query(&filter, &[Covariate::Lat]).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].covariates[0], 75.0);
    }

    #[test]
    fn temperature_range_filters_on_truth_temperature() {
        let mut store = ResultStore::open_in_memory().unwrap();
        for truth in [235.0, 250.0, 265.0] {
            store
                .insert_pixel(&swath("noaa7", truth, 78.0), &[draw(Algorithm::Ist, -0.2, truth)])
                .unwrap();
        }
        let filter = QueryFilter {
            temperature_range: Some((240.0, 260.0)),
            ..QueryFilter::default()
        };
        let rows = store.query(&filter, &[Covariate::TruthTemp]).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].covariates[0], 250.0);
    }

    #[test]
    fn angle_difference_limit_applies() {
        let mut store = ResultStore::open_in_memory().unwrap();
        let mut wide = swath("noaa7", 271.0, 78.0);
        wide.sun_zenith_angle = 80.0; // |80 - 30| = 50
        store.insert_pixel(&wide, &[draw(Algorithm::SstDay, 0.1, 271.0)]).unwrap();
        let narrow = swath("noaa7", 272.0, 78.0); // |40 - 30| = 10
        store.insert_pixel(&narrow, &[draw(Algorithm::SstDay, 0.2, 272.0)]).unwrap();

        let filter = QueryFilter {
            angle_difference_limit: Some(20.0),
            ..QueryFilter::default()
        };
        let rows = store.query(&filter, &[]).unwrap();
        assert_eq!(rows.len(), 1);
        assert!((rows[0].delta - 0.2).abs() < 1e-9);
    }

    #[test]
    fn failed_ensemble_insert_leaves_no_truth_row() {
        let mut store = ResultStore::open_in_memory().unwrap();
        // Break the ensemble insert mid-pixel; the swath insert still succeeds.
        store.conn.execute("DROP TABLE perturbations", []).unwrap();

        let truth = 271.0;
        let err = store
            .insert_pixel(&swath("noaa7", truth, 78.0), &[draw(Algorithm::SstDay, 0.1, truth)])
            .unwrap_err();
        assert_eq!(err.exit_code(), 4);

        let count: i64 = store
            .conn
            .query_row("SELECT COUNT(*) FROM swath_inputs", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn null_t37_projects_as_nan() {
        let mut store = ResultStore::open_in_memory().unwrap();
        store
            .insert_pixel(&swath("noaa7", 271.0, 78.0), &[draw(Algorithm::SstDay, 0.1, 271.0)])
            .unwrap();
        let rows = store.query(&QueryFilter::default(), &[Covariate::T37]).unwrap();
        assert_eq!(rows.len(), 1);
        assert!(rows[0].covariates[0].is_nan());
    }
}
