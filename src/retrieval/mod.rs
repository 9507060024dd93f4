//! The retrieval core: algorithm selection, the per-regime temperature
//! formulas, and the physical-plausibility check applied to every result.
//!
//! Algorithm grid (selection by t11 band and day state):
//!
//! ```text
//!          DAY        TWILIGHT       NIGHT
//!      +----------+---------------+------------+
//!  SST | SST_DAY  | SST_TWILIGHT  | SST_NIGHT  |
//!      +----------+---------------+------------+
//! MIZT | MIZT_DAY | MIZT_TWILIGHT | MIZT_NIGHT |
//!      +----------+---------------+------------+
//!  IST |                 IST                   |
//!      +---------------------------------------+
//! ```

pub mod engine;
pub mod sanity;
pub mod selector;

pub use engine::{retrieve, s_teta};
pub use sanity::sanity_check;
pub use selector::{day_state, select_algorithm};

/// Lower edge (inclusive) of the marginal-ice-zone t11 band (K).
pub const MIZT_LOWER: f64 = 268.95;
/// Upper edge (exclusive) of the marginal-ice-zone t11 band (K); open water
/// above this.
pub const MIZT_UPPER: f64 = 270.95;

/// Sun zenith angle at or below which a pixel counts as daytime (degrees).
pub const DAY_MAX_ANGLE: f64 = 90.0;
/// Sun zenith angle at or above which a pixel counts as night (degrees);
/// twilight in between.
pub const NIGHT_MIN_ANGLE: f64 = 110.0;
