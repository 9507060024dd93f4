//! Terminal / `.stat` formatting.

use crate::app::pipeline::RunOutput;
use crate::report::AlgorithmStats;

/// Render the `.stat` table:
///
/// ```text
/// # noaa7
/// # algo avg std N
/// sst_day 0.001234 0.118765 4821
/// ...
/// ```
pub fn format_stats_table(satellite: &str, stats: &[AlgorithmStats]) -> String {
    let mut out = String::new();
    out.push_str(&format!("# {satellite}\n"));
    out.push_str("# algo avg std N\n");
    for s in stats {
        out.push_str(&format!("{} {:.6} {:.6} {}\n", s.label, s.mean, s.std, s.n));
    }
    out
}

/// One-screen summary of a `pst run`.
pub fn format_run_summary(satellite: &str, output: &RunOutput) -> String {
    let mut out = String::new();
    out.push_str(&format!("Satellite:          {satellite}\n"));
    out.push_str(&format!("Pixels seen:        {}\n", output.pixels_total));
    out.push_str(&format!("Cloud-masked:       {}\n", output.pixels_cloudy));
    out.push_str(&format!("Unnavigated:        {}\n", output.pixels_unnavigated));
    out.push_str(&format!("Invalid retrievals: {}\n", output.pixels_invalid));
    out.push_str(&format!("Swaths stored:      {}\n", output.pixels_stored));
    out.push_str(&format!("Samples stored:     {}\n", output.samples_stored));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stat_table_has_the_expected_header_and_rows() {
        let stats = vec![AlgorithmStats {
            label: "ist".to_string(),
            mean: 0.0125,
            std: 0.118,
            n: 42,
        }];
        let table = format_stats_table("noaa7", &stats);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines[0], "# noaa7");
        assert_eq!(lines[1], "# algo avg std N");
        assert_eq!(lines[2], "ist 0.012500 0.118000 42");
    }

    #[test]
    fn run_summary_lists_all_counters() {
        let output = RunOutput {
            pixels_total: 10,
            pixels_cloudy: 2,
            pixels_unnavigated: 1,
            pixels_invalid: 3,
            pixels_stored: 4,
            samples_stored: 16,
        };
        let summary = format_run_summary("noaa7", &output);
        assert!(summary.contains("Pixels seen:        10"));
        assert!(summary.contains("Samples stored:     16"));
    }
}
