//! Data processing and aggregation for French air-quality station data.
//!
//! This crate turns per-day measurement tables into forms suitable for
//! charting: per-station min/mean/max series, day grades, heat-map points
//! and threshold comparisons.

pub mod aggregate;
pub mod airports;
pub mod heatmap;
pub mod processing;
pub mod session;

/// Threshold comparison for a clicked day of the line chart.
pub mod levels {
    use aqfr_lcsqa::pollutant::threshold;
    use aqfr_utils::dates::format_date_fr;
    use chrono::NaiveDate;
    use serde::Serialize;

    /// Margin added above the highest value for the top "danger" bar.
    pub const DANGER_MARGIN: f64 = 10.0;

    #[derive(Debug, Clone, PartialEq, Serialize)]
    pub struct LevelBar {
        pub label: &'static str,
        pub value: f64,
    }

    #[derive(Debug, Clone, PartialEq, Serialize)]
    pub struct ReferenceLine {
        pub y: f64,
        pub text: &'static str,
    }

    /// Stacked bar of tolerable levels with the day's values drawn across.
    #[derive(Debug, Clone, PartialEq, Serialize)]
    pub struct LevelInfo {
        pub pollutant: String,
        pub date: NaiveDate,
        pub bars: Vec<LevelBar>,
        pub lines: Vec<ReferenceLine>,
    }

    impl LevelInfo {
        /// `Données journalières (DD-MM-YYYY)`
        pub fn title(&self) -> String {
            format!("Données journalières ({})", format_date_fr(&self.date))
        }
    }

    /// `None` for pollutants without a daily threshold.
    pub fn level_info(pollutant: &str, date: NaiveDate, mean: f64, max: f64) -> Option<LevelInfo> {
        let t = threshold(pollutant)?;
        Some(LevelInfo {
            pollutant: pollutant.to_string(),
            date,
            bars: vec![
                LevelBar {
                    label: "Moyenne quotidienne tolérable",
                    value: t.mean,
                },
                LevelBar {
                    label: "Maximum horaire tolérable",
                    value: t.max,
                },
                LevelBar {
                    label: "Danger",
                    value: (t.mean + DANGER_MARGIN).max(max + DANGER_MARGIN),
                },
            ],
            lines: vec![
                ReferenceLine {
                    y: max,
                    text: "Valeur maximale atteinte ce jour",
                },
                ReferenceLine {
                    y: mean,
                    text: "Valeur moyenne de ce jour",
                },
            ],
        })
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_level_info_danger_bar() {
            let date = NaiveDate::from_ymd_opt(2022, 2, 15).unwrap();
            let low = level_info("NO2", date, 20.0, 25.0).unwrap();
            assert_eq!(low.bars[0].value, 40.0);
            assert_eq!(low.bars[1].value, 200.0);
            assert_eq!(low.bars[2].value, 50.0);

            let high = level_info("NO2", date, 60.0, 250.0).unwrap();
            assert_eq!(high.bars[2].value, 260.0);
            assert_eq!(high.lines[0].y, 250.0);
            assert_eq!(high.lines[1].y, 60.0);
            assert_eq!(high.title(), "Données journalières (15-02-2022)");
        }

        #[test]
        fn test_level_info_unknown_pollutant() {
            let date = NaiveDate::from_ymd_opt(2022, 2, 15).unwrap();
            assert!(level_info("C6H6", date, 1.0, 2.0).is_none());
        }
    }
}
