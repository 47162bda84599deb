//! Pollutant grade bounds, daily thresholds and grade wording.
//!
//! Grade bounds follow the French regulatory thresholds, approximated from the
//! EPA AQI factsheet where no daily maximum is regulated.

use serde::Serialize;

/// Highest grade; assigned when a value exceeds every bound.
pub const WORST_GRADE: u8 = 6;

/// Grade given to pollutants without a bound table.
pub const UNGRADED: u8 = 0;

/// Upper bounds for grades 1 through 5, per pollutant.
static GRADE_BOUNDS: &[(&str, [f64; 5])] = &[
    ("O3", [50.0, 100.0, 130.0, 240.0, 380.0]),
    ("NO", [200.0, 45.0, 600.0, 1150.0, 1700.0]),
    ("NO2", [40.0, 90.0, 120.0, 230.0, 340.0]),
    ("NOX as NO2", [40.0, 90.0, 120.0, 230.0, 340.0]),
    ("SO2", [100.0, 200.0, 350.0, 500.0, 750.0]),
    ("PM2.5", [10.0, 20.0, 25.0, 50.0, 75.0]),
    ("PM10", [20.0, 40.0, 50.0, 100.0, 150.0]),
];

/// Tolerable daily mean and hourly maximum, in µg/m3.
static DAILY_THRESHOLDS: &[(&str, Threshold)] = &[
    ("SO2", Threshold { mean: 50.0, max: 350.0 }),
    ("NO2", Threshold { mean: 40.0, max: 200.0 }),
    ("NO", Threshold { mean: 150.0, max: 400.0 }),
    ("NOX as NO2", Threshold { mean: 40.0, max: 200.0 }),
    ("O3", Threshold { mean: 100.0, max: 180.0 }),
    ("PM10", Threshold { mean: 40.0, max: 150.0 }),
    ("PM2.5", Threshold { mean: 12.0, max: 35.0 }),
];

static GRADE_LABELS: [&str; 6] = [
    "bonne",
    "moyenne",
    "dégradée",
    "mauvaise",
    "très mauvaise",
    "extrêmement mauvaise",
];

/// Tolerable levels for one pollutant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Threshold {
    pub mean: f64,
    pub max: f64,
}

/// Particulate matter is graded on its daily mean, other pollutants on
/// their daily maximum.
pub fn is_particulate(pollutant: &str) -> bool {
    matches!(pollutant, "PM2.5" | "PM10")
}

pub fn grade_bounds(pollutant: &str) -> Option<&'static [f64; 5]> {
    GRADE_BOUNDS
        .iter()
        .find(|(name, _)| *name == pollutant)
        .map(|(_, bounds)| bounds)
}

pub fn threshold(pollutant: &str) -> Option<Threshold> {
    DAILY_THRESHOLDS
        .iter()
        .find(|(name, _)| *name == pollutant)
        .map(|(_, t)| *t)
}

/// Grade a pollutant's day from its mean and maximum.
///
/// The grade is the position (1-based) of the first bound strictly greater
/// than the compared value, [`WORST_GRADE`] past the last bound, and
/// [`UNGRADED`] for pollutants without bounds.
pub fn grade(pollutant: &str, mean: f64, max: f64) -> u8 {
    let Some(bounds) = grade_bounds(pollutant) else {
        return UNGRADED;
    };
    let value = if is_particulate(pollutant) { mean } else { max };
    bounds
        .iter()
        .position(|bound| value < *bound)
        .map(|idx| idx as u8 + 1)
        .unwrap_or(WORST_GRADE)
}

/// Wording attached to an overall day grade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AirGrade(pub u8);

impl AirGrade {
    /// `None` outside 1..=6.
    pub fn new(grade: u8) -> Option<AirGrade> {
        (1..=WORST_GRADE).contains(&grade).then_some(AirGrade(grade))
    }

    pub fn label(&self) -> &'static str {
        GRADE_LABELS[usize::from(self.0 - 1)]
    }

    pub fn outdoor_ok(&self) -> bool {
        self.0 < 3
    }

    pub fn icon(&self) -> String {
        format!("img/grade_{}.PNG", self.0)
    }

    pub fn title(&self) -> String {
        format!("Note : {}/{}", self.0, WORST_GRADE)
    }

    /// Interpretation sentence shown under the grade icon.
    pub fn interpretation(&self) -> String {
        let advice = if self.outdoor_ok() {
            "Vous pouvez vous divertir en extérieur sans problème. "
        } else {
            "Il est recommandé de ne pas sortir à l'extérieur, notamment pour faire une activité physique. "
        };
        format!("La qualité de l'air est {}. {}", self.label(), advice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grade_uses_max_for_gases() {
        assert_eq!(grade("NO2", 10.0, 39.9), 1);
        assert_eq!(grade("NO2", 10.0, 40.0), 2);
        assert_eq!(grade("NO2", 10.0, 339.0), 5);
        assert_eq!(grade("NO2", 10.0, 340.0), 6);
        assert_eq!(grade("O3", 200.0, 99.0), 2);
    }

    #[test]
    fn test_grade_uses_mean_for_particulates() {
        assert_eq!(grade("PM10", 19.0, 500.0), 1);
        assert_eq!(grade("PM10", 45.0, 46.0), 3);
        assert_eq!(grade("PM2.5", 80.0, 90.0), 6);
    }

    #[test]
    fn test_grade_first_matching_bound_wins() {
        // NO bounds are not monotonic; the first bound above the value wins.
        assert_eq!(grade("NO", 0.0, 100.0), 1);
        assert_eq!(grade("NO", 0.0, 300.0), 3);
    }

    #[test]
    fn test_unknown_pollutant_is_ungraded() {
        assert_eq!(grade("C6H6", 10.0, 10.0), UNGRADED);
        assert!(threshold("C6H6").is_none());
    }

    #[test]
    fn test_thresholds() {
        assert_eq!(threshold("PM2.5"), Some(Threshold { mean: 12.0, max: 35.0 }));
        assert_eq!(threshold("NOX as NO2").unwrap().max, 200.0);
    }

    #[test]
    fn test_air_grade_wording() {
        assert!(AirGrade::new(0).is_none());
        assert!(AirGrade::new(7).is_none());
        let good = AirGrade::new(1).unwrap();
        assert_eq!(good.label(), "bonne");
        assert!(good.outdoor_ok());
        assert_eq!(good.icon(), "img/grade_1.PNG");
        assert_eq!(good.title(), "Note : 1/6");
        let bad = AirGrade::new(6).unwrap();
        assert_eq!(bad.label(), "extrêmement mauvaise");
        assert!(bad
            .interpretation()
            .starts_with("La qualité de l'air est extrêmement mauvaise. Il est"));
    }
}
