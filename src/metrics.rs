use serde::{Deserialize, Serialize};

pub const DURATION_COLUMN: &str = "Duration_Min";

/// Tracked per-session metrics, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Metric {
    TotalDistance,
    Hsr,
    Accelerations,
    MaxVelocity,
    Tackles,
    DurationMinutes,
}

impl Metric {
    pub const ALL: [Metric; 6] = [
        Metric::TotalDistance,
        Metric::Hsr,
        Metric::Accelerations,
        Metric::MaxVelocity,
        Metric::Tackles,
        Metric::DurationMinutes,
    ];

    /// Metrics read straight from the CSV (everything except the derived duration).
    pub const CSV_COLUMNS: [Metric; 5] = [
        Metric::TotalDistance,
        Metric::Hsr,
        Metric::Accelerations,
        Metric::MaxVelocity,
        Metric::Tackles,
    ];

    pub fn column(self) -> &'static str {
        match self {
            Metric::TotalDistance => "Total Distance",
            Metric::Hsr => "HSR",
            Metric::Accelerations => "Acceleration B1-3 Total Efforts (Gen 2)",
            Metric::MaxVelocity => "Maximum Velocity",
            Metric::Tackles => "Tackles Total (Band1-Band3)",
            Metric::DurationMinutes => DURATION_COLUMN,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Metric::TotalDistance => "Distancia Total (m)",
            Metric::Hsr => "HSR (m)",
            Metric::Accelerations => "Aceleraciones",
            Metric::MaxVelocity => "Velocidad Máxima",
            Metric::Tackles => "Tackles Totales",
            Metric::DurationMinutes => "Duración (min)",
        }
    }

    pub fn from_column(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|m| m.column().eq_ignore_ascii_case(name))
    }

    pub fn index(self) -> usize {
        Self::ALL.iter().position(|m| *m == self).unwrap_or(0)
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        let len = Self::ALL.len();
        Self::ALL[(self.index() + len - 1) % len]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_order_and_labels() {
        let labels: Vec<&str> = Metric::ALL.iter().map(|m| m.label()).collect();
        assert_eq!(
            labels,
            vec![
                "Distancia Total (m)",
                "HSR (m)",
                "Aceleraciones",
                "Velocidad Máxima",
                "Tackles Totales",
                "Duración (min)",
            ]
        );
    }

    #[test]
    fn from_column_resolves_known_names() {
        assert_eq!(Metric::from_column("HSR"), Some(Metric::Hsr));
        assert_eq!(
            Metric::from_column(" duration_min "),
            Some(Metric::DurationMinutes)
        );
        assert_eq!(Metric::from_column("Sprints"), None);
    }

    #[test]
    fn cycling_wraps_around() {
        assert_eq!(Metric::DurationMinutes.next(), Metric::TotalDistance);
        assert_eq!(Metric::TotalDistance.prev(), Metric::DurationMinutes);
    }
}
