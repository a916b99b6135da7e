use std::fmt;

use serde::{Deserialize, Serialize};

/// Goal-progress thresholds that trigger a one-time celebration.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Milestone {
    Quarter,
    Half,
    ThreeQuarters,
    Almost,
    Complete,
}

impl Milestone {
    /// Evaluation order: ascending.
    pub const ALL: [Milestone; 5] = [
        Milestone::Quarter,
        Milestone::Half,
        Milestone::ThreeQuarters,
        Milestone::Almost,
        Milestone::Complete,
    ];

    pub fn percent(self) -> u32 {
        match self {
            Milestone::Quarter => 25,
            Milestone::Half => 50,
            Milestone::ThreeQuarters => 75,
            Milestone::Almost => 90,
            Milestone::Complete => 100,
        }
    }

    pub fn is_reached(self, progress: f64) -> bool {
        progress >= self.percent() as f64
    }
}

impl fmt::Display for Milestone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.percent())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thresholds_are_ascending() {
        let values: Vec<u32> = Milestone::ALL.iter().map(|m| m.percent()).collect();
        assert_eq!(values, vec![25, 50, 75, 90, 100]);
    }

    #[test]
    fn nan_progress_reaches_nothing() {
        assert!(!Milestone::Quarter.is_reached(f64::NAN));
        assert!(Milestone::Complete.is_reached(f64::INFINITY));
    }
}
