use serde::{Deserialize, Serialize};

/// Per-key state carried between messages sharing a history key.
///
/// The label sequences and the two accumulators are opaque to the core:
/// they are read before the computation, passed through unchanged, and
/// the returned record overwrites the stored one as a whole. The core
/// never updates fields individually.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    /// Accumulated label events, one inner sequence per computation.
    pub labels: Vec<Vec<String>>,
    pub accum_x: f64,
    pub accum_y: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serde_round_trip() {
        let record = HistoryRecord {
            labels: vec![vec!["A".to_string()], vec!["A".to_string(), "B".to_string()]],
            accum_x: 1.5,
            accum_y: -0.25,
        };
        let encoded = serde_json::to_vec(&record).unwrap();
        let decoded: HistoryRecord = serde_json::from_slice(&encoded).unwrap();
        assert_eq!(decoded, record);
    }
}
