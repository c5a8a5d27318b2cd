use points_api::error::PointsError;
use points_api::event::{PointsEvent, ScoreResult};
use points_api::history::HistoryRecord;
use points_api::model::{ScoreModel, ScoreOutcome};

/// Demonstration scoring model.
///
/// Scores 5 points per occurrence of the event's label in the key's
/// history (including this one) and keeps running label/total tallies in
/// the accumulators. Stands in for the real numeric model, which plugs
/// in behind the same trait.
#[derive(Debug, Default, Clone, Copy)]
pub struct TallyModel;

impl ScoreModel for TallyModel {
    fn score(
        &self,
        event: &PointsEvent,
        prior: Option<&HistoryRecord>,
    ) -> Result<ScoreOutcome, PointsError> {
        let mut labels = prior.map(|h| h.labels.clone()).unwrap_or_default();
        labels.push(vec![event.label.clone()]);

        let occurrences = labels
            .iter()
            .filter(|l| l.iter().any(|s| *s == event.label))
            .count() as i64;

        let mut result = ScoreResult::new();
        result.insert("score".to_string(), occurrences * 5);
        result.insert("total".to_string(), labels.len() as i64);

        Ok(ScoreOutcome {
            result,
            history: HistoryRecord {
                accum_x: occurrences as f64,
                accum_y: labels.len() as f64,
                labels,
            },
        })
    }
}
