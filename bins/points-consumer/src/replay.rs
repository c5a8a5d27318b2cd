use serde::Deserialize;

use points_engine::broker::MemoryBroker;
use points_engine::error::ConsumerError;

/// One line of a replay file: the record key, the JSON value to deliver,
/// and optionally a topic/partition override.
#[derive(Debug, Deserialize)]
struct ReplayLine {
    key: String,
    value: serde_json::Value,
    #[serde(default)]
    topic: Option<String>,
    #[serde(default)]
    partition: u32,
}

/// Seed the in-memory broker from a JSONL file, one record per line.
/// Lines without an explicit topic land on `default_topic`. Returns the
/// number of records produced.
pub fn seed_from_file(
    broker: &MemoryBroker,
    path: &str,
    default_topic: &str,
) -> Result<usize, ConsumerError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| ConsumerError::Config(format!("{path}: {e}")))?;

    let mut produced = 0;
    for (lineno, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let parsed: ReplayLine = serde_json::from_str(line)
            .map_err(|e| ConsumerError::Config(format!("{path}:{}: {e}", lineno + 1)))?;

        let topic = parsed.topic.as_deref().unwrap_or(default_topic);
        let value = serde_json::to_vec(&parsed.value)
            .map_err(|e| ConsumerError::Config(format!("{path}:{}: {e}", lineno + 1)))?;
        broker.produce(topic, parsed.partition, Some(parsed.key.into_bytes()), Some(value))?;
        produced += 1;
    }
    Ok(produced)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeds_records_from_jsonl() {
        let dir = std::env::temp_dir().join("points-replay-test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("events.jsonl");
        std::fs::write(
            &path,
            concat!(
                r#"{"key":"user-42","value":{"user_id":42,"ex_id":7,"label":"A"}}"#,
                "\n\n",
                r#"{"key":"user-43","value":{"user_id":43,"ex_id":7,"label":"B"}}"#,
                "\n",
            ),
        )
        .unwrap();

        let broker = MemoryBroker::new();
        broker.create_topic("exercise.events", 1).unwrap();

        let produced =
            seed_from_file(&broker, path.to_str().unwrap(), "exercise.events").unwrap();
        assert_eq!(produced, 2);
    }

    #[test]
    fn malformed_line_reports_position() {
        let dir = std::env::temp_dir().join("points-replay-test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("bad.jsonl");
        std::fs::write(&path, "not json\n").unwrap();

        let broker = MemoryBroker::new();
        let err = seed_from_file(&broker, path.to_str().unwrap(), "t").unwrap_err();
        assert!(err.to_string().contains(":1:"));
    }
}
