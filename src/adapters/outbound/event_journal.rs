use crate::common::{EventEnvelope, EventJournal};
use async_trait::async_trait;
use std::path::PathBuf;
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

/// Allocation events as JSON lines, one file per stream (one stream per
/// played level).
pub struct FileEventJournal {
    base_path: PathBuf,
}

impl FileEventJournal {
    pub fn new<P: Into<PathBuf>>(base_path: P) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    fn stream_path(&self, stream_id: &str) -> PathBuf {
        let safe: String = stream_id
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.base_path.join(format!("{}.jsonl", safe))
    }

    async fn ensure_base_dir(&self) -> Result<(), String> {
        tokio::fs::create_dir_all(&self.base_path)
            .await
            .map_err(|e| format!("Failed to create journal directory {}: {}", self.base_path.display(), e))
    }

    /// Streams present in the journal directory, sorted.
    pub async fn list_streams(&self) -> Result<Vec<String>, String> {
        if !self.base_path.exists() {
            return Ok(vec![]);
        }
        let mut dir = tokio::fs::read_dir(&self.base_path)
            .await
            .map_err(|e| format!("Failed to read journal directory: {}", e))?;
        let mut streams = Vec::new();
        while let Some(entry) = dir
            .next_entry()
            .await
            .map_err(|e| format!("Failed to read journal entry: {}", e))?
        {
            let path = entry.path();
            if path.extension().and_then(|s| s.to_str()) == Some("jsonl") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    streams.push(stem.to_string());
                }
            }
        }
        streams.sort();
        Ok(streams)
    }
}

#[async_trait]
impl EventJournal for FileEventJournal {
    async fn append_events(&self, stream_id: &str, events: Vec<EventEnvelope>) -> Result<(), String> {
        self.ensure_base_dir().await?;
        let file_path = self.stream_path(stream_id);

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&file_path)
            .await
            .map_err(|e| format!("Failed to open journal file {}: {}", file_path.display(), e))?;

        for event in events {
            let mut line = serde_json::to_string(&event).map_err(|e| format!("Failed to serialize event: {}", e))?;
            line.push('\n');
            file.write_all(line.as_bytes())
                .await
                .map_err(|e| format!("Failed to write event: {}", e))?;
        }
        file.flush().await.map_err(|e| format!("Failed to flush journal: {}", e))?;
        Ok(())
    }

    async fn load_events(&self, stream_id: &str) -> Result<Vec<EventEnvelope>, String> {
        let file_path = self.stream_path(stream_id);
        if !file_path.exists() {
            return Ok(vec![]);
        }

        let file = File::open(&file_path)
            .await
            .map_err(|e| format!("Failed to open journal file {}: {}", file_path.display(), e))?;
        let mut lines = BufReader::new(file).lines();
        let mut events = Vec::new();
        let mut line_number = 0u64;

        while let Some(line) = lines
            .next_line()
            .await
            .map_err(|e| format!("Failed to read line: {}", e))?
        {
            line_number += 1;
            if line.trim().is_empty() {
                continue;
            }
            let event: EventEnvelope = serde_json::from_str(&line)
                .map_err(|e| format!("Failed to deserialize event at line {}: {}", line_number, e))?;
            events.push(event);
        }
        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::EventMetadata;
    use chrono::Utc;
    use tempfile::TempDir;
    use uuid::Uuid;

    fn envelope(event_type: &str) -> EventEnvelope {
        EventEnvelope {
            event_id: Uuid::new_v4(),
            aggregate_id: "circle".to_string(),
            aggregate_type: "PlannerAgent".to_string(),
            event_type: event_type.to_string(),
            event_version: 1,
            event_data: serde_json::json!({ "cost": 7.5 }),
            metadata: EventMetadata {
                correlation_id: None,
                level: Some("demo".to_string()),
                source: "circle".to_string(),
            },
            occurred_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn appends_accumulate_in_order() {
        let temp_dir = TempDir::new().unwrap();
        let journal = FileEventJournal::new(temp_dir.path().join("journal"));

        journal.append_events("demo run", vec![envelope("TargetCommitted")]).await.unwrap();
        journal.append_events("demo run", vec![envelope("DiamondRemoved")]).await.unwrap();

        let events = journal.load_events("demo run").await.unwrap();
        let types: Vec<&str> = events.iter().map(|e| e.event_type.as_str()).collect();
        assert_eq!(types, vec!["TargetCommitted", "DiamondRemoved"]);
        assert_eq!(journal.list_streams().await.unwrap(), vec!["demo_run".to_string()]);
    }

    #[tokio::test]
    async fn unknown_stream_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let journal = FileEventJournal::new(temp_dir.path());
        assert!(journal.load_events("nothing").await.unwrap().is_empty());
    }
}
