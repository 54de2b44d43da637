//! Sync command handler

use std::sync::Arc;

use anyhow::Result;

use roster_core::{Config, HttpFetcher, StudentStore, SyncMerger, SyncOutcome};

use crate::commands::with_hint;
use crate::output::Output;

/// Fetch the remote directory and add students not stored yet
pub async fn sync(store: Arc<StudentStore>, config: &Config, output: &Output) -> Result<()> {
    output.message(&format!("Fetching students from {}...", config.api_url));

    let outcome = match sync_quiet(Arc::clone(&store), config).await {
        Ok(outcome) => outcome,
        Err(e) => {
            output.message("Sync failed. Stored students are unchanged.");
            return Err(e);
        }
    };

    let total = store.count()?;
    output.print_sync_outcome(&outcome, total);
    Ok(())
}

/// Sync without output (for sync on start)
pub async fn sync_quiet(store: Arc<StudentStore>, config: &Config) -> Result<SyncOutcome> {
    let fetcher = HttpFetcher::from_config(config).map_err(with_hint)?;
    let merger = SyncMerger::new(store, fetcher);
    merger.sync().await.map_err(with_hint)
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::Method::GET;
    use httpmock::MockServer;
    use roster_core::Student;
    use serde_json::json;
    use tempfile::TempDir;

    fn config(temp_dir: &TempDir, server: &MockServer) -> Config {
        Config {
            data_dir: temp_dir.path().to_path_buf(),
            api_url: server.url("/api"),
            request_timeout_secs: 5,
            ..Config::default()
        }
    }

    #[tokio::test]
    async fn test_sync_adds_new_students() {
        let temp_dir = TempDir::new().unwrap();
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/users").query_param("page", "1");
                then.status(200).json_body(json!({
                    "page": 1, "per_page": 6, "total": 2, "total_pages": 1,
                    "data": [
                        {"id": 1, "email": "george.bluth@reqres.in", "first_name": "George",
                         "last_name": "Bluth", "avatar": "https://reqres.in/img/faces/1-image.jpg"},
                        {"id": 2, "email": "janet.weaver@reqres.in", "first_name": "Janet",
                         "last_name": "Weaver", "avatar": "https://reqres.in/img/faces/2-image.jpg"}
                    ]
                }));
            })
            .await;
        let config = config(&temp_dir, &server);
        let store = Arc::new(StudentStore::open(&config).unwrap());
        store
            .upsert(&Student::new(1, "Georgie", "Local", "local@example.com"))
            .unwrap();

        let outcome = sync_quiet(Arc::clone(&store), &config).await.unwrap();

        assert_eq!(outcome.added_count, 1);
        assert_eq!(store.count().unwrap(), 2);
        assert_eq!(store.get(1).unwrap().unwrap().student.first_name, "Georgie");
    }

    #[tokio::test]
    async fn test_sync_failure_has_hint() {
        let temp_dir = TempDir::new().unwrap();
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/users");
                then.status(503);
            })
            .await;
        let config = config(&temp_dir, &server);
        let store = Arc::new(StudentStore::open(&config).unwrap());

        let err = sync_quiet(Arc::clone(&store), &config).await.unwrap_err();

        let message = err.to_string();
        assert!(message.contains("HTTP 503"));
        assert!(message.contains("api_url"));
        assert_eq!(store.count().unwrap(), 0);
    }
}
