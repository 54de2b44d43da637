//! Status command handler

use anyhow::Result;

use roster_core::{Config, StudentStore, LOCAL_ID_FLOOR};

use crate::output::{Output, OutputFormat};

/// Show store and sync status
pub fn show(store: &StudentStore, config: &Config, output: &Output) -> Result<()> {
    let ids = store.all_ids()?;
    let total = ids.len();
    let local = ids.iter().filter(|id| **id >= LOCAL_ID_FLOOR).count();
    let remote = total - local;
    let last_sync = store.last_sync_at()?;

    let db_path = config.sqlite_path();
    let size = std::fs::metadata(&db_path).map(|m| m.len()).unwrap_or(0);

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "students": {
                        "total": total,
                        "remote": remote,
                        "local": local
                    },
                    "sync": {
                        "api_url": config.api_url,
                        "last_sync_at": last_sync,
                        "sync_on_start": config.sync_on_start,
                        "sync_interval_secs": config.sync_interval_secs
                    },
                    "storage": {
                        "location": db_path,
                        "size_bytes": size
                    }
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", total);
        }
        OutputFormat::Human => {
            println!("Roster Status");
            println!("=============");
            println!();
            println!("Students:");
            println!("  Total:  {}", total);
            println!("  Remote: {}", remote);
            println!("  Local:  {}", local);
            println!();
            println!("Sync:");
            println!("  API:       {}", config.api_url);
            println!(
                "  Last sync: {}",
                last_sync
                    .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
                    .unwrap_or_else(|| "never".to_string())
            );
            println!(
                "  On start:  {}",
                if config.sync_on_start {
                    "enabled"
                } else {
                    "disabled"
                }
            );
            println!(
                "  Interval:  {}",
                config
                    .sync_interval_secs
                    .map(|secs| format!("every {}s", secs))
                    .unwrap_or_else(|| "off".to_string())
            );
            println!();
            println!("Storage:");
            println!("  Location: {}", db_path.display());
            println!("  Size:     {}", human_size(size));
        }
    }

    Ok(())
}

fn human_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.1} {}", size, UNITS[unit])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_human_size() {
        assert_eq!(human_size(0), "0 B");
        assert_eq!(human_size(512), "512 B");
        assert_eq!(human_size(2048), "2.0 KB");
        assert_eq!(human_size(5 * 1024 * 1024 + 512 * 1024), "5.5 MB");
    }
}
