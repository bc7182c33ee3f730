// src/csv_handler.rs
use std::path::PathBuf;

use rfd::AsyncFileDialog;

use crate::data_types::Record;

const EXPORT_FILE_NAME: &str = "anonymized_data.csv";

/// Serialize records to the export format. Headers come from the first
/// record, unquoted; every data value is wrapped in double quotes with
/// embedded quotes escaped as `\"`. This escaping is deliberately not
/// RFC 4180 (which doubles quotes) and is kept byte-compatible with the
/// consumers of the existing export. Returns `None` when there is nothing
/// to export.
pub fn to_csv(records: &[Record]) -> Option<String> {
    let first = records.first()?;
    let headers = first.headers();

    let mut rows = Vec::with_capacity(records.len() + 1);
    rows.push(headers.join(","));

    for record in records {
        let values: Vec<String> = headers
            .iter()
            .map(|header| {
                let escaped = record.csv_value(header).replace('"', "\\\"");
                format!("\"{}\"", escaped)
            })
            .collect();
        rows.push(values.join(","));
    }

    Some(rows.join("\n"))
}

/// Ask the user where to save and write the CSV there. No records means no
/// dialog and no file side effect. Returns whether a file was written; a
/// cancelled dialog is not an error, and a failed write is logged rather
/// than surfaced.
pub async fn export(records: Vec<Record>) -> bool {
    let Some(csv) = to_csv(&records) else {
        return false;
    };

    let Some(target) = pick_save_target().await else {
        tracing::debug!("CSV export cancelled");
        return false;
    };

    match tokio::fs::write(&target, csv).await {
        Ok(()) => {
            tracing::info!(path = %target.display(), rows = records.len(), "exported CSV");
            true
        }
        Err(err) => {
            tracing::error!(%err, path = %target.display(), "failed to write CSV export");
            false
        }
    }
}

async fn pick_save_target() -> Option<PathBuf> {
    AsyncFileDialog::new()
        .add_filter("CSV Files", &["csv"])
        .set_file_name(EXPORT_FILE_NAME)
        .save_file()
        .await
        .map(|handle| handle.path().to_path_buf())
}
