use std::io::{Read, Seek, SeekFrom};

use actix_multipart::form::{MultipartForm, tempfile::TempFile};
use serde::Deserialize;
use thiserror::Error;

use crate::domain::status::StatusSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadFormat {
    Csv,
    Xlsx,
}

impl TryFrom<&str> for DownloadFormat {
    type Error = UploadParseError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "xlsx" => Ok(Self::Xlsx),
            other => Err(UploadParseError::InvalidFormat(other.to_string())),
        }
    }
}

/// Query string of the service type download.
#[derive(Debug, Deserialize)]
pub struct DownloadQuery {
    #[serde(default)]
    pub format: Option<String>,
}

impl DownloadQuery {
    /// Requested format, CSV when omitted.
    pub fn format(&self) -> Result<DownloadFormat, UploadParseError> {
        match self.format.as_deref() {
            None | Some("") => Ok(DownloadFormat::Csv),
            Some(format) => DownloadFormat::try_from(format),
        }
    }
}

/// Upload of a previously exported status collection.
#[derive(MultipartForm)]
pub struct StatusImportForm {
    #[multipart(limit = "2MB")]
    pub file: TempFile,
}

#[derive(Debug, Error)]
pub enum UploadParseError {
    #[error("invalid download format: {0}")]
    InvalidFormat(String),
    #[error("uploaded file is missing")]
    MissingFile,
    #[error("uploaded file extension does not match the expected .json")]
    ExtensionMismatch,
    #[error("failed to read uploaded file")]
    ReadFailed,
    #[error("uploaded file is not a valid status collection: {0}")]
    JsonParseFailed(String),
}

impl From<std::io::Error> for UploadParseError {
    fn from(_: std::io::Error) -> Self {
        Self::ReadFailed
    }
}

impl From<serde_json::Error> for UploadParseError {
    fn from(value: serde_json::Error) -> Self {
        Self::JsonParseFailed(value.to_string())
    }
}

/// Parses a `serviceRequestStatuses` document: a JSON array of statuses.
pub fn parse_status_snapshots(content: &str) -> Result<Vec<StatusSnapshot>, UploadParseError> {
    Ok(serde_json::from_str(content)?)
}

pub fn parse_status_upload(
    form: &mut StatusImportForm,
) -> Result<Vec<StatusSnapshot>, UploadParseError> {
    let Some(file_name) = form.file.file_name.as_ref() else {
        return Err(UploadParseError::MissingFile);
    };
    if !file_name.to_ascii_lowercase().ends_with(".json") {
        return Err(UploadParseError::ExtensionMismatch);
    }

    let file = form.file.file.as_file_mut();
    file.seek(SeekFrom::Start(0))?;

    let mut content = String::new();
    file.read_to_string(&mut content)?;

    parse_status_snapshots(&content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_exported_document() {
        let json = r#"[
            {"id":1,"name":"New","description":"Submitted","enabled":true,"color":"blue","orderCount":4},
            {"name":"Waiting on Parts","description":"Blocked","color":"teal",
             "notifications":{"Key Card Request":{"notifyRequestor":true,"notifyAssignee":false}}}
        ]"#;

        let snapshots = parse_status_snapshots(json).unwrap();
        assert_eq!(snapshots.len(), 2);
        assert_eq!(snapshots[0].order_count, 4);
        let flags = snapshots[1].notifications["Key Card Request"];
        assert!(flags.notify_requestor);
        assert!(!flags.notify_assignee);
    }

    #[test]
    fn malformed_json_is_an_error() {
        let err = parse_status_snapshots("{not json").unwrap_err();
        assert!(matches!(err, UploadParseError::JsonParseFailed(_)));
    }

    #[test]
    fn download_format_defaults_to_csv() {
        let query = DownloadQuery { format: None };
        assert_eq!(query.format().unwrap(), DownloadFormat::Csv);
        let query = DownloadQuery {
            format: Some("XLSX".into()),
        };
        assert_eq!(query.format().unwrap(), DownloadFormat::Xlsx);
    }
}
