use std::collections::{BTreeMap, HashMap};

use chrono::Utc;
use serde::Serialize;
use thiserror::Error;

use crate::domain::notifications::NotificationFlags;
use crate::domain::service_type::ServiceType;
use crate::domain::status::{StatusImport, StatusSnapshot, ensure_reserved_snapshot};
use crate::domain::types::ServiceTypeId;
use crate::forms::import_export::DownloadFormat;
use crate::repository::{
    CategoryReader, ServiceTypeListQuery, ServiceTypeReader, StatusListQuery, StatusReader,
    StatusWriter,
};

use super::service_types::show_service_types;
use super::statuses::ensure_reserved_status;
use super::{ServiceError, ServiceResult, repository_failure};

/// Outcome of a status import shown to the user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatusImportReport {
    pub total: usize,
    pub created: usize,
    pub updated: usize,
    /// Request-type names that matched no service type.
    pub unmatched_request_types: Vec<String>,
}

impl StatusImportReport {
    pub fn summary(&self) -> String {
        let mut summary = format!(
            "Imported {} status(es): {} created, {} updated.",
            self.total, self.created, self.updated
        );
        if !self.unmatched_request_types.is_empty() {
            summary.push_str(&format!(
                " Unknown request types skipped: {}.",
                self.unmatched_request_types.join(", ")
            ));
        }
        summary
    }
}

fn request_type_names(service_types: &[ServiceType]) -> HashMap<ServiceTypeId, String> {
    service_types
        .iter()
        .map(|service_type| {
            (
                service_type.id,
                service_type.request_type.as_str().to_string(),
            )
        })
        .collect()
}

/// The whole status collection as a `serviceRequestStatuses` document.
pub fn export_statuses<R>(repo: &R) -> ServiceResult<Vec<StatusSnapshot>>
where
    R: StatusReader + StatusWriter + ServiceTypeReader,
{
    ensure_reserved_status(repo)?;

    let statuses = repo
        .list_statuses(StatusListQuery::default())
        .map_err(|e| repository_failure("list statuses", e))?;
    let service_types = repo
        .list_service_types(ServiceTypeListQuery::default())
        .map_err(|e| repository_failure("list service types", e))?;
    let names = request_type_names(&service_types);

    statuses
        .into_iter()
        .map(|status| {
            let notifications: BTreeMap<String, NotificationFlags> = repo
                .list_status_notifications(status.id)
                .map_err(|e| repository_failure("list status notifications", e))?
                .into_iter()
                .filter_map(|n| {
                    names
                        .get(&n.service_type_id)
                        .map(|name| (name.clone(), n.flags))
                })
                .collect();
            Ok(StatusSnapshot {
                id: Some(status.id.get()),
                name: status.name,
                description: status.description,
                enabled: status.enabled,
                color: status.color,
                order_count: status.order_count,
                notifications,
            })
        })
        .collect()
}

/// Upserts an imported document by status name.
///
/// Notification flags are keyed by request-type name and apply to every
/// service type carrying that name, attaching it to the status when needed.
/// The whole document is applied in one repository transaction.
pub fn import_statuses<R>(
    snapshots: Vec<StatusSnapshot>,
    repo: &R,
) -> ServiceResult<StatusImportReport>
where
    R: StatusReader + StatusWriter + ServiceTypeReader,
{
    let snapshots = ensure_reserved_snapshot(snapshots)?;
    let service_types = repo
        .list_service_types(ServiceTypeListQuery::default())
        .map_err(|e| repository_failure("list service types", e))?;

    let mut unmatched_request_types: Vec<String> = Vec::new();
    let now = Utc::now().naive_utc();

    let imports: Vec<StatusImport> = snapshots
        .into_iter()
        .map(|snapshot| {
            let notifications = snapshot.notifications.clone();
            let status = snapshot.into_new_status(now);

            let mut resolved = Vec::new();
            for (request_type, flags) in notifications {
                let matching = service_types
                    .iter()
                    .filter(|service_type| service_type.request_type.as_str() == request_type)
                    .map(|service_type| (service_type.id, flags))
                    .collect::<Vec<_>>();
                if matching.is_empty() {
                    log::warn!("Skipping notifications for unknown request type {request_type}");
                    if !unmatched_request_types.contains(&request_type) {
                        unmatched_request_types.push(request_type);
                    }
                    continue;
                }
                resolved.extend(matching);
            }

            StatusImport {
                status,
                notifications: resolved,
            }
        })
        .collect();

    let counts = repo
        .import_statuses(&imports)
        .map_err(|e| repository_failure("import statuses", e))?;

    let report = StatusImportReport {
        total: imports.len(),
        created: counts.created,
        updated: counts.updated,
        unmatched_request_types,
    };
    log::info!(
        "Imported {} statuses ({} created, {} updated)",
        report.total,
        report.created,
        report.updated
    );
    Ok(report)
}

pub const SERVICE_TYPE_HEADERS: [&str; 9] = [
    "request_type",
    "category",
    "description",
    "enabled",
    "approval",
    "assigned_to",
    "assigned_to_type",
    "price",
    "statuses",
];

/// Service type table with effective values, one row per service type.
pub fn service_type_rows<R>(repo: &R) -> ServiceResult<Vec<Vec<String>>>
where
    R: ServiceTypeReader + CategoryReader + StatusReader,
{
    let page = show_service_types(ServiceTypeListQuery::default(), repo)?;

    Ok(page
        .service_types
        .into_iter()
        .map(|service_type| {
            let statuses: Vec<String> = service_type
                .statuses
                .into_iter()
                .filter(|membership| membership.attached)
                .map(|membership| membership.name)
                .collect();
            vec![
                service_type.request_type,
                service_type.category,
                service_type.description,
                service_type.enabled.to_string(),
                service_type.approval_label.to_string(),
                service_type.effective_assignee,
                service_type
                    .effective_assignee_type
                    .unwrap_or_default()
                    .to_string(),
                service_type.effective_price,
                statuses.join("; "),
            ]
        })
        .collect())
}

pub fn download_service_types<R>(format: DownloadFormat, repo: &R) -> ServiceResult<DownloadFile>
where
    R: ServiceTypeReader + CategoryReader + StatusReader,
{
    let rows = service_type_rows(repo)?;
    render_download_file("service_types", format, &SERVICE_TYPE_HEADERS, &rows).map_err(|e| {
        log::error!("Failed to render service type download: {e}");
        ServiceError::Internal
    })
}

#[derive(Debug, Clone)]
pub struct DownloadFile {
    pub file_name: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("failed to render csv")]
    CsvRender,
    #[error("failed to render xlsx")]
    XlsxRender,
}

pub fn render_download_file(
    base_name: &str,
    format: DownloadFormat,
    headers: &[&str],
    rows: &[Vec<String>],
) -> Result<DownloadFile, DownloadError> {
    match format {
        DownloadFormat::Csv => {
            let mut writer = csv::Writer::from_writer(vec![]);
            writer
                .write_record(headers)
                .map_err(|_| DownloadError::CsvRender)?;
            for row in rows {
                let escaped: Vec<String> = row.iter().map(|value| escape_csv_cell(value)).collect();
                writer
                    .write_record(&escaped)
                    .map_err(|_| DownloadError::CsvRender)?;
            }
            let bytes = writer.into_inner().map_err(|_| DownloadError::CsvRender)?;
            Ok(DownloadFile {
                file_name: format!("{base_name}.csv"),
                content_type: "text/csv; charset=utf-8",
                bytes,
            })
        }
        DownloadFormat::Xlsx => {
            let mut workbook = rust_xlsxwriter::Workbook::new();
            let worksheet = workbook.add_worksheet();

            for (col, header) in headers.iter().enumerate() {
                worksheet
                    .write_string(0, col as u16, *header)
                    .map_err(|_| DownloadError::XlsxRender)?;
            }
            for (row_idx, row) in rows.iter().enumerate() {
                let sheet_row = (row_idx + 1) as u32;
                for (col, value) in row.iter().enumerate() {
                    worksheet
                        .write_string(sheet_row, col as u16, value)
                        .map_err(|_| DownloadError::XlsxRender)?;
                }
            }

            let bytes = workbook
                .save_to_buffer()
                .map_err(|_| DownloadError::XlsxRender)?;
            Ok(DownloadFile {
                file_name: format!("{base_name}.xlsx"),
                content_type: "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
                bytes,
            })
        }
    }
}

/// Prefixes cells a spreadsheet would evaluate as a formula. A lone `-` is
/// the unset placeholder and stays as is.
fn escape_csv_cell(value: &str) -> String {
    match value.chars().next() {
        Some('=' | '+' | '-' | '@') if value.len() > 1 => format!("'{value}"),
        _ => value.to_string(),
    }
}
