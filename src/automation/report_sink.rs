// src/automation/report_sink.rs
//! Applied-job reports and their spreadsheet export

use chrono::Local;
use rust_xlsxwriter::{Format, Workbook};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::info;

use crate::error::{AutomationError, AutomationResult};
use crate::types::JobReport;

pub const EXPORT_HEADER: [&str; 5] = ["Date", "Job Title", "Company", "Match Score", "Status"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Xlsx,
    Csv,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Xlsx => "xlsx",
            ExportFormat::Csv => "csv",
        }
    }
}

/// Newest-first list of reports, shared between producers and the exporter
#[derive(Debug, Clone, Default)]
pub struct ReportSink {
    reports: Arc<Mutex<Vec<JobReport>>>,
}

impl ReportSink {
    pub fn new() -> Self {
        Self::default()
    }

    fn list(&self) -> MutexGuard<'_, Vec<JobReport>> {
        self.reports.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn add_report(&self, report: JobReport) {
        self.list().insert(0, report);
    }

    pub fn reports(&self) -> Vec<JobReport> {
        self.list().clone()
    }

    pub fn len(&self) -> usize {
        self.list().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.list().clear();
    }

    /// Header row followed by one row per report
    pub fn export_rows(&self) -> Vec<Vec<String>> {
        let mut rows = vec![EXPORT_HEADER.iter().map(|h| h.to_string()).collect()];
        rows.extend(self.list().iter().map(|report| {
            vec![
                report.date.clone(),
                report.job_title.clone(),
                report.company.clone(),
                format!("{}%", report.match_score),
                report.status.to_string(),
            ]
        }));
        rows
    }

    pub fn export_file_name(format: ExportFormat) -> String {
        format!(
            "job_report_{}.{}",
            Local::now().format("%Y-%m-%d"),
            format.extension()
        )
    }

    fn build_workbook(&self) -> AutomationResult<Workbook> {
        let mut workbook = Workbook::new();
        let header_format = Format::new().set_bold();
        let worksheet = workbook.add_worksheet();
        worksheet.set_name("Job Reports")?;

        for (row_idx, row) in self.export_rows().iter().enumerate() {
            for (col_idx, cell) in row.iter().enumerate() {
                let (row_idx, col_idx) = (row_idx as u32, col_idx as u16);
                if row_idx == 0 {
                    worksheet.write_string_with_format(row_idx, col_idx, cell, &header_format)?;
                } else {
                    worksheet.write_string(row_idx, col_idx, cell)?;
                }
            }
        }
        worksheet.autofit();

        Ok(workbook)
    }

    /// Spreadsheet bytes, for downloads that never touch the disk
    pub fn to_xlsx_bytes(&self) -> AutomationResult<Vec<u8>> {
        let mut workbook = self.build_workbook()?;
        Ok(workbook.save_to_buffer()?)
    }

    pub fn export_xlsx(&self, dir: &Path) -> AutomationResult<PathBuf> {
        self.export(dir, ExportFormat::Xlsx)
    }

    pub fn export_csv(&self, dir: &Path) -> AutomationResult<PathBuf> {
        self.export(dir, ExportFormat::Csv)
    }

    /// Write `job_report_<date>.<ext>` into `dir`
    pub fn export(&self, dir: &Path, format: ExportFormat) -> AutomationResult<PathBuf> {
        std::fs::create_dir_all(dir).map_err(|e| {
            AutomationError::Export(format!("Failed to create {}: {}", dir.display(), e))
        })?;
        let output_path = dir.join(Self::export_file_name(format));

        match format {
            ExportFormat::Xlsx => {
                let mut workbook = self.build_workbook()?;
                workbook.save(&output_path)?;
            }
            ExportFormat::Csv => {
                let mut writer = csv::Writer::from_path(&output_path)?;
                for row in self.export_rows() {
                    writer.write_record(&row)?;
                }
                writer.flush().map_err(|e| AutomationError::Export(e.to_string()))?;
            }
        }

        info!(
            "Exported {} reports to {}",
            self.len(),
            output_path.display()
        );
        Ok(output_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ReportStatus;

    fn report(title: &str, score: u8, status: ReportStatus) -> JobReport {
        JobReport::new(title, "Y", score, status).with_date("2024-01-01")
    }

    #[test]
    fn test_reports_are_newest_first() {
        let sink = ReportSink::new();
        sink.add_report(report("first", 95, ReportStatus::Applied));
        sink.add_report(report("second", 85, ReportStatus::External));

        let titles: Vec<_> = sink.reports().into_iter().map(|r| r.job_title).collect();
        assert_eq!(titles, vec!["second", "first"]);
    }

    #[test]
    fn test_export_rows_header_and_format() {
        let sink = ReportSink::new();
        sink.add_report(report("X", 90, ReportStatus::Applied));

        let rows = sink.export_rows();
        assert_eq!(
            rows[0],
            vec!["Date", "Job Title", "Company", "Match Score", "Status"]
        );
        assert_eq!(rows[1], vec!["2024-01-01", "X", "Y", "90%", "Applied"]);
    }

    #[test]
    fn test_empty_export_still_has_header() {
        let rows = ReportSink::new().export_rows();
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn test_export_file_name_uses_date() {
        let name = ReportSink::export_file_name(ExportFormat::Xlsx);
        assert!(name.starts_with("job_report_"));
        assert!(name.ends_with(".xlsx"));
        assert_eq!(name.len(), "job_report_YYYY-MM-DD.xlsx".len());
    }

    #[test]
    fn test_export_csv_writes_table() {
        let dir = tempfile::tempdir().unwrap();
        let sink = ReportSink::new();
        sink.add_report(report("X", 90, ReportStatus::Applied));

        let path = sink.export_csv(dir.path()).unwrap();
        let content = std::fs::read_to_string(path).unwrap();
        let mut lines = content.lines();
        assert_eq!(lines.next(), Some("Date,Job Title,Company,Match Score,Status"));
        assert_eq!(lines.next(), Some("2024-01-01,X,Y,90%,Applied"));
    }

    #[test]
    fn test_export_xlsx_creates_zip_file() {
        let dir = tempfile::tempdir().unwrap();
        let sink = ReportSink::new();
        sink.add_report(report("X", 95, ReportStatus::Applied));

        let path = sink.export_xlsx(dir.path()).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"PK"));
        assert!(sink.to_xlsx_bytes().unwrap().starts_with(b"PK"));
    }
}
