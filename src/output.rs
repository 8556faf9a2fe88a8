use crate::errors::Result;
use crate::format::{format_currency, format_int, format_percent};
use crate::reports::ViewReport;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tabled::{settings::Style, Table, Tabled};
use tracing::info;

pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s)?;
    Ok(())
}

/// Markdown table of the first `max_rows` rows.
pub fn render_table<T>(rows: &[T], max_rows: usize) -> String
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().take(max_rows).cloned().collect();
    if slice.is_empty() {
        return "(no rows)".to_string();
    }
    Table::new(slice).with(Style::markdown()).to_string()
}

/// Markdown preview of a report: headline figures then its tables.
pub fn render_report(report: &ViewReport, label_width: usize, max_rows: usize) -> String {
    let mut out = String::new();
    let mut section = |title: &str, body: String| {
        out.push_str(title);
        out.push_str("\n\n");
        out.push_str(&body);
        out.push_str("\n\n");
    };

    if report.is_empty() {
        section(
            report.kind().title(),
            format!("No {} data available", report.kind().as_str()),
        );
        return out;
    }

    match report {
        ViewReport::JobCounts(r) => {
            section(
                "Job Market Overview",
                format!(
                    "Total Job Listings: {}\nActive Roles: {}\nAverage per Role: {}",
                    format_int(r.reported_total),
                    r.active_roles,
                    format_int(r.average_per_role)
                ),
            );
            section("Top Job Categories", render_table(&r.top_role_rows(), max_rows));
        }
        ViewReport::Skills(r) => {
            section(&r.title(), render_table(&r.rows(), max_rows));
            for role in &r.breakdown {
                let mut names: Vec<String> = role.skills.iter().map(|s| s.key.clone()).collect();
                if role.remaining > 0 {
                    names.push(format!("+{} more", role.remaining));
                }
                section(&format!("Skills for {}", role.role), names.join(", "));
            }
        }
        ViewReport::WorkStyle(r) => {
            section(
                "Work Style Distribution",
                format!(
                    "Total Positions: {}\nRemote Jobs: {} ({} of total)\nOn-site & Hybrid: {} ({} of total)",
                    format_int(r.total),
                    format_int(r.remote),
                    format_percent(r.remote_share),
                    format_int(r.onsite),
                    format_percent(r.onsite_share)
                ),
            );
            section("Detailed Breakdown", render_table(&r.rows(), max_rows));
        }
        ViewReport::Geography(r) => {
            let top = r
                .top_location()
                .map(|e| format!("{} ({} jobs)", e.key(), format_int(e.total())))
                .unwrap_or_default();
            section(
                "Geographic Distribution",
                format!(
                    "{} with Jobs: {}\nTotal Jobs: {}\nTop Location: {}",
                    r.region_noun(),
                    r.region_count,
                    format_int(r.total_jobs),
                    top
                ),
            );
            section("Top Locations", render_table(&r.rows(), max_rows));
        }
        ViewReport::Salaries(r) => {
            let s = &r.statistics;
            section(
                "Salary Analysis",
                format!(
                    "Median Salary Average: {}\nMin Salary: {}\nSalary Range: {}\nHighest Median Salary: {}\n({} of {} records usable)",
                    format_currency(s.average),
                    format_currency(s.min),
                    format_currency(s.spread),
                    format_currency(s.max),
                    r.valid_records,
                    r.total_records
                ),
            );
            section("Salary Range by Role", render_table(&r.role_rows(), max_rows));
            section("Top Paying Cities", render_table(&r.city_rows(), max_rows));
            section("Detailed Salary Data", render_table(&r.figure_rows(), max_rows));
        }
        ViewReport::Listings(r) => {
            section(
                "Recent Job Listings",
                format!(
                    "Listings: {}\nCompanies Hiring: {}",
                    format_int(r.total_listings as f64),
                    r.distinct_employers
                ),
            );
            section("Recent Jobs by Role", render_table(&r.role_rows(), max_rows));
            section("Latest Job Postings", render_table(&r.listing_rows(), max_rows));
            section(
                "Top Hiring Companies",
                render_table(&r.company_rows(label_width), max_rows),
            );
        }
    }
    out
}

pub fn preview_report(report: &ViewReport, label_width: usize, max_rows: usize) {
    println!("{}", render_report(report, label_width, max_rows));
}

#[derive(Debug, Serialize)]
struct SummaryEnvelope<'a> {
    generated_at: DateTime<Utc>,
    #[serde(flatten)]
    report: &'a ViewReport,
}

/// Write `<view>.csv` (the primary table) and `<view>_summary.json` (the
/// whole report) into `dir`. Returns the paths written.
pub fn export_report(report: &ViewReport, dir: &Path, label_width: usize) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)?;
    let stem = report.kind().as_str();
    let csv_path = dir.join(format!("{}.csv", stem));
    match report {
        ViewReport::JobCounts(r) => write_csv(&csv_path, &r.rows())?,
        ViewReport::Skills(r) => write_csv(&csv_path, &r.rows())?,
        ViewReport::WorkStyle(r) => write_csv(&csv_path, &r.rows())?,
        ViewReport::Geography(r) => write_csv(&csv_path, &r.rows())?,
        ViewReport::Salaries(r) => write_csv(&csv_path, &r.figure_rows())?,
        ViewReport::Listings(r) => write_csv(&csv_path, &r.company_rows(label_width))?,
    }

    let json_path = dir.join(format!("{}_summary.json", stem));
    let envelope = SummaryEnvelope {
        generated_at: Utc::now(),
        report,
    };
    write_json(&json_path, &envelope)?;
    info!(csv = %csv_path.display(), json = %json_path.display(), "report exported");
    Ok(vec![csv_path, json_path])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reports::build_report;
    use crate::types::{ViewKind, ViewOptions};
    use serde_json::json;

    fn geo_report() -> ViewReport {
        let raw = json!({"data": [
            {"job_state": "CA", "job_count": 30},
            {"job_state": "TX", "job_count": 10}
        ]});
        build_report(&raw, ViewKind::Geography, &ViewOptions::default())
    }

    #[test]
    fn render_includes_headline_and_table() {
        let text = render_report(&geo_report(), 20, 5);
        assert!(text.contains("States with Jobs: 2"));
        assert!(text.contains("| Rank |"));
        assert!(text.contains("75.0%"));
    }

    #[test]
    fn empty_report_renders_no_data_notice() {
        let report = build_report(&json!({"data": []}), ViewKind::Salaries, &ViewOptions::default());
        assert!(render_report(&report, 20, 5).contains("No salaries data available"));
    }

    #[test]
    fn render_table_limits_rows() {
        let report = geo_report();
        let ViewReport::Geography(r) = &report else {
            panic!("expected a geography report");
        };
        let table = render_table(&r.rows(), 1);
        assert!(table.contains("CA"));
        assert!(!table.contains("TX"));
    }

    #[test]
    fn export_writes_csv_and_summary() {
        let dir = tempfile::tempdir().unwrap();
        let paths = export_report(&geo_report(), dir.path(), 20).unwrap();
        assert_eq!(paths.len(), 2);

        let csv_text = std::fs::read_to_string(&paths[0]).unwrap();
        assert!(csv_text.starts_with("Rank,Location,Jobs,Share,ShareOfTop,Style"));
        assert!(csv_text.contains("1,CA,30,75.0%,100.0%,primary"));
        assert!(csv_text.contains("2,TX,10,25.0%,33.3%,success"));

        let summary: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&paths[1]).unwrap()).unwrap();
        assert_eq!(summary["view"], "geography");
        assert!(summary["generated_at"].is_string());
        assert_eq!(summary["region_count"], 2);
    }
}
