use crate::record::{CallRecord, LOG_COLUMNS};
use anyhow::{bail, Context};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt::Write as _;
use std::fs::{self, OpenOptions};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Append to the CSV log and print the summary table.
    #[default]
    Csv,
    /// Print the summary table only.
    Table,
}

/// Appends one row, writing the header first when the file is new or empty.
/// A log that already has a different header is left untouched.
pub fn append_csv(path: &Path, record: &CallRecord) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("create log dir {}", parent.display()))?;
    }

    let needs_header = fs::metadata(path).map(|m| m.len() == 0).unwrap_or(true);
    if !needs_header {
        let headers = log_reader(path)?
            .headers()
            .with_context(|| format!("read header of {}", path.display()))?
            .clone();
        if !headers.iter().eq(LOG_COLUMNS) {
            bail!(
                "call log {} has columns [{}], expected [{}]",
                path.display(),
                headers.iter().collect::<Vec<_>>().join(","),
                LOG_COLUMNS.join(",")
            );
        }
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("open call log {}", path.display()))?;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(needs_header)
        .from_writer(file);
    writer
        .serialize(record)
        .with_context(|| format!("write call record to {}", path.display()))?;
    writer.flush().context("flush call log")?;
    Ok(())
}

pub fn read_csv(path: &Path) -> anyhow::Result<Vec<CallRecord>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let mut reader = log_reader(path)?;
    reader
        .deserialize()
        .collect::<Result<Vec<CallRecord>, _>>()
        .with_context(|| format!("parse call log {}", path.display()))
}

pub fn render_table(record: &CallRecord) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Call Summary:");
    let _ = writeln!(out, "client_id | result  | comment");
    let _ = writeln!(out, "{}", "-".repeat(46));
    let _ = writeln!(
        out,
        "{:<9} | {:<7} | {}",
        record.client_id, record.result, record.comment
    );
    out
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Stats {
    pub success: usize,
    pub fail: usize,
    pub other: usize,
    pub total: usize,
}

impl Stats {
    pub fn from_results<'a, I>(results: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut stats = Stats::default();
        for result in results {
            match result.trim() {
                "success" => stats.success += 1,
                "fail" => stats.fail += 1,
                _ => stats.other += 1,
            }
            stats.total += 1;
        }
        stats
    }

    pub fn slices(&self) -> [(&'static str, usize, &'static str); 3] {
        [
            ("Success", self.success, "green"),
            ("Fail", self.fail, "red"),
            ("Other", self.other, "gray"),
        ]
    }

    fn percent(&self, count: usize) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            count as f64 * 100.0 / self.total as f64
        }
    }
}

/// Counts outcomes straight from the `result` column. Rows may have any
/// number of fields; short rows and unexpected values count as "other".
pub fn read_stats(path: &Path) -> anyhow::Result<Option<Stats>> {
    if !path.exists() {
        return Ok(None);
    }
    let mut reader = log_reader(path)?;
    let column = reader
        .headers()
        .with_context(|| format!("read header of {}", path.display()))?
        .iter()
        .position(|h| h.trim() == "result")
        .with_context(|| format!("call log {} has no result column", path.display()))?;

    let rows = reader
        .records()
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("parse call log {}", path.display()))?;
    Ok(Some(Stats::from_results(
        rows.iter().map(|row| row.get(column).unwrap_or("")),
    )))
}

fn log_reader(path: &Path) -> anyhow::Result<csv::Reader<fs::File>> {
    csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("open call log {}", path.display()))
}

pub fn render_stats(stats: &Stats) -> String {
    const BAR_WIDTH: usize = 30;
    let mut out = String::new();
    let _ = writeln!(out, "Call Outcomes ({} calls)", stats.total);
    for (label, count, _) in stats.slices() {
        let percent = stats.percent(count);
        let filled = (percent / 100.0 * BAR_WIDTH as f64).round() as usize;
        let _ = writeln!(
            out,
            "{label:<8} {:<width$} {count:>4} ({percent:.0}%)",
            "#".repeat(filled),
            width = BAR_WIDTH
        );
    }
    out
}

/// Pie chart of outcomes as a standalone SVG document.
pub fn render_pie_svg(stats: &Stats) -> String {
    const SIZE: f64 = 400.0;
    const RADIUS: f64 = 150.0;
    let (cx, cy) = (SIZE / 2.0, SIZE / 2.0 + 20.0);

    let mut svg = String::new();
    let _ = writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{SIZE}" height="{}" viewBox="0 0 {SIZE} {}">"#,
        SIZE + 40.0,
        SIZE + 40.0
    );
    let _ = writeln!(
        svg,
        r#"  <text x="{cx}" y="24" text-anchor="middle" font-family="sans-serif" font-size="18">Call Outcomes</text>"#
    );

    let present: Vec<_> = stats.slices().into_iter().filter(|(_, n, _)| *n > 0).collect();
    if present.is_empty() {
        let _ = writeln!(
            svg,
            r#"  <circle cx="{cx}" cy="{cy}" r="{RADIUS}" fill="none" stroke="gray"/>"#
        );
    } else if present.len() == 1 {
        let (label, _, color) = present[0];
        let _ = writeln!(svg, r#"  <circle cx="{cx}" cy="{cy}" r="{RADIUS}" fill="{color}"/>"#);
        let _ = writeln!(
            svg,
            r#"  <text x="{cx}" y="{cy}" text-anchor="middle" font-family="sans-serif">{label} 100%</text>"#
        );
    } else {
        // start at 140 degrees, counter-clockwise, like the usual pie layout
        let mut angle = 140f64.to_radians();
        for (label, count, color) in present {
            let sweep = 2.0 * PI * count as f64 / stats.total as f64;
            let (x1, y1) = (cx + RADIUS * angle.cos(), cy - RADIUS * angle.sin());
            let end = angle + sweep;
            let (x2, y2) = (cx + RADIUS * end.cos(), cy - RADIUS * end.sin());
            let large_arc = if sweep > PI { 1 } else { 0 };
            let _ = writeln!(
                svg,
                r#"  <path d="M {cx:.2} {cy:.2} L {x1:.2} {y1:.2} A {RADIUS} {RADIUS} 0 {large_arc} 0 {x2:.2} {y2:.2} Z" fill="{color}"/>"#
            );

            let mid = angle + sweep / 2.0;
            let (lx, ly) = (cx + RADIUS * 0.6 * mid.cos(), cy - RADIUS * 0.6 * mid.sin());
            let _ = writeln!(
                svg,
                r#"  <text x="{lx:.2}" y="{ly:.2}" text-anchor="middle" font-family="sans-serif">{label} {:.0}%</text>"#,
                stats.percent(count)
            );
            angle = end;
        }
    }

    svg.push_str("</svg>\n");
    svg
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::Language;
    use crate::record::Outcome;
    use chrono::TimeZone;

    fn record(client_id: u64, result: Outcome, comment: &str) -> CallRecord {
        let at = chrono::Local.with_ymd_and_hms(2025, 4, 24, 10, 0, 0).unwrap();
        CallRecord::new(client_id, result, comment, Language::English, at)
    }

    #[test]
    fn header_written_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("calls.csv");

        append_csv(&path, &record(1, Outcome::Success, "payment_status: paid")).unwrap();
        append_csv(&path, &record(2, Outcome::Fail, "unreachable")).unwrap();

        let raw = fs::read_to_string(&path).unwrap();
        assert_eq!(raw.matches("client_id").count(), 1);
        assert!(raw.starts_with("client_id,result,comment,language"));

        let records = read_csv(&path).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].comment, "unreachable");
        assert_eq!(records[1].result, Outcome::Fail);
    }

    #[test]
    fn comments_with_separators_survive() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("calls.csv");
        let comment = "payment_status: paid; name: anna, maria; age: 30";
        append_csv(&path, &record(7, Outcome::Success, comment)).unwrap();
        assert_eq!(read_csv(&path).unwrap()[0].comment, comment);
    }

    #[test]
    fn missing_log_reads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("none.csv");
        assert!(read_csv(&path).unwrap().is_empty());
        assert!(read_stats(&path).unwrap().is_none());
    }

    #[test]
    fn stats_count_other_results() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("calls.csv");
        fs::write(
            &path,
            "client_id,result,comment\n1,success,a\n2,fail,b\n3,success,c\n4,pending,d\n",
        )
        .unwrap();

        let stats = read_stats(&path).unwrap().unwrap();
        assert_eq!(
            stats,
            Stats {
                success: 2,
                fail: 1,
                other: 1,
                total: 4
            }
        );
        let text = render_stats(&stats);
        assert!(text.contains("(50%)"));
        assert!(text.contains("Other"));
    }

    #[test]
    fn refuses_to_append_under_another_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("calls.csv");
        let survey_log = "client_id,result,comment,language,age,channel,notification,call_time,history_confirmation,response\n\
                          10001,success,confirmed payment,ru,35,mobile,debt,14:05,да,уже оплатил\n";
        fs::write(&path, survey_log).unwrap();

        let err = append_csv(&path, &record(2, Outcome::Fail, "unreachable")).unwrap_err();
        assert!(err.to_string().contains("expected [client_id,result,comment"));
        assert_eq!(fs::read_to_string(&path).unwrap(), survey_log);
    }

    #[test]
    fn stats_tolerate_rows_of_different_width() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("calls.csv");
        fs::write(
            &path,
            "client_id,result,comment,language,age,channel,notification,call_time,history_confirmation,response\n\
             1,success,a,ru,35,mobile,debt,14:05,да,ok\n\
             2,fail,unreachable,en,,,,,,,,,unknown\n\
             3\n",
        )
        .unwrap();

        let stats = read_stats(&path).unwrap().unwrap();
        assert_eq!(
            stats,
            Stats {
                success: 1,
                fail: 1,
                other: 1,
                total: 3
            }
        );
    }

    #[test]
    fn stats_need_a_result_column() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("calls.csv");
        fs::write(&path, "client_id,outcome\n1,success\n").unwrap();
        assert!(read_stats(&path).is_err());
    }

    #[test]
    fn table_has_header_and_row() {
        let table = render_table(&record(10001, Outcome::Fail, "asked for callback"));
        let lines: Vec<_> = table.lines().collect();
        assert_eq!(lines[1], "client_id | result  | comment");
        assert_eq!(lines[3], "10001     | fail    | asked for callback");
    }

    #[test]
    fn pie_has_one_slice_per_nonzero_outcome() {
        let stats = Stats::from_results(["success", "success", "fail"]);
        let svg = render_pie_svg(&stats);
        assert_eq!(svg.matches("<path").count(), 2);
        assert!(svg.contains("fill=\"green\""));
        assert!(!svg.contains("fill=\"gray\""));
        assert!(svg.contains("Call Outcomes"));

        let single = render_pie_svg(&Stats::from_results(["fail"]));
        assert!(single.contains("Fail 100%"));
        let empty = render_pie_svg(&Stats::default());
        assert!(empty.contains("stroke=\"gray\""));
    }
}
