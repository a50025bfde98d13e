use std::fs;
use std::path::PathBuf;

use anyhow::Result;
use chrono::Local;
use clap::ValueEnum;
use tracing::info;

use crate::constants::RESULTS_DIR;
use crate::report::Report;

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum OutputFormat {
    /// Aligned table on stdout.
    Pretty,
    /// CSV file under results/.
    File,
}

pub fn control_output(report: &Report, mode: &str, format: Option<OutputFormat>) -> Result<()> {
    match format {
        Some(OutputFormat::Pretty) => pretty_output(report),
        Some(OutputFormat::File) => file_output(report, mode)?,
        None => default_output(report),
    }
    Ok(())
}

fn default_output(report: &Report) {
    for line in report.lines() {
        println!("{}", line.join(" "));
    }
}

fn pretty_output(report: &Report) {
    let widths = column_widths(report);
    print_row(report.header(), &widths);
    let ruler = widths.iter().sum::<usize>() + 3 * widths.len().saturating_sub(1);
    println!("{}", "-".repeat(ruler));
    for row in report.rows() {
        print_row(row, &widths);
    }
}

fn print_row(row: &[String], widths: &[usize]) {
    let cells: Vec<String> = row
        .iter()
        .zip(widths)
        .map(|(cell, w)| format!("{:<width$}", cell, width = *w))
        .collect();
    println!("{}", cells.join(" | "));
}

fn column_widths(report: &Report) -> Vec<usize> {
    let mut widths: Vec<usize> = report.header().iter().map(|h| h.chars().count()).collect();
    for row in report.rows() {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }
    widths
}

fn file_output(report: &Report, mode: &str) -> Result<()> {
    fs::create_dir_all(RESULTS_DIR)?;
    let timestamp = Local::now().format("%Y-%m-%d_%H-%M-%S");
    let path = PathBuf::from(RESULTS_DIR).join(format!("{mode}_{timestamp}.csv"));

    let mut out = String::new();
    for line in report.lines() {
        out.push_str(&csv_line(line));
        out.push('\n');
    }
    fs::write(&path, out)?;

    info!("Results saved to {}", path.display());
    Ok(())
}

fn needs_quotes(field: &str) -> bool {
    field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r')
}

fn csv_line(row: &[String]) -> String {
    row.iter()
        .map(|cell| {
            if needs_quotes(cell) {
                format!("\"{}\"", cell.replace('"', "\"\""))
            } else {
                cell.clone()
            }
        })
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_fields_are_not_quoted() {
        let row = vec!["Final".to_string(), "3".to_string()];
        assert_eq!(csv_line(&row), "Final,3");
    }

    #[test]
    fn commas_and_quotes_are_escaped() {
        let row = vec![
            "Editor, Author".to_string(),
            "said \"hi\"".to_string(),
        ];
        assert_eq!(csv_line(&row), "\"Editor, Author\",\"said \"\"hi\"\"\"");
    }

    #[test]
    fn widths_cover_the_longest_cell() {
        let mut report = Report::new(["Status", "Count"]);
        report.push(vec!["April Fool!".to_string(), "1".to_string()]);
        assert_eq!(column_widths(&report), vec![11, 5]);
    }
}
