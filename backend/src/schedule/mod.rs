//! Pocket schedule generation.
//!
//! - Time: Clock times past midnight and duration parsing
//! - Grid: Per-date `time × location` grids with overlap merging
//! - Html: Printable table rendering

pub mod grid;
pub mod html;
pub mod time;

use std::fs;
use std::path::Path;

use crate::datafile::read_program;
use crate::error::{DataFileError, PipelineResult};

pub use grid::{build_grid, DayGrid, Event, GridCell, GridOptions, GridRow, NestedEvent, Schedule};
pub use html::{render_day, render_html};
pub use time::{parse_minutes, ClockTime};

/// Read a `program.js` data file and write its pocket schedule as HTML.
pub fn build_pocket_schedule(
    program: &Path,
    options: &GridOptions,
    output: &Path,
) -> PipelineResult<Schedule> {
    let items = read_program(program)?;
    tracing::info!("Read {} programming items from {}", items.len(), program.display());

    let schedule = build_grid(&items, options);
    fs::write(output, render_html(&schedule)).map_err(DataFileError::from)?;
    tracing::info!(
        "Wrote {} day(s) to {} with {} warning(s)",
        schedule.days.len(),
        output.display(),
        schedule.diagnostics.warning_count()
    );

    Ok(schedule)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datafile::write_data_file;
    use serde_json::json;

    #[test]
    fn test_build_pocket_schedule() {
        let dir = tempfile::tempdir().unwrap();
        let program = json!([
            { "id": "1", "title": "Opening", "date": "2024-01-05", "time": "10:00", "mins": "60", "loc": ["Main Stage"] },
            { "id": "2", "title": "Cancelled", "date": "2024-01-05", "time": "11:00", "mins": "60", "loc": ["Main Stage"], "status": "Cancelled" },
            { "id": "3", "title": "Nowhere", "date": "2024-01-06", "time": "09:00", "mins": "30", "loc": [] }
        ]);
        let program_path = write_data_file(dir.path(), "program", &program).unwrap();
        let output = dir.path().join("pocket.html");

        let schedule = build_pocket_schedule(&program_path, &GridOptions::default(), &output).unwrap();

        assert_eq!(schedule.days.len(), 1);
        assert_eq!(schedule.diagnostics.warning_count(), 1);

        let html = fs::read_to_string(&output).unwrap();
        assert!(html.contains("Opening"));
        assert!(!html.contains("Cancelled"));
    }

    #[test]
    fn test_missing_program_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = build_pocket_schedule(
            &dir.path().join("program.js"),
            &GridOptions::default(),
            &dir.path().join("pocket.html"),
        );
        assert!(result.is_err());
    }
}
