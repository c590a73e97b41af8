//! HTML rendering of a pocket schedule.
//!
//! One table per date. Cells honour `skip` and `row_span`; locations without
//! events on a date are left out of that date's table.

use chrono::NaiveDate;

use super::grid::{DayGrid, Event, GridCell, Schedule};

const STYLE: &str = r#"  <style>
    .empty {
      background-color: lightgray
    }
    .nested {
      width:80%;
      border:1px solid black;
      border-right: none;
      margin-left: auto;
      margin-right: 0;
      padding: 2px;
    }
    .tableContainer {
      page-break-after: always;
    }
    table {
      border-collapse: collapse;
    }
    tr {
      page-break-inside: avoid;
    }
    td, th {
      border: 1px solid black;
      vertical-align: top;
      padding: 2px;
      padding-right: 0px;
      page-break-inside: avoid;
    }
  </style>
"#;

/// Render a complete HTML page.
pub fn render_html(schedule: &Schedule) -> String {
    let mut output = String::from("<html>\n<head>\n");
    output.push_str(STYLE);
    output.push_str("</head>\n<body>\n");

    for grid in schedule.days.values() {
        output.push_str(&div(&render_day(grid), 0.0, "tableContainer"));
    }

    output.push_str("</body></html>");
    output
}

/// Render the table for a single date.
pub fn render_day(grid: &DayGrid) -> String {
    let active = grid.active_locations();

    let headers: Vec<String> = std::iter::once("")
        .chain(active.iter().copied())
        .map(|h| element("th", &escape_html(h), &[]))
        .collect();
    let colspan = format!("colspan={}", headers.len());
    let title = element(
        "th",
        &format!("<h2>{}</h2>", escape_html(&weekday_name(&grid.date))),
        &[colspan.as_str(), r#"style="border: 0px; text-align: left""#],
    );
    let header_rows = [
        element("tr", &title, &[]),
        element("tr", &format!("\n\t\t{}\n\t", headers.join("\n\t\t")), &[]),
    ];

    let rows: Vec<String> = grid
        .rows
        .iter()
        .map(|row| {
            let mut columns = vec![String::new(), element("th", &row.time.display_12h(), &[])];
            for (column, cell) in row.cells.iter().enumerate() {
                if cell.skip || !grid.is_active(column) {
                    continue;
                }
                columns.push(render_cell(cell));
            }
            element("tr", &columns.join("\n\t\t"), &[])
        })
        .collect();

    element(
        "table",
        &(element("thead", &header_rows.join("\n\t"), &[])
            + &element("tbody", &rows.join("\n\t"), &[])),
        &[],
    )
}

fn render_cell(cell: &GridCell) -> String {
    let row_span = if cell.row_span > 0 {
        format!("rowspan={}", cell.row_span + 1)
    } else {
        String::new()
    };

    match cell.event.as_ref().filter(|e| e.is_titled()) {
        Some(event) => element(
            "td",
            &div(&event_content(event), item_height(event.mins), "div"),
            &[row_span.as_str(), ""],
        ),
        None => element("td", "", &[row_span.as_str(), r#"class="empty""#]),
    }
}

/// Title followed by one box per nested event.
fn event_content(event: &Event) -> String {
    let mut content = escape_html(&event.title);
    for nested in &event.nested {
        content.push_str(&format!(
            r#"<br/><br/><div class="nested" style="min-height: {}px">{} {}</div>"#,
            item_height(nested.mins),
            escape_html(&nested.title),
            nested.time.display_12h()
        ));
    }
    content
}

/// 20px per quarter hour, fractional like the stylesheet allows.
pub fn item_height(mins: u32) -> f64 {
    f64::from(mins) / 15.0 * 20.0
}

/// `2024-01-05 Friday`; the bare date when it does not parse.
pub fn weekday_name(date: &str) -> String {
    match NaiveDate::parse_from_str(date, "%Y-%m-%d") {
        Ok(d) => format!("{} {}", date, d.format("%A")),
        Err(_) => date.to_string(),
    }
}

fn element(name: &str, content: &str, attrs: &[&str]) -> String {
    format!("<{} {}>{}</{}>", name, attrs.join(" "), content, name)
}

fn div(content: &str, min_height: f64, class: &str) -> String {
    format!(
        r#"<div class="{}" style="min-height: {}px;">{}</div>"#,
        class, min_height, content
    )
}

/// Escape HTML special characters.
fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ProgrammingItem;
    use crate::schedule::grid::{build_grid, GridOptions};

    fn item(id: &str, title: &str, time: &str, mins: &str, loc: &str) -> ProgrammingItem {
        ProgrammingItem {
            id: Some(id.into()),
            title: title.into(),
            date: "2024-01-05".into(),
            time: time.into(),
            mins: Some(mins.into()),
            loc: vec![loc.into()],
            ..Default::default()
        }
    }

    #[test]
    fn test_weekday_name() {
        assert_eq!(weekday_name("2024-01-05"), "2024-01-05 Friday");
        assert_eq!(weekday_name("someday"), "someday");
    }

    #[test]
    fn test_item_height() {
        assert_eq!(item_height(60), 80.0);
        assert_eq!(item_height(0), 0.0);
        assert_eq!(item_height(90), 120.0);
        assert_eq!(format!("{}", item_height(10)), "13.333333333333332");
    }

    #[test]
    fn test_fractional_heights_are_rendered() {
        let items = vec![
            item("1", "Lightning Talks", "10:00", "50", "Salon 8"),
            item("2", "Quick Demo", "10:00", "10", "Salon 8"),
        ];
        let schedule = build_grid(&items, &GridOptions::default());
        let html = render_day(&schedule.days["2024-01-05"]);

        assert!(html.contains(r#"style="min-height: 66.66666666666667px;">Lightning Talks"#));
        assert!(html.contains(r#"<div class="nested" style="min-height: 13.333333333333332px">Quick Demo"#));
    }

    #[test]
    fn test_render_spans_and_placeholders() {
        let items = vec![
            item("1", "Panel", "10:00", "90", "Salon 8"),
            item("2", "Talk", "10:00", "60", "Ballroom"),
        ];
        let schedule = build_grid(&items, &GridOptions::default());
        let html = render_day(&schedule.days["2024-01-05"]);

        assert!(html.contains("<h2>2024-01-05 Friday</h2>"));
        assert!(html.contains("colspan=3"));
        assert!(html.contains("<th >Salon 8</th>"));
        assert!(html.contains("<th >10:00am</th>"));
        assert!(html.contains("<td rowspan=2 >"));
        assert!(html.contains(r#"style="min-height: 120px;">Panel</div>"#));
        assert!(html.contains(r#"class="empty""#));
        // 10:00, 11:00 and 11:30 rows
        assert_eq!(html.matches("am</th>").count(), 3);
    }

    #[test]
    fn test_render_nested_titles() {
        let items = vec![
            item("1", "Open Gaming", "10:00", "120", "Game Room"),
            item("2", "Tournament <Finals>", "10:00", "60", "Game Room"),
        ];
        let schedule = build_grid(&items, &GridOptions::default());
        let html = render_day(&schedule.days["2024-01-05"]);

        assert!(html.contains(
            r#"Open Gaming<br/><br/><div class="nested" style="min-height: 80px">Tournament &lt;Finals&gt; 10:00am</div>"#
        ));
    }

    #[test]
    fn test_inactive_locations_are_hidden() {
        let items = vec![item("1", "Panel", "10:00", "60", "Salon 8")];
        let options = GridOptions {
            locations: vec!["Main Stage".into()],
            exclude: vec![],
        };
        let schedule = build_grid(&items, &options);
        let html = render_html(&schedule);

        assert!(!html.contains("Main Stage"));
        assert!(html.starts_with("<html>"));
        assert!(html.ends_with("</body></html>"));
        assert!(html.contains(r#"<div class="tableContainer" style="min-height: 0px;">"#));
    }
}
