//! Pocket schedule grid builder.
//!
//! Lays programming items out per date as a `time × location` grid ready for
//! table rendering.
//!
//! # Layout
//!
//! ```text
//!          Salon 8            Ballroom
//! 10:00    Panel (90 mins)    Talk (60 mins)
//! 11:00    (skip)             (placeholder)     <- Talk's end
//! 11:30    (placeholder)      (placeholder)     <- Panel's end
//! ```
//!
//! Here Panel gets `row_span = 1` and its 11:00 cell is marked `skip`.
//!
//! Rows are not a uniform clock: there is one row per start time and per end
//! time seen on that date. A cell whose event runs past following rows spans
//! them (`row_span`) and the covered cells are marked `skip`.
//!
//! # Overlaps
//!
//! Two events at the same date, time and location are merged: the longer one
//! becomes the container and the shorter one is nested inside it. Events
//! found inside a container's span while computing row spans are merged the
//! same way. The container's duration is extended when a nested event ends
//! later. Nesting is one level deep; a merged container's own nested events
//! move up into the new container.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use super::time::{parse_minutes, ClockTime};
use crate::diagnostics::Diagnostics;
use crate::models::ProgrammingItem;

/// Column selection for the grid
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GridOptions {
    /// Locations that come first, in this order
    #[serde(default)]
    pub locations: Vec<String>,
    /// Locations left out of the grid entirely
    #[serde(default)]
    pub exclude: Vec<String>,
}

/// An event nested inside a container event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NestedEvent {
    pub id: String,
    pub title: String,
    pub time: ClockTime,
    pub mins: u32,
    pub status: Option<String>,
}

/// A placed programming item, possibly holding nested overlapping items.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Event {
    pub id: String,
    pub title: String,
    pub date: String,
    pub time: ClockTime,
    /// Effective duration, extended when a nested event ends later.
    pub mins: u32,
    pub location: String,
    pub status: Option<String>,
    pub nested: Vec<NestedEvent>,
}

impl Event {
    pub fn end(&self) -> ClockTime {
        self.time.plus_minutes(self.mins)
    }

    /// Untitled events behave like placeholders.
    pub fn is_titled(&self) -> bool {
        !self.title.is_empty()
    }

    /// Own title followed by nested titles.
    pub fn titles(&self) -> Vec<&str> {
        std::iter::once(self.title.as_str())
            .chain(self.nested.iter().map(|n| n.title.as_str()))
            .collect()
    }

    fn describe(&self) -> String {
        format!(
            "{} {}-{} {}",
            self.title,
            self.time,
            self.end(),
            self.status.as_deref().unwrap_or("")
        )
    }

    /// Nest `other` inside this event, flattening its own nested events.
    fn absorb(&mut self, other: Event, diagnostics: &mut Diagnostics) {
        diagnostics.warning(format!(
            "Overlap detected: {} {}: {} overlaps {}",
            self.date,
            self.location,
            self.describe().trim_end(),
            other.describe().trim_end()
        ));

        let other_end = other.end();
        let Event {
            id,
            title,
            time,
            mins,
            status,
            nested,
            ..
        } = other;
        self.nested.push(NestedEvent {
            id,
            title,
            time,
            mins,
            status,
        });
        self.nested.extend(nested);

        let extension = self.end().minutes_until(other_end);
        if extension > 0 {
            self.mins = self.mins.saturating_add(extension);
            diagnostics.warning_indent(
                format!(
                    "time extended by {} minutes; new end time: {}",
                    extension,
                    self.end()
                ),
                1,
            );
        }
    }
}

/// Merge two events that start at the same date, time and location.
/// The longer one contains the other; on a tie `incoming` is the container.
fn merge(existing: Event, incoming: Event, diagnostics: &mut Diagnostics) -> Event {
    let (mut container, nested) = if incoming.mins < existing.mins {
        (existing, incoming)
    } else {
        (incoming, existing)
    };
    container.absorb(nested, diagnostics);
    container
}

/// One grid cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GridCell {
    pub date: String,
    pub time: ClockTime,
    pub location: String,
    /// `None` for placeholders.
    pub event: Option<Event>,
    /// Additional rows covered by this cell.
    pub row_span: usize,
    /// Covered by a cell above; not rendered.
    pub skip: bool,
}

impl GridCell {
    fn placeholder(date: &str, time: ClockTime, location: &str) -> Self {
        Self {
            date: date.to_string(),
            time,
            location: location.to_string(),
            event: None,
            row_span: 0,
            skip: false,
        }
    }

    pub fn title(&self) -> Option<&str> {
        self.event
            .as_ref()
            .filter(|e| e.is_titled())
            .map(|e| e.title.as_str())
    }

    pub fn is_titled(&self) -> bool {
        self.title().is_some()
    }

    /// Zero for placeholders.
    pub fn mins(&self) -> u32 {
        self.event.as_ref().map_or(0, |e| e.mins)
    }

    pub fn end(&self) -> ClockTime {
        self.time.plus_minutes(self.mins())
    }
}

/// One grid row: a start or end time seen on that date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GridRow {
    pub time: ClockTime,
    /// One cell per schedule location, in column order.
    pub cells: Vec<GridCell>,
}

/// The grid for one date.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayGrid {
    pub date: String,
    /// Column headers, shared by every date of the schedule.
    pub locations: Vec<String>,
    pub rows: Vec<GridRow>,
    /// Titled events per column on this date.
    pub event_counts: Vec<usize>,
}

impl DayGrid {
    pub fn is_active(&self, column: usize) -> bool {
        self.event_counts.get(column).is_some_and(|&n| n > 0)
    }

    /// Locations with at least one event on this date.
    pub fn active_locations(&self) -> Vec<&str> {
        self.locations
            .iter()
            .enumerate()
            .filter(|(i, _)| self.is_active(*i))
            .map(|(_, l)| l.as_str())
            .collect()
    }

    pub fn column(&self, column: usize) -> impl Iterator<Item = &GridCell> + '_ {
        self.rows.iter().filter_map(move |row| row.cells.get(column))
    }
}

/// Grids for every date, ascending.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Schedule {
    pub days: BTreeMap<String, DayGrid>,
    /// Column order shared by every date.
    pub locations: Vec<String>,
    #[serde(skip)]
    pub diagnostics: Diagnostics,
}

/// Placed events per date, time and column; `None` marks an end-time placeholder.
type Placement = BTreeMap<String, BTreeMap<ClockTime, HashMap<usize, Option<Event>>>>;

/// Build the per-date grids for a program.
pub fn build_grid(items: &[ProgrammingItem], options: &GridOptions) -> Schedule {
    let mut diagnostics = Diagnostics::new();

    let events = collect_events(items, &mut diagnostics);
    let locations = location_universe(&events, options);
    let column_of: HashMap<&str, usize> = locations
        .iter()
        .enumerate()
        .map(|(i, l)| (l.as_str(), i))
        .collect();

    let mut placement: Placement = BTreeMap::new();
    for event in events {
        let Some(&column) = column_of.get(event.location.as_str()) else {
            continue;
        };
        place(&mut placement, column, event, &mut diagnostics);
    }

    let mut days = BTreeMap::new();
    for (date, times) in placement {
        let mut grid = materialize(&date, times, &locations);
        settle_spans(&mut grid, &mut diagnostics);
        days.insert(date, grid);
    }

    Schedule {
        days,
        locations,
        diagnostics,
    }
}

/// Filter the program and convert items into events.
fn collect_events(items: &[ProgrammingItem], diagnostics: &mut Diagnostics) -> Vec<Event> {
    let mut events = Vec::new();

    for item in items {
        if item.location().is_none() {
            diagnostics.warning(format!("{} has no location!", item.title));
        }
        if !item.has_id() || item.is_cancelled() {
            continue;
        }
        let Some(location) = item.location() else {
            continue;
        };
        let Some(time) = ClockTime::parse(&item.time) else {
            diagnostics.warning(format!(
                "{} {}: {}: invalid start time '{}'",
                item.date, location, item.title, item.time
            ));
            continue;
        };
        let mins = match parse_minutes(item.mins.as_deref()) {
            Some(mins) => mins,
            None => {
                diagnostics.warning(format!(
                    "{} {}: {}: invalid/missing duration (mins)",
                    item.date, location, item.title
                ));
                0
            }
        };

        events.push(Event {
            id: item.id.clone().unwrap_or_default(),
            title: item.title.clone(),
            date: item.date.clone(),
            time,
            mins,
            location: location.to_string(),
            status: item.status.clone(),
            nested: Vec::new(),
        });
    }

    events
}

/// Requested locations first, then discovered ones, minus exclusions.
fn location_universe(events: &[Event], options: &GridOptions) -> Vec<String> {
    let mut locations: Vec<String> = Vec::new();
    let requested = options.locations.iter().map(String::as_str);
    let discovered = events.iter().map(|e| e.location.as_str());

    for location in requested.chain(discovered) {
        if location.is_empty()
            || options.exclude.iter().any(|x| x == location)
            || locations.iter().any(|l| l == location)
        {
            continue;
        }
        locations.push(location.to_string());
    }

    locations
}

fn place(placement: &mut Placement, column: usize, event: Event, diagnostics: &mut Diagnostics) {
    let day = placement.entry(event.date.clone()).or_default();

    // Boundary row at the end time, unless something already starts there.
    day.entry(event.end())
        .or_default()
        .entry(column)
        .or_insert(None);

    let slot = day.entry(event.time).or_default().entry(column).or_insert(None);
    let placed = match slot.take() {
        Some(existing) if existing.is_titled() => merge(existing, event, diagnostics),
        _ => event,
    };
    *slot = Some(placed);
}

/// Fill every row with one cell per location.
fn materialize(
    date: &str,
    times: BTreeMap<ClockTime, HashMap<usize, Option<Event>>>,
    locations: &[String],
) -> DayGrid {
    let mut event_counts = vec![0; locations.len()];
    let mut rows = Vec::with_capacity(times.len());

    for (time, mut slots) in times {
        let cells = locations
            .iter()
            .enumerate()
            .map(|(column, location)| {
                let mut cell = GridCell::placeholder(date, time, location);
                cell.event = slots.remove(&column).flatten();
                if cell.is_titled() {
                    event_counts[column] += 1;
                }
                cell
            })
            .collect();
        rows.push(GridRow { time, cells });
    }

    DayGrid {
        date: date.to_string(),
        locations: locations.to_vec(),
        rows,
        event_counts,
    }
}

/// Compute row spans and skip flags, merging events discovered inside a span.
///
/// A single top-down pass settles the grid: the spanning cell's end time is
/// re-read for every following row, so an extension from a merge is seen by
/// the rest of the walk, and cells it covers are skipped before the outer
/// loop reaches them.
fn settle_spans(grid: &mut DayGrid, diagnostics: &mut Diagnostics) {
    let row_count = grid.rows.len();
    let column_count = grid.locations.len();

    for row in 0..row_count {
        for column in 0..column_count {
            let cell = &grid.rows[row].cells[column];
            if cell.skip || !cell.is_titled() {
                continue;
            }

            for next in row + 1..row_count {
                let end = grid.rows[row].cells[column].end();
                if end <= grid.rows[next].time {
                    continue;
                }

                let covered = &mut grid.rows[next].cells[column];
                covered.skip = true;
                let absorbed = covered
                    .event
                    .as_mut()
                    .filter(|e| e.is_titled())
                    .map(|e| {
                        let moved = e.clone();
                        e.nested.clear();
                        moved
                    });

                let spanning = &mut grid.rows[row].cells[column];
                spanning.row_span += 1;
                if let (Some(other), Some(event)) = (absorbed, spanning.event.as_mut()) {
                    event.absorb(other, diagnostics);
                }
            }
        }
    }
}
