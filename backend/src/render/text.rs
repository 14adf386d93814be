//! Plain-text line maps.
//!
//! Three layouts:
//!
//! ```text
//! vertical              horizontal                    combined
//! Target Field    ║     ⊖────●────◄                   Target Field ║   ║ Target Field
//! Warehouse       ▲     1    2    3                   Warehouse    ▲   ▶ Warehouse
//! Nicollet Mall   ║                                   ...
//!                       Stations:                                      ║ Union Depot
//!                       1. A       3. C
//!                       2. B
//! ```

use serde::{Deserialize, Serialize};

use crate::models::{Axis, CombinedMap, Direction, Frame, LineMap, LineMapEntry};

/// Spacing, in track characters, between two stations on a horizontal map.
const TRACK_SEGMENT_LENGTH: usize = 4;

/// Extra space between the two station-list columns of a horizontal map.
const COLUMN_GAP: usize = 5;

/// How a single-line frame is laid out. Combined frames always use the
/// dual-column layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    #[default]
    Vertical,
    Horizontal,
}

/// Render a frame followed by its legend.
pub fn render_frame(frame: &Frame, layout: Layout) -> String {
    match (frame, layout) {
        (Frame::Line(map), Layout::Vertical) => {
            format!("{}\n\n{}", vertical(map), vertical_legend(map.line.axis))
        }
        (Frame::Line(map), Layout::Horizontal) => {
            format!("{}\n\n{}", horizontal(map), horizontal_legend(map.line.axis))
        }
        (Frame::Combined(map), _) => format!("{}\n\n{}", combined(map), combined_legend()),
    }
}

fn label_width<'a>(entries: impl Iterator<Item = &'a LineMapEntry>) -> usize {
    entries
        .map(|e| e.station.name.chars().count())
        .max()
        .unwrap_or(0)
}

fn vertical_marker(entry: &LineMapEntry, axis: Axis) -> char {
    let (track, stationary) = match axis {
        Axis::Latitude => ('║', '●'),
        Axis::Longitude => ('│', '■'),
    };
    if !entry.occupied {
        return track;
    }
    match entry.direction {
        Direction::Stationary => stationary,
        Direction::North | Direction::East => '▲',
        Direction::South | Direction::West => '▼',
    }
}

/// One row per station: name padded to the longest name, then the marker.
pub fn vertical(map: &LineMap) -> String {
    let width = label_width(map.entries.iter());
    map.entries
        .iter()
        .map(|entry| {
            format!(
                "{:<width$} {}",
                entry.station.name,
                vertical_marker(entry, map.line.axis),
                width = width
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn vertical_legend(axis: Axis) -> String {
    match axis {
        Axis::Latitude => "●: Stationary  ▲: Northbound  ▼: Southbound  ║: Track".to_string(),
        Axis::Longitude => "■: Stationary  ▲: Eastbound  ▼: Westbound  │: Track".to_string(),
    }
}

fn horizontal_marker(entry: &LineMapEntry) -> char {
    if !entry.occupied {
        return '⊖';
    }
    match entry.direction {
        Direction::Stationary => '●',
        Direction::North => '▲',
        Direction::South => '▼',
        Direction::East => '►',
        Direction::West => '◄',
    }
}

/// Track with station markers, station numbers aligned under the markers,
/// then a two-column numbered station list.
pub fn horizontal(map: &LineMap) -> String {
    let segment = "─".repeat(TRACK_SEGMENT_LENGTH);
    let track = map
        .entries
        .iter()
        .map(|e| horizontal_marker(e).to_string())
        .collect::<Vec<_>>()
        .join(&segment);

    let mut numbers = String::new();
    for i in 0..map.entries.len() {
        let column = i * (TRACK_SEGMENT_LENGTH + 1);
        let used = numbers.chars().count();
        if used < column {
            numbers.push_str(&" ".repeat(column - used));
        } else if i > 0 {
            numbers.push(' ');
        }
        numbers.push_str(&(i + 1).to_string());
    }

    let labels: Vec<String> = map
        .entries
        .iter()
        .enumerate()
        .map(|(i, e)| format!("{}. {}", i + 1, e.station.name))
        .collect();
    let mid = labels.len().div_ceil(2);
    let (left, right) = labels.split_at(mid);
    let left_width = left.iter().map(|l| l.chars().count()).max().unwrap_or(0) + COLUMN_GAP;

    let list = left
        .iter()
        .enumerate()
        .map(|(row, l)| match right.get(row) {
            Some(r) => format!("{:<width$}{}", l, r, width = left_width),
            None => l.clone(),
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!("{}\n{}\n\nStations:\n{}", track, numbers, list)
}

pub fn horizontal_legend(axis: Axis) -> String {
    match axis {
        Axis::Latitude => "●: Train at station  ▲: Northbound  ▼: Southbound  ⊖: Empty station",
        Axis::Longitude => "●: Train at station  ►: Eastbound  ◄: Westbound  ⊖: Empty station",
    }
    .to_string()
}

fn combined_marker(entry: Option<&LineMapEntry>) -> char {
    match entry {
        None => ' ',
        Some(e) if !e.occupied => '║',
        Some(e) => match e.direction {
            Direction::Stationary => '⬤',
            Direction::North => '▲',
            Direction::South => '▼',
            Direction::East => '▶',
            Direction::West => '◀',
        },
    }
}

/// Two lines side by side, left names right-aligned against their track and
/// right names after theirs. Rows past the end of the shorter line are blank
/// on that side.
pub fn combined(map: &CombinedMap) -> String {
    let rows = &map.frame.rows;
    let width = label_width(
        rows.iter()
            .flat_map(|row| row.left.iter().chain(row.right.iter())),
    );

    rows.iter()
        .map(|row| {
            let left_name = row.left.as_ref().map_or("", |e| e.station.name.as_str());
            let right_name = row.right.as_ref().map_or("", |e| e.station.name.as_str());
            let line = format!(
                "{:<width$} {}   {} {}",
                left_name,
                combined_marker(row.left.as_ref()),
                combined_marker(row.right.as_ref()),
                right_name,
                width = width
            );
            line.trim_end().to_string()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn combined_legend() -> String {
    "║: Station  ⬤: Train  ▲: Northbound  ▼: Southbound\n\
     ║: Station  ⬤: Train  ▶: Eastbound  ◀: Westbound"
        .to_string()
}
