// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Lenient floor plan JSON input
//!
//! Accepts documents of the form
//!
//! ```json
//! {
//!   "walls": [{ "position": [[0, 0], [10, 0], [10, 8]] }],
//!   "doors": [{ "bbox": [[4, -1], [6, -1], [6, 1], [4, 1]] }],
//!   "rooms": [[{ "x": 0, "y": 0 }, { "x": 10, "y": 0 }, { "x": 10, "y": 8 }]]
//! }
//! ```
//!
//! A wall `position` with more than two points is read as a polyline. Doors
//! may use the legacy `position: [[x, y], [x, y]]` form. Points are accepted
//! either as `[x, y]` arrays or `{x, y}` objects everywhere.
//!
//! Entries that fail validation are skipped and reported as [`InputIssue`]s;
//! only unparseable JSON or a non-object document is an [`Error`].

use crate::error::{Error, Result};
use crate::types::{DoorOpening, FloorPlan, RoomPolygon, WallSegment};
use floorgrid_geometry::Point2;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

/// Input reader configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Thickness given to legacy two-point doors, in world units
    pub legacy_door_depth: f64,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            legacy_door_depth: 2.0,
        }
    }
}

/// Which collection an issue came from
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Wall,
    Door,
    Room,
}

/// Why an entry was skipped
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    /// Wrong shape: missing key, wrong arity, non-numeric coordinate
    Malformed,
    /// Well-formed but geometrically empty: zero-length wall, zero-area door
    Degenerate,
}

/// A skipped input entry
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct InputIssue {
    pub entity: EntityKind,
    /// Index in the source array, `None` when the whole array was unusable
    pub index: Option<usize>,
    pub kind: IssueKind,
    pub message: String,
}

/// A floor plan together with everything that was skipped while reading it
#[derive(Debug, Clone, Default)]
pub struct ParsedPlan {
    pub plan: FloorPlan,
    pub issues: Vec<InputIssue>,
}

/// Parse a floor plan from JSON text
pub fn parse_floor_plan(json: &str, config: &InputConfig) -> Result<ParsedPlan> {
    let value: Value = serde_json::from_str(json)?;
    floor_plan_from_value(&value, config)
}

/// Read a floor plan from an already-parsed JSON document
pub fn floor_plan_from_value(value: &Value, config: &InputConfig) -> Result<ParsedPlan> {
    let root = value
        .as_object()
        .ok_or_else(|| Error::NotAnObject(json_kind(value)))?;

    let mut reader = Reader {
        config,
        issues: Vec::new(),
    };

    let walls = reader.walls(root.get("walls"));
    let doors = reader.doors(root.get("doors"));
    let rooms = reader.rooms(root.get("rooms"));

    debug!(
        walls = walls.len(),
        doors = doors.len(),
        rooms = rooms.len(),
        skipped = reader.issues.len(),
        "read floor plan"
    );

    Ok(ParsedPlan {
        plan: FloorPlan::new(walls, doors, rooms),
        issues: reader.issues,
    })
}

struct Reader<'a> {
    config: &'a InputConfig,
    issues: Vec<InputIssue>,
}

impl Reader<'_> {
    fn report(&mut self, entity: EntityKind, index: Option<usize>, kind: IssueKind, message: String) {
        warn!(?entity, ?index, ?kind, "skipping entry: {}", message);
        self.issues.push(InputIssue {
            entity,
            index,
            kind,
            message,
        });
    }

    /// Entries of an optional top-level array; a missing key reads as empty
    fn entries<'v>(&mut self, entity: EntityKind, value: Option<&'v Value>) -> &'v [Value] {
        match value {
            None | Some(Value::Null) => &[],
            Some(Value::Array(items)) => items,
            Some(other) => {
                self.report(
                    entity,
                    None,
                    IssueKind::Malformed,
                    format!("expected an array, found {}", json_kind(other)),
                );
                &[]
            }
        }
    }

    fn walls(&mut self, value: Option<&Value>) -> Vec<WallSegment> {
        let mut walls = Vec::new();

        for (i, entry) in self.entries(EntityKind::Wall, value).iter().enumerate() {
            let points = match entry.get("position").and_then(parse_points) {
                Some(points) if points.len() >= 2 => points,
                Some(points) => {
                    self.report(
                        EntityKind::Wall,
                        Some(i),
                        IssueKind::Malformed,
                        format!("wall needs at least 2 points, got {}", points.len()),
                    );
                    continue;
                }
                None => {
                    self.report(
                        EntityKind::Wall,
                        Some(i),
                        IssueKind::Malformed,
                        "wall has no valid `position` point list".to_string(),
                    );
                    continue;
                }
            };

            for pair in points.windows(2) {
                match WallSegment::new(pair[0], pair[1]) {
                    Some(segment) => walls.push(segment),
                    None => self.report(
                        EntityKind::Wall,
                        Some(i),
                        IssueKind::Degenerate,
                        format!("zero-length wall segment at ({}, {})", pair[0].x, pair[0].y),
                    ),
                }
            }
        }

        walls
    }

    fn doors(&mut self, value: Option<&Value>) -> Vec<DoorOpening> {
        let mut doors = Vec::new();
        let depth = self.config.legacy_door_depth;

        for (i, entry) in self.entries(EntityKind::Door, value).iter().enumerate() {
            let points = entry
                .get("bbox")
                .or_else(|| entry.get("position"))
                .and_then(parse_points);

            let door = match points.as_deref() {
                Some(&[a, b, c, d]) => DoorOpening::from_corners([a, b, c, d]),
                Some(&[a, b]) => DoorOpening::from_segment(a, b, depth),
                Some(other) => {
                    self.report(
                        EntityKind::Door,
                        Some(i),
                        IssueKind::Malformed,
                        format!("door needs 4 corners or 2 points, got {}", other.len()),
                    );
                    continue;
                }
                None => {
                    self.report(
                        EntityKind::Door,
                        Some(i),
                        IssueKind::Malformed,
                        "door has no valid `bbox` or `position`".to_string(),
                    );
                    continue;
                }
            };

            match door {
                Some(door) => doors.push(door),
                None => self.report(
                    EntityKind::Door,
                    Some(i),
                    IssueKind::Degenerate,
                    "door has zero area".to_string(),
                ),
            }
        }

        doors
    }

    fn rooms(&mut self, value: Option<&Value>) -> Vec<RoomPolygon> {
        let mut rooms = Vec::new();

        for (i, entry) in self.entries(EntityKind::Room, value).iter().enumerate() {
            let outline = entry.get("points").unwrap_or(entry);
            match parse_points(outline) {
                Some(points) => match RoomPolygon::new(points) {
                    Some(room) => rooms.push(room),
                    None => self.report(
                        EntityKind::Room,
                        Some(i),
                        IssueKind::Degenerate,
                        "room needs at least 3 points".to_string(),
                    ),
                },
                None => self.report(
                    EntityKind::Room,
                    Some(i),
                    IssueKind::Malformed,
                    "room is not a point list".to_string(),
                ),
            }
        }

        rooms
    }
}

/// Array of points; `None` if it is not an array or any element is not a point
fn parse_points(value: &Value) -> Option<Vec<Point2>> {
    value.as_array()?.iter().map(parse_point).collect()
}

/// `[x, y]` or `{"x": .., "y": ..}` with finite numeric coordinates
fn parse_point(value: &Value) -> Option<Point2> {
    let (x, y) = match value {
        Value::Array(xy) if xy.len() == 2 => (xy[0].as_f64()?, xy[1].as_f64()?),
        Value::Object(obj) => (obj.get("x")?.as_f64()?, obj.get("y")?.as_f64()?),
        _ => return None,
    };

    let point = Point2::new(x, y);
    point.is_finite().then_some(point)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
