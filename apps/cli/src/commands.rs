// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Subcommand implementations

use crate::obj::write_obj;
use anyhow::{Context, Result};
use floorgrid_processing::{
    DoorMatch, DoorPlacement, FloorPlan, FloorPlanPipeline, Grid, PathFailure, PipelineConfig,
    PipelineWarning, Point2, ResolutionSource,
};
use serde::Serialize;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;
use tracing::{info, warn};

/// Parse `X,Y` into a point
pub fn parse_point(s: &str) -> std::result::Result<Point2, String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y, got '{s}'"))?;
    let x: f64 = x.trim().parse().map_err(|e| format!("bad X in '{s}': {e}"))?;
    let y: f64 = y.trim().parse().map_err(|e| format!("bad Y in '{s}': {e}"))?;
    if !(x.is_finite() && y.is_finite()) {
        return Err(format!("non-finite point '{s}'"));
    }
    Ok(Point2::new(x, y))
}

/// Read the pipeline configuration, or the defaults when no file is given
pub fn load_config(path: Option<&Path>) -> Result<PipelineConfig> {
    let Some(path) = path else {
        return Ok(PipelineConfig::default());
    };
    let json = fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    PipelineConfig::from_json(&json).with_context(|| format!("loading config {}", path.display()))
}

fn load_plan(pipeline: &FloorPlanPipeline, path: &Path) -> Result<FloorPlan> {
    let json =
        fs::read_to_string(path).with_context(|| format!("reading plan {}", path.display()))?;
    let parsed = pipeline
        .parse(&json)
        .with_context(|| format!("parsing plan {}", path.display()))?;

    if !parsed.issues.is_empty() {
        warn!(skipped = parsed.issues.len(), "some plan entries were skipped");
    }
    info!(
        walls = parsed.plan.walls.len(),
        doors = parsed.plan.doors.len(),
        rooms = parsed.plan.rooms.len(),
        "loaded plan"
    );
    Ok(parsed.plan)
}

fn open_output(output: Option<&Path>) -> Result<Box<dyn Write>> {
    Ok(match output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("creating {}", path.display()))?,
        )),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    })
}

fn emit_json<T: Serialize>(value: &T, output: Option<&Path>) -> Result<()> {
    let mut out = open_output(output)?;
    serde_json::to_writer_pretty(&mut out, value)?;
    writeln!(out)?;
    out.flush()?;
    Ok(())
}

#[derive(Serialize)]
struct GridSummary<'a> {
    rows: usize,
    cols: usize,
    origin: Point2,
    cell_w: f64,
    cell_h: f64,
    source: ResolutionSource,
    wall_cells: usize,
    door_cells: usize,
    door_matches: &'a [DoorMatch],
}

/// `floorgrid grid`
pub fn grid(plan_path: &Path, config: PipelineConfig, ascii: bool, output: Option<&Path>) -> Result<()> {
    let pipeline = FloorPlanPipeline::new(config)?;
    let plan = load_plan(&pipeline, plan_path)?;
    let build = pipeline.build_grid(&plan);

    for m in build.unmatched_doors() {
        warn!(door = m.door_index, "door has no wall overlap");
    }

    if ascii {
        let mut out = open_output(output)?;
        out.write_all(render_ascii(&build.grid).as_bytes())?;
        out.flush()?;
        return Ok(());
    }

    let grid = &build.grid;
    emit_json(
        &GridSummary {
            rows: grid.rows(),
            cols: grid.cols(),
            origin: grid.origin(),
            cell_w: grid.cell_w(),
            cell_h: grid.cell_h(),
            source: build.resolution.source,
            wall_cells: grid.wall_cell_count(),
            door_cells: grid.door_cell_count(),
            door_matches: &build.door_matches,
        },
        output,
    )
}

/// One line per row, highest row first so +Y points up
pub fn render_ascii(grid: &Grid) -> String {
    let mut text = String::with_capacity((grid.cols() + 1) * grid.rows());
    for row in (0..grid.rows()).rev() {
        for col in 0..grid.cols() {
            let ch = match grid.cell(row, col) {
                Some(cell) if cell.is_door => 'D',
                Some(cell) if cell.is_wall => '#',
                _ => '.',
            };
            text.push(ch);
        }
        text.push('\n');
    }
    text
}

#[derive(Serialize)]
struct PathReport {
    found: bool,
    failure: Option<PathFailure>,
    nodes_explored: usize,
    cost: Option<f64>,
    cells: Vec<(usize, usize)>,
    points: Vec<Point2>,
}

/// `floorgrid path`
pub fn path(
    plan_path: &Path,
    config: PipelineConfig,
    from: Point2,
    to: Point2,
    sandbox: Option<&Path>,
    output: Option<&Path>,
) -> Result<()> {
    let pipeline = FloorPlanPipeline::new(config)?;
    let plan = load_plan(&pipeline, plan_path)?;
    let grid = pipeline.build_grid(&plan).grid;

    let outcome = pipeline.find_path_world(&grid, from, to);
    match (&outcome.path, outcome.failure) {
        (Some(p), _) => info!(cells = p.len(), cost = p.cost, "path found"),
        (None, reason) => warn!(?reason, nodes = outcome.nodes_explored, "no path"),
    }

    if let Some(sandbox_path) = sandbox {
        let map = pipeline.sandbox(&grid, outcome.path.as_ref());
        emit_json(&map, Some(sandbox_path))?;
        info!(path = %sandbox_path.display(), "wrote sandbox height map");
    }

    let report = match &outcome.path {
        Some(p) => PathReport {
            found: true,
            failure: None,
            nodes_explored: outcome.nodes_explored,
            cost: Some(p.cost),
            cells: p.cells.clone(),
            points: p.world_points(&grid),
        },
        None => PathReport {
            found: false,
            failure: outcome.failure,
            nodes_explored: outcome.nodes_explored,
            cost: None,
            cells: Vec::new(),
            points: Vec::new(),
        },
    };
    emit_json(&report, output)
}

#[derive(Serialize)]
struct VisibilityReport {
    observer: Point2,
    radius: f64,
    ray_count: u32,
    area: f64,
    points: Vec<Point2>,
}

/// `floorgrid visibility`
pub fn visibility(plan_path: &Path, config: PipelineConfig, at: Point2, output: Option<&Path>) -> Result<()> {
    let pipeline = FloorPlanPipeline::new(config)?;
    let plan = load_plan(&pipeline, plan_path)?;

    let polygon = pipeline.visibility(&plan, at);
    let settings = &pipeline.config().visibility;
    emit_json(
        &VisibilityReport {
            observer: at,
            radius: settings.radius,
            ray_count: settings.ray_count,
            area: polygon.area(),
            points: polygon.points,
        },
        output,
    )
}

#[derive(Serialize)]
struct ReconstructReport<'a> {
    rows: usize,
    cols: usize,
    wall_blocks: usize,
    doors: &'a [DoorPlacement],
    floors: usize,
    triangles: usize,
    warnings: &'a [PipelineWarning],
}

/// `floorgrid reconstruct`
pub fn reconstruct(
    plan_path: &Path,
    config: PipelineConfig,
    obj: Option<&Path>,
    output: Option<&Path>,
) -> Result<()> {
    let pipeline = FloorPlanPipeline::new(config)?;
    let plan = load_plan(&pipeline, plan_path)?;
    let result = pipeline.run(&plan);

    let meshes = result
        .solids
        .to_meshes(&pipeline.config().reconstruction)
        .context("extruding solids")?;
    let triangles =
        meshes.walls.triangle_count() + meshes.doors.triangle_count() + meshes.floors.triangle_count();

    if let Some(obj_path) = obj {
        let file = File::create(obj_path).with_context(|| format!("creating {}", obj_path.display()))?;
        let mut writer = BufWriter::new(file);
        write_obj(&mut writer, &meshes)?;
        writer.flush()?;
        info!(path = %obj_path.display(), triangles, "wrote OBJ");
    }

    emit_json(
        &ReconstructReport {
            rows: result.grid.rows(),
            cols: result.grid.cols(),
            wall_blocks: result.solids.wall_blocks.len(),
            doors: &result.solids.doors,
            floors: result.solids.floors.len(),
            triangles,
            warnings: &result.warnings,
        },
        output,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use floorgrid_processing::DoorOrientation;

    #[test]
    fn test_parse_point() {
        let p = parse_point(" 1.5, -2 ").unwrap();
        assert_relative_eq!(p.x, 1.5);
        assert_relative_eq!(p.y, -2.0);

        assert!(parse_point("1.5").is_err());
        assert!(parse_point("a,2").is_err());
        assert!(parse_point("inf,2").is_err());
    }

    #[test]
    fn test_render_ascii_puts_first_row_last() {
        let mut grid = Grid::empty(Point2::new(0.0, 0.0), 2, 3, 1.0, 1.0);
        grid.set_wall(0, 0);
        grid.set_wall(0, 1);
        grid.set_door(0, 1, DoorOrientation::Horizontal);

        assert_eq!(render_ascii(&grid), "...\n#D.\n");
    }

    #[test]
    fn test_missing_config_uses_defaults() {
        let config = load_config(None).unwrap();
        assert_eq!(config.grid.max_cells, 200);
    }
}
