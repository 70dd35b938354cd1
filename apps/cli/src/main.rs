// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! floorgrid - floor plan grids, paths, visibility and solids from the command line.
//!
//! # Commands
//!
//! - `floorgrid grid <PLAN>` - build the occupancy grid, print a summary or an ASCII map
//! - `floorgrid path <PLAN> --from X,Y --to X,Y` - A* between two world points
//! - `floorgrid visibility <PLAN> --at X,Y` - visible polygon around an observer
//! - `floorgrid reconstruct <PLAN> --obj OUT` - extrude walls, doors and floors
//!
//! Logging goes to stderr and honours `RUST_LOG`; without it the floorgrid
//! crates log at `debug`.

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod obj;

use commands::parse_point;
use floorgrid_processing::Point2;

/// Floor plan grid, path, visibility and solid tools
#[derive(Parser, Debug)]
#[command(name = "floorgrid", author, version, about, long_about = None)]
struct Cli {
    /// Pipeline configuration JSON; missing keys keep their defaults
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Write output here instead of stdout
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

/// Grid resolution override
#[derive(Args, Debug, Clone, Copy)]
struct GridArgs {
    /// Fixed row count (requires --cols)
    #[arg(long, requires = "cols")]
    rows: Option<usize>,

    /// Fixed column count (requires --rows)
    #[arg(long, requires = "rows")]
    cols: Option<usize>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build the occupancy grid
    Grid {
        /// Floor plan JSON file
        plan: PathBuf,

        #[command(flatten)]
        grid: GridArgs,

        /// Print the grid as text ('#' wall, 'D' door, '.' open), top row first
        #[arg(long)]
        ascii: bool,
    },

    /// Find a path between two world points
    Path {
        plan: PathBuf,

        /// Start point as X,Y
        #[arg(long, value_parser = parse_point, allow_hyphen_values = true)]
        from: Point2,

        /// Goal point as X,Y
        #[arg(long, value_parser = parse_point, allow_hyphen_values = true)]
        to: Point2,

        #[command(flatten)]
        grid: GridArgs,

        /// Charge √2 for diagonal moves
        #[arg(long)]
        euclidean: bool,

        /// Also write the sandbox height map as JSON
        #[arg(long)]
        sandbox: Option<PathBuf>,
    },

    /// Compute the visible polygon around an observer
    Visibility {
        plan: PathBuf,

        /// Observer position as X,Y
        #[arg(long, value_parser = parse_point, allow_hyphen_values = true)]
        at: Point2,

        /// Sight radius in world units
        #[arg(long)]
        radius: Option<f64>,

        /// Number of rays
        #[arg(long)]
        rays: Option<u32>,
    },

    /// Extrude walls, doors and floors into solids
    Reconstruct {
        plan: PathBuf,

        #[command(flatten)]
        grid: GridArgs,

        /// Write the solids as Wavefront OBJ
        #[arg(long)]
        obj: Option<PathBuf>,
    },
}

/// Filter used when `RUST_LOG` is unset: per-stage diagnostics from the
/// floorgrid crates, `info` for everything else
const DEFAULT_LOG_FILTER: &str =
    "info,floorgrid=debug,floorgrid_core=debug,floorgrid_geometry=debug,floorgrid_processing=debug";

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = commands::load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Grid { plan, grid, ascii } => {
            grid.apply(&mut config);
            commands::grid(&plan, config, ascii, cli.output.as_deref())
        }
        Command::Path {
            plan,
            from,
            to,
            grid,
            euclidean,
            sandbox,
        } => {
            grid.apply(&mut config);
            if euclidean {
                config.search.diagonal_cost = floorgrid_processing::DiagonalCost::Euclidean;
            }
            commands::path(&plan, config, from, to, sandbox.as_deref(), cli.output.as_deref())
        }
        Command::Visibility {
            plan,
            at,
            radius,
            rays,
        } => {
            if let Some(radius) = radius {
                config.visibility.radius = radius;
            }
            if let Some(rays) = rays {
                config.visibility.ray_count = rays;
            }
            commands::visibility(&plan, config, at, cli.output.as_deref())
        }
        Command::Reconstruct { plan, grid, obj } => {
            grid.apply(&mut config);
            commands::reconstruct(&plan, config, obj.as_deref(), cli.output.as_deref())
        }
    }
}

impl GridArgs {
    fn apply(self, config: &mut floorgrid_processing::PipelineConfig) {
        if let (Some(rows), Some(cols)) = (self.rows, self.cols) {
            config.grid.resolution = floorgrid_processing::ResolutionPolicy::Fixed { rows, cols };
        }
    }
}
