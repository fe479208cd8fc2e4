use anyhow::bail;
use clap::{Args, Parser, Subcommand};
use geo::Rect;
use log::info;
use polygon_quadtree::{
    brute_force,
    report::{OverlapReport, QueryReport},
    util::{power_of_two_bounds, read_polygons},
    Execution, PairwiseOverlap, QuadTree, QuadTreeOptions, DEFAULT_MAX_DEPTH,
};
use std::{path::PathBuf, time::Instant};

#[derive(Parser)]
#[command(version, about = "Polygon contact detection and quadtree region queries.")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Classify every pair of polygons as disjoint, touching or overlapping.
    Overlaps {
        #[command(flatten)]
        input: InputArgs,
        /// Compare pairs on a single thread.
        #[arg(long)]
        serial: bool,
        /// Worker threads for the parallel comparison.
        #[arg(long, env = "POLYQT_WORKERS")]
        workers: Option<usize>,
        /// Also list disjoint pairs.
        #[arg(long)]
        all: bool,
        #[arg(long)]
        json: bool,
    },
    /// Find the polygons touching or overlapping a rectangular region.
    Query {
        #[command(flatten)]
        input: InputArgs,
        #[command(flatten)]
        index: IndexArgs,
        /// Region as MIN_X,MIN_Y,MAX_X,MAX_Y.
        #[arg(short, long, value_parser = parse_region, allow_hyphen_values = true)]
        region: Rect<f64>,
        /// Cross-check the result with a linear scan.
        #[arg(long)]
        verify: bool,
        #[arg(long)]
        json: bool,
    },
    /// Print the quadtree nodes as JSON.
    Tree {
        #[command(flatten)]
        input: InputArgs,
        #[command(flatten)]
        index: IndexArgs,
    },
}

#[derive(Args)]
struct InputArgs {
    /// Polygon file, one `<id>  <x0> <y0> ...` record per line.
    #[arg(short, long)]
    input: PathBuf,
    /// Decimal digits kept when testing for contact.
    #[arg(long, env = "POLYQT_PRECISION", allow_hyphen_values = true)]
    precision: Option<i32>,
}

#[derive(Args)]
struct IndexArgs {
    /// Depth at which nodes stop being split.
    #[arg(long, env = "POLYQT_MAX_DEPTH", default_value_t = DEFAULT_MAX_DEPTH)]
    max_depth: usize,
}

fn parse_region(value: &str) -> Result<Rect<f64>, String> {
    let values = value
        .split(',')
        .map(|part| part.trim().parse::<f64>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|err| format!("invalid coordinate: {err}"))?;
    match values.as_slice() {
        [min_x, min_y, max_x, max_y] if min_x <= max_x && min_y <= max_y => {
            Ok(Rect::new((*min_x, *min_y), (*max_x, *max_y)))
        }
        [_, _, _, _] => Err("minimum must not exceed maximum".to_string()),
        _ => Err(format!("expected 4 coordinates, got {}", values.len())),
    }
}

fn build_tree(
    input: &InputArgs,
    index: &IndexArgs,
) -> anyhow::Result<(polygon_quadtree::PolygonCollection, QuadTree<f64>)> {
    let collection = read_polygons(&input.input)?;
    let bounds = power_of_two_bounds(&collection)?;
    let options = QuadTreeOptions {
        precision: input.precision,
        max_depth: index.max_depth,
    };
    let start = Instant::now();
    let tree = QuadTree::build(&collection, bounds, options)?;
    info!(
        "Indexed {} polygons over {:?} in {:?}.",
        collection.len(),
        bounds,
        start.elapsed()
    );
    Ok((collection, tree))
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    match cli.command {
        Command::Overlaps {
            input,
            serial,
            workers,
            all,
            json,
        } => {
            let collection = read_polygons(&input.input)?;
            let execution = if serial {
                Execution::Serial
            } else {
                Execution::Parallel { workers }
            };
            let start = Instant::now();
            let report: OverlapReport = collection
                .pairwise_overlaps(input.precision, execution)?
                .into_iter()
                .collect();
            info!("Pairwise comparison took {:?}.", start.elapsed());
            if json {
                let pairs = report.0.iter().filter(|pair| all || pair.class.is_contact());
                println!("{}", serde_json::to_string_pretty(&pairs.collect::<Vec<_>>())?);
            } else {
                print!("{}", report.summary(all));
            }
        }
        Command::Query {
            input,
            index,
            region,
            verify,
            json,
        } => {
            let (collection, tree) = build_tree(&input, &index)?;
            let start = Instant::now();
            let ids = tree.query(&collection, &region);
            let elapsed = start.elapsed();
            let verified = verify.then(|| brute_force(&collection, &region, input.precision) == ids);
            let report = QueryReport {
                candidates: tree.sample(&region).len(),
                ids,
                elapsed_micros: elapsed.as_micros(),
                verified,
            };
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{}", report.summary());
            }
            if verified == Some(false) {
                bail!("Quadtree query and brute force disagree for region {:?}.", region);
            }
        }
        Command::Tree { input, index } => {
            let (_, tree) = build_tree(&input, &index)?;
            info!("{:?}", tree.stats());
            println!("{}", serde_json::to_string_pretty(&tree.summaries())?);
        }
    }
    Ok(())
}
