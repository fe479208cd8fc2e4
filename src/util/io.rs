use crate::{PolygonCollection, PolygonId};
use anyhow::Context;
use geo::{LineString, Polygon};
use log::{debug, warn};
use regex::Regex;
use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::PathBuf,
};

/// Reads a polygon file with one `<id>  <x0> <y0> <x1> <y1> ...` record per line.
pub fn read_polygons(path: &PathBuf) -> anyhow::Result<PolygonCollection<f64>> {
    if !path.exists() {
        return Err(anyhow::anyhow!("The provided path {:?} does not exist", path));
    }
    let file = File::open(path).with_context(|| format!("Could not read file {path:?}."))?;
    let collection = parse_polygons(BufReader::new(file))
        .with_context(|| format!("Could not parse polygons from {path:?}."))?;
    debug!("Read {} polygons from {:?}.", collection.len(), path);
    Ok(collection)
}

/// Parses polygon records. Records with a malformed id or coordinate list are
/// skipped with a warning; rings are closed if the record leaves them open.
pub fn parse_polygons<R: BufRead>(reader: R) -> anyhow::Result<PolygonCollection<f64>> {
    let record = Regex::new(r"^(\d+) {2}(\S.*)$")?;
    let mut collection = PolygonCollection::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim_end();
        let number = index + 1;
        if line.trim().is_empty() {
            continue;
        }
        let Some(captures) = record.captures(line) else {
            warn!("Line {number}: expected `<id>  <x0> <y0> ...`, skipping.");
            continue;
        };
        let Ok(id) = captures[1].parse::<PolygonId>() else {
            warn!("Line {number}: id {} is out of range, skipping.", &captures[1]);
            continue;
        };
        let coordinates = match parse_coordinates(&captures[2]) {
            Ok(coordinates) => coordinates,
            Err(reason) => {
                warn!("Line {number}: polygon {id} {reason}, skipping.");
                continue;
            }
        };
        let ring: LineString<f64> = coordinates
            .chunks_exact(2)
            .map(|pair| (pair[0], pair[1]))
            .collect();
        if collection.insert(id, Polygon::new(ring, vec![])).is_some() {
            warn!("Line {number}: polygon {id} is defined more than once, keeping the last record.");
        }
    }
    Ok(collection)
}

fn parse_coordinates(stream: &str) -> Result<Vec<f64>, String> {
    let mut coordinates = Vec::new();
    for token in stream.split_whitespace() {
        match token.parse::<f64>() {
            Ok(value) if value.is_finite() => coordinates.push(value),
            _ => return Err(format!("has a non-numeric coordinate `{token}`")),
        }
    }
    if coordinates.len() % 2 != 0 {
        return Err(format!("has an odd number of coordinates ({})", coordinates.len()));
    }
    if coordinates.len() < 6 {
        return Err(format!("has {} points, at least 3 are required", coordinates.len() / 2));
    }
    Ok(coordinates)
}
