//! `GeoJSON` readers for road lines and flood polygons

use std::fs;
use std::path::Path;

use geo::Geometry;
use geojson::{Feature, GeoJson};
use log::{debug, info, trace, warn};

use crate::{Error, FloodPolygon, RepairOutcome, RoadLine};

/// Reads road lines from a `GeoJSON` file.
///
/// # Errors
///
/// Returns [`Error::DataUnavailable`] if the file is missing, unreadable
/// or not valid `GeoJSON`.
pub fn read_road_lines(path: &Path) -> Result<Vec<RoadLine>, Error> {
    let geojson = read_geojson(path)?;
    Ok(road_lines_from_geojson(geojson))
}

/// Reads flood polygons from a `GeoJSON` file and repairs them.
///
/// # Errors
///
/// Returns [`Error::DataUnavailable`] if the file is missing, unreadable
/// or not valid `GeoJSON`.
pub fn read_flood_polygons(path: &Path) -> Result<Vec<FloodPolygon>, Error> {
    let geojson = read_geojson(path)?;
    Ok(flood_polygons_from_geojson(geojson))
}

fn read_geojson(path: &Path) -> Result<GeoJson, Error> {
    if !path.exists() {
        return Err(Error::DataUnavailable(format!(
            "{} does not exist",
            path.display()
        )));
    }

    let text = fs::read_to_string(path)
        .map_err(|e| Error::DataUnavailable(format!("cannot read {}: {e}", path.display())))?;

    text.parse::<GeoJson>()
        .map_err(|e| Error::DataUnavailable(format!("cannot parse {}: {e}", path.display())))
}

fn into_features(geojson: GeoJson) -> Vec<Feature> {
    match geojson {
        GeoJson::FeatureCollection(collection) => collection.features,
        GeoJson::Feature(feature) => vec![feature],
        GeoJson::Geometry(geometry) => vec![Feature {
            bbox: None,
            geometry: Some(geometry),
            id: None,
            properties: None,
            foreign_members: None,
        }],
    }
}

/// Extracts road lines from parsed `GeoJSON`.
///
/// `LineString` features become one line each, `MultiLineString` features
/// one line per part. The `highway` property, when it is a string, is kept
/// on every produced line. Other geometry types are ignored.
pub fn road_lines_from_geojson(geojson: GeoJson) -> Vec<RoadLine> {
    let mut lines = Vec::new();

    for (idx, feature) in into_features(geojson).into_iter().enumerate() {
        let highway = feature
            .property("highway")
            .and_then(|value| value.as_str())
            .map(str::to_owned);
        let Some(geometry) = feature.geometry else {
            trace!("Road feature {idx} has no geometry");
            continue;
        };

        match Geometry::<f64>::try_from(geometry) {
            Ok(Geometry::LineString(line)) => lines.push(RoadLine {
                coordinates: line.0,
                highway,
            }),
            Ok(Geometry::MultiLineString(multi)) => {
                lines.extend(multi.0.into_iter().map(|line| RoadLine {
                    coordinates: line.0,
                    highway: highway.clone(),
                }));
            }
            Ok(_) => trace!("Road feature {idx} is not a line, ignored"),
            Err(e) => debug!(
                "Skipping road feature {idx}: {}",
                Error::GeoJsonError(e.to_string())
            ),
        }
    }

    info!("Read {} road lines", lines.len());
    lines
}

/// Runs [`FloodPolygon::repair`] on every polygon in parsed `GeoJSON`
/// and returns the individual outcomes, one per polygon part.
pub fn repair_flood_features(geojson: GeoJson) -> Vec<RepairOutcome> {
    let mut raw = Vec::new();

    for (idx, feature) in into_features(geojson).into_iter().enumerate() {
        let Some(geometry) = feature.geometry else {
            trace!("Flood feature {idx} has no geometry");
            continue;
        };

        match Geometry::<f64>::try_from(geometry) {
            Ok(Geometry::Polygon(polygon)) => raw.push(polygon),
            Ok(Geometry::MultiPolygon(multi)) => raw.extend(multi.0),
            Ok(Geometry::Rect(rect)) => raw.push(rect.to_polygon()),
            Ok(_) => trace!("Flood feature {idx} is not a polygon, ignored"),
            Err(e) => debug!(
                "Skipping flood feature {idx}: {}",
                Error::GeoJsonError(e.to_string())
            ),
        }
    }

    raw.into_iter().map(FloodPolygon::repair).collect()
}

/// Extracts usable flood polygons from parsed `GeoJSON`.
///
/// Polygons are repaired first; rejected ones are logged and dropped.
pub fn flood_polygons_from_geojson(geojson: GeoJson) -> Vec<FloodPolygon> {
    let outcomes = repair_flood_features(geojson);
    let mut repaired = 0usize;
    let mut rejected = 0usize;
    let mut polygons = Vec::with_capacity(outcomes.len());

    for outcome in outcomes {
        match outcome {
            RepairOutcome::Repaired(polygon) => {
                repaired += 1;
                polygons.push(polygon);
            }
            RepairOutcome::AsIs(polygon) => polygons.push(polygon),
            RepairOutcome::Rejected(reason) => {
                rejected += 1;
                debug!("Dropping flood polygon: {reason}");
            }
        }
    }

    if rejected > 0 {
        warn!("{rejected} flood polygon(s) had no usable area and were dropped");
    }
    info!(
        "Read {} flood polygons ({repaired} repaired)",
        polygons.len()
    );

    polygons
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> GeoJson {
        text.parse().unwrap()
    }

    #[test]
    fn reads_lines_and_multilines_with_tags() {
        let geojson = parse(
            r#"{
                "type": "FeatureCollection",
                "features": [
                    {"type": "Feature", "properties": {"highway": "primary"},
                     "geometry": {"type": "LineString", "coordinates": [[0, 0], [1, 0]]}},
                    {"type": "Feature", "properties": {"highway": "footway"},
                     "geometry": {"type": "MultiLineString",
                                  "coordinates": [[[1, 0], [1, 1]], [[1, 1], [2, 1]]]}},
                    {"type": "Feature", "properties": null,
                     "geometry": {"type": "Point", "coordinates": [5, 5]}},
                    {"type": "Feature", "properties": null, "geometry": null}
                ]
            }"#,
        );

        let lines = road_lines_from_geojson(geojson);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].highway.as_deref(), Some("primary"));
        assert_eq!(lines[1].highway.as_deref(), Some("footway"));
        assert_eq!(lines[2].highway.as_deref(), Some("footway"));
        assert_eq!(lines[2].coordinates.len(), 2);
    }

    #[test]
    fn flood_parts_are_repaired_individually() {
        let geojson = parse(
            r#"{
                "type": "Feature",
                "properties": {},
                "geometry": {"type": "MultiPolygon", "coordinates": [
                    [[[0, 0], [2, 0], [2, 2], [0, 2], [0, 0]]],
                    [[[5, 5], [6, 5], [7, 5], [5, 5]]]
                ]}
            }"#,
        );

        let outcomes = repair_flood_features(geojson.clone());
        assert_eq!(outcomes.len(), 2);
        assert!(outcomes[1].is_rejected());

        let polygons = flood_polygons_from_geojson(geojson);
        assert_eq!(polygons.len(), 1);
    }

    #[test]
    fn missing_file_is_unavailable() {
        let err = read_road_lines(Path::new("/definitely/not/here.geojson")).unwrap_err();
        assert!(err.is_data_unavailable());
    }
}
