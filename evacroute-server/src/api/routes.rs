//! Request handlers

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use axum::Json;
use axum::extract::{Query, State};
use evacroute_core::loading::road_lines_from_geojson;
use evacroute_core::{FloodPolygon, RouteOutcome};
use geo::{Coord, coord};
use geojson::{Feature, FeatureCollection, GeoJson, Geometry, JsonObject, Value as GeoJsonValue};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tokio::task;

use super::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RouteQuery {
    /// `lat,lon`
    pub start: String,
    /// `lat,lon`
    pub end: String,
}

/// Parses `lat,lon` into a `(lon, lat)` coordinate
pub fn parse_lat_lon(text: &str) -> Result<Coord<f64>, ApiError> {
    let invalid = || ApiError::BadRequest(format!("expected 'lat,lon', got '{text}'"));

    let (lat, lon) = text.split_once(',').ok_or_else(invalid)?;
    let lat: f64 = lat.trim().parse().map_err(|_| invalid())?;
    let lon: f64 = lon.trim().parse().map_err(|_| invalid())?;
    if !lat.is_finite() || !lon.is_finite() {
        return Err(invalid());
    }

    Ok(coord! { x: lon, y: lat })
}

pub async fn evac_route(
    State(state): State<AppState>,
    Query(query): Query<RouteQuery>,
) -> Result<Json<Value>, ApiError> {
    let start = parse_lat_lon(&query.start)?;
    let end = parse_lat_lon(&query.end)?;

    let service = Arc::clone(&state.service);
    let computation = task::spawn_blocking(move || service.compute_route(start, end));
    let outcome = tokio::time::timeout(state.route_timeout, computation)
        .await
        .map_err(|_| ApiError::Timeout)?
        .map_err(|e| ApiError::Internal(format!("route task failed: {e}")))??;

    match outcome {
        RouteOutcome::Found(route) => {
            tracing::info!(
                length_m = route.length_m,
                segments = route.segments,
                blocked = route.blocked_edges_count,
                "Route computed in {:.2} ms",
                route.calc_time_ms
            );
            let feature = route.to_geojson_feature()?;
            Ok(Json(json!({
                "route": feature,
                "meta": {
                    "calc_time_ms": route.calc_time_ms,
                    "blocked_edges_count": route.blocked_edges_count,
                }
            })))
        }
        RouteOutcome::NoRoute => Err(ApiError::NoRoute),
        RouteOutcome::EmptyNetwork => Err(ApiError::EmptyNetwork),
    }
}

/// Persists the posted `GeoJSON` lines and replaces the road network with them.
/// The graph is only swapped once the dataset is safely on disk.
pub async fn reload_roads(
    State(state): State<AppState>,
    body: String,
) -> Result<Json<Value>, ApiError> {
    let geojson: GeoJson = body
        .parse()
        .map_err(|e| ApiError::BadRequest(format!("invalid GeoJSON: {e}")))?;

    let lines = road_lines_from_geojson(geojson);
    if lines.is_empty() {
        return Err(ApiError::BadRequest(
            "payload contains no road lines".to_string(),
        ));
    }

    let roads = lines.len();
    let _reload = state.reload_lock.lock().await;
    write_atomic(&state.roads_path, body.into_bytes()).await?;

    let service = Arc::clone(&state.service);
    let stats = task::spawn_blocking(move || service.reload(&lines))
        .await
        .map_err(|e| ApiError::Internal(format!("reload task failed: {e}")))?;

    Ok(Json(json!({
        "status": "OK",
        "roads": roads,
        "nodes": stats.nodes,
        "edges": stats.edges,
    })))
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct BoundingBox {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl BoundingBox {
    fn validate(&self) -> Result<(), ApiError> {
        let finite = [self.south, self.west, self.north, self.east]
            .iter()
            .all(|v| v.is_finite());
        if !finite || self.south >= self.north || self.west >= self.east {
            return Err(ApiError::BadRequest(format!(
                "bbox must satisfy south < north and west < east, got {self:?}"
            )));
        }
        Ok(())
    }

    /// Box with a quarter of the extent removed from every side
    fn inner_half(&self) -> FloodPolygon {
        let dx = (self.east - self.west) * 0.25;
        let dy = (self.north - self.south) * 0.25;
        FloodPolygon::rectangle(
            coord! { x: self.west + dx, y: self.south + dy },
            coord! { x: self.east - dx, y: self.north - dy },
        )
    }
}

/// Writes one test flood rectangle in the middle of `bbox` to the flood file
pub async fn set_test_flood_rect(
    State(state): State<AppState>,
    Json(bbox): Json<BoundingBox>,
) -> Result<Json<Value>, ApiError> {
    bbox.validate()?;

    let flood = bbox.inner_half();
    let mut properties = JsonObject::new();
    properties.insert("source".to_string(), json!("test-rect"));
    let collection = FeatureCollection {
        bbox: None,
        features: flood
            .geometry
            .iter()
            .map(|polygon| Feature {
                bbox: None,
                geometry: Some(Geometry::new(GeoJsonValue::from(polygon))),
                id: None,
                properties: Some(properties.clone()),
                foreign_members: None,
            })
            .collect(),
        foreign_members: None,
    };

    let contents = serde_json::to_vec(&collection)
        .map_err(|e| ApiError::Internal(format!("cannot encode flood: {e}")))?;
    write_atomic(&state.flood_path, contents).await?;
    tracing::info!(path = %state.flood_path.display(), "Test flood rectangle written");

    Ok(Json(json!({
        "status": "OK",
        "polygons": collection.features.len(),
        "bbox": bbox,
    })))
}

/// Current contents of the flood file
pub async fn flood_geojson(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let text = match tokio::fs::read_to_string(&state.flood_path).await {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ApiError::NotFound(format!(
                "{} does not exist, set a flood first",
                state.flood_path.display()
            )));
        }
        Err(e) => return Err(ApiError::Internal(e.to_string())),
    };

    serde_json::from_str(&text)
        .map(Json)
        .map_err(|e| ApiError::Internal(format!("flood file is not valid JSON: {e}")))
}

/// Suffix counter keeping temp names unique between concurrent writers
static TEMP_SEQUENCE: AtomicU64 = AtomicU64::new(0);

fn temp_sibling(path: &Path) -> Option<PathBuf> {
    let name = path.file_name()?.to_string_lossy();
    let seq = TEMP_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    Some(path.with_file_name(format!(".{name}.tmp.{}.{seq}", std::process::id())))
}

/// Replaces `path` with `contents` through a temp file in the same
/// directory. Readers see either the old file or the new one, never a
/// partly written one.
pub(super) async fn write_atomic(path: &Path, contents: Vec<u8>) -> Result<(), ApiError> {
    let failed = |e: std::io::Error| {
        ApiError::Internal(format!("cannot write {}: {e}", path.display()))
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(failed)?;
    }
    let tmp = temp_sibling(path)
        .ok_or_else(|| ApiError::Internal(format!("{} has no file name", path.display())))?;

    let written = match tokio::fs::write(&tmp, contents).await {
        Ok(()) => tokio::fs::rename(&tmp, path).await,
        Err(e) => Err(e),
    };
    if let Err(e) = written {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(failed(e));
    }
    Ok(())
}
