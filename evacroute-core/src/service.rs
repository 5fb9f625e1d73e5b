//! Evacuation service: owns the current road graph and answers route queries

use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock};

use geo::Coord;
use log::{info, warn};

use crate::loading::{is_valid_position, read_road_lines};
use crate::{
    Error, EvacConfig, FloodSource, RoadGraph, RoadLine, Route, build_road_graph, find_route,
    mark_blocked,
};

/// Result of a route query that reached the routing stage
#[derive(Debug, Clone, PartialEq)]
pub enum RouteOutcome {
    Found(Route),
    /// Start and end are not connected by unblocked edges
    NoRoute,
    /// No road data is loaded
    EmptyNetwork,
}

/// Size of the loaded road network
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NetworkStats {
    pub nodes: usize,
    pub edges: usize,
}

impl NetworkStats {
    fn of(graph: &RoadGraph) -> Self {
        Self {
            nodes: graph.node_count(),
            edges: graph.edge_count(),
        }
    }
}

/// Road graph holder and route computation entry point.
///
/// The graph is shared as an immutable snapshot. Every route computation
/// blocks edges on its own copy, and [`EvacuationService::reload`] replaces
/// the snapshot as a whole, so a computation never observes a graph that is
/// half old and half new.
pub struct EvacuationService {
    graph: RwLock<Arc<RoadGraph>>,
    floods: Arc<dyn FloodSource>,
    config: EvacConfig,
}

impl EvacuationService {
    /// Builds the initial graph from `lines`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if `config` does not validate.
    pub fn initialize(
        lines: &[RoadLine],
        floods: Arc<dyn FloodSource>,
        config: EvacConfig,
    ) -> Result<Self, Error> {
        config.validate()?;
        let graph = build_road_graph(lines, &config);

        Ok(Self {
            graph: RwLock::new(Arc::new(graph)),
            floods,
            config,
        })
    }

    /// Builds the initial graph from a persisted `GeoJSON` road dataset.
    /// A missing or unreadable dataset yields an empty network.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if `config` does not validate.
    pub fn from_geojson_file(
        path: &Path,
        floods: Arc<dyn FloodSource>,
        config: EvacConfig,
    ) -> Result<Self, Error> {
        let lines = match read_road_lines(path) {
            Ok(lines) => lines,
            Err(e) => {
                warn!("Starting with an empty road network: {e}");
                Vec::new()
            }
        };
        Self::initialize(&lines, floods, config)
    }

    /// Current graph snapshot
    pub fn snapshot(&self) -> Arc<RoadGraph> {
        Arc::clone(&self.graph.read().unwrap_or_else(PoisonError::into_inner))
    }

    pub fn stats(&self) -> NetworkStats {
        NetworkStats::of(&self.snapshot())
    }

    /// Replaces the road graph with one built from `lines`. Computations
    /// already running keep the graph they started with.
    pub fn reload(&self, lines: &[RoadLine]) -> NetworkStats {
        let graph = Arc::new(build_road_graph(lines, &self.config));
        let stats = NetworkStats::of(&graph);

        *self.graph.write().unwrap_or_else(PoisonError::into_inner) = graph;
        info!(
            "Road network replaced: {} nodes, {} edges",
            stats.nodes, stats.edges
        );

        stats
    }

    /// Blocks flooded edges on a private copy of the current graph and
    /// searches it for the shortest route.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidData`] for coordinates outside WGS84 range, and
    /// any flood source error other than [`Error::DataUnavailable`], which is
    /// treated as "no floods".
    pub fn compute_route(&self, start: Coord<f64>, end: Coord<f64>) -> Result<RouteOutcome, Error> {
        for (name, coord) in [("start", start), ("end", end)] {
            if !is_valid_position(coord) {
                return Err(Error::InvalidData(format!(
                    "{name} coordinate ({}, {}) is out of range",
                    coord.y, coord.x
                )));
            }
        }

        let floods = match self.floods.fetch() {
            Ok(floods) => floods,
            Err(e) if e.is_data_unavailable() => {
                warn!("Routing without flood data: {e}");
                Vec::new()
            }
            Err(e) => return Err(e),
        };

        let snapshot = self.snapshot();
        if snapshot.is_empty() {
            return Ok(RouteOutcome::EmptyNetwork);
        }

        let mut working = RoadGraph::clone(&snapshot);
        drop(snapshot);
        mark_blocked(&mut working, &floods, self.config.overlap_ratio);

        Ok(match find_route(&working, start, end) {
            Some(route) => RouteOutcome::Found(route),
            None => RouteOutcome::NoRoute,
        })
    }
}

#[cfg(test)]
mod tests {
    use geo::coord;

    use super::*;
    use crate::{FloodPolygon, StaticFloodSource};

    struct FailingSource(fn() -> Error);

    impl FloodSource for FailingSource {
        fn fetch(&self) -> Result<Vec<crate::FloodPolygon>, Error> {
            Err((self.0)())
        }
    }

    fn corridor() -> Vec<RoadLine> {
        vec![RoadLine::new(vec![
            coord! { x: 0.0, y: 0.0 },
            coord! { x: 0.001, y: 0.0 },
        ])]
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = EvacConfig {
            overlap_ratio: 0.0,
            ..EvacConfig::default()
        };
        let result = EvacuationService::initialize(
            &corridor(),
            Arc::new(StaticFloodSource::default()),
            config,
        );
        assert!(matches!(result, Err(Error::Configuration(_))));
    }

    #[test]
    fn unavailable_floods_degrade_to_open_network() {
        let service = EvacuationService::initialize(
            &corridor(),
            Arc::new(FailingSource(|| Error::DataUnavailable("offline".into()))),
            EvacConfig::default(),
        )
        .unwrap();

        let outcome = service
            .compute_route(coord! { x: 0.0, y: 0.0 }, coord! { x: 0.001, y: 0.0 })
            .unwrap();
        assert!(matches!(outcome, RouteOutcome::Found(_)));
    }

    #[test]
    fn upstream_failures_propagate() {
        let service = EvacuationService::initialize(
            &corridor(),
            Arc::new(FailingSource(|| Error::UpstreamFetch("timeout".into()))),
            EvacConfig::default(),
        )
        .unwrap();

        let result = service.compute_route(coord! { x: 0.0, y: 0.0 }, coord! { x: 0.001, y: 0.0 });
        assert!(matches!(result, Err(Error::UpstreamFetch(_))));
    }

    #[test]
    fn out_of_range_query_is_invalid() {
        let service = EvacuationService::initialize(
            &corridor(),
            Arc::new(StaticFloodSource::default()),
            EvacConfig::default(),
        )
        .unwrap();

        let result = service.compute_route(coord! { x: 0.0, y: 91.0 }, coord! { x: 0.001, y: 0.0 });
        assert!(matches!(result, Err(Error::InvalidData(_))));
    }

    #[test]
    fn shared_graph_is_never_marked() {
        let flood = FloodPolygon::rectangle(coord! { x: -1.0, y: -1.0 }, coord! { x: 1.0, y: 1.0 });
        let service = EvacuationService::initialize(
            &corridor(),
            Arc::new(StaticFloodSource::new(vec![flood])),
            EvacConfig::default(),
        )
        .unwrap();

        let outcome = service
            .compute_route(coord! { x: 0.0, y: 0.0 }, coord! { x: 0.001, y: 0.0 })
            .unwrap();
        assert_eq!(outcome, RouteOutcome::NoRoute);
        assert_eq!(service.snapshot().blocked_count(), 0);
    }

    #[test]
    fn missing_dataset_starts_empty() {
        let service = EvacuationService::from_geojson_file(
            Path::new("/nowhere/roads.geojson"),
            Arc::new(StaticFloodSource::default()),
            EvacConfig::default(),
        )
        .unwrap();

        assert_eq!(service.stats(), NetworkStats::default());
        let outcome = service
            .compute_route(coord! { x: 0.0, y: 0.0 }, coord! { x: 0.001, y: 0.0 })
            .unwrap();
        assert_eq!(outcome, RouteOutcome::EmptyNetwork);
    }
}
