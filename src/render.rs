//! Map view construction.
//!
//! Turns the visible location subset into a [`MapView`]: a center point, a
//! fitted zoom level, a marker layer (collapsed into clusters above a density
//! threshold) and an optional heat layer. The view is a pure render artifact,
//! recomputed from scratch on every interaction; a backend turns it into a
//! scene for the host UI.

use std::collections::HashMap;

use log::debug;

use crate::geo::{centroid, zoom_for_bounds, Bounds};
use crate::heatmap::{build_heat_layer, HeatLayer};
use crate::{Location, DEFAULT_CENTER};

/// Configuration for map view construction.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Center used when the rendered set is empty.
    /// Default: [`DEFAULT_CENTER`]; the session overrides this with the
    /// active dataset's overall mean.
    pub fallback_center: (f64, f64),

    /// Zoom used when there is nothing to fit a bounding box to.
    /// Default: 17 (single-campus scale)
    pub fixed_zoom: u8,

    /// Loosest zoom the bounding-box fit may produce. Default: 3
    pub min_zoom: u8,

    /// Tightest zoom the bounding-box fit may produce. Default: 18
    pub max_zoom: u8,

    /// Marker count above which clustering kicks in. Default: 25
    pub cluster_threshold: usize,

    /// Grid cell size for clustering, in meters. Default: 60.0
    pub cluster_cell_meters: f64,

    /// Grid cell size for the heat layer, in meters. Default: 25.0
    pub heat_cell_meters: f64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            fallback_center: DEFAULT_CENTER,
            fixed_zoom: 17,
            min_zoom: 3,
            max_zoom: 18,
            cluster_threshold: 25,
            cluster_cell_meters: 60.0,
            heat_cell_meters: 25.0,
        }
    }
}

/// A point annotation for one location record.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Marker {
    pub lat: f64,
    pub lon: f64,
    /// Hover label
    pub label: String,
    /// Popup body, shown on click
    pub detail: String,
}

/// A visual aggregation of nearby markers, expandable on interaction.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Cluster {
    pub lat: f64,
    pub lon: f64,
    pub count: u32,
    /// Member markers revealed when the cluster is expanded
    pub members: Vec<Marker>,
}

/// Derived, layered map state handed to a [`MapBackend`](crate::MapBackend).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct MapView {
    /// `(lat, lon)`, never NaN
    pub center: (f64, f64),
    pub zoom: u8,
    pub markers: Vec<Marker>,
    pub clusters: Vec<Cluster>,
    pub heat: Option<HeatLayer>,
}

impl Marker {
    fn for_location(record: &Location) -> Self {
        Self {
            lat: record.lat,
            lon: record.lon,
            label: record.name.clone(),
            detail: format!(
                "{} (Kategori: {}, Koordinat: {}, {})",
                record.name, record.category, record.lat, record.lon
            ),
        }
    }
}

/// Build a [`MapView`] from the visible records.
///
/// The center is the arithmetic mean of the records' coordinates, falling back
/// to `config.fallback_center` for an empty set. Zoom is fitted to the records'
/// bounding box. When `show_heat` is set the heat layer is attached, built
/// from the same coordinate pairs; with empty input it is an empty overlay.
pub fn render_map(records: &[Location], show_heat: bool, config: &RenderConfig) -> MapView {
    let center = centroid(records).unwrap_or(config.fallback_center);
    let zoom = Bounds::from_locations(records)
        .map(|b| zoom_for_bounds(&b, config.min_zoom, config.max_zoom))
        .unwrap_or(config.fixed_zoom);

    let all_markers: Vec<Marker> = records.iter().map(Marker::for_location).collect();
    let (markers, clusters) = if all_markers.len() > config.cluster_threshold {
        cluster_markers(all_markers, config.cluster_cell_meters)
    } else {
        (all_markers, Vec::new())
    };

    let heat = show_heat.then(|| build_heat_layer(records, config.heat_cell_meters));

    debug!(
        "rendered view: {} markers, {} clusters, zoom {}, heat {}",
        markers.len(),
        clusters.len(),
        zoom,
        heat.is_some()
    );

    MapView { center, zoom, markers, clusters, heat }
}

/// Collapse markers sharing a grid cell into clusters.
///
/// Singleton cells stay plain markers. Both lists preserve first-seen order,
/// so the layer stays deterministic for a given input order.
fn cluster_markers(all: Vec<Marker>, cell_size_meters: f64) -> (Vec<Marker>, Vec<Cluster>) {
    let Some(first) = all.first() else {
        return (Vec::new(), Vec::new());
    };
    let ref_lat = first.lat;

    let lat_meters_per_deg = 111_320.0;
    let lon_meters_per_deg = 111_320.0 * ref_lat.to_radians().cos();
    let cell_of = |m: &Marker| -> (i32, i32) {
        let row = ((m.lat - ref_lat) * lat_meters_per_deg / cell_size_meters).floor() as i32;
        let col = (m.lon * lon_meters_per_deg / cell_size_meters).floor() as i32;
        (row, col)
    };

    let mut counts: HashMap<(i32, i32), u32> = HashMap::new();
    for m in &all {
        *counts.entry(cell_of(m)).or_insert(0) += 1;
    }

    let mut markers = Vec::new();
    let mut cluster_cells: Vec<((i32, i32), Vec<Marker>)> = Vec::new();

    for m in all {
        let cell = cell_of(&m);
        if counts[&cell] < 2 {
            markers.push(m);
        } else if let Some((_, members)) = cluster_cells.iter_mut().find(|(c, _)| *c == cell) {
            members.push(m);
        } else {
            cluster_cells.push((cell, vec![m]));
        }
    }

    let clusters = cluster_cells
        .into_iter()
        .map(|(_, members)| {
            let n = members.len() as f64;
            let lat = members.iter().map(|m| m.lat).sum::<f64>() / n;
            let lon = members.iter().map(|m| m.lon).sum::<f64>() / n;
            Cluster { lat, lon, count: members.len() as u32, members }
        })
        .collect();

    (markers, clusters)
}
