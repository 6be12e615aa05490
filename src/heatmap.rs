//! Heat layer generation.
//!
//! Buckets the visible locations into a sparse metric grid and normalizes
//! per-cell counts into 0.0-1.0 intensities for the map widget's color ramp.
//! The layer carries no per-record weights; density comes purely from how
//! many points share a cell.

use std::collections::HashMap;

use crate::Location;

/// A single occupied cell of the heat grid.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct HeatCell {
    /// Cell center for rendering
    pub lat: f64,
    pub lon: f64,
    /// Normalized density (0.0-1.0) for color mapping
    pub intensity: f32,
    /// Raw point count in this cell
    pub count: u32,
}

/// Sparse heat overlay. An empty layer is valid and renders as nothing.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct HeatLayer {
    pub cells: Vec<HeatCell>,
    /// Maximum per-cell count, the normalization denominator
    pub max_count: u32,
}

/// Grid coordinate
type CellCoord = (i32, i32);

struct HeatGrid {
    cell_size_meters: f64,
    ref_lat: f64,
    cells: HashMap<CellCoord, u32>,
}

impl HeatGrid {
    fn new(cell_size_meters: f64, ref_lat: f64) -> Self {
        Self {
            cell_size_meters,
            ref_lat,
            cells: HashMap::new(),
        }
    }

    /// Convert lat/lon to grid coordinates.
    fn to_grid_coords(&self, lat: f64, lon: f64) -> CellCoord {
        // Meters per degree at the reference latitude
        let lat_meters_per_deg = 111_320.0;
        let lon_meters_per_deg = 111_320.0 * self.ref_lat.to_radians().cos();

        let row = ((lat - self.ref_lat) * lat_meters_per_deg / self.cell_size_meters).floor() as i32;
        let col = (lon * lon_meters_per_deg / self.cell_size_meters).floor() as i32;

        (row, col)
    }

    /// Center of a grid cell as `(lat, lon)`.
    fn cell_center(&self, row: i32, col: i32) -> (f64, f64) {
        let lat_meters_per_deg = 111_320.0;
        let lon_meters_per_deg = 111_320.0 * self.ref_lat.to_radians().cos();

        let lat = self.ref_lat + ((row as f64 + 0.5) * self.cell_size_meters / lat_meters_per_deg);
        let lon = (col as f64 + 0.5) * self.cell_size_meters / lon_meters_per_deg;

        (lat, lon)
    }

    fn add_point(&mut self, lat: f64, lon: f64) {
        let coord = self.to_grid_coords(lat, lon);
        *self.cells.entry(coord).or_insert(0) += 1;
    }

    fn build(self) -> HeatLayer {
        if self.cells.is_empty() {
            return HeatLayer::default();
        }

        let max_count = self.cells.values().copied().max().unwrap_or(1);

        let mut cells: Vec<HeatCell> = self
            .cells
            .iter()
            .map(|(&(row, col), &count)| {
                let (lat, lon) = self.cell_center(row, col);
                HeatCell {
                    lat,
                    lon,
                    intensity: count as f32 / max_count as f32,
                    count,
                }
            })
            .collect();

        // HashMap iteration order is arbitrary; sort for a stable layer.
        cells.sort_by(|a, b| a.lat.total_cmp(&b.lat).then(a.lon.total_cmp(&b.lon)));

        HeatLayer { cells, max_count }
    }
}

/// Build a heat layer from the `(lat, lon)` pairs of `records`.
///
/// Empty input produces an empty layer, never an error; toggling the heatmap
/// on with nothing selected is a no-op overlay.
pub fn build_heat_layer(records: &[Location], cell_size_meters: f64) -> HeatLayer {
    let Some(first) = records.first() else {
        return HeatLayer::default();
    };

    let mut grid = HeatGrid::new(cell_size_meters, first.lat);
    for r in records {
        grid.add_point(r.lat, r.lon);
    }
    grid.build()
}
