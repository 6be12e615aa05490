//! # Campus Map
//!
//! Rendering pipeline for an interactive campus location map: an ordered
//! location dataset, a category filter, a layered map view (markers, clusters,
//! optional heatmap) and CSV ingest for replacing the dataset at runtime.
//!
//! The host UI owns widgets and page chrome; this crate owns the data and the
//! render artifacts handed to it.
//!
//! ## Features
//!
//! - **`interactive`** (default) - Tiled interactive map backend. Without it
//!   the crate degrades to a non-interactive scatter scene.
//! - **`serde`** - Serialization of views and scenes for the host UI
//!
//! ## Quick Start
//!
//! ```rust
//! use campus_map::{default_locations, distinct_categories, filter_by_categories};
//! use campus_map::{render_map, RenderConfig};
//!
//! let dataset = default_locations();
//! let selection = distinct_categories(&dataset);
//!
//! let visible = filter_by_categories(&dataset, &selection);
//! assert_eq!(visible.len(), dataset.len());
//!
//! let view = render_map(&visible, false, &RenderConfig::default());
//! assert_eq!(view.markers.len(), dataset.len());
//! ```

use std::collections::BTreeSet;

pub mod backend;
pub mod geo;
pub mod heatmap;
pub mod ingest;
pub mod render;
pub mod session;
pub mod table;

#[cfg(feature = "interactive")]
pub use backend::InteractiveBackend;
pub use backend::{
    select_backend, FallbackBackend, InteractiveScene, MapBackend, RenderFailure, ScatterScene,
    Scene,
};
pub use geo::Bounds;
pub use heatmap::{build_heat_layer, HeatCell, HeatLayer};
pub use ingest::{ingest, IngestError, IngestOptions, InvalidRowPolicy};
pub use render::{render_map, Cluster, MapView, Marker, RenderConfig};
pub use session::{Frame, IngestSummary, MapSession};
pub use table::{table_rows, TABLE_HEADER};

/// Fixed fallback center, used only when the active dataset itself is empty.
///
/// This is the main campus coordinate from the default dataset.
pub const DEFAULT_CENTER: (f64, f64) = (-5.147665, 119.432731);

/// A named campus location with WGS84 coordinates and a free-form category.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Location {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    pub category: String,
}

impl Location {
    /// Create a new location record.
    pub fn new(name: &str, lat: f64, lon: f64, category: &str) -> Self {
        Self {
            name: name.to_string(),
            lat,
            lon,
            category: category.to_string(),
        }
    }

    /// Check that both coordinates are finite and within WGS84 bounds.
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && self.lat >= -90.0
            && self.lat <= 90.0
            && self.lon >= -180.0
            && self.lon <= 180.0
    }
}

/// An ordered location dataset. Insertion order is display order; names and
/// coordinates carry no uniqueness constraint.
pub type LocationCollection = Vec<Location>;

/// A set of selected category labels. `BTreeSet` keeps iteration (and thus
/// widget option order) deterministic.
pub type CategorySelection = BTreeSet<String>;

/// The built-in six-record campus dataset, active until a CSV upload
/// replaces it.
pub fn default_locations() -> LocationCollection {
    vec![
        Location::new("Rektorat", -5.147665, 119.432731, "Administrasi"),
        Location::new("Perpustakaan", -5.148200, 119.431900, "Fasilitas"),
        Location::new("Gedung Teknik", -5.149000, 119.434200, "Akademik"),
        Location::new("Gedung Ekonomi", -5.147900, 119.430800, "Akademik"),
        Location::new("Masjid Kampus", -5.146800, 119.433500, "Fasilitas"),
        Location::new("Lapangan Olahraga", -5.150500, 119.435100, "Fasilitas"),
    ]
}

/// The distinct categories present in a dataset, in sorted order.
///
/// This is also the default (full) selection for a freshly loaded dataset.
pub fn distinct_categories(records: &[Location]) -> CategorySelection {
    records.iter().map(|r| r.category.clone()).collect()
}

/// Keep the records whose category is in `selected`, preserving order.
///
/// An empty selection yields an empty collection; this is a valid state of
/// the host's multiselect widget, not an error.
///
/// # Example
/// ```
/// use campus_map::{default_locations, filter_by_categories};
/// use std::collections::BTreeSet;
///
/// let dataset = default_locations();
/// let selection: BTreeSet<String> = ["Akademik".to_string()].into();
///
/// let visible = filter_by_categories(&dataset, &selection);
/// assert_eq!(visible.len(), 2);
/// assert!(visible.iter().all(|r| r.category == "Akademik"));
/// ```
pub fn filter_by_categories(
    records: &[Location],
    selected: &CategorySelection,
) -> LocationCollection {
    records
        .iter()
        .filter(|r| selected.contains(&r.category))
        .cloned()
        .collect()
}
