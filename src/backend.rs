//! Map display backends.
//!
//! The mapping widget is optional at runtime; rather than re-checking its
//! availability at every call site, one backend is selected at startup and
//! injected into the session. [`InteractiveBackend`] produces the full
//! layered scene; [`FallbackBackend`] produces a non-interactive scatter
//! display from the same coordinate pairs, so the system stays usable as a
//! table plus point plot.

use thiserror::Error;

use crate::render::MapView;

/// Base tile source for the interactive map.
pub const DEFAULT_TILES: &str = "OpenStreetMap";

/// The mapping widget rejected a view. Recovered per render pass by
/// downgrading to table-only display.
#[derive(Debug, Error)]
pub enum RenderFailure {
    #[error("marker {label:?} carries a non-finite coordinate ({lat}, {lon})")]
    BadCoordinate { label: String, lat: f64, lon: f64 },
}

/// An embeddable scene handed to the host's display primitive.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Scene {
    /// Base tiles plus marker/cluster/heat overlays.
    Interactive(InteractiveScene),
    /// Non-interactive point plot of the same coordinates.
    Scatter(ScatterScene),
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct InteractiveScene {
    pub tiles: String,
    pub view: MapView,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ScatterScene {
    pub center: (f64, f64),
    /// `(lat, lon)` pairs
    pub points: Vec<(f64, f64)>,
}

/// A display capability for [`MapView`]s, chosen once at startup.
pub trait MapBackend {
    /// Backend name for diagnostics.
    fn name(&self) -> &'static str;

    /// One-time banner to surface when this backend is a degradation.
    fn startup_diagnostic(&self) -> Option<String> {
        None
    }

    /// Turn a view into an embeddable scene.
    fn embed(&self, view: &MapView) -> Result<Scene, RenderFailure>;
}

/// Tiled interactive map backend.
#[cfg(feature = "interactive")]
pub struct InteractiveBackend {
    tiles: String,
}

#[cfg(feature = "interactive")]
impl Default for InteractiveBackend {
    fn default() -> Self {
        Self { tiles: DEFAULT_TILES.to_string() }
    }
}

#[cfg(feature = "interactive")]
impl InteractiveBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tiles(tiles: &str) -> Self {
        Self { tiles: tiles.to_string() }
    }
}

#[cfg(feature = "interactive")]
impl MapBackend for InteractiveBackend {
    fn name(&self) -> &'static str {
        "interactive"
    }

    /// The widget cannot recover from non-finite coordinates, so they are
    /// refused here instead of surfacing as a widget exception mid-embed.
    fn embed(&self, view: &MapView) -> Result<Scene, RenderFailure> {
        let members = view.clusters.iter().flat_map(|c| c.members.iter());
        for marker in view.markers.iter().chain(members) {
            if !marker.lat.is_finite() || !marker.lon.is_finite() {
                return Err(RenderFailure::BadCoordinate {
                    label: marker.label.clone(),
                    lat: marker.lat,
                    lon: marker.lon,
                });
            }
        }

        Ok(Scene::Interactive(InteractiveScene {
            tiles: self.tiles.clone(),
            view: view.clone(),
        }))
    }
}

/// Scatter fallback, always available.
#[derive(Debug, Default)]
pub struct FallbackBackend;

impl MapBackend for FallbackBackend {
    fn name(&self) -> &'static str {
        "scatter-fallback"
    }

    fn startup_diagnostic(&self) -> Option<String> {
        Some(
            "Interactive map support is unavailable; showing a simple point plot instead. \
             Enable the `interactive` feature for the full map."
                .to_string(),
        )
    }

    fn embed(&self, view: &MapView) -> Result<Scene, RenderFailure> {
        let members = view.clusters.iter().flat_map(|c| c.members.iter());
        let points = view
            .markers
            .iter()
            .chain(members)
            .map(|m| (m.lat, m.lon))
            .collect();

        Ok(Scene::Scatter(ScatterScene { center: view.center, points }))
    }
}

/// Pick the best available backend. Runs once at startup; the degraded
/// choice is logged here and surfaced as a banner by the session.
pub fn select_backend() -> Box<dyn MapBackend> {
    #[cfg(feature = "interactive")]
    {
        Box::new(InteractiveBackend::new())
    }

    #[cfg(not(feature = "interactive"))]
    {
        log::warn!("interactive map backend not compiled in; using scatter fallback");
        Box::new(FallbackBackend)
    }
}
