//! Interactive session state.
//!
//! One [`MapSession`] owns everything a user interaction touches: the active
//! dataset, the category selection, the heatmap toggle and the injected map
//! backend. Every interaction recomputes filter, view, scene and table in
//! full; there is no incremental update and no state outside this struct.

use log::{debug, info, warn};

use crate::backend::{select_backend, MapBackend, Scene};
use crate::geo::centroid;
use crate::ingest::{ingest, IngestError, IngestOptions};
use crate::render::{render_map, RenderConfig};
use crate::table::table_rows;
use crate::{
    default_locations, distinct_categories, filter_by_categories, CategorySelection, Location,
    LocationCollection, DEFAULT_CENTER,
};

/// What a successful upload replaced the dataset with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestSummary {
    pub rows: usize,
    pub categories: usize,
}

/// One fully recomputed display pass.
#[derive(Debug)]
pub struct Frame {
    /// `None` when the backend refused the view; the table below is then the
    /// whole display.
    pub scene: Option<Scene>,
    /// Table rows for the visible records, always present.
    pub table: Vec<[String; 4]>,
    /// Banners for the host to show (degradation notice, embed failure).
    pub diagnostics: Vec<String>,
}

/// Session state for one interactive user.
pub struct MapSession {
    dataset: LocationCollection,
    selection: CategorySelection,
    show_heatmap: bool,
    backend: Box<dyn MapBackend>,
    config: RenderConfig,
    ingest_options: IngestOptions,
    /// Degradation banner, surfaced on the first frame only.
    capability_notice: Option<String>,
}

impl MapSession {
    /// Start a session with the best available backend, the default dataset
    /// and the full category selection.
    pub fn new() -> Self {
        Self::with_backend(select_backend())
    }

    /// Start a session with an injected backend.
    pub fn with_backend(backend: Box<dyn MapBackend>) -> Self {
        let dataset = default_locations();
        let selection = distinct_categories(&dataset);
        let capability_notice = backend.startup_diagnostic();

        info!(
            "session started: backend {}, {} locations, {} categories",
            backend.name(),
            dataset.len(),
            selection.len()
        );

        Self {
            dataset,
            selection,
            show_heatmap: false,
            backend,
            config: RenderConfig::default(),
            ingest_options: IngestOptions::default(),
            capability_notice,
        }
    }

    pub fn set_render_config(&mut self, config: RenderConfig) {
        self.config = config;
    }

    pub fn set_ingest_options(&mut self, options: IngestOptions) {
        self.ingest_options = options;
    }

    pub fn dataset(&self) -> &[Location] {
        &self.dataset
    }

    pub fn selection(&self) -> &CategorySelection {
        &self.selection
    }

    /// Replace the category selection (from the host's multiselect widget).
    pub fn set_selection(&mut self, selection: CategorySelection) {
        self.selection = selection;
    }

    /// Toggle the heat layer (from the host's checkbox).
    pub fn set_heatmap(&mut self, on: bool) {
        self.show_heatmap = on;
    }

    /// Ingest an uploaded CSV buffer and, on success, replace the active
    /// dataset and reset the selection to the new full category set.
    ///
    /// On error nothing changes; the previous dataset stays active and the
    /// error text is for the host's error banner.
    pub fn upload(&mut self, bytes: &[u8]) -> Result<IngestSummary, IngestError> {
        let records = ingest(bytes, &self.ingest_options)?;

        let selection = distinct_categories(&records);
        let summary = IngestSummary {
            rows: records.len(),
            categories: selection.len(),
        };

        info!(
            "upload replaced dataset: {} rows, {} categories",
            summary.rows, summary.categories
        );

        self.dataset = records;
        self.selection = selection;
        Ok(summary)
    }

    /// Recompute the full display: filter, view, scene, table.
    ///
    /// A backend refusal downgrades this frame to table-only and reports the
    /// underlying text; the session stays interactive.
    pub fn frame(&mut self) -> Frame {
        let visible = filter_by_categories(&self.dataset, &self.selection);
        debug!(
            "frame: {} of {} records visible, heatmap {}",
            visible.len(),
            self.dataset.len(),
            self.show_heatmap
        );

        // Empty render sets fall back to the active dataset's overall mean,
        // then to the fixed campus constant when the dataset itself is empty.
        let mut config = self.config.clone();
        config.fallback_center = centroid(&self.dataset).unwrap_or(DEFAULT_CENTER);

        let view = render_map(&visible, self.show_heatmap, &config);

        let mut diagnostics: Vec<String> = self.capability_notice.take().into_iter().collect();
        let scene = match self.backend.embed(&view) {
            Ok(scene) => Some(scene),
            Err(err) => {
                warn!("map embed failed, table-only frame: {err}");
                diagnostics.push(format!("Map display failed, showing table only: {err}"));
                None
            }
        };

        Frame {
            scene,
            table: table_rows(&visible),
            diagnostics,
        }
    }
}

impl Default for MapSession {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{FallbackBackend, RenderFailure};
    use crate::render::MapView;
    use crate::InvalidRowPolicy;

    /// Backend double that refuses every view, as a widget throwing on embed.
    struct RefusingBackend;

    impl MapBackend for RefusingBackend {
        fn name(&self) -> &'static str {
            "refusing"
        }

        fn embed(&self, _view: &MapView) -> Result<Scene, RenderFailure> {
            Err(RenderFailure::BadCoordinate {
                label: "synthetic".to_string(),
                lat: f64::NAN,
                lon: f64::NAN,
            })
        }
    }

    fn fallback_session() -> MapSession {
        MapSession::with_backend(Box::new(FallbackBackend))
    }

    fn scene_center(scene: &Scene) -> (f64, f64) {
        match scene {
            Scene::Interactive(s) => s.view.center,
            Scene::Scatter(s) => s.center,
        }
    }

    #[test]
    fn test_new_session_shows_full_default_dataset() {
        let mut session = fallback_session();
        assert_eq!(session.dataset().len(), 6);
        assert_eq!(session.selection().len(), 3);

        let frame = session.frame();
        assert!(frame.scene.is_some());
        assert_eq!(frame.table.len(), 6);
    }

    #[test]
    fn test_capability_notice_reported_once() {
        let mut session = fallback_session();

        let first = session.frame();
        assert_eq!(first.diagnostics.len(), 1);
        assert!(first.diagnostics[0].contains("point plot"));

        let second = session.frame();
        assert!(second.diagnostics.is_empty());
    }

    #[test]
    fn test_empty_selection_centers_on_dataset_mean() {
        let mut session = fallback_session();
        session.set_selection(CategorySelection::new());

        let frame = session.frame();
        assert!(frame.table.is_empty());

        let dataset = default_locations();
        let expected = centroid(&dataset).unwrap();
        let center = scene_center(frame.scene.as_ref().unwrap());
        assert!((center.0 - expected.0).abs() < 1e-12);
        assert!((center.1 - expected.1).abs() < 1e-12);
    }

    #[test]
    fn test_upload_replaces_dataset_and_selection() {
        let mut session = fallback_session();
        let csv = b"nama,lat,lon,kategori\nKampus Baru,-6.2000,106.8200,Administrasi\n";

        let summary = session.upload(csv).unwrap();
        assert_eq!(summary, IngestSummary { rows: 1, categories: 1 });

        assert_eq!(session.dataset().len(), 1);
        assert_eq!(session.dataset()[0].name, "Kampus Baru");
        let selected: Vec<&str> = session.selection().iter().map(String::as_str).collect();
        assert_eq!(selected, vec!["Administrasi"]);

        let frame = session.frame();
        assert_eq!(frame.table.len(), 1);
    }

    #[test]
    fn test_failed_upload_keeps_prior_dataset() {
        let mut session = fallback_session();

        let err = session.upload(b"nama,lon\nRektorat,119.43\n").unwrap_err();
        match err {
            IngestError::MissingColumns(missing) => assert_eq!(missing, vec!["lat"]),
            other => panic!("expected MissingColumns, got {other:?}"),
        }

        assert_eq!(session.dataset(), default_locations().as_slice());
        assert_eq!(session.selection().len(), 3);
    }

    #[test]
    fn test_malformed_upload_keeps_prior_dataset() {
        let mut session = fallback_session();
        let err = session.upload(&[0xff, 0xfe, 0xff]).unwrap_err();
        assert!(matches!(err, IngestError::Malformed(_)));
        assert_eq!(session.dataset().len(), 6);
    }

    #[test]
    fn test_header_only_upload_yields_empty_usable_session() {
        let mut session = fallback_session();

        let summary = session.upload(b"nama,lat,lon,kategori\n").unwrap();
        assert_eq!(summary.rows, 0);

        let frame = session.frame();
        assert!(frame.table.is_empty());
        let center = scene_center(frame.scene.as_ref().unwrap());
        assert_eq!(center, DEFAULT_CENTER);
    }

    #[test]
    fn test_skip_policy_applies_to_uploads() {
        let mut session = fallback_session();
        session.set_ingest_options(IngestOptions {
            invalid_rows: InvalidRowPolicy::Skip,
        });

        let csv = b"nama,lat,lon\nok,-5.15,119.43\nbroken,abc,119.43\n";
        let summary = session.upload(csv).unwrap();
        assert_eq!(summary.rows, 1);
    }

    #[test]
    fn test_embed_failure_downgrades_to_table_only() {
        let mut session = MapSession::with_backend(Box::new(RefusingBackend));

        let frame = session.frame();
        assert!(frame.scene.is_none());
        assert_eq!(frame.table.len(), 6);
        assert!(frame
            .diagnostics
            .iter()
            .any(|d| d.contains("showing table only")));

        // Session stays interactive after the failure
        session.set_heatmap(true);
        let next = session.frame();
        assert_eq!(next.table.len(), 6);
    }

    #[test]
    fn test_heat_toggle_reaches_scene() {
        let mut session = fallback_session();
        session.set_heatmap(true);
        // The scatter fallback drops the overlay, but the frame must still
        // build without error from the same coordinate pairs.
        let frame = session.frame();
        assert!(frame.scene.is_some());
    }
}
