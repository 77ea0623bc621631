//! CentileMap Main Application
//! Owns the map view and the two asynchronous loads, joined behind a
//! two-flag barrier.

use crate::config::AppConfig;
use crate::data::{self, ScoreTable};
use crate::gui::StatusPanel;
use crate::map::{BoundarySource, MapView};
use std::sync::mpsc::{channel, Receiver};
use std::thread;

/// Identifier of the joined polygon source on the map view.
pub const ZIP_SOURCE_ID: &str = "zip-boundaries";

/// Score-table load result from the background thread.
enum TableResult {
    Complete(ScoreTable),
    Error(String),
}

/// Boundary load/join result from the background thread.
enum BoundaryResult {
    Complete { source: BoundarySource, matched: usize },
    Error(String),
}

/// Main application window.
///
/// The score table and the map view become ready independently; the boundary
/// load starts only once both have settled, and is requested at most once.
pub struct CentileMapApp {
    config: AppConfig,
    map_view: MapView,
    status_panel: StatusPanel,

    /// Settled score table. Empty (not absent) after a decode failure, so the
    /// boundary layer still attaches with zero joined features.
    score_table: Option<ScoreTable>,
    table_rx: Option<Receiver<TableResult>>,
    boundary_rx: Option<Receiver<BoundaryResult>>,
    boundary_requested: bool,
}

impl CentileMapApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, config: AppConfig) -> Self {
        let mut app = Self::with_config(config);
        app.spawn_table_load();
        app
    }

    fn with_config(config: AppConfig) -> Self {
        Self {
            map_view: MapView::new(&config.viewport),
            status_panel: StatusPanel::new(),
            config,
            score_table: None,
            table_rx: None,
            boundary_rx: None,
            boundary_requested: false,
        }
    }

    /// Decode the workbook on a background thread.
    fn spawn_table_load(&mut self) {
        let (tx, rx) = channel();
        self.table_rx = Some(rx);
        self.status_panel.loading = true;
        self.status_panel.set_status("Loading score table...");

        let path = self.config.scores_path.clone();
        let layout = self.config.layout.clone();

        thread::spawn(move || {
            let result = match data::load_score_table(&path, &layout) {
                Ok(table) => TableResult::Complete(table),
                Err(e) => TableResult::Error(e.to_string()),
            };
            // Receiver gone means the app closed; nothing to do.
            let _ = tx.send(result);
        });
    }

    /// Load, join and prepare the boundary polygons on a background thread.
    /// Only called once the join gate is open, so the table is settled.
    fn spawn_boundary_load(&mut self, table: ScoreTable) {
        let (tx, rx) = channel();
        self.boundary_rx = Some(rx);
        self.status_panel.loading = true;
        self.status_panel.set_status("Loading boundary polygons...");

        let path = self.config.boundaries_path.clone();
        let tolerance = self.config.simplify_tolerance;

        thread::spawn(move || {
            let result = match data::load_boundaries(&path, tolerance) {
                Ok(mut features) => {
                    let matched = data::join_scores(&mut features, &table);
                    BoundaryResult::Complete {
                        source: BoundarySource::build(features),
                        matched,
                    }
                }
                Err(e) => BoundaryResult::Error(e.to_string()),
            };
            let _ = tx.send(result);
        });
    }

    /// Check for score-table results.
    fn check_table_results(&mut self) {
        let Some(rx) = self.table_rx.take() else {
            return;
        };
        match rx.try_recv() {
            Ok(result) => self.handle_table_result(result),
            Err(_) => self.table_rx = Some(rx),
        }
    }

    fn handle_table_result(&mut self, result: TableResult) {
        match result {
            TableResult::Complete(table) => {
                self.status_panel.loaded_count = Some(table.len());
                self.status_panel.set_status("Score table ready");
                self.score_table = Some(table);
            }
            TableResult::Error(error) => {
                tracing::error!(error = %error, "score table load failed");
                self.status_panel.score_error = Some(format!("Score data error: {}", error));
                self.status_panel.set_status("Score table failed");
                // No partial table: the join runs against an empty one and
                // every polygon renders transparent.
                self.score_table = Some(ScoreTable::new());
            }
        }
    }

    /// Check for boundary results.
    fn check_boundary_results(&mut self) {
        let Some(rx) = self.boundary_rx.take() else {
            return;
        };
        match rx.try_recv() {
            Ok(result) => self.handle_boundary_result(result),
            Err(_) => self.boundary_rx = Some(rx),
        }
    }

    fn handle_boundary_result(&mut self, result: BoundaryResult) {
        match result {
            BoundaryResult::Complete { source, matched } => {
                let total = source.len();
                if self.map_view.set_boundary_source(ZIP_SOURCE_ID, source) {
                    tracing::info!(total, matched, "boundary source installed");
                }
                self.status_panel.loading = false;
                self.status_panel
                    .set_status(&format!("Showing {} of {} ZIP areas", matched, total));
            }
            BoundaryResult::Error(error) => {
                tracing::error!(error = %error, "boundary load failed");
                self.status_panel.boundary_error = Some(format!("Boundary error: {}", error));
                self.status_panel.loading = false;
                self.status_panel.set_status("Boundary load failed");
            }
        }
    }

    /// The join barrier: both the score table and the map view must be ready,
    /// and the boundary load must not have been requested yet.
    fn join_gate_open(&self) -> bool {
        !self.boundary_requested
            && self.score_table.is_some()
            && self.map_view.is_ready()
            && !self.map_view.has_source(ZIP_SOURCE_ID)
    }

    fn maybe_start_boundary_load(&mut self) {
        if !self.join_gate_open() {
            return;
        }
        self.boundary_requested = true;
        // Settled by the gate condition.
        if let Some(table) = self.score_table.clone() {
            self.spawn_boundary_load(table);
        }
    }
}

impl eframe::App for CentileMapApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Check for background results
        self.check_table_results();
        self.check_boundary_results();
        self.maybe_start_boundary_load();

        // Request repaint while either load is in flight
        if self.status_panel.loading {
            ctx.request_repaint();
        }

        // Left panel - status and legend
        egui::SidePanel::left("status_panel")
            .min_width(260.0)
            .max_width(320.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    self.status_panel.show(ui);
                });
            });

        // Central panel - map viewport
        egui::CentralPanel::default().show(ctx, |ui| {
            self.map_view.show(ui);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::ScoreRecord;

    fn app() -> CentileMapApp {
        CentileMapApp::with_config(AppConfig::default())
    }

    fn table_with_one_record() -> ScoreTable {
        ScoreTable::from([(
            12345,
            ScoreRecord {
                centile_score: 62.3,
                city: "Springfield".to_string(),
                state: "IL".to_string(),
                population: 50000,
                bachelors_pct: 35.0,
                median_income: 55.0,
            },
        )])
    }

    #[test]
    fn gate_stays_closed_until_both_inputs_ready() {
        let mut app = app();
        assert!(!app.join_gate_open());

        app.handle_table_result(TableResult::Complete(table_with_one_record()));
        assert!(!app.join_gate_open(), "map not painted yet");

        app.map_view.force_ready();
        assert!(app.join_gate_open());
    }

    #[test]
    fn gate_opens_regardless_of_input_order() {
        let mut app = app();
        app.map_view.force_ready();
        assert!(!app.join_gate_open(), "table not settled yet");

        app.handle_table_result(TableResult::Complete(table_with_one_record()));
        assert!(app.join_gate_open());
    }

    #[test]
    fn decode_failure_settles_with_an_empty_table() {
        let mut app = app();
        app.map_view.force_ready();
        app.handle_table_result(TableResult::Error("bad workbook".to_string()));

        // Error is reported, but the gate still opens so the map stays
        // usable with zero joined features.
        assert!(app.status_panel.score_error.is_some());
        assert_eq!(app.score_table.as_ref().map(|t| t.len()), Some(0));
        assert!(app.join_gate_open());
    }

    #[test]
    fn boundary_attach_is_requested_only_once() {
        let mut app = app();
        app.map_view.force_ready();
        app.handle_table_result(TableResult::Complete(table_with_one_record()));

        app.boundary_requested = true; // as maybe_start_boundary_load would set
        assert!(!app.join_gate_open());
    }

    #[test]
    fn loaded_count_reports_table_size() {
        let mut app = app();
        app.handle_table_result(TableResult::Complete(table_with_one_record()));
        assert_eq!(app.status_panel.loaded_count, Some(1));
    }

    #[test]
    fn boundary_error_is_terminal_and_reported() {
        let mut app = app();
        app.handle_boundary_result(BoundaryResult::Error("no such file".to_string()));
        assert!(app.status_panel.boundary_error.is_some());
        assert!(!app.status_panel.loading);
        assert!(app.map_view.source().is_none());
    }

    #[test]
    fn duplicate_boundary_result_does_not_reattach() {
        let mut app = app();
        let result = || BoundaryResult::Complete {
            source: BoundarySource::build(Vec::new()),
            matched: 0,
        };
        app.handle_boundary_result(result());
        assert!(app.map_view.has_source(ZIP_SOURCE_ID));
        // A second completion (re-render under duplicate mount) is a no-op.
        app.handle_boundary_result(result());
        assert!(app.map_view.has_source(ZIP_SOURCE_ID));
    }
}
