use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use chrono::NaiveDate;

use crate::data::export;
use crate::data::filter::{filtered_indices, Criteria};
use crate::data::loader::{LoadCache, LoadError};
use crate::data::model::PriceTable;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// Transient top-bar message.
#[derive(Debug, Clone)]
pub enum Status {
    Info(String),
    Error(String),
}

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Session-owned memoization of the load step, keyed by path.
    pub cache: LoadCache,

    /// Path of the currently loaded file (None until a load succeeds).
    pub source_path: Option<PathBuf>,

    /// Loaded price table, shared read-only with every view.
    pub dataset: Option<Arc<PriceTable>>,

    /// Active filter criteria.
    pub criteria: Criteria,

    /// Indices of materials passing the current criteria (recomputed from
    /// the full table on every criteria change).
    pub visible_indices: Vec<usize>,

    /// "Now" for the expiry monitor; defaults to today.
    pub reference_date: NaiveDate,

    /// Status / error message shown in the top bar.
    pub status: Option<Status>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            cache: LoadCache::default(),
            source_path: None,
            dataset: None,
            criteria: Criteria::default(),
            visible_indices: Vec::new(),
            reference_date: chrono::Local::now().date_naive(),
            status: None,
        }
    }
}

impl AppState {
    /// Load the table at `path` (through the cache) and install it.
    /// On failure the previous dataset stays; the error becomes the status.
    pub fn open_file(&mut self, path: PathBuf) {
        match self.cache.load(&path) {
            Ok(table) => {
                log::info!(
                    "loaded {} materials from {}",
                    table.len(),
                    path.display()
                );
                self.set_dataset(path, table);
            }
            Err(e) => self.fail_load(&path, e),
        }
    }

    /// Invalidate the cache entry for the current file and read it again.
    pub fn reload(&mut self) {
        if let Some(path) = self.source_path.clone() {
            self.cache.invalidate(&path);
            self.open_file(path);
        }
    }

    /// Recompute `visible_indices` after a criteria change.
    pub fn refilter(&mut self) {
        if let Some(ds) = &self.dataset {
            self.visible_indices = filtered_indices(ds, &self.criteria);
        }
    }

    /// Drop every active criterion.
    pub fn clear_filters(&mut self) {
        self.criteria = Criteria::default();
        self.refilter();
    }

    /// Write the current filtered view as CSV to `path`.
    pub fn export_view(&mut self, path: &Path) {
        let Some(ds) = &self.dataset else {
            return;
        };
        let rows = self.visible_indices.len();
        let result = export::view_to_csv(ds, &self.visible_indices)
            .and_then(|bytes| std::fs::write(path, bytes).context("writing export file"));
        match result {
            Ok(()) => {
                log::info!("exported {rows} rows to {}", path.display());
                self.status = Some(Status::Info(format!(
                    "Exported {rows} rows to {}",
                    path.display()
                )));
            }
            Err(e) => {
                log::error!("export failed: {e:#}");
                self.status = Some(Status::Error(format!("Export failed: {e:#}")));
            }
        }
    }

    /// Ingest a newly loaded dataset and reset the session to it.
    fn set_dataset(&mut self, path: PathBuf, table: Arc<PriceTable>) {
        self.visible_indices = (0..table.len()).collect();
        self.criteria = Criteria::default();
        self.dataset = Some(table);
        self.source_path = Some(path);
        self.status = None;
    }

    fn fail_load(&mut self, path: &Path, error: LoadError) {
        log::error!("failed to load {}: {error}", path.display());
        self.status = Some(Status::Error(format!("Error: {error}")));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::TextSearch;

    const HEADER: &str = "Material,Material Name,UOM,Sales Org.,Rawabi Price,Market Price";

    fn temp_path(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!("price_desk_state_{tag}_{}.csv", std::process::id()))
    }

    fn write_rows(path: &Path, rows: &[&str]) {
        let mut contents = format!("{HEADER}\n");
        for row in rows {
            contents.push_str(row);
            contents.push('\n');
        }
        std::fs::write(path, contents).unwrap();
    }

    #[test]
    fn open_file_installs_the_identity_view() {
        let path = temp_path("open");
        write_rows(&path, &["1,Pipe A,EA,1000,100,120", "2,Pipe B,EA,2000,50,40"]);

        let mut state = AppState::default();
        state.open_file(path.clone());

        assert_eq!(state.dataset.as_ref().unwrap().len(), 2);
        assert_eq!(state.visible_indices, vec![0, 1]);
        assert_eq!(state.source_path.as_deref(), Some(path.as_path()));
        assert!(state.status.is_none());

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn failed_load_keeps_the_previous_dataset() {
        let path = temp_path("keep");
        write_rows(&path, &["1,Pipe A,EA,1000,100,120"]);

        let mut state = AppState::default();
        state.open_file(path.clone());
        state.open_file(PathBuf::from("/no/such/file.csv"));

        assert!(matches!(state.status, Some(Status::Error(_))));
        assert_eq!(state.dataset.as_ref().unwrap().len(), 1);

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn refilter_and_clear_round_trip() {
        let path = temp_path("refilter");
        write_rows(&path, &["1,Pipe A,EA,1000,100,120", "2,Gate Valve,EA,2000,50,40"]);

        let mut state = AppState::default();
        state.open_file(path.clone());

        state.criteria.search = TextSearch::Fields {
            name: "pipe".to_string(),
            id: String::new(),
        };
        state.refilter();
        assert_eq!(state.visible_indices, vec![0]);

        state.clear_filters();
        assert_eq!(state.visible_indices, vec![0, 1]);

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn reload_picks_up_a_rewritten_file() {
        let path = temp_path("reload");
        write_rows(&path, &["1,Pipe A,EA,1000,100,120"]);

        let mut state = AppState::default();
        state.open_file(path.clone());
        assert_eq!(state.dataset.as_ref().unwrap().len(), 1);

        write_rows(
            &path,
            &["1,Pipe A,EA,1000,100,120", "2,Pipe B,EA,2000,50,40"],
        );
        // A plain re-open hits the cache; reload must not.
        state.open_file(path.clone());
        assert_eq!(state.dataset.as_ref().unwrap().len(), 1);
        state.reload();
        assert_eq!(state.dataset.as_ref().unwrap().len(), 2);

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn export_writes_the_filtered_view() {
        let path = temp_path("export_src");
        write_rows(&path, &["1,Pipe A,EA,1000,100,120", "2,Gate Valve,EA,2000,50,40"]);

        let mut state = AppState::default();
        state.open_file(path.clone());
        state.criteria.search = TextSearch::Combined("valve".to_string());
        state.refilter();

        let out = temp_path("export_out");
        state.export_view(&out);
        assert!(matches!(state.status, Some(Status::Info(_))));

        let text = std::fs::read_to_string(&out).unwrap();
        assert_eq!(text.lines().count(), 2);
        assert!(text.contains("Gate Valve"));

        let _ = std::fs::remove_file(&path);
        let _ = std::fs::remove_file(&out);
    }
}
