//! Interactive session state: the loaded data, the current view and the commands acting on them.

use std::path::Path;

use anyhow::Context;
use thiserror::Error;

use crate::config::Config;
use crate::display;
use crate::ingestion::{load_from_path, save_to_path, IngestionOptions, LoadedData};
use crate::processing::{
    compute_stats, compute_table_stats, filter_records, filter_table, sort_records, sort_table, Predicate,
    SortKey, Statistics,
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("Data not loaded. Please load data first.")]
    NotLoaded,

    #[error("{operation} is not supported for XML data")]
    UnsupportedForXml { operation: &'static str },
}

/// Holds what was loaded and the view produced by chained filter/sort commands.
#[derive(Debug)]
pub struct Session {
    config: Config,
    options: IngestionOptions,
    loaded: Option<LoadedData>,
    current: Option<LoadedData>,
}

impl Session {
    pub fn new(config: Config) -> Self {
        let options = config.ingestion_options();
        Self {
            config,
            options,
            loaded: None,
            current: None,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The data the next command operates on.
    pub fn current(&self) -> Option<&LoadedData> {
        self.current.as_ref()
    }

    fn require_current(&self) -> Result<&LoadedData, SessionError> {
        self.current.as_ref().ok_or(SessionError::NotLoaded)
    }

    /// Load `path`, replacing both the loaded data and the current view.
    pub fn load(&mut self, path: impl AsRef<Path>) -> anyhow::Result<String> {
        let path = path.as_ref();
        let data = load_from_path(path, &self.options)
            .with_context(|| format!("failed to load {}", path.display()))?;
        let message = format!("Loaded {} from {}", data.describe(), path.display());
        self.loaded = Some(data.clone());
        self.current = Some(data);
        Ok(message)
    }

    /// Render the current view, limited by `limit` or the configured `display.max_rows`.
    pub fn display(&self, limit: Option<usize>) -> anyhow::Result<String> {
        let data = self.require_current()?;
        // 0 means unlimited, as for `display.max_rows` in the config file.
        let limit = match limit {
            Some(0) => None,
            Some(n) => Some(n),
            None => self.config.display_limit(),
        };
        Ok(display::render_loaded(data, limit))
    }

    /// Compute statistics for the current view, optionally narrowed to one field.
    pub fn statistics(&self, field: Option<&str>) -> anyhow::Result<Statistics> {
        let options = self.config.stats_options();
        let stats = match self.require_current()? {
            LoadedData::Table(ds) => compute_table_stats(ds, &options)?,
            LoadedData::Records(rs) => compute_stats(rs, &options)?,
            LoadedData::Tree(_) => return Err(SessionError::UnsupportedForXml { operation: "stats" }.into()),
        };
        match field {
            Some(field) => Ok(stats.only_field(field)?),
            None => Ok(stats),
        }
    }

    pub fn stats(&self, field: Option<&str>, as_json: bool) -> anyhow::Result<String> {
        let stats = self.statistics(field)?;
        if as_json {
            Ok(display::render_stats_json(&stats)?)
        } else {
            Ok(display::render_stats(&stats))
        }
    }

    /// Sort the current view. `reverse` flips every key's direction.
    pub fn sort(&mut self, keys: &[SortKey], reverse: bool) -> anyhow::Result<String> {
        let keys: Vec<SortKey> = keys
            .iter()
            .map(|k| {
                if reverse {
                    SortKey::new(k.field.clone(), k.direction.reversed())
                } else {
                    k.clone()
                }
            })
            .collect();

        let sorted = match self.require_current()? {
            LoadedData::Table(ds) => LoadedData::Table(sort_table(ds, &keys)?),
            LoadedData::Records(rs) => LoadedData::Records(sort_records(rs, &keys)?),
            LoadedData::Tree(_) => return Err(SessionError::UnsupportedForXml { operation: "sort" }.into()),
        };
        let message = format!(
            "Sorted {} by {}",
            sorted.describe(),
            keys.iter().map(SortKey::to_string).collect::<Vec<_>>().join(", ")
        );
        self.current = Some(sorted);
        Ok(message)
    }

    /// Filter the current view; the result becomes the new current view.
    pub fn filter(&mut self, predicate: &Predicate) -> anyhow::Result<String> {
        let before = self.require_current()?.row_count();
        let filtered = match self.require_current()? {
            LoadedData::Table(ds) => LoadedData::Table(filter_table(ds, predicate)?),
            LoadedData::Records(rs) => LoadedData::Records(filter_records(rs, predicate)?),
            LoadedData::Tree(_) => return Err(SessionError::UnsupportedForXml { operation: "filter" }.into()),
        };
        let message = format!("Kept {} of {before}", filtered.row_count());
        self.current = Some(filtered);
        Ok(message)
    }

    /// Restore the originally loaded data.
    pub fn reset(&mut self) -> anyhow::Result<String> {
        let loaded = self.loaded.clone().ok_or(SessionError::NotLoaded)?;
        let message = format!("Restored {}", loaded.describe());
        self.current = Some(loaded);
        Ok(message)
    }

    /// Write the current view to `path`.
    pub fn save(&self, path: impl AsRef<Path>) -> anyhow::Result<String> {
        let path = path.as_ref();
        let data = self.require_current()?;
        save_to_path(path, data, &self.options).with_context(|| format!("failed to save {}", path.display()))?;
        Ok(format!("Saved {} to {}", data.describe(), path.display()))
    }
}
