#![forbid(unsafe_code)]

//! Radar and grid datasets, and the collaborators that produce them.
//!
//! Panels never read files themselves. They ask the context for a
//! `Rc<dyn DatasetLoader>` or `Rc<dyn Gridder>` service and pass the result
//! around inside shared cells as [`Value::Opaque`].
//!
//! Two loaders ship with the crate: [`MemoryLoader`] serves datasets that
//! were inserted up front, [`SyntheticLoader`] fabricates a plausible volume
//! for any path. [`SyntheticGridder`] turns a volume into a grid of the
//! requested shape.

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use artview_core::{AppContext, Value};
use serde::{Deserialize, Serialize};

use crate::error::PanelError;

/// One radar volume: fields sampled over a set of sweeps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RadarDataset {
    pub path: String,
    /// Field names in file order.
    pub fields: Vec<String>,
    /// Elevation angle of each sweep, in degrees.
    pub sweep_angles: Vec<f64>,
    pub rays_per_sweep: usize,
    pub gates: usize,
}

impl RadarDataset {
    #[must_use]
    pub fn sweep_count(&self) -> usize {
        self.sweep_angles.len()
    }

    #[must_use]
    pub fn has_field(&self, name: &str) -> bool {
        self.fields.iter().any(|f| f == name)
    }

    #[must_use]
    pub fn into_value(self) -> Value {
        Value::opaque(self)
    }

    /// The volume held by `value`, if any.
    #[must_use]
    pub fn from_value(value: &Value) -> Option<Rc<Self>> {
        value.downcast_opaque::<Self>()
    }
}

/// A volume resampled to a Cartesian grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridDataset {
    /// Path of the volume (or grid file) this came from.
    pub source: String,
    pub fields: Vec<String>,
    /// `(z, y, x)` point counts.
    pub shape: (usize, usize, usize),
}

impl GridDataset {
    #[must_use]
    pub fn level_count(&self) -> usize {
        self.shape.0
    }

    #[must_use]
    pub fn has_field(&self, name: &str) -> bool {
        self.fields.iter().any(|f| f == name)
    }

    #[must_use]
    pub fn into_value(self) -> Value {
        Value::opaque(self)
    }

    #[must_use]
    pub fn from_value(value: &Value) -> Option<Rc<Self>> {
        value.downcast_opaque::<Self>()
    }
}

/// Gates excluded from display and gridding.
///
/// A gate is excluded when any rule's field lies outside its range.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GateFilter {
    pub rules: Vec<GateRule>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateRule {
    pub field: String,
    pub min: f64,
    pub max: f64,
}

impl GateFilter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep only gates where `field` is within `[min, max]`.
    #[must_use]
    pub fn keep_inside(mut self, field: impl Into<String>, min: f64, max: f64) -> Self {
        self.rules.push(GateRule {
            field: field.into(),
            min,
            max,
        });
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Whether a gate with the given field readings passes every rule.
    ///
    /// Missing readings pass.
    #[must_use]
    pub fn passes(&self, reading: impl Fn(&str) -> Option<f64>) -> bool {
        self.rules.iter().all(|rule| match reading(&rule.field) {
            Some(v) => (rule.min..=rule.max).contains(&v),
            None => true,
        })
    }

    #[must_use]
    pub fn into_value(self) -> Value {
        Value::opaque(self)
    }

    #[must_use]
    pub fn from_value(value: &Value) -> Option<Rc<Self>> {
        value.downcast_opaque::<Self>()
    }
}

/// Paths a file navigator steps through, with the open one marked.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileList {
    pub paths: Vec<String>,
    pub current: Option<usize>,
}

impl FileList {
    #[must_use]
    pub fn current_path(&self) -> Option<&str> {
        self.current
            .and_then(|i| self.paths.get(i))
            .map(String::as_str)
    }

    #[must_use]
    pub fn into_value(self) -> Value {
        Value::opaque(self)
    }

    #[must_use]
    pub fn from_value(value: &Value) -> Option<Rc<Self>> {
        value.downcast_opaque::<Self>()
    }
}

/// Output shape of a gridding run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridOptions {
    /// `(z, y, x)` point counts.
    pub shape: (usize, usize, usize),
}

impl Default for GridOptions {
    fn default() -> Self {
        Self { shape: (1, 101, 101) }
    }
}

/// Why a dataset could not be produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatasetError {
    NotFound(String),
    /// The file exists but is not the requested kind.
    WrongKind { path: String, expected: &'static str },
    Gridding(String),
}

impl fmt::Display for DatasetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound(path) => write!(f, "no such dataset: {path}"),
            Self::WrongKind { path, expected } => write!(f, "{path} is not a {expected} file"),
            Self::Gridding(msg) => write!(f, "gridding failed: {msg}"),
        }
    }
}

impl std::error::Error for DatasetError {}

/// Reads radar volumes and grids.
pub trait DatasetLoader {
    fn load_radar(&self, path: &str) -> Result<RadarDataset, DatasetError>;

    fn load_grid(&self, path: &str) -> Result<GridDataset, DatasetError>;

    /// Files in the same series as `path`, in browse order.
    ///
    /// The default offers only `path` itself.
    fn siblings(&self, path: &str) -> Vec<String> {
        vec![path.to_owned()]
    }
}

/// Resamples a radar volume onto a grid.
pub trait Gridder {
    fn grid(
        &self,
        radar: &RadarDataset,
        filter: Option<&GateFilter>,
        options: &GridOptions,
    ) -> Result<GridDataset, DatasetError>;
}

/// The context's dataset loader.
pub fn loader(ctx: &AppContext) -> Result<Rc<dyn DatasetLoader>, PanelError> {
    ctx.service::<Rc<dyn DatasetLoader>>()
        .ok_or(PanelError::MissingService("dataset loader"))
}

/// The context's gridder.
pub fn gridder(ctx: &AppContext) -> Result<Rc<dyn Gridder>, PanelError> {
    ctx.service::<Rc<dyn Gridder>>()
        .ok_or(PanelError::MissingService("gridder"))
}

/// Serves datasets inserted ahead of time.
#[derive(Debug, Clone, Default)]
pub struct MemoryLoader {
    radars: BTreeMap<String, RadarDataset>,
    grids: BTreeMap<String, GridDataset>,
}

impl MemoryLoader {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_radar(mut self, radar: RadarDataset) -> Self {
        self.radars.insert(radar.path.clone(), radar);
        self
    }

    #[must_use]
    pub fn with_grid(mut self, path: impl Into<String>, grid: GridDataset) -> Self {
        self.grids.insert(path.into(), grid);
        self
    }

    fn wrong_kind(&self, path: &str, expected: &'static str) -> DatasetError {
        DatasetError::WrongKind {
            path: path.to_owned(),
            expected,
        }
    }
}

impl DatasetLoader for MemoryLoader {
    fn load_radar(&self, path: &str) -> Result<RadarDataset, DatasetError> {
        if let Some(radar) = self.radars.get(path) {
            return Ok(radar.clone());
        }
        if self.grids.contains_key(path) {
            return Err(self.wrong_kind(path, "radar"));
        }
        Err(DatasetError::NotFound(path.to_owned()))
    }

    fn load_grid(&self, path: &str) -> Result<GridDataset, DatasetError> {
        if let Some(grid) = self.grids.get(path) {
            return Ok(grid.clone());
        }
        if self.radars.contains_key(path) {
            return Err(self.wrong_kind(path, "grid"));
        }
        Err(DatasetError::NotFound(path.to_owned()))
    }

    /// Radar paths in lexical order, when `path` is one of them.
    fn siblings(&self, path: &str) -> Vec<String> {
        if self.radars.contains_key(path) {
            self.radars.keys().cloned().collect()
        } else {
            vec![path.to_owned()]
        }
    }
}

/// Fabricates a volume for any path.
///
/// Paths ending in `.grid` load as grids; everything else loads as radar.
/// The series is `{prefix}_{n:04}.nc` for `n` in `0..series_len`.
#[derive(Debug, Clone)]
pub struct SyntheticLoader {
    pub fields: Vec<String>,
    pub sweep_angles: Vec<f64>,
    pub rays_per_sweep: usize,
    pub gates: usize,
    pub series_len: usize,
}

impl Default for SyntheticLoader {
    fn default() -> Self {
        Self {
            fields: vec![
                "reflectivity".to_owned(),
                "velocity".to_owned(),
                "spectrum_width".to_owned(),
            ],
            sweep_angles: vec![0.5, 1.5, 2.4, 3.4],
            rays_per_sweep: 360,
            gates: 1000,
            series_len: 4,
        }
    }
}

impl SyntheticLoader {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_series_len(mut self, len: usize) -> Self {
        self.series_len = len;
        self
    }

    fn series_prefix(path: &str) -> Option<&str> {
        let stem = path.strip_suffix(".nc")?;
        let (prefix, n) = stem.rsplit_once('_')?;
        n.parse::<usize>().ok().map(|_| prefix)
    }
}

impl DatasetLoader for SyntheticLoader {
    fn load_radar(&self, path: &str) -> Result<RadarDataset, DatasetError> {
        if path.is_empty() {
            return Err(DatasetError::NotFound(String::new()));
        }
        if path.ends_with(".grid") {
            return Err(DatasetError::WrongKind {
                path: path.to_owned(),
                expected: "radar",
            });
        }
        Ok(RadarDataset {
            path: path.to_owned(),
            fields: self.fields.clone(),
            sweep_angles: self.sweep_angles.clone(),
            rays_per_sweep: self.rays_per_sweep,
            gates: self.gates,
        })
    }

    fn load_grid(&self, path: &str) -> Result<GridDataset, DatasetError> {
        if !path.ends_with(".grid") {
            return Err(DatasetError::WrongKind {
                path: path.to_owned(),
                expected: "grid",
            });
        }
        Ok(GridDataset {
            source: path.to_owned(),
            fields: self.fields.clone(),
            shape: GridOptions::default().shape,
        })
    }

    fn siblings(&self, path: &str) -> Vec<String> {
        match Self::series_prefix(path) {
            Some(prefix) => (0..self.series_len)
                .map(|n| format!("{prefix}_{n:04}.nc"))
                .collect(),
            None => vec![path.to_owned()],
        }
    }
}

/// Grids every field of the volume, dropping none.
#[derive(Debug, Clone, Copy, Default)]
pub struct SyntheticGridder;

impl Gridder for SyntheticGridder {
    fn grid(
        &self,
        radar: &RadarDataset,
        filter: Option<&GateFilter>,
        options: &GridOptions,
    ) -> Result<GridDataset, DatasetError> {
        let (z, y, x) = options.shape;
        if z == 0 || y == 0 || x == 0 {
            return Err(DatasetError::Gridding(format!(
                "empty grid shape {:?}",
                options.shape
            )));
        }
        if let Some(rule) = filter
            .into_iter()
            .flat_map(|f| &f.rules)
            .find(|rule| !radar.has_field(&rule.field))
        {
            return Err(DatasetError::Gridding(format!(
                "gate filter uses unknown field '{}'",
                rule.field
            )));
        }
        Ok(GridDataset {
            source: radar.path.clone(),
            fields: radar.fields.clone(),
            shape: options.shape,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synthetic_series_siblings() {
        let loader = SyntheticLoader::new().with_series_len(3);
        assert_eq!(
            loader.siblings("data/KTLX_0001.nc"),
            vec!["data/KTLX_0000.nc", "data/KTLX_0001.nc", "data/KTLX_0002.nc"]
        );
        assert_eq!(loader.siblings("scan.h5"), vec!["scan.h5"]);
    }

    #[test]
    fn synthetic_kinds() {
        let loader = SyntheticLoader::new();
        assert_eq!(loader.load_radar("a_0000.nc").map(|r| r.sweep_count()), Ok(4));
        assert!(matches!(
            loader.load_radar("a.grid"),
            Err(DatasetError::WrongKind { expected: "radar", .. })
        ));
        assert!(loader.load_grid("a.grid").is_ok());
    }

    #[test]
    fn memory_loader_lookup() {
        let radar = SyntheticLoader::new().load_radar("b.nc").expect("radar");
        let loader = MemoryLoader::new().with_radar(radar.clone());
        assert_eq!(loader.load_radar("b.nc"), Ok(radar));
        assert_eq!(
            loader.load_radar("c.nc"),
            Err(DatasetError::NotFound("c.nc".into()))
        );
        assert!(matches!(loader.load_grid("b.nc"), Err(DatasetError::WrongKind { .. })));
    }

    #[test]
    fn gate_filter_rules() {
        let filter = GateFilter::new().keep_inside("reflectivity", 0.0, 60.0);
        assert!(filter.passes(|_| Some(10.0)));
        assert!(!filter.passes(|_| Some(70.0)));
        assert!(filter.passes(|_| None));
    }

    #[test]
    fn gridder_rejects_unknown_filter_field() {
        let radar = SyntheticLoader::new().load_radar("c.nc").expect("radar");
        let filter = GateFilter::new().keep_inside("zdr", -2.0, 8.0);
        let err = SyntheticGridder
            .grid(&radar, Some(&filter), &GridOptions::default())
            .unwrap_err();
        assert!(err.to_string().contains("zdr"));
    }

    #[test]
    fn datasets_travel_in_values() {
        let radar = SyntheticLoader::new().load_radar("d.nc").expect("radar");
        let value = radar.clone().into_value();
        assert_eq!(RadarDataset::from_value(&value).as_deref(), Some(&radar));
        assert!(GridDataset::from_value(&value).is_none());
        assert!(RadarDataset::from_value(&Value::None).is_none());
    }
}
