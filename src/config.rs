use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// Top-level diagon configuration.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DiagonConfig {
    /// Analysis period.
    #[serde(default)]
    pub dates: DatesToml,

    /// Primary dataset.
    pub data: DataToml,

    /// Optional reference dataset, run through the same pipeline.
    #[serde(default)]
    pub reference: Option<DataToml>,

    /// Coordinate aliases used by the reader.
    #[serde(default)]
    pub reader: ReaderToml,

    /// Output settings.
    #[serde(default)]
    pub output: OutputToml,

    /// AMO diagnostic settings.
    #[serde(default)]
    pub amo: AmoToml,

    /// Seasonal cycle projection settings.
    #[serde(default)]
    pub cycle: CycleToml,
}

impl DiagonConfig {
    /// Read and parse a TOML configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let toml_str = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config: {}", path.display()))?;
        toml::from_str(&toml_str)
            .with_context(|| format!("failed to parse TOML config: {}", path.display()))
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct DatesToml {
    pub startdate: Option<String>,
    pub enddate: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct DataToml {
    pub model: String,
    pub exp: String,
    pub source: String,
    /// NetCDF file holding the variables.
    pub path: PathBuf,
    #[serde(default = "default_variable")]
    pub variable: String,
    /// Requested variable name -> variable name in the file.
    #[serde(default)]
    pub renames: BTreeMap<String, String>,
}

impl DataToml {
    /// Output file name `{diagnostic}.{key}.{model}.{exp}.{source}.nc`.
    pub fn output_name(&self, diagnostic: &str, key: &str) -> String {
        format!(
            "{diagnostic}.{key}.{}.{}.{}.nc",
            self.model, self.exp, self.source
        )
    }
}

fn default_variable() -> String {
    "tos".to_string()
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ReaderToml {
    pub lon_aliases: Option<Vec<String>>,
    pub lat_aliases: Option<Vec<String>>,
    pub time_aliases: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputToml {
    #[serde(default = "default_outdir")]
    pub outdir: PathBuf,
    #[serde(default)]
    pub rebuild: bool,
    #[serde(default = "default_true")]
    pub save_netcdf: bool,
}

impl Default for OutputToml {
    fn default() -> Self {
        Self {
            outdir: default_outdir(),
            rebuild: false,
            save_netcdf: true,
        }
    }
}

fn default_outdir() -> PathBuf {
    PathBuf::from("output")
}
fn default_true() -> bool {
    true
}

/// Rectangular region as `lat = [min, max]`, `lon = [min, max]`.
#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct RegionToml {
    #[serde(default)]
    pub name: Option<String>,
    pub lat: [f64; 2],
    pub lon: [f64; 2],
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AmoToml {
    #[serde(default = "default_amo_region")]
    pub region: RegionToml,
    #[serde(default = "default_true")]
    pub detrend: bool,
    #[serde(default = "default_detrend_region")]
    pub detrend_region: RegionToml,
    #[serde(default)]
    pub smooth: bool,
    #[serde(default = "default_window_years")]
    pub window_years: usize,
    #[serde(default = "default_seasons")]
    pub seasons: Vec<String>,
    /// Fields regressed onto the index; empty means the index variable.
    #[serde(default)]
    pub regressions: Vec<String>,
}

impl Default for AmoToml {
    fn default() -> Self {
        Self {
            region: default_amo_region(),
            detrend: true,
            detrend_region: default_detrend_region(),
            smooth: false,
            window_years: default_window_years(),
            seasons: default_seasons(),
            regressions: Vec::new(),
        }
    }
}

fn default_amo_region() -> RegionToml {
    RegionToml {
        name: Some("north_atlantic".to_string()),
        lat: [0.0, 60.0],
        lon: [-80.0, 0.0],
    }
}
fn default_detrend_region() -> RegionToml {
    RegionToml {
        name: Some("near_global".to_string()),
        lat: [-60.0, 60.0],
        lon: [0.0, 360.0],
    }
}
fn default_window_years() -> usize {
    10
}
fn default_seasons() -> Vec<String> {
    ["annual", "DJF", "MAM", "JJA", "SON"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CycleToml {
    /// Variable to project; defaults to `data.variable`.
    #[serde(default)]
    pub variable: Option<String>,
    #[serde(default = "default_frequency")]
    pub frequency: String,
    #[serde(default = "default_true")]
    pub center_time: bool,
    /// Climatology (standard) period; the whole record when unset.
    #[serde(default)]
    pub start_std: Option<String>,
    #[serde(default)]
    pub end_std: Option<String>,
    /// Also project the area-weighted mean over this region.
    #[serde(default)]
    pub region: Option<RegionToml>,
}

impl Default for CycleToml {
    fn default() -> Self {
        Self {
            variable: None,
            frequency: default_frequency(),
            center_time: true,
            start_std: None,
            end_std: None,
            region: None,
        }
    }
}

fn default_frequency() -> String {
    "monthly".to_string()
}
