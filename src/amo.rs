//! AMO command: regional SST index, its smoothed version and per-season
//! regression/correlation maps for the model and an optional reference.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use tracing::{debug, info, info_span, warn};

use diagon_calendar::DateRange;
use diagon_grid::{GriddedField, TimeSeries};
use diagon_index::{
    IndexConfig, IndexError, RegressionMaps, compute_index, regression_and_correlation,
    smooth_index,
};
use diagon_io::{DataReader, NetcdfReader, WriterConfig, write_maps, write_series};

use crate::cli::DiagnosticArgs;
use crate::config::{DataToml, DatesToml, DiagonConfig};
use crate::convert;

const DIAGNOSTIC: &str = "amo";

/// Run the AMO diagnostic.
pub fn run(args: DiagnosticArgs) -> Result<()> {
    let _cmd = info_span!("amo").entered();
    let config = DiagonConfig::load(&args.config)?;

    let outdir = args.outdir.unwrap_or_else(|| config.output.outdir.clone());
    let save_netcdf = config.output.save_netcdf && !args.no_netcdf;
    let mut diagnostic = AmoDiagnostic::new(&config)?
        .with_outdir(outdir)
        .with_writer(convert::build_writer_config(&config.output, args.rebuild));

    diagnostic.retrieve()?;
    let outputs = diagnostic.compute(save_netcdf)?;

    let written = outputs.values().filter(|p| p.is_some()).count();
    info!(n_items = outputs.len(), n_written = written, "AMO diagnostic complete");
    for (key, path) in &outputs {
        match path {
            Some(path) => debug!(key, path = %path.display(), "output"),
            None => debug!(key, "no output"),
        }
    }
    Ok(())
}

/// One dataset run through the pipeline.
struct Dataset {
    /// Prefix of the output keys: empty for the model, `ref_` for the reference.
    prefix: &'static str,
    data: DataToml,
    reader: NetcdfReader,
    /// Retrieved fields by variable name.
    fields: Option<BTreeMap<String, GriddedField>>,
}

impl Dataset {
    fn new(prefix: &'static str, data: &DataToml, config: &DiagonConfig) -> Result<Self> {
        let range = analysis_range(&config.dates)?;
        let reader_cfg = convert::build_reader_config(&config.reader, data, range)?;
        Ok(Self {
            prefix,
            data: data.clone(),
            reader: NetcdfReader::new(&data.path, reader_cfg),
            fields: None,
        })
    }

    /// Load the index variable (required) and every regression target
    /// (skipped with a warning when unreadable).
    fn load(&self, targets: &[String]) -> Result<BTreeMap<String, GriddedField>> {
        let variable = &self.data.variable;
        let mut fields = BTreeMap::new();
        let field = self.reader.retrieve(variable).with_context(|| {
            format!(
                "failed to retrieve '{variable}' from {}",
                self.reader.path().display()
            )
        })?;
        fields.insert(variable.clone(), field);

        for target in targets {
            if fields.contains_key(target) {
                continue;
            }
            match self.reader.retrieve(target) {
                Ok(field) => {
                    fields.insert(target.clone(), field);
                }
                Err(e) => warn!(
                    model = %self.data.model,
                    variable = %target,
                    error = %e,
                    "regression target unavailable, skipping"
                ),
            }
        }
        Ok(fields)
    }
}

/// The AMO diagnostic for one configuration.
pub struct AmoDiagnostic {
    index_config: IndexConfig,
    targets: Vec<String>,
    outdir: PathBuf,
    writer: WriterConfig,
    model: Dataset,
    reference: Option<Dataset>,
}

impl AmoDiagnostic {
    /// Build the diagnostic, validating the configuration before any data
    /// is read.
    pub fn new(config: &DiagonConfig) -> Result<Self> {
        let index_config = convert::build_index_config(&config.amo)?;
        let targets = if config.amo.regressions.is_empty() {
            vec![config.data.variable.clone()]
        } else {
            config.amo.regressions.clone()
        };
        let model = Dataset::new("", &config.data, config)?;
        let reference = config
            .reference
            .as_ref()
            .map(|data| Dataset::new("ref_", data, config))
            .transpose()?;

        Ok(Self {
            index_config,
            targets,
            outdir: config.output.outdir.clone(),
            writer: convert::build_writer_config(&config.output, false),
            model,
            reference,
        })
    }

    /// Write output below `outdir`.
    pub fn with_outdir(mut self, outdir: impl Into<PathBuf>) -> Self {
        self.outdir = outdir.into();
        self
    }

    /// Writer settings for the NetCDF output.
    pub fn with_writer(mut self, writer: WriterConfig) -> Self {
        self.writer = writer;
        self
    }

    /// Load the model fields and, when configured, the reference fields.
    ///
    /// A model that cannot be read is fatal; an unreadable reference is
    /// logged and later reported as absent.
    pub fn retrieve(&mut self) -> Result<()> {
        let fields = self.model.load(&self.targets)?;
        info!(model = %self.model.data.model, n_fields = fields.len(), "retrieved model data");
        self.model.fields = Some(fields);

        if let Some(reference) = self.reference.as_mut() {
            match reference.load(&self.targets) {
                Ok(fields) => {
                    info!(model = %reference.data.model, n_fields = fields.len(), "retrieved reference data");
                    reference.fields = Some(fields);
                }
                Err(e) => warn!(
                    model = %reference.data.model,
                    error = %format!("{e:#}"),
                    "reference data unavailable"
                ),
            }
        }
        Ok(())
    }

    /// Compute every output item.
    ///
    /// Returns the path written for each item key, or `None` when the item
    /// was not written: NetCDF output disabled, the reference dataset
    /// absent, or the item failed (logged and skipped).
    ///
    /// # Errors
    ///
    /// Fails only if [`retrieve`](Self::retrieve) has not loaded the model.
    pub fn compute(&self, save_netcdf: bool) -> Result<BTreeMap<String, Option<PathBuf>>> {
        let fields = self
            .model
            .fields
            .as_ref()
            .context("model data not retrieved; call retrieve() first")?;

        let mut outputs = BTreeMap::new();
        self.compute_dataset(&self.model, Some(fields), save_netcdf, &mut outputs);
        match &self.reference {
            Some(reference) => self.compute_dataset(
                reference,
                reference.fields.as_ref(),
                save_netcdf,
                &mut outputs,
            ),
            None => {
                for key in self.item_keys() {
                    outputs.insert(format!("ref_{key}"), None);
                }
            }
        }
        Ok(outputs)
    }

    /// Item keys produced per dataset.
    fn item_keys(&self) -> Vec<String> {
        let mut keys = vec!["index".to_string()];
        if self.index_config.smooth() {
            keys.push("index_filtered".to_string());
        }
        for target in &self.targets {
            for season in self.index_config.seasons() {
                keys.push(maps_key(target, &season.to_string()));
            }
        }
        keys
    }

    fn compute_dataset(
        &self,
        dataset: &Dataset,
        fields: Option<&BTreeMap<String, GriddedField>>,
        save_netcdf: bool,
        outputs: &mut BTreeMap<String, Option<PathBuf>>,
    ) {
        let _span = info_span!("dataset", model = %dataset.data.model, exp = %dataset.data.exp)
            .entered();
        let keys = self.item_keys();
        let absent = |outputs: &mut BTreeMap<String, Option<PathBuf>>| {
            for key in &keys {
                outputs.entry(format!("{}{key}", dataset.prefix)).or_insert(None);
            }
        };

        let Some(fields) = fields else {
            debug!("dataset absent, no outputs");
            absent(outputs);
            return;
        };
        let Some(field) = fields.get(&dataset.data.variable) else {
            absent(outputs);
            return;
        };

        let index = match self.index(field) {
            Ok(index) => index,
            Err(e) => {
                warn!(variable = field.name(), error = %e, "index computation failed, skipping");
                absent(outputs);
                return;
            }
        };
        info!(n_times = index.len(), std = index.std(), "computed index");
        let path = self.save(dataset, "index", save_netcdf, |path| {
            write_series(path, &index, &self.writer)
        });
        outputs.insert(format!("{}index", dataset.prefix), path);

        if self.index_config.smooth() {
            let path = match smooth_index(&index, self.index_config.window_years()) {
                Ok(smoothed) => self.save(dataset, "index_filtered", save_netcdf, |path| {
                    write_series(path, &smoothed, &self.writer)
                }),
                Err(e) => {
                    warn!(error = %e, "smoothing failed, skipping");
                    None
                }
            };
            outputs.insert(format!("{}index_filtered", dataset.prefix), path);
        }

        for target in &self.targets {
            for &season in self.index_config.seasons() {
                let key = maps_key(target, &season.to_string());
                let maps = match regression_and_correlation(Some(&index), fields.get(target), season)
                {
                    Ok(maps) => maps,
                    Err(e) => {
                        warn!(variable = %target, %season, error = %e, "regression failed, skipping");
                        None
                    }
                };
                let path = maps.and_then(|maps: RegressionMaps| {
                    self.save(dataset, &key, save_netcdf, |path| {
                        write_maps(path, &maps, &self.writer)
                    })
                });
                outputs.insert(format!("{}{key}", dataset.prefix), path);
            }
        }
    }

    fn index(&self, field: &GriddedField) -> Result<TimeSeries, IndexError> {
        let config = &self.index_config;
        let reference = if config.detrend() {
            Some(field.select_region(config.detrend_region())?)
        } else {
            None
        };
        compute_index(
            field,
            config.region(),
            config.detrend(),
            reference.as_ref(),
            DIAGNOSTIC,
        )
    }

    /// Write one item, returning its path on success.
    fn save(
        &self,
        dataset: &Dataset,
        key: &str,
        save_netcdf: bool,
        write: impl FnOnce(&Path) -> Result<(), diagon_io::IoError>,
    ) -> Option<PathBuf> {
        if !save_netcdf {
            return None;
        }
        let path = self.outdir.join(dataset.data.output_name(DIAGNOSTIC, key));
        match write(&path) {
            Ok(()) => Some(path),
            Err(e) => {
                warn!(key, path = %path.display(), error = %e, "failed to write output, skipping");
                None
            }
        }
    }
}

fn maps_key(target: &str, season: &str) -> String {
    format!("maps_{target}_{season}")
}

/// Reader window from `[dates]`; an open bound extends to the record edge.
pub(crate) fn analysis_range(dates: &DatesToml) -> Result<Option<DateRange>> {
    let start = convert::parse_optional_date(dates.startdate.as_deref())?;
    let end = convert::parse_optional_date(dates.enddate.as_deref())?;
    Ok(match (start, end) {
        (None, None) => None,
        (start, end) => Some(DateRange::new(
            start.unwrap_or(NaiveDate::MIN),
            end.unwrap_or(NaiveDate::MAX),
        )),
    })
}
