//! Cycle command: climatology over the standard period, projected over the
//! analysis dates.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use tracing::{info, info_span, warn};

use diagon_calendar::{DateRange, retrieval_window};
use diagon_grid::GriddedField;
use diagon_io::{DataReader, NetcdfReader, WriterConfig, write_field, write_series};
use diagon_seasonal::{ClimatologicalCycle, SeasonalCycleProjector};

use crate::cli::DiagnosticArgs;
use crate::config::DiagonConfig;
use crate::convert;

const DIAGNOSTIC: &str = "cycle";

/// Run the seasonal cycle projection.
pub fn run(args: DiagnosticArgs) -> Result<()> {
    let _cmd = info_span!("cycle").entered();
    let config = DiagonConfig::load(&args.config)?;

    let outdir = args.outdir.unwrap_or_else(|| config.output.outdir.clone());
    let save_netcdf = config.output.save_netcdf && !args.no_netcdf;
    let writer = convert::build_writer_config(&config.output, args.rebuild);

    let outputs = compute(&config, &outdir, &writer, save_netcdf)?;
    let written = outputs.values().filter(|p| p.is_some()).count();
    info!(n_items = outputs.len(), n_written = written, "cycle diagnostic complete");
    Ok(())
}

/// Project the climatological cycle of the configured variable.
///
/// Produces the key `field` (gridded projection) and, when `[cycle].region`
/// is set, `series` (projection of the regional mean).
pub fn compute(
    config: &DiagonConfig,
    outdir: &Path,
    writer: &WriterConfig,
    save_netcdf: bool,
) -> Result<BTreeMap<String, Option<PathBuf>>> {
    let cycle_cfg = &config.cycle;

    // 1. Validate before reading anything.
    let projector =
        SeasonalCycleProjector::new(&convert::build_projection_config(&config.dates, cycle_cfg))
            .context("invalid [dates]/[cycle] configuration")?;
    let region = cycle_cfg
        .region
        .as_ref()
        .map(convert::build_region)
        .transpose()?;
    let start_std = convert::parse_optional_date(cycle_cfg.start_std.as_deref())?;
    let end_std = convert::parse_optional_date(cycle_cfg.end_std.as_deref())?;

    // 2. Retrieve the window covering both the analysis and standard periods.
    let (start, end) = retrieval_window(
        Some(projector.range().start()),
        Some(projector.range().end()),
        start_std,
        end_std,
    );
    let range = DateRange::new(
        start.unwrap_or(NaiveDate::MIN),
        end.unwrap_or(NaiveDate::MAX),
    );
    let variable = cycle_cfg.variable.as_deref().unwrap_or(&config.data.variable);
    let reader_cfg = convert::build_reader_config(&config.reader, &config.data, Some(range))?;
    let reader = NetcdfReader::new(&config.data.path, reader_cfg);
    let field = reader.retrieve(variable).with_context(|| {
        format!("failed to retrieve '{variable}' from {}", reader.path().display())
    })?;

    // 3. Climatology over the standard period.
    let std_field = standard_period(&field, start_std, end_std)?;
    info!(
        variable,
        n_times = std_field.n_times(),
        frequency = %projector.frequency(),
        "computing climatology"
    );
    let cycle = ClimatologicalCycle::from_field(&std_field, projector.frequency())
        .context("failed to compute climatology")?;

    // 4. Project and write.
    let mut outputs = BTreeMap::new();
    let projected = projector
        .project(Some(&cycle))
        .and_then(|p| p.to_field())
        .context("failed to project climatology")?;
    info!(n_times = projected.n_times(), "projected field");
    let path = save(config, outdir, "field", save_netcdf, |path| {
        write_field(path, &projected, writer)
    });
    outputs.insert("field".to_string(), path);

    if let Some(region) = region {
        let series = std_field
            .select_region(&region)
            .and_then(|f| f.fldmean())
            .map_err(anyhow::Error::from)
            .and_then(|mean| {
                let cycle = ClimatologicalCycle::from_series(&mean, projector.frequency())?;
                Ok(projector.project(Some(&cycle))?.to_series()?)
            });
        let path = match series {
            Ok(series) => save(config, outdir, "series", save_netcdf, |path| {
                write_series(path, &series, writer)
            }),
            Err(e) => {
                warn!(%region, error = %format!("{e:#}"), "regional projection failed, skipping");
                None
            }
        };
        outputs.insert("series".to_string(), path);
    }

    Ok(outputs)
}

/// Restrict `field` to the standard period; the whole record when unset.
fn standard_period(
    field: &GriddedField,
    start_std: Option<NaiveDate>,
    end_std: Option<NaiveDate>,
) -> Result<GriddedField> {
    if start_std.is_none() && end_std.is_none() {
        return Ok(field.clone());
    }
    let range = DateRange::new(
        start_std.unwrap_or(NaiveDate::MIN),
        end_std.unwrap_or(NaiveDate::MAX),
    );
    Ok(field.select_range(&range)?)
}

fn save(
    config: &DiagonConfig,
    outdir: &Path,
    key: &str,
    save_netcdf: bool,
    write: impl FnOnce(&Path) -> Result<(), diagon_io::IoError>,
) -> Option<PathBuf> {
    if !save_netcdf {
        return None;
    }
    let path = outdir.join(config.data.output_name(DIAGNOSTIC, key));
    match write(&path) {
        Ok(()) => Some(path),
        Err(e) => {
            warn!(key, path = %path.display(), error = %e, "failed to write output, skipping");
            None
        }
    }
}
