//! Subcommand implementations

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use ptdgen_core::{DiagnosticEmitter, PtdConfig};
use ptdgen_graft::{finalize_formatting, graft_sheets, GraftOptions};
use ptdgen_layout::GridBuilder;
use ptdgen_render::ExcelGridRenderer;

use crate::output::{absolute, ensure_output_dir, with_xlsx_extension};

/// Inputs of the grid stage
pub struct GridInputs<'a> {
    pub visits: &'a Path,
    pub forms: &'a Path,
}

/// Inputs of the graft stage
pub struct GraftInputs<'a> {
    pub template: &'a Path,
    pub schedule: &'a Path,
    pub study_forms: &'a Path,
    pub fast: bool,
}

/// Build the schedule grid workbook at `out`
pub fn run_grid(
    inputs: &GridInputs<'_>,
    out: &Path,
    config: &PtdConfig,
    emitter: &mut dyn DiagnosticEmitter,
) -> Result<PathBuf> {
    let visits = ptdgen_parser::read_visits(inputs.visits)
        .with_context(|| format!("Failed to read visits from {}", inputs.visits.display()))?;
    let forms = ptdgen_parser::read_forms(inputs.forms)
        .with_context(|| format!("Failed to read forms from {}", inputs.forms.display()))?;
    tracing::info!("Loaded {} visits and {} forms", visits.len(), forms.len());

    let grid = GridBuilder::new(&config.layout)
        .build(&visits, &forms, emitter)
        .context("Failed to lay out schedule grid")?;

    let out = with_xlsx_extension(out.to_path_buf());
    ensure_output_dir(&out)
        .with_context(|| format!("Failed to create output directory for {}", out.display()))?;
    ExcelGridRenderer::new()
        .save(&grid, &out)
        .with_context(|| format!("Failed to write schedule grid to {}", out.display()))?;
    Ok(out)
}

/// Graft the schedule and forms sheets into the template, then format the
/// forms sheet unless `fast`
pub fn run_graft(
    inputs: &GraftInputs<'_>,
    out: &Path,
    config: &PtdConfig,
    emitter: &mut dyn DiagnosticEmitter,
) -> Result<PathBuf> {
    let options = GraftOptions::from_config(&config.graft, inputs.fast);
    ensure_output_dir(out)
        .with_context(|| format!("Failed to create output directory for {}", out.display()))?;

    let report = graft_sheets(
        inputs.template,
        inputs.schedule,
        inputs.study_forms,
        out,
        &options,
        emitter,
    )
    .context("Failed to graft sheets into template")?;
    tracing::debug!("Sheet order: {:?}", report.sheet_order);

    if !inputs.fast {
        finalize_formatting(
            out,
            &config.graft.forms_sheet_name,
            config.graft.format_header_rows,
            emitter,
        )
        .with_context(|| format!("Failed to format {}", out.display()))?;
    }
    Ok(absolute(out))
}

/// Grid then graft, with the grid workbook kept in a run-scoped
/// temporary directory
pub fn run_build(
    grid: &GridInputs<'_>,
    template: &Path,
    study_forms: &Path,
    fast: bool,
    out: &Path,
    config: &PtdConfig,
    emitter: &mut dyn DiagnosticEmitter,
) -> Result<PathBuf> {
    let scratch = tempfile::Builder::new()
        .prefix("ptd_schedule_")
        .tempdir()
        .context("Failed to create temporary directory")?;

    let result = run_grid(grid, &scratch.path().join("schedule_grid.xlsx"), config, emitter)
        .and_then(|schedule| {
            let inputs = GraftInputs {
                template,
                schedule: &schedule,
                study_forms,
                fast,
            };
            run_graft(&inputs, out, config, emitter)
        });

    let scratch_path = scratch.path().to_path_buf();
    if let Err(e) = scratch.close() {
        tracing::warn!(
            "Failed to remove temporary directory {}: {}",
            scratch_path.display(),
            e
        );
    }
    result
}
