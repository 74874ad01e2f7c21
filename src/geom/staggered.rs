//! Staggered ("running bond") subdivision.
//!
//! The surface is cut into one band per V interval. Even bands are split at
//! the U breakpoints, odd bands at the averaged breakpoints, so vertical
//! joints alternate between rows like brickwork.

use super::context::GeomContext;
use super::domain::{Interval, average_consecutive, check_breakpoints, consecutive_domains};
use super::panel::{Axis, PanelDiagnostics, PanelError};
use super::surface::{TrimSurface, surface_domain};

/// Panel type produced by [`staggered_panels`] for a surface `S`.
pub type StaggeredPanel<S> = <<S as TrimSurface>::Output as TrimSurface>::Output;

pub fn staggered_panels<S>(
    surface: &S,
    u_breaks: &[f64],
    v_breaks: &[f64],
) -> Result<(Vec<StaggeredPanel<S>>, PanelDiagnostics), PanelError>
where
    S: TrimSurface + ?Sized,
    S::Output: TrimSurface,
{
    let mut ctx = GeomContext::new();
    staggered_panels_with_context(surface, u_breaks, v_breaks, &mut ctx)
}

/// Trims `surface` into staggered panels, band-major then column-minor.
///
/// Breakpoints are expressed in the surface's own parameter space, normally
/// the unit square. A band or panel whose trim is degenerate is skipped and
/// counted in the diagnostics.
pub fn staggered_panels_with_context<S>(
    surface: &S,
    u_breaks: &[f64],
    v_breaks: &[f64],
    ctx: &mut GeomContext<'_>,
) -> Result<(Vec<StaggeredPanel<S>>, PanelDiagnostics), PanelError>
where
    S: TrimSurface + ?Sized,
    S::Output: TrimSurface,
{
    check_breakpoints(u_breaks)?;
    check_breakpoints(v_breaks)?;

    let regular = consecutive_domains(u_breaks);
    let staggered = consecutive_domains(&average_consecutive(u_breaks));
    let bands = consecutive_domains(v_breaks);
    let full_u = surface_domain(surface, Axis::U);

    let mut panels = Vec::with_capacity(bands.len() * staggered.len());
    let mut diagnostics = PanelDiagnostics::default();

    for (row, &band_v) in bands.iter().enumerate() {
        ctx.check_cancelled()?;
        let columns: &[Interval] = if row % 2 == 0 { &regular } else { &staggered };

        let band = match surface.trim(full_u, band_v) {
            Ok(band) => band,
            Err(err) if err.is_degenerate() => {
                log::warn!("skipping staggered band {row}: {err}");
                diagnostics.cells_visited += columns.len();
                diagnostics.skipped_degenerate += columns.len();
                ctx.report_progress(row + 1, bands.len());
                continue;
            }
            Err(err) => return Err(err),
        };

        let full_v = surface_domain(&band, Axis::V);
        for (column, &cell_u) in columns.iter().enumerate() {
            diagnostics.cells_visited += 1;
            match band.trim(cell_u, full_v) {
                Ok(panel) => panels.push(panel),
                Err(err) if err.is_degenerate() => {
                    log::warn!("skipping staggered panel ({row}, {column}): {err}");
                    diagnostics.skipped_degenerate += 1;
                }
                Err(err) => return Err(err),
            }
        }
        ctx.report_progress(row + 1, bands.len());
    }

    log::debug!(
        "staggered subdivision: {} bands, {} panels, {} skipped",
        bands.len(),
        panels.len(),
        diagnostics.skipped_degenerate
    );
    Ok((panels, diagnostics))
}
