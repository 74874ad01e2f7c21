//! Regular quad subdivision, from a point grid or by trimming a surface.

use super::context::GeomContext;
use super::domain::{check_breakpoints, consecutive_domains};
use super::grid::PointGrid;
use super::panel::{PanelBuilder, PanelDiagnostics, PanelError};
use super::surface::TrimSurface;

pub fn quads_from_points<B: PanelBuilder>(
    grid: &PointGrid<'_>,
    builder: &B,
) -> Result<(Vec<B::Panel>, PanelDiagnostics), PanelError> {
    let mut ctx = GeomContext::new();
    quads_from_points_with_context(grid, builder, &mut ctx)
}

/// One quad per cell, `u` outer and `v` inner, with corners
/// `(u,v), (u+1,v), (u+1,v+1), (u,v+1)`.
pub fn quads_from_points_with_context<B: PanelBuilder>(
    grid: &PointGrid<'_>,
    builder: &B,
    ctx: &mut GeomContext<'_>,
) -> Result<(Vec<B::Panel>, PanelDiagnostics), PanelError> {
    let divisions = grid.divisions();
    let mut panels = Vec::with_capacity(divisions.cell_count());
    let mut diagnostics = PanelDiagnostics::default();

    for u in 0..divisions.u() {
        ctx.check_cancelled()?;
        for v in 0..divisions.v() {
            diagnostics.cells_visited += 1;
            let corners = grid.corners([(u, v), (u + 1, v), (u + 1, v + 1), (u, v + 1)]);
            match builder.panel_from_corners(corners) {
                Ok(panel) => panels.push(panel),
                Err(err) if err.is_degenerate() => {
                    log::warn!("skipping degenerate quad at cell ({u}, {v}): {err}");
                    diagnostics.skipped_degenerate += 1;
                }
                Err(err) => return Err(err),
            }
        }
        ctx.report_progress(u + 1, divisions.u());
    }
    Ok((panels, diagnostics))
}

pub fn quad_subdivide<S: TrimSurface + ?Sized>(
    surface: &S,
    u_breaks: &[f64],
    v_breaks: &[f64],
) -> Result<(Vec<S::Output>, PanelDiagnostics), PanelError> {
    let mut ctx = GeomContext::new();
    quad_subdivide_with_context(surface, u_breaks, v_breaks, &mut ctx)
}

/// Trims `surface` to every `(u interval, v interval)` pair, V intervals
/// outer and U intervals inner.
pub fn quad_subdivide_with_context<S: TrimSurface + ?Sized>(
    surface: &S,
    u_breaks: &[f64],
    v_breaks: &[f64],
    ctx: &mut GeomContext<'_>,
) -> Result<(Vec<S::Output>, PanelDiagnostics), PanelError> {
    check_breakpoints(u_breaks)?;
    check_breakpoints(v_breaks)?;

    let columns = consecutive_domains(u_breaks);
    let rows = consecutive_domains(v_breaks);
    let mut panels = Vec::with_capacity(columns.len() * rows.len());
    let mut diagnostics = PanelDiagnostics::default();

    for (row, &cell_v) in rows.iter().enumerate() {
        ctx.check_cancelled()?;
        for &cell_u in &columns {
            diagnostics.cells_visited += 1;
            match surface.trim(cell_u, cell_v) {
                Ok(panel) => panels.push(panel),
                Err(err) if err.is_degenerate() => {
                    log::warn!("skipping degenerate quad trim in row {row}: {err}");
                    diagnostics.skipped_degenerate += 1;
                }
                Err(err) => return Err(err),
            }
        }
        ctx.report_progress(row + 1, rows.len());
    }
    Ok((panels, diagnostics))
}
