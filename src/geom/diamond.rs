//! Diamond tessellation of a point grid.
//!
//! Cells are visited `u`-outer, `v`-inner. Each cell may emit a diamond
//! (four grid points one diagonal step around the cell origin) and any
//! number of edge or corner triangles. The rules depend on the parity of
//! `u`, `v` and of the division counts `U`, `V`; together they close the
//! diamond lattice against the grid boundary without gaps or overlaps.
//! Cells matching no rule are interior cells covered by a neighbouring
//! diamond.

use super::context::GeomContext;
use super::grid::{GridDivisions, PointGrid, sample_surface_grid};
use super::panel::{PanelBuilder, PanelDiagnostics, PanelError};
use super::surface::{Reparameterized, Surface};

type Corners = [(usize, usize); 4];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CellPanel {
    Diamond,
    Triangle,
}

const fn triangle(a: (usize, usize), b: (usize, usize), c: (usize, usize)) -> Corners {
    [a, b, c, a]
}

const fn is_odd(n: usize) -> bool {
    n % 2 == 1
}

/// Emits every panel anchored at cell `(u, v)`.
fn cell_panels(u: usize, v: usize, divisions: GridDivisions, mut emit: impl FnMut(CellPanel, Corners)) {
    let (u_div, v_div) = (divisions.u(), divisions.v());
    // `u + 1 < u_div` reads `u < U - 1` without underflow for U = 0.
    let before_last_u = u + 1 < u_div;
    let last_u = u + 1 == u_div;
    let last_v = v + 1 == v_div;

    let odd_u_diamond = is_odd(u) && !is_odd(v) && v > 1 && v < v_div && before_last_u;
    let even_u_diamond = !is_odd(u) && is_odd(v) && v < v_div && before_last_u;
    if odd_u_diamond || even_u_diamond {
        emit(
            CellPanel::Diamond,
            [(u, v), (u + 1, v - 1), (u + 2, v), (u + 1, v + 1)],
        );
    }

    // left edge
    if u == 0 && is_odd(v) && v + 1 < v_div {
        emit(CellPanel::Triangle, triangle((u, v), (u + 1, v + 1), (u, v + 2)));
    }

    // bottom edge
    if v == 0 && is_odd(u) && before_last_u {
        emit(CellPanel::Triangle, triangle((u, v), (u + 2, v), (u + 1, v + 1)));
    }

    let top_edge_parity = if is_odd(v_div) { !is_odd(u) } else { is_odd(u) };
    if last_v && top_edge_parity && before_last_u {
        emit(
            CellPanel::Triangle,
            triangle((u, v + 1), (u + 1, v), (u + 2, v + 1)),
        );
    }

    if !is_odd(v_div) && u == 0 && last_v {
        emit(CellPanel::Triangle, triangle((u, v), (u + 1, v + 1), (u, v + 1)));
    }

    // top-right corner: U even with V even, U odd with V odd
    if last_u && last_v && is_odd(u_div) == is_odd(v_div) {
        emit(
            CellPanel::Triangle,
            triangle((u, v + 1), (u + 1, v), (u + 1, v + 1)),
        );
    }

    let right_edge_parity = if is_odd(u_div) { !is_odd(v) } else { is_odd(v) };
    if last_u && right_edge_parity && v + 1 < v_div {
        emit(
            CellPanel::Triangle,
            triangle((u, v + 1), (u + 1, v), (u + 1, v + 2)),
        );
    }

    if !is_odd(u_div) && last_u && v == 0 {
        emit(CellPanel::Triangle, triangle((u, v), (u + 1, v), (u + 1, v + 1)));
    }

    if u == 0 && v == 0 {
        emit(CellPanel::Triangle, triangle((0, 0), (1, 0), (0, 1)));
    }
}

/// Flat grid offsets of every diamond and triangle. Triangles repeat their
/// first offset as the fourth.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiamondIndices {
    pub diamonds: Vec<[usize; 4]>,
    pub triangles: Vec<[usize; 4]>,
}

impl DiamondIndices {
    #[must_use]
    pub fn len(&self) -> usize {
        self.diamonds.len() + self.triangles.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.diamonds.is_empty() && self.triangles.is_empty()
    }
}

/// Index-only tessellation of a `divisions` grid.
#[must_use]
pub fn diamond_indices(divisions: GridDivisions) -> DiamondIndices {
    let mut indices = DiamondIndices::default();
    let to_offsets = |corners: Corners| corners.map(|(u, v)| divisions.index(u, v));
    for u in 0..divisions.u() {
        for v in 0..divisions.v() {
            cell_panels(u, v, divisions, |kind, corners| match kind {
                CellPanel::Diamond => indices.diamonds.push(to_offsets(corners)),
                CellPanel::Triangle => indices.triangles.push(to_offsets(corners)),
            });
        }
    }
    indices
}

/// Diamond and triangle panels, each in cell visiting order.
#[derive(Debug, Clone, PartialEq)]
pub struct DiamondPanels<P> {
    pub diamonds: Vec<P>,
    pub triangles: Vec<P>,
}

impl<P> Default for DiamondPanels<P> {
    fn default() -> Self {
        Self {
            diamonds: Vec::new(),
            triangles: Vec::new(),
        }
    }
}

pub fn diamonds_from_points<B: PanelBuilder>(
    grid: &PointGrid<'_>,
    builder: &B,
) -> Result<(DiamondPanels<B::Panel>, PanelDiagnostics), PanelError> {
    let mut ctx = GeomContext::new();
    diamonds_from_points_with_context(grid, builder, &mut ctx)
}

/// Tessellates `grid`, building each panel through `builder`.
///
/// Panels the builder rejects as degenerate are skipped and counted; any
/// other builder error, or cancellation, aborts without partial output.
pub fn diamonds_from_points_with_context<B: PanelBuilder>(
    grid: &PointGrid<'_>,
    builder: &B,
    ctx: &mut GeomContext<'_>,
) -> Result<(DiamondPanels<B::Panel>, PanelDiagnostics), PanelError> {
    let divisions = grid.divisions();
    let mut panels = DiamondPanels::default();
    let mut diagnostics = PanelDiagnostics::default();

    for u in 0..divisions.u() {
        ctx.check_cancelled()?;
        for v in 0..divisions.v() {
            diagnostics.cells_visited += 1;
            let mut failure = None;
            cell_panels(u, v, divisions, |kind, corners| {
                if failure.is_some() {
                    return;
                }
                match builder.panel_from_corners(grid.corners(corners)) {
                    Ok(panel) => match kind {
                        CellPanel::Diamond => panels.diamonds.push(panel),
                        CellPanel::Triangle => panels.triangles.push(panel),
                    },
                    Err(err) if err.is_degenerate() => {
                        log::warn!("skipping degenerate panel at cell ({u}, {v}): {err}");
                        diagnostics.skipped_degenerate += 1;
                    }
                    Err(err) => failure = Some(err),
                }
            });
            if let Some(err) = failure {
                return Err(err);
            }
        }
        ctx.report_progress(u + 1, divisions.u());
    }

    log::debug!(
        "diamond tessellation {}x{}: {} diamonds, {} triangles, {} skipped",
        divisions.u(),
        divisions.v(),
        panels.diamonds.len(),
        panels.triangles.len(),
        diagnostics.skipped_degenerate
    );
    Ok((panels, diagnostics))
}

/// Samples `surface` (reparameterized to the unit square) at the breakpoint
/// grid and tessellates the samples.
pub fn diamond_panels_on_surface<S: Surface, B: PanelBuilder>(
    surface: S,
    u_breaks: &[f64],
    v_breaks: &[f64],
    builder: &B,
    ctx: &mut GeomContext<'_>,
) -> Result<(DiamondPanels<B::Panel>, PanelDiagnostics), PanelError> {
    let divisions = GridDivisions::from_breakpoints(u_breaks, v_breaks)?;
    let unit = Reparameterized::unit(surface);
    let points = sample_surface_grid(&unit, u_breaks, v_breaks);
    let grid = PointGrid::new(&points, divisions)?;
    diamonds_from_points_with_context(&grid, builder, ctx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_by_one_grid_is_two_triangles() {
        let indices = diamond_indices(GridDivisions::new(1, 1).unwrap());
        assert!(indices.diamonds.is_empty());
        // offsets: (0,0)=0 (0,1)=1 (1,0)=2 (1,1)=3
        assert_eq!(indices.triangles, vec![[1, 2, 3, 1], [0, 2, 1, 0]]);
    }

    #[test]
    fn two_by_two_grid_has_centre_diamond() {
        let indices = diamond_indices(GridDivisions::new(2, 2).unwrap());
        // (0,1) (1,0) (2,1) (1,2)
        assert_eq!(indices.diamonds, vec![[1, 3, 7, 5]]);
        assert_eq!(indices.triangles.len(), 4);
        assert!(indices.triangles.iter().all(|t| t[0] == t[3]));
    }

    #[test]
    fn panel_counts_follow_parity() {
        let cases = [
            ((2, 3), (1, 5)),
            ((3, 3), (2, 6)),
            ((4, 4), (5, 8)),
            ((4, 2), (2, 6)),
            ((3, 4), (3, 7)),
            ((5, 5), (8, 10)),
            ((6, 6), (13, 12)),
        ];
        for ((u, v), (diamonds, triangles)) in cases {
            let indices = diamond_indices(GridDivisions::new(u, v).unwrap());
            assert_eq!(indices.diamonds.len(), diamonds, "diamonds for {u}x{v}");
            assert_eq!(indices.triangles.len(), triangles, "triangles for {u}x{v}");
        }
    }

    #[test]
    fn single_row_grids_are_all_triangles() {
        for n in 1..=6 {
            let row = diamond_indices(GridDivisions::new(n, 1).unwrap());
            assert!(row.diamonds.is_empty());
            assert_eq!(row.triangles.len(), n + 1);
            let column = diamond_indices(GridDivisions::new(1, n).unwrap());
            assert!(column.diamonds.is_empty());
            assert_eq!(column.triangles.len(), n + 1);
        }
    }

    #[test]
    fn indices_stay_inside_grid() {
        for u in 1..=7 {
            for v in 1..=7 {
                let divisions = GridDivisions::new(u, v).unwrap();
                let indices = diamond_indices(divisions);
                let max = divisions.point_count().unwrap();
                assert!(
                    indices
                        .diamonds
                        .iter()
                        .chain(&indices.triangles)
                        .flatten()
                        .all(|&i| i < max)
                );
            }
        }
    }
}
