use crate::geom::{
    CancellationToken, CornerPanelBuilder, FourPointSurface, GeomContext, GridDivisions, Panel,
    PanelError, PanelShape, Point3, PointGrid, diamond_panels_on_surface, diamonds_from_points,
    diamonds_from_points_with_context,
};

fn lattice(u_div: usize, v_div: usize) -> Vec<Point3> {
    let mut points = Vec::with_capacity((u_div + 1) * (v_div + 1));
    for u in 0..=u_div {
        for v in 0..=v_div {
            #[allow(clippy::cast_precision_loss)]
            points.push(Point3::new(u as f64, v as f64, 0.0));
        }
    }
    points
}

/// Strict containment of `(x, y)` in a convex panel, in the XY plane.
fn panel_contains(panel: &Panel, x: f64, y: f64) -> bool {
    let vertices = panel.vertices();
    let mut sign = 0.0_f64;
    for (i, a) in vertices.iter().enumerate() {
        let b = vertices[(i + 1) % vertices.len()];
        let cross = (b.x - a.x) * (y - a.y) - (b.y - a.y) * (x - a.x);
        if cross.abs() < 1e-12 {
            return false;
        }
        if sign == 0.0 {
            sign = cross.signum();
        } else if sign != cross.signum() {
            return false;
        }
    }
    true
}

#[test]
fn diamond_tessellation_tiles_every_small_grid() {
    let builder = CornerPanelBuilder::default();
    for u_div in 1..=6 {
        for v_div in 1..=6 {
            let points = lattice(u_div, v_div);
            let grid = PointGrid::with_counts(&points, u_div, v_div).unwrap();
            let (panels, diagnostics) = diamonds_from_points(&grid, &builder).unwrap();
            assert_eq!(diagnostics.skipped_degenerate, 0);
            assert_eq!(diagnostics.cells_visited, u_div * v_div);
            assert!(panels.diamonds.iter().all(|p| p.shape == PanelShape::Quad));
            assert!(panels.triangles.iter().all(|p| p.shape == PanelShape::Triangle));

            let all: Vec<&Panel> = panels.diamonds.iter().chain(&panels.triangles).collect();
            let area: f64 = all.iter().map(|p| p.area()).sum();
            #[allow(clippy::cast_precision_loss)]
            let expected = (u_div * v_div) as f64;
            assert!((area - expected).abs() < 1e-9, "area for {u_div}x{v_div}: {area}");

            // sample off-lattice points: each must be covered exactly once
            for i in 0..u_div * 5 {
                for j in 0..v_div * 5 {
                    #[allow(clippy::cast_precision_loss)]
                    let (x, y) = ((i as f64 + 0.37) / 5.0, (j as f64 + 0.61) / 5.0);
                    let hits = all.iter().filter(|p| panel_contains(p, x, y)).count();
                    assert_eq!(hits, 1, "{u_div}x{v_div} coverage at ({x}, {y})");
                }
            }
        }
    }
}

#[test]
fn two_by_two_lattice_matches_corner_layout() {
    let points = lattice(2, 2);
    let grid = PointGrid::with_counts(&points, 2, 2).unwrap();
    let (panels, _) = diamonds_from_points(&grid, &CornerPanelBuilder::default()).unwrap();

    assert_eq!(panels.triangles.len(), 4);
    assert_eq!(panels.diamonds.len(), 1);
    assert_eq!(
        panels.diamonds[0].corners,
        [
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(2.0, 1.0, 0.0),
            Point3::new(1.0, 2.0, 0.0),
        ]
    );
    let corners: Vec<Point3> = panels.triangles.iter().map(|t| t.corners[0]).collect();
    assert!(corners.contains(&Point3::new(0.0, 0.0, 0.0)));
    assert!(corners.contains(&Point3::new(0.0, 1.0, 0.0)));
    assert!(corners.contains(&Point3::new(1.0, 0.0, 0.0)));
    assert!(corners.contains(&Point3::new(1.0, 2.0, 0.0)));
}

#[test]
fn wrong_grid_length_fails_fast() {
    let points = lattice(2, 2);
    let err = PointGrid::new(&points[..8], GridDivisions::new(2, 2).unwrap()).unwrap_err();
    assert!(err.is_invalid_argument());
}

#[test]
fn degenerate_panels_are_skipped() {
    // collapse the bottom row so triangles touching it have no area
    let mut points = lattice(2, 2);
    for u in 0..=2 {
        points[u * 3] = Point3::new(0.0, 0.0, 0.0);
    }
    let grid = PointGrid::with_counts(&points, 2, 2).unwrap();
    let (panels, diagnostics) = diamonds_from_points(&grid, &CornerPanelBuilder::default()).unwrap();
    assert!(diagnostics.skipped_degenerate > 0);
    assert_eq!(
        panels.diamonds.len() + panels.triangles.len() + diagnostics.skipped_degenerate,
        5
    );
}

#[test]
fn builder_errors_other_than_degenerate_abort() {
    let points = lattice(3, 3);
    let grid = PointGrid::with_counts(&points, 3, 3).unwrap();
    let builder = |_corners: [Point3; 4]| -> Result<(), PanelError> { Err(PanelError::Cancelled) };
    assert_eq!(diamonds_from_points(&grid, &builder).unwrap_err(), PanelError::Cancelled);
}

#[test]
fn cancellation_between_rows_returns_no_output() {
    let points = lattice(4, 4);
    let grid = PointGrid::with_counts(&points, 4, 4).unwrap();
    let token = CancellationToken::new();
    let cancel = token.clone();
    let mut reports = 0;
    let result = {
        let mut ctx = GeomContext::new()
            .with_cancellation(token)
            .with_progress(|_| {
                reports += 1;
                cancel.cancel();
            });
        diamonds_from_points_with_context(&grid, &CornerPanelBuilder::default(), &mut ctx)
    };
    assert_eq!(result.unwrap_err(), PanelError::Cancelled);
    assert_eq!(reports, 1);
}

#[test]
fn progress_reaches_one() {
    let points = lattice(3, 2);
    let grid = PointGrid::with_counts(&points, 3, 2).unwrap();
    let mut fractions = Vec::new();
    {
        let mut ctx = GeomContext::new().with_progress(|f| fractions.push(f));
        diamonds_from_points_with_context(&grid, &CornerPanelBuilder::default(), &mut ctx).unwrap();
    }
    assert_eq!(fractions.len(), 3);
    assert!((fractions[2] - 1.0).abs() < 1e-12);
}

#[test]
fn surface_diamonds_sample_at_breakpoints() {
    let surface = FourPointSurface::new([
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(4.0, 0.0, 0.0),
        Point3::new(4.0, 4.0, 0.0),
        Point3::new(0.0, 4.0, 0.0),
    ]);
    let breaks = [0.0, 0.25, 0.5, 0.75, 1.0];
    let mut ctx = GeomContext::new();
    let (panels, _) = diamond_panels_on_surface(
        surface,
        &breaks,
        &breaks,
        &CornerPanelBuilder::default(),
        &mut ctx,
    )
    .unwrap();
    assert_eq!(panels.diamonds.len(), 5);
    assert_eq!(panels.triangles.len(), 8);
    let area: f64 = panels
        .diamonds
        .iter()
        .chain(&panels.triangles)
        .map(Panel::area)
        .sum();
    assert!((area - 16.0).abs() < 1e-9);
}
