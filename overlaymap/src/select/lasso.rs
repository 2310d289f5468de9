//! Freehand lasso selection.

use tracing::debug;

use super::{SelectionError, SelectionMask};

/// Minimum vertex count for a lasso.
pub const MIN_LASSO_POINTS: usize = 3;

/// Selects every pixel whose centre lies inside the polygon `points`.
///
/// Containment uses the even-odd rule: a horizontal ray from the pixel
/// centre towards +x must cross the polygon's edges an odd number of times.
/// The polygon is closed implicitly.
pub fn lasso_select(
    width: u32,
    height: u32,
    points: &[(f64, f64)],
) -> Result<SelectionMask, SelectionError> {
    if points.len() < MIN_LASSO_POINTS {
        return Err(SelectionError::InsufficientPoints {
            count: points.len(),
        });
    }

    let mut mask = SelectionMask::new(width, height);
    let mut crossings: Vec<f64> = Vec::new();

    for y in 0..height {
        let cy = y as f64 + 0.5;
        crossings.clear();
        for (a, b) in edges(points) {
            if let Some(x) = crossing(a, b, cy) {
                crossings.push(x);
            }
        }
        if crossings.is_empty() {
            continue;
        }
        crossings.sort_by(f64::total_cmp);

        // Crossings at or left of the cursor are behind the ray.
        let mut behind = 0;
        for x in 0..width {
            let cx = x as f64 + 0.5;
            while behind < crossings.len() && crossings[behind] <= cx {
                behind += 1;
            }
            if (crossings.len() - behind) % 2 == 1 {
                mask.set(x, y, true);
            }
        }
    }

    debug!(
        vertices = points.len(),
        selected = mask.count(),
        "Lasso selection complete"
    );
    Ok(mask)
}

/// Even-odd containment test for a single point.
pub fn point_in_polygon(px: f64, py: f64, points: &[(f64, f64)]) -> bool {
    edges(points)
        .filter_map(|(a, b)| crossing(a, b, py))
        .filter(|&x| px < x)
        .count()
        % 2
        == 1
}

fn edges(points: &[(f64, f64)]) -> impl Iterator<Item = ((f64, f64), (f64, f64))> + '_ {
    let n = points.len();
    (0..n).map(move |i| (points[(i + n - 1) % n], points[i]))
}

/// Where the edge `a → b` crosses the horizontal line `y`, if it does.
///
/// Each edge is treated as half-open in y so a vertex lying exactly on the
/// line is counted once.
#[inline]
fn crossing(a: (f64, f64), b: (f64, f64), y: f64) -> Option<f64> {
    let ((xi, yi), (xj, yj)) = (a, b);
    if (yi > y) != (yj > y) {
        Some((xj - xi) * (y - yi) / (yj - yi) + xi)
    } else {
        None
    }
}
