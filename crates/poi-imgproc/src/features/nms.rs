use super::harris::ResponseMap;

/// Whether the response at `(x, y)` is the maximum of the responses within
/// Chebyshev distance `radius`.
///
/// Only scored pixels take part. On ties the pixel that comes first in raster
/// order wins.
pub(crate) fn is_local_maximum(map: &ResponseMap, x: usize, y: usize, radius: usize) -> bool {
    let region = map.region();
    let score = map.at(x, y);

    let ny0 = y.saturating_sub(radius).max(region.y0);
    let ny1 = y.saturating_add(radius).saturating_add(1).min(region.y1);
    let nx0 = x.saturating_sub(radius).max(region.x0);
    let nx1 = x.saturating_add(radius).saturating_add(1).min(region.x1);

    for ny in ny0..ny1 {
        for nx in nx0..nx1 {
            if (nx, ny) == (x, y) {
                continue;
            }
            let other = map.at(nx, ny);
            if other > score || (other == score && (ny, nx) < (y, x)) {
                return false;
            }
        }
    }

    true
}
