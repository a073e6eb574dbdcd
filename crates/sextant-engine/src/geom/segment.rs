//! Splitting polylines at projection seams.

use std::ops::Range;

use crate::coords::Vec3;
use crate::projector::Projector;

/// Splits the polyline `0..len` into maximal runs of consecutive indices.
///
/// Pairs `(i, i + 1)` for which `breaks` is true end the current run at `i`.
/// A point rejected by `keep` never joins a run and ends the current one,
/// wherever it sits in the polyline. Runs shorter than two points are dropped.
pub fn segment_polyline(
    len: usize,
    mut breaks: impl FnMut(usize, usize) -> bool,
    mut keep: impl FnMut(usize) -> bool,
) -> Vec<Range<usize>> {
    let mut runs = Vec::new();
    let mut run: Option<Range<usize>> = None;

    let flush = |run: &mut Option<Range<usize>>, runs: &mut Vec<Range<usize>>| {
        if let Some(r) = run.take() {
            if r.len() >= 2 {
                runs.push(r);
            }
        }
    };
    let extend = |run: &mut Option<Range<usize>>, i: usize| match run {
        Some(r) => r.end = i + 1,
        None => *run = Some(i..i + 1),
    };

    for i in 0..len.saturating_sub(1) {
        if breaks(i, i + 1) {
            if run.is_some() && keep(i) {
                extend(&mut run, i);
            }
            flush(&mut run, &mut runs);
            continue;
        }
        if !keep(i) {
            flush(&mut run, &mut runs);
            continue;
        }
        extend(&mut run, i);
        if i + 2 == len {
            if keep(i + 1) {
                extend(&mut run, i + 1);
            }
            flush(&mut run, &mut runs);
        }
    }
    runs
}

/// Runs of `points` (unit directions) that do not cross a seam of `prj`.
pub fn segment_by_discontinuity<P: Projector + ?Sized>(prj: &P, points: &[Vec3]) -> Vec<Range<usize>> {
    segment_polyline(
        points.len(),
        |i, j| prj.intersects_discontinuity(points[i], points[j]),
        |_| true,
    )
}
