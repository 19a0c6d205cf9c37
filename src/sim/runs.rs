/// Run-length form of the dirty mask.
///
/// A row of dirty flags becomes a sorted list of `Run`s. Runs from the
/// previous frame (where sprites were) and the current one (where they
/// are now) are unioned per row and turned into pixel rectangles; those
/// rectangles are the only parts of the screen that need presenting.

use crate::domain::geometry::PixelRect;

/// Horizontal interval of tiles: `start..start + len`.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub struct Run {
    pub start: usize,
    pub len: usize,
}

impl Run {
    pub const fn new(start: usize, len: usize) -> Self {
        Run { start, len }
    }

    #[inline]
    pub fn end(&self) -> usize {
        self.start + self.len
    }
}

/// One list of runs per tile row.
pub type DirtyRuns = Vec<Vec<Run>>;

/// Maximal runs of `true` in a row of flags.
pub fn bools_to_runs(row: &[bool]) -> Vec<Run> {
    let mut runs = Vec::new();
    let mut start = None;
    for (i, &flag) in row.iter().enumerate() {
        match (flag, start) {
            (true, None) => start = Some(i),
            (false, Some(s)) => {
                runs.push(Run::new(s, i - s));
                start = None;
            }
            _ => {}
        }
    }
    if let Some(s) = start {
        runs.push(Run::new(s, row.len() - s));
    }
    runs
}

/// Union of several run lists.
///
/// Output is sorted; overlapping and touching runs are merged and
/// zero-length runs dropped.
pub fn union_runs(sets: &[&[Run]]) -> Vec<Run> {
    let mut all: Vec<Run> = sets
        .iter()
        .flat_map(|set| set.iter().copied())
        .filter(|r| r.len > 0)
        .collect();
    all.sort_unstable();

    let mut out = Vec::with_capacity(all.len());
    let mut current: Option<Run> = None;
    for run in all {
        if let Some(cur) = current.as_mut() {
            if cur.end() >= run.start {
                cur.len = cur.len.max(run.end() - cur.start);
                continue;
            }
            out.push(*cur);
        }
        current = Some(run);
    }
    if let Some(cur) = current {
        out.push(cur);
    }
    out
}

/// Row-wise union of last frame's runs with this frame's.
pub fn union_old_new(old: &[Vec<Run>], new: &[Vec<Run>]) -> DirtyRuns {
    let rows = old.len().max(new.len());
    (0..rows)
        .map(|y| {
            let a = old.get(y).map(Vec::as_slice).unwrap_or(&[]);
            let b = new.get(y).map(Vec::as_slice).unwrap_or(&[]);
            union_runs(&[a, b])
        })
        .collect()
}

/// One pixel rectangle per run; row `y` spans `y*th .. (y+1)*th`.
pub fn runs_to_rects(runs: &[Vec<Run>], tile_w: i32, tile_h: i32) -> Vec<PixelRect> {
    runs.iter()
        .enumerate()
        .flat_map(|(y, row)| {
            row.iter().map(move |r| {
                PixelRect::new(
                    r.start as i32 * tile_w,
                    y as i32 * tile_h,
                    r.len as i32 * tile_w,
                    tile_h,
                )
            })
        })
        .collect()
}
