use crate::dataset::AlignmentStore;

/// Half open interval [start, end) on a contig
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub start: u64,
    pub end: u64,
}

/// Iterator over the windows of a contig.
///
/// Windows start at 0, size, 2*size... while start < seq_len - size, so the
/// last window is always dropped, even when it would fit exactly.  Contigs no
/// longer than the window size give no windows.
#[derive(Debug, Clone)]
pub struct Windows {
    next: u64,
    limit: u64,
    size: u64,
}

impl Windows {
    pub fn new(seq_len: u64, size: u64) -> Self {
        assert!(size > 0, "Window size must be positive");
        Self {
            next: 0,
            limit: seq_len.saturating_sub(size),
            size,
        }
    }
}

impl Iterator for Windows {
    type Item = Window;

    fn next(&mut self) -> Option<Window> {
        if self.next < self.limit {
            let start = self.next;
            self.next += self.size;
            Some(Window {
                start,
                end: start + self.size,
            })
        } else {
            None
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = if self.next < self.limit {
            ((self.limit - self.next + self.size - 1) / self.size) as usize
        } else {
            0
        };
        (n, Some(n))
    }
}

impl ExactSizeIterator for Windows {}

/// Raw read counts for one window in the two datasets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowObservation {
    pub count_a: u64,
    pub count_b: u64,
}

/// Count reads overlapping window `w` of `ctg` in both datasets
pub fn count_window<A, B>(
    ds_a: &mut A,
    ds_b: &mut B,
    ctg: &str,
    w: Window,
) -> anyhow::Result<WindowObservation>
where
    A: AlignmentStore + ?Sized,
    B: AlignmentStore + ?Sized,
{
    let count_a = ds_a.count_overlapping(ctg, w.start, w.end)?;
    let count_b = ds_b.count_overlapping(ctg, w.start, w.end)?;
    trace!("{}:{}-{} counts: {} {}", ctg, w.start, w.end, count_a, count_b);
    Ok(WindowObservation { count_a, count_b })
}
