use std::{
    cmp::Reverse,
    collections::BinaryHeap,
    path::{Path, PathBuf},
};

use anyhow::Context;
use rust_htslib::bam::{self, Read};

/// Default number of records held in memory at once while sorting
pub const DEFAULT_CHUNK_SIZE: usize = 1_000_000;

type SortKey = (u32, i64);

// tid of -1 (no reference) becomes u32::MAX so these records go last
fn sort_key(r: &bam::Record) -> SortKey {
    (r.tid() as u32, r.pos())
}

fn create_writer(p: &Path, header: &bam::Header, threads: usize) -> anyhow::Result<bam::Writer> {
    let mut wrt = bam::Writer::from_path(p, header, bam::Format::Bam)
        .with_context(|| format!("Could not create output file {}", p.display()))?;
    if threads > 1 {
        wrt.set_threads(threads)?;
    }
    Ok(wrt)
}

fn write_records(wrt: &mut bam::Writer, recs: &[bam::Record], p: &Path) -> anyhow::Result<()> {
    for r in recs.iter() {
        wrt.write(r)
            .with_context(|| format!("Error writing to {}", p.display()))?;
    }
    Ok(())
}

/// Read the next record into rec, returning false at end of file
fn read_next(rdr: &mut bam::Reader, rec: &mut bam::Record, p: &Path) -> anyhow::Result<bool> {
    match rdr.read(rec) {
        Some(r) => {
            r.with_context(|| format!("Error reading from {}", p.display()))?;
            Ok(true)
        }
        None => Ok(false),
    }
}

/// Coordinate sort the BAM file `input` into `output`.
///
/// At most `chunk_size` records are kept in memory.  Each full chunk is sorted
/// and written as a temporary run in a scratch directory next to `output`,
/// and the runs are then merged.  Input order is kept for records with the
/// same position.
pub fn sort_bam(
    input: &Path,
    output: &Path,
    threads: usize,
    chunk_size: usize,
) -> anyhow::Result<()> {
    let chunk_size = chunk_size.max(1);
    let mut rdr = bam::Reader::from_path(input)
        .with_context(|| format!("Failed to open input file {}", input.display()))?;
    if threads > 1 {
        rdr.set_threads(threads)?;
    }
    let header = bam::Header::from_template(rdr.header());

    let dir = output
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let scratch = tempfile::Builder::new()
        .prefix(".mfa_sort")
        .tempdir_in(dir)
        .with_context(|| format!("Could not create temporary directory in {}", dir.display()))?;

    let mut runs: Vec<PathBuf> = Vec::new();
    let mut recs = Vec::with_capacity(chunk_size.min(DEFAULT_CHUNK_SIZE));
    let mut n_recs = 0;
    for r in rdr.records() {
        recs.push(r.with_context(|| format!("Error reading from {}", input.display()))?);
        n_recs += 1;
        if recs.len() >= chunk_size {
            let p = scratch.path().join(format!("run_{}.bam", runs.len()));
            trace!("Writing sorted run {}", p.display());
            recs.sort_by_key(sort_key);
            let mut wrt = create_writer(&p, &header, threads)?;
            write_records(&mut wrt, &recs, &p)?;
            recs.clear();
            runs.push(p);
        }
    }
    debug!(
        "Read {} records from {}; {} sorted runs on disk",
        n_recs,
        input.display(),
        runs.len()
    );
    recs.sort_by_key(sort_key);

    let mut wrt = create_writer(output, &header, threads)?;
    if runs.is_empty() {
        write_records(&mut wrt, &recs, output)
    } else {
        // The records still in memory form the last run
        if !recs.is_empty() {
            let p = scratch.path().join(format!("run_{}.bam", runs.len()));
            let mut run_wrt = create_writer(&p, &header, threads)?;
            write_records(&mut run_wrt, &recs, &p)?;
            runs.push(p);
        }
        drop(recs);
        merge_runs(&runs, &mut wrt, output)
    }
}

/// k-way merge of sorted runs.  Ties are broken by run index, and runs are
/// in input order, so the merge is stable
fn merge_runs(runs: &[PathBuf], wrt: &mut bam::Writer, output: &Path) -> anyhow::Result<()> {
    let mut sources = Vec::with_capacity(runs.len());
    let mut heap: BinaryHeap<Reverse<(SortKey, usize)>> = BinaryHeap::with_capacity(runs.len());
    for (ix, p) in runs.iter().enumerate() {
        let mut rdr = bam::Reader::from_path(p)
            .with_context(|| format!("Failed to open temporary file {}", p.display()))?;
        let mut rec = bam::Record::new();
        if read_next(&mut rdr, &mut rec, p)? {
            heap.push(Reverse((sort_key(&rec), ix)));
        }
        sources.push((rdr, rec));
    }

    while let Some(Reverse((_, ix))) = heap.pop() {
        let (rdr, rec) = &mut sources[ix];
        wrt.write(rec)
            .with_context(|| format!("Error writing to {}", output.display()))?;
        if read_next(rdr, rec, &runs[ix])? {
            heap.push(Reverse((sort_key(rec), ix)));
        }
    }
    Ok(())
}
