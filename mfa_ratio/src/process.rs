use std::io::Write;

use anyhow::Context;

use crate::{
    config::Config,
    dataset::AlignmentStore,
    input::open_input,
    normalize::NormFactor,
    output::{gbrowse_hint, open_output, TrackWriter},
    ratio::calc_ratio,
    reference::check_references,
    window::{count_window, Windows},
};

/// Check the datasets are compatible and calculate the normalization factor.
/// Nothing has been written when this fails
pub fn prepare<A, B>(ds_a: &A, ds_b: &B) -> anyhow::Result<NormFactor>
where
    A: AlignmentStore + ?Sized,
    B: AlignmentStore + ?Sized,
{
    check_references(ds_a, ds_b)?;
    let norm = NormFactor::new(ds_a.total_mapped(), ds_b.total_mapped())?;
    debug!(
        "Mapped reads: {} and {}; normalization factor for second file: {}",
        ds_a.total_mapped(),
        ds_b.total_mapped(),
        norm.value()
    );
    Ok(norm)
}

/// Strategy
///
/// For each contig (in the order of the first dataset) write a track header,
/// then go through the windows in order, counting reads in both datasets and
/// writing the ratio as soon as it is calculated.  Contig lengths come from
/// the first dataset.  Returns the number of ratio records written
pub fn write_track<A, B, W>(
    ds_a: &mut A,
    ds_b: &mut B,
    norm: NormFactor,
    tw: &mut TrackWriter<W>,
    window: u64,
) -> anyhow::Result<usize>
where
    A: AlignmentStore + ?Sized,
    B: AlignmentStore + ?Sized,
    W: Write,
{
    let ctgs = ds_a.reference_names().to_vec();
    for ctg in ctgs.iter() {
        let seq_len = ds_a
            .reference_length(ctg)
            .with_context(|| format!("No length found for contig {}", ctg))?;
        debug!("Processing {} (length {})", ctg, seq_len);
        tw.write_header(ctg)?;
        for w in Windows::new(seq_len, window) {
            let obs = count_window(ds_a, ds_b, ctg, w)?;
            let r = calc_ratio(obs, norm, ctg, w)?;
            trace!("{}:{}-{} ratio {}", ctg, w.start, w.end, r.value());
            tw.write_ratio(&r)?;
        }
        tw.end_contig(ctg)?;
    }
    Ok(tw.n_records())
}

/// Run the complete pipeline described by cfg
pub fn process_samples(cfg: &Config) -> anyhow::Result<()> {
    debug!("Starting processing");
    let [f1, f2] = cfg.input();
    let mut ds_a = open_input(f1, cfg.threads(), cfg.sort_chunk())?;
    let mut ds_b = open_input(f2, cfg.threads(), cfg.sort_chunk())?;
    debug!(
        "Comparing {} with {}",
        ds_a.path().display(),
        ds_b.path().display()
    );
    let norm = prepare(&ds_a, &ds_b)?;

    let mut tw = TrackWriter::new(open_output(cfg.output())?, cfg.window());
    let n = write_track(&mut ds_a, &mut ds_b, norm, &mut tw, cfg.window())?;
    tw.finish()?;
    info!("Finished: {} windows written", n);

    if cfg.output().is_some() {
        eprint!("{}", gbrowse_hint());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{dataset::mem::MemDataset, error::TrackError};

    fn run(a: &mut MemDataset, b: &mut MemDataset, window: u64) -> anyhow::Result<String> {
        let norm = prepare(a, b)?;
        let mut tw = TrackWriter::new(Vec::new(), window);
        write_track(a, b, norm, &mut tw, window)?;
        Ok(String::from_utf8(tw.finish()?)?)
    }

    #[test]
    fn single_contig() {
        // The contig fits two windows exactly but only the first is written
        let mut a = MemDataset::new(&[("chr1", 5000)]);
        a.add_reads("chr1", 100, 50, 10)
            .add_reads("chr1", 3000, 50, 5)
            .set_total_mapped(100);
        let mut b = MemDataset::new(&[("chr1", 5000)]);
        b.add_reads("chr1", 100, 50, 5)
            .add_reads("chr1", 3000, 50, 5)
            .set_total_mapped(100);
        let out = run(&mut a, &mut b, 2500).unwrap();
        assert_eq!(
            out,
            "fixedStep  chrom=chr1  start=1  step=2500  span=2499\n2.000\n"
        );
    }

    #[test]
    fn two_contigs_with_normalization() {
        let mut a = MemDataset::new(&[("chr1", 400), ("chr2", 150)]);
        a.add_reads("chr1", 0, 10, 4)
            .add_reads("chr1", 120, 10, 2)
            .add_reads("chr2", 10, 10, 3)
            .set_total_mapped(2000);
        let mut b = MemDataset::new(&[("chr1", 400), ("chr2", 150)]);
        b.add_reads("chr1", 0, 10, 2)
            .add_reads("chr1", 210, 10, 2)
            .add_reads("chr2", 10, 10, 6)
            .set_total_mapped(1000);
        // Factor 2: windows of chr1 at 0, 100, 200; chr2 at 0
        let out = run(&mut a, &mut b, 100).unwrap();
        assert_eq!(
            out,
            "fixedStep  chrom=chr1  start=1  step=100  span=99\n\
             1.000\n1000.000\n0.000\n\
             fixedStep  chrom=chr2  start=1  step=100  span=99\n\
             0.250\n"
        );
    }

    #[test]
    fn short_contig_gets_header_only() {
        let mut a = MemDataset::new(&[("chrM", 16000)]);
        a.set_total_mapped(10);
        let mut b = MemDataset::new(&[("chrM", 16000)]);
        b.set_total_mapped(10);
        let out = run(&mut a, &mut b, 20000).unwrap();
        assert_eq!(out, "fixedStep  chrom=chrM  start=1  step=20000  span=19999\n");
        assert_eq!(a.n_queries, 0);
    }

    #[test]
    fn reference_mismatch_stops_before_counting() {
        let mut a = MemDataset::new(&[("chr1", 10000), ("chr2", 10000)]);
        a.set_total_mapped(10);
        let mut b = MemDataset::new(&[("chr1", 10000), ("chr3", 10000)]);
        b.set_total_mapped(10);
        let e = run(&mut a, &mut b, 2500).unwrap_err();
        assert_eq!(
            e.downcast_ref::<TrackError>(),
            Some(&TrackError::RefNameMismatch {
                index: 1,
                a: "chr2".into(),
                b: "chr3".into()
            })
        );
        assert_eq!(a.n_queries + b.n_queries, 0);
    }

    #[test]
    fn no_mapped_reads_stops_before_counting() {
        let mut a = MemDataset::new(&[("chr1", 10000)]);
        a.add_reads("chr1", 0, 10, 1);
        let mut b = MemDataset::new(&[("chr1", 10000)]);
        let e = run(&mut a, &mut b, 2500).unwrap_err();
        assert_eq!(
            e.downcast_ref::<TrackError>(),
            Some(&TrackError::NoMappedReads)
        );
        assert_eq!(a.n_queries + b.n_queries, 0);
    }

    #[test]
    fn degenerate_ratio_aborts_run() {
        // No mapped reads in the first file gives a zero factor.  The whole run
        // stops at the first window rather than skipping it
        let mut a = MemDataset::new(&[("chr1", 10000), ("chr2", 10000)]);
        a.set_total_mapped(0);
        let mut b = MemDataset::new(&[("chr1", 10000), ("chr2", 10000)]);
        b.add_reads("chr1", 0, 10, 1);
        let norm = prepare(&a, &b).unwrap();
        let mut tw = TrackWriter::new(Vec::new(), 2500);
        let e = write_track(&mut a, &mut b, norm, &mut tw, 2500).unwrap_err();
        assert_eq!(
            e.downcast_ref::<TrackError>(),
            Some(&TrackError::DegenerateRatio {
                ctg: "chr1".into(),
                start: 0,
                end: 2500
            })
        );
        assert_eq!(tw.n_records(), 0);
        assert_eq!(a.n_queries, 1);
    }
}
