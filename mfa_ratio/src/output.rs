use std::{io::Write, path::Path};

use anyhow::Context;
use compress_io::compress::CompressIo;

use crate::ratio::RatioRecord;

const GBROWSE_HINT: &str = "
Here are edits that you need to make to the Gbrowse config for these tracks,
change everything below the key = line in the existing config.
-------- 8< ----- 8< -------

autoscale = chromosome
description =

glyph           = wiggle_xyplot
graph_type      = line
height          = 100
color           = black
bgcolor         = mediumblue
fgcolour        = mediumblue
linewidth       = 2
max_score       = 2
min_score       = 0

-------- 8< ----- 8< -------
";

/// Fixed step wiggle output
pub struct TrackWriter<W: Write> {
    wrt: W,
    window: u64,
    n_records: usize,
}

impl<W: Write> TrackWriter<W> {
    pub fn new(wrt: W, window: u64) -> Self {
        Self {
            wrt,
            window,
            n_records: 0,
        }
    }

    /// Start a new contig.  The span is deliberately one less than the step
    pub fn write_header(&mut self, ctg: &str) -> anyhow::Result<()> {
        writeln!(
            self.wrt,
            "fixedStep  chrom={}  start=1  step={}  span={}",
            ctg,
            self.window,
            self.window - 1
        )
        .with_context(|| format!("Error writing track header for {}", ctg))
    }

    pub fn write_ratio(&mut self, r: &RatioRecord) -> anyhow::Result<()> {
        self.n_records += 1;
        writeln!(self.wrt, "{}", r).with_context(|| "Error writing track data")
    }

    /// Flush everything written for ctg
    pub fn end_contig(&mut self, ctg: &str) -> anyhow::Result<()> {
        self.wrt
            .flush()
            .with_context(|| format!("Error flushing output for {}", ctg))
    }

    pub fn n_records(&self) -> usize {
        self.n_records
    }

    pub fn finish(mut self) -> anyhow::Result<W> {
        self.wrt.flush().with_context(|| "Error flushing output")?;
        Ok(self.wrt)
    }
}

/// Open output file, or stdout if no path given
pub fn open_output(path: Option<&Path>) -> anyhow::Result<Box<dyn Write>> {
    let mut cio = CompressIo::new();
    if let Some(p) = path {
        debug!("Opening output file {}", p.display());
        cio.path(p);
    } else {
        debug!("Writing output to stdout");
    }
    let wrt = cio.bufwriter().with_context(|| match path {
        Some(p) => format!("Could not open output file {}", p.display()),
        None => "Could not open stdout for output".to_string(),
    })?;
    Ok(Box::new(wrt))
}

/// Configuration text for displaying the track in GBrowse
pub fn gbrowse_hint() -> &'static str {
    GBROWSE_HINT
}
