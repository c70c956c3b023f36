use std::{
    num::{NonZeroU32, NonZeroUsize},
    path::PathBuf,
};

use clap::{
    crate_authors, crate_description, crate_name, crate_version, value_parser, Arg, Command,
};

use utils::{init_log, log_args};

use crate::config::Config;

/// Set up definition of command options for clap
fn cli_model() -> Command {
    Command::new(crate_name!())
        .about(crate_description!())
        .version(crate_version!())
        .author(crate_authors!())
        .args(log_args())
        .arg(
            Arg::new("threads")
                .short('t')
                .long("threads")
                .value_parser(value_parser!(NonZeroUsize))
                .value_name("INT")
                .help("Set number of decompression threads per input file [default: available cores]"),
        )
        .arg(
            Arg::new("sort_chunk")
                .short('m')
                .long("sort-chunk")
                .value_parser(value_parser!(NonZeroUsize))
                .value_name("INT")
                .default_value("1000000")
                .help("Set maximum number of records held in memory when sorting an unindexed input"),
        )
        .arg(
            Arg::new("window")
                .short('w')
                .long("window")
                .value_parser(value_parser!(NonZeroU32))
                .value_name("INT")
                .default_value("2500")
                .help("Set window size in bases for binning the depth data"),
        )
        .arg(
            Arg::new("wig")
                .short('o')
                .long("wig")
                .value_parser(value_parser!(PathBuf))
                .value_name("PATH")
                .help("Set output wiggle file [default: stdout]"),
        )
        .arg(
            Arg::new("file1")
                .long("file1")
                .value_parser(value_parser!(PathBuf))
                .value_name("BAM")
                .required(true)
                .help("First input BAM file (the ratio is first/second)"),
        )
        .arg(
            Arg::new("file2")
                .long("file2")
                .value_parser(value_parser!(PathBuf))
                .value_name("BAM")
                .required(true)
                .help("Second input BAM file (the ratio is first/second)"),
        )
}

/// Handle command line options.  Set up Config structure
pub fn handle_cli() -> anyhow::Result<Config> {
    // Get matches from command line
    let m = cli_model().get_matches();

    // Setup logging
    init_log(&m)?;

    debug!("Processing command line options");

    let nt = m
        .get_one::<NonZeroUsize>("threads")
        .map(|x| usize::from(*x))
        .unwrap_or_else(num_cpus::get);

    let window = u32::from(
        *m.get_one::<NonZeroU32>("window")
            .expect("Missing default window size"),
    ) as u64;

    let file1 = m
        .get_one::<PathBuf>("file1")
        .expect("Missing first input file")
        .clone();
    let file2 = m
        .get_one::<PathBuf>("file2")
        .expect("Missing second input file")
        .clone();

    let mut cfg = Config::new(file1, file2, window);

    if let Some(p) = m.get_one::<PathBuf>("wig") {
        cfg.set_output(p.to_owned())
    }

    cfg.set_threads(nt);

    let sort_chunk = usize::from(
        *m.get_one::<NonZeroUsize>("sort_chunk")
            .expect("Missing default sort chunk size"),
    );
    cfg.set_sort_chunk(sort_chunk);

    debug!(
        "Window size: {}, threads: {}, sort chunk: {}, output: {}",
        window,
        nt,
        sort_chunk,
        cfg.output()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "<stdout>".to_string())
    );

    Ok(cfg)
}
