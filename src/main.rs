use angio_volume::{DicomSliceSource, MetaImageSink, SeriesAssembler, config::Cli};

use clap::Parser;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    info!("inputs:");
    if cli.verbose {
        info!("\t-v");
    }
    info!("\t-i {}", cli.input.display());
    info!("\t-o {}", cli.output.display());

    let assembler = SeriesAssembler::new(DicomSliceSource::new(cli.series_selection()))
        .with_extractor(cli.extractor())
        .with_execution(cli.execution());

    match assembler.assemble_into(&cli.input, &MetaImageSink, &cli.output) {
        Ok(volume) => {
            let [width, height, depth] = volume.size();
            println!(
                "Output volume wrote with {} ({}x{}x{})",
                cli.output.display(),
                width,
                height,
                depth
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("{}", err);
            ExitCode::FAILURE
        }
    }
}

/// Logs go to stderr; stdout only carries the final message.
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "angio_volume=debug,read_angio=debug"
    } else {
        "angio_volume=info,read_angio=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
