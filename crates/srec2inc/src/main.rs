use clap::Parser;
use eyre_pretty::{Context, Result};
use srecfmt::PacketSize;
use std::{
    fs::File,
    io::{BufReader, BufWriter},
    path::PathBuf,
};

/// Converts Freescale DSP563xx S-records into a C header of PPP packets, for DSP images embedded
/// into MCU projects without a filesystem.
///
/// The S-records should be generated with `srec -S -R -A3`.
#[derive(Parser, Debug)]
#[command(version)]
struct Args {
    /// Size of each packet in bytes, PPP header included
    ///
    /// Must be a multiple of 3 and at least 9. Prefix with `0x` to give it in hex.
    #[arg(short = 'n', long, default_value_t = PacketSize::DEFAULT)]
    packet_size: PacketSize,
    /// Path to the input S-record file
    #[arg(short, long)]
    input: PathBuf,
    /// Path to the output file
    #[arg(short, long, default_value = "default.inc")]
    output: PathBuf,
}

fn setup_tracing() {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let stderr_layer = fmt::layer().with_writer(std::io::stderr);
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or(EnvFilter::new("srec2inc=info,srecfmt=info"));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(env_filter)
        .init();
}

fn main() -> Result<()> {
    eyre_pretty::install()?;
    setup_tracing();

    let args = Args::parse();

    let input = File::open(&args.input).context("opening input file")?;
    let output = File::create(&args.output).context("creating output file")?;

    let summary = srecfmt::convert(
        BufReader::new(input),
        BufWriter::new(output),
        args.packet_size,
    )
    .context("converting s-records")?;

    tracing::info!(
        records = summary.switches + summary.data + summary.end_of_file + summary.unsupported,
        packets = summary.packets,
        "wrote {}",
        args.output.display()
    );

    Ok(())
}
