use anyhow::Result;
use asktx::clock;
use asktx::consts::{CRYSTAL_HZ, DEFAULT_CHUNK_LEN, DEFAULT_SYMBOL_RATE};
use asktx::driver::TxSession;
use asktx::encoding;
use asktx::port::UsbPort;
use clap::Parser;
use log::info;
use std::num::NonZeroUsize;

#[derive(Debug, Parser)]
#[clap(name = "asktx", version)]
#[clap(about = "Replay a 433 MHz ASK remote-control bitstream through a USB serial-clock adapter.", long_about = None)]
struct Cli {
    /// The command sequence to transmit, as a string of 0s and 1s.
    bits: String,

    /// Target symbol rate in line-code units per second.
    #[clap(short, long, default_value_t = DEFAULT_SYMBOL_RATE)]
    rate: u32,

    /// Largest number of bytes issued in a single data transfer.
    #[clap(short, long, default_value_t = DEFAULT_CHUNK_LEN)]
    chunk: NonZeroUsize,

    /// How many times to send the frame on air.
    #[clap(long, default_value = "1")]
    repeat: NonZeroUsize,

    /// Carrier-off filler bytes between repeated frames.
    #[clap(long, default_value_t = 4)]
    gap: usize,

    /// Encode and pick divisors, print the frame, but touch no device.
    #[clap(long)]
    dry_run: bool,
}

fn hex(frame: &[u8]) -> String {
    frame.iter().map(|byte| format!("{byte:02x}")).collect()
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    // Input validation and divisor search both happen before the device is
    // opened; bad input never causes a device call.
    let frame = encoding::encode(&cli.bits)?;
    let pair = clock::divisors_for(cli.rate, CRYSTAL_HZ, clock::prescale_candidates(), 1..=u8::MAX)?;
    info!(
        "{} bits -> {} bytes, N={} M={} ({:.1} Sym/s)",
        cli.bits.len(),
        frame.len(),
        pair.prescale,
        pair.divisor,
        pair.actual_rate(CRYSTAL_HZ)
    );

    println!("{}", hex(&frame));
    if cli.dry_run {
        println!("dry run, nothing sent");
        return Ok(());
    }

    let stream = encoding::repeat_frame(&frame, cli.repeat.get(), cli.gap);
    let mut session = TxSession::new(UsbPort::open()?, cli.chunk);
    session.configure(&pair)?;
    session.transmit(&stream)?;

    println!("ok, sent {} bytes x{}", frame.len(), cli.repeat);
    Ok(())
}
