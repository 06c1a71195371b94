use anyhow::{bail, Context};
use bee_rs::api::command::Command;
use bee_rs::api::frame::{decode_wire, encode};
use bee_rs::config::BeeConfig;
use bee_rs::engine::{Engine, NoopWatchdog};
use bee_rs::radio::{LoopbackRadio, RadioEventQueue};
use bee_rs::util::hex::{format_hex_compact, parse_hex_lenient};
use bee_rs::{init_logger_with_level, log_info, SerialUart};
use clap::{Parser, Subcommand};
use log::LevelFilter;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "bee-cli")]
#[command(about = "XBee-compatible API frame engine harness")]
struct Cli {
    /// Log debug output (frame dumps included)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve API frames on a serial port against a loopback radio
    Run {
        #[arg(short, long)]
        port: Option<String>,
        #[arg(short, long)]
        baud: Option<u32>,
        /// JSON configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(long, default_value = "10")]
        poll_ms: u64,
        /// Echo every transmitted payload back as a received packet
        #[arg(long)]
        echo: bool,
    },
    /// Print the default configuration as JSON
    Defaults,
    /// Frame a payload given in hex and print the wire bytes
    Encode { payload: String },
    /// Decode wire bytes given in hex and describe the command
    Decode {
        wire: String,
        #[arg(long, default_value = "100")]
        capacity: usize,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    init_logger_with_level(level).context("failed to initialise logging")?;

    match cli.command {
        Commands::Run {
            port,
            baud,
            config,
            poll_ms,
            echo,
        } => {
            let mut config = match config {
                Some(path) => BeeConfig::load(&path)
                    .with_context(|| format!("failed to load {}", path.display()))?,
                None => BeeConfig::default(),
            };
            if let Some(port) = port {
                config.serial.port = port;
            }
            if let Some(baud) = baud {
                config.serial.baudrate = baud;
            }
            config.validate()?;
            run(config, Duration::from_millis(poll_ms.max(1)), echo).await?;
        }
        Commands::Defaults => {
            println!("{}", BeeConfig::default().to_json_pretty()?);
        }
        Commands::Encode { payload } => {
            let payload = parse_hex_lenient(&payload).context("invalid payload hex")?;
            let wire = encode(&payload)?;
            println!("{}", format_hex_compact(&wire));
        }
        Commands::Decode { wire, capacity } => {
            let wire = parse_hex_lenient(&wire).context("invalid frame hex")?;
            let frame = decode_wire(&wire, capacity)?;
            println!("payload:  {}", format_hex_compact(frame.payload()));
            println!("checksum: {:02X}", frame.checksum());
            match Command::parse(frame.payload()) {
                Ok(command) => println!("command:  {command:?}"),
                Err(e) => bail!("{e}"),
            }
        }
    }

    Ok(())
}

async fn run(config: BeeConfig, poll_interval: Duration, echo: bool) -> anyhow::Result<()> {
    let uart = SerialUart::open(&config.serial)
        .with_context(|| format!("failed to open {}", config.serial.port))?;
    let events = RadioEventQueue::new(config.event_queue_depth);
    let radio = LoopbackRadio::new(events.handle()).with_echo(echo);
    let mut engine = Engine::new(&config, uart, radio, NoopWatchdog, events);

    log_info(&format!(
        "Serving {} at {} baud",
        config.serial.port, config.serial.baudrate
    ));

    let mut interval = tokio::time::interval(poll_interval);
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);
    loop {
        tokio::select! {
            _ = &mut shutdown => {
                log_info("Interrupted, shutting down");
                break;
            }
            _ = interval.tick() => {
                engine.run_until_idle()?;
                if engine.state() == bee_rs::EngineState::Reset {
                    log_info("Software reset received, exiting");
                    break;
                }
            }
        }
    }

    let stats = engine.stats();
    log_info(&format!(
        "Frames received {}, discarded {}, responses {}, transmits {}",
        stats.frames_received, stats.frames_discarded, stats.responses_sent, stats.transmits
    ));
    Ok(())
}
