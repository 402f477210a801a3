use anyhow::{anyhow, Result};
use clap::{Args, Parser, Subcommand};
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

use serdrive::identify::{IdentifyBuffer, IdentifyRequest, PROTOCOL_VERSION};
use serdrive::image::{AttachOptions, DiskImage, ImageSize};
use serdrive::profile::{MismatchSeverity, OverflowPolicy, Profile};
use serdrive::{serial, Chs};

#[derive(Parser)]
#[command(about = "Serial drive geometry and identify utility")]
struct Cli {
    /// Use the first protocol generation (LBA28, 1024 cylinders, old vendor words)
    #[arg(long, global = true)]
    legacy: bool,
    /// Treat a geometry that doesn't match the file size as a warning
    #[arg(long, global = true)]
    lenient_geometry: bool,
    /// Refuse images whose derived geometry has too many cylinders instead of clamping
    #[arg(long, global = true)]
    strict_cylinders: bool,
    /// More logging (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct Drive {
    #[arg(short, long)]
    input: PathBuf,
    /// Explicit geometry, 'C:H:S' or 'CxHxS'
    #[arg(short, long, value_parser = parse_geometry)]
    geometry: Option<Chs>,
    /// Address the drive by CHS instead of LBA
    #[arg(long)]
    chs: bool,
    #[arg(long)]
    read_only: bool,
    #[arg(long, default_value_t = 0)]
    drive: u8,
}

impl Drive {
    fn options(&self) -> AttachOptions {
        AttachOptions {
            geometry: self.geometry,
            use_chs: self.chs,
            read_only: self.read_only,
            drive_index: self.drive,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve and show an image's geometry
    Info {
        #[command(flatten)]
        drive: Drive,
    },
    /// Show the identify response for an image
    Identify {
        #[command(flatten)]
        drive: Drive,
        /// Answer as during a BIOS drive scan (connection shown in the model name)
        #[arg(long)]
        scan: bool,
        #[arg(long, value_parser = parse_number)]
        port: Option<u16>,
        #[arg(long, default_value_t = 9600)]
        baud: u32,
        /// Port-and-baud word sent by the BIOS, echoed back
        #[arg(long, value_parser = parse_number, default_value = "0")]
        echo: u16,
        #[arg(long)]
        ascii: bool,
        /// Also write the raw 512-byte block here
        #[arg(long)]
        raw: Option<PathBuf>,
    },
    /// Create a new zero-filled image
    Create {
        #[arg(short, long)]
        output: PathBuf,
        #[arg(short, long, value_parser = parse_geometry, conflicts_with_all = ["floppy", "sectors"])]
        geometry: Option<Chs>,
        /// Floppy capacity as labelled, e.g. 1.44 or 360K written as 0.36
        #[arg(long, conflicts_with = "sectors")]
        floppy: Option<f64>,
        #[arg(long)]
        sectors: Option<u64>,
        #[arg(long)]
        chs: bool,
    },
}

fn parse_geometry(s: &str) -> Result<Chs, String> {
    s.parse()
}

fn parse_number(s: &str) -> Result<u16, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u16::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.map_err(|e| format!("Invalid number '{}': {}", s, e))
}

fn profile(cli: &Cli) -> Profile {
    let mut profile = if cli.legacy { Profile::legacy() } else { Profile::current() };
    if cli.lenient_geometry {
        profile = profile.with_mismatch(MismatchSeverity::Warn);
    }
    if cli.strict_cylinders {
        profile = profile.with_overflow(OverflowPolicy::Fail);
    }
    profile
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let profile = profile(&cli);

    match cli.command {
        Commands::Info { drive } => {
            let image = DiskImage::attach(&drive.input, &drive.options(), &profile)?;
            println!("{}", serdrive::core::display(image.record()));
        }
        Commands::Identify { drive, scan, port, baud, echo, ascii, raw } => {
            let image = DiskImage::attach(&drive.input, &drive.options(), &profile)?;
            let baud_display = serial::baud_display(baud);
            let request = IdentifyRequest {
                scan,
                port,
                baud_display: &baud_display,
                echo_port_and_baud: echo,
                protocol_version: PROTOCOL_VERSION,
            };
            let mut buffer = IdentifyBuffer::new();
            image.respond_identify(&request, &profile, &mut buffer);
            println!("{}", serdrive::core::dump_identify(&buffer, ascii));
            if let Some(raw) = raw {
                let mut file = File::create(&raw)?;
                file.write_all(buffer.as_bytes())?;
                println!("Wrote {}", raw.display());
            }
        }
        Commands::Create { output, geometry, floppy, sectors, chs } => {
            let size = match (geometry, floppy, sectors) {
                (Some(g), _, _) => ImageSize::Chs(g),
                (None, Some(mb), _) => ImageSize::FloppyMb(mb),
                (None, None, Some(n)) => ImageSize::Sectors(n),
                (None, None, None) => {
                    return Err(anyhow!("Specify a size with --geometry, --floppy or --sectors"))
                }
            };
            let options = AttachOptions { use_chs: chs, ..AttachOptions::default() };
            let image = DiskImage::create(&output, size, &options, &profile)?;
            println!("{}", serdrive::core::display(image.record()));
            println!("Created {}", output.display());
        }
    }
    Ok(())
}
