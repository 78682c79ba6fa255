use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use healpix_uniq::fixture::{CheckConfig, Fixture, OrderPix, check};
use healpix_uniq::healpix::{check_depth, nside, npix, pixel_area, resolution};
use healpix_uniq::{decode, encode};

#[derive(Parser)]
#[command(name = "healpix-uniq", about = "HEALPix uniq index codec")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Pack a depth and nested pixel index into a uniq index.
    Encode {
        /// HEALPix depth (order), 0 to 29.
        depth: u8,

        /// Pixel index at that depth.
        hash: u64,
    },

    /// Unpack a uniq index into depth and pixel index.
    Decode {
        uniq: u64,

        /// Print as JSON: {"order": .., "ipix": ..}.
        #[arg(long)]
        json: bool,
    },

    /// Print nside, pixel count, pixel area and resolution for a depth.
    Info {
        depth: u8,
    },

    /// Check the implementation against a recorded oracle fixture (JSON).
    Check {
        fixture: PathBuf,

        /// Maximum number of mismatches to print.
        #[arg(long, default_value = "20")]
        max_reported: usize,

        /// Stop at the first mismatch.
        #[arg(long)]
        fail_fast: bool,
    },
}

fn fail(msg: impl std::fmt::Display) -> ! {
    eprintln!("{msg}");
    process::exit(1);
}

fn cmd_decode(uniq: u64, json: bool) {
    let cell = decode(uniq).unwrap_or_else(|e| fail(e));
    if json {
        let out = serde_json::to_string(&OrderPix::from(cell)).unwrap_or_else(|e| fail(e));
        println!("{out}");
    } else {
        println!("{cell}");
    }
}

fn cmd_info(depth: u8) {
    let depth = check_depth(depth).unwrap_or_else(|e| fail(e));
    println!("depth:      {depth}");
    println!("nside:      {}", nside(depth));
    println!("npix:       {}", npix(depth));
    println!("pixel area: {:.6e} sr", pixel_area(depth));
    println!(
        "resolution: {:.6e} rad ({:.4} arcmin)",
        resolution(depth),
        resolution(depth).to_degrees() * 60.0
    );
}

fn cmd_check(path: &Path, config: &CheckConfig) {
    let fixture = Fixture::load(path).unwrap_or_else(|e| {
        fail(format!("Failed to load fixture {}: {e}", path.display()))
    });
    let report = check(&fixture, config).unwrap_or_else(|e| fail(e));
    println!("{report}");
    if !report.is_success() {
        process::exit(1);
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("healpix_uniq=info")),
        )
        .init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Encode { depth, hash } => {
            let uniq = encode(*depth, *hash).unwrap_or_else(|e| fail(e));
            println!("{uniq}");
        }
        Commands::Decode { uniq, json } => cmd_decode(*uniq, *json),
        Commands::Info { depth } => cmd_info(*depth),
        Commands::Check {
            fixture,
            max_reported,
            fail_fast,
        } => {
            let config = CheckConfig {
                max_reported: *max_reported,
                fail_fast: *fail_fast,
            };
            cmd_check(fixture, &config);
        }
    }
}
