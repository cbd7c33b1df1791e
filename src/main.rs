//! MIPS64 Pipeline Simulator CLI.
//!
//! Loads a flat big-endian program image into the instruction cache,
//! releases reset, and steps the core for a configured number of cycles,
//! reporting statistics at the end.

use clap::Parser;
use std::fs;

extern crate mips64_pipeline;

use mips64_pipeline::config::Config;
use mips64_pipeline::core::units::dcache::DCACHE_LINES;
use mips64_pipeline::core::{Core, CoreInput};
use mips64_pipeline::sim::loader;

/// Command-line arguments for the pipeline simulator.
#[derive(Parser, Debug)]
#[command(author, version, about = "MIPS64 Cycle-Accurate Pipeline Simulator")]
struct Args {
    #[arg(short, long, default_value = "configs/default.toml")]
    config: String,

    /// Flat big-endian program image, loaded at the reset vector.
    #[arg(short, long)]
    file: String,

    /// Override the configured cycle budget.
    #[arg(long)]
    cycles: Option<u64>,

    #[arg(long)]
    trace: bool,

    /// Emit statistics as JSON on stdout instead of the table.
    #[arg(long)]
    stats_json: bool,
}

fn main() {
    let args = Args::parse();

    let mut config: Config = match fs::read_to_string(&args.config) {
        Ok(content) => toml::from_str(&content).expect("Failed to parse config"),
        Err(_) => {
            eprintln!("[!] Config {} not found, using defaults", args.config);
            Config::default()
        }
    };
    if args.trace {
        config.general.trace = true;
    }
    let max_cycles = args.cycles.unwrap_or(config.sim.max_cycles);
    let reset_vector = config.general.reset_vector_val();

    let image = match loader::load_image(&args.file) {
        Ok(image) => image,
        Err(e) => {
            eprintln!("[!] {e}");
            std::process::exit(1);
        }
    };

    println!("Global Configuration");
    println!("--------------------");
    println!("Reset vector:   {reset_vector:#x}");
    println!("Image:          {} ({} bytes)", args.file, image.len());
    println!("Cycle budget:   {max_cycles}");
    println!("Warm DCache:    {}", config.sim.warm_dcache);
    println!("--------------------");

    let mut core = Core::new(&config);

    // Deliver the program and the optional data window while reset is
    // held, one fill per cycle, the way the external collaborator would.
    for fill in loader::image_fills(&image, reset_vector) {
        let _ = core.step(&CoreInput {
            reset: true,
            icache_fill: Some(fill),
            dcache_fill: None,
        });
    }
    if config.sim.warm_dcache {
        for line in 0..DCACHE_LINES as u64 {
            let _ = core.step(&CoreInput {
                reset: true,
                dcache_fill: Some((line, 0, 0)),
                ..Default::default()
            });
        }
    }
    let _ = core.step(&CoreInput {
        reset: true,
        ..Default::default()
    });

    for _ in 0..max_cycles {
        let out = core.step(&CoreInput::default());
        if config.general.trace {
            eprintln!("CYC pc={:#x} status={:?}", out.pc, out.status);
        }
    }

    println!("\nFinal PC: {:#x}", core.pipe().pc());
    core.pipe().regs().dump();
    if args.stats_json {
        println!("{}", core.stats().to_json());
    } else {
        core.stats().print();
    }
}
