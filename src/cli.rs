use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Parser)]
#[command(about = "Host-side samples for the ray tracing support code")]
pub(crate) struct Cli {
    #[arg(short, long, global = true, help = "Log at debug level (overridden by RUST_LOG)")]
    pub(crate) verbose: bool,

    #[command(subcommand)]
    pub(crate) command: Command,
}

#[derive(Debug, clap::Subcommand)]
pub(crate) enum Command {
    #[command(about = "Render a slice of multi-octave Perlin noise to a PNG")]
    Noise(NoiseArgs),
    #[command(about = "Run a random allocate/free workload against a SlotFinder")]
    Slots(SlotArgs),
}

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
pub(crate) enum Palette {
    #[default]
    Grayscale,
    Hue,
}

#[derive(Debug, clap::Args)]
pub(crate) struct NoiseArgs {
    #[arg(short, long, default_value = "noise.png", help = "Output filename")]
    pub(crate) output: PathBuf,
    #[arg(long, default_value_t = 512)]
    pub(crate) width: u32,
    #[arg(long, default_value_t = 512)]
    pub(crate) height: u32,
    #[arg(
        short = 'z',
        long,
        default_value_t = 0.0,
        help = "Depth of the slice through the noise volume"
    )]
    pub(crate) depth: f32,

    #[arg(long, default_value_t = 5)]
    pub(crate) octaves: u32,
    #[arg(
        short,
        long,
        default_value_t = 4.0,
        help = "Frequency of the first octave, in cycles per image width"
    )]
    pub(crate) frequency: f32,
    #[arg(long, default_value_t = 2.0)]
    pub(crate) frequency_multiplier: f32,
    #[arg(short, long, default_value_t = 0.5, help = "Amplitude falloff per octave")]
    pub(crate) persistence: f32,
    #[arg(long, conflicts_with = "supremum", help = "Amplitude of the first octave")]
    pub(crate) amplitude: Option<f32>,
    #[arg(long, help = "Largest absolute value of the octave sum [default: 1]")]
    pub(crate) supremum: Option<f32>,
    #[arg(
        short,
        long,
        default_value_t = 0,
        help = "Tiling period in noise space, 0 disables tiling"
    )]
    pub(crate) repeat: i32,

    #[arg(long, value_enum, default_value_t = Palette::Grayscale)]
    pub(crate) palette: Palette,
}

#[derive(Debug, clap::Args)]
pub(crate) struct SlotArgs {
    #[arg(short, long, default_value_t = 4096)]
    pub(crate) num_slots: u32,
    #[arg(short, long, default_value_t = 100_000)]
    pub(crate) iterations: u32,
    #[arg(short, long, default_value_t = 0)]
    pub(crate) seed: u64,
    #[arg(
        long,
        default_value_t = 0.6,
        help = "Chance that an iteration allocates rather than frees"
    )]
    pub(crate) alloc_probability: f64,
    #[arg(long, help = "Resize the allocator after the workload")]
    pub(crate) resize_to: Option<u32>,
    #[arg(long, action, help = "Dump the bitmap pyramid (needs --verbose)")]
    pub(crate) dump: bool,
}
