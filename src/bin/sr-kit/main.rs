//! sr-kit command line
//!
//! Inspection commands for the super-resolution helpers.
//!
//! # Usage
//!
//! ```bash
//! sr-kit config experiments/endosr_x4/config.yml
//! sr-kit patches image.png --patch-size 96 --stride 64
//! sr-kit patches image.png --config experiments/endosr_x4/config.yml
//! sr-kit gaussian --size 64 --size 64
//! sr-kit psnr sr.png hr.png --scale 4
//! sr-kit blur input.png blurred.png --kernel-size 5 --sigma 1.0 --threads 4
//! ```

mod cli;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "sr-kit")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Inspect patch grids, blending maps, filters and metrics", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the contents of a YAML configuration file
    Config {
        /// Path to the configuration file
        #[arg(env = "SR_CONFIG")]
        path: PathBuf,
    },
    /// List the patch boxes covering an image
    Patches {
        /// Image to split
        image: PathBuf,

        /// Training configuration supplying patch size and stride
        #[arg(long, env = "SR_CONFIG")]
        config: Option<PathBuf>,

        /// Edge of the square patches, overrides the configuration
        #[arg(long = "patch-size")]
        patch_size: Option<usize>,

        /// Step between neighbouring patches, overrides the configuration
        #[arg(long)]
        stride: Option<usize>,
    },
    /// Print statistics of a Gaussian importance map
    Gaussian {
        /// Patch extent, once per axis
        #[arg(long = "size", required = true)]
        size: Vec<usize>,

        /// Ratio between sigma and patch extent
        #[arg(long = "sigma-scale", default_value_t = sr_kit::processors::DEFAULT_SIGMA_SCALE)]
        sigma_scale: f64,
    },
    /// Compute the PSNR between a super-resolved image and its reference
    Psnr {
        /// Super-resolved image
        sr: PathBuf,

        /// Reference image
        hr: PathBuf,

        /// Super-resolution scale factor
        #[arg(long, default_value_t = 4)]
        scale: usize,

        /// Score luma only and shave `scale` pixels
        #[arg(long)]
        luminance: bool,
    },
    /// Blur an image with the fixed Gaussian filter
    Blur {
        /// Input image
        input: PathBuf,

        /// Output image
        output: PathBuf,

        /// Edge of the Gaussian kernel
        #[arg(long = "kernel-size", default_value_t = 5)]
        kernel_size: usize,

        /// Standard deviation of the Gaussian kernel
        #[arg(long, default_value_t = 1.0)]
        sigma: f32,

        /// Training configuration supplying the parallelism settings
        #[arg(long, env = "SR_CONFIG")]
        config: Option<PathBuf>,

        /// Size of the filter thread pool, overrides the configuration
        #[arg(long)]
        threads: Option<usize>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    sr_kit::utils::init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Config { path } => {
            info!("Reading configuration: {}", path.display());
            cli::show_config(&path)?;
        }
        Commands::Patches {
            image,
            config,
            patch_size,
            stride,
        } => {
            info!("Enumerating patches of {}", image.display());
            cli::show_patches(&image, config.as_deref(), patch_size, stride)?;
        }
        Commands::Gaussian { size, sigma_scale } => {
            cli::show_gaussian(&size, sigma_scale)?;
        }
        Commands::Psnr {
            sr,
            hr,
            scale,
            luminance,
        } => {
            cli::show_psnr(&sr, &hr, scale, luminance)?;
        }
        Commands::Blur {
            input,
            output,
            kernel_size,
            sigma,
            config,
            threads,
        } => {
            cli::blur_image(
                &input,
                &output,
                kernel_size,
                sigma,
                config.as_deref(),
                threads,
            )?;
        }
    }

    Ok(())
}
