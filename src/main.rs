use anyhow::Result;
use clap::Parser;
use img_sweep::cli::{Args, Commands};
use img_sweep::processing::CompressionOptions;
use img_sweep::scanner::{MatchMode, ScanOptions};
use img_sweep::sweep::{AlwaysConfirm, Confirm, StdinConfirm};
use img_sweep::{batch, info, logger, processing, sweep};
use rayon::ThreadPoolBuilder;

fn main() -> Result<()> {
    let args = Args::parse();
    logger::set_level(args.quiet, args.verbose);

    match args.command {
        Commands::Compress {
            input,
            output,
            quality,
            width,
            height,
            format,
            threads,
        } => {
            setup_thread_pool(threads);
            let options = CompressionOptions::new(quality, width, height, format)?;
            processing::compress_image(&input, &output, &options)?;
        }
        Commands::Batch {
            input,
            output,
            quality,
            width,
            height,
            format,
            threads,
            recursive,
        } => {
            let options = CompressionOptions::new(quality, width, height, format)?;
            batch::batch_compress_images(&input, &output, &options, threads, recursive)?;
        }
        Commands::Sweep {
            target,
            exclude,
            list,
            literal,
            force,
        } => {
            let mode = if literal {
                MatchMode::Literal
            } else {
                MatchMode::Pattern
            };
            let options = ScanOptions::new(&exclude, mode);

            let mut prompt: Box<dyn Confirm> = if force {
                Box::new(AlwaysConfirm)
            } else {
                Box::new(StdinConfirm)
            };

            sweep::run_sweep(&target, &options, list, prompt.as_mut())?;
        }
        Commands::Info { input } => {
            info::show_image_info(&input)?;
        }
    }

    Ok(())
}

fn setup_thread_pool(threads: Option<usize>) {
    if let Some(num_threads) = threads {
        ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .build_global()
            .unwrap_or_else(|e| {
                eprintln!("Warning: Failed to set thread pool size: {}", e);
            });
    }
}
