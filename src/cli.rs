use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "img-sweep",
    about = "Batch image re-compression and unused-file cleanup for asset directories",
    long_about = "img-sweep bundles two asset-directory chores: re-encoding images at a chosen \
                  quality/format (JPEG, PNG, WebP, with oxipng-optimized PNG output and parallel \
                  batch processing), and sweeping out files that nothing else references \
                  (filenames are cross-checked against file contents, and every deletion is \
                  confirmed interactively).",
    version = "0.1.0",
    after_help = "EXAMPLES:\n  \
    img-sweep compress input.jpg output.jpg -q 85 -w 1920\n  \
    img-sweep batch \"./images/*.jpg\" ./compressed -r -q 80 -f webp\n  \
    img-sweep sweep ./static/img -e logos -l\n  \
    img-sweep info photo.png"
)]
pub struct Args {
    #[arg(long, global = true, help = "Suppress informational output")]
    pub quiet: bool,

    #[arg(
        short = 'v',
        long,
        global = true,
        help = "Print extra detail about each step"
    )]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(
        about = "Compress a single image file",
        long_about = "Compress a single image file with customizable quality, size, and format \
                      options. PNG output is additionally optimized with oxipng."
    )]
    Compress {
        #[arg(help = "Input image file path")]
        input: PathBuf,

        #[arg(help = "Output image file path")]
        output: PathBuf,

        #[arg(
            short = 'q',
            long,
            help = "Compression quality (1-100, default: 80)",
            long_help = "Compression quality from 1 (lowest) to 100 (highest). \
                         For PNG: >=90 uses Zopfli, >=70 uses high compression, <70 uses standard compression."
        )]
        quality: Option<u8>,

        #[arg(
            short = 'w',
            long,
            help = "Target width in pixels",
            long_help = "Resize image to the given width, preserving the original height."
        )]
        width: Option<u32>,

        #[arg(
            short = 'H',
            long,
            help = "Target height in pixels",
            long_help = "Resize image to the given height, preserving the original width."
        )]
        height: Option<u32>,

        #[arg(
            short = 'f',
            long,
            help = "Output format (jpeg, png, webp)",
            long_help = "Force output format regardless of file extension. \
                         Supported formats: jpeg/jpg, png, webp"
        )]
        format: Option<String>,

        #[arg(
            short = 'j',
            long,
            help = "Number of parallel threads (default: auto)",
            long_help = "Number of threads for parallel encoding. \
                         If not specified, uses the number of CPU cores."
        )]
        threads: Option<usize>,
    },

    #[command(
        about = "Compress multiple images in parallel",
        long_about = "Process multiple images in parallel. Input can be a directory, a single \
                      file, or a glob pattern; subdirectories are included with --recursive."
    )]
    Batch {
        #[arg(
            help = "Input directory, file, or glob pattern",
            long_help = "Input can be a directory path, a file, or a glob expression. \
                         Examples: './images', '*.jpg', '/path/to/images/*.{jpg,png}'"
        )]
        input: String,

        #[arg(help = "Output directory path")]
        output: PathBuf,

        #[arg(short = 'q', long, help = "Compression quality (1-100, default: 80)")]
        quality: Option<u8>,

        #[arg(short = 'w', long, help = "Target width in pixels")]
        width: Option<u32>,

        #[arg(short = 'H', long, help = "Target height in pixels")]
        height: Option<u32>,

        #[arg(
            short = 'f',
            long,
            help = "Output format (jpeg, png, webp)",
            long_help = "Convert all images to the specified format. \
                         If not specified, preserves each original format."
        )]
        format: Option<String>,

        #[arg(short = 'j', long, help = "Number of parallel threads (default: auto)")]
        threads: Option<usize>,

        #[arg(short = 'r', long, help = "Process subdirectories recursively")]
        recursive: bool,
    },

    #[command(
        about = "Find and interactively delete unreferenced files",
        long_about = "Walk the target directory and treat every top-level entry as a deletion \
                      candidate. A candidate is kept when its filename appears inside the \
                      content of any file at the same directory level; everything still \
                      unreferenced after the scan is offered for deletion, one confirmation \
                      at a time. Filenames are matched as regular expressions unless \
                      --literal is given."
    )]
    Sweep {
        #[arg(help = "Target directory whose entries are deletion candidates")]
        target: PathBuf,

        #[arg(
            short = 'e',
            long,
            help = "File or directory names to skip (repeatable)",
            long_help = "Names excluded from scanning and deletion, in addition to the \
                         defaults (node_modules, .git, target)."
        )]
        exclude: Vec<String>,

        #[arg(short = 'l', long, help = "List surviving candidates before deleting")]
        list: bool,

        #[arg(
            long,
            help = "Match filenames literally instead of as regular expressions",
            long_help = "By default a filename like 'a.png' is compiled as a regular \
                         expression, so the dot matches any character. With --literal the \
                         filename is escaped first and only exact substrings count as \
                         references."
        )]
        literal: bool,

        #[arg(long, help = "Delete without asking for confirmation")]
        force: bool,
    },

    #[command(
        about = "Display image information and compression suggestions",
        long_about = "Analyze an image file and report dimensions, format, file size, and \
                      suggested compression settings."
    )]
    Info {
        #[arg(help = "Image file path to analyze")]
        input: PathBuf,
    },
}
