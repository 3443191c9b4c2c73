//! Build automation and host tooling for the matrix-pins project.
//!
//! Run with: `cargo xtask <command>`

mod frame_export;
mod frames_gen;

use clap::{Parser, Subcommand};
use frame_export::{FrameFormat, export_frames};
use frames_gen::{Interpolation, collect_inputs, process_media, sanitize_base_name};
use matrix_pins::{
    DEFAULT_TABLE_FILE, LED_PINS, MATRIX_COLS, MATRIX_ROWS, PinGrid, PinTable, read_pin_list,
    read_pin_table, write_pin_table,
};
use owo_colors::OwoColorize;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitCode};

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "Build automation for matrix-pins project", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run all checks: build lib, run tests, generate docs, verify the pin table
    CheckAll,
    /// Generate the charlieplexed pin table
    Pins {
        /// File listing pins, separated by commas or whitespace; `#` starts a comment
        #[arg(long, conflicts_with = "pins")]
        pins_file: Option<PathBuf>,
        /// Comma-separated pin list (defaults to the LED display wiring)
        #[arg(long, value_delimiter = ',')]
        pins: Option<Vec<u8>>,
        #[arg(long, default_value_t = MATRIX_ROWS)]
        rows: usize,
        #[arg(long, default_value_t = MATRIX_COLS)]
        cols: usize,
        /// Table file to write
        #[arg(short, long, default_value = DEFAULT_TABLE_FILE)]
        output: PathBuf,
        /// Print the table instead of writing it
        #[arg(long, conflicts_with = "check")]
        stdout: bool,
        /// Fail if the table file differs from the generated table
        #[arg(long)]
        check: bool,
    },
    /// Convert PNG or GIF frames into grayscale bitmaps for the display
    Frames {
        /// A PNG or GIF file, or a directory of PNG frames
        input: PathBuf,
        #[arg(short, long, default_value = "output")]
        output: PathBuf,
        #[arg(long, default_value_t = MATRIX_COLS)]
        width: usize,
        #[arg(long, default_value_t = MATRIX_ROWS)]
        height: usize,
        #[arg(long, default_value = "lanczos")]
        interpolation: Interpolation,
        #[arg(long, default_value = "png")]
        format: FrameFormat,
        /// Replace an existing output directory for this input
        #[arg(long)]
        overwrite: bool,
    },
}

struct PinsArgs {
    pins_file: Option<PathBuf>,
    pins: Option<Vec<u8>>,
    rows: usize,
    cols: usize,
    output: PathBuf,
    stdout: bool,
    check: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.command {
        Commands::CheckAll => check_all(),
        Commands::Pins {
            pins_file,
            pins,
            rows,
            cols,
            output,
            stdout,
            check,
        } => pins_table(PinsArgs {
            pins_file,
            pins,
            rows,
            cols,
            output,
            stdout,
            check,
        }),
        Commands::Frames {
            input,
            output,
            width,
            height,
            interpolation,
            format,
            overwrite,
        } => frames(
            &input,
            &output,
            (width, height),
            interpolation,
            format,
            overwrite,
        ),
    }
}

fn check_all() -> ExitCode {
    let Some(workspace_root) = workspace_root() else {
        return ExitCode::FAILURE;
    };

    let steps: [(&str, &[&str]); 5] = [
        ("==> Building library...", &["build", "--lib"]),
        (
            "==> Building library with defmt...",
            &["build", "--lib", "--features", "defmt"],
        ),
        (
            "==> Running library tests...",
            &["test", "--features", "host"],
        ),
        ("==> Running xtask tests...", &["test", "-p", "xtask"]),
        (
            "==> Building documentation...",
            &["doc", "--no-deps", "--features", "host"],
        ),
    ];

    for (index, (banner, args)) in steps.iter().enumerate() {
        if index > 0 {
            println!();
        }
        println!("{}", banner.cyan());
        if !run_command(Command::new("cargo").current_dir(&workspace_root).args(*args)) {
            return ExitCode::FAILURE;
        }
    }

    let table = workspace_root.join(DEFAULT_TABLE_FILE);
    if table.exists() {
        println!("\n{}", "==> Verifying pin table...".cyan());
        if pins_table(PinsArgs {
            pins_file: None,
            pins: None,
            rows: MATRIX_ROWS,
            cols: MATRIX_COLS,
            output: table,
            stdout: false,
            check: true,
        }) != ExitCode::SUCCESS
        {
            return ExitCode::FAILURE;
        }
    }

    println!("\n{}", "==> All checks passed! 🎉".green().bold());
    ExitCode::SUCCESS
}

fn pins_table(args: PinsArgs) -> ExitCode {
    if args.rows == 0 || args.cols == 0 {
        eprintln!("{}", "Rows and columns must both be at least 1".red());
        return ExitCode::FAILURE;
    }

    let pins = match (&args.pins_file, args.pins) {
        (Some(path), _) => match read_pin_list(path) {
            Ok(pins) => pins,
            Err(err) => return fail(err),
        },
        (None, Some(pins)) => pins,
        (None, None) => LED_PINS.to_vec(),
    };

    let grid = match PinGrid::try_new(&pins, args.rows, args.cols) {
        Ok(grid) => grid,
        Err(err) => return fail(err),
    };

    if args.stdout {
        print!("{}", PinTable(&grid));
        return ExitCode::SUCCESS;
    }

    let output = args.output.display();
    if args.check {
        let on_disk = match read_pin_table(&args.output) {
            Ok(text) => text,
            Err(err) => return fail(err),
        };
        if on_disk == PinTable(&grid).to_string() {
            println!("{}", format!("Pin table up to date: {output} ✨").green());
            return ExitCode::SUCCESS;
        }
        eprintln!(
            "{}",
            format!("Pin table is stale: {output}. Run `cargo xtask pins` to regenerate it.").red()
        );
        return ExitCode::FAILURE;
    }

    match write_pin_table(&args.output, &grid) {
        Ok(()) => {
            println!("{}", format!("Matrix written to {output}").green());
            println!(
                "  {}",
                format!("{} pins, {}x{} cells", pins.len(), grid.rows(), grid.cols()).bright_black()
            );
            ExitCode::SUCCESS
        }
        Err(err) => fail(err),
    }
}

fn frames(
    input: &Path,
    output_root: &Path,
    (width, height): (usize, usize),
    interpolation: Interpolation,
    format: FrameFormat,
    overwrite: bool,
) -> ExitCode {
    if width == 0 || height == 0 {
        eprintln!("{}", "Width and height must both be at least 1".red());
        return ExitCode::FAILURE;
    }

    let media_input = match collect_inputs(input) {
        Ok(media_input) => media_input,
        Err(err) => return fail(err),
    };

    let stem = input
        .file_stem()
        .map(|stem| stem.to_string_lossy())
        .unwrap_or_default();
    let base_name = sanitize_base_name(&stem);
    let frame_dir = output_root.join(&base_name);
    if frame_dir.exists() {
        if !overwrite {
            eprintln!(
                "{}",
                format!(
                    "Output directory already exists: {}. Use --overwrite to replace it.",
                    frame_dir.display()
                )
                .red()
            );
            return ExitCode::FAILURE;
        }
        if let Err(err) = std::fs::remove_dir_all(&frame_dir) {
            return fail(err);
        }
    }

    println!(
        "{}",
        format!("Processing {} at {width}x{height} ({interpolation}, {format})", input.display()).cyan()
    );

    let media = match process_media(&media_input, width, height, interpolation) {
        Ok(media) => media,
        Err(err) => return fail(err),
    };

    match export_frames(
        &media.frames,
        output_root,
        &base_name,
        Some(input),
        media.fps,
        format,
    ) {
        Ok(summary) => {
            println!(
                "{}",
                format!(
                    "[ok] Processed {} frame(s) → {}",
                    summary.frame_count,
                    summary.frame_dir.display()
                )
                .green()
            );
            println!(
                "{}",
                format!("[ok] Metadata written to {}", summary.metadata_path.display()).green()
            );
            if let Some(fps) = media.fps {
                println!("  {}", format!("Source FPS: {fps}").bright_black());
            }
            ExitCode::SUCCESS
        }
        Err(err) => fail(err),
    }
}

fn fail(err: impl std::fmt::Display) -> ExitCode {
    eprintln!("{}", format!("Error: {err}").red());
    ExitCode::FAILURE
}

fn workspace_root() -> Option<PathBuf> {
    // `cargo xtask` runs from the workspace root.
    match std::env::current_dir() {
        Ok(dir) => Some(dir),
        Err(e) => {
            eprintln!("{}", format!("Failed to get current directory: {e}").red());
            None
        }
    }
}

fn run_command(cmd: &mut Command) -> bool {
    match cmd.status() {
        Ok(status) => status.success(),
        Err(e) => {
            eprintln!("{}", format!("Failed to execute command: {e}").red());
            false
        }
    }
}
