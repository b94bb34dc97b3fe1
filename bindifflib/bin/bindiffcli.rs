use bindifflib::engine::summarize;
use bindifflib::{DiffSession, GlyphMetrics, MappedFile, SessionConfig, Side, Verdict};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process;

/// Headless companion of the bindiffer app
#[derive(Parser)]
#[command(
    name = "bindiffcli",
    version = env!("CARGO_PKG_VERSION"),
    about = "Compare two binary files byte by byte",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print sizes and difference counts of two files
    Summary {
        #[arg(value_name = "FILE_A")]
        a: PathBuf,
        #[arg(value_name = "FILE_B")]
        b: PathBuf,
    },
    /// Print one screen of both files side by side, differences marked with '*'
    Dump {
        #[arg(value_name = "FILE_A")]
        a: PathBuf,
        #[arg(value_name = "FILE_B")]
        b: PathBuf,
        /// First byte to show (decimal, or hex with a 0x prefix)
        #[arg(long, default_value = "0", value_parser = parse_offset)]
        offset: u64,
        /// Number of lines to show
        #[arg(long, default_value_t = 16)]
        lines: u16,
        /// Terminal columns available for one file
        #[arg(long, default_value_t = 80)]
        width: u16,
    },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    let res = match cli.command {
        Commands::Summary { a, b } => run_summary(&a, &b),
        Commands::Dump {
            a,
            b,
            offset,
            lines,
            width,
        } => run_dump(&a, &b, offset, lines, width),
    };

    if let Err(e) = res {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run_summary(a: &Path, b: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let file_a = MappedFile::open(a)?;
    let file_b = MappedFile::open(b)?;

    let summary = summarize(&file_a, &file_b)?;

    println!("File A:        {} ({} bytes)", a.display(), summary.len_a);
    println!("File B:        {} ({} bytes)", b.display(), summary.len_b);
    println!("Mismatches:    {} bytes", summary.mismatches);
    println!("Out of range:  {} bytes", summary.out_of_range);
    match summary.first_difference {
        Some(offset) => println!("First diff at: 0x{offset:X}"),
        None => println!("Files are identical"),
    }
    Ok(())
}

fn run_dump(
    a: &Path,
    b: &Path,
    offset: u64,
    lines: u16,
    width: u16,
) -> Result<(), Box<dyn std::error::Error>> {
    // One terminal cell per glyph
    let mut session = DiffSession::new(SessionConfig {
        link_scrolling: true,
        glyph: GlyphMetrics::new(1.0, 1.0),
    });
    session.open(Side::Left, a)?;
    session.open(Side::Right, b)?;

    // Add one line of headroom for the bottom margin
    let height = f32::from(lines) + 1.0;
    for side in Side::BOTH {
        let _ = session.resize(side, f32::from(width), height);
    }

    // Scroll the longer file, the shorter one follows as far as it can
    let longer = if session.view(Side::Right).line_count() > session.view(Side::Left).line_count()
    {
        Side::Right
    } else {
        Side::Left
    };
    let _ = session.scroll_to_offset(longer, offset);

    let view = session.view(longer);
    let bytes_per_line = view.bytes_per_line();

    for line in view.visible_lines() {
        let start = line * bytes_per_line as u64;
        let mut row = view.format_address(start);

        for side in Side::BOTH {
            let source = session.source(side).ok_or("Source not loaded")?;
            row.push_str(" |");
            row.push_str(&format_hex_cells(source, start, bytes_per_line, |o| {
                session.verdict_at(o)
            }));
        }
        println!("{row}");
    }

    if view.visible_lines().is_empty() {
        println!("Both files are empty");
    }
    Ok(())
}

// =============================== HELPER FUNCTIONS ===============================

/// Render one line of one file as hex cells, followed by its ASCII representation
fn format_hex_cells(
    source: &MappedFile,
    start: u64,
    bytes_per_line: usize,
    verdict: impl Fn(u64) -> Option<Verdict>,
) -> String {
    use bindifflib::ByteSource;
    use std::fmt::Write;

    let mut hex = String::new();
    let mut ascii = String::new();

    for i in 0..bytes_per_line {
        let offset = start + i as u64;
        if i > 0 && i % 4 == 0 {
            hex.push(' ');
        }

        match source.byte_at(offset) {
            Ok(byte) => {
                let marker = if verdict(offset).is_some_and(Verdict::is_difference) {
                    '*'
                } else {
                    ' '
                };
                let _ = write!(hex, " {byte:02X}{marker}");
                ascii.push(if byte.is_ascii_graphic() {
                    byte as char
                } else {
                    '.'
                });
            }
            Err(_) => {
                hex.push_str("    ");
                ascii.push(' ');
            }
        }
    }

    format!("{hex} {ascii}")
}

/// Parse a decimal number, or a hex number with a 0x prefix
fn parse_offset(s: &str) -> Result<u64, String> {
    let s = s.trim();

    let res = if let Some(hex_str) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        u64::from_str_radix(hex_str, 16)
    } else {
        s.parse::<u64>()
    };

    res.map_err(|e| format!("Invalid offset '{s}': {e}"))
}
