//! Command-line front end: reads StoneMark from a file or stdin, writes
//! HTML to a file or stdout.

use clap::Parser as ClapParser;
use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use stonemark::{Document, Options};
use typed_arena::Arena;

#[derive(ClapParser, Debug)]
#[command(name = "stonemark", about = "Render StoneMark documents to HTML", version)]
struct Cli {
    /// Input file. Reads stdin when omitted.
    input: Option<PathBuf>,

    /// Output file. Writes stdout when omitted.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Wrap the rendered fragment in a full HTML page (head, title, CSS).
    #[arg(long)]
    page: bool,

    /// Promote the first heading to the document title.
    #[arg(long)]
    title: bool,

    /// Comma-separated HTML heading levels for StoneMark's four ranks,
    /// e.g. "1,2,3,4".
    #[arg(long, value_delimiter = ',')]
    header_sizes: Option<Vec<u8>>,

    /// Maximum block nesting depth before parsing fails.
    #[arg(long)]
    max_depth: Option<usize>,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let text = match &cli.input {
        Some(path) => match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) => {
                eprintln!("stonemark: reading {}: {err}", path.display());
                return ExitCode::FAILURE;
            }
        },
        None => {
            let mut buf = String::new();
            if let Err(err) = io::stdin().read_to_string(&mut buf) {
                eprintln!("stonemark: reading stdin: {err}");
                return ExitCode::FAILURE;
            }
            buf
        }
    };

    let mut options = Options::default().with_first_header_is_title(cli.title);
    if let Some(sizes) = &cli.header_sizes {
        if sizes.len() == 4 {
            options = options.with_header_sizes([sizes[0], sizes[1], sizes[2], sizes[3]]);
        } else {
            eprintln!("stonemark: --header-sizes needs exactly four values");
            return ExitCode::FAILURE;
        }
    }
    if let Some(depth) = cli.max_depth {
        options = options.with_max_depth(depth);
    }

    let arena = Arena::new();
    let document = match Document::parse(&arena, &text, options) {
        Ok(document) => document,
        Err(err) => {
            eprintln!("stonemark: {err}");
            return ExitCode::FAILURE;
        }
    };

    let rendered = if cli.page { document.to_html_page() } else { document.to_html() };
    let html = match rendered {
        Ok(html) => html,
        Err(err) => {
            eprintln!("stonemark: {err}");
            return ExitCode::FAILURE;
        }
    };

    match &cli.output {
        Some(path) => {
            if let Err(err) = fs::write(path, html) {
                eprintln!("stonemark: writing {}: {err}", path.display());
                return ExitCode::FAILURE;
            }
        }
        None => {
            if let Err(err) = io::stdout().write_all(html.as_bytes()) {
                eprintln!("stonemark: writing stdout: {err}");
                return ExitCode::FAILURE;
            }
        }
    }

    ExitCode::SUCCESS
}
