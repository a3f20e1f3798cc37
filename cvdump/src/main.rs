mod error;


use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use cvnb00::{DebugInfo, InvalidNamePolicy, PublicSymbol, ReadOptions, SubsectionRecord};
use display_bytes::DisplayBytesSlice;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

use crate::error::Error;


#[derive(Parser)]
enum ProgMode {
    /// Print where the CodeView data and its subsection directory start.
    Locate(InputFileOnlyArgs),

    /// Print every subsection in directory order.
    Dump(ParseArgs),

    /// Print every subsection as JSON.
    Json(ParseArgs),

    /// Print the public symbols sorted by address.
    Publics(ParseArgs),

    /// Write the raw payload of one subsection to a file.
    Raw(RawArgs),
}

#[derive(Parser)]
struct InputFileOnlyArgs {
    pub input_file: PathBuf,
}

#[derive(Parser)]
struct ParseArgs {
    pub input_file: PathBuf,

    /// Keep subsections with non-ASCII names as raw bytes instead of failing.
    #[arg(long)]
    pub keep_invalid_names: bool,
}
impl ParseArgs {
    fn read_options(&self) -> ReadOptions {
        let invalid_names = if self.keep_invalid_names {
            InvalidNamePolicy::KeepRaw
        } else {
            InvalidNamePolicy::Abort
        };
        ReadOptions {
            invalid_names,
        }
    }
}

#[derive(Parser)]
struct RawArgs {
    pub input_file: PathBuf,

    /// Zero-based position of the subsection in the directory.
    pub index: usize,

    pub output_file: PathBuf,
}


fn open_input(path: &Path) -> Result<BufReader<File>, Error> {
    let file = File::open(path)
        .map_err(|e| Error::Open { path: path.to_owned(), error: e })?;
    Ok(BufReader::new(file))
}

fn read_debug_info(path: &Path, options: &ReadOptions) -> Result<DebugInfo, Error> {
    let mut input = open_input(path)?;
    let info = cvnb00::read_debug_info(&mut input, options)?;
    Ok(info)
}

fn print_signature(signature: &cvnb00::Signature) {
    println!(
        "CodeView version '{}', with base=0x{:X} and directory=0x{:08X}",
        signature.signature, signature.base_offset, signature.directory_offset,
    );
}

/// The public symbols of all modules, ordered by segment and then by offset.
fn sorted_public_symbols(info: &DebugInfo) -> Vec<(u16, &PublicSymbol)> {
    let mut symbols: Vec<_> = info.public_symbols().collect();
    symbols.sort_by_key(|(_, symbol)| (symbol.segment, symbol.offset));
    symbols
}

fn subsection_at(info: &DebugInfo, index: usize) -> Result<&SubsectionRecord, Error> {
    info.subsections.get(index)
        .ok_or(Error::NoSuchSubsection { index, count: info.subsections.len() })
}


fn run(mode: ProgMode) -> Result<(), Error> {
    match mode {
        ProgMode::Locate(args) => {
            let mut input = open_input(&args.input_file)?;
            let signature = cvnb00::locate(&mut input)?;
            print_signature(&signature);
        },
        ProgMode::Dump(args) => {
            let info = read_debug_info(&args.input_file, &args.read_options())?;
            print_signature(&info.signature);
            println!("{} subsections", info.subsections.len());
            for record in &info.subsections {
                println!("{:#?}", record);
            }
        },
        ProgMode::Json(args) => {
            let info = read_debug_info(&args.input_file, &args.read_options())?;
            let json = serde_json::to_string_pretty(&info)?;
            println!("{}", json);
        },
        ProgMode::Publics(args) => {
            let info = read_debug_info(&args.input_file, &args.read_options())?;
            for (module_index, symbol) in sorted_public_symbols(&info) {
                let module_name = info.module_name(module_index).unwrap_or("?");
                println!(
                    "{:04X}:{:04X}  {:5}  {}  [{}]",
                    symbol.segment, symbol.offset, symbol.type_index, symbol.name, module_name,
                );
            }
        },
        ProgMode::Raw(args) => {
            let info = read_debug_info(&args.input_file, &ReadOptions { invalid_names: InvalidNamePolicy::KeepRaw })?;
            let record = subsection_at(&info, args.index)?;
            debug!("subsection {} ({:?}): {}", args.index, record.subsection_type, DisplayBytesSlice::from(record.data.as_slice()));
            std::fs::write(&args.output_file, record.data.as_slice())
                .map_err(|e| Error::Write { path: args.output_file.clone(), error: e })?;
        },
    }
    Ok(())
}


fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::WARN.into())
                .from_env_lossy()
        )
        .with_writer(std::io::stderr)
        .init();

    let mode = ProgMode::parse();
    match run(mode) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) if e.is_signature_not_found() => {
            eprintln!("file does not contain CodeView data");
            ExitCode::from(1)
        },
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::from(2)
        },
    }
}
