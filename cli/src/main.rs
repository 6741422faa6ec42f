//! Operator tooling for the replicated drawing core.
//!
//! `replay` applies a JSONL command log to a fresh board and prints the
//! result; `verify` replays the same log twice and checks the two boards are
//! bit-identical (the determinism property as a tool); `import-legacy`
//! converts an old single-page snapshot into the current format; `inspect`
//! summarizes a snapshot file without mutating anything.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Read, Write};

use clap::{Args, Parser, Subcommand};
use wire::Command as LogCommand;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("failed to read {path}: {source}")]
    ReadInput { path: String, source: io::Error },
    #[error("failed to write {path}: {source}")]
    WriteOutput { path: String, source: io::Error },
    #[error("invalid command on line {line}: {source}")]
    BadCommand { line: usize, source: serde_json::Error },
    #[error("snapshot codec failed: {0}")]
    Snapshot(#[from] board::SnapshotError),
    #[error("replay diverged: {0}")]
    Diverged(String),
}

#[derive(Parser, Debug)]
#[command(name = "inkdeck", about = "Replay, verify, and convert drawing command logs")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Apply a JSONL command log to a fresh board and print the result.
    Replay(ReplayArgs),
    /// Replay a log twice and fail if the two boards differ.
    Verify(ReplayArgs),
    /// Convert a legacy single-page snapshot into the current format.
    ImportLegacy(ImportLegacyArgs),
    /// Summarize a snapshot file.
    Inspect(InspectArgs),
}

#[derive(Args, Debug)]
struct ReplayArgs {
    #[arg(long, default_value = "-", help = "Command log path, or - for stdin")]
    log: String,

    #[arg(long, help = "Also write the resulting snapshot here")]
    snapshot_out: Option<String>,
}

#[derive(Args, Debug)]
struct ImportLegacyArgs {
    #[arg(long, default_value = "-", help = "Legacy snapshot path, or - for stdin")]
    input: String,

    #[arg(long, help = "Output snapshot path")]
    output: String,
}

#[derive(Args, Debug)]
struct InspectArgs {
    #[arg(long, default_value = "-", help = "Snapshot path, or - for stdin")]
    snapshot: String,
}

fn main() -> Result<(), CliError> {
    let cli = Cli::parse();
    match cli.command {
        Command::Replay(args) => run_replay(&args),
        Command::Verify(args) => run_verify(&args),
        Command::ImportLegacy(args) => run_import_legacy(&args),
        Command::Inspect(args) => run_inspect(&args),
    }
}

fn run_replay(args: &ReplayArgs) -> Result<(), CliError> {
    let commands = read_log(&args.log)?;
    let board = replay(&commands);
    print_board(&board);

    if let Some(path) = &args.snapshot_out {
        let bytes = board::snapshot::encode(&board)?;
        write_bytes(path, &bytes)?;
        println!("snapshot written to {path} ({} bytes)", bytes.len());
    }
    Ok(())
}

fn run_verify(args: &ReplayArgs) -> Result<(), CliError> {
    let commands = read_log(&args.log)?;
    let first = board::snapshot::encode(&replay(&commands))?;
    let second = board::snapshot::encode(&replay(&commands))?;

    if first != second {
        return Err(CliError::Diverged(format!(
            "two replays of {} commands produced different snapshots ({} vs {} bytes)",
            commands.len(),
            first.len(),
            second.len()
        )));
    }
    println!("ok: {} commands, {} snapshot bytes, replays agree", commands.len(), first.len());
    Ok(())
}

fn run_import_legacy(args: &ImportLegacyArgs) -> Result<(), CliError> {
    let bytes = read_bytes(&args.input)?;
    let board = board::snapshot::decode(&bytes)?;
    let converted = board::snapshot::encode(&board)?;
    write_bytes(&args.output, &converted)?;
    print_board(&board);
    println!("converted snapshot written to {}", args.output);
    Ok(())
}

fn run_inspect(args: &InspectArgs) -> Result<(), CliError> {
    let bytes = read_bytes(&args.snapshot)?;
    let board = board::snapshot::decode(&bytes)?;
    print_board(&board);
    Ok(())
}

fn replay(commands: &[LogCommand]) -> board::Board {
    let mut board = board::Board::new();
    for command in commands {
        board.apply(command);
    }
    board
}

fn print_board(board: &board::Board) {
    println!("active page: {:?}", board.active_key());
    for (key, doc) in board.pages().iter() {
        let live = doc.live_strokes().len();
        let segments: usize = doc.live_strokes().iter().map(|s| s.segments.len()).sum();
        println!(
            "page {key}: {}x{}, {} strokes ({live} live, {segments} segments)",
            doc.width(),
            doc.height(),
            doc.len()
        );
    }
}

fn open_input(path: &str) -> Result<Box<dyn BufRead>, CliError> {
    if path == "-" {
        return Ok(Box::new(BufReader::new(io::stdin())));
    }
    let file = File::open(path)
        .map_err(|source| CliError::ReadInput { path: path.to_owned(), source })?;
    Ok(Box::new(BufReader::new(file)))
}

fn read_log(path: &str) -> Result<Vec<LogCommand>, CliError> {
    let reader = open_input(path)?;
    let mut commands = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line.map_err(|source| CliError::ReadInput { path: path.to_owned(), source })?;
        if line.trim().is_empty() {
            continue;
        }
        let command = serde_json::from_str(&line)
            .map_err(|source| CliError::BadCommand { line: index + 1, source })?;
        commands.push(command);
    }
    Ok(commands)
}

fn read_bytes(path: &str) -> Result<Vec<u8>, CliError> {
    let mut reader = open_input(path)?;
    let mut bytes = Vec::new();
    reader
        .read_to_end(&mut bytes)
        .map_err(|source| CliError::ReadInput { path: path.to_owned(), source })?;
    Ok(bytes)
}

fn write_bytes(path: &str, bytes: &[u8]) -> Result<(), CliError> {
    let mut file = File::create(path)
        .map_err(|source| CliError::WriteOutput { path: path.to_owned(), source })?;
    file.write_all(bytes)
        .map_err(|source| CliError::WriteOutput { path: path.to_owned(), source })?;
    Ok(())
}
