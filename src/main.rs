use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use rowstore::{
    DbFile, DecodePolicy, ExecuteError, ExecuteOutcome, MetaCommand, PrepareError, Statement,
    Table,
};

/// A single-table row store with a line-oriented prompt
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Database file, created if it does not exist
    db_path: PathBuf,

    /// What select does with a row it cannot decode
    #[arg(long, value_enum, default_value_t = DecodePolicy::Abort)]
    on_decode_error: DecodePolicy,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

struct InputBuffer {
    raw: Vec<u8>,
    buffer: String,
}

enum ReadOutcome {
    Line,
    NotUtf8,
    Eof,
}

impl InputBuffer {
    fn new() -> Self {
        Self {
            raw: Vec::new(),
            buffer: String::new(),
        }
    }

    fn read_input(&mut self, reader: &mut impl BufRead) -> io::Result<ReadOutcome> {
        self.raw.clear();
        self.buffer.clear();
        if reader.read_until(b'\n', &mut self.raw)? == 0 {
            return Ok(ReadOutcome::Eof);
        }
        match std::str::from_utf8(&self.raw) {
            Ok(line) => {
                self.buffer.push_str(line.trim());
                Ok(ReadOutcome::Line)
            }
            Err(_) => Ok(ReadOutcome::NotUtf8),
        }
    }
}

enum InputType<'a> {
    Meta(MetaCommand),
    Statement(&'a str),
}

impl<'a> InputType<'a> {
    fn parse(input: &'a str) -> InputType<'a> {
        if let Some(meta) = MetaCommand::parse(input) {
            InputType::Meta(meta)
        } else {
            InputType::Statement(input)
        }
    }
}

fn print_prompt(out: &mut impl Write) -> io::Result<()> {
    write!(out, "db > ")?;
    out.flush()
}

/// Runs the prompt until `.exit` or end of input. Only storage failures escape.
fn run<F: DbFile>(
    table: &mut Table<F>,
    policy: DecodePolicy,
    reader: &mut impl BufRead,
    out: &mut impl Write,
) -> Result<()> {
    let mut input_buffer = InputBuffer::new();

    loop {
        print_prompt(out)?;
        match input_buffer.read_input(reader)? {
            ReadOutcome::Line => {}
            ReadOutcome::NotUtf8 => {
                writeln!(out, "{}", PrepareError::Syntax)?;
                continue;
            }
            ReadOutcome::Eof => break,
        }

        let statement = match InputType::parse(&input_buffer.buffer) {
            InputType::Meta(MetaCommand::Exit) => break,
            InputType::Meta(MetaCommand::Unrecognized) => {
                writeln!(out, "Unrecognized meta-command: {}", input_buffer.buffer)?;
                continue;
            }
            InputType::Statement(line) => match Statement::prepare(line) {
                Ok(statement) => statement,
                Err(e) => {
                    writeln!(out, "{e}")?;
                    continue;
                }
            },
        };

        match statement.execute(table, policy) {
            Ok(ExecuteOutcome::Inserted) => writeln!(out, "Executed.")?,
            Ok(ExecuteOutcome::Selected(rows)) => {
                for row in rows {
                    writeln!(out, "{row}")?;
                }
                writeln!(out, "Executed.")?;
            }
            Err(ExecuteError::TableFull) => writeln!(out, "Error: Table full.")?,
            // pager slots are always ROW_SIZE, so this only fires on a corrupt codec
            Err(ExecuteError::DecodeFailed { row_index, .. }) => {
                writeln!(out, "Error: Could not decode row {row_index}.")?
            }
            Err(e) => return Err(e).context("storage failure"),
        }
    }

    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let mut table = Table::open(&args.db_path)
        .with_context(|| format!("Failed to open database {}", args.db_path.display()))?;

    let stdin = io::stdin();
    let stdout = io::stdout();
    run(
        &mut table,
        args.on_decode_error,
        &mut stdin.lock(),
        &mut stdout.lock(),
    )?;

    table.close().context("Failed to close database")?;
    Ok(())
}
