//! Line-oriented command shell over a single sheet.
//!
//! ```text
//! set <pos> <text>   store text or a formula (text may be empty)
//! clear <pos>        reset a cell
//! get <pos>          print the computed value
//! refs <pos>         print the cells a formula reads
//! deps <pos>         print the cells that read this one
//! size               print the printable area as "<rows> <cols>"
//! values | texts     dump the printable area
//! ```

use std::io::Write;

use cellgraph_core::{Position, Sheet};
use tracing::debug;

use crate::error::ShellError;

/// One parsed command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Set { pos: Position, text: String },
    Clear(Position),
    Get(Position),
    Refs(Position),
    Deps(Position),
    Size,
    Values,
    Texts,
}

impl Command {
    /// Parse a command line. Blank lines and `#` comments yield `None`.
    pub fn parse(line: &str) -> Result<Option<Command>, ShellError> {
        let line = line.trim_end_matches(['\r', '\n']);
        let trimmed = line.trim_start();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return Ok(None);
        }

        let (name, rest) = split_word(trimmed);
        let command = match name {
            "set" => {
                let (pos, text) = split_word(rest);
                if pos.is_empty() {
                    return Err(ShellError::Usage("set <pos> <text>"));
                }
                Command::Set {
                    pos: pos.parse()?,
                    text: text.to_string(),
                }
            }
            "clear" => Command::Clear(single_position(rest, "clear <pos>")?),
            "get" => Command::Get(single_position(rest, "get <pos>")?),
            "refs" => Command::Refs(single_position(rest, "refs <pos>")?),
            "deps" => Command::Deps(single_position(rest, "deps <pos>")?),
            "size" => no_arguments(rest, Command::Size, "size")?,
            "values" => no_arguments(rest, Command::Values, "values")?,
            "texts" => no_arguments(rest, Command::Texts, "texts")?,
            other => return Err(ShellError::UnknownCommand(other.to_string())),
        };

        Ok(Some(command))
    }
}

/// Split off the first whitespace-delimited word; the remainder loses its
/// leading whitespace only.
fn split_word(input: &str) -> (&str, &str) {
    let input = input.trim_start();
    match input.find(char::is_whitespace) {
        Some(idx) => (&input[..idx], input[idx..].trim_start()),
        None => (input, ""),
    }
}

fn single_position(rest: &str, usage: &'static str) -> Result<Position, ShellError> {
    let (pos, extra) = split_word(rest);
    if pos.is_empty() || !extra.trim().is_empty() {
        return Err(ShellError::Usage(usage));
    }
    Ok(pos.parse()?)
}

fn no_arguments(rest: &str, command: Command, usage: &'static str) -> Result<Command, ShellError> {
    if rest.trim().is_empty() {
        Ok(command)
    } else {
        Err(ShellError::Usage(usage))
    }
}

/// Run one command against `sheet`, writing any output to `output`
pub fn execute<W: Write>(sheet: &mut Sheet, command: &Command, output: &mut W) -> Result<(), ShellError> {
    debug!(?command, "execute");

    match command {
        Command::Set { pos, text } => sheet.set_cell(*pos, text)?,
        Command::Clear(pos) => sheet.clear_cell(*pos)?,
        Command::Get(pos) => {
            let value = sheet
                .get_cell(*pos)?
                .map(|cell| cell.value().to_string())
                .unwrap_or_default();
            writeln!(output, "{}", value)?;
        }
        Command::Refs(pos) => {
            let refs = sheet
                .get_cell(*pos)?
                .map(|cell| cell.referenced_cells())
                .unwrap_or_default();
            writeln!(output, "{}", join_positions(refs))?;
        }
        Command::Deps(pos) => {
            let mut deps: Vec<Position> = sheet
                .get_cell(*pos)?
                .map(|cell| cell.dependents().iter().copied().collect())
                .unwrap_or_default();
            deps.sort();
            writeln!(output, "{}", join_positions(deps))?;
        }
        Command::Size => {
            let size = sheet.printable_size();
            writeln!(output, "{} {}", size.rows, size.cols)?;
        }
        Command::Values => sheet.print_values(output)?,
        Command::Texts => sheet.print_texts(output)?,
    }

    Ok(())
}

/// Parse and run one input line
pub fn run_line<W: Write>(sheet: &mut Sheet, line: &str, output: &mut W) -> Result<(), ShellError> {
    match Command::parse(line)? {
        Some(command) => execute(sheet, &command, output),
        None => Ok(()),
    }
}

fn join_positions(positions: impl IntoIterator<Item = Position>) -> String {
    positions
        .into_iter()
        .map(|pos| pos.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}
