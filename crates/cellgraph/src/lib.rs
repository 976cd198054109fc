pub mod config;
pub mod error;
pub mod shell;

pub use cellgraph_core::{
    CellError, CellValue, CellView, Position, Sheet, SheetError, Size, ESCAPE_SIGN, FORMULA_SIGN,
};
pub use cellgraph_formula::{NomParser, ParsedFormula};

use std::io::{BufRead, Write};

use tracing_subscriber::EnvFilter;

use crate::config::Config;

/// Create an empty sheet wired to the arithmetic formula parser
pub fn create_sheet() -> Sheet {
    Sheet::new(NomParser::new())
}

/// Install the global tracing subscriber; logs go to stderr so they never mix
/// with command output.
pub fn init_tracing(config: &Config) -> anyhow::Result<()> {
    let filter = EnvFilter::try_new(&config.log_filter)?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {e}"))?;
    Ok(())
}

/// Run the shell until `input` is exhausted
///
/// Command errors are written to `output` as `error[CODE]: message` and the
/// shell moves on; only output failures stop it.
pub fn run_shell<R, W>(config: &Config, input: R, output: &mut W) -> anyhow::Result<()>
where
    R: BufRead,
    W: Write,
{
    let mut sheet = create_sheet();

    if config.prompt {
        write!(output, "> ")?;
        output.flush()?;
    }
    for line in input.lines() {
        let line = line?;
        match shell::run_line(&mut sheet, &line, output) {
            Ok(()) => {}
            Err(e) if e.is_recoverable() => {
                tracing::warn!(code = e.code(), "{}", e);
                writeln!(output, "error[{}]: {}", e.code(), e)?;
            }
            Err(e) => return Err(e.into()),
        }
        if config.prompt {
            write!(output, "> ")?;
            output.flush()?;
        }
    }

    tracing::info!(cells = sheet.cell_count(), "input exhausted");
    Ok(())
}
