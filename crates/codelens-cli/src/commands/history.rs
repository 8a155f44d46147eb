//! History command implementation.

use crate::cli::HistoryArgs;
use crate::config::Config;
use crate::error::Result;
use crate::history::History;
use crate::output::Formatter;

/// Execute the history command.
pub fn execute_history(args: HistoryArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let mut history = History::load(config.settings.history_size);

    if args.clear {
        history.clear();
        history.save()?;
        println!("{}", formatter.success("History cleared."));
        return Ok(());
    }

    println!("{}", formatter.history_table(history.entries()));
    Ok(())
}
