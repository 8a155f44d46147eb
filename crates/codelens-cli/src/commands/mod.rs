//! CLI command implementations.

pub mod analyze;
pub mod extract;
pub mod history;
pub mod practice;
pub mod run;

pub use self::analyze::execute_analyze;
pub use self::extract::execute_extract;
pub use self::history::execute_history;
pub use self::practice::execute_practice;
pub use self::run::execute_run;
