// src/constants.rs

/// Field of the bound record holding the name of the chosen sub-command.
pub const COMMAND_FIELD: &str = "command";

/// Field of the bound record holding the tokens captured by a raw command.
pub const RAW_FIELD: &str = "raw";

/// Exit status used when a namespace is selected without a sub-command.
pub const USAGE_EXIT_CODE: i32 = 1;

/// Program name used when neither the settings nor `argv[0]` provide one.
pub const FALLBACK_PROG: &str = "app";

/// Engine-level id of the positional collecting the chosen child and its
/// tokens. Kept apart from the record field names so a user argument may bind
/// to `command`.
pub(crate) const DISPATCH_ID: &str = "clidec-dispatch";
