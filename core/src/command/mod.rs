mod builder;

pub use builder::{build_command, mask_secret, CommandSpec, REPORTERS, RUN_SUBCOMMAND};
