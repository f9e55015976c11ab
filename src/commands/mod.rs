//! Subcommand handlers.
//!
//! Each file in this module corresponds to one user-facing command:
//!
//! | File          | Invocation                  | Description                     |
//! |---------------|-----------------------------|---------------------------------|
//! | `run.rs`      | `manual-nas-tool` (default) | Interactive backup session      |
//! | `install.rs`  | `manual-nas-tool install`   | Copy the binary onto `PATH`     |

pub mod install;
pub mod run;
