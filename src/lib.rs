// src/lib.rs

//! Declarative command trees.
//!
//! A program declares namespaces, commands and raw commands, attaches typed
//! arguments to them with modifiers, and hands the root to a [`Dispatcher`].
//! Each run compiles the tree into one parser per visited node, follows the
//! tokens down to a single target and calls its action with the merged
//! [`Args`] record.
//!
//! ```no_run
//! use clidec::{ArgSpec, Args, Container, argument, command_name, root};
//!
//! fn main() -> anyhow::Result<()> {
//!     let mut app = root(vec![argument(ArgSpec::switch("verbose"))])?;
//!     let deploy = app.namespace("deploy", vec![])?;
//!     deploy.command(
//!         |args: &Args| {
//!             println!("deploying {:?}", args.str("target"));
//!             Ok(())
//!         },
//!         vec![command_name("start"), argument(ArgSpec::positional("target"))],
//!     )?;
//!     deploy.raw_command(
//!         |args: &Args| {
//!             println!("forwarding {:?}", args.raw());
//!             Ok(())
//!         },
//!         vec![command_name("run")],
//!     )?;
//!     app.run()?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod constants;
pub mod core;
pub mod error;
pub mod models;
pub mod system;

pub use crate::config::{ColorMode, Settings};
pub use crate::core::dispatcher::{Dispatcher, Outcome};
pub use crate::core::modifier::{Modifier, argument, command_name, describe, with_commands};
pub use crate::core::raw::RawCommand;
pub use crate::core::tree::{
    Action, Command, Container, Entity, Namespace, Node, command, namespace, raw_command, root,
};
pub use crate::error::{ConfigError, DispatchError, RegistrationError};
pub use crate::models::{ArgSpec, Args, Arity, Value, ValueType};
