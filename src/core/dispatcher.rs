// src/core/dispatcher.rs

use std::env;
use std::ffi::OsString;
use std::io::{self, Write};
use std::path::Path;
use std::process;

use super::compiler::{Compiler, Resolution};
use super::tree::{Entity, Namespace};
use crate::config::Settings;
use crate::constants::FALLBACK_PROG;
use crate::error::DispatchError;
use crate::models::Args;

/// How a dispatch run ended when it did not fail.
#[derive(Debug)]
pub enum Outcome {
    /// The resolved action ran to completion.
    Completed,
    /// A namespace was selected without a sub-command. Carries its parser,
    /// ready to render or print its help.
    Help(Box<clap::Command>),
}

/// Entry point of a program built on a command tree.
///
/// Every run compiles the tree afresh from the root, resolves the tokens to
/// one target and calls it.
pub struct Dispatcher<'t> {
    root: &'t Namespace,
    settings: Settings,
}

impl<'t> Dispatcher<'t> {
    pub fn new(root: &'t Namespace) -> Self {
        Self {
            root,
            settings: Settings::default(),
        }
    }

    pub fn settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    /// Resolves and runs `tokens` without touching the process: help is
    /// returned, usage errors are returned, nothing exits.
    pub fn try_run_from<I, T>(&self, tokens: I) -> Result<Outcome, DispatchError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        let tokens: Vec<OsString> = tokens.into_iter().map(Into::into).collect();
        let prog = self.prog();
        log::debug!("Dispatching {:?} for '{}'", tokens, prog);

        let mut record = Args::new();
        let compiler = Compiler::new(&self.settings);
        match compiler.resolve_root(self.root, prog, tokens, &mut record)? {
            Resolution::Help(parser) => Ok(Outcome::Help(Box::new(parser))),
            Resolution::Run { path, action } => {
                log::info!("Running '{}'", path);
                log::debug!("Bound arguments: {:?}", record);
                action(&record).map_err(|source| DispatchError::Action {
                    command: path,
                    source,
                })?;
                Ok(Outcome::Completed)
            }
        }
    }

    /// Like `try_run_from`, with the process-level endings: help is printed
    /// and the process exits with the usage status, usage errors are printed
    /// and exit the process. Only action failures come back to the caller.
    pub fn run_from<I, T>(&self, tokens: I) -> Result<(), DispatchError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        match self.try_run_from(tokens) {
            Ok(Outcome::Completed) => Ok(()),
            Ok(Outcome::Help(mut parser)) => {
                // Colors follow the parser's color choice and the environment.
                if let Err(e) = parser.print_help() {
                    log::warn!("Could not print help: {}", e);
                }
                let _ = io::stdout().flush();
                process::exit(self.settings.usage_exit_code)
            }
            Err(DispatchError::Usage(err)) => err.exit(),
            Err(err) => Err(err),
        }
    }

    /// Runs against the process arguments.
    pub fn run(&self) -> Result<(), DispatchError> {
        self.run_from(env::args_os().skip(1))
    }

    fn prog(&self) -> String {
        if let Some(prog) = &self.settings.prog {
            return prog.clone();
        }
        if !self.root.name().is_empty() {
            return self.root.name().to_string();
        }
        env::args_os()
            .next()
            .as_deref()
            .and_then(|argv0| Path::new(argv0).file_name())
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| FALLBACK_PROG.to_string())
    }
}

// --- SHORTCUTS ON THE ROOT ---

impl Namespace {
    /// Runs this namespace as a program against the process arguments.
    pub fn run(&self) -> Result<(), DispatchError> {
        Dispatcher::new(self).run()
    }

    pub fn run_from<I, T>(&self, tokens: I) -> Result<(), DispatchError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        Dispatcher::new(self).run_from(tokens)
    }

    pub fn try_run_from<I, T>(&self, tokens: I) -> Result<Outcome, DispatchError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        Dispatcher::new(self).try_run_from(tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::modifier::{argument, command_name};
    use crate::core::tree::{Container, root};
    use crate::models::ArgSpec;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn runs_the_resolved_action_once() {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let mut root = root(Vec::new()).unwrap();
        for name in ["a", "b", "c"] {
            let calls = Rc::clone(&calls);
            root.command(
                move |_: &Args| {
                    calls.borrow_mut().push(name);
                    Ok(())
                },
                vec![command_name(name)],
            )
            .unwrap();
        }

        let outcome = root.try_run_from(["b"]).unwrap();
        assert!(matches!(outcome, Outcome::Completed));
        assert_eq!(*calls.borrow(), vec!["b"]);
    }

    #[test]
    fn action_failures_are_returned_with_the_path() {
        let mut root = root(Vec::new()).unwrap();
        root.command(
            |_: &Args| anyhow::bail!("disk full"),
            vec![command_name("save")],
        )
        .unwrap();

        let settings = Settings::default().prog("tool");
        let err = Dispatcher::new(&root)
            .settings(settings)
            .try_run_from(["save"])
            .unwrap_err();
        match err {
            DispatchError::Action { command, source } => {
                assert_eq!(command, "tool save");
                assert_eq!(source.to_string(), "disk full");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn version_is_offered_on_the_root_only() {
        let mut root = root(Vec::new()).unwrap();
        root.namespace("sub", Vec::new()).unwrap();
        let dispatcher = Dispatcher::new(&root).settings(Settings::default().prog("tool").version("9.9.9"));

        let err = dispatcher.try_run_from(["--version"]).unwrap_err();
        let DispatchError::Usage(err) = err else {
            panic!("expected a usage error");
        };
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);

        let err = dispatcher.try_run_from(["sub", "--version"]).unwrap_err();
        assert!(err.is_usage());
    }

    #[test]
    fn help_outcome_carries_usage() {
        let root = root(vec![argument(ArgSpec::switch("verbose"))]).unwrap();
        let outcome = Dispatcher::new(&root)
            .settings(Settings::default().prog("tool"))
            .try_run_from(Vec::<String>::new())
            .unwrap();
        let Outcome::Help(mut parser) = outcome else {
            panic!("expected help");
        };
        assert!(parser.render_help().to_string().contains("Usage: tool"));
    }

    #[test]
    fn renamed_root_names_the_program() {
        let root = root(vec![command_name("svc")]).unwrap();
        let outcome = root.try_run_from(Vec::<String>::new()).unwrap();
        let Outcome::Help(mut parser) = outcome else {
            panic!("expected help");
        };
        assert!(parser.render_help().to_string().contains("Usage: svc"));
    }
}
