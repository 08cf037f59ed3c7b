// src/core/compiler.rs

use clap::error::ErrorKind;
use clap::{Arg, ArgAction, value_parser};
use std::collections::BTreeMap;
use std::ffi::OsString;

use super::raw;
use super::tree::{Action, Command, Container, Entity, Namespace, Node};
use crate::config::Settings;
use crate::constants::{COMMAND_FIELD, DISPATCH_ID};
use crate::models::{ArgSpec, Args, Arity, Value};

/// Where a dispatch run ended.
pub(crate) enum Resolution<'t> {
    /// A command or raw command was reached. `path` is the full invocation path.
    Run { path: String, action: &'t Action },
    /// A namespace was reached with nothing left to choose a child.
    Help(clap::Command),
}

/// The parts of a namespace or command the parsing engine needs.
struct Branch<'t> {
    name: &'t str,
    doc: &'t str,
    args: &'t [ArgSpec],
    children: &'t BTreeMap<String, Node>,
    action: Option<&'t Action>,
}

impl<'t> From<&'t Namespace> for Branch<'t> {
    fn from(ns: &'t Namespace) -> Self {
        Branch {
            name: ns.name(),
            doc: ns.doc(),
            args: ns.args(),
            children: ns.children(),
            action: None,
        }
    }
}

impl<'t> From<&'t Command> for Branch<'t> {
    fn from(cmd: &'t Command) -> Self {
        Branch {
            name: cmd.name(),
            doc: cmd.doc(),
            args: cmd.args(),
            children: cmd.children(),
            action: Some(cmd.action()),
        }
    }
}

/// Builds one parser per visited node and walks the tree along the tokens.
///
/// Parsers are built on demand and dropped with the run; nothing is cached
/// between dispatches.
pub(crate) struct Compiler<'s> {
    settings: &'s Settings,
}

impl<'s> Compiler<'s> {
    pub(crate) fn new(settings: &'s Settings) -> Self {
        Self { settings }
    }

    /// Resolves `tokens` (program name excluded) against the tree under `root`,
    /// writing every bound field into `record`.
    pub(crate) fn resolve_root<'t>(
        &self,
        root: &'t Namespace,
        prog: String,
        tokens: Vec<OsString>,
        record: &mut Args,
    ) -> Result<Resolution<'t>, clap::Error> {
        self.resolve_branch(Branch::from(root), prog, true, tokens, record)
    }

    fn resolve_node<'t>(
        &self,
        node: &'t Node,
        path: String,
        tokens: Vec<OsString>,
        record: &mut Args,
    ) -> Result<Resolution<'t>, clap::Error> {
        match node {
            Node::Raw(raw_cmd) => {
                log::debug!("'{}' is raw, capturing {} token(s).", path, tokens.len());
                raw::capture(tokens, record);
                Ok(Resolution::Run {
                    path,
                    action: raw_cmd.action(),
                })
            }
            Node::Namespace(ns) => self.resolve_branch(Branch::from(ns), path, false, tokens, record),
            Node::Command(cmd) => self.resolve_branch(Branch::from(cmd), path, false, tokens, record),
        }
    }

    fn resolve_branch<'t>(
        &self,
        branch: Branch<'t>,
        path: String,
        is_root: bool,
        tokens: Vec<OsString>,
        record: &mut Args,
    ) -> Result<Resolution<'t>, clap::Error> {
        let mut parser = self.compile(&branch, &path, is_root);

        // The node's own parser only sees what precedes the child name; the
        // tail goes to the child untouched.
        let (own, mut tail) = match find_child(&branch, &tokens) {
            Some(at) => {
                let mut own = tokens;
                let tail = own.split_off(at);
                (own, tail)
            }
            None => (tokens, Vec::new()),
        };
        let matches = parser.try_get_matches_from_mut(own)?;

        for spec in branch.args {
            record.set(spec.dest.clone(), spec.bind(&matches));
        }

        let mut rest: Vec<OsString> = if branch.children.is_empty() {
            Vec::new()
        } else {
            matches
                .get_many::<OsString>(DISPATCH_ID)
                .map(|values| values.cloned().collect())
                .unwrap_or_default()
        };
        rest.append(&mut tail);

        if rest.is_empty() {
            return Ok(match branch.action {
                Some(action) => Resolution::Run { path, action },
                None => {
                    log::debug!("No sub-command given for '{}'.", path);
                    Resolution::Help(parser)
                }
            });
        }

        // Every step consumes the child's name, so recursion always ends.
        let token = rest.remove(0);
        let Some((chosen, child)) = token
            .to_str()
            .and_then(|name| branch.children.get_key_value(name))
        else {
            let choices: Vec<&str> = branch.children.keys().map(String::as_str).collect();
            return Err(parser.error(
                ErrorKind::InvalidSubcommand,
                format!(
                    "unknown subcommand '{}' (choose from: {})",
                    token.to_string_lossy(),
                    choices.join(", ")
                ),
            ));
        };

        log::debug!("'{}' delegates {} token(s) to '{}'.", path, rest.len(), chosen);
        record.set(COMMAND_FIELD, Value::Str(chosen.clone()));
        let child_path = format!("{} {}", path, chosen);
        self.resolve_node(child, child_path, rest, record)
    }

    /// The engine-level parser of one node: its own arguments plus, when it
    /// has children, a trailing positional collecting whatever is left once
    /// the node's own arguments are bound. Its first value names the child.
    fn compile(&self, branch: &Branch<'_>, path: &str, is_root: bool) -> clap::Command {
        let name = if branch.name.is_empty() { path } else { branch.name };
        let mut parser = clap::Command::new(name.to_string())
            .bin_name(path.to_string())
            .no_binary_name(true)
            .color(self.settings.color.into());

        if !branch.doc.is_empty() {
            parser = parser.about(branch.doc.to_string());
        }
        if is_root {
            if let Some(version) = &self.settings.version {
                parser = parser.version(version.clone());
            }
        }

        for spec in branch.args {
            parser = parser.arg(spec.to_arg());
        }

        if !branch.children.is_empty() {
            let names: Vec<&str> = branch.children.keys().map(String::as_str).collect();
            parser = parser
                .arg(
                    Arg::new(DISPATCH_ID)
                        .value_name("COMMAND")
                        .help(format!("Sub-command to run ({})", names.join(", ")))
                        .value_parser(value_parser!(OsString))
                        .action(ArgAction::Set)
                        .num_args(1..)
                        .trailing_var_arg(true),
                )
                .after_help(commands_section(branch.children));
        }
        parser
    }
}

/// Position of the token naming the chosen child, if any.
///
/// Values of the node's own options are skipped and its required positionals
/// are filled first. Optional positionals only get what precedes the child
/// name, so a bare child name is never taken as one.
fn find_child(branch: &Branch<'_>, tokens: &[OsString]) -> Option<usize> {
    if branch.children.is_empty() {
        return None;
    }
    let mut required: usize = branch
        .args
        .iter()
        .filter(|spec| spec.is_positional() && spec.required)
        .map(|spec| min_values(spec.arity))
        .sum();
    let mut options_done = false;
    let mut at = 0;
    while at < tokens.len() {
        let token = tokens[at].to_string_lossy();
        at += 1;
        if !options_done && token == "--" {
            options_done = true;
        } else if !options_done && token.len() > 1 && token.starts_with('-') {
            at += values_taken(branch.args, &token, &tokens[at..]);
        } else if required > 0 {
            required -= 1;
        } else if branch.children.contains_key(&*token) {
            return Some(at - 1);
        }
    }
    None
}

/// How many of the `following` tokens the option written as `token` takes.
fn values_taken(args: &[ArgSpec], token: &str, following: &[OsString]) -> usize {
    let spec = match token.strip_prefix("--") {
        Some(long) if long.contains('=') => return 0,
        Some(long) => args.iter().find(|spec| spec.long.as_deref() == Some(long)),
        None => {
            // `-vx VALUE`: flags up to the first short that takes a value,
            // whose value is the rest of the cluster or the next tokens.
            let cluster = &token[1..];
            let mut found = None;
            for (pos, short) in cluster.char_indices() {
                let Some(spec) = args.iter().find(|spec| spec.short == Some(short)) else {
                    return 0;
                };
                if !spec.arity.is_flag() {
                    if pos + short.len_utf8() < cluster.len() {
                        return 0;
                    }
                    found = Some(spec);
                    break;
                }
            }
            found
        }
    };
    let Some(spec) = spec.filter(|spec| !spec.arity.is_flag()) else {
        return 0;
    };
    let limit = max_values(spec.arity).unwrap_or(usize::MAX);
    following
        .iter()
        .take(limit)
        .take_while(|value| !value.to_string_lossy().starts_with('-'))
        .count()
}

fn min_values(arity: Arity) -> usize {
    match arity {
        Arity::Single | Arity::OneOrMore | Arity::Append => 1,
        Arity::Exactly(n) => n,
        _ => 0,
    }
}

fn max_values(arity: Arity) -> Option<usize> {
    match arity {
        Arity::Switch | Arity::SwitchOff | Arity::Count => Some(0),
        Arity::Single | Arity::Optional | Arity::Append => Some(1),
        Arity::Exactly(n) => Some(n),
        Arity::ZeroOrMore | Arity::OneOrMore => None,
    }
}

/// `Commands:` listing with each child's description, aligned on names.
fn commands_section(children: &BTreeMap<String, Node>) -> String {
    let width = children.keys().map(String::len).max().unwrap_or(0);
    let mut section = String::from("Commands:\n");
    for (name, node) in children {
        section.push_str(&format!("  {:<width$}  {}\n", name, node.doc(), width = width));
    }
    section
}
