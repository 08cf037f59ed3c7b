// src/core/modifier.rs

use super::tree::{Container, Entity, Namespace, Node};
use crate::error::RegistrationError;
use crate::models::ArgSpec;

/// Customizes a node while it is being registered.
///
/// Hooks run once, in declaration order, right after the node is built:
/// `init_namespace` for namespaces, `init_command` for commands and raw
/// commands, then `init_args` to record argument declarations. Raw commands
/// are never structurally parsed, so `init_args` is not called for them.
pub trait Modifier {
    fn init_namespace(&self, _ns: &mut Namespace) -> Result<(), RegistrationError> {
        Ok(())
    }

    fn init_command(&self, _cmd: &mut dyn Entity) -> Result<(), RegistrationError> {
        Ok(())
    }

    fn init_args(&self, _args: &mut Vec<ArgSpec>) {}
}

/// Overrides the name of a namespace or command.
pub fn command_name(name: impl Into<String>) -> Box<dyn Modifier> {
    Box::new(CommandName(name.into()))
}

/// Declares one structured argument on a namespace or command.
pub fn argument(spec: ArgSpec) -> Box<dyn Modifier> {
    Box::new(Argument(spec))
}

/// Imports already built nodes as children.
pub fn with_commands<I, N>(nodes: I) -> Box<dyn Modifier>
where
    I: IntoIterator<Item = N>,
    N: Into<Node>,
{
    Box::new(WithCommands(nodes.into_iter().map(Into::into).collect()))
}

/// Sets the description shown in help output.
pub fn describe(doc: impl Into<String>) -> Box<dyn Modifier> {
    Box::new(Describe(doc.into()))
}

struct CommandName(String);

impl Modifier for CommandName {
    fn init_namespace(&self, ns: &mut Namespace) -> Result<(), RegistrationError> {
        ns.set_name(self.0.clone());
        Ok(())
    }

    fn init_command(&self, cmd: &mut dyn Entity) -> Result<(), RegistrationError> {
        cmd.set_name(self.0.clone());
        Ok(())
    }
}

struct Argument(ArgSpec);

impl Modifier for Argument {
    fn init_args(&self, args: &mut Vec<ArgSpec>) {
        // Same destination declared twice keeps a single entry.
        match args.iter_mut().find(|spec| spec.dest == self.0.dest) {
            Some(existing) => *existing = self.0.clone(),
            None => args.push(self.0.clone()),
        }
    }
}

struct WithCommands(Vec<Node>);

impl Modifier for WithCommands {
    fn init_namespace(&self, ns: &mut Namespace) -> Result<(), RegistrationError> {
        ns.add_children(self.0.iter().cloned());
        Ok(())
    }

    fn init_command(&self, cmd: &mut dyn Entity) -> Result<(), RegistrationError> {
        for node in &self.0 {
            cmd.attach(node.clone())?;
        }
        Ok(())
    }
}

struct Describe(String);

impl Modifier for Describe {
    fn init_namespace(&self, ns: &mut Namespace) -> Result<(), RegistrationError> {
        ns.set_doc(self.0.clone());
        Ok(())
    }

    fn init_command(&self, cmd: &mut dyn Entity) -> Result<(), RegistrationError> {
        cmd.set_doc(self.0.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::tree::{command, namespace, raw_command};

    fn noop(_: &crate::models::Args) -> anyhow::Result<()> {
        Ok(())
    }

    #[test]
    fn renames_namespaces_and_commands() {
        let ns = namespace("svc", vec![command_name("service")]).unwrap();
        assert_eq!(ns.name(), "service");
        // Namespaces describe themselves with the name they were declared with.
        assert_eq!(ns.doc(), "svc");

        let cmd = command(noop, vec![command_name("start")]).unwrap();
        assert_eq!(cmd.name(), "start");
    }

    #[test]
    fn repeated_argument_keeps_one_declaration() {
        let spec = ArgSpec::option("level");
        let ns = namespace(
            "ops",
            vec![
                argument(spec.clone()),
                argument(ArgSpec::switch("dry-run")),
                argument(spec.clone().default_value("3")),
            ],
        )
        .unwrap();
        let dests: Vec<&str> = ns.args().iter().map(|a| a.dest.as_str()).collect();
        assert_eq!(dests, vec!["level", "dry_run"]);
        assert_eq!(ns.args()[0].default.as_deref(), Some("3"));
    }

    #[test]
    fn imports_into_namespaces_and_commands() {
        let leaf = command(noop, vec![command_name("leaf")]).unwrap();
        let ns = namespace("group", vec![with_commands([leaf.clone()])]).unwrap();
        assert!(ns.child("leaf").is_some());

        let parent = command(noop, vec![command_name("parent"), with_commands([leaf])]).unwrap();
        assert!(parent.child("leaf").is_some());
    }

    #[test]
    fn importing_into_raw_command_fails_at_registration() {
        let leaf = command(noop, vec![command_name("leaf")]).unwrap();
        let err = raw_command(noop, vec![command_name("exec"), with_commands([leaf])]).unwrap_err();
        assert!(matches!(err, RegistrationError::RawChildren(ref name) if name == "exec"));
    }

    #[test]
    fn argument_on_raw_command_is_ignored() {
        let raw = raw_command(
            noop,
            vec![command_name("exec"), argument(ArgSpec::switch("verbose"))],
        )
        .unwrap();
        assert_eq!(raw.name(), "exec");
    }

    #[test]
    fn describe_sets_help_text() {
        let cmd = command(noop, vec![command_name("build"), describe("Build everything")]).unwrap();
        assert_eq!(cmd.doc(), "Build everything");
    }
}
