// src/core/tree.rs

use std::any;
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::fmt;
use std::rc::Rc;

use super::modifier::Modifier;
use super::raw::RawCommand;
use crate::error::RegistrationError;
use crate::models::{ArgSpec, Args};

/// Function bound to a command, called with the fully merged record.
pub type Action = Rc<dyn Fn(&Args) -> anyhow::Result<()>>;

/// Capabilities every node offers to modifiers.
pub trait Entity {
    fn name(&self) -> &str;
    fn set_name(&mut self, name: String);
    fn doc(&self) -> &str;
    fn set_doc(&mut self, doc: String);
    /// Adds a child, failing on nodes that cannot hold children.
    fn attach(&mut self, node: Node) -> Result<(), RegistrationError>;
}

/// Any node in the command tree.
#[derive(Debug, Clone)]
pub enum Node {
    Namespace(Namespace),
    Command(Command),
    Raw(RawCommand),
}

impl Node {
    pub fn name(&self) -> &str {
        match self {
            Node::Namespace(ns) => ns.name(),
            Node::Command(cmd) => cmd.name(),
            Node::Raw(raw) => raw.name(),
        }
    }

    pub fn doc(&self) -> &str {
        match self {
            Node::Namespace(ns) => ns.doc(),
            Node::Command(cmd) => cmd.doc(),
            Node::Raw(raw) => raw.doc(),
        }
    }
}

impl From<Namespace> for Node {
    fn from(ns: Namespace) -> Self {
        Node::Namespace(ns)
    }
}

impl From<Command> for Node {
    fn from(cmd: Command) -> Self {
        Node::Command(cmd)
    }
}

impl From<RawCommand> for Node {
    fn from(raw: RawCommand) -> Self {
        Node::Raw(raw)
    }
}

/// Nodes that own children: namespaces and commands.
///
/// Children are keyed by name. Adding a child whose name is already taken
/// replaces the previous one without error, so later registrations override
/// earlier ones.
pub trait Container {
    fn children(&self) -> &BTreeMap<String, Node>;
    fn children_mut(&mut self) -> &mut BTreeMap<String, Node>;

    fn child(&self, name: &str) -> Option<&Node> {
        self.children().get(name)
    }

    fn add_child(&mut self, node: impl Into<Node>) {
        let node = node.into();
        let name = node.name().to_string();
        if self.children_mut().insert(name.clone(), node).is_some() {
            log::debug!("Child '{}' replaced by a newer registration.", name);
        }
    }

    /// Adds children left to right; on a name collision the later one wins.
    fn add_children<I>(&mut self, nodes: I)
    where
        I: IntoIterator,
        I::Item: Into<Node>,
    {
        for node in nodes {
            self.add_child(node);
        }
    }

    /// Declares a child namespace and returns it for further registration.
    fn namespace(
        &mut self,
        name: impl Into<String>,
        modifiers: impl IntoIterator<Item = Box<dyn Modifier>>,
    ) -> Result<&mut Namespace, RegistrationError> {
        let ns = Namespace::new(name, modifiers)?;
        let node = Node::Namespace(ns);
        let slot = match self.children_mut().entry(node.name().to_string()) {
            Entry::Occupied(mut entry) => {
                log::debug!("Child '{}' replaced by a newer registration.", entry.key());
                entry.insert(node);
                entry.into_mut()
            }
            Entry::Vacant(entry) => entry.insert(node),
        };
        match slot {
            Node::Namespace(ns) => Ok(ns),
            _ => unreachable!("a namespace was just inserted"),
        }
    }

    /// Registers `action` as a child command and returns a copy of the node,
    /// which can be imported elsewhere with `with_commands`.
    fn command<F>(
        &mut self,
        action: F,
        modifiers: impl IntoIterator<Item = Box<dyn Modifier>>,
    ) -> Result<Command, RegistrationError>
    where
        F: Fn(&Args) -> anyhow::Result<()> + 'static,
    {
        let cmd = command(action, modifiers)?;
        self.add_child(cmd.clone());
        Ok(cmd)
    }

    /// Registers `action` as a child raw command.
    fn raw_command<F>(
        &mut self,
        action: F,
        modifiers: impl IntoIterator<Item = Box<dyn Modifier>>,
    ) -> Result<RawCommand, RegistrationError>
    where
        F: Fn(&Args) -> anyhow::Result<()> + 'static,
    {
        let raw = raw_command(action, modifiers)?;
        self.add_child(raw.clone());
        Ok(raw)
    }
}

// --- NAMESPACE ---

/// A branching node without an action of its own. Selecting it without a
/// sub-command prints its help.
#[derive(Debug, Clone)]
pub struct Namespace {
    name: String,
    doc: String,
    args: Vec<ArgSpec>,
    children: BTreeMap<String, Node>,
}

impl Namespace {
    pub fn new(
        name: impl Into<String>,
        modifiers: impl IntoIterator<Item = Box<dyn Modifier>>,
    ) -> Result<Self, RegistrationError> {
        let name = name.into();
        let mut ns = Namespace {
            doc: name.clone(),
            name,
            args: Vec::new(),
            children: BTreeMap::new(),
        };
        for modifier in modifiers {
            modifier.init_namespace(&mut ns)?;
            modifier.init_args(&mut ns.args);
        }
        log::debug!("Namespace '{}' registered.", ns.name);
        Ok(ns)
    }

    pub fn args(&self) -> &[ArgSpec] {
        &self.args
    }
}

impl Entity for Namespace {
    fn name(&self) -> &str {
        &self.name
    }

    fn set_name(&mut self, name: String) {
        self.name = name;
    }

    fn doc(&self) -> &str {
        &self.doc
    }

    fn set_doc(&mut self, doc: String) {
        self.doc = doc;
    }

    fn attach(&mut self, node: Node) -> Result<(), RegistrationError> {
        self.add_child(node);
        Ok(())
    }
}

impl Container for Namespace {
    fn children(&self) -> &BTreeMap<String, Node> {
        &self.children
    }

    fn children_mut(&mut self) -> &mut BTreeMap<String, Node> {
        &mut self.children
    }
}

// --- COMMAND ---

/// An executable node. It may hold children of its own; when none is chosen
/// its action runs.
#[derive(Clone)]
pub struct Command {
    name: String,
    doc: String,
    action: Action,
    args: Vec<ArgSpec>,
    children: BTreeMap<String, Node>,
}

impl Command {
    pub fn new<F>(name: impl Into<String>, action: F) -> Self
    where
        F: Fn(&Args) -> anyhow::Result<()> + 'static,
    {
        Command {
            name: name.into(),
            doc: String::new(),
            action: Rc::new(action),
            args: Vec::new(),
            children: BTreeMap::new(),
        }
    }

    pub fn args(&self) -> &[ArgSpec] {
        &self.args
    }

    pub fn action(&self) -> &Action {
        &self.action
    }

    /// Runs the bound action directly, bypassing dispatch.
    pub fn call(&self, args: &Args) -> anyhow::Result<()> {
        (self.action)(args)
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("doc", &self.doc)
            .field("args", &self.args)
            .field("children", &self.children)
            .finish_non_exhaustive()
    }
}

impl Entity for Command {
    fn name(&self) -> &str {
        &self.name
    }

    fn set_name(&mut self, name: String) {
        self.name = name;
    }

    fn doc(&self) -> &str {
        &self.doc
    }

    fn set_doc(&mut self, doc: String) {
        self.doc = doc;
    }

    fn attach(&mut self, node: Node) -> Result<(), RegistrationError> {
        self.add_child(node);
        Ok(())
    }
}

impl Container for Command {
    fn children(&self) -> &BTreeMap<String, Node> {
        &self.children
    }

    fn children_mut(&mut self) -> &mut BTreeMap<String, Node> {
        &mut self.children
    }
}

// --- CONSTRUCTORS ---

/// The anonymous top-level namespace of a program.
pub fn root(
    modifiers: impl IntoIterator<Item = Box<dyn Modifier>>,
) -> Result<Namespace, RegistrationError> {
    Namespace::new("", modifiers)
}

/// A standalone namespace, to be imported with `with_commands` or run directly.
pub fn namespace(
    name: impl Into<String>,
    modifiers: impl IntoIterator<Item = Box<dyn Modifier>>,
) -> Result<Namespace, RegistrationError> {
    Namespace::new(name, modifiers)
}

/// Wraps `action` into a standalone command named after the function.
///
/// Closures have no usable name and need a `command_name(..)` modifier.
pub fn command<F>(
    action: F,
    modifiers: impl IntoIterator<Item = Box<dyn Modifier>>,
) -> Result<Command, RegistrationError>
where
    F: Fn(&Args) -> anyhow::Result<()> + 'static,
{
    let mut cmd = Command::new(function_name::<F>(), action);
    for modifier in modifiers {
        modifier.init_command(&mut cmd)?;
        modifier.init_args(&mut cmd.args);
    }
    if cmd.name.is_empty() {
        return Err(RegistrationError::Unnamed);
    }
    log::debug!("Command '{}' registered.", cmd.name);
    Ok(cmd)
}

/// Wraps `action` into a standalone raw command named after the function.
pub fn raw_command<F>(
    action: F,
    modifiers: impl IntoIterator<Item = Box<dyn Modifier>>,
) -> Result<RawCommand, RegistrationError>
where
    F: Fn(&Args) -> anyhow::Result<()> + 'static,
{
    let mut raw = RawCommand::new(function_name::<F>(), action);
    for modifier in modifiers {
        modifier.init_command(&mut raw)?;
    }
    if raw.name().is_empty() {
        return Err(RegistrationError::Unnamed);
    }
    log::debug!("Raw command '{}' registered.", raw.name());
    Ok(raw)
}

/// Last path segment of a function item's type name, empty for closures.
fn function_name<F>() -> String {
    let path = any::type_name::<F>();
    let last = path.rsplit("::").next().unwrap_or(path);
    if last.contains(|c: char| matches!(c, '{' | '}' | '<' | '>' | ' ')) {
        String::new()
    } else {
        last.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::modifier::{command_name, with_commands};

    fn deploy(_: &Args) -> anyhow::Result<()> {
        Ok(())
    }

    fn noop(_: &Args) -> anyhow::Result<()> {
        Ok(())
    }

    #[test]
    fn commands_are_named_after_their_function() {
        let cmd = command(deploy, Vec::new()).unwrap();
        assert_eq!(cmd.name(), "deploy");
        assert_eq!(cmd.doc(), "");
    }

    #[test]
    fn closures_need_an_explicit_name() {
        let err = command(|_: &Args| Ok(()), Vec::new()).unwrap_err();
        assert!(matches!(err, RegistrationError::Unnamed));

        let cmd = command(|_: &Args| Ok(()), vec![command_name("status")]).unwrap();
        assert_eq!(cmd.name(), "status");
    }

    #[test]
    fn root_is_anonymous() {
        let root = root(Vec::new()).unwrap();
        assert_eq!(root.name(), "");
        assert!(root.children().is_empty());
    }

    #[test]
    fn same_name_replaces_previous_child() {
        let mut ns = namespace("ops", Vec::new()).unwrap();
        ns.add_child(namespace("x", Vec::new()).unwrap());
        ns.add_child(command(noop, vec![command_name("x")]).unwrap());

        assert_eq!(ns.children().len(), 1);
        assert!(matches!(ns.child("x"), Some(Node::Command(_))));
    }

    #[test]
    fn add_children_later_entries_win() {
        let mut ns = namespace("ops", Vec::new()).unwrap();
        let first = namespace("dup", vec![crate::core::modifier::describe("first")]).unwrap();
        let second = namespace("dup", vec![crate::core::modifier::describe("second")]).unwrap();
        ns.add_children([first, second]);

        assert_eq!(ns.child("dup").map(Node::doc), Some("second"));
    }

    #[test]
    fn nested_registration_through_returned_namespace() {
        let mut root = root(Vec::new()).unwrap();
        let deploy_ns = root.namespace("deploy", Vec::new()).unwrap();
        deploy_ns.raw_command(noop, vec![command_name("run")]).unwrap();
        deploy_ns.command(deploy, Vec::new()).unwrap();

        let Some(Node::Namespace(ns)) = root.child("deploy") else {
            panic!("deploy namespace missing");
        };
        assert!(matches!(ns.child("run"), Some(Node::Raw(_))));
        assert!(matches!(ns.child("deploy"), Some(Node::Command(_))));
    }

    #[test]
    fn returned_commands_compose_into_other_trees() {
        let mut tools = namespace("tools", Vec::new()).unwrap();
        let fmt = tools.command(noop, vec![command_name("fmt")]).unwrap();

        let other = namespace("dev", vec![with_commands([fmt])]).unwrap();
        assert!(other.child("fmt").is_some());
        assert!(tools.child("fmt").is_some());
    }

    #[test]
    fn command_with_children() {
        let mut parent = command(noop, vec![command_name("db")]).unwrap();
        parent.command(noop, vec![command_name("migrate")]).unwrap();
        assert!(parent.child("migrate").is_some());
        assert!(parent.call(&Args::new()).is_ok());
    }
}
