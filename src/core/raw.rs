// src/core/raw.rs

use std::ffi::OsString;
use std::fmt;
use std::rc::Rc;

use super::tree::{Action, Entity, Node};
use crate::constants::RAW_FIELD;
use crate::error::RegistrationError;
use crate::models::{Args, Value};

/// A leaf that skips structured parsing. Every token after its name is
/// handed to the action as-is, under the `raw` field.
///
/// Meant for commands that forward to an external program whose arguments
/// are owned elsewhere.
#[derive(Clone)]
pub struct RawCommand {
    name: String,
    doc: String,
    action: Action,
}

impl RawCommand {
    pub fn new<F>(name: impl Into<String>, action: F) -> Self
    where
        F: Fn(&Args) -> anyhow::Result<()> + 'static,
    {
        RawCommand {
            name: name.into(),
            doc: String::new(),
            action: Rc::new(action),
        }
    }

    pub fn action(&self) -> &Action {
        &self.action
    }
}

impl fmt::Debug for RawCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawCommand")
            .field("name", &self.name)
            .field("doc", &self.doc)
            .finish_non_exhaustive()
    }
}

impl Entity for RawCommand {
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

    fn attach(&mut self, _node: Node) -> Result<(), RegistrationError> {
        Err(RegistrationError::RawChildren(self.name.clone()))
    }
}

/// Stores the remaining tokens verbatim. No flag syntax, no coercion.
pub(crate) fn capture(tokens: Vec<OsString>, record: &mut Args) {
    let captured = tokens
        .into_iter()
        .map(|token| Value::Str(token.to_string_lossy().into_owned()))
        .collect();
    record.set(RAW_FIELD, Value::List(captured));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::tree::namespace;

    #[test]
    fn captures_tokens_verbatim() {
        let mut record = Args::new();
        let tokens = ["--foo", "bar", "-x", "--", "baz"].map(OsString::from).to_vec();
        capture(tokens, &mut record);
        assert_eq!(record.raw(), vec!["--foo", "bar", "-x", "--", "baz"]);
    }

    #[test]
    fn empty_capture_is_an_empty_list() {
        let mut record = Args::new();
        capture(Vec::new(), &mut record);
        assert_eq!(record.get(RAW_FIELD), Some(&Value::List(Vec::new())));
    }

    #[test]
    fn refuses_children() {
        let mut raw = RawCommand::new("exec", |_: &Args| Ok(()));
        let child = namespace("nested", Vec::new()).unwrap();
        let err = raw.attach(child.into()).unwrap_err();
        assert!(matches!(err, RegistrationError::RawChildren(ref name) if name == "exec"));
    }
}
