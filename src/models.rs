// src/models.rs

use clap::builder::PossibleValuesParser;
use clap::{Arg, ArgAction, ArgMatches, value_parser};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::constants::{COMMAND_FIELD, RAW_FIELD};

// --- ARGUMENT DECLARATIONS ---
// What a node asks from the parsing engine. Built at registration time,
// turned into `clap::Arg`s when the node is compiled.

/// How many values an argument takes, and how repeated occurrences behave.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// Boolean flag, `true` when present.
    Switch,
    /// Boolean flag, `false` when present.
    SwitchOff,
    /// Counts occurrences (`-vvv`).
    Count,
    Single,
    /// Zero or one value.
    Optional,
    ZeroOrMore,
    OneOrMore,
    Exactly(usize),
    /// Repeatable option, one value per occurrence.
    Append,
}

impl Arity {
    pub fn is_flag(self) -> bool {
        matches!(self, Arity::Switch | Arity::SwitchOff | Arity::Count)
    }

    /// Whether the bound value is a list.
    pub fn is_multiple(self) -> bool {
        match self {
            Arity::ZeroOrMore | Arity::OneOrMore | Arity::Append => true,
            Arity::Exactly(n) => n != 1,
            _ => false,
        }
    }

    fn accepts_none(self) -> bool {
        matches!(self, Arity::Optional | Arity::ZeroOrMore) || self.is_flag()
    }
}

/// Type the engine coerces each value to.
#[derive(Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ValueType {
    #[default]
    String,
    Int,
    Float,
    Bool,
    Path,
}

impl ValueType {
    fn collect(self, matches: &ArgMatches, id: &str) -> Vec<Value> {
        match self {
            ValueType::String => many::<String>(matches, id).into_iter().map(Value::Str).collect(),
            ValueType::Int => many::<i64>(matches, id).into_iter().map(Value::Int).collect(),
            ValueType::Float => many::<f64>(matches, id).into_iter().map(Value::Float).collect(),
            ValueType::Bool => many::<bool>(matches, id).into_iter().map(Value::Bool).collect(),
            ValueType::Path => many::<PathBuf>(matches, id).into_iter().map(Value::Path).collect(),
        }
    }
}

fn many<T>(matches: &ArgMatches, id: &str) -> Vec<T>
where
    T: Clone + Send + Sync + 'static,
{
    matches
        .get_many::<T>(id)
        .map(|values| values.cloned().collect())
        .unwrap_or_default()
}

/// One flag or positional declared on a namespace or command.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct ArgSpec {
    /// Field of the bound record receiving the value.
    pub dest: String,
    #[serde(default)]
    pub long: Option<String>,
    #[serde(default)]
    pub short: Option<char>,
    pub arity: Arity,
    #[serde(default)]
    pub value_type: ValueType,
    #[serde(default)]
    pub default: Option<String>,
    #[serde(default)]
    pub help: Option<String>,
    #[serde(default)]
    pub required: bool,
    /// Allowed values. Only applies to `ValueType::String`.
    #[serde(default)]
    pub choices: Vec<String>,
    #[serde(default)]
    pub value_name: Option<String>,
}

impl ArgSpec {
    fn new(dest: String, long: Option<String>, arity: Arity) -> Self {
        Self {
            dest,
            long,
            short: None,
            arity,
            value_type: ValueType::String,
            default: None,
            help: None,
            required: false,
            choices: Vec::new(),
            value_name: None,
        }
    }

    /// A positional taking one value. Required until a default is given.
    pub fn positional(name: impl Into<String>) -> Self {
        let mut spec = Self::new(name.into(), None, Arity::Single);
        spec.required = true;
        spec
    }

    /// `--long VALUE`. Leading dashes in `long` are optional.
    pub fn option(long: impl Into<String>) -> Self {
        let long = long_name(long.into());
        Self::new(dest_for(&long), Some(long), Arity::Single)
    }

    /// Boolean `--long`.
    pub fn switch(long: impl Into<String>) -> Self {
        let long = long_name(long.into());
        Self::new(dest_for(&long), Some(long), Arity::Switch)
    }

    pub fn is_positional(&self) -> bool {
        self.long.is_none() && self.short.is_none()
    }

    pub fn short(mut self, short: char) -> Self {
        self.short = Some(short);
        self
    }

    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Sets the default and, for positionals, makes the argument optional.
    pub fn default_value(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self.required = false;
        self
    }

    pub fn value_type(mut self, value_type: ValueType) -> Self {
        self.value_type = value_type;
        self
    }

    pub fn arity(mut self, arity: Arity) -> Self {
        self.arity = arity;
        if self.is_positional() && arity.accepts_none() {
            self.required = false;
        }
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn dest(mut self, dest: impl Into<String>) -> Self {
        self.dest = dest.into();
        self
    }

    pub fn choices<I, S>(mut self, choices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.choices = choices.into_iter().map(Into::into).collect();
        self
    }

    pub fn value_name(mut self, value_name: impl Into<String>) -> Self {
        self.value_name = Some(value_name.into());
        self
    }

    /// Translates the declaration into the parsing engine's argument.
    pub fn to_arg(&self) -> Arg {
        let mut arg = Arg::new(self.dest.clone()).required(self.required);
        if let Some(long) = &self.long {
            arg = arg.long(long.clone());
        }
        if let Some(short) = self.short {
            arg = arg.short(short);
        }
        if let Some(help) = &self.help {
            arg = arg.help(help.clone());
        }
        if let Some(value_name) = &self.value_name {
            arg = arg.value_name(value_name.clone());
        }

        arg = match self.arity {
            Arity::Switch => arg.action(ArgAction::SetTrue),
            Arity::SwitchOff => arg.action(ArgAction::SetFalse),
            Arity::Count => arg.action(ArgAction::Count),
            Arity::Single => arg.action(ArgAction::Set).num_args(1),
            Arity::Optional => arg.action(ArgAction::Set).num_args(0..=1),
            Arity::ZeroOrMore => arg.action(ArgAction::Set).num_args(0..),
            Arity::OneOrMore => arg.action(ArgAction::Set).num_args(1..),
            Arity::Exactly(n) => arg.action(ArgAction::Set).num_args(n),
            Arity::Append => arg.action(ArgAction::Append).num_args(1),
        };

        if !self.arity.is_flag() {
            arg = match self.value_type {
                ValueType::String if !self.choices.is_empty() => {
                    arg.value_parser(PossibleValuesParser::new(self.choices.clone()))
                }
                ValueType::String => arg.value_parser(value_parser!(String)),
                ValueType::Int => arg.value_parser(value_parser!(i64)),
                ValueType::Float => arg.value_parser(value_parser!(f64)),
                ValueType::Bool => arg.value_parser(value_parser!(bool)),
                ValueType::Path => arg.value_parser(value_parser!(PathBuf)),
            };
        }

        if let Some(default) = &self.default {
            arg = arg.default_value(default.clone());
        }
        arg
    }

    /// Reads this argument's value out of parsed matches. Unset values bind as `Null`.
    pub fn bind(&self, matches: &ArgMatches) -> Value {
        match self.arity {
            Arity::Switch | Arity::SwitchOff => Value::Bool(matches.get_flag(&self.dest)),
            Arity::Count => Value::Count(matches.get_count(&self.dest)),
            arity => {
                let mut values = self.value_type.collect(matches, &self.dest);
                if arity.is_multiple() {
                    Value::List(values)
                } else if values.is_empty() {
                    Value::Null
                } else {
                    values.swap_remove(0)
                }
            }
        }
    }
}

fn long_name(long: String) -> String {
    match long.strip_prefix("--") {
        Some(bare) => bare.to_string(),
        None => long,
    }
}

/// `dry-run` binds to `dry_run`.
fn dest_for(long: &str) -> String {
    long.replace('-', "_")
}

// --- BOUND RECORD ---

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Count(u8),
    Int(i64),
    Float(f64),
    Str(String),
    Path(PathBuf),
    List(Vec<Value>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            Value::Count(c) => Some(i64::from(*c)),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_path(&self) -> Option<&Path> {
        match self {
            Value::Path(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Count(c) => write!(f, "{}", c),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::Str(s) => write!(f, "{}", s),
            Value::Path(p) => write!(f, "{}", p.display()),
            Value::List(items) => {
                let parts: Vec<String> = items.iter().map(ToString::to_string).collect();
                write!(f, "[{}]", parts.join(", "))
            }
        }
    }
}

/// The argument record handed to the resolved action.
///
/// Fields are written in visit order, root first, so on a name collision the
/// most specific node's value is the one kept.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Args {
    fields: BTreeMap<String, Value>,
}

impl Args {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        self.fields.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    /// `false` for missing fields.
    pub fn flag(&self, name: &str) -> bool {
        self.get(name).and_then(Value::as_bool).unwrap_or(false)
    }

    pub fn int(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(Value::as_int)
    }

    pub fn float(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(Value::as_float)
    }

    pub fn path(&self, name: &str) -> Option<&Path> {
        self.get(name).and_then(Value::as_path)
    }

    pub fn count(&self, name: &str) -> u8 {
        match self.get(name) {
            Some(Value::Count(c)) => *c,
            _ => 0,
        }
    }

    pub fn list(&self, name: &str) -> &[Value] {
        self.get(name).and_then(Value::as_list).unwrap_or(&[])
    }

    /// String items of a list field. Non-string items are skipped.
    pub fn strings(&self, name: &str) -> Vec<&str> {
        self.list(name).iter().filter_map(Value::as_str).collect()
    }

    /// Name of the deepest sub-command chosen during dispatch.
    pub fn command(&self) -> Option<&str> {
        self.str(COMMAND_FIELD)
    }

    /// Tokens captured verbatim by a raw command.
    pub fn raw(&self) -> Vec<&str> {
        self.strings(RAW_FIELD)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
