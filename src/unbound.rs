use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// A logic variable standing in for a value that has not been determined yet.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LogicVar {
    var_idx: usize,
    name: Option<String>,
}

impl LogicVar {
    pub fn id(&self) -> usize {
        self.var_idx
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

impl Display for LogicVar {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.name {
            Some(name) => write!(f, "~{}", name),
            None => write!(f, "~_{}", self.var_idx),
        }
    }
}

/// Hands out fresh ids for logic variables and symbolic nodes.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct VarResolver {
    next_var_id: usize,
}

impl VarResolver {
    pub fn new() -> Self {
        VarResolver { next_var_id: 0 }
    }

    pub fn new_var(&mut self) -> LogicVar {
        LogicVar {
            var_idx: self.new_id(),
            name: None,
        }
    }

    pub fn new_named_var(&mut self, name: &str) -> LogicVar {
        LogicVar {
            var_idx: self.new_id(),
            name: Some(name.to_string()),
        }
    }

    pub(crate) fn new_id(&mut self) -> usize {
        let id = self.next_var_id;
        self.next_var_id += 1;
        id
    }
}

/// A field that is either known or still a placeholder.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Unbound<T> {
    Resolved(T),
    Unresolved(LogicVar),
}

impl<T> Unbound<T> {
    pub fn is_unresolved(&self) -> bool {
        matches!(self, Unbound::Unresolved(_))
    }

    pub fn as_resolved(&self) -> Option<&T> {
        match self {
            Unbound::Resolved(x) => Some(x),
            Unbound::Unresolved(_) => None,
        }
    }

    pub fn as_ref(&self) -> Unbound<&T> {
        match self {
            Unbound::Resolved(x) => Unbound::Resolved(x),
            Unbound::Unresolved(var) => Unbound::Unresolved(var.clone()),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Unbound<U> {
        match self {
            Unbound::Resolved(x) => Unbound::Resolved(f(x)),
            Unbound::Unresolved(var) => Unbound::Unresolved(var),
        }
    }
}

impl<T> From<LogicVar> for Unbound<T> {
    fn from(var: LogicVar) -> Self {
        Unbound::Unresolved(var)
    }
}

impl<T: Display> Display for Unbound<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Unbound::Resolved(x) => x.fmt(f),
            Unbound::Unresolved(var) => var.fmt(f),
        }
    }
}
