use crate::ir::*;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct Argument {
    position: usize,
    name: String,
    ty: Type,
}

impl Argument {
    pub fn new<S: Into<String>>(position: usize, name: S, ty: Type) -> Argument {
        Argument {
            position,
            name: name.into(),
            ty,
        }
    }

    pub fn position(&self) -> usize {
        self.position
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn ty(&self) -> Type {
        self.ty
    }
}

impl fmt::Display for Argument {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} %{}", self.ty, self.name)
    }
}
