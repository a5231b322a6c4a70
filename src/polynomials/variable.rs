use std::fmt;

/// Immutable named, optionally indexed symbolic scalar.
///
/// Index 0 means "unindexed" and is suppressed by `Display`; it is still an
/// ordinary, comparable value. Ordering is lexicographic by (name, index),
/// which fixes the canonical output order of basis vectors.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Variable {
    name: String,
    index: u32,
}

impl Variable {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            index: 0,
        }
    }

    pub fn indexed(name: &str, index: u32) -> Self {
        Self {
            name: name.to_string(),
            index,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    /// `size` variables named `name`, indexed 1..=size.
    pub fn multivariate(name: &str, size: u32) -> Vec<Variable> {
        (1..=size).map(|i| Variable::indexed(name, i)).collect()
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.index == 0 {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}_{{{}}}", self.name, self.index)
        }
    }
}

//___________________________________TESTS____________________________________
