//! Dotted key path into a nested document.
//!
//! Example: "Alas.Emulator.Serial"  =>  Path(vec!["Alas", "Emulator", "Serial"])
//!
//! A path can also be built from an explicit segment list, which is the only
//! way to address keys that themselves contain '.' (package names, for one).

use std::fmt;

#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Path(Vec<String>);

impl Path {
    pub fn new(segments: Vec<String>) -> Self {
        Self(segments)
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Last segment, if any.
    pub fn leaf(&self) -> Option<&str> {
        self.0.last().map(String::as_str)
    }

    /// A new path with `segment` appended.
    pub fn child(&self, segment: impl Into<String>) -> Self {
        let mut segments = self.0.clone();
        segments.push(segment.into());
        Self(segments)
    }

    /// A new path with the last segment replaced.
    pub fn sibling(&self, segment: impl Into<String>) -> Self {
        let mut segments = self.0.clone();
        segments.pop();
        segments.push(segment.into());
        Self(segments)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("."))
    }
}

impl From<&str> for Path {
    fn from(s: &str) -> Self {
        if s.is_empty() {
            return Self::default();
        }
        Self(s.split('.').map(str::to_string).collect())
    }
}

impl From<String> for Path {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

impl From<&String> for Path {
    fn from(s: &String) -> Self {
        Self::from(s.as_str())
    }
}

impl From<&Path> for Path {
    fn from(p: &Path) -> Self {
        p.clone()
    }
}

impl From<Vec<String>> for Path {
    fn from(v: Vec<String>) -> Self {
        Self(v)
    }
}

impl From<&[String]> for Path {
    fn from(v: &[String]) -> Self {
        Self(v.to_vec())
    }
}

impl From<Vec<&str>> for Path {
    fn from(v: Vec<&str>) -> Self {
        Self(v.into_iter().map(str::to_string).collect())
    }
}

impl<const N: usize> From<[&str; N]> for Path {
    fn from(v: [&str; N]) -> Self {
        Self(v.iter().map(|s| s.to_string()).collect())
    }
}
