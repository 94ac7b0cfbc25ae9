//! Reference matrices - small two-column tables attached to a project

use serde::{Deserialize, Serialize};

/// The three matrix tables a project carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatrixKind {
    /// Component / Make
    Build,
    /// Assembly Drawing / Drawing Name
    Assembly,
    /// Machine Name / Program Name
    Machine,
}

impl MatrixKind {
    pub const ALL: [MatrixKind; 3] = [MatrixKind::Build, MatrixKind::Assembly, MatrixKind::Machine];

    /// Column labels as shown in forms and reports
    pub fn headers(&self) -> (&'static str, &'static str) {
        match self {
            MatrixKind::Build => ("Component", "Make"),
            MatrixKind::Assembly => ("Assembly Drawing", "Drawing Name"),
            MatrixKind::Machine => ("Machine Name", "Program Name"),
        }
    }

    /// Report section title
    pub fn title(&self) -> &'static str {
        match self {
            MatrixKind::Build => "Build Matrix",
            MatrixKind::Assembly => "Assembly Drawings",
            MatrixKind::Machine => "Machine Programs",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MatrixKind::Build => "build",
            MatrixKind::Assembly => "assembly",
            MatrixKind::Machine => "machine",
        }
    }
}

impl std::fmt::Display for MatrixKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for MatrixKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "build" => Ok(MatrixKind::Build),
            "assembly" => Ok(MatrixKind::Assembly),
            "machine" => Ok(MatrixKind::Machine),
            _ => Err(format!(
                "Invalid matrix kind: {}. Use build, assembly, or machine",
                s
            )),
        }
    }
}

/// One ordered row of a matrix; column meaning depends on the kind
/// (see [`MatrixKind::headers`])
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatrixRow {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub value: String,
}

impl MatrixRow {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_empty() && self.value.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_kind_round_trips_through_str() {
        for kind in MatrixKind::ALL {
            assert_eq!(MatrixKind::from_str(kind.as_str()).unwrap(), kind);
        }
        assert!(MatrixKind::from_str("bogus").is_err());
    }
}
