//! Project type detection from marker files in the scan root.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Kind of project found at a scan root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectType {
    Rust,
    Node,
    Python,
    Go,
    Java,
    Ruby,
    Php,
    DotNet,
    Unknown,
}

impl ProjectType {
    /// Get the display name for this project type.
    pub fn name(&self) -> &'static str {
        match self {
            ProjectType::Rust => "Rust",
            ProjectType::Node => "Node.js",
            ProjectType::Python => "Python",
            ProjectType::Go => "Go",
            ProjectType::Java => "Java",
            ProjectType::Ruby => "Ruby",
            ProjectType::Php => "PHP",
            ProjectType::DotNet => ".NET",
            ProjectType::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for ProjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Marker files checked in priority order.
const MARKERS: &[(ProjectType, &[&str])] = &[
    (ProjectType::Rust, &["Cargo.toml"]),
    (ProjectType::Node, &["package.json"]),
    (
        ProjectType::Python,
        &["pyproject.toml", "setup.py", "requirements.txt", "Pipfile"],
    ),
    (ProjectType::Go, &["go.mod"]),
    (
        ProjectType::Java,
        &["pom.xml", "build.gradle", "build.gradle.kts"],
    ),
    (ProjectType::Ruby, &["Gemfile"]),
    (ProjectType::Php, &["composer.json"]),
];

/// Detect the project type of `root` by sniffing marker files.
pub fn detect_project_type(root: &Path) -> ProjectType {
    for (project_type, markers) in MARKERS {
        if markers.iter().any(|m| root.join(m).is_file()) {
            debug!(project_type = %project_type, "Detected project type");
            return *project_type;
        }
    }

    if has_dotnet_solution(root) {
        return ProjectType::DotNet;
    }

    ProjectType::Unknown
}

fn has_dotnet_solution(root: &Path) -> bool {
    let Ok(entries) = fs::read_dir(root) else {
        return false;
    };

    entries.flatten().any(|entry| {
        let path = entry.path();
        matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("sln" | "csproj" | "fsproj")
        )
    })
}
