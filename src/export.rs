use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::warn;

use crate::structure::{FileNode, NodeKind};

/// Write a synthetic tree to disk under `dir`, returning the number of files
/// written. File nodes without content cannot be exported and are skipped
/// with a warning.
pub fn export_tree(nodes: &[FileNode], dir: &Path) -> Result<usize> {
    fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;

    let mut written = 0;
    for node in nodes {
        match node.kind {
            NodeKind::Folder => {
                let sub = dir.join(&node.name);
                match &node.children {
                    Some(children) => written += export_tree(children, &sub)?,
                    None => fs::create_dir_all(&sub)
                        .with_context(|| format!("Failed to create {}", sub.display()))?,
                }
            }
            NodeKind::File => match &node.content {
                Some(content) => {
                    let target = dir.join(&node.name);
                    fs::write(&target, content)
                        .with_context(|| format!("Failed to write {}", target.display()))?;
                    written += 1;
                }
                None => warn!("{} has no content, skipped", node.path),
            },
        }
    }
    Ok(written)
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structure::{build_structure, FileNode};

    #[test]
    fn writes_nested_tree() {
        let html = "<title>T</title><style>a{}</style><script>b()</script>";
        let nodes = build_structure(html, "# md", "https://example.com");

        let dir = tempfile::tempdir().unwrap();
        let written = export_tree(&nodes, dir.path()).unwrap();
        assert_eq!(written, 5); // index.html, style.css, script.js, README.md, package.json

        assert!(dir.path().join("index.html").is_file());
        assert!(dir.path().join("css/style.css").is_file());
        assert!(dir.path().join("js/script.js").is_file());
        assert!(dir.path().join("README.md").is_file());
        assert!(dir.path().join("package.json").is_file());

        let css = fs::read_to_string(dir.path().join("css/style.css")).unwrap();
        assert_eq!(css, "a{}");
    }

    #[test]
    fn contentless_file_skipped() {
        let mut node = FileNode::file("logo.png", "/logo.png", String::new());
        node.content = None;
        node.size = None;

        let dir = tempfile::tempdir().unwrap();
        let written = export_tree(&[node], dir.path()).unwrap();
        assert_eq!(written, 0);
        assert!(!dir.path().join("logo.png").exists());
    }
}
