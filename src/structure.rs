use serde::{Deserialize, Serialize};

use crate::assets;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    File,
    Folder,
}

/// One file or folder in the synthetic tree generated from a scraped page.
///
/// Paths are slash-delimited from the tree root and unique within one tree.
/// Folders never carry content; files without content are not previewable or
/// exportable. The tree is rebuilt whole on every scrape, never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileNode {
    pub name: String,
    pub kind: NodeKind,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<FileNode>>,
}

impl FileNode {
    pub fn file(name: &str, path: &str, content: String) -> Self {
        FileNode {
            name: name.to_string(),
            kind: NodeKind::File,
            path: path.to_string(),
            extension: name.rsplit_once('.').map(|(_, ext)| ext.to_string()),
            size: Some(size_label(content.len())),
            content: Some(content),
            children: None,
        }
    }

    pub fn folder(name: &str, path: &str, children: Vec<FileNode>) -> Self {
        FileNode {
            name: name.to_string(),
            kind: NodeKind::Folder,
            path: path.to_string(),
            extension: None,
            size: None,
            content: None,
            children: Some(children),
        }
    }
}

/// Human size label from a byte length, rounded half-up to whole kilobytes.
/// Content under half a kilobyte rounds down to "0 KB"; that is accepted.
pub fn size_label(byte_len: usize) -> String {
    format!("{} KB", (byte_len as f64 / 1024.0).round() as u64)
}

/// Compose the synthetic project tree for one scraped page.
///
/// Order is fixed: index.html, css/, js/, README.md, package.json. The
/// manifest is emitted unconditionally so even a fully empty scrape yields a
/// non-empty tree; there is no placeholder text file. Deterministic given its
/// inputs.
pub fn build_structure(html: &str, markdown: &str, source_url: &str) -> Vec<FileNode> {
    let mut nodes = Vec::new();

    if !html.is_empty() {
        nodes.push(FileNode::file("index.html", "/index.html", html.to_string()));
    }

    let styles = assets::extract_styles(html);
    if !styles.is_empty() {
        nodes.push(asset_folder("css", "style", "css", styles));
    }

    let scripts = assets::extract_scripts(html);
    if !scripts.is_empty() {
        nodes.push(asset_folder("js", "script", "js", scripts));
    }

    if !markdown.is_empty() {
        nodes.push(FileNode::file("README.md", "/README.md", markdown.to_string()));
    }

    nodes.push(manifest_node(source_url));
    nodes
}

/// Folder of extracted asset blocks: first file is unsuffixed (`style.css`),
/// later ones numbered from 2 (`style2.css`).
fn asset_folder(folder: &str, stem: &str, ext: &str, blocks: Vec<String>) -> FileNode {
    let children = blocks
        .into_iter()
        .enumerate()
        .map(|(i, body)| {
            let name = if i == 0 {
                format!("{stem}.{ext}")
            } else {
                format!("{stem}{}.{ext}", i + 1)
            };
            let path = format!("/{folder}/{name}");
            FileNode::file(&name, &path, body)
        })
        .collect();
    FileNode::folder(folder, &format!("/{folder}"), children)
}

fn manifest_node(source_url: &str) -> FileNode {
    let manifest = serde_json::json!({
        "name": "scraped-website",
        "version": "1.0.0",
        "description": format!("Website scraped from {}", source_url),
        "main": "index.html",
        "scripts": {
            "start": "http-server .",
            "build": "echo \"Static site ready\""
        },
        "keywords": ["scraped", "website", "html"],
        "author": "webcopy",
        "license": "MIT"
    });
    let mut node = FileNode::file(
        "package.json",
        "/package.json",
        serde_json::to_string_pretty(&manifest).unwrap_or_default(),
    );
    node.size = Some("1 KB".to_string());
    node
}

/// ASCII tree rendering of a node slice for terminal display.
pub fn render_tree(nodes: &[FileNode]) -> String {
    let mut lines = vec![".".to_string()];
    render_level(nodes, "", &mut lines);
    lines.join("\n")
}

fn render_level(nodes: &[FileNode], prefix: &str, lines: &mut Vec<String>) {
    for (i, node) in nodes.iter().enumerate() {
        let last = i + 1 == nodes.len();
        let branch = if last { "└── " } else { "├── " };
        let label = match &node.size {
            Some(size) => format!("{}  ({})", node.name, size),
            None => node.name.clone(),
        };
        lines.push(format!("{}{}{}", prefix, branch, label));
        if let Some(children) = &node.children {
            let child_prefix = format!("{}{}", prefix, if last { "    " } else { "│   " });
            render_level(children, &child_prefix, lines);
        }
    }
}

// ── Tests ──
