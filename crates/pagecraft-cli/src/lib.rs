//! Commands behind the `pagecraft` debug binary.
//!
//! Each command reads JSON from disk, runs it through the tree editor, and
//! hands back a value the binary prints. Keeping them here (rather than in
//! `main.rs`) lets the tests drive them without spawning a process.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use pagecraft_tree::validate::{self, CheckOptions, Violation};
use pagecraft_tree::{Document, EditorConfig, Selection, TreeError, TreeOp};
use pagecraft_types::Block;

/// Get the default config path (~/.config/pagecraft/editor.ron).
pub fn config_file_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("pagecraft").join("editor.ron"))
}

/// Resolve the editor config.
///
/// An explicit path must load. Otherwise the user config file is used when
/// present, and defaults when it isn't.
pub fn load_config(explicit: Option<&Path>) -> Result<EditorConfig> {
    if let Some(path) = explicit {
        return EditorConfig::load(path).with_context(|| format!("loading config {}", path.display()));
    }

    let Some(path) = config_file_path() else {
        tracing::debug!("no config directory available, using default editor config");
        return Ok(EditorConfig::default());
    };
    if !path.exists() {
        tracing::debug!("config file not found at {:?}, using defaults", path);
        return Ok(EditorConfig::default());
    }
    EditorConfig::load(&path).with_context(|| format!("loading config {}", path.display()))
}

/// On-disk document shapes accepted by the commands: a saved document, or a
/// bare list of root blocks.
#[derive(Deserialize)]
#[serde(untagged)]
enum DocumentFile {
    Saved {
        blocks: Vec<Block>,
        #[serde(default)]
        selection: Selection,
    },
    Blocks(Vec<Block>),
}

impl DocumentFile {
    fn read(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing document {}", path.display()))
    }

    fn into_parts(self) -> (Vec<Block>, Selection) {
        match self {
            DocumentFile::Saved { blocks, selection } => (blocks, selection),
            DocumentFile::Blocks(blocks) => (blocks, Selection::default()),
        }
    }
}

/// Load a document for editing. Bookkeeping fields are repaired.
///
/// A saved document keeps its id, selection and dirty flag; selected ids
/// that no longer resolve are dropped. A bare block list loads clean.
pub fn load_document(path: &Path, config: EditorConfig) -> Result<Document> {
    let text = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let value: serde_json::Value =
        serde_json::from_str(&text).with_context(|| format!("parsing document {}", path.display()))?;

    if value.is_array() {
        let blocks: Vec<Block> =
            serde_json::from_value(value).with_context(|| format!("parsing document {}", path.display()))?;
        return Document::from_blocks(blocks, config).with_context(|| format!("loading {}", path.display()));
    }

    let mut doc: Document =
        serde_json::from_value(value).with_context(|| format!("loading {}", path.display()))?;
    doc.set_config(config);
    tracing::debug!(doc = %doc.id(), blocks = doc.block_count(), "restored saved document");
    Ok(doc)
}

/// Report every invariant violation in a document file, without repairing.
pub fn check_file(path: &Path) -> Result<Vec<Violation>> {
    let (blocks, selection) = DocumentFile::read(path)?.into_parts();
    Ok(validate::check(
        &blocks,
        CheckOptions {
            check_order: true,
            selection: Some(&selection),
        },
    ))
}

/// Read a replay script: a JSON array of ops.
pub fn read_script(path: &Path) -> Result<Vec<TreeOp>> {
    let text = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing script {}", path.display()))
}

/// Outcome of replaying a script.
#[derive(Debug)]
pub struct ReplayReport {
    pub document: Document,
    pub applied: usize,
    /// Rejected ops, by position in the script.
    pub rejected: Vec<(usize, TreeError)>,
}

/// Apply `ops` in order.
///
/// Rejected ops leave the document as it was. With `keep_going` they are
/// collected and replay continues; otherwise the first one aborts.
pub fn replay(mut document: Document, ops: Vec<TreeOp>, keep_going: bool) -> Result<ReplayReport> {
    let mut applied = 0;
    let mut rejected = Vec::new();

    for (i, op) in ops.into_iter().enumerate() {
        let name = op.display_name();
        match document.apply(op) {
            Ok(created) => {
                applied += 1;
                tracing::debug!(step = i, op = name, ?created, "applied");
            }
            Err(e) if keep_going => {
                tracing::warn!(step = i, op = name, "rejected: {e}");
                rejected.push((i, e));
            }
            Err(e) => return Err(e).with_context(|| format!("op #{i} ({name}) rejected")),
        }
    }

    Ok(ReplayReport {
        document,
        applied,
        rejected,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagecraft_tree::{BlockId, BlockKind, ContainerRef, DocumentId};
    use serde_json::json;

    fn write(dir: &tempfile::TempDir, name: &str, value: &serde_json::Value) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, serde_json::to_string_pretty(value).unwrap()).unwrap();
        path
    }

    #[test]
    fn test_load_config_explicit() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("editor.ron");
        std::fs::write(&path, "(history_limit: 4)").unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.history_limit, 4);

        let missing = dir.path().join("missing.ron");
        assert!(load_config(Some(&missing)).is_err());
    }

    #[test]
    fn test_load_bare_block_list() {
        let dir = tempfile::tempdir().unwrap();
        let section = Block::builder(BlockKind::Section)
            .child(Block::builder(BlockKind::Heading).build())
            .build();
        let path = write(&dir, "page.json", &json!([section]));

        let doc = load_document(&path, EditorConfig::default()).unwrap();
        assert_eq!(doc.block_count(), 2);
        assert!(!doc.is_dirty());
    }

    #[test]
    fn test_load_saved_document_keeps_selection() {
        let dir = tempfile::tempdir().unwrap();
        let mut doc = Document::new();
        let id = doc
            .add_block_to_container(ContainerRef::Root, Block::builder(BlockKind::Image).build(), None)
            .unwrap();
        let path = write(&dir, "page.json", &serde_json::to_value(&doc).unwrap());

        let loaded = load_document(&path, EditorConfig::default()).unwrap();
        assert_eq!(loaded.selected_block_id(), Some(id));
    }

    #[test]
    fn test_load_saved_document_keeps_id_and_state() {
        let dir = tempfile::tempdir().unwrap();
        let mut doc = Document::new();
        let a = doc
            .add_block_to_container(ContainerRef::Root, Block::builder(BlockKind::Image).build(), None)
            .unwrap();
        let b = doc
            .add_block_to_container(ContainerRef::Root, Block::builder(BlockKind::Heading).build(), None)
            .unwrap();
        doc.select_block(a).unwrap();
        doc.toggle_block_selection(b).unwrap();
        let path = write(&dir, "page.json", &serde_json::to_value(&doc).unwrap());

        let config = EditorConfig::default().with_history_limit(3);
        let loaded = load_document(&path, config).unwrap();
        assert_eq!(loaded.id(), doc.id());
        assert_eq!(loaded.selection().selected_block_ids, vec![a, b]);
        assert_eq!(loaded.selected_block_id(), Some(b));
        assert!(loaded.is_dirty());
        assert!(!loaded.can_undo());
        assert_eq!(loaded.history().limit(), 3);
    }

    #[test]
    fn test_load_saved_document_drops_stale_selection() {
        let dir = tempfile::tempdir().unwrap();
        let image = Block::builder(BlockKind::Image).build();
        let ghost = BlockId::new();
        let saved = json!({
            "id": DocumentId::new().to_string(),
            "blocks": [image],
            "selection": {
                "selected_block_id": ghost.to_string(),
                "selected_block_ids": [image.id.to_string(), ghost.to_string()],
            },
        });
        let path = write(&dir, "page.json", &saved);

        let loaded = load_document(&path, EditorConfig::default()).unwrap();
        assert_eq!(loaded.selection().selected_block_ids, vec![image.id]);
        assert!(!loaded.is_dirty());
    }

    #[test]
    fn test_check_reports_violations() {
        let dir = tempfile::tempdir().unwrap();
        let image = Block::builder(BlockKind::Image).build();
        let mut heading = Block::builder(BlockKind::Heading).build();
        heading.order = 7;
        let path = write(&dir, "bad.json", &json!([image, image, heading]));

        let violations = check_file(&path).unwrap();
        assert!(violations.contains(&Violation::DuplicateId(image.id)));
        assert!(violations.iter().any(|v| matches!(v, Violation::OrderMismatch { found: 7, .. })));
    }

    #[test]
    fn test_replay_stops_or_keeps_going() {
        let dir = tempfile::tempdir().unwrap();
        let section = Block::builder(BlockKind::Section).build();
        let ghost = Block::builder(BlockKind::Image).build();
        let script = json!([
            {"op": "add_block", "container": "root", "block": section},
            {"op": "remove_block", "container": "root", "block_id": ghost.id.to_string()},
            {"op": "add_block", "container": section.id.to_string(), "block": ghost},
        ]);
        let path = write(&dir, "script.json", &script);

        let ops = read_script(&path).unwrap();
        assert!(replay(Document::new(), ops.clone(), false).is_err());

        let report = replay(Document::new(), ops, true).unwrap();
        assert_eq!(report.applied, 2);
        assert_eq!(report.rejected, vec![(1, TreeError::BlockNotFound(ghost.id))]);
        assert_eq!(report.document.block_count(), 2);
    }
}
