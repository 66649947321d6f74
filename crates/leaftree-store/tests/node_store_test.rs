// Integration tests for the node store
// Every operation verifies the on-disk shape before acting

mod common;

use std::fs;

use common::{list_files, Fixture};
use leaftree_core::markdown::parse_frontmatter;
use leaftree_core::{Node, NodeKind, TreeError, ROOT_ID};

#[test]
fn test_create_page_writes_id_and_heading() {
    // Given: An empty store
    let mut fx = Fixture::new();

    // When: A page is created at the root
    fx.page(ROOT_ID, "p1", "welcome", "Welcome");

    // Then: The file carries the id in its frontmatter and one heading
    let raw = fx.read("welcome.md");
    let parsed = parse_frontmatter(&raw).unwrap();
    assert_eq!(parsed.frontmatter.node_id(), Some("p1"));
    assert_eq!(parsed.body, "# Welcome\n");
    assert_eq!(raw.matches("# Welcome").count(), 1);
}

#[test]
fn test_create_section_is_empty_directory() {
    let mut fx = Fixture::new();

    fx.section(ROOT_ID, "s1", "docs", "Docs");

    assert!(fx.path("docs").is_dir());
    assert!(!fx.path("docs/index.md").exists());
}

#[test]
fn test_create_rejects_file_or_folder_collision() {
    // Given: A page "a" and a stray folder "b"
    let mut fx = Fixture::new();
    fx.page(ROOT_ID, "a", "a", "A");
    fs::create_dir_all(fx.path("b")).unwrap();

    // When/Then: Creating anything named "a" or "b" fails with AlreadyExists
    let section_a = Node::new("x", "X", "a", NodeKind::Section);
    assert!(matches!(
        fx.store.create_section(&fx.tree, ROOT_ID, &section_a),
        Err(TreeError::AlreadyExists { .. })
    ));
    let page_b = Node::new("y", "Y", "b", NodeKind::Page);
    assert!(matches!(
        fx.store.create_page(&fx.tree, ROOT_ID, &page_b),
        Err(TreeError::AlreadyExists { .. })
    ));
}

#[test]
fn test_create_rejects_mismatched_kind() {
    let fx = Fixture::new();
    let section = Node::new("x", "X", "x", NodeKind::Section);
    assert!(matches!(
        fx.store.create_page(&fx.tree, ROOT_ID, &section),
        Err(TreeError::InvalidOperation { .. })
    ));
}

#[test]
fn test_move_page_and_section() {
    // Given: docs/intro.md, a page "about" and a section "guides/setup"
    let mut fx = Fixture::new();
    fx.section(ROOT_ID, "docs", "docs", "Docs");
    fx.page("docs", "intro", "intro", "Intro");
    fx.section(ROOT_ID, "guides", "guides", "Guides");
    fx.page("guides", "setup", "setup", "Setup");

    // When: intro moves to the root and guides moves under docs
    fx.store.move_node(&fx.tree, "intro", ROOT_ID).unwrap();
    fx.store.move_node(&fx.tree, "guides", "docs").unwrap();

    // Then: One rename each; docs still exists
    assert_eq!(
        list_files(fx.store.root_dir()),
        vec![
            "docs/",
            "docs/guides/",
            "docs/guides/setup.md",
            "intro.md"
        ]
    );
}

#[test]
fn test_move_missing_file_is_drift() {
    // Given: A page whose file was deleted out of band
    let mut fx = Fixture::new();
    fx.section(ROOT_ID, "docs", "docs", "Docs");
    fx.page(ROOT_ID, "p", "page", "Page");
    fs::remove_file(fx.path("page.md")).unwrap();

    // When: The page is moved
    let err = fx.store.move_node(&fx.tree, "p", "docs").unwrap_err();

    // Then: Drift names the node and the expected file
    match err {
        TreeError::Drift {
            node_id,
            kind,
            path,
            reason,
        } => {
            assert_eq!(node_id, "p");
            assert_eq!(kind, NodeKind::Page);
            assert!(path.ends_with("page.md"));
            assert_eq!(reason, "expected file missing");
        }
        other => panic!("expected drift, got {:?}", other),
    }
}

#[test]
fn test_move_into_collision_is_already_exists() {
    let mut fx = Fixture::new();
    fx.section(ROOT_ID, "docs", "docs", "Docs");
    fx.page(ROOT_ID, "p", "page", "Page");
    fs::write(fx.path("docs/page.md"), "stray").unwrap();

    assert!(matches!(
        fx.store.move_node(&fx.tree, "p", "docs"),
        Err(TreeError::AlreadyExists { .. })
    ));
    assert!(fx.path("page.md").is_file());
}

#[test]
fn test_rename_node() {
    let mut fx = Fixture::new();
    fx.section(ROOT_ID, "s", "docs", "Docs");
    fx.page("s", "p", "intro", "Intro");
    fx.page(ROOT_ID, "q", "taken", "Taken");

    // Unchanged slug is a no-op
    fx.store.rename_node(&fx.tree, "p", "intro").unwrap();
    assert!(fx.path("docs/intro.md").is_file());

    fx.store.rename_node(&fx.tree, "p", "start").unwrap();
    assert!(fx.path("docs/start.md").is_file());
    assert!(!fx.path("docs/intro.md").exists());

    fx.store.rename_node(&fx.tree, "s", "manual").unwrap();
    assert!(fx.path("manual").is_dir());

    assert!(matches!(
        fx.store.rename_node(&fx.tree, "s", "taken"),
        Err(TreeError::AlreadyExists { .. })
    ));
    assert!(matches!(
        fx.store.rename_node(&fx.tree, "s", "  "),
        Err(TreeError::InvalidOperation { .. })
    ));
}

#[test]
fn test_delete_checks_shape() {
    // Given: A page replaced by a folder, and a section replaced by a file
    let mut fx = Fixture::new();
    fx.page(ROOT_ID, "p", "page", "Page");
    fx.section(ROOT_ID, "s", "docs", "Docs");
    fs::remove_file(fx.path("page.md")).unwrap();
    fs::create_dir(fx.path("page.md")).unwrap();
    fs::remove_dir(fx.path("docs")).unwrap();
    fs::write(fx.path("docs"), "not a folder").unwrap();

    // Then: Both deletions report drift and touch nothing
    let page_err = fx.store.delete_page(&fx.tree, "p").unwrap_err();
    assert!(
        matches!(page_err, TreeError::Drift { ref reason, .. } if reason == "expected file but found folder")
    );
    let section_err = fx.store.delete_section(&fx.tree, "s").unwrap_err();
    assert!(
        matches!(section_err, TreeError::Drift { ref reason, .. } if reason == "expected folder but found file")
    );
    assert!(fx.path("page.md").is_dir());
    assert!(fx.path("docs").is_file());
}

#[test]
fn test_delete_section_removes_subtree() {
    let mut fx = Fixture::new();
    fx.section(ROOT_ID, "s", "docs", "Docs");
    fx.page("s", "p", "intro", "Intro");

    fx.store.delete_section(&fx.tree, "s").unwrap();

    assert!(!fx.path("docs").exists());
}

#[test]
fn test_read_section_without_index_is_empty() {
    let mut fx = Fixture::new();
    fx.section(ROOT_ID, "s", "docs", "Docs");

    assert_eq!(fx.store.read_raw(&fx.tree, "s").unwrap(), "");
    assert!(!fx.path("docs/index.md").exists());
}

#[test]
fn test_read_missing_page_is_drift() {
    let mut fx = Fixture::new();
    fx.page(ROOT_ID, "p", "page", "Page");
    fs::remove_file(fx.path("page.md")).unwrap();

    assert!(fx.store.read_content(&fx.tree, "p").unwrap_err().is_drift());
}

#[test]
fn test_upsert_content_rewrites_identity_and_keeps_keys() {
    // Given: A page whose frontmatter carries an extra key
    let mut fx = Fixture::new();
    fx.page(ROOT_ID, "p", "page", "Page");
    fs::write(fx.path("page.md"), "---\nid: p\ntags: [x]\n---\nold\n").unwrap();

    // When: New content is written
    fx.store.upsert_content(&fx.tree, "p", "# New body\n").unwrap();

    // Then: id/title come from the tree, the extra key survives
    let parsed = parse_frontmatter(&fx.read("page.md")).unwrap();
    assert_eq!(parsed.frontmatter.node_id(), Some("p"));
    assert_eq!(parsed.frontmatter.node_title(), Some("Page"));
    assert!(parsed.frontmatter.extra.contains_key("tags"));
    assert_eq!(fx.store.read_content(&fx.tree, "p").unwrap(), "# New body\n");
}

#[test]
fn test_upsert_section_creates_index() {
    let mut fx = Fixture::new();
    fx.section(ROOT_ID, "s", "docs", "Docs");

    fx.store.upsert_content(&fx.tree, "s", "Overview\n").unwrap();

    let parsed = parse_frontmatter(&fx.read("docs/index.md")).unwrap();
    assert_eq!(parsed.frontmatter.node_id(), Some("s"));
    assert_eq!(parsed.body, "Overview\n");
}

#[test]
fn test_sync_metadata_if_exists() {
    let mut fx = Fixture::new();
    fx.section(ROOT_ID, "s", "docs", "Docs");
    fx.page(ROOT_ID, "p", "page", "Page");

    // Section without index: nothing created
    fx.store.sync_metadata_if_exists(&fx.tree, "s").unwrap();
    assert!(!fx.path("docs/index.md").exists());

    // Page: title written, body kept
    fx.tree.get_mut("p").unwrap().title = "Renamed".to_string();
    fx.store.sync_metadata_if_exists(&fx.tree, "p").unwrap();
    let parsed = parse_frontmatter(&fx.read("page.md")).unwrap();
    assert_eq!(parsed.frontmatter.node_title(), Some("Renamed"));
    assert_eq!(parsed.body, "# Page\n");

    // Page without file: drift
    fs::remove_file(fx.path("page.md")).unwrap();
    assert!(fx
        .store
        .sync_metadata_if_exists(&fx.tree, "p")
        .unwrap_err()
        .is_drift());
}

#[test]
fn test_convert_page_to_section_and_back() {
    let mut fx = Fixture::new();
    fx.page(ROOT_ID, "p", "guide", "Guide");

    fx.store.convert_kind(&fx.tree, "p", NodeKind::Section).unwrap();
    assert_eq!(list_files(fx.store.root_dir()), vec!["guide/", "guide/index.md"]);

    fx.tree.get_mut("p").unwrap().kind = NodeKind::Section;
    fx.store.convert_kind(&fx.tree, "p", NodeKind::Page).unwrap();
    assert_eq!(list_files(fx.store.root_dir()), vec!["guide.md"]);
    assert!(fx.read("guide.md").contains("# Guide"));
}

#[test]
fn test_convert_empty_section_synthesizes_page() {
    let mut fx = Fixture::new();
    fx.section(ROOT_ID, "s", "docs", "Docs");

    fx.store.convert_kind(&fx.tree, "s", NodeKind::Page).unwrap();

    let parsed = parse_frontmatter(&fx.read("docs.md")).unwrap();
    assert_eq!(parsed.frontmatter.node_id(), Some("s"));
    assert_eq!(parsed.frontmatter.node_title(), Some("Docs"));
    assert!(!fx.path("docs").exists());
}

#[test]
fn test_convert_non_empty_section_not_allowed() {
    // Given: A section folder holding an untracked file next to its index
    let mut fx = Fixture::new();
    fx.section(ROOT_ID, "s", "docs", "Docs");
    fs::write(fx.path("docs/index.md"), "# Docs\n").unwrap();
    fs::write(fx.path("docs/notes.txt"), "x").unwrap();
    let before = list_files(fx.store.root_dir());

    // When: It is converted to a page
    let err = fx.store.convert_kind(&fx.tree, "s", NodeKind::Page).unwrap_err();

    // Then: Refused, and the filesystem is unchanged
    assert!(matches!(err, TreeError::ConversionNotAllowed { .. }));
    assert_eq!(list_files(fx.store.root_dir()), before);
}

#[test]
fn test_convert_section_backed_by_file_is_drift() {
    let mut fx = Fixture::new();
    fx.section(ROOT_ID, "s", "docs", "Docs");
    fs::remove_dir(fx.path("docs")).unwrap();
    fs::write(fx.path("docs"), "file").unwrap();

    let err = fx.store.convert_kind(&fx.tree, "s", NodeKind::Page).unwrap_err();
    assert!(
        matches!(err, TreeError::Drift { kind: NodeKind::Section, ref reason, .. } if reason == "expected folder but found file")
    );
}
