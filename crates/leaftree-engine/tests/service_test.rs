// Integration tests for TreeService mutations.
// Each test runs against its own scratch storage directory.

mod common;

use std::fs;

use common::{TestEnv, USER};
use leaftree_core::markdown::parse_frontmatter;
use leaftree_core::{NodeKind, TreeError, ROOT_ID};

// ---------------------------------------------------------------------------
// create_node
// ---------------------------------------------------------------------------

#[test]
fn test_create_page_under_root() {
    let env = TestEnv::new();

    // When: a page is created under the root
    let id = env
        .service
        .create_node(USER, None, "Welcome", "welcome", NodeKind::Page)
        .unwrap();

    // Then: it is the first child and the file carries its id and a heading
    let node = env.service.get_node(&id).unwrap();
    assert_eq!(node.position, 0);
    assert_eq!(node.kind, NodeKind::Page);
    assert_eq!(node.metadata.creator_id, USER);
    assert!(node.metadata.has_timestamps());

    let parsed = parse_frontmatter(&env.read("welcome.md")).unwrap();
    assert_eq!(parsed.frontmatter.node_id(), Some(id.as_str()));
    assert_eq!(parsed.body.matches("# Welcome").count(), 1);
}

#[test]
fn test_create_section_makes_empty_directory() {
    let env = TestEnv::new();
    env.section(None, "docs");

    assert!(env.content("docs").is_dir());
    assert!(!env.content("docs/index.md").exists());
}

#[test]
fn test_create_appends_after_existing_children() {
    let env = TestEnv::new();
    env.page(None, "a");
    env.page(None, "b");
    let c = env.page(None, "c");

    assert_eq!(env.service.get_node(&c).unwrap().position, 2);
    assert_eq!(env.child_slugs(ROOT_ID), vec!["a", "b", "c"]);
}

#[test]
fn test_create_rejects_duplicate_slug() {
    let env = TestEnv::new();
    env.page(None, "intro");

    let err = env
        .service
        .create_node(USER, None, "Intro again", "intro", NodeKind::Section)
        .unwrap_err();
    assert!(matches!(err, TreeError::DuplicateSlug { .. }));
    assert_eq!(env.child_slugs(ROOT_ID), vec!["intro"]);
}

#[test]
fn test_create_rejects_invalid_and_reserved_slugs() {
    let env = TestEnv::new();

    for slug in ["", "Bad Slug", "edit", "-x"] {
        let err = env
            .service
            .create_node(USER, None, "T", slug, NodeKind::Page)
            .unwrap_err();
        assert!(
            matches!(err, TreeError::InvalidSlug { .. }),
            "slug {:?} gave {:?}",
            slug,
            err
        );
    }
    assert!(env.child_slugs(ROOT_ID).is_empty());
}

#[test]
fn test_create_rejects_unknown_kind() {
    let env = TestEnv::new();
    let err = env
        .service
        .create_node(USER, None, "T", "t", NodeKind::Unknown)
        .unwrap_err();
    assert!(matches!(err, TreeError::InvalidOperation { .. }));
}

#[test]
fn test_create_fails_when_artifact_exists_on_disk() {
    let env = TestEnv::new();
    fs::create_dir_all(env.content("")).unwrap();
    fs::write(env.content("stray.md"), "not tracked").unwrap();

    let err = env
        .service
        .create_node(USER, None, "Stray", "stray", NodeKind::Page)
        .unwrap_err();
    assert!(matches!(err, TreeError::AlreadyExists { .. }));
    assert!(env.child_slugs(ROOT_ID).is_empty());
    assert_eq!(env.read("stray.md"), "not tracked");
}

#[test]
fn test_create_under_page_promotes_parent() {
    let env = TestEnv::new();
    let guide = env.page(None, "guide");

    // When: a child is created under a page
    env.page(Some(&guide), "install");

    // Then: the parent became a section and its file moved to index.md
    let node = env.service.get_node(&guide).unwrap();
    assert_eq!(node.kind, NodeKind::Section);
    assert_eq!(node.children.len(), 1);
    assert!(!env.content("guide.md").exists());
    assert!(env.content("guide/index.md").is_file());
    assert!(env.content("guide/install.md").is_file());
}

#[test]
fn test_create_under_missing_parent() {
    let env = TestEnv::new();
    let err = env
        .service
        .create_node(USER, Some("nope"), "T", "t", NodeKind::Page)
        .unwrap_err();
    assert!(matches!(err, TreeError::ParentNotFound { .. }));
}

// ---------------------------------------------------------------------------
// update_node
// ---------------------------------------------------------------------------

#[test]
fn test_update_renames_and_writes_content() {
    let env = TestEnv::new();
    let id = env.page(None, "draft");

    env.service
        .update_node(USER, &id, "Final", "final", Some("Hello\n"))
        .unwrap();

    assert!(!env.content("draft.md").exists());
    let page = env.service.get_page(&id).unwrap();
    assert_eq!(page.node.title, "Final");
    assert_eq!(page.node.slug, "final");
    assert_eq!(page.path, "final");
    assert_eq!(page.content, "Hello\n");

    let parsed = parse_frontmatter(&env.read("final.md")).unwrap();
    assert_eq!(parsed.frontmatter.node_id(), Some(id.as_str()));
    assert_eq!(parsed.frontmatter.node_title(), Some("Final"));
}

#[test]
fn test_update_without_content_keeps_body() {
    let env = TestEnv::new();
    let id = env.page(None, "notes");

    env.service
        .update_node(USER, &id, "Renamed Notes", "notes", None)
        .unwrap();

    let page = env.service.get_page(&id).unwrap();
    assert_eq!(page.content, "# Notes\n");
    assert_eq!(page.node.title, "Renamed Notes");
}

#[test]
fn test_update_rejects_sibling_slug() {
    let env = TestEnv::new();
    env.page(None, "a");
    let b = env.page(None, "b");

    let err = env
        .service
        .update_node(USER, &b, "B", "a", None)
        .unwrap_err();
    assert!(matches!(err, TreeError::DuplicateSlug { .. }));
    assert!(env.content("b.md").is_file());
}

#[test]
fn test_update_root_rejected() {
    let env = TestEnv::new();
    let err = env
        .service
        .update_node(USER, ROOT_ID, "Root", "root", None)
        .unwrap_err();
    assert!(matches!(err, TreeError::InvalidOperation { .. }));
}

// ---------------------------------------------------------------------------
// move_node
// ---------------------------------------------------------------------------

#[test]
fn test_move_page_to_root() {
    let env = TestEnv::new();
    let docs = env.section(None, "docs");
    let intro = env.page(Some(&docs), "intro");

    // When: docs/intro moves to the root
    env.service.move_node(USER, &intro, None).unwrap();

    // Then: it is appended after docs and the file moved with it
    assert_eq!(env.child_slugs(ROOT_ID), vec!["docs", "intro"]);
    assert!(env.child_slugs(&docs).is_empty());
    assert!(env.content("intro.md").is_file());
    assert!(env.content("docs").is_dir());
    assert!(!env.content("docs/intro.md").exists());
}

#[test]
fn test_move_section_carries_subtree() {
    let env = TestEnv::new();
    let a = env.section(None, "a");
    let b = env.section(None, "b");
    env.page(Some(&a), "leaf");

    env.service.move_node(USER, &a, Some(&b)).unwrap();

    assert!(env.content("b/a/leaf.md").is_file());
    let found = env.service.find_page_by_path("b/a/leaf").unwrap();
    assert_eq!(found.path, "b/a/leaf");
}

#[test]
fn test_move_into_descendant_rejected() {
    let env = TestEnv::new();
    let a = env.section(None, "a");
    let inner = env.section(Some(&a), "inner");

    let err = env.service.move_node(USER, &a, Some(&inner)).unwrap_err();
    assert!(matches!(err, TreeError::CircularReference { .. }));

    let err = env.service.move_node(USER, &a, Some(&a)).unwrap_err();
    assert!(matches!(err, TreeError::SelfMove { .. }));
    assert!(env.content("a/inner").is_dir());
}

#[test]
fn test_move_onto_taken_slug_rejected() {
    let env = TestEnv::new();
    let docs = env.section(None, "docs");
    env.page(None, "intro");
    let nested = env.page(Some(&docs), "intro");

    let err = env.service.move_node(USER, &nested, None).unwrap_err();
    assert!(matches!(err, TreeError::DuplicateSlug { .. }));
    assert!(env.content("docs/intro.md").is_file());
}

#[test]
fn test_move_under_page_promotes_destination() {
    let env = TestEnv::new();
    let target = env.page(None, "target");
    let loose = env.page(None, "loose");

    env.service.move_node(USER, &loose, Some(&target)).unwrap();

    assert_eq!(
        env.service.get_node(&target).unwrap().kind,
        NodeKind::Section
    );
    assert!(env.content("target/index.md").is_file());
    assert!(env.content("target/loose.md").is_file());
}

// ---------------------------------------------------------------------------
// delete_node
// ---------------------------------------------------------------------------

#[test]
fn test_delete_page() {
    let env = TestEnv::new();
    let id = env.page(None, "gone");

    env.service.delete_node(USER, &id, false).unwrap();

    assert!(!env.content("gone.md").exists());
    assert!(matches!(
        env.service.get_node(&id),
        Err(TreeError::NodeNotFound { .. })
    ));
}

#[test]
fn test_delete_section_with_children_needs_recursive() {
    let env = TestEnv::new();
    let docs = env.section(None, "docs");
    let child = env.page(Some(&docs), "child");

    let err = env.service.delete_node(USER, &docs, false).unwrap_err();
    assert_eq!(
        err,
        TreeError::HasChildren {
            node_id: docs.clone(),
            child_count: 1
        }
    );
    assert!(env.content("docs/child.md").is_file());

    env.service.delete_node(USER, &docs, true).unwrap();
    assert!(!env.content("docs").exists());
    assert!(env.service.get_node(&child).is_err());
}

#[test]
fn test_delete_after_out_of_band_removal_is_drift() {
    let env = TestEnv::new();
    let id = env.page(None, "fragile");
    fs::remove_file(env.content("fragile.md")).unwrap();

    let err = env.service.delete_node(USER, &id, false).unwrap_err();

    assert!(err.is_drift());
    assert!(env.service.get_node(&id).is_ok());
}

#[test]
fn test_delete_root_rejected() {
    let env = TestEnv::new();
    let err = env.service.delete_node(USER, ROOT_ID, true).unwrap_err();
    assert!(matches!(err, TreeError::InvalidOperation { .. }));
}

// ---------------------------------------------------------------------------
// sort_children
// ---------------------------------------------------------------------------

#[test]
fn test_sort_children() {
    let env = TestEnv::new();
    let a = env.page(None, "a");
    let b = env.page(None, "b");
    let c = env.page(None, "c");

    env.service
        .sort_children(None, &[c.clone(), a.clone(), b.clone()])
        .unwrap();

    let tree = env.service.tree().unwrap();
    let order: Vec<(&str, usize)> = tree
        .children
        .iter()
        .map(|n| (n.slug.as_str(), n.position))
        .collect();
    assert_eq!(order, vec![("c", 0), ("a", 1), ("b", 2)]);
}

#[test]
fn test_sort_rejects_partial_list() {
    let env = TestEnv::new();
    let a = env.page(None, "a");
    env.page(None, "b");

    let err = env.service.sort_children(None, &[a]).unwrap_err();
    assert!(matches!(err, TreeError::InvalidSortOrder { .. }));
    assert_eq!(env.child_slugs(ROOT_ID), vec!["a", "b"]);
}

// ---------------------------------------------------------------------------
// convert_node
// ---------------------------------------------------------------------------

#[test]
fn test_convert_page_to_section_and_back() {
    let env = TestEnv::new();
    let id = env.page(None, "topic");

    env.service.convert_node(USER, &id, NodeKind::Section).unwrap();
    assert!(env.content("topic/index.md").is_file());
    assert!(!env.content("topic.md").exists());

    env.service.convert_node(USER, &id, NodeKind::Page).unwrap();
    assert!(env.content("topic.md").is_file());
    assert!(!env.content("topic").exists());
    assert_eq!(env.service.get_page(&id).unwrap().content, "# Topic\n");
}

#[test]
fn test_convert_same_kind_is_noop() {
    let env = TestEnv::new();
    let id = env.page(None, "same");
    let before = env.service.tree_hash().unwrap();

    env.service.convert_node(USER, &id, NodeKind::Page).unwrap();

    assert_eq!(env.service.tree_hash().unwrap(), before);
}

#[test]
fn test_convert_section_with_children_rejected() {
    let env = TestEnv::new();
    let docs = env.section(None, "docs");
    env.page(Some(&docs), "child");

    let err = env
        .service
        .convert_node(USER, &docs, NodeKind::Page)
        .unwrap_err();
    assert!(matches!(err, TreeError::HasChildren { child_count: 1, .. }));
}

#[test]
fn test_convert_section_with_untracked_files_rejected() {
    let env = TestEnv::new();
    let docs = env.section(None, "docs");
    fs::write(env.content("docs/scratch.txt"), "x").unwrap();

    let err = env
        .service
        .convert_node(USER, &docs, NodeKind::Page)
        .unwrap_err();
    assert!(matches!(err, TreeError::ConversionNotAllowed { .. }));
    assert_eq!(
        env.service.get_node(&docs).unwrap().kind,
        NodeKind::Section
    );
}

// ---------------------------------------------------------------------------
// reads
// ---------------------------------------------------------------------------

#[test]
fn test_get_page_of_missing_file_is_drift() {
    let env = TestEnv::new();
    let id = env.page(None, "lost");
    fs::remove_file(env.content("lost.md")).unwrap();

    let err = env.service.get_page(&id).unwrap_err();
    assert!(err.is_drift());
}

#[test]
fn test_lookup_path_reports_segments() {
    let env = TestEnv::new();
    let docs = env.section(None, "docs");

    let lookup = env.service.lookup_path("/docs//missing/").unwrap();
    assert_eq!(lookup.path, "docs/missing");
    assert!(!lookup.exists);
    assert_eq!(lookup.segments.len(), 2);
    assert_eq!(lookup.segments[0].id.as_deref(), Some(docs.as_str()));
    assert!(!lookup.segments[1].exists);

    let err = env.service.lookup_path("docs/../x").unwrap_err();
    assert!(matches!(err, TreeError::InvalidPath { .. }));
}

#[test]
fn test_suggest_slug_skips_taken() {
    let env = TestEnv::new();
    let first = env.page(None, "hello-world");

    assert_eq!(
        env.service.suggest_slug(None, None, "Hello World").unwrap(),
        "hello-world-1"
    );
    assert_eq!(
        env.service
            .suggest_slug(None, Some(&first), "Hello World")
            .unwrap(),
        "hello-world"
    );
}

#[test]
fn test_views_are_detached() {
    let env = TestEnv::new();
    env.page(None, "a");

    let mut view = env.service.tree().unwrap();
    view.children.clear();

    assert_eq!(env.child_slugs(ROOT_ID), vec!["a"]);
}
