use std::fs;

use beadview::tmpl::{FileTemplateSet, TemplateError, TemplateStore};

#[test]
fn load_parses_every_html_file() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("index.html"), "<h1>{{ .Title }}</h1>").unwrap();
    fs::write(dir.path().join("detail.html"), "<p>{{ .Body }}</p>").unwrap();
    fs::write(dir.path().join("notes.txt"), "not a template").unwrap();

    let set = FileTemplateSet::load(dir.path()).unwrap();
    let snapshot = set.snapshot();
    assert_eq!(snapshot.len(), 2);
    assert!(snapshot.contains_key("index.html"));
    assert!(snapshot.contains_key("detail.html"));
    assert_eq!(set.get("index.html").unwrap().source, "<h1>{{ .Title }}</h1>");
}

#[test]
fn empty_template_directory_fails_the_load() {
    let dir = tempfile::tempdir().unwrap();
    let err = FileTemplateSet::load(dir.path()).unwrap_err();
    assert!(matches!(err, TemplateError::Empty(_)));
}

#[test]
fn missing_directory_fails_the_load() {
    let err = FileTemplateSet::load("/definitely/not/here").unwrap_err();
    assert!(matches!(err, TemplateError::Io(_, _)));
}

#[test]
fn unbalanced_action_delimiters_fail_the_parse() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("broken.html"), "<h1>{{ .Title </h1>").unwrap();
    let err = FileTemplateSet::load(dir.path()).unwrap_err();
    assert!(matches!(err, TemplateError::Parse { .. }));

    fs::write(dir.path().join("broken.html"), "<h1>.Title }}</h1>").unwrap();
    let err = FileTemplateSet::load(dir.path()).unwrap_err();
    assert!(matches!(err, TemplateError::Parse { .. }));
}

#[test]
fn reparse_swaps_in_the_new_content() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("index.html"), "v1").unwrap();
    let set = FileTemplateSet::load(dir.path()).unwrap();
    assert_eq!(set.get("index.html").unwrap().source, "v1");

    fs::write(dir.path().join("index.html"), "v2").unwrap();
    set.reparse_all().unwrap();
    assert_eq!(set.get("index.html").unwrap().source, "v2");
}

#[test]
fn failed_reparse_keeps_serving_the_old_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("index.html"), "{{ .Title }}").unwrap();
    let set = FileTemplateSet::load(dir.path()).unwrap();

    // Readers holding the old snapshot, or asking for a new one, must never
    // observe a half-applied rebuild.
    fs::write(dir.path().join("index.html"), "{{ broken").unwrap();
    assert!(set.reparse_all().is_err());
    assert_eq!(set.get("index.html").unwrap().source, "{{ .Title }}");
}
