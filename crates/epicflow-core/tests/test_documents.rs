//! Document store behaviour on the real file system.

use epicflow_core::tools::fs_impl::StdFsAdapter;
use epicflow_core::{DocumentStore, EpicStatus, EpicflowConfig, InterviewAnswers};
use epicflow_core::interview::build_prd;
use epicflow_templates::TemplateManager;
use std::fs;
use tempfile::TempDir;

fn answers() -> InterviewAnswers {
    InterviewAnswers {
        objective: Some("Find products fast.".to_string()),
        user_stories: Some("- As a shopper I can search.".to_string()),
        tasks: Some("- [ ] Index".to_string()),
        ..Default::default()
    }
}

#[test]
fn test_numbering_follows_highest_prd() {
    let temp = TempDir::new().unwrap();
    let config = EpicflowConfig::new(temp.path().to_path_buf());
    let templates = TemplateManager::builtin();
    let fs_adapter = StdFsAdapter::new();
    let store = DocumentStore::new(&config, &fs_adapter, &templates);

    assert_eq!(store.next_epic_number().unwrap(), 1);

    fs::create_dir_all(&config.prd_dir).unwrap();
    fs::write(config.prd_dir.join("003-search.md"), "# Epic 3: Search\n").unwrap();
    fs::write(config.prd_dir.join("notes.md"), "scratch").unwrap();
    assert_eq!(store.next_epic_number().unwrap(), 4);
}

#[test]
fn test_prd_written_and_listed() {
    let temp = TempDir::new().unwrap();
    let config = EpicflowConfig::new(temp.path().to_path_buf());
    let templates = TemplateManager::builtin();
    let fs_adapter = StdFsAdapter::new();
    let store = DocumentStore::new(&config, &fs_adapter, &templates);

    let prd = build_prd(1, "search", "Search", answers()).unwrap();
    let path = store.write_prd(&prd).unwrap();
    assert_eq!(path, config.prd_dir.join("001-search.md"));

    let content = fs::read_to_string(&path).unwrap();
    assert!(content.starts_with("# Epic 1: Search\n"));
    assert!(content.contains("**Status:** Draft"));
    assert!(content.contains("## Dependencies\n\n- None"));

    store.set_status("search", EpicStatus::InProgress).unwrap();
    let epics = store.list_epics().unwrap();
    assert_eq!(epics.len(), 1);
    assert_eq!(epics[0].status, EpicStatus::InProgress);
}

#[test]
fn test_learnings_append_in_order_without_touching_history() {
    let temp = TempDir::new().unwrap();
    let config = EpicflowConfig::new(temp.path().to_path_buf());
    let templates = TemplateManager::builtin();
    let fs_adapter = StdFsAdapter::new();
    let store = DocumentStore::new(&config, &fs_adapter, &templates);

    fs::create_dir_all(config.learnings_file.parent().unwrap()).unwrap();
    fs::write(&config.learnings_file, "# Learnings\n\n- older entry").unwrap();

    let appended = store
        .append_learnings(&["first".to_string(), "second\nline".to_string()])
        .unwrap();
    assert_eq!(appended, 2);

    let content = fs::read_to_string(&config.learnings_file).unwrap();
    assert_eq!(
        content,
        "# Learnings\n\n- older entry\n- first\n- second line\n"
    );
}
