//! End-to-end tests of the `notes` binary.
//!
//! Each test runs against its own temporary notes directory and config home,
//! with a non-interactive program standing in for the editor.

use std::{
    fs,
    path::{Path, PathBuf},
};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const JAVA_NOTE: &str = "---\n\
title: Java Basics\n\
created: '2024-01-15T10:30:00Z'\n\
modified: '2024-01-15T10:30:00Z'\n\
tags: [java, programming]\n\
author: Ada\n\
---\n\
\n\
Learn the basics of Java\n";

const RUST_NOTE: &str = "---\n\
title: Rust Ownership\n\
created: 2024-02-01T08:00:00Z\n\
modified: 2024-02-01T08:00:00Z\n\
tags:\n\
- rust\n\
status: draft\n\
priority: 2\n\
---\n\
\n\
Borrowing rules\n";

/// Isolated notes directory and config home.
struct TestEnv {
    temp_dir: TempDir,
    notes_dir: PathBuf,
}

impl TestEnv {
    fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let notes_dir = temp_dir.path().join("notes");
        Self {
            temp_dir,
            notes_dir,
        }
    }

    fn notes_dir(&self) -> &Path {
        &self.notes_dir
    }

    /// A command with the given editor program.
    fn cmd_with_editor(&self, editor: &str) -> Command {
        let home = self.temp_dir.path().join("home");
        let mut cmd = Command::cargo_bin("notes").expect("binary should build");
        cmd.arg("--notes-dir")
            .arg(&self.notes_dir)
            .env("HOME", &home)
            .env("XDG_CONFIG_HOME", home.join(".config"))
            .env("EDITOR", editor)
            .env_remove("RUST_LOG");
        cmd
    }

    /// A command whose editor leaves the file untouched.
    fn cmd(&self) -> Command {
        self.cmd_with_editor("true")
    }

    fn add_note_file(&self, name: &str, contents: &str) -> PathBuf {
        fs::create_dir_all(&self.notes_dir).unwrap();
        let path = self.notes_dir.join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    fn note_files(&self) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = fs::read_dir(&self.notes_dir)
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "note"))
            .collect();
        files.sort();
        files
    }

    fn with_sample_notes(self) -> Self {
        self.add_note_file("java-basics-1705314600000.note", JAVA_NOTE);
        self.add_note_file("rust-ownership-1706774400000.note", RUST_NOTE);
        self
    }
}

mod general {
    use super::*;

    #[test]
    fn help_describes_the_tool() {
        let env = TestEnv::new();
        env.cmd()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("Personal Notes Manager"))
            .stdout(predicate::str::contains("Usage"));
    }

    #[test]
    fn version_is_printed() {
        let env = TestEnv::new();
        env.cmd()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("1.0.0"));
    }

    #[test]
    fn no_subcommand_prints_usage() {
        let env = TestEnv::new();
        env.cmd()
            .assert()
            .success()
            .stdout(predicate::str::contains("Usage"));
    }

    #[test]
    fn missing_explicit_config_fails() {
        let env = TestEnv::new();
        env.cmd()
            .arg("--config")
            .arg(env.notes_dir().join("nope.json"))
            .arg("list")
            .assert()
            .code(1)
            .stderr(predicate::str::contains("Configuration error"));
    }
}

mod list {
    use super::*;

    #[test]
    fn empty_directory_is_created_and_reported() {
        let env = TestEnv::new();
        env.cmd()
            .arg("list")
            .assert()
            .success()
            .stdout(predicate::str::contains(
                "No notes found. Create your first note with 'notes create'",
            ));
        assert!(env.notes_dir().is_dir());
    }

    #[test]
    fn lists_all_notes_with_tags() {
        let env = TestEnv::new().with_sample_notes();
        env.cmd()
            .arg("list")
            .assert()
            .success()
            .stdout(predicate::str::contains("All notes:"))
            .stdout(predicate::str::contains("Java Basics"))
            .stdout(predicate::str::contains("[java, programming]"))
            .stdout(predicate::str::contains("Rust Ownership"))
            .stdout(predicate::str::contains("Total: 2 notes"));
    }

    #[test]
    fn filters_by_tag() {
        let env = TestEnv::new().with_sample_notes();
        env.cmd()
            .args(["list", "--tag", "rust"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Notes with tag 'rust':"))
            .stdout(predicate::str::contains("Rust Ownership"))
            .stdout(predicate::str::contains("Java Basics").not())
            .stdout(predicate::str::contains("Total: 1 notes"));

        env.cmd()
            .args(["list", "--tag", "python"])
            .assert()
            .success()
            .stdout(predicate::str::contains("No notes found with tag: python"));
    }

    #[test]
    fn corrupt_file_is_skipped_with_warning() {
        let env = TestEnv::new().with_sample_notes();
        env.add_note_file("broken-1.note", "this is not a note\n");

        env.cmd()
            .arg("list")
            .assert()
            .success()
            .stdout(predicate::str::contains("Total: 2 notes"))
            .stderr(predicate::str::contains("Could not read note file"))
            .stderr(predicate::str::contains("broken-1.note"));
    }

    #[test]
    fn corrupt_file_warning_ignores_log_filter() {
        let env = TestEnv::new().with_sample_notes();
        env.add_note_file("broken-1.note", "---\ntitle: [unclosed\n");

        for args in [
            vec!["list"],
            vec!["list", "--tag", "rust"],
            vec!["search", "rust"],
            vec!["stats"],
            vec!["read", "java"],
        ] {
            env.cmd()
                .env("RUST_LOG", "off")
                .args(&args)
                .assert()
                .success()
                .stderr(predicate::str::contains(
                    "Warning: Could not read note file",
                ))
                .stderr(predicate::str::contains("broken-1.note"));
        }
    }

    #[test]
    fn notes_dir_that_is_a_file_fails() {
        let env = TestEnv::new();
        fs::write(env.notes_dir(), "not a directory").unwrap();

        env.cmd()
            .arg("list")
            .assert()
            .code(1)
            .stderr(predicate::str::contains("Failed to create or access directory"))
            .stdout(predicate::str::contains("No notes found").not());
    }
}

mod read {
    use super::*;

    #[test]
    fn reads_by_exact_id() {
        let env = TestEnv::new().with_sample_notes();
        env.cmd()
            .args(["read", "java-basics-1705314600"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Java Basics"))
            .stdout(predicate::str::contains("Created: 2024-01-15T10:30:00Z"))
            .stdout(predicate::str::contains("Tags: java, programming"))
            .stdout(predicate::str::contains("Author: Ada"))
            .stdout(predicate::str::contains("Learn the basics of Java"));
    }

    #[test]
    fn reads_by_title_fragment() {
        let env = TestEnv::new().with_sample_notes();
        env.cmd()
            .args(["read", "ownership"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Rust Ownership"))
            .stdout(predicate::str::contains("Status: draft"))
            .stdout(predicate::str::contains("Priority: 2"))
            .stdout(predicate::str::contains("Borrowing rules"));
    }

    #[test]
    fn unknown_identifier_fails() {
        let env = TestEnv::new().with_sample_notes();
        env.cmd()
            .args(["read", "ghost"])
            .assert()
            .code(1)
            .stderr(predicate::str::contains("Note not found: ghost"));
    }
}

mod search {
    use super::*;

    #[test]
    fn matches_tags_by_default() {
        let env = TestEnv::new().with_sample_notes();
        env.add_note_file(
            "tagged-1.note",
            "---\n\
             title: Tagged\n\
             created: 2024-03-01T00:00:00Z\n\
             modified: 2024-03-01T00:00:00Z\n\
             tags: [Java]\n\
             ---\n",
        );

        env.cmd()
            .args(["search", "java"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Search results for 'java':"))
            .stdout(predicate::str::contains("Tagged"))
            .stdout(predicate::str::contains("Java Basics"))
            .stdout(predicate::str::contains("...Learn the basics of Java..."))
            .stdout(predicate::str::contains("Found 2 notes"));
    }

    #[test]
    fn title_and_content_restrictions() {
        let env = TestEnv::new().with_sample_notes();

        env.cmd()
            .args(["search", "borrowing", "--title"])
            .assert()
            .success()
            .stdout(predicate::str::contains("No notes found matching: borrowing"));

        env.cmd()
            .args(["search", "borrowing", "--content"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Rust Ownership"))
            .stdout(predicate::str::contains("Found 1 notes"));
    }

    #[test]
    fn title_and_content_flags_conflict() {
        let env = TestEnv::new();
        env.cmd()
            .args(["search", "x", "--title", "--content"])
            .assert()
            .failure();
    }
}

mod stats {
    use super::*;

    #[test]
    fn summarizes_collection() {
        let env = TestEnv::new().with_sample_notes();
        env.cmd()
            .arg("stats")
            .assert()
            .success()
            .stdout(predicate::str::contains("Total notes: 2"))
            .stdout(predicate::str::contains("Unique tags: 3"))
            .stdout(predicate::str::contains("Tags: java, programming, rust"))
            .stdout(predicate::str::contains("Total words: 7"))
            .stdout(predicate::str::contains("Average words per note: 3"))
            .stdout(predicate::str::contains("Notes with authors: 1"));
    }

    #[test]
    fn empty_collection() {
        let env = TestEnv::new();
        env.cmd()
            .arg("stats")
            .assert()
            .success()
            .stdout(predicate::str::contains("No notes found."));
    }
}

mod delete {
    use super::*;

    #[test]
    fn declined_confirmation_keeps_note() {
        let env = TestEnv::new().with_sample_notes();
        env.cmd()
            .args(["delete", "Java Basics"])
            .write_stdin("n\n")
            .assert()
            .success()
            .stdout(predicate::str::contains("About to delete note: Java Basics"))
            .stdout(predicate::str::contains("Deletion cancelled"));
        assert_eq!(env.note_files().len(), 2);
    }

    #[test]
    fn confirmed_delete_removes_file() {
        let env = TestEnv::new().with_sample_notes();
        env.cmd()
            .args(["delete", "java"])
            .write_stdin("yes\n")
            .assert()
            .success()
            .stdout(predicate::str::contains("Note deleted: Java Basics"));
        assert_eq!(env.note_files().len(), 1);
    }

    #[test]
    fn forced_delete_skips_prompt() {
        let env = TestEnv::new().with_sample_notes();
        env.cmd()
            .args(["delete", "rust-ownership-1706774400", "--force"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Note deleted: Rust Ownership"))
            .stdout(predicate::str::contains("Are you sure").not());

        env.cmd()
            .args(["read", "Rust Ownership"])
            .assert()
            .code(1);
    }
}

#[cfg(unix)]
mod create_and_edit {
    use super::*;

    #[test]
    fn create_with_untouched_template() {
        let env = TestEnv::new();
        env.cmd()
            .args(["create", "--title", "Test Note", "--tag", "java, tutorial"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Note created successfully: Test Note"))
            .stdout(predicate::str::contains("ID: test-note-"));

        let files = env.note_files();
        assert_eq!(files.len(), 1);
        let written = fs::read_to_string(&files[0]).unwrap();
        assert!(written.starts_with("---\ntitle: Test Note\ncreated: "));
        assert!(written.contains("tags: [java, tutorial]\n"));
        assert!(written.ends_with("---\n"));

        env.cmd()
            .arg("list")
            .assert()
            .success()
            .stdout(predicate::str::contains("[java, tutorial]"));
    }

    #[test]
    fn create_keeps_editor_output() {
        let env = TestEnv::new();
        env.cmd_with_editor(r#"sh -c 'printf "This is test content" > "$0"'"#)
            .args(["create", "-t", "Written"])
            .assert()
            .success();

        env.cmd()
            .args(["read", "written"])
            .assert()
            .success()
            .stdout(predicate::str::contains("This is test content"));
    }

    #[test]
    fn create_prompts_for_missing_title() {
        let env = TestEnv::new();
        env.cmd()
            .arg("create")
            .write_stdin("Prompted Title\n")
            .assert()
            .success()
            .stdout(predicate::str::contains("Enter note title:"))
            .stdout(predicate::str::contains("Note created successfully: Prompted Title"));

        env.cmd()
            .arg("create")
            .write_stdin("\n")
            .assert()
            .success()
            .stdout(predicate::str::contains("Note created successfully: Untitled Note"));
    }

    #[test]
    fn failing_editor_writes_nothing() {
        let env = TestEnv::new();
        env.cmd_with_editor("false")
            .args(["create", "--title", "Never"])
            .assert()
            .code(1)
            .stderr(predicate::str::contains("Editor exited with code 1"));
        assert!(env.note_files().is_empty());
    }

    #[test]
    fn edit_rewrites_note() {
        let env = TestEnv::new().with_sample_notes();
        env.cmd_with_editor(r#"sh -c 'printf "Rewritten body" > "$0"'"#)
            .args(["edit", "Rust Ownership"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Note updated: Rust Ownership"));

        let files = env.note_files();
        assert_eq!(files.len(), 2);
        assert!(!env.notes_dir().join("rust-ownership-1706774400000.note").exists());

        env.cmd()
            .args(["read", "rust-ownership-1706774400"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Rewritten body"))
            .stdout(predicate::str::contains("Created: 2024-02-01T08:00:00Z"))
            .stdout(predicate::str::contains("Priority: 2"));
    }

    #[test]
    fn edit_without_changes() {
        let env = TestEnv::new().with_sample_notes();
        env.cmd()
            .args(["edit", "java"])
            .assert()
            .success()
            .stdout(predicate::str::contains("No changes made to: Java Basics"));
        assert!(env.notes_dir().join("java-basics-1705314600000.note").exists());
    }
}
