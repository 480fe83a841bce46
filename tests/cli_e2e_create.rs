//! End-to-end tests for `manifestly create`.

#[allow(dead_code)]
mod common;
use common::prelude::*;
use common::{git, head, short};

fn three_repositories(fixture: &TestFixture) -> (String, String, String) {
    let one = fixture.repository("one", Some("git@github.com:org/repo.git"));
    let two = fixture.repository("two", None);
    let three = fixture.repository("three", Some("https://github.com/org/repo2"));
    git(&three, &["tag", "v1.2.3"]);
    (head(&one), head(&two), head(&three))
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_create_all() {
    let fixture = TestFixture::new();
    let (one, two, three) = three_repositories(&fixture);

    let stdout = fixture.run(&[
        "create",
        "--search-paths",
        "src",
        "--add",
        "all",
        "--save-as",
        "my.manifest",
    ]);

    assert_eq!(
        fixture.read("my.manifest"),
        format!(
            "[one] org/repo@{}\n[three] org/repo2@{} # v1.2.3\n[two]@{}\n",
            short(&one),
            short(&three),
            short(&two)
        )
    );
    assert!(stdout.contains("[one] org/repo"));
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_create_selected_with_full_shas() {
    let fixture = TestFixture::new();
    let (one, _, _) = three_repositories(&fixture);

    fixture.run(&[
        "create",
        "--search-paths",
        "src",
        "--add",
        "one",
        "--save-as",
        "one.manifest",
        "--full-shas",
    ]);

    assert_eq!(fixture.read("one.manifest"), format!("[one] org/repo@{}\n", one));
}

#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
fn test_create_unknown_repository() {
    let fixture = TestFixture::new();
    three_repositories(&fixture);

    fixture
        .command()
        .args([
            "create",
            "--search-paths",
            "src",
            "--add",
            "thre",
            "--save-as",
            "x.manifest",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Repository not found: thre"))
        .stderr(predicate::str::contains("Did you mean 'three'?"));

    assert!(!fixture.path().join("x.manifest").exists());
}
