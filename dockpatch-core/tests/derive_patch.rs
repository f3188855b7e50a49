// Integration tests for dockpatch-core
// These build a docker/hypermodern-python tree in a temp dir and run the real `diff -u`.

use dockpatch_core::{CommandDiff, DeriveConfig, DeriveError, Deriver, Emit, SubprocessError};
use std::fs;
use std::path::PathBuf;

struct Tree {
    _dir: tempfile::TempDir,
    docker: PathBuf,
    project: PathBuf,
}

fn tree() -> Tree {
    let dir = tempfile::tempdir().expect("temp dir");
    let base = fs::canonicalize(dir.path()).expect("canonical temp dir");
    let docker = base.join("docker");
    let project = docker.join("hypermodern-python");
    fs::create_dir_all(&project).expect("project dir");
    Tree {
        _dir: dir,
        docker,
        project,
    }
}

fn deriver() -> Deriver<CommandDiff> {
    Deriver::new(DeriveConfig::default(), CommandDiff::default())
}

#[test]
fn greeting_patch_names_canonical_file_in_headers() {
    let tree = tree();
    fs::write(tree.project.join("greeting.01"), "hello\n").unwrap();
    fs::write(tree.project.join("greeting.02"), "hello world\n").unwrap();

    let mut out = Vec::new();
    let artifact = deriver()
        .derive(&tree.project.join("greeting.02"), Emit::Print, &mut out)
        .expect("derive should succeed");

    let patch_path = tree.project.join("greeting.02.patch");
    assert_eq!(artifact.path, patch_path);
    let patch = fs::read_to_string(&patch_path).unwrap();
    let lines: Vec<&str> = patch.lines().collect();

    assert!(lines[0].starts_with("--- a/greeting"), "header: {}", lines[0]);
    assert!(lines[1].starts_with("+++ b/greeting"), "header: {}", lines[1]);
    assert!(!lines[0].contains("greeting.01"));
    assert!(!lines[1].contains("greeting.02"));
    assert!(patch.contains("\n-hello\n+hello world\n"), "patch:\n{patch}");

    assert_eq!(
        String::from_utf8(out).unwrap(),
        "COPY hypermodern-python/greeting.02.patch /tmp/patch\nRUN patch -p1 < /tmp/patch\n"
    );
}

#[test]
fn rerunning_produces_identical_patch() {
    let tree = tree();
    fs::write(tree.project.join("noxfile.py"), "import nox\n").unwrap();
    fs::write(
        tree.project.join("noxfile.py.01"),
        "import nox\n\n\n@nox.session\ndef tests(session):\n    session.run(\"pytest\")\n",
    )
    .unwrap();

    let input = tree.project.join("noxfile.py.01");
    let mut out = Vec::new();
    let first = deriver().derive(&input, Emit::Print, &mut out).unwrap();
    let first_bytes = fs::read(&first.path).unwrap();
    let second = deriver().derive(&input, Emit::Print, &mut out).unwrap();
    let second_bytes = fs::read(&second.path).unwrap();

    assert_eq!(first_bytes, second_bytes);
    assert!(first.text.starts_with("--- a/noxfile.py"));
}

#[test]
fn append_twice_adds_four_lines_in_order() {
    let tree = tree();
    let dockerfile = tree.docker.join("Dockerfile");
    fs::write(&dockerfile, "FROM python:3.8\nWORKDIR /hypermodern-python\n").unwrap();
    fs::write(tree.project.join("a"), "1\n").unwrap();
    fs::write(tree.project.join("a.01"), "2\n").unwrap();
    fs::write(tree.project.join("b.01"), "x\n").unwrap();
    fs::write(tree.project.join("b.02"), "y\n").unwrap();

    let mut out = Vec::new();
    deriver()
        .derive_all(
            &[tree.project.join("a.01"), tree.project.join("b.02")],
            Emit::Append,
            &mut out,
        )
        .unwrap();

    assert!(out.is_empty());
    let content = fs::read_to_string(&dockerfile).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(
        lines,
        vec![
            "FROM python:3.8",
            "WORKDIR /hypermodern-python",
            "COPY hypermodern-python/a.01.patch /tmp/patch",
            "RUN patch -p1 < /tmp/patch",
            "COPY hypermodern-python/b.02.patch /tmp/patch",
            "RUN patch -p1 < /tmp/patch",
        ]
    );
}

#[test]
fn missing_predecessor_fails_instead_of_writing_garbage() {
    let tree = tree();
    fs::write(tree.project.join("greeting.03"), "hello again\n").unwrap();

    let mut out = Vec::new();
    let err = deriver()
        .derive(&tree.project.join("greeting.03"), Emit::Print, &mut out)
        .unwrap_err();

    match err {
        DeriveError::Diff {
            source: SubprocessError::Failed { stderr, .. },
            ..
        } => assert!(stderr.contains("greeting.02"), "stderr: {stderr}"),
        other => panic!("expected a failed diff, got {other:?}"),
    }
    assert!(!tree.project.join("greeting.03.patch").exists());
    assert!(out.is_empty());
}

#[test]
fn identical_versions_give_empty_patch_or_strict_error() {
    let tree = tree();
    fs::write(tree.project.join("same.01"), "same\n").unwrap();
    fs::write(tree.project.join("same.02"), "same\n").unwrap();
    let input = tree.project.join("same.02");

    let mut out = Vec::new();
    let artifact = deriver().derive(&input, Emit::Print, &mut out).unwrap();
    assert_eq!(fs::read_to_string(artifact.path).unwrap(), "");

    let strict = Deriver::new(
        DeriveConfig {
            strict: true,
            ..DeriveConfig::default()
        },
        CommandDiff::default(),
    );
    let err = strict.derive(&input, Emit::Print, &mut out).unwrap_err();
    assert!(matches!(err, DeriveError::EmptyDiff { .. }));
}

#[test]
fn nested_file_patch_is_relative_to_project() {
    let tree = tree();
    let pkg = tree.project.join("src/hypermodern_python");
    fs::create_dir_all(&pkg).unwrap();
    fs::write(pkg.join("console.py"), "print('hi')\n").unwrap();
    fs::write(pkg.join("console.py.01"), "print('hello')\n").unwrap();

    let mut out = Vec::new();
    let artifact = deriver()
        .derive(&pkg.join("console.py.01"), Emit::Print, &mut out)
        .unwrap();

    assert!(artifact
        .text
        .starts_with("--- a/src/hypermodern_python/console.py"));
    assert_eq!(
        artifact.statements.copy,
        "COPY hypermodern-python/src/hypermodern_python/console.py.01.patch /tmp/patch"
    );
}

#[test]
fn binary_versions_are_rejected_without_patch_or_statements() {
    let tree = tree();
    let dockerfile = tree.docker.join("Dockerfile");
    fs::write(&dockerfile, "FROM python:3.8\n").unwrap();
    fs::write(tree.project.join("bin.01"), [0x00u8, 0x01, 0x02]).unwrap();
    fs::write(tree.project.join("bin.02"), [0x00u8, 0x01, 0x03]).unwrap();

    let mut out = Vec::new();
    let err = deriver()
        .derive(&tree.project.join("bin.02"), Emit::Append, &mut out)
        .unwrap_err();

    // diffutils reports differing binaries with status 1 ("Binary files ... differ")
    // or, in newer releases, status 2.
    assert!(
        matches!(
            err,
            DeriveError::MalformedDiff { .. }
                | DeriveError::Diff {
                    source: SubprocessError::Failed { .. },
                    ..
                }
        ),
        "got {err:?}"
    );
    assert!(!tree.project.join("bin.02.patch").exists());
    assert_eq!(fs::read_to_string(&dockerfile).unwrap(), "FROM python:3.8\n");
    assert!(out.is_empty());
}
