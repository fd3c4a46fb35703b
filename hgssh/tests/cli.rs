use std::io::Write;

use assert_cmd::Command;
use predicates::prelude::*;

const POLICY: &str = "\
[groups]
admins = alice

[defaults]
location = repos/$r
@admins = rw
carol = r
";

fn policy_file(dir: &tempfile::TempDir) -> std::path::PathBuf {
    let path = dir.path().join("hgssh.conf");
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(POLICY.as_bytes()).unwrap();
    path
}

fn hgssh() -> Command {
    let mut cmd = Command::cargo_bin("hgssh").unwrap();
    cmd.env_remove("SSH_ORIGINAL_COMMAND")
        .env_remove("HGSSH_HG")
        .env_remove("HGSSH_REJECT_HOOK")
        .env_remove("HGSSH_LOG")
        .env_remove("HGSSH_LOG_FILE");
    cmd
}

#[test]
fn missing_remote_command_is_illegal() {
    let dir = tempfile::tempdir().unwrap();
    hgssh()
        .arg("alice")
        .arg(policy_file(&dir))
        .assert()
        .code(255)
        .stdout(predicate::str::is_empty())
        .stderr("Illegal command \"?\"\n");
}

#[test]
fn unauthorized_user_is_refused() {
    let dir = tempfile::tempdir().unwrap();
    hgssh()
        .arg("bob")
        .arg(policy_file(&dir))
        .env("SSH_ORIGINAL_COMMAND", "hg -R /proj serve --stdio")
        .assert()
        .code(255)
        .stderr("Illegal repository \"proj\"\n");
}

#[test]
fn unreadable_policy_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    hgssh()
        .arg("alice")
        .arg(dir.path().join("missing.conf"))
        .env("SSH_ORIGINAL_COMMAND", "hg -R /proj serve --stdio")
        .assert()
        .code(255)
        .stderr(predicate::str::starts_with("could not read policy file"));
}

#[test]
fn illegal_command_is_reported_before_reading_the_policy() {
    let dir = tempfile::tempdir().unwrap();
    hgssh()
        .arg("alice")
        .arg(dir.path().join("missing.conf"))
        .assert()
        .code(255)
        .stderr("Illegal command \"?\"\n");
}

#[test]
fn unusable_log_file_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    hgssh()
        .arg("alice")
        .arg(policy_file(&dir))
        .env("HGSSH_LOG_FILE", dir.path().join("missing-dir/hgssh.log"))
        .assert()
        .code(255)
        .stderr(
            predicate::str::contains("hgssh: logging to")
                .and(predicate::str::contains("missing-dir"))
                .and(predicate::str::ends_with("Illegal command \"?\"\n")),
        );
}

#[test]
fn missing_arguments_are_a_usage_error() {
    hgssh().arg("alice").assert().failure().stderr(predicate::str::contains("<CONFIG>"));
}

#[cfg(unix)]
mod with_fake_hg {
    use std::os::unix::fs::PermissionsExt;
    use std::path::{Path, PathBuf};

    use super::*;

    /// A stand-in for `hg` that writes its arguments, one per line, next to itself, and copies the
    /// last file of `HGRCPATH` if that is set. Like Mercurial, it refuses `serve` unless the
    /// arguments are exactly `-R <repo> serve --stdio`.
    fn fake_hg(dir: &Path, exit_code: u8) -> PathBuf {
        let path = dir.join("hg");
        let script = format!(
            r#"#!/bin/sh
for arg in "$@"; do printf '%s\n' "$arg"; done > "{args}"
if [ -n "$HGRCPATH" ]; then cat "${{HGRCPATH##*:}}" > "{hgrc}"; fi
if [ "$3" = serve ] && [ "$#" -ne 4 -o "$1" != -R -o "$4" != --stdio ]; then
    echo 'abort: potentially unsafe serve --stdio invocation' >&2
    exit 255
fi
exit {exit_code}
"#,
            args = dir.join("args").display(),
            hgrc = dir.join("hgrc").display(),
        );
        std::fs::write(&path, script).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    fn recorded_args(dir: &Path) -> Vec<String> {
        std::fs::read_to_string(dir.join("args"))
            .unwrap()
            .lines()
            .map(ToOwned::to_owned)
            .collect()
    }

    #[test]
    fn read_only_session_runs_hg_with_reject_hooks() {
        let dir = tempfile::tempdir().unwrap();
        let hg = fake_hg(dir.path(), 0);
        hgssh()
            .current_dir(dir.path())
            .arg("carol")
            .arg(policy_file(&dir))
            .env("SSH_ORIGINAL_COMMAND", "hg -R /proj serve --stdio")
            .env("HGSSH_HG", &hg)
            .env("HGSSH_REJECT_HOOK", "false")
            .env_remove("HGRCPATH")
            .assert()
            .success()
            .stderr(predicate::str::is_empty());

        let repository = dir.path().canonicalize().unwrap().join("repos/proj");
        assert_eq!(
            recorded_args(dir.path()),
            ["-R".to_owned(), repository.display().to_string(), "serve".into(), "--stdio".into()]
        );
        assert_eq!(
            std::fs::read_to_string(dir.path().join("hgrc")).unwrap(),
            "[hooks]\nprechangegroup.hgssh = false\nprepushkey.hgssh = false\n"
        );
    }

    #[test]
    fn writable_session_leaves_configuration_alone() {
        let dir = tempfile::tempdir().unwrap();
        let hg = fake_hg(dir.path(), 0);
        hgssh()
            .current_dir(dir.path())
            .arg("alice")
            .arg(policy_file(&dir))
            .env("SSH_ORIGINAL_COMMAND", "hg -R /proj serve --stdio")
            .env("HGSSH_HG", &hg)
            .env_remove("HGRCPATH")
            .assert()
            .success();
        assert_eq!(recorded_args(dir.path()).len(), 4);
        assert!(!dir.path().join("hgrc").exists());
    }

    #[test]
    fn rejected_init_never_runs_hg() {
        let dir = tempfile::tempdir().unwrap();
        let hg = fake_hg(dir.path(), 0);
        hgssh()
            .current_dir(dir.path())
            .arg("alice")
            .arg(policy_file(&dir))
            .env("SSH_ORIGINAL_COMMAND", "hg init fresh")
            .env("HGSSH_HG", &hg)
            .assert()
            .code(255)
            .stderr("User does not have permission to create repositories.\n");
        assert!(!dir.path().join("args").exists());
    }

    #[test]
    fn exit_status_of_hg_is_propagated() {
        let dir = tempfile::tempdir().unwrap();
        let hg = fake_hg(dir.path(), 3);
        hgssh()
            .current_dir(dir.path())
            .arg("alice")
            .arg(policy_file(&dir))
            .env("SSH_ORIGINAL_COMMAND", "hg -R proj serve --stdio")
            .env("HGSSH_HG", &hg)
            .assert()
            .code(3);
    }
}
