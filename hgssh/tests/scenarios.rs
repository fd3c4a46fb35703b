use std::io::Write;
use std::path::Path;

use hgssh::dispatch::{ExitOutcome, Recording};
use hgssh::{Gateway, GatewayOptions, Kind, Rejection};
use hgssh_acl::PolicyConfig;
use pretty_assertions::assert_eq;

const CWD: &str = "/home/hg";

const POLICY: &str = "\
[groups]
admins = alice
readers = erin
writers = erin

[system]
init = @admins

[defaults]
location = repos/$r
@admins = rw

[r:proj]
carol = r

[r:split]
@readers = r
@writers = w

[r:locked]
location = vault/locked
alice =
";

fn gateway() -> Gateway<Recording> {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(POLICY.as_bytes()).unwrap();
    let config = PolicyConfig::load(file.path()).unwrap();
    Gateway::new(config, GatewayOptions::default(), Recording::new()).unwrap()
}

fn rejection(err: hgssh::Error) -> Rejection {
    err.rejection().cloned().expect("a rejection")
}

#[test]
fn admin_gets_a_writable_session() {
    let mut gateway = gateway();
    let outcome = gateway.run("alice", "hg -R /proj serve --stdio", Path::new(CWD)).unwrap();

    assert_eq!(outcome, ExitOutcome::success());
    assert_eq!(
        gateway.dispatch().last_call().unwrap(),
        ["-R", "/home/hg/repos/proj", "serve", "--stdio"]
    );
    assert_eq!(gateway.dispatch().last_hgrc(), None);
}

#[test]
fn user_without_any_entry_is_refused() {
    let mut gateway = gateway();
    let err = gateway.run("bob", "hg -R /proj serve --stdio", Path::new(CWD)).unwrap_err();

    assert_eq!(err.exit_code(), 255);
    assert_eq!(err.to_string(), "Illegal repository \"proj\"");
    assert!(gateway.dispatch().calls().is_empty());
}

#[test]
fn explicit_reader_falls_back_to_default_location_and_is_read_only() {
    let mut gateway = gateway();
    gateway.run("carol", "hg -R /proj serve --stdio", Path::new(CWD)).unwrap();

    assert_eq!(
        gateway.dispatch().last_call().unwrap(),
        ["-R", "/home/hg/repos/proj", "serve", "--stdio"],
        "mercurial only accepts the exact serve arguments"
    );
    assert_eq!(
        gateway.dispatch().last_hgrc(),
        Some(
            "[hooks]\n\
             prechangegroup.hgssh = echo 'Permission denied' >&2; exit 1\n\
             prepushkey.hgssh = echo 'Permission denied' >&2; exit 1\n"
        )
    );
}

#[test]
fn creation_by_non_admin_is_forbidden_and_not_dispatched() {
    let mut gateway = gateway();
    let err = gateway.run("dave", "hg init newrepo", Path::new(CWD)).unwrap_err();

    assert_eq!(rejection(err).kind(), Kind::CreationForbidden);
    assert!(gateway.dispatch().calls().is_empty());
}

#[test]
fn creation_by_admin_uses_the_default_location() {
    let mut gateway = gateway();
    gateway.run("alice", "hg init /newrepo", Path::new(CWD)).unwrap();
    assert_eq!(gateway.dispatch().last_call().unwrap(), ["init", "/home/hg/repos/newrepo"]);
}

#[test]
fn groups_in_one_section_union_their_permissions() {
    let mut gateway = gateway();
    gateway.run("erin", "hg -R split serve --stdio", Path::new(CWD)).unwrap();

    let args = gateway.dispatch().last_call().unwrap();
    assert_eq!(args, ["-R", "/home/hg/repos/split", "serve", "--stdio"]);
}

#[test]
fn direct_empty_entry_shadows_group_grants() {
    let mut gateway = gateway();
    let err = gateway.run("alice", "hg -R /locked serve --stdio", Path::new(CWD)).unwrap_err();
    assert_eq!(rejection(err), Rejection::AccessDenied { name: "locked".into() });
}

#[test]
fn placeholder_uses_the_stripped_name() {
    let gateway = gateway();
    let invocation = gateway.route("alice", "hg -R /team/tool serve --stdio", Path::new(CWD)).unwrap();
    assert_eq!(invocation.repository(), Path::new("/home/hg/repos/team/tool"));
}

#[test]
fn trailing_separator_of_ssh_urls_is_ignored() {
    let mut gateway = gateway();
    gateway.run("alice", "hg -R /proj/ serve --stdio", Path::new(CWD)).unwrap();
    assert_eq!(
        gateway.dispatch().last_call().unwrap(),
        ["-R", "/home/hg/repos/proj", "serve", "--stdio"]
    );
}

#[test]
fn unrecognized_commands_are_illegal() {
    let mut gateway = gateway();
    for command in ["?", "hg -R proj serve --stdio --debugger", "hg clone proj", "rm -rf /"] {
        let err = gateway.run("alice", command, Path::new(CWD)).unwrap_err();
        assert_eq!(err.to_string(), format!("Illegal command \"{command}\""));
    }
    assert!(gateway.dispatch().calls().is_empty());
}

#[test]
fn the_session_exit_status_is_passed_through() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(POLICY.as_bytes()).unwrap();
    let config = PolicyConfig::load(file.path()).unwrap();
    let dispatch = Recording::new().with_outcome(ExitOutcome { code: 1 });
    let mut gateway = Gateway::new(config, GatewayOptions::default(), dispatch).unwrap();

    let outcome = gateway.run("alice", "hg -R proj serve --stdio", Path::new(CWD)).unwrap();
    assert_eq!(outcome.code, 1);
}
