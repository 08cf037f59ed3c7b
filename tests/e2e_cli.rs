//! End-to-end tests of the demo binary: exit statuses and printed output.

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

fn demo() -> Command {
    cargo_bin_cmd!("clidec-demo")
}

mod cli_basics {
    use super::*;

    #[test]
    fn shows_help() {
        demo()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("clidec-demo"))
            .stdout(predicate::str::contains("Commands:"))
            .stdout(predicate::str::contains("project"));
    }

    #[test]
    fn shows_version() {
        demo()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
    }

    #[test]
    fn runs_a_leaf_command() {
        demo()
            .args(["greet", "--name", "Ada", "--times", "2"])
            .assert()
            .success()
            .stdout("Hello, Ada!\nHello, Ada!\n");
    }

    #[test]
    fn parent_flags_reach_the_leaf() {
        demo()
            .args(["-v", "--profile", "prod", "greet"])
            .assert()
            .success()
            .stdout(predicate::str::contains("(profile: prod)"));
    }

    #[test]
    fn child_declaration_wins_on_collision() {
        demo()
            .args(["--profile", "prod", "inspect"])
            .assert()
            .success()
            .stdout(predicate::str::contains("profile = release"))
            .stdout(predicate::str::contains("command = inspect"));
    }

    #[test]
    fn imported_commands_are_reachable() {
        demo()
            .args(["dev", "lint", "--level", "deny"])
            .assert()
            .success()
            .stdout("Linted at level 'deny'.\n");
        demo()
            .args(["tools", "fmt"])
            .assert()
            .success()
            .stdout("Formatted.\n");
    }
}

mod usage_paths {
    use super::*;

    #[test]
    fn no_arguments_prints_root_help_with_status_1() {
        demo()
            .assert()
            .code(1)
            .stdout(predicate::str::contains("Usage: clidec-demo"));
    }

    #[test]
    fn help_colors_follow_the_environment() {
        demo()
            .env_remove("NO_COLOR")
            .env("CLICOLOR_FORCE", "1")
            .assert()
            .code(1)
            .stdout(predicate::str::contains("\u{1b}["));
        demo()
            .env("NO_COLOR", "1")
            .env("CLICOLOR_FORCE", "1")
            .assert()
            .code(1)
            .stdout(predicate::str::contains("\u{1b}[").not())
            .stdout(predicate::str::contains("Usage: clidec-demo"));
    }

    #[test]
    fn namespace_without_sub_command_prints_help_with_status_1() {
        demo()
            .arg("project")
            .assert()
            .code(1)
            .stdout(predicate::str::contains("clidec-demo project"))
            .stdout(predicate::str::contains("init"))
            .stdout(predicate::str::contains("Created").not());
    }

    #[test]
    fn unknown_sub_command_fails_with_choices() {
        demo()
            .args(["projcet", "list"])
            .assert()
            .code(2)
            .stderr(predicate::str::contains("unknown subcommand 'projcet'"))
            .stderr(predicate::str::contains("project"))
            .stdout(predicate::str::is_empty());
    }

    #[test]
    fn malformed_argument_fails_with_status_2() {
        demo()
            .args(["greet", "--times", "often"])
            .assert()
            .code(2)
            .stderr(predicate::str::contains("often"));
        demo()
            .args(["dev", "lint", "--level", "maybe"])
            .assert()
            .code(2);
    }

    #[test]
    fn unknown_root_flag_is_an_unexpected_argument() {
        demo()
            .args(["--bogus", "greet"])
            .assert()
            .code(2)
            .stderr(predicate::str::contains("unexpected argument '--bogus'"))
            .stderr(predicate::str::contains("unknown subcommand").not());
    }

    #[test]
    fn missing_positional_fails() {
        demo().args(["project", "init"]).assert().code(2);
    }
}

#[cfg(unix)]
mod raw_forwarding {
    use super::*;

    #[test]
    fn forwards_tokens_untouched() {
        demo()
            .args(["run", "exec", "echo", "--foo", "bar"])
            .assert()
            .success()
            .stdout("--foo bar\n");
    }

    #[test]
    fn forwarded_failure_is_reported() {
        demo()
            .args(["run", "exec", "sh", "-c", "exit 4"])
            .assert()
            .code(1)
            .stderr(predicate::str::contains("exec"));
    }

    #[test]
    fn nothing_to_forward_is_an_action_error() {
        demo()
            .args(["run", "exec"])
            .assert()
            .code(1)
            .stderr(predicate::str::contains("no program given"));
    }
}
