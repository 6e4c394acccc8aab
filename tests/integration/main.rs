//! Integration tests for Strata

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;

    fn strata() -> Command {
        cargo_bin_cmd!("strata")
    }

    #[test]
    fn help_displays() {
        strata()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("layered container image"));
    }

    #[test]
    fn version_displays() {
        strata()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("strata"));
    }

    #[test]
    fn missing_package_ref_exits_one_with_usage() {
        strata()
            .assert()
            .failure()
            .code(1)
            .stderr(predicate::str::contains("Usage"));
    }

    #[test]
    fn unknown_flag_exits_one() {
        strata()
            .args(["acme/foo", "--frobnicate"])
            .assert()
            .failure()
            .code(1);
    }

    #[test]
    fn missing_builder_reports_error() {
        let temp = tempfile::TempDir::new().unwrap();
        let config_path = temp.path().join("config.toml");
        std::fs::write(
            &config_path,
            "[tools]\ndocker_bin = \"strata-test-no-such-docker\"\n",
        )
        .unwrap();

        strata()
            .args(["acme/foo"])
            .env("STRATA_CONFIG", &config_path)
            .assert()
            .failure()
            .code(1)
            .stderr(predicate::str::contains("Error:"));
    }

    #[test]
    fn invalid_config_reported_before_side_effects() {
        let temp = tempfile::TempDir::new().unwrap();
        let config_path = temp.path().join("config.toml");
        std::fs::write(&config_path, "tools = \"not a table\"").unwrap();

        strata()
            .args(["acme/foo"])
            .env("STRATA_CONFIG", &config_path)
            .assert()
            .failure()
            .code(1)
            .stderr(predicate::str::contains("Invalid configuration"));
    }
}
