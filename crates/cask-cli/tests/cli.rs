use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// Test context with a scratch directory for manifests and downloads
struct TestContext {
    temp_dir: TempDir,
}

impl TestContext {
    fn new() -> Self {
        let temp_dir = TempDir::new().expect("failed to create temp dir");
        Self { temp_dir }
    }

    fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    fn write(&self, rel: &str, content: &str) -> PathBuf {
        let path = self.path().join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("failed to create dir");
        }
        std::fs::write(&path, content).expect("failed to write file");
        path
    }

    fn cask_cmd(&self) -> Command {
        let bin_path = env!("CARGO_BIN_EXE_cask");
        let mut cmd = Command::new(bin_path);
        cmd.current_dir(self.path());
        cmd.env("HOME", self.path());
        cmd.env("NO_COLOR", "1");
        cmd.env_remove("CASK_APPDIR");
        cmd.env_remove("RUST_LOG");
        cmd
    }

    fn run(&self, args: &[&str]) -> Output {
        self.cask_cmd()
            .args(args)
            .output()
            .expect("failed to run cask")
    }
}

fn corpus() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../Casks")
}

fn shipped(name: &str) -> String {
    corpus().join(name).display().to_string()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

const ARM_ONLY: &str = r#"cask "postgres" do
  version "2.8.2-17"

  on_arm do
    sha256 :no_check
    url "https://github.com/PostgresApp/PostgresApp/releases/download/v#{version}/Postgres-#{version}.dmg"
  end

  app "Postgres.app"
end
"#;

#[test]
fn test_help_command() {
    let ctx = TestContext::new();
    let output = ctx.run(&["--help"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("Usage:"));
}

#[test]
fn test_check_shipped_manifest() {
    let ctx = TestContext::new();
    let output = ctx.run(&["check", &shipped("muffon.rb")]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(stdout(&output).contains("muffon 2.2.0 is valid"));
}

#[test]
fn test_check_reports_malformed_manifest() {
    let ctx = TestContext::new();
    let path = ctx.write("broken.rb", "cask \"broken\" do\n  app \"Broken.app\"\nend\n");
    let output = ctx.run(&["check", &path.display().to_string()]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("Malformed manifest"));
}

#[test]
fn test_validate_shipped_corpus() {
    let ctx = TestContext::new();
    let output = ctx.run(&["validate", &corpus().display().to_string(), "--json"]);
    assert!(output.status.success(), "{}", stderr(&output));

    let report: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(report["files"], 3);
    assert_eq!(report["problems"].as_array().unwrap().len(), 0);
    assert_eq!(report["valid"].as_array().unwrap().len(), 3);
}

#[test]
fn test_validate_defaults_to_casks_dir() {
    let ctx = TestContext::new();
    let muffon = std::fs::read_to_string(shipped("muffon.rb")).unwrap();
    ctx.write("Casks/muffon.rb", &muffon);
    let output = ctx.run(&["validate"]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(stdout(&output).contains("1 manifest valid"));
}

#[test]
fn test_validate_duplicate_fails() {
    let ctx = TestContext::new();
    let postgres = std::fs::read_to_string(shipped("postgres.rb")).unwrap();
    ctx.write("Casks/postgres.rb", &postgres);
    ctx.write("Casks/p/postgres.rb", ARM_ONLY);

    let output = ctx.run(&["validate", "Casks", "--json"]);
    assert!(!output.status.success());

    let report: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    let problems = report["problems"].as_array().unwrap();
    assert_eq!(problems.len(), 1);
    assert_eq!(problems[0]["kind"], "duplicate_manifest");
    let message = problems[0]["message"].as_str().unwrap();
    assert!(message.contains("Casks/postgres.rb"));
    assert!(message.contains("Casks/p/postgres.rb"));
    assert_eq!(report["valid"].as_array().unwrap().len(), 0);
}

#[test]
fn test_resolve_muffon_arm64() {
    let ctx = TestContext::new();
    let output = ctx.run(&["resolve", &shipped("muffon.rb"), "--arch", "arm64", "--json"]);
    assert!(output.status.success(), "{}", stderr(&output));

    let resolved: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(
        resolved["source"]["url"],
        "https://github.com/staniel359/muffon/releases/download/v2.2.0/Muffon-2.2.0-arm64.dmg"
    );
    assert_eq!(
        resolved["source"]["checksum"],
        "07e19ac200a52be219ced7e0fc7ecf2ab89aa5afef95708433b48e0286aa690f"
    );
}

#[test]
fn test_resolve_without_matching_source() {
    let ctx = TestContext::new();
    let path = ctx.write("postgres.rb", ARM_ONLY);
    let output = ctx.run(&["resolve", &path.display().to_string(), "--arch", "x86_64"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("No matching source"));
}

#[test]
fn test_plan_install_json() {
    let ctx = TestContext::new();
    let output = ctx.run(&[
        "plan",
        &shipped("muffon.rb"),
        "install",
        "--arch",
        "x86_64",
        "--appdir",
        "/tmp/Apps",
        "--json",
    ]);
    assert!(output.status.success(), "{}", stderr(&output));

    let plan: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    let actions = plan["actions"].as_array().unwrap();
    assert_eq!(actions.len(), 4);
    assert_eq!(actions[0]["action"], "fetch");
    assert_eq!(
        actions[0]["url"],
        "https://github.com/staniel359/muffon/releases/download/v2.2.0/Muffon-2.2.0-x64.dmg"
    );
    assert_eq!(actions[1]["action"], "verify_checksum");
    assert_eq!(actions[3]["destination"], "/tmp/Apps/muffon.app");
    assert_eq!(plan["verification"]["status"], "verified");
}

#[test]
fn test_plan_zap_expands_home() {
    let ctx = TestContext::new();
    let output = ctx.run(&[
        "plan",
        &shipped("letta.rb"),
        "zap",
        "--arch",
        "arm64",
        "--expand-home",
    ]);
    assert!(output.status.success(), "{}", stderr(&output));
    let text = stdout(&output);
    assert!(text.contains("quit com.letta.desktop"));
    assert!(text.contains("remove /Applications/Letta Desktop.app"));
    let expected = ctx.path().join("Library/Caches/com.letta.desktop");
    assert!(text.contains(&format!("trash {}", expected.display())));
}

#[test]
fn test_plan_no_check_warns() {
    let ctx = TestContext::new();
    let path = ctx.write("postgres.rb", ARM_ONLY);
    let output = ctx.run(&["plan", &path.display().to_string(), "install", "--arch", "arm64"]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(!stdout(&output).contains("verify sha256"));
    assert!(stderr(&output).contains("will not be verified"));
}

#[test]
fn test_hash_and_verify() {
    let ctx = TestContext::new();
    let download = ctx.write("Muffon.dmg", "hello world");
    let output = ctx.run(&["hash", &download.display().to_string()]);
    assert!(output.status.success());
    let digest = "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9";
    assert!(stdout(&output).starts_with(digest));

    let muffon = std::fs::read_to_string(shipped("muffon.rb")).unwrap().replace(
        "07e19ac200a52be219ced7e0fc7ecf2ab89aa5afef95708433b48e0286aa690f",
        digest,
    );
    let manifest = ctx.write("muffon.rb", &muffon);
    let manifest = manifest.display().to_string();
    let download = download.display().to_string();

    let ok = ctx.run(&["verify", &manifest, &download, "--arch", "arm64"]);
    assert!(ok.status.success(), "{}", stderr(&ok));
    assert!(stdout(&ok).contains("matches"));

    let bad = ctx.run(&["verify", &manifest, &download, "--arch", "x86_64"]);
    assert!(!bad.status.success());
    assert!(stderr(&bad).contains("Checksum mismatch"));
}

#[test]
fn test_livecheck_extract_reports_newer_version() {
    let ctx = TestContext::new();
    let output = ctx.run(&[
        "livecheck-extract",
        &shipped("muffon.rb"),
        "--url",
        "https://github.com/staniel359/muffon/releases/tag/v2.3.0",
    ]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(stdout(&output).contains("muffon 2.2.0 -> 2.3.0"));
}

#[test]
fn test_bump_write() {
    let ctx = TestContext::new();
    let letta = std::fs::read_to_string(shipped("letta.rb")).unwrap();
    let path = ctx.write("letta.rb", &letta);
    let output = ctx.run(&["bump", &path.display().to_string(), "0.8.0", "--write"]);
    assert!(output.status.success(), "{}", stderr(&output));

    let bumped = std::fs::read_to_string(&path).unwrap();
    assert!(bumped.contains("  version \"0.8.0\"\n"));
    assert_eq!(bumped.replace("0.8.0", "0.7.0"), letta);
}

#[test]
fn test_plan_appdir_from_env() {
    let ctx = TestContext::new();
    let output = ctx
        .cask_cmd()
        .env("CASK_APPDIR", "/opt/Apps")
        .args(["plan", &shipped("letta.rb"), "install", "--arch", "arm64", "--json"])
        .output()
        .expect("failed to run cask");
    assert!(output.status.success(), "{}", stderr(&output));

    let plan: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    let actions = plan["actions"].as_array().unwrap();
    let copy = actions.last().unwrap();
    assert_eq!(copy["destination"], "/opt/Apps/Letta Desktop.app");
}

#[test]
fn test_livecheck_extract_older_tag_is_up_to_date() {
    let ctx = TestContext::new();
    let output = ctx.run(&[
        "livecheck-extract",
        &shipped("postgres.rb"),
        "--url",
        "https://github.com/k13-za/postgres/releases/tag/v2.8.2",
    ]);
    assert!(output.status.success(), "{}", stderr(&output));
    let text = stdout(&output);
    assert!(text.contains("is up to date"), "{text}");
    assert!(!text.contains("->"));
}

#[test]
fn test_debug_logging_names_command() {
    let ctx = TestContext::new();
    let output = ctx
        .cask_cmd()
        .env("RUST_LOG", "debug")
        .args(["check", &shipped("muffon.rb")])
        .output()
        .expect("failed to run cask");
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(stderr(&output).contains("running command"));
}

#[test]
fn test_bump_refuses_quote_in_version() {
    let ctx = TestContext::new();
    let letta = std::fs::read_to_string(shipped("letta.rb")).unwrap();
    let path = ctx.write("letta.rb", &letta);
    let output = ctx.run(&["bump", &path.display().to_string(), "1\" x", "--write"]);
    assert!(!output.status.success());
    assert_eq!(std::fs::read_to_string(&path).unwrap(), letta);
}

#[test]
fn test_check_rejects_app_path() {
    let ctx = TestContext::new();
    let letta = std::fs::read_to_string(shipped("letta.rb")).unwrap();
    let escaped = letta.replace("\"Letta Desktop.app\"", "\"../../Users/me\"");
    assert_ne!(escaped, letta);
    let path = ctx.write("letta.rb", &escaped);
    let output = ctx.run(&["check", &path.display().to_string()]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("bundle name"));
}
