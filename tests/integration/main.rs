//! Integration tests for uniload

use std::path::Path;

fn write_package(dir: &Path, name: &str, manifest: &str) {
    let pkg_dir = dir.join(name);
    std::fs::create_dir_all(&pkg_dir).unwrap();
    std::fs::write(pkg_dir.join("package.toml"), manifest).unwrap();
}

/// `json` <- `ddp` (with a client slice), plus an unrelated `logging`
fn sample_packages(dir: &Path) {
    write_package(
        dir,
        "json",
        r#"
[package]
name = "json"
version = "1.2.0"
description = "JSON encoding"

[slices.main.exports]
parse = "json.parse"
"#,
    );
    write_package(
        dir,
        "ddp",
        r#"
[package]
name = "ddp"
version = "2.0.0"
description = "Data protocol"

[dependencies]
json = "^1.0"

[slices.main.exports]
protocol = "ddp/1"

[slices.client.exports]
connect = "ws"
"#,
    );
    write_package(
        dir,
        "logging",
        r#"
[package]
name = "logging"
version = "0.3.0"
source = "local"
"#,
    );
}

mod cli_tests {
    use super::sample_packages;
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use tempfile::TempDir;

    /// Command isolated from the user's config and environment
    fn uniload(temp: &TempDir) -> Command {
        let mut cmd = cargo_bin_cmd!("uniload");
        cmd.env_remove("UNILOAD_DIR")
            .env_remove("UNILOAD_RELEASE")
            .env("UNILOAD_CONFIG", temp.path().join("config.toml"));
        cmd
    }

    #[test]
    fn help_displays() {
        let temp = TempDir::new().unwrap();
        uniload(&temp)
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("Load packages"));
    }

    #[test]
    fn version_displays() {
        let temp = TempDir::new().unwrap();
        uniload(&temp)
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("uniload"));
    }

    #[test]
    fn load_prints_exports() {
        let temp = TempDir::new().unwrap();
        let packages = temp.path().join("packages");
        sample_packages(&packages);

        uniload(&temp)
            .args(["load", "ddp.client", "--dir"])
            .arg(&packages)
            .assert()
            .success()
            .stdout(predicate::str::contains("\"connect\": \"ws\""))
            .stdout(predicate::str::contains("protocol").not())
            // Dependencies come back alongside the requested package
            .stdout(predicate::str::contains("\"parse\": \"json.parse\""));
    }

    #[test]
    fn load_plain_format() {
        let temp = TempDir::new().unwrap();
        let packages = temp.path().join("packages");
        sample_packages(&packages);

        uniload(&temp)
            .args(["load", "json", "ddp", "--format", "plain", "--dir"])
            .arg(&packages)
            .assert()
            .success()
            .stdout(predicate::str::contains("ddp: protocol"))
            .stdout(predicate::str::contains("json: parse"));
    }

    #[test]
    fn load_reads_dir_from_env() {
        let temp = TempDir::new().unwrap();
        let packages = temp.path().join("packages");
        sample_packages(&packages);

        uniload(&temp)
            .env("UNILOAD_DIR", &packages)
            .args(["load", "json"])
            .assert()
            .success()
            .stdout(predicate::str::contains("json.parse"));
    }

    #[test]
    fn load_missing_package_reports_every_error() {
        let temp = TempDir::new().unwrap();
        let packages = temp.path().join("packages");
        sample_packages(&packages);

        uniload(&temp)
            .args(["load", "nope", "ddp.server", "--dir"])
            .arg(&packages)
            .assert()
            .failure()
            .stderr(predicate::str::contains("Errors prevented package load"))
            .stderr(predicate::str::contains("While loading packages [nope,ddp.server]"))
            .stderr(predicate::str::contains("resolution error: nope: package not found"))
            .stderr(predicate::str::contains("Hint:"));
    }

    #[test]
    fn load_invalid_identifier_fails() {
        let temp = TempDir::new().unwrap();
        let packages = temp.path().join("packages");
        sample_packages(&packages);

        uniload(&temp)
            .args(["load", "bad name", "--dir"])
            .arg(&packages)
            .assert()
            .failure()
            .stderr(predicate::str::contains("bad name"));
    }

    #[test]
    fn list_table() {
        let temp = TempDir::new().unwrap();
        let packages = temp.path().join("packages");
        sample_packages(&packages);

        uniload(&temp)
            .args(["list", "--dir"])
            .arg(&packages)
            .assert()
            .success()
            .stdout(predicate::str::contains("NAME"))
            .stdout(predicate::str::contains("3 package(s)"));
    }

    #[test]
    fn list_plain_is_sorted() {
        let temp = TempDir::new().unwrap();
        let packages = temp.path().join("packages");
        sample_packages(&packages);

        uniload(&temp)
            .args(["list", "--format", "plain", "--dir"])
            .arg(&packages)
            .assert()
            .success()
            .stdout("ddp\njson\nlogging\n");
    }

    #[test]
    fn list_missing_dir_fails() {
        let temp = TempDir::new().unwrap();

        uniload(&temp)
            .args(["list", "--dir"])
            .arg(temp.path().join("nowhere"))
            .assert()
            .failure()
            .stderr(predicate::str::contains("Package directory not found"));
    }

    #[test]
    fn config_path() {
        let temp = TempDir::new().unwrap();
        uniload(&temp)
            .args(["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("config.toml"));
    }

    #[test]
    fn config_set_then_show() {
        let temp = TempDir::new().unwrap();
        uniload(&temp)
            .args(["config", "set", "loader.release", "2.4"])
            .assert()
            .success();

        uniload(&temp)
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[general]"))
            .stdout(predicate::str::contains("release = \"2.4\""));
    }

    #[test]
    fn config_set_unknown_key_fails() {
        let temp = TempDir::new().unwrap();
        uniload(&temp)
            .args(["config", "set", "vm.name", "x"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Unknown config key"));
    }

    #[test]
    fn completions_generate() {
        let temp = TempDir::new().unwrap();
        uniload(&temp)
            .args(["completions", "bash"])
            .assert()
            .success()
            .stdout(predicate::str::contains("uniload"));
    }
}

mod load_tests {
    use super::{sample_packages, write_package};
    use serde_json::json;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;
    use tempfile::TempDir;
    use uniload::loader::{BootstrapMode, CacheRegistry, FixedRelease};
    use uniload::package::{InitializerRegistry, LocalToolchain, SourceMode};
    use uniload::{LoadOptions, UniloadError, Uniloader};

    #[test]
    fn repeated_load_reuses_result() {
        let temp = TempDir::new().unwrap();
        sample_packages(temp.path());

        let loader = Uniloader::new(
            CacheRegistry::shared(),
            LocalToolchain::new(SourceMode::Release),
            temp.path().to_path_buf(),
            FixedRelease::default(),
        );

        let first = loader.load(&LoadOptions::new(["ddp"])).unwrap();
        let second = loader.load(&LoadOptions::new(["ddp"])).unwrap();
        assert!(first.same_instance(&second));
        assert_eq!(first.get("ddp").unwrap()["protocol"], "ddp/1");

        let other = loader.load(&LoadOptions::new(["json", "ddp"])).unwrap();
        assert!(!other.same_instance(&first));
        assert_eq!(loader.cache().borrow().len(), 2);
    }

    #[test]
    fn release_change_reloads_through_local_toolchain() {
        let temp = TempDir::new().unwrap();
        sample_packages(temp.path());

        let runs = Rc::new(Cell::new(0));
        let mut registry = InitializerRegistry::new();
        let counter = Rc::clone(&runs);
        registry.register("ddp", move |_| {
            counter.set(counter.get() + 1);
            Ok(())
        });

        let release = Rc::new(RefCell::new("1.0".to_string()));
        let current = Rc::clone(&release);
        let loader = Uniloader::new(
            CacheRegistry::shared(),
            LocalToolchain::new(SourceMode::Release).with_initializers(registry),
            temp.path().to_path_buf(),
            move || current.borrow().clone(),
        );
        let request = LoadOptions::new(["ddp"]);

        let first = loader.load(&request).unwrap();
        assert!(loader.load(&request).unwrap().same_instance(&first));
        assert_eq!(runs.get(), 1);

        *release.borrow_mut() = "2.0".to_string();
        let reloaded = loader.load(&request).unwrap();
        assert!(!reloaded.same_instance(&first));
        assert_eq!(runs.get(), 2);
        assert_eq!(reloaded.get("ddp"), first.get("ddp"));

        assert!(loader.load(&request).unwrap().same_instance(&reloaded));
        assert_eq!(runs.get(), 2);
        assert_eq!(loader.cache().borrow().release(), Some("2.0"));
        assert_eq!(loader.cache().borrow().len(), 1);
    }

    #[test]
    fn result_includes_dependencies() {
        let temp = TempDir::new().unwrap();
        sample_packages(temp.path());

        let loader = Uniloader::new(
            CacheRegistry::shared(),
            LocalToolchain::new(SourceMode::Release),
            temp.path().to_path_buf(),
            FixedRelease::default(),
        );

        let result = loader.load(&LoadOptions::new(["ddp.client"])).unwrap();
        assert_eq!(result.package_names().collect::<Vec<_>>(), vec!["ddp", "json"]);
        assert_eq!(result.get("ddp").unwrap()["connect"], "ws");
        assert_eq!(result.get("json").unwrap()["parse"], "json.parse");
    }

    #[test]
    fn dependency_without_main_slice_loads() {
        let temp = TempDir::new().unwrap();
        write_package(
            temp.path(),
            "json",
            "[package]\nname = \"json\"\nversion = \"1.2.0\"\n\n[slices.client.exports]\nparse = \"json.parse\"\n",
        );
        write_package(
            temp.path(),
            "ddp",
            "[package]\nname = \"ddp\"\nversion = \"2.0.0\"\n\n[dependencies]\njson = \"^1\"\n",
        );

        let loader = Uniloader::new(
            CacheRegistry::shared(),
            LocalToolchain::new(SourceMode::Release),
            temp.path().to_path_buf(),
            FixedRelease::default(),
        );

        let result = loader.load(&LoadOptions::new(["ddp"])).unwrap();
        assert_eq!(result.get("json").unwrap(), &json!({}));

        let json_only = loader.load(&LoadOptions::new(["json"])).unwrap();
        assert_eq!(json_only.get("json").unwrap(), &json!({}));

        let client = loader.load(&LoadOptions::new(["json.client"])).unwrap();
        assert_eq!(client.get("json").unwrap()["parse"], "json.parse");
    }

    #[test]
    fn hooks_run_after_execution_then_live() {
        let temp = TempDir::new().unwrap();
        sample_packages(temp.path());

        let events = Rc::new(RefCell::new(Vec::new()));
        let mut registry = InitializerRegistry::new();

        let ev = Rc::clone(&events);
        registry.register("json", move |ctx| {
            ev.borrow_mut().push("init json".to_string());
            let ev = Rc::clone(&ev);
            ctx.on_startup(move || {
                ev.borrow_mut().push("hook json".to_string());
                Ok(())
            })
        });

        let ev = Rc::clone(&events);
        registry.register("ddp", move |ctx| {
            ev.borrow_mut().push("init ddp".to_string());
            let parse = ctx.import("json").map(|ns| ns["parse"].clone());
            ctx.export("json_parse", parse.unwrap_or_default());

            let ev = Rc::clone(&ev);
            let bootstrap = ctx.bootstrap();
            ctx.on_startup(move || {
                ev.borrow_mut().push("hook ddp".to_string());
                // Queued mid-drain, still runs in the same pass
                let ev = Rc::clone(&ev);
                bootstrap.on_startup("ddp", move || {
                    ev.borrow_mut().push("late hook".to_string());
                    Ok(())
                })
            })
        });

        let loader = Uniloader::new(
            CacheRegistry::shared(),
            LocalToolchain::new(SourceMode::Release).with_initializers(registry),
            temp.path().to_path_buf(),
            FixedRelease::default(),
        );

        let result = loader.load(&LoadOptions::new(["ddp"])).unwrap();
        assert_eq!(result.get("ddp").unwrap()["json_parse"], json!("json.parse"));
        assert_eq!(
            *events.borrow(),
            vec!["init json", "init ddp", "hook json", "hook ddp", "late hook"]
        );
    }

    #[test]
    fn failing_hook_is_not_cached() {
        let temp = TempDir::new().unwrap();
        sample_packages(temp.path());

        let mut registry = InitializerRegistry::new();
        registry.register("json", |ctx| {
            assert_eq!(ctx.bootstrap().mode(), BootstrapMode::Buffering);
            ctx.on_startup(|| Err(UniloadError::User("socket refused".into())))
        });

        let loader = Uniloader::new(
            CacheRegistry::shared(),
            LocalToolchain::new(SourceMode::Release).with_initializers(registry),
            temp.path().to_path_buf(),
            FixedRelease::default(),
        );

        let err = loader.load(&LoadOptions::new(["json"])).unwrap_err();
        assert!(matches!(err, UniloadError::StartupHook { ref package, .. } if package == "json"));
        assert!(err.to_string().contains("socket refused"));
        assert!(loader.cache().borrow().is_empty());
    }

    #[test]
    fn checkout_mode_checks_requirements() {
        let temp = TempDir::new().unwrap();
        write_package(
            temp.path(),
            "json",
            "[package]\nname = \"json\"\nversion = \"1.2.0\"\n",
        );
        write_package(
            temp.path(),
            "ddp",
            "[package]\nname = \"ddp\"\nversion = \"2.0.0\"\n\n[dependencies]\njson = \"^2.0\"\n",
        );

        let release = Uniloader::new(
            CacheRegistry::shared(),
            LocalToolchain::new(SourceMode::Release),
            temp.path().to_path_buf(),
            FixedRelease::default(),
        );
        assert!(release.load(&LoadOptions::new(["ddp"])).is_ok());

        let checkout = Uniloader::new(
            CacheRegistry::shared(),
            LocalToolchain::new(SourceMode::Checkout),
            temp.path().to_path_buf(),
            FixedRelease::default(),
        );
        let err = checkout.load(&LoadOptions::new(["ddp"])).unwrap_err();
        assert!(matches!(err, UniloadError::LoadFailed(_)));
        assert!(err.to_string().contains("json"));
    }
}
