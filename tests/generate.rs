use std::fs;
use std::path::{Path, PathBuf};

use constforge::document::FileSource;
use constforge::generate::{NAME, VERSION};
use constforge::{Error, Generator, ResolveError, Settings};
use tempfile::TempDir;

fn demo(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("demos").join(name)
}

fn settings(dir: &TempDir) -> Settings {
    let mut settings = Settings::default();
    settings.output.directory = dir.path().to_path_buf();
    settings
}

#[test]
fn test_demo_generates_every_language() {
    let dir = TempDir::new().unwrap();
    let report = Generator::new(&FileSource)
        .with_settings(settings(&dir))
        .generate(&demo("test-config.yaml"))
        .unwrap();

    assert!(report.is_success(), "{:?}", report.failures);
    let expected: Vec<PathBuf> = [
        "TestConfig.java",
        "test-config.ts",
        "test-config.js",
        "test_config.py",
        "test_config.go",
        "include/test_config.h",
    ]
    .into_iter()
    .map(|name| dir.path().join(name))
    .collect();
    assert_eq!(report.written, expected);
    for path in &expected {
        assert!(path.is_file(), "{} was not written", path.display());
    }

    let python = fs::read_to_string(dir.path().join("test_config.py")).unwrap();
    assert_eq!(
        python,
        format!(
            "# Generated with {NAME} v{VERSION}\n\
             from enum import Enum\n\
             \n\
             \n\
             class TestConfig(Enum):\n\
             \x20   MY_INCLUDED_INTEGER = 8  # Defined in the included document.\n\
             \x20   MY_DOUBLE = 233.9\n\
             \x20   MY_BOOLEAN = True\n\
             \x20   MY_INTEGER = 142\n\
             \x20   MY_FLOAT = 322.0\n\
             \x20   MY_REGEX = r'Test Reg(E|e)x'  # Just another RegEx.\n\
             \x20   MY_SUBSTITUTED_STRING = 'Sometimes I just want to scream Hello World!'\n\
             \x20   MY_COMBINED_INTEGER = 150\n"
        )
    );
}

#[test]
fn test_generation_is_deterministic() {
    let first = TempDir::new().unwrap();
    let second = TempDir::new().unwrap();
    for dir in [&first, &second] {
        Generator::new(&FileSource)
            .with_settings(settings(dir))
            .generate(&demo("test-config.yaml"))
            .unwrap();
    }

    for name in ["TestConfig.java", "test-config.ts", "test_config.go", "include/test_config.h"] {
        assert_eq!(
            fs::read(first.path().join(name)).unwrap(),
            fs::read(second.path().join(name)).unwrap(),
            "{name}"
        );
    }
}

#[test]
fn test_missing_include_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let root = dir.path().join("root.yaml");
    fs::write(
        &root,
        "includes:\n  - path: absent.yaml\nlanguages:\n  - language: python\n",
    )
    .unwrap();
    let out = dir.path().join("out");
    let mut settings = Settings::default();
    settings.output.directory = out.clone();

    let result = Generator::new(&FileSource)
        .with_settings(settings)
        .generate(&root);

    let Err(Error::Resolution(diagnostics)) = result else {
        panic!("expected resolution errors");
    };
    assert!(matches!(
        diagnostics.iter().next(),
        Some(ResolveError::IncludeNotFound { target }) if target.ends_with("absent.yaml")
    ));
    assert!(!out.exists());
}
