use anyhow::{Context, Result};
use pretty_assertions::assert_eq;
use serde_json::Value;

use crate::{CliTest, stderr, stdout};

/// Validates config file structure and default values.
fn assert_config_content(content: &str) -> Result<()> {
    let parsed: Value = serde_json::from_str(content).context("Config should be valid JSON")?;

    for field in ["includes", "ignores", "langPath", "sourceLanguage", "languages"] {
        assert!(
            parsed.get(field).is_some(),
            "Config should have '{}' field",
            field
        );
    }
    assert_eq!(parsed["sourceLanguage"], "en");
    assert_eq!(parsed["maxPayloadChars"], 10000);
    assert!(parsed["openai"].get("apiKey").is_none());

    assert!(
        content.contains("\n  \""),
        "Config should use 2-space indentation"
    );

    Ok(())
}

#[test]
fn test_init_creates_config() -> Result<()> {
    let test = CliTest::new()?;

    let output = test.command().arg("init").output()?;

    assert!(output.status.success());
    assert_eq!(stdout(&output), "✓ Created .textsyncrc.json\n");
    assert!(test.root().join(".textsyncrc.json").exists());

    let content = test.read_file(".textsyncrc.json")?;
    assert_config_content(&content)?;

    Ok(())
}

#[test]
fn test_init_fails_if_exists() -> Result<()> {
    let test = CliTest::with_file(".textsyncrc.json", "{}")?;

    let output = test.command().arg("init").output()?;

    assert_eq!(output.status.code(), Some(1));
    assert_eq!(stderr(&output), "Error: .textsyncrc.json already exists\n");
    assert_eq!(test.read_file(".textsyncrc.json")?, "{}");

    Ok(())
}

#[test]
fn test_init_config_is_immediately_usable() -> Result<()> {
    let test = CliTest::new()?;

    test.command().arg("init").output()?;
    test.write_file(
        "resources/views/home.blade.php",
        "<h1>@text('home.title', 'Home')</h1>",
    )?;

    let output = test.scan_command().arg("--write").output()?;
    assert!(
        output.status.success(),
        "Scan should work with initialized config. stderr: {}",
        stderr(&output)
    );
    assert_eq!(test.read_json("lang/es.json")?["home.title"], "Home");

    Ok(())
}
