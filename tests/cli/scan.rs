use anyhow::Result;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

use crate::{CliTest, mock_server, stderr, stdout};

const WELCOME_VIEW: &str = r#"
<h1>{{ Text::get('pages.home.title', 'Welcome home') }}</h1>
<p>@text('pages.home.intro', "It's nice to \"see\" you")</p>
<a>{{ text('nav.sign_up') }}</a>
<span>{{ $user->text('not.a.key', 'Ignored') }}</span>
"#;

fn setup_project(test: &CliTest) -> Result<()> {
    test.write_file(
        ".textsyncrc.json",
        r#"{
            "includes": ["resources", "app"],
            "langPath": "./lang",
            "sourceLanguage": "en",
            "languages": ["en", "es"]
        }"#,
    )?;
    test.write_file("resources/views/welcome.blade.php", WELCOME_VIEW)
}

#[test]
fn test_scan_without_write_previews_only() -> Result<()> {
    let test = CliTest::new()?;
    setup_project(&test)?;

    let output = test.scan_command().output()?;

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(
        stdout(&output),
        "\
Scanning project for translation keys...
Found 3 unique keys.
Run with --write to save changes for en.
Run with --write to save changes for es.
All translations processed.
"
    );
    assert!(!test.root().join("lang").exists());
    Ok(())
}

#[test]
fn test_scan_write_without_translator_copies_source_texts() -> Result<()> {
    let test = CliTest::new()?;
    setup_project(&test)?;

    let output = test.scan_command().arg("--write").output()?;
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let expected = json!({
        "pages.home.title": "Welcome home",
        "pages.home.intro": "It's nice to \"see\" you",
        "nav.sign_up": "Sign Up"
    });
    assert_eq!(test.read_json("lang/en.json")?, expected);
    assert_eq!(test.read_json("lang/es.json")?, expected);

    let content = test.read_file("lang/en.json")?;
    assert!(content.starts_with("{\n  \"pages.home.title\""));
    assert!(content.ends_with("}\n"));
    Ok(())
}

#[test]
fn test_second_scan_is_up_to_date() -> Result<()> {
    let test = CliTest::new()?;
    setup_project(&test)?;

    test.scan_command().arg("--write").output()?;
    let output = test.scan_command().arg("--write").output()?;

    assert!(output.status.success());
    assert!(stdout(&output).ends_with("Found 3 unique keys.\nNo new keys to translate.\n"));
    Ok(())
}

#[test]
fn test_dry_run_lists_missing_keys() -> Result<()> {
    let test = CliTest::new()?;
    setup_project(&test)?;
    test.write_file("lang/en.json", r#"{"pages.home.title": "Welcome home"}"#)?;
    test.write_file("lang/es.json", r#"{"pages.home.title": "Bienvenido"}"#)?;

    let output = test
        .scan_command()
        .args(["--dry", "--write", "--translator", "openai"])
        .output()?;

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let out = stdout(&output);
    assert!(out.contains("Dry run: these keys would be added:\n"));
    assert!(out.contains("- pages.home.intro: It's nice to \"see\" you\n"));
    assert!(out.contains("- nav.sign_up:      Sign Up\n"));
    assert!(!out.contains("- pages.home.title"));

    assert_eq!(
        test.read_file("lang/es.json")?,
        r#"{"pages.home.title": "Bienvenido"}"#
    );
    Ok(())
}

#[test]
fn test_lang_option_limits_targets() -> Result<()> {
    let test = CliTest::new()?;
    setup_project(&test)?;

    let output = test
        .scan_command()
        .args(["--write", "--lang", "fr"])
        .output()?;

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(test.root().join("lang/en.json").exists());
    assert!(test.root().join("lang/fr.json").exists());
    assert!(!test.root().join("lang/es.json").exists());
    Ok(())
}

#[test]
fn test_diff_prints_added_values() -> Result<()> {
    let test = CliTest::new()?;
    setup_project(&test)?;
    test.write_file(
        "lang/en.json",
        r#"{"pages.home.title": "Welcome home", "pages.home.intro": "It's nice to \"see\" you"}"#,
    )?;

    let output = test
        .scan_command()
        .args(["--diff", "--lang", "en"])
        .output()?;

    assert!(output.status.success());
    assert!(stdout(&output).contains("Diff for en:\n+ \"nav.sign_up\": \"Sign Up\"\n"));
    Ok(())
}

#[test]
fn test_resync_picks_up_changed_source_text() -> Result<()> {
    let test = CliTest::new()?;
    setup_project(&test)?;
    test.scan_command().arg("--write").output()?;

    test.write_file(
        "resources/views/welcome.blade.php",
        &WELCOME_VIEW.replace("Welcome home", "Welcome back"),
    )?;

    let plain = test.scan_command().arg("--write").output()?;
    assert!(stdout(&plain).contains("No new keys to translate."));
    assert_eq!(test.read_json("lang/en.json")?["pages.home.title"], "Welcome home");

    let output = test.scan_command().args(["--write", "--resync"]).output()?;
    assert!(output.status.success());
    assert_eq!(test.read_json("lang/en.json")?["pages.home.title"], "Welcome back");
    assert_eq!(test.read_json("lang/es.json")?["pages.home.title"], "Welcome back");
    Ok(())
}

#[test]
fn test_malformed_language_file_is_skipped() -> Result<()> {
    let test = CliTest::new()?;
    setup_project(&test)?;
    test.write_file("lang/es.json", "[1, 2, 3]")?;

    let output = test.scan_command().arg("--write").output()?;

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("warning: Skipping language 'es'"));
    assert_eq!(test.read_file("lang/es.json")?, "[1, 2, 3]");
    assert_eq!(test.read_json("lang/en.json")?["nav.sign_up"], "Sign Up");
    Ok(())
}

#[test]
fn test_unknown_translator_is_an_error() -> Result<()> {
    let test = CliTest::new()?;
    setup_project(&test)?;

    let output = test
        .scan_command()
        .args(["--write", "--translator", "babelfish"])
        .output()?;

    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("Unknown translator 'babelfish'"));
    assert!(!test.root().join("lang").exists());
    Ok(())
}

#[test]
fn test_unknown_translator_fails_when_up_to_date() -> Result<()> {
    let test = CliTest::new()?;
    setup_project(&test)?;

    let first = test.scan_command().arg("--write").output()?;
    assert!(first.status.success(), "stderr: {}", stderr(&first));

    let output = test
        .scan_command()
        .args(["--write", "--translator", "babelfish"])
        .output()?;

    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("Unknown translator 'babelfish'"));
    assert!(!stdout(&output).contains("No new keys to translate."));
    Ok(())
}

#[test]
fn test_translator_without_api_key_is_an_error() -> Result<()> {
    let test = CliTest::new()?;
    setup_project(&test)?;

    let output = test
        .scan_command()
        .args(["--write", "--translator", "openai"])
        .output()?;

    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("API key"));
    Ok(())
}

#[test]
fn test_no_source_files_is_an_error() -> Result<()> {
    let test = CliTest::with_file("README.md", "# nothing to see")?;

    let output = test.scan_command().output()?;

    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("No source files found"));
    Ok(())
}

#[test]
fn test_files_without_calls_find_nothing() -> Result<()> {
    let test = CliTest::with_file("app/Models/User.php", "<?php\nclass User {}\n")?;

    let output = test.scan_command().arg("--write").output()?;

    assert!(output.status.success());
    assert!(stdout(&output).contains("No translation keys found."));
    assert!(!test.root().join("lang").exists());
    Ok(())
}

#[test]
fn test_default_ignores_skip_vendor() -> Result<()> {
    let test = CliTest::with_file(
        "vendor/acme/views/panel.blade.php",
        "@text('vendor.key', 'From vendor')",
    )?;
    test.write_file("app/Http/home.php", "text('app.key', 'From app');")?;

    let output = test.scan_command().arg("--write").output()?;

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let en = test.read_json("lang/en.json")?;
    assert_eq!(en, json!({ "app.key": "From app" }));
    Ok(())
}

#[test]
fn test_openai_translator_end_to_end() -> Result<()> {
    let test = CliTest::new()?;
    setup_project(&test)?;

    let content = json!({
        "pages.home.title": { "es": "Bienvenido a casa" },
        "pages": { "home": { "intro": { "es": "Me alegra \"verte\"" } } }
    })
    .to_string();
    let reply = json!({ "choices": [{ "message": { "content": content } }] }).to_string();
    let (url, server) = mock_server(vec![(200, reply)])?;

    test.write_file(
        ".textsyncrc.json",
        &json!({
            "includes": ["resources"],
            "languages": ["en", "es"],
            "translators": [{ "name": "gpt", "kind": "openai" }],
            "openai": { "baseUrl": url, "timeoutSecs": 5 }
        })
        .to_string(),
    )?;

    let output = test
        .scan_command()
        .args(["--write", "--openai-api-key", "sk-test"])
        .output()?;
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let bodies = server.join().unwrap();
    assert_eq!(bodies.len(), 1);
    let request: Value = serde_json::from_str(&bodies[0])?;
    let sent: Value = serde_json::from_str(request["messages"][1]["content"].as_str().unwrap())?;
    assert_eq!(
        sent,
        json!({
            "pages.home.title": "Welcome home",
            "pages.home.intro": "It's nice to \"see\" you",
            "nav.sign_up": "Sign Up"
        })
    );

    assert_eq!(
        test.read_json("lang/es.json")?,
        json!({
            "pages.home.title": "Bienvenido a casa",
            "pages.home.intro": "Me alegra \"verte\"",
            "nav.sign_up": "nav.sign_up"
        })
    );
    assert_eq!(test.read_json("lang/en.json")?["nav.sign_up"], "Sign Up");
    Ok(())
}
