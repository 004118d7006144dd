use std::sync::LazyLock;

use anyhow::bail;
use regex::Regex;

/// `{{ env.NAME }}` with an optional `| default("value")`
static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\{\{\s*env\.([A-Za-z_][A-Za-z0-9_]*)\s*(?:\|\s*default\("([^"]*)"\)\s*)?\}\}"#)
        .expect("placeholder pattern is valid")
});

/// Substitute environment placeholders in raw config text
///
/// Runs before TOML parsing, so a placeholder may stand in for a string,
/// a number or a whole value. Comment lines are copied as they are and any
/// other `{{ ... }}` form is an error.
pub(crate) fn expand_env(input: &str) -> anyhow::Result<String> {
    let mut output = String::with_capacity(input.len());

    for line in input.split_inclusive('\n') {
        if line.trim_start().starts_with('#') {
            output.push_str(line);
        } else {
            expand_line(line, &mut output)?;
        }
    }

    Ok(output)
}

fn expand_line(line: &str, output: &mut String) -> anyhow::Result<()> {
    let mut copied = 0;

    for captures in PLACEHOLDER.captures_iter(line) {
        let (Some(whole), Some(name)) = (captures.get(0), captures.get(1)) else {
            continue;
        };

        output.push_str(literal(&line[copied..whole.start()])?);
        output.push_str(&lookup(name.as_str(), captures.get(2).map(|m| m.as_str()))?);
        copied = whole.end();
    }

    output.push_str(literal(&line[copied..])?);

    Ok(())
}

fn literal(text: &str) -> anyhow::Result<&str> {
    if let Some(start) = text.find("{{") {
        let snippet = text[start..].lines().next().unwrap_or_default();
        bail!("unsupported placeholder `{snippet}`, expected `{{{{ env.NAME }}}}`");
    }

    Ok(text)
}

fn lookup(name: &str, fallback: Option<&str>) -> anyhow::Result<String> {
    match (std::env::var(name), fallback) {
        (Ok(value), _) => Ok(value),
        (Err(_), Some(fallback)) => Ok(fallback.to_owned()),
        (Err(_), None) => bail!("environment variable `{name}` is not set"),
    }
}
