pub const VERSION_MARKER_RELATIVE_PATH: &str = "pimcore/lib/Pimcore/Version.php";

const VERSION_PROPERTY: &str = "$version";

/// Extracts the installed version from the contents of `Version.php`.
///
/// Looks for the first assignment to `$version` whose right-hand side is a quoted string
/// literal, e.g. `public static $version = "4.0.1";`. Anything else yields `None`.
pub fn parse_version_marker(raw: &str) -> Option<String> {
    for line in raw.lines() {
        let Some(property_at) = line.find(VERSION_PROPERTY) else {
            continue;
        };
        let after_property = &line[property_at + VERSION_PROPERTY.len()..];
        // `$versionSuffix` and friends are different properties.
        if after_property
            .chars()
            .next()
            .is_some_and(|ch| ch.is_ascii_alphanumeric() || ch == '_')
        {
            continue;
        }

        let Some(value) = after_property.trim_start().strip_prefix('=') else {
            continue;
        };
        if let Some(version) = quoted_literal(value.trim_start()) {
            return Some(version);
        }
    }

    None
}

fn quoted_literal(input: &str) -> Option<String> {
    let mut chars = input.chars();
    let quote = chars.next().filter(|ch| *ch == '"' || *ch == '\'')?;
    let rest = chars.as_str();
    let end = rest.find(quote)?;
    let value = rest[..end].trim();
    if value.is_empty() {
        return None;
    }
    Some(value.to_string())
}
