use toml::{Table, Value};

use super::SettingsError;

/// Merges every `{prefix}{separator}...` variable into `table`.
///
/// `CONSTFORGE__RENDER__INDENT=2` becomes `render.indent = 2`.
pub(super) fn load_env_vars(
    table: &mut Table,
    prefix: &str,
    separator: &str,
) -> Result<(), SettingsError> {
    load_vars(table, prefix, separator, std::env::vars())
}

fn load_vars(
    table: &mut Table,
    prefix: &str,
    separator: &str,
    vars: impl IntoIterator<Item = (String, String)>,
) -> Result<(), SettingsError> {
    if separator.is_empty() {
        return Err(SettingsError::EmptySeparator);
    }
    let prefix_with_sep = format!("{prefix}{separator}");

    for (key, value) in vars {
        let Some(path) = key.strip_prefix(&prefix_with_sep) else {
            continue;
        };
        if path.is_empty() {
            continue;
        }
        let path: Vec<String> = path.split(separator).map(str::to_lowercase).collect();
        insert_at(table, &path, coerce_value(&value));
    }
    Ok(())
}

fn insert_at(table: &mut Table, path: &[String], value: Value) {
    let Some((last, parents)) = path.split_last() else {
        return;
    };
    let mut current = table;
    for segment in parents {
        let entry = current
            .entry(segment.clone())
            .or_insert_with(|| Value::Table(Table::new()));
        if !entry.is_table() {
            *entry = Value::Table(Table::new());
        }
        let Value::Table(next) = entry else {
            return;
        };
        current = next;
    }
    current.insert(last.clone(), value);
}

/// Reads a variable as a TOML value (`4`, `1.5`, `true`, `"text"`), falling back
/// to the raw text when it is not one. `TRUE` and `False` count as booleans.
fn coerce_value(raw: &str) -> Value {
    let trimmed = raw.trim();
    if trimmed.eq_ignore_ascii_case("true") || trimmed.eq_ignore_ascii_case("false") {
        return Value::Boolean(trimmed.eq_ignore_ascii_case("true"));
    }

    let mut parsed = match toml::from_str::<Table>(&format!("value = {trimmed}")) {
        Ok(table) if table.len() == 1 => table,
        _ => return Value::String(raw.to_string()),
    };
    match parsed.remove("value") {
        Some(value @ (Value::Integer(_) | Value::Float(_) | Value::String(_))) => value,
        _ => Value::String(raw.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_nested_paths_and_coercion() {
        let mut table = Table::new();
        load_vars(
            &mut table,
            "CONSTFORGE",
            "__",
            vars(&[
                ("CONSTFORGE__RENDER__INDENT", "2"),
                ("CONSTFORGE__RENDER__HEADER", "FALSE"),
                ("CONSTFORGE__OUTPUT__DIRECTORY", "out/gen"),
                ("OTHER__RENDER__INDENT", "8"),
                ("CONSTFORGE__", "ignored"),
            ]),
        )
        .unwrap();

        let render = table["render"].as_table().unwrap();
        assert_eq!(render["indent"], Value::Integer(2));
        assert_eq!(render["header"], Value::Boolean(false));
        assert_eq!(table["output"]["directory"].as_str(), Some("out/gen"));
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_coerce_value() {
        assert_eq!(coerce_value("-12"), Value::Integer(-12));
        assert_eq!(coerce_value("1.5"), Value::Float(1.5));
        assert_eq!(coerce_value("True"), Value::Boolean(true));
        assert_eq!(coerce_value("latest"), Value::String("latest".into()));
        assert_eq!(coerce_value("\"8\""), Value::String("8".into()));
        assert_eq!(coerce_value("out/gen"), Value::String("out/gen".into()));
        // Only scalars; anything that parses to more stays text.
        assert_eq!(coerce_value("[1, 2]"), Value::String("[1, 2]".into()));
        assert_eq!(coerce_value("1\nother = 2"), Value::String("1\nother = 2".into()));
    }

    #[test]
    fn test_empty_separator() {
        let result = load_vars(&mut Table::new(), "CONSTFORGE", "", vars(&[]));
        assert!(matches!(result, Err(SettingsError::EmptySeparator)));
    }
}
