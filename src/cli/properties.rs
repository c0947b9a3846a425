use crate::Schema;

/// One `name: Type` line per tracked property, optionally only those whose
/// name contains `text`.
pub fn list_properties(schema: &Schema, text: Option<&str>) -> String {
    let columns: Vec<_> = match text {
        Some(text) => schema.matching(text).collect(),
        None => schema.columns().collect(),
    };

    if columns.is_empty() {
        return match text {
            Some(text) => format!("No properties match '{}'\n", text),
            None => "No properties\n".to_string(),
        };
    }

    let width = columns
        .iter()
        .map(|column| column.qualified_name.chars().count())
        .max()
        .unwrap_or(0);

    columns
        .iter()
        .map(|column| {
            format!(
                "{:<width$}  {}\n",
                column.qualified_name,
                column.declared_type,
                width = width
            )
        })
        .collect()
}
