use prettytable::{format::FormatBuilder, row, Cell, Row, Table};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Plain table.
    #[default]
    Table,
    /// Pretty-printed JSON.
    Json,
}

/// Options for rendering a list.
#[derive(Debug, Clone, Default)]
pub struct DisplayOptions {
    /// Columns as `(path, title)`; a path may be dotted into nested objects.
    projection: Vec<(String, String)>,
    /// Printed instead of an empty table.
    empty_message: Option<String>,
}

impl DisplayOptions {
    /// Create options with a table projection.
    pub fn table_projection(
        projection: impl IntoIterator<Item = (impl ToString, impl ToString)>,
    ) -> Self {
        Self {
            projection: projection
                .into_iter()
                .map(|(path, title)| (path.to_string(), title.to_string()))
                .collect(),
            empty_message: None,
        }
    }

    /// Set the message shown for an empty table.
    pub fn set_empty_message(mut self, message: impl ToString) -> Self {
        self.empty_message = Some(message.to_string());
        self
    }
}

impl OutputFormat {
    /// Render a list of items.
    pub fn display_many(
        &self,
        items: impl IntoIterator<Item = impl Serialize>,
        options: DisplayOptions,
    ) -> eyre::Result<String> {
        let items = items
            .into_iter()
            .map(serde_json::to_value)
            .collect::<serde_json::Result<Vec<_>>>()?;
        match self {
            Self::Json => Ok(serde_json::to_string_pretty(&items)?),
            Self::Table => {
                if items.is_empty() {
                    if let Some(message) = options.empty_message {
                        return Ok(message);
                    }
                }
                Ok(Self::table(&items, &options.projection))
            }
        }
    }

    /// Render a single labelled value.
    pub fn display_value_with_label(
        &self,
        label: &str,
        value: impl Serialize,
    ) -> eyre::Result<String> {
        let value = serde_json::to_value(value)?;
        match self {
            Self::Json => {
                let mut map = Map::new();
                map.insert(label.to_string(), value);
                Ok(serde_json::to_string_pretty(&map)?)
            }
            Self::Table => {
                let mut table = Table::new();
                table.set_format(FormatBuilder::new().padding(0, 2).build());
                table.add_row(row![label, format_cell(&value)]);
                Ok(table.to_string())
            }
        }
    }

    fn table(items: &[Value], projection: &[(String, String)]) -> String {
        let columns = if projection.is_empty() {
            items
                .first()
                .and_then(Value::as_object)
                .map(|object| {
                    object
                        .keys()
                        .map(|key| (key.clone(), key.clone()))
                        .collect::<Vec<_>>()
                })
                .unwrap_or_default()
        } else {
            projection.to_vec()
        };

        let mut table = Table::new();
        table.set_format(FormatBuilder::new().padding(0, 2).build());
        table.set_titles(Row::new(
            columns.iter().map(|(_, title)| Cell::new(title)).collect(),
        ));
        for item in items {
            table.add_row(Row::new(
                columns
                    .iter()
                    .map(|(path, _)| Cell::new(&format_cell(lookup(item, path))))
                    .collect(),
            ));
        }
        table.to_string()
    }
}

fn lookup<'a>(value: &'a Value, path: &str) -> &'a Value {
    path.split('.')
        .try_fold(value, |value, key| value.get(key))
        .unwrap_or(&Value::Null)
}

fn format_cell(value: &Value) -> String {
    match value {
        Value::Null => "-".to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
