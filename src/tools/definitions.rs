//! Static tool catalog returned by `tools/list`.

use serde::ser::{Serialize, SerializeStruct, Serializer};
use serde_json::{Map, Value as JsonValue, json};
use std::fmt;
use std::str::FromStr;

/// The tools this server exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolName {
    ListSchemas,
    ListTables,
    GetTableStructure,
    QueryTable,
    ExecuteQuery,
}

impl ToolName {
    pub const ALL: [ToolName; 5] = [
        ToolName::ListSchemas,
        ToolName::ListTables,
        ToolName::GetTableStructure,
        ToolName::QueryTable,
        ToolName::ExecuteQuery,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ListSchemas => "list_schemas",
            Self::ListTables => "list_tables",
            Self::GetTableStructure => "get_table_structure",
            Self::QueryTable => "query_table",
            Self::ExecuteQuery => "execute_query",
        }
    }
}

impl FromStr for ToolName {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|tool| tool.as_str() == s)
            .ok_or(())
    }
}

impl fmt::Display for ToolName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One input parameter of a tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterSpec {
    pub name: &'static str,
    pub kind: &'static str,
    pub description: &'static str,
    pub required: bool,
}

impl ParameterSpec {
    fn string(name: &'static str, description: &'static str) -> Self {
        Self {
            name,
            kind: "string",
            description,
            required: true,
        }
    }

    fn integer(name: &'static str, description: &'static str) -> Self {
        Self {
            name,
            kind: "integer",
            description,
            required: false,
        }
    }
}

/// A tool as advertised to clients.
///
/// Serializes to `{name, description, inputSchema}` where `inputSchema` is
/// a JSON Schema object built from `parameters`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolDefinition {
    pub name: ToolName,
    pub description: &'static str,
    pub parameters: Vec<ParameterSpec>,
}

impl ToolDefinition {
    pub fn input_schema(&self) -> JsonValue {
        let properties: Map<String, JsonValue> = self
            .parameters
            .iter()
            .map(|p| {
                (
                    p.name.to_string(),
                    json!({ "type": p.kind, "description": p.description }),
                )
            })
            .collect();
        let required: Vec<&str> = self
            .parameters
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name)
            .collect();

        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }
}

impl Serialize for ToolDefinition {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ToolDefinition", 3)?;
        state.serialize_field("name", self.name.as_str())?;
        state.serialize_field("description", self.description)?;
        state.serialize_field("inputSchema", &self.input_schema())?;
        state.end()
    }
}

/// Build the tool catalog. Only `execute_query` depends on `read_only`.
pub fn tool_definitions(read_only: bool) -> Vec<ToolDefinition> {
    let (execute_description, sql_description) = if read_only {
        ("Execute a custom SQL SELECT query", "SQL SELECT query to execute")
    } else {
        ("Execute a custom SQL query", "SQL query to execute")
    };

    vec![
        ToolDefinition {
            name: ToolName::ListSchemas,
            description: "List all schemas in the database",
            parameters: Vec::new(),
        },
        ToolDefinition {
            name: ToolName::ListTables,
            description: "List all tables in a schema",
            parameters: vec![ParameterSpec::string("schema", "Schema name")],
        },
        ToolDefinition {
            name: ToolName::GetTableStructure,
            description: "Get the structure (columns, types, constraints) of a table",
            parameters: vec![
                ParameterSpec::string("schema", "Schema name"),
                ParameterSpec::string("table", "Table name"),
            ],
        },
        ToolDefinition {
            name: ToolName::QueryTable,
            description: "Query data from a table with optional limit",
            parameters: vec![
                ParameterSpec::string("schema", "Schema name"),
                ParameterSpec::string("table", "Table name"),
                ParameterSpec::integer("limit", "Maximum number of rows to return"),
            ],
        },
        ToolDefinition {
            name: ToolName::ExecuteQuery,
            description: execute_description,
            parameters: vec![ParameterSpec::string("sql", sql_description)],
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_names_round_trip() {
        for tool in ToolName::ALL {
            assert_eq!(tool.as_str().parse::<ToolName>(), Ok(tool));
        }
        assert!("drop_everything".parse::<ToolName>().is_err());
    }

    #[test]
    fn test_catalog_order() {
        let names: Vec<&str> = tool_definitions(true)
            .iter()
            .map(|t| t.name.as_str())
            .collect();
        assert_eq!(
            names,
            [
                "list_schemas",
                "list_tables",
                "get_table_structure",
                "query_table",
                "execute_query"
            ]
        );
    }

    #[test]
    fn test_execute_query_description_follows_read_only() {
        let read_only = tool_definitions(true);
        let writable = tool_definitions(false);
        assert_eq!(read_only[4].description, "Execute a custom SQL SELECT query");
        assert_eq!(writable[4].description, "Execute a custom SQL query");
        assert_eq!(read_only[..4], writable[..4]);
    }

    #[test]
    fn test_serialized_shape() {
        let value = serde_json::to_value(&tool_definitions(true)[3]).unwrap();
        assert_eq!(value["name"], "query_table");
        assert_eq!(value["inputSchema"]["type"], "object");
        assert_eq!(value["inputSchema"]["properties"]["limit"]["type"], "integer");
        assert_eq!(value["inputSchema"]["required"], json!(["schema", "table"]));

        let value = serde_json::to_value(&tool_definitions(true)[0]).unwrap();
        assert_eq!(value["inputSchema"]["properties"], json!({}));
        assert_eq!(value["inputSchema"]["required"], json!([]));
    }
}
