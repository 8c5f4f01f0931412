use super::{FormatParser, ParseError, Representation};
use crate::classify::ContentCategory;
use crate::schema::{derive_schema, dispose, SchemaOptions};
use serde::Deserialize;

/// JSON documents: parsed, then reduced to their derived schema.
pub struct StructuredDataParser {
    options: SchemaOptions,
}

impl StructuredDataParser {
    pub fn new(options: SchemaOptions) -> Self {
        Self { options }
    }
}

/// Parse `content` with no nesting limit. Deep documents grow the stack on
/// demand instead of hitting serde_json's default depth of 128.
fn read_document(content: &str) -> Result<serde_json::Value, serde_json::Error> {
    let mut json = serde_json::Deserializer::from_str(content);
    json.disable_recursion_limit();
    let value = serde_json::Value::deserialize(serde_stacker::Deserializer::new(&mut json))?;
    json.end()?;
    Ok(value)
}

impl FormatParser for StructuredDataParser {
    fn category(&self) -> ContentCategory {
        ContentCategory::StructuredData
    }

    fn parse(&self, content: &str) -> Result<Representation, ParseError> {
        let value = read_document(content)
            .map_err(|e| ParseError::new(ContentCategory::StructuredData, e.to_string()))?;
        let schema = derive_schema(&value, self.options);
        dispose(value);
        Ok(Representation::Schema(schema))
    }
}
