use crate::error::Result;
use crate::generator::DefinitionGenerator;
use crate::registry::Definitions;
use log::debug;
use serde::{Deserialize, Serialize};

/// API info section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Info {
    /// API title
    pub title: String,
    /// API version
    pub version: String,
    /// API description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Complete API document wrapping the synthesized definitions table.
///
/// Cross-references between definitions are `#/definitions/<Name>` strings,
/// so the table is emitted under the Swagger-style `definitions` key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiDocument {
    /// Document format version
    pub swagger: String,
    /// API info
    pub info: Info,
    /// Named schema definitions
    #[serde(skip_serializing_if = "Definitions::is_empty", default)]
    pub definitions: Definitions,
}

/// Builder for the final API document
pub struct DocumentBuilder {
    info: Info,
}

impl DocumentBuilder {
    /// Create a new DocumentBuilder with default info
    pub fn new() -> Self {
        debug!("initializing DocumentBuilder");
        Self {
            info: Info {
                title: "Generated API".to_string(),
                version: "1.0.0".to_string(),
                description: Some(
                    "API model documentation generated from form types".to_string(),
                ),
            },
        }
    }

    /// Set custom info for the API
    pub fn with_info(mut self, title: String, version: String, description: Option<String>) -> Self {
        self.info = Info {
            title,
            version,
            description,
        };
        self
    }

    /// Build the final document, draining any models still pending in the
    /// generator first.
    pub fn build(self, mut generator: DefinitionGenerator) -> Result<ApiDocument> {
        debug!("building final API document");
        generator.generate()?;

        Ok(ApiDocument {
            swagger: "2.0".to_string(),
            info: self.info,
            definitions: generator.into_definitions(),
        })
    }
}

impl Default for DocumentBuilder {
    fn default() -> Self {
        Self::new()
    }
}
