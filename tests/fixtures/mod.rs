//! Shared fixture: a small task-tracker form registry exercising scalar,
//! choice, repeated, collection and association fields.

use openapi_from_forms::form::{FieldDeclaration, FormTypeDefinition, FormTypeRegistry};
use serde_json::json;

/// Form registry for a task tracker application
pub fn task_tracker_registry() -> FormTypeRegistry {
    let mut types = FormTypeRegistry::builtin();

    types.register(
        FormTypeDefinition::new("app::forms::TagType")
            .parent("form")
            .field(FieldDeclaration::new("label", "text"))
            .field(
                FieldDeclaration::new("color", "choice")
                    .required(false)
                    .option("choices", json!(["red", "green", "blue"])),
            ),
    );

    types.register(
        FormTypeDefinition::new("app::forms::TaskType")
            .parent("form")
            .field(FieldDeclaration::new("title", "text"))
            .field(FieldDeclaration::new("description", "textarea").required(false))
            .field(
                FieldDeclaration::new("priority", "choice")
                    .option("choices", json!([1, 2, 3]))
                    .option("multiple", json!(true)),
            )
            .field(FieldDeclaration::new("done", "checkbox").required(false))
            .field(FieldDeclaration::new("due", "date").required(false))
            .field(
                FieldDeclaration::new("tags", "collection")
                    .required(false)
                    .option("entry_type", json!("app::forms::TagType")),
            )
            .field(
                FieldDeclaration::new("assignee", "entity")
                    .required(false)
                    .option("class", json!("app::User")),
            ),
    );

    types.register(
        FormTypeDefinition::new("app::forms::RegistrationType")
            .parent("form")
            .field(FieldDeclaration::new("email", "email"))
            .field(
                FieldDeclaration::new("password", "repeated")
                    .option("type", json!("password"))
                    .option("first_name", json!("password"))
                    .option("second_name", json!("confirmation")),
            )
            .field(
                FieldDeclaration::new("watchers", "entity")
                    .required(false)
                    .option("class", json!("app::User"))
                    .option("multiple", json!(true)),
            )
            .field(
                FieldDeclaration::new("referral", "text")
                    .required(false)
                    .option(
                        "documentation",
                        json!({"type": "string", "format": "referral-code"}),
                    ),
            ),
    );

    types
}
