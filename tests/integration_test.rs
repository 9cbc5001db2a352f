mod fixtures;

use fixtures::task_tracker_registry;
use openapi_from_forms::{
    describer::FormModelDescriber,
    document::DocumentBuilder,
    form::FormOptions,
    generator::DefinitionGenerator,
    model::Model,
    schema::SchemaType,
    serializer::{serialize_json, serialize_yaml},
};
use serde_json::json;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn task_tracker_generator() -> DefinitionGenerator {
    let describer = FormModelDescriber::new(task_tracker_registry());
    DefinitionGenerator::new(vec![Box::new(describer)])
}

#[test]
fn test_end_to_end_task_generation() {
    init_logging();
    let mut generator = task_tracker_generator();

    // Step 1: register the root model
    let reference = generator.register(Model::new("app::forms::TaskType", FormOptions::new()));
    assert_eq!(reference, "#/definitions/TaskType");

    // Step 2: generate all reachable definitions
    generator.generate().expect("generation should succeed");

    // The nested TagType model was registered transitively
    let definitions = generator.definitions();
    assert_eq!(definitions.len(), 2);
    assert!(definitions.contains_key("TaskType"));
    assert!(definitions.contains_key("TagType"));

    let task = &definitions["TaskType"];
    assert_eq!(task.schema_type, Some(SchemaType::Object));

    // Field iteration order is declaration order
    let names: Vec<&str> = task.properties.as_ref().unwrap().keys().collect();
    assert_eq!(
        names,
        vec!["title", "description", "priority", "done", "due", "tags", "assignee"]
    );
    assert_eq!(
        task.required,
        Some(vec!["title".to_string(), "priority".to_string()])
    );

    let properties = task.properties.as_ref().unwrap();

    // Multi-select choice over numeric values
    let priority = properties.get("priority").unwrap();
    assert_eq!(priority.schema_type, Some(SchemaType::Array));
    let priority_items = priority.items.as_ref().unwrap();
    assert_eq!(priority_items.schema_type, Some(SchemaType::Number));
    assert_eq!(
        priority_items.enum_values,
        Some(vec![json!(1), json!(2), json!(3)])
    );

    // Collection of a nested form type
    let tags = properties.get("tags").unwrap();
    assert_eq!(tags.schema_type, Some(SchemaType::Array));
    assert_eq!(
        tags.items.as_ref().unwrap().reference.as_deref(),
        Some("#/definitions/TagType")
    );

    // Single-valued association
    let assignee = properties.get("assignee").unwrap();
    assert_eq!(assignee.schema_type, Some(SchemaType::String));
    assert_eq!(assignee.format.as_deref(), Some("app::User id"));

    // The nested definition is a full object
    let tag = &definitions["TagType"];
    assert_eq!(tag.schema_type, Some(SchemaType::Object));
    let color = tag.properties.as_ref().unwrap().get("color").unwrap();
    assert_eq!(color.schema_type, Some(SchemaType::String));
    assert_eq!(
        color.enum_values,
        Some(vec![json!("red"), json!("green"), json!("blue")])
    );
}

#[test]
fn test_end_to_end_registration_form() {
    init_logging();
    let mut generator = task_tracker_generator();

    generator.register(Model::new(
        "app::forms::RegistrationType",
        FormOptions::new(),
    ));
    generator.generate().expect("generation should succeed");

    let definitions = generator.definitions();
    let registration = &definitions["RegistrationType"];
    let properties = registration.properties.as_ref().unwrap();

    // email resolves through its text parent
    let email = properties.get("email").unwrap();
    assert_eq!(email.schema_type, Some(SchemaType::String));

    // Paired password field: object requiring exactly the two sub-names
    let password = properties.get("password").unwrap();
    assert_eq!(password.schema_type, Some(SchemaType::Object));
    assert_eq!(
        password.required,
        Some(vec!["password".to_string(), "confirmation".to_string()])
    );
    let confirmation = password
        .properties
        .as_ref()
        .unwrap()
        .get("confirmation")
        .unwrap();
    assert_eq!(confirmation.schema_type, Some(SchemaType::String));
    assert_eq!(confirmation.format.as_deref(), Some("password"));

    // Multi-valued association
    let watchers = properties.get("watchers").unwrap();
    assert_eq!(watchers.schema_type, Some(SchemaType::Array));
    assert_eq!(watchers.format.as_deref(), Some("[app::User id]"));
    assert_eq!(
        watchers.items.as_ref().unwrap().schema_type,
        Some(SchemaType::String)
    );

    // Documentation fragment wins over what inference would produce
    let referral = properties.get("referral").unwrap();
    assert_eq!(referral.schema_type, Some(SchemaType::String));
    assert_eq!(referral.format.as_deref(), Some("referral-code"));
}

#[test]
fn test_registering_both_root_models_shares_nothing_but_the_table() {
    init_logging();
    let mut generator = task_tracker_generator();

    generator.register(Model::new("app::forms::TaskType", FormOptions::new()));
    generator.register(Model::new(
        "app::forms::RegistrationType",
        FormOptions::new(),
    ));
    generator.generate().expect("generation should succeed");

    let definitions = generator.definitions();
    assert_eq!(definitions.len(), 3);
    assert!(definitions.contains_key("TaskType"));
    assert!(definitions.contains_key("RegistrationType"));
    assert!(definitions.contains_key("TagType"));
}

#[test]
fn test_document_serialization_yaml_and_json() {
    init_logging();
    let mut generator = task_tracker_generator();
    generator.register(Model::new("app::forms::TaskType", FormOptions::new()));

    let document = DocumentBuilder::new()
        .with_info(
            "Task Tracker".to_string(),
            "1.2.0".to_string(),
            Some("Task tracker API models".to_string()),
        )
        .build(generator)
        .expect("build should succeed");

    let yaml = serialize_yaml(&document).expect("YAML serialization should succeed");
    assert!(yaml.contains("title: Task Tracker"));
    assert!(yaml.contains("TagType"));
    assert!(yaml.contains("$ref"));

    let json_text = serialize_json(&document).expect("JSON serialization should succeed");
    let value: serde_json::Value = serde_json::from_str(&json_text).unwrap();
    assert_eq!(value["info"]["version"], "1.2.0");
    assert_eq!(
        value["definitions"]["TaskType"]["properties"]["tags"]["items"]["$ref"],
        "#/definitions/TagType"
    );
    // Property order survives serialization: "title" is declared first and
    // "assignee" last, the reverse of their alphabetical order
    let title_property = json_text.rfind("\"title\"").unwrap();
    let assignee_property = json_text.find("\"assignee\"").unwrap();
    assert!(title_property < assignee_property);
}
