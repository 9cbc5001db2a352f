use crate::error::{Error, Result};
use crate::form::{FieldConfig, FieldKind, FormFactory, FormTypeRegistry, ResolvedFormType};
use crate::model::Model;
use crate::registry::ModelRegistry;
use crate::schema::{Schema, SchemaType};
use log::{debug, warn};
use serde_json::Value;

/// Trait for synthesizing a schema definition from a model.
///
/// Implementations know how to describe one family of model types. A
/// dispatcher asks each describer in turn via [`supports`](Self::supports)
/// and hands the model to the first one that claims it.
pub trait ModelDescriber {
    /// Whether this describer can handle the given model
    fn supports(&self, model: &Model) -> bool;

    /// Populate `schema` with the definition of `model`, registering any
    /// nested models with `registry`.
    fn describe(&self, model: &Model, schema: &mut Schema, registry: &mut ModelRegistry)
        -> Result<()>;
}

/// Describes form type models by introspecting their field configuration.
///
/// The describer constructs a form instance from the model's type and
/// options, then derives one property per exposed field. Fields whose type
/// is not a builtin kind are registered as child models and referenced via
/// `$ref`, which expands a type graph into a flat table of named
/// definitions.
pub struct FormModelDescriber {
    types: FormTypeRegistry,
    factory: Option<FormFactory>,
}

impl FormModelDescriber {
    pub fn new(types: FormTypeRegistry) -> Self {
        let factory = FormFactory::new(types.clone());
        Self {
            types,
            factory: Some(factory),
        }
    }

    /// A describer whose form support was never wired in. `supports` still
    /// answers from the type registry, but `describe` fails with a
    /// configuration error.
    pub fn without_factory(types: FormTypeRegistry) -> Self {
        Self {
            types,
            factory: None,
        }
    }

    /// Finds and sets the schema type on `property` based on the field
    /// configuration.
    fn find_field_type(
        &self,
        config: &FieldConfig,
        property: &mut Schema,
        registry: &mut ModelRegistry,
        factory: &FormFactory,
    ) -> Result<()> {
        if let Some(fragment) = config.documentation() {
            debug!("merging documentation fragment into '{}'", config.name());
            property.merge_fragment(fragment);
        }

        if property.schema_type.is_some() {
            // Type manually defined
            return Ok(());
        }

        self.infer_type(config, property, registry, factory)
    }

    /// Resolve the field's declared type to schema attributes.
    ///
    /// Walks the type's ancestor chain looking for a builtin kind; a field
    /// whose chain reaches the generic catch-all first is not builtin and
    /// becomes a registered child model behind a `$ref`.
    fn infer_type(
        &self,
        config: &FieldConfig,
        property: &mut Schema,
        registry: &mut ModelRegistry,
        factory: &FormFactory,
    ) -> Result<()> {
        let resolved = config.field_type();

        let start = match builtin_start(resolved) {
            Some(start) => start,
            None => {
                let model = Model::new(resolved.name(), config.options().clone());
                let reference = registry.register(model);
                debug!(
                    "field '{}' of type '{}' is not builtin, referencing {}",
                    config.name(),
                    resolved.name(),
                    reference
                );
                property.fill_reference(reference);
                return Ok(());
            }
        };

        for definition in resolved.ancestors().skip(start) {
            let kind = match definition.field_kind() {
                Some(kind) => kind,
                None => continue,
            };
            if kind == FieldKind::Form {
                break;
            }
            // First matching rule wins and the chain walk stops
            self.apply_rule(kind, config, property, registry, factory)?;
            return Ok(());
        }

        warn!(
            "no schema mapping for field '{}' of type '{}', leaving type unset",
            config.name(),
            resolved.name()
        );
        Ok(())
    }

    fn apply_rule(
        &self,
        kind: FieldKind,
        config: &FieldConfig,
        property: &mut Schema,
        registry: &mut ModelRegistry,
        factory: &FormFactory,
    ) -> Result<()> {
        let options = config.options();
        match kind {
            FieldKind::Text => property.fill_type(SchemaType::String),
            FieldKind::Number => property.fill_type(SchemaType::Number),
            FieldKind::Integer => property.fill_type(SchemaType::Integer),
            FieldKind::Date => {
                property.fill_type(SchemaType::String);
                property.fill_format("date");
            }
            FieldKind::DateTime => {
                property.fill_type(SchemaType::String);
                property.fill_format("date-time");
            }
            FieldKind::Checkbox => property.fill_type(SchemaType::Boolean),
            FieldKind::Password => {
                property.fill_type(SchemaType::String);
                property.fill_format("password");
            }
            FieldKind::Choice => {
                let multiple = options.flag("multiple");
                let choices = options.values_of("choices").filter(|v| !v.is_empty());
                match choices {
                    Some(values) => {
                        let element_type = choice_value_type(&values);
                        if multiple {
                            property.fill_type(SchemaType::Array);
                            let mut items = Schema::of(element_type);
                            items.fill_enum(values);
                            property.fill_items(items);
                        } else {
                            property.fill_type(element_type);
                            property.fill_enum(values);
                        }
                    }
                    None => property.fill_type(if multiple {
                        SchemaType::Array
                    } else {
                        SchemaType::String
                    }),
                }
            }
            FieldKind::Repeated => {
                let first_name = options.str("first_name").unwrap_or("first").to_string();
                let second_name = options.str("second_name").unwrap_or("second").to_string();
                property.fill_type(SchemaType::Object);
                property.fill_required(vec![first_name.clone(), second_name.clone()]);

                let sub_type = options.str("type").unwrap_or("text").to_string();
                let common = options.sub_options("options");
                let pairs = [
                    (first_name, "first_options"),
                    (second_name, "second_options"),
                ];
                for (sub_name, options_key) in pairs {
                    let sub_options = common.merged_with(&options.sub_options(options_key));
                    let sub_instance = factory.create(&sub_type, sub_options)?;
                    let sub_property = property.property_mut(&sub_name);
                    self.infer_type(sub_instance.config(), sub_property, registry, factory)?;
                }
            }
            FieldKind::Collection => {
                let entry_type = options.str("entry_type").unwrap_or("text").to_string();
                let entry_options = options.sub_options("entry_options");
                let entry = factory.create(&entry_type, entry_options)?;

                property.fill_type(SchemaType::Array);
                let mut items = Schema::new();
                self.infer_type(entry.config(), &mut items, registry, factory)?;
                property.fill_items(items);
            }
            FieldKind::Entity | FieldKind::Document => {
                let class = match options.str("class") {
                    Some(class) => class,
                    None => {
                        warn!(
                            "association field '{}' has no 'class' option, leaving type unset",
                            config.name()
                        );
                        return Ok(());
                    }
                };
                if options.flag("multiple") {
                    property.fill_format(format!("[{} id]", class));
                    property.fill_type(SchemaType::Array);
                    property.fill_items(Schema::of(SchemaType::String));
                } else {
                    property.fill_type(SchemaType::String);
                    property.fill_format(format!("{} id", class));
                }
            }
            FieldKind::Form => {}
        }
        Ok(())
    }
}

impl ModelDescriber for FormModelDescriber {
    fn supports(&self, model: &Model) -> bool {
        self.types.contains(model.type_name())
    }

    fn describe(
        &self,
        model: &Model,
        schema: &mut Schema,
        registry: &mut ModelRegistry,
    ) -> Result<()> {
        let factory = self.factory.as_ref().ok_or_else(|| {
            Error::Configuration(
                "form support is disabled; supply a form factory to describe form models"
                    .to_string(),
            )
        })?;

        debug!("describing form model '{}'", model.type_name());
        schema.schema_type = Some(SchemaType::Object);

        let instance = factory.create(model.type_name(), model.options().clone())?;
        for field in instance.fields() {
            if field.is_required() {
                schema.push_required(field.name());
            }
            let property = schema.property_mut(field.name());
            self.find_field_type(field, property, registry, factory)?;
        }

        Ok(())
    }
}

/// Index of the first chain member with a builtin kind, or `None` when the
/// chain reaches the generic catch-all type first (meaning "no specific
/// builtin").
///
/// Association kinds are recognized before the namespace check since they
/// live outside the builtin namespace.
fn builtin_start(resolved: &ResolvedFormType) -> Option<usize> {
    for (index, definition) in resolved.ancestors().enumerate() {
        match definition.field_kind() {
            Some(FieldKind::Form) => return None,
            Some(FieldKind::Entity) | Some(FieldKind::Document) => return Some(index),
            _ => {}
        }
        if definition.is_builtin() {
            return Some(index);
        }
    }
    None
}

/// Element type inferred from a non-empty list of choice values
fn choice_value_type(values: &[Value]) -> SchemaType {
    if is_numeric_values(values) {
        SchemaType::Number
    } else if is_boolean_values(values) {
        SchemaType::Boolean
    } else {
        SchemaType::String
    }
}

/// True if every value is numeric (JSON numbers and numeric strings both
/// count). Vacuously true for empty input; callers check non-emptiness.
fn is_numeric_values(values: &[Value]) -> bool {
    values.iter().all(|value| {
        value.is_number()
            || value
                .as_str()
                .map(|s| s.parse::<f64>().is_ok())
                .unwrap_or(false)
    })
}

/// True if every value is a boolean
fn is_boolean_values(values: &[Value]) -> bool {
    values.iter().all(Value::is_boolean)
}
