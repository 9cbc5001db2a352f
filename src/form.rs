use crate::error::{Error, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

/// Built-in field kinds a form type can resolve to.
///
/// Replaces the string block-prefix dispatch of classic form frameworks with
/// a tagged variant per kind; `Form` is the generic catch-all base type that
/// marks a type hierarchy as "no specific builtin".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Text,
    Integer,
    Number,
    Date,
    DateTime,
    Checkbox,
    Password,
    Choice,
    Repeated,
    Collection,
    Entity,
    Document,
    Form,
}

/// Construction options for a form type or field, an ordered key to JSON
/// value mapping.
///
/// Backed by a `BTreeMap` so that serializing the options yields a canonical
/// key, which drives model identity and registry deduplication.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormOptions(BTreeMap<String, Value>);

impl FormOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insertion
    pub fn with(mut self, key: impl Into<String>, value: Value) -> Self {
        self.0.insert(key.into(), value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.0.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Boolean option, absent or non-boolean counts as false
    pub fn flag(&self, key: &str) -> bool {
        self.get(key).and_then(Value::as_bool).unwrap_or(false)
    }

    pub fn str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// Nested options object; absent or non-object yields empty options
    pub fn sub_options(&self, key: &str) -> FormOptions {
        match self.get(key) {
            Some(Value::Object(map)) => {
                FormOptions(map.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
            }
            _ => FormOptions::new(),
        }
    }

    /// Literal values of a list option. Arrays keep declaration order,
    /// label-to-value objects contribute their values in map iteration order.
    pub fn values_of(&self, key: &str) -> Option<Vec<Value>> {
        match self.get(key)? {
            Value::Array(items) => Some(items.clone()),
            Value::Object(map) => Some(map.values().cloned().collect()),
            _ => None,
        }
    }

    /// Overlay `other` onto this set of options, `other` winning on conflicts
    pub fn extend(&mut self, other: FormOptions) {
        self.0.extend(other.0);
    }

    pub fn merged_with(&self, other: &FormOptions) -> FormOptions {
        let mut merged = self.clone();
        merged.extend(other.clone());
        merged
    }

    /// Canonical string form used for identity comparison
    pub fn canonical_key(&self) -> String {
        serde_json::to_string(&self.0).unwrap_or_else(|_| format!("{:?}", self.0))
    }
}

/// A field declared by a form type definition
#[derive(Debug, Clone)]
pub struct FieldDeclaration {
    name: String,
    type_name: String,
    required: bool,
    options: FormOptions,
}

impl FieldDeclaration {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            required: true,
            options: FormOptions::new(),
        }
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn option(mut self, key: impl Into<String>, value: Value) -> Self {
        self.options.insert(key, value);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn options(&self) -> &FormOptions {
        &self.options
    }
}

/// Definition of a form type: its place in the type hierarchy, its builtin
/// kind (if any), default options and declared fields.
#[derive(Debug, Clone)]
pub struct FormTypeDefinition {
    name: String,
    parent: Option<String>,
    kind: Option<FieldKind>,
    builtin: bool,
    defaults: FormOptions,
    fields: Vec<FieldDeclaration>,
}

impl FormTypeDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            kind: None,
            builtin: false,
            defaults: FormOptions::new(),
            fields: Vec::new(),
        }
    }

    pub fn parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn kind(mut self, kind: FieldKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Mark the type as part of the builtin namespace
    pub fn builtin(mut self) -> Self {
        self.builtin = true;
        self
    }

    pub fn default_option(mut self, key: impl Into<String>, value: Value) -> Self {
        self.defaults.insert(key, value);
        self
    }

    pub fn field(mut self, field: FieldDeclaration) -> Self {
        self.fields.push(field);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent_name(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    pub fn field_kind(&self) -> Option<FieldKind> {
        self.kind
    }

    pub fn is_builtin(&self) -> bool {
        self.builtin
    }

    pub fn defaults(&self) -> &FormOptions {
        &self.defaults
    }

    pub fn fields(&self) -> &[FieldDeclaration] {
        &self.fields
    }
}

/// A form type resolved to its full ancestor chain, most specific first
#[derive(Debug, Clone)]
pub struct ResolvedFormType {
    chain: Vec<Arc<FormTypeDefinition>>,
}

impl ResolvedFormType {
    /// Name of the most specific type in the chain
    pub fn name(&self) -> &str {
        self.chain[0].name()
    }

    pub fn definition(&self) -> &FormTypeDefinition {
        &self.chain[0]
    }

    /// Walk the chain from the type itself up through its declared parents
    pub fn ancestors(&self) -> impl Iterator<Item = &FormTypeDefinition> {
        self.chain.iter().map(|definition| definition.as_ref())
    }

    /// Walk the chain from the root type down to the type itself
    pub fn ancestors_root_first(&self) -> impl Iterator<Item = &FormTypeDefinition> {
        self.chain.iter().rev().map(|definition| definition.as_ref())
    }
}

/// Registry of known form type definitions
#[derive(Debug, Clone, Default)]
pub struct FormTypeRegistry {
    definitions: HashMap<String, Arc<FormTypeDefinition>>,
}

impl FormTypeRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry preloaded with the builtin scalar and compound
    /// kinds plus the entity/document association types.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register(FormTypeDefinition::new("form").kind(FieldKind::Form).builtin());

        let scalar_types: [(&str, Option<FieldKind>, &str); 13] = [
            ("text", Some(FieldKind::Text), "form"),
            ("textarea", None, "text"),
            ("email", None, "text"),
            ("url", None, "text"),
            ("integer", Some(FieldKind::Integer), "form"),
            ("number", Some(FieldKind::Number), "form"),
            ("date", Some(FieldKind::Date), "form"),
            ("datetime", Some(FieldKind::DateTime), "form"),
            ("checkbox", Some(FieldKind::Checkbox), "form"),
            ("password", Some(FieldKind::Password), "text"),
            ("choice", Some(FieldKind::Choice), "form"),
            ("repeated", Some(FieldKind::Repeated), "form"),
            ("collection", Some(FieldKind::Collection), "form"),
        ];
        for (name, kind, parent) in scalar_types {
            let mut definition = FormTypeDefinition::new(name).parent(parent).builtin();
            if let Some(kind) = kind {
                definition = definition.kind(kind);
            }
            registry.register(definition);
        }

        // Association types live outside the builtin namespace and are
        // recognized by their kind instead.
        registry.register(
            FormTypeDefinition::new("entity")
                .parent("choice")
                .kind(FieldKind::Entity),
        );
        registry.register(
            FormTypeDefinition::new("document")
                .parent("choice")
                .kind(FieldKind::Document),
        );

        registry
    }

    pub fn register(&mut self, definition: FormTypeDefinition) {
        debug!("registering form type '{}'", definition.name());
        self.definitions
            .insert(definition.name().to_string(), Arc::new(definition));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.definitions.contains_key(name)
    }

    /// Resolve a type name to its full ancestor chain.
    ///
    /// Fails on unknown names (including unknown parents anywhere in the
    /// chain) and on circular hierarchies.
    pub fn resolve(&self, name: &str) -> Result<ResolvedFormType> {
        let mut chain = Vec::new();
        let mut seen = HashSet::new();
        let mut current = Some(name.to_string());

        while let Some(type_name) = current {
            if !seen.insert(type_name.clone()) {
                return Err(Error::Configuration(format!(
                    "circular form type hierarchy detected at '{}'",
                    type_name
                )));
            }
            let definition = self.definitions.get(&type_name).ok_or_else(|| {
                Error::Configuration(format!("unknown form type '{}'", type_name))
            })?;
            chain.push(Arc::clone(definition));
            current = definition.parent_name().map(str::to_string);
        }

        Ok(ResolvedFormType { chain })
    }
}

/// Per-field introspected configuration: name, required flag, resolved type
/// and fully resolved options.
#[derive(Debug, Clone)]
pub struct FieldConfig {
    name: String,
    required: bool,
    field_type: ResolvedFormType,
    options: FormOptions,
}

impl FieldConfig {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn field_type(&self) -> &ResolvedFormType {
        &self.field_type
    }

    pub fn options(&self) -> &FormOptions {
        &self.options
    }

    /// Externally supplied documentation fragment, if any
    pub fn documentation(&self) -> Option<&Value> {
        self.options.get("documentation")
    }
}

/// A field-introspectable form instance: the root configuration plus the
/// ordered list of field configurations.
#[derive(Debug, Clone)]
pub struct FormInstance {
    config: FieldConfig,
    fields: Vec<FieldConfig>,
}

impl FormInstance {
    /// Configuration of the instance itself
    pub fn config(&self) -> &FieldConfig {
        &self.config
    }

    /// Fields in declaration order
    pub fn fields(&self) -> &[FieldConfig] {
        &self.fields
    }
}

/// Constructs field-introspectable form instances from a type name and
/// construction options.
#[derive(Debug, Clone)]
pub struct FormFactory {
    types: FormTypeRegistry,
}

impl FormFactory {
    pub fn new(types: FormTypeRegistry) -> Self {
        Self { types }
    }

    pub fn knows(&self, type_name: &str) -> bool {
        self.types.contains(type_name)
    }

    /// Create an instance of `type_name` parameterized by `options`.
    ///
    /// Options resolve root-first along the ancestor chain, with the caller's
    /// options winning. Fields collect root-first as well, so a child type
    /// overrides a parent's same-named field in place.
    pub fn create(&self, type_name: &str, options: FormOptions) -> Result<FormInstance> {
        debug!("creating form instance for type '{}'", type_name);
        let resolved = self.types.resolve(type_name)?;

        let mut resolved_options = FormOptions::new();
        for definition in resolved.ancestors_root_first() {
            resolved_options.extend(definition.defaults().clone());
        }
        resolved_options.extend(options);

        let required = resolved_options
            .get("required")
            .and_then(Value::as_bool)
            .unwrap_or(true);

        let mut fields: Vec<FieldConfig> = Vec::new();
        for definition in resolved.ancestors_root_first() {
            for declaration in definition.fields() {
                let config = self.field_config(declaration)?;
                match fields.iter_mut().find(|f| f.name == config.name) {
                    Some(existing) => *existing = config,
                    None => fields.push(config),
                }
            }
        }
        debug!(
            "form instance '{}' exposes {} fields",
            type_name,
            fields.len()
        );

        Ok(FormInstance {
            config: FieldConfig {
                name: String::new(),
                required,
                field_type: resolved,
                options: resolved_options,
            },
            fields,
        })
    }

    fn field_config(&self, declaration: &FieldDeclaration) -> Result<FieldConfig> {
        let field_type = self.types.resolve(declaration.type_name())?;

        let mut options = FormOptions::new();
        for definition in field_type.ancestors_root_first() {
            options.extend(definition.defaults().clone());
        }
        options.extend(declaration.options().clone());

        Ok(FieldConfig {
            name: declaration.name().to_string(),
            required: declaration.is_required(),
            field_type,
            options,
        })
    }
}
