//! Runtime configuration: built-in defaults, overridden by an optional YAML
//! file that must validate against [`BUILTIN_SCHEMA`].

use std::fs;
use std::path::{Path, PathBuf};

use jsonschema::validator_for;
use serde_json::{Map as JsonMap, Number as JsonNumber, Value as JsonValue};
use yaml_rust2::{Yaml, YamlLoader, yaml::Hash};

use crate::{Result, WikimanError};

pub const BUILTIN_SCHEMA: &str = include_str!("../data/config_schema.yml");

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Directory rendered pages are cached in.
    pub base_path: PathBuf,
    pub section: u8,
    pub force_refresh: bool,
    /// Wikipedia language edition.
    pub language: String,
    pub pager: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_path: PathBuf::from("./"),
            section: 1,
            force_refresh: false,
            language: "en".to_string(),
            pager: "man".to_string(),
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let yaml = fs::read_to_string(path)
            .map_err(|err| WikimanError::Config(format!("{}: {err}", path.display())))?;
        Self::from_yaml_str(&yaml)
    }

    /// Reads a YAML config over the defaults. An empty document keeps every
    /// default.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        validate_config_with_schema_str(yaml, BUILTIN_SCHEMA)?;
        let mut config = Config::default();
        let docs = load_yaml(yaml)?;
        let Some(root) = docs.first() else {
            return Ok(config);
        };
        let map = ensure_mapping(root, "config root")?;

        if let Some(base_path) = map_get_string(map, "base_path")? {
            config.base_path = PathBuf::from(base_path);
        }
        if let Some(section) = map_get_integer(map, "section")? {
            config.section = u8::try_from(section).map_err(|_| {
                WikimanError::Config(format!("section out of range: {section}"))
            })?;
        }
        if let Some(force_refresh) = map_get_bool(map, "force_refresh")? {
            config.force_refresh = force_refresh;
        }
        if let Some(language) = map_get_string(map, "language")? {
            config.language = language;
        }
        if let Some(pager) = map_get_string(map, "pager")? {
            config.pager = pager;
        }
        Ok(config)
    }
}

pub fn validate_config_with_schema<P: AsRef<Path>>(yaml: &str, schema_path: P) -> Result<()> {
    let schema_source = fs::read_to_string(schema_path.as_ref())
        .map_err(|err| WikimanError::Schema(err.to_string()))?;
    validate_config_with_schema_str(yaml, &schema_source)
}

pub fn validate_config_with_schema_str(yaml: &str, schema_source: &str) -> Result<()> {
    let docs = load_yaml(yaml)?;
    let instance_json = docs
        .first()
        .map(yaml_to_json)
        .unwrap_or_else(|| JsonValue::Object(JsonMap::new()));
    let schema_docs = YamlLoader::load_from_str(schema_source)
        .map_err(|err| WikimanError::Schema(err.to_string()))?;
    let schema_yaml = schema_docs
        .first()
        .ok_or_else(|| WikimanError::Schema("empty schema document".to_string()))?;
    let schema_json = yaml_to_json(schema_yaml);
    let validator =
        validator_for(&schema_json).map_err(|err| WikimanError::Schema(err.to_string()))?;
    if let Err(error) = validator.validate(&instance_json) {
        return Err(WikimanError::Schema(error.to_string()));
    }
    Ok(())
}

fn load_yaml(yaml: &str) -> Result<Vec<Yaml>> {
    YamlLoader::load_from_str(yaml).map_err(|err| WikimanError::Yaml(err.to_string()))
}

fn ensure_mapping<'a>(value: &'a Yaml, context: &str) -> Result<&'a Hash> {
    value
        .as_hash()
        .ok_or_else(|| WikimanError::Config(format!("expected mapping for {context}")))
}

fn map_get<'a>(map: &'a Hash, key: &str) -> Option<&'a Yaml> {
    match map.get(&Yaml::String(key.to_string())) {
        None | Some(Yaml::Null) => None,
        Some(value) => Some(value),
    }
}

fn map_get_string(map: &Hash, key: &str) -> Result<Option<String>> {
    match map_get(map, key) {
        None => Ok(None),
        Some(Yaml::String(value)) => Ok(Some(value.clone())),
        Some(other) => Err(type_error(key, "string", other)),
    }
}

fn map_get_integer(map: &Hash, key: &str) -> Result<Option<i64>> {
    match map_get(map, key) {
        None => Ok(None),
        Some(Yaml::Integer(value)) => Ok(Some(*value)),
        Some(other) => Err(type_error(key, "integer", other)),
    }
}

fn map_get_bool(map: &Hash, key: &str) -> Result<Option<bool>> {
    match map_get(map, key) {
        None => Ok(None),
        Some(Yaml::Boolean(value)) => Ok(Some(*value)),
        Some(other) => Err(type_error(key, "bool", other)),
    }
}

fn type_error(key: &str, expected: &str, found: &Yaml) -> WikimanError {
    WikimanError::Config(format!(
        "expected {expected} for key '{key}', found {}",
        yaml_type_name(found)
    ))
}

/// Scalar keys keep their text; any other key is named by its type.
fn yaml_key_to_string(key: &Yaml) -> String {
    match key {
        Yaml::Boolean(value) => value.to_string(),
        Yaml::Integer(value) => value.to_string(),
        Yaml::Real(value) | Yaml::String(value) => value.clone(),
        other => yaml_type_name(other).to_string(),
    }
}

fn yaml_type_name(value: &Yaml) -> &'static str {
    match value {
        Yaml::Null => "null",
        Yaml::Boolean(_) => "bool",
        Yaml::Integer(_) => "int",
        Yaml::Real(_) => "float",
        Yaml::String(_) => "string",
        Yaml::Array(_) => "sequence",
        Yaml::Hash(_) => "mapping",
        Yaml::Alias(_) => "alias",
        Yaml::BadValue => "bad",
    }
}

fn yaml_to_json(value: &Yaml) -> JsonValue {
    match value {
        Yaml::Null => JsonValue::Null,
        Yaml::Boolean(value) => JsonValue::Bool(*value),
        Yaml::Integer(value) => JsonValue::Number(JsonNumber::from(*value)),
        Yaml::Real(value) => value
            .parse::<f64>()
            .ok()
            .and_then(JsonNumber::from_f64)
            .map(JsonValue::Number)
            .unwrap_or_else(|| JsonValue::String(value.clone())),
        Yaml::String(value) => JsonValue::String(value.clone()),
        Yaml::Array(values) => JsonValue::Array(values.iter().map(yaml_to_json).collect()),
        Yaml::Hash(map) => {
            let mut out = JsonMap::new();
            for (key, value) in map.iter() {
                out.insert(yaml_key_to_string(key), yaml_to_json(value));
            }
            JsonValue::Object(out)
        }
        Yaml::Alias(_) | Yaml::BadValue => JsonValue::Null,
    }
}
