use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use clap::{ArgAction, Args, ValueEnum};
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

use super::error::{GvmError, Result};

pub const GVM_ROOT_ENV: &str = "GVM_ROOT";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ValueEnum)]
pub enum Subcommand {
    #[default]
    #[serde(rename = "install")]
    Install,
    #[serde(rename = "uninstall")]
    Uninstall,
    #[serde(rename = "list")]
    List,
    #[serde(rename = "listall")]
    Listall,
    #[serde(rename = "alias list", alias = "alias-list")]
    #[value(name = "alias-list", alias = "alias list")]
    AliasList,
    #[serde(rename = "alias create", alias = "alias-create")]
    #[value(name = "alias-create", alias = "alias create")]
    AliasCreate,
    #[serde(rename = "alias delete", alias = "alias-delete")]
    #[value(name = "alias-delete", alias = "alias delete")]
    AliasDelete,
}

impl fmt::Display for Subcommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Subcommand::Install => "install",
            Subcommand::Uninstall => "uninstall",
            Subcommand::List => "list",
            Subcommand::Listall => "listall",
            Subcommand::AliasList => "alias list",
            Subcommand::AliasCreate => "alias create",
            Subcommand::AliasDelete => "alias delete",
        };
        f.write_str(name)
    }
}

/// Module parameters, as given on the command line or in an arguments file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Args)]
#[serde(deny_unknown_fields)]
pub struct Params {
    /// gvm subcommand to run
    #[arg(long, value_enum, default_value_t = Subcommand::Install)]
    #[serde(default)]
    pub subcommand: Subcommand,

    /// Go version name, e.g. go1.4
    #[arg(long = "version")]
    #[serde(default)]
    pub version: Option<String>,

    /// Alias name for `alias create` / `alias delete`
    #[arg(long)]
    #[serde(default)]
    pub alias: Option<String>,

    /// gvm installation root; falls back to $GVM_ROOT
    #[arg(long = "gvm-root", visible_alias = "root-path")]
    #[serde(default, alias = "root_path", alias = "root-path", alias = "gvm-root")]
    pub gvm_root: Option<String>,

    /// Expand a leading `~` in the gvm root
    #[arg(long = "expanduser", visible_alias = "expand-home", action = ArgAction::Set, default_value_t = true)]
    #[serde(
        default = "default_true",
        alias = "expand_home",
        alias = "expand-home",
        deserialize_with = "engine_bool"
    )]
    pub expanduser: bool,

    /// Pass --binary to `gvm install`
    #[arg(long)]
    #[serde(default, deserialize_with = "engine_bool")]
    pub binary: bool,

    /// Pass --prefer-binary to `gvm install`
    #[arg(long = "prefer-binary")]
    #[serde(default, alias = "prefer-binary", deserialize_with = "engine_bool")]
    pub prefer_binary: bool,

    /// Pass --with-build-tools to `gvm install`
    #[arg(long = "with-build-tools")]
    #[serde(default, alias = "with-build-tools", deserialize_with = "engine_bool")]
    pub with_build_tools: bool,

    /// Pass --with-protobuf to `gvm install`
    #[arg(long = "with-protobuf")]
    #[serde(default, alias = "with-protobuf", deserialize_with = "engine_bool")]
    pub with_protobuf: bool,
}

impl Default for Params {
    fn default() -> Self {
        Params {
            subcommand: Subcommand::Install,
            version: None,
            alias: None,
            gvm_root: None,
            expanduser: true,
            binary: false,
            prefer_binary: false,
            with_build_tools: false,
            with_protobuf: false,
        }
    }
}

fn default_true() -> bool {
    true
}

fn engine_bool<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    match Value::deserialize(deserializer)? {
        Value::Bool(b) => Ok(b),
        Value::Number(n) if n.as_i64() == Some(1) => Ok(true),
        Value::Number(n) if n.as_i64() == Some(0) => Ok(false),
        Value::String(s) => parse_bool(&s)
            .ok_or_else(|| D::Error::custom(format!("'{}' is not a valid boolean", s))),
        other => Err(D::Error::custom(format!("'{}' is not a valid boolean", other))),
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "yes" | "on" | "1" | "true" | "y" | "t" => Some(true),
        "no" | "off" | "0" | "false" | "n" | "f" => Some(false),
        _ => None,
    }
}

impl Params {
    /// Load parameters from an arguments file written by the automation engine.
    ///
    /// JSON files may wrap the parameters in `ANSIBLE_MODULE_ARGS`; anything
    /// else is read as whitespace separated `key=value` pairs.
    pub fn from_args_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| GvmError::ArgsFile {
            path: PathBuf::from(path),
            source,
        })?;
        Self::parse_args(&content)
    }

    pub fn parse_args(content: &str) -> Result<Self> {
        let object = if content.trim_start().starts_with('{') {
            let value: Value = serde_json::from_str(content)
                .map_err(|e| GvmError::InvalidParameters(e.to_string()))?;
            match value {
                Value::Object(mut map) => match map.remove("ANSIBLE_MODULE_ARGS") {
                    Some(Value::Object(inner)) => inner,
                    Some(_) => {
                        return Err(GvmError::InvalidParameters(
                            "ANSIBLE_MODULE_ARGS must be an object".to_string(),
                        ))
                    }
                    None => map,
                },
                _ => {
                    return Err(GvmError::InvalidParameters(
                        "arguments must be a JSON object".to_string(),
                    ))
                }
            }
        } else {
            parse_key_values(content)
                .into_iter()
                .map(|(k, v)| (k, Value::String(v)))
                .collect()
        };

        Self::from_object(object)
    }

    fn from_object(mut object: Map<String, Value>) -> Result<Self> {
        object.retain(|key, value| !key.starts_with("_ansible") && !value.is_null());

        serde_json::from_value(Value::Object(object)).map_err(|e| {
            let message = e.to_string();
            match unknown_field(&message) {
                Some(field) => GvmError::UnsupportedParameters(field),
                None => GvmError::InvalidParameters(message),
            }
        })
    }

    /// Resolve the gvm root: explicit option first, then the environment value.
    pub fn resolve_root(&self, env_root: Option<&str>) -> Result<String> {
        let raw = non_empty(self.gvm_root.as_deref())
            .or_else(|| non_empty(env_root))
            .ok_or(GvmError::MissingRoot)?;

        // Only `~` and `~/...` expand; `~user/...` is kept literally.
        if self.expanduser {
            Ok(shellexpand::tilde(raw).into_owned())
        } else {
            Ok(raw.to_string())
        }
    }

    pub fn require_version(&self) -> Result<&str> {
        non_empty(self.version.as_deref()).ok_or(GvmError::MissingVersion)
    }

    pub fn require_alias(&self) -> Result<&str> {
        non_empty(self.alias.as_deref()).ok_or(GvmError::MissingAlias)
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

fn unknown_field(message: &str) -> Option<String> {
    let rest = message.strip_prefix("unknown field `")?;
    let end = rest.find('`')?;
    Some(rest[..end].to_string())
}

/// Split `key=value` pairs separated by whitespace or newlines. Values may be
/// wrapped in single or double quotes to keep embedded spaces.
fn parse_key_values(content: &str) -> HashMap<String, String> {
    let mut map = HashMap::new();
    let mut token = String::new();
    let mut tokens = Vec::new();
    let mut quote: Option<char> = None;

    for c in content.chars() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => token.push(c),
            None if c == '"' || c == '\'' => quote = Some(c),
            None if c.is_whitespace() => {
                if !token.is_empty() {
                    tokens.push(std::mem::take(&mut token));
                }
            }
            None => token.push(c),
        }
    }
    if !token.is_empty() {
        tokens.push(token);
    }

    for token in tokens {
        if let Some((key, value)) = token.split_once('=') {
            map.insert(key.trim().to_string(), value.trim().to_string());
        }
    }
    map
}
