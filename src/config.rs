use std::fs;
use std::path::PathBuf;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::StudioError;
use crate::ids::SpreadsheetId;
use crate::schema::{SheetKind, SheetSchema};

pub const DEFAULT_CONFIG: &str = "studio-docs.json";
pub const DEFAULT_OUTPUT: &str = "studio_db.json";

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub schema_version: Option<u32>,
    #[serde(default)]
    pub studio_db_url: Option<String>,
    #[serde(default)]
    pub sig_sheet: Option<String>,
    #[serde(default)]
    pub project_sheet: Option<String>,
    #[serde(default)]
    pub output: Option<String>,
    #[serde(default)]
    pub header_aliases: HeaderAliases,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct HeaderAliases {
    #[serde(default)]
    pub sig: IndexMap<String, String>,
    #[serde(default)]
    pub project: IndexMap<String, String>,
}

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub schema_version: u32,
    pub studio_db: Option<SpreadsheetId>,
    pub sig_sheet: Option<String>,
    pub project_sheet: Option<String>,
    pub output: PathBuf,
    pub sig_schema: SheetSchema,
    pub project_schema: SheetSchema,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            schema_version: 1,
            studio_db: None,
            sig_sheet: None,
            project_sheet: None,
            output: PathBuf::from(DEFAULT_OUTPUT),
            sig_schema: SheetSchema::sig(),
            project_schema: SheetSchema::project(),
        }
    }
}

pub struct ConfigLoader;

impl ConfigLoader {
    pub fn resolve(path: Option<&str>) -> Result<ResolvedConfig, StudioError> {
        let config_path = match path {
            Some(path) => PathBuf::from(path),
            None => PathBuf::from(DEFAULT_CONFIG),
        };

        if path.is_none() && !config_path.exists() {
            return Err(StudioError::MissingConfig);
        }

        let content = fs::read_to_string(&config_path)
            .map_err(|_| StudioError::ConfigRead(config_path.clone()))?;
        let config: Config = serde_json::from_str(&content)
            .map_err(|err| StudioError::ConfigParse(err.to_string()))?;

        Self::resolve_config(config)
    }

    pub fn resolve_or_default(path: Option<&str>) -> Result<ResolvedConfig, StudioError> {
        match Self::resolve(path) {
            Err(StudioError::MissingConfig) => Ok(ResolvedConfig::default()),
            other => other,
        }
    }

    pub fn resolve_config(config: Config) -> Result<ResolvedConfig, StudioError> {
        let schema_version = config.schema_version.unwrap_or(1);
        let studio_db = config
            .studio_db_url
            .as_deref()
            .map(str::parse::<SpreadsheetId>)
            .transpose()?;
        let sig_schema = apply_aliases(SheetKind::Sig, &config.header_aliases.sig)?;
        let project_schema = apply_aliases(SheetKind::Project, &config.header_aliases.project)?;

        Ok(ResolvedConfig {
            schema_version,
            studio_db,
            sig_sheet: config.sig_sheet,
            project_sheet: config.project_sheet,
            output: PathBuf::from(config.output.as_deref().unwrap_or(DEFAULT_OUTPUT)),
            sig_schema,
            project_schema,
        })
    }
}

fn apply_aliases(
    kind: SheetKind,
    aliases: &IndexMap<String, String>,
) -> Result<SheetSchema, StudioError> {
    aliases
        .iter()
        .try_fold(SheetSchema::for_kind(kind), |schema, (header, field)| {
            schema.with_alias(header, field)
        })
}
