use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::StudioError;

static FILE_ID: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"/d/([^/]+)/").unwrap());
static FOLDER_ID: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"/folders/(.+)").unwrap());
static SPREADSHEET_ID: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"/d/([^/]+)").unwrap());

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileId(String);

impl FileId {
    pub fn from_raw(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn edit_url(&self) -> String {
        format!("https://docs.google.com/spreadsheets/d/{}/edit", self.0)
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for FileId {
    type Err = StudioError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        FILE_ID
            .captures(value)
            .and_then(|caps| caps.get(1))
            .map(|id| Self(id.as_str().to_string()))
            .ok_or_else(|| StudioError::InvalidFileUrl(value.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FolderId(String);

impl FolderId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FolderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for FolderId {
    type Err = StudioError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        FOLDER_ID
            .captures(value)
            .and_then(|caps| caps.get(1))
            .map(|id| Self(id.as_str().to_string()))
            .ok_or_else(|| StudioError::InvalidFolderUrl(value.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpreadsheetId(String);

impl SpreadsheetId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SpreadsheetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SpreadsheetId {
    type Err = StudioError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        SPREADSHEET_ID
            .captures(value)
            .and_then(|caps| caps.get(1))
            .map(|id| Self(id.as_str().to_string()))
            .ok_or_else(|| StudioError::InvalidSpreadsheetUrl(value.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn file_id_stops_at_next_slash() {
        let id: FileId = "https://docs.google.com/spreadsheets/d/1AbC-xyz_9/edit#gid=0"
            .parse()
            .unwrap();
        assert_eq!(id.as_str(), "1AbC-xyz_9");
        assert_eq!(
            id.edit_url(),
            "https://docs.google.com/spreadsheets/d/1AbC-xyz_9/edit"
        );
    }

    #[test]
    fn file_id_requires_trailing_slash() {
        let err = "https://docs.google.com/spreadsheets/d/1AbC"
            .parse::<FileId>()
            .unwrap_err();
        assert_matches!(err, StudioError::InvalidFileUrl(_));
    }

    #[test]
    fn folder_id_takes_the_rest() {
        let id: FolderId = "https://drive.google.com/drive/folders/0BxFolder"
            .parse()
            .unwrap();
        assert_eq!(id.as_str(), "0BxFolder");
    }

    #[test]
    fn folder_id_invalid() {
        let err = "https://drive.google.com/drive/my-drive"
            .parse::<FolderId>()
            .unwrap_err();
        assert_matches!(err, StudioError::InvalidFolderUrl(_));
    }

    #[test]
    fn spreadsheet_id_without_trailing_slash() {
        let id: SpreadsheetId = "https://docs.google.com/spreadsheets/d/1Studio"
            .parse()
            .unwrap();
        assert_eq!(id.as_str(), "1Studio");
    }
}
