use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Row-major linear cell index, `x + y * width`.
pub type CellIndex = usize;

/// Mine target the collaborative maps are created with.
pub const DEFAULT_MINE_COUNT: u16 = 20;

#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("Malformed payload: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Map has zero width or height")]
    EmptyMap,
    #[error("Cell index {index} is outside the {width}x{height} map")]
    IndexOutOfRange { index: CellIndex, width: u8, height: u8 },
}

pub type Result<T> = std::result::Result<T, ProtocolError>;

/// Authoritative mine layout pushed to every observer of a shared board.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MineSnapshot {
    #[serde(alias = "mines")]
    pub mine_indices: Vec<CellIndex>,
}

impl MineSnapshot {
    pub fn new(mine_indices: impl IntoIterator<Item = CellIndex>) -> Self {
        Self {
            mine_indices: mine_indices.into_iter().collect(),
        }
    }
}

/// Stored state of a shared board.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub width: u8,
    pub height: u8,
    pub mines: Vec<CellIndex>,
    #[serde(default)]
    pub discoveries: Vec<CellIndex>,
    #[serde(default)]
    pub flags: Vec<CellIndex>,
    #[serde(default = "default_mine_count")]
    pub mine_count: u16,
}

fn default_mine_count() -> u16 {
    DEFAULT_MINE_COUNT
}

impl MapDocument {
    pub fn total_cells(&self) -> usize {
        usize::from(self.width) * usize::from(self.height)
    }

    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(ProtocolError::EmptyMap);
        }

        let total = self.total_cells();
        let out_of_range = [&self.mines, &self.discoveries, &self.flags]
            .into_iter()
            .flatten()
            .find(|&&index| index >= total);
        match out_of_range {
            Some(&index) => Err(ProtocolError::IndexOutOfRange {
                index,
                width: self.width,
                height: self.height,
            }),
            None => Ok(()),
        }
    }
}

impl From<&MapDocument> for MineSnapshot {
    fn from(document: &MapDocument) -> Self {
        Self::new(document.mines.iter().copied())
    }
}

pub fn decode_snapshot(payload: &str) -> Result<MineSnapshot> {
    Ok(serde_json::from_str(payload)?)
}

pub fn encode_snapshot(snapshot: &MineSnapshot) -> Result<String> {
    Ok(serde_json::to_string(snapshot)?)
}

/// Parses and validates a map document.
pub fn decode_document(payload: &str) -> Result<MapDocument> {
    let document: MapDocument = serde_json::from_str(payload)?;
    document.validate()?;
    Ok(document)
}

pub fn encode_document(document: &MapDocument) -> Result<String> {
    Ok(serde_json::to_string(document)?)
}
