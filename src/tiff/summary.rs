use serde::{Deserialize, Serialize};

/// Dataset-wide metadata stored as JSON near the start of every container
/// file. Key names follow the acquisition software that writes them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryMetadata {
    #[serde(rename = "Width")]
    pub width: u32,

    #[serde(rename = "Height")]
    pub height: u32,

    #[serde(rename = "PixelSize_um", default)]
    pub pixel_size_um: Option<f64>,

    #[serde(rename = "z-step_um", default)]
    pub z_step_um: Option<f64>,

    #[serde(rename = "ChNames", default)]
    pub channel_names: Vec<String>,

    #[serde(rename = "InitialPositionList", default)]
    pub positions: Vec<PositionEntry>,
}

/// One entry of the acquisition's position list. Grid indices address cells
/// of the stage tiling; the grid may have unfilled cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionEntry {
    #[serde(rename = "GridRowIndex")]
    pub grid_row: i64,

    #[serde(rename = "GridColumnIndex")]
    pub grid_col: i64,

    #[serde(rename = "Label", default)]
    pub label: Option<String>,
}
