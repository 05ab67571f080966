use std::path::Path;

use anyhow::Context;
use modbus_layout::MapDocument;

/// Parse `text` as JSON when `path` has a `.json` extension, as YAML otherwise.
pub fn parse_document(path: &Path, text: &str) -> modbus_layout::Result<MapDocument> {
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if is_json {
        MapDocument::from_json_str(text)
    } else {
        MapDocument::from_yaml_str(text)
    }
}

pub async fn read_document(path: &Path) -> anyhow::Result<MapDocument> {
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    let document = parse_document(path, &text)?;
    Ok(document)
}
