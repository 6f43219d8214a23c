use crate::document::ExportDocument;
use crate::error::ConvertError;
use serde_json::Value;
use std::io::Write;
use std::path::Path;
use tracing::debug;

/// Replaces `color` on every part that already has one and returns how many
/// parts changed. Parts without a color stay without one.
pub fn apply_color_override(doc: &mut ExportDocument, color: Option<&str>) -> usize {
    let Some(color) = color else {
        return 0;
    };
    let Some(parts) = doc.parts_mut() else {
        return 0;
    };

    let mut replaced = 0;
    for part in parts.iter_mut() {
        if let Value::Object(fields) = part {
            if let Some(slot) = fields.get_mut("color") {
                *slot = Value::String(color.to_string());
                replaced += 1;
            }
        }
    }
    debug!(replaced, color, "applied color override");
    replaced
}

/// Writes strict JSON to `path`, creating parent directories. The document
/// lands through a sibling temp file so a failed write leaves nothing behind.
pub fn write_document(doc: &ExportDocument, path: &Path) -> Result<(), ConvertError> {
    let json = doc.to_json().map_err(|err| {
        ConvertError::io("serialize document", std::io::Error::other(err))
    })?;

    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => std::path::PathBuf::from("."),
    };
    std::fs::create_dir_all(&parent)
        .map_err(|err| ConvertError::io(format!("create output directory {parent:?}"), err))?;

    let mut tmp = tempfile::NamedTempFile::new_in(&parent)
        .map_err(|err| ConvertError::io(format!("create temp file in {parent:?}"), err))?;
    tmp.write_all(json.as_bytes())
        .map_err(|err| ConvertError::io(format!("write output {path:?}"), err))?;
    tmp.persist(path)
        .map_err(|err| ConvertError::io(format!("persist output {path:?}"), err.error))?;
    Ok(())
}
