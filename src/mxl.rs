//! MXL file handler: reads compressed MusicXML (.mxl) archives.
//!
//! An .mxl file is a ZIP archive containing:
//!   - META-INF/container.xml  : declares the root MusicXML file path
//!   - <rootfile>.xml          : the actual MusicXML content (e.g., score.xml)
//!   - (optional) other files  : images, sounds, etc.

use std::io::{Cursor, Read};

use zip::ZipArchive;

use crate::error::{RenderError, Result};
use crate::model::Score;
use crate::parser;

/// Read and parse a .mxl file from raw bytes.
pub fn parse_mxl(data: &[u8]) -> Result<Score> {
    let xml = extract_musicxml_from_mxl(data)?;
    parser::parse_musicxml(&xml)
}

fn archive_error(context: &str, e: impl std::fmt::Display) -> RenderError {
    RenderError::Archive(format!("{context}: {e}"))
}

/// Extract the MusicXML content string from .mxl bytes.
pub fn extract_musicxml_from_mxl(data: &[u8]) -> Result<String> {
    let mut archive =
        ZipArchive::new(Cursor::new(data)).map_err(|e| archive_error("failed to open MXL archive", e))?;

    let root_file_path = read_container_xml(&mut archive)?;
    log::debug!("MXL root file is '{root_file_path}'");

    let mut root_file = archive
        .by_name(&root_file_path)
        .map_err(|e| archive_error(&format!("root file '{root_file_path}' not found"), e))?;

    let mut xml = String::new();
    root_file
        .read_to_string(&mut xml)
        .map_err(|e| archive_error(&format!("failed to read '{root_file_path}'"), e))?;
    Ok(xml)
}

/// Find the root MusicXML path, from META-INF/container.xml when present.
fn read_container_xml(archive: &mut ZipArchive<Cursor<&[u8]>>) -> Result<String> {
    let container_xml = match archive.by_name("META-INF/container.xml") {
        Ok(mut file) => {
            let mut xml = String::new();
            file.read_to_string(&mut xml)
                .map_err(|e| archive_error("failed to read container.xml", e))?;
            Some(xml)
        }
        Err(_) => None,
    };

    if let Some(xml) = container_xml {
        let doc = roxmltree::Document::parse(&xml).map_err(|e| archive_error("failed to parse container.xml", e))?;
        return doc
            .descendants()
            .filter(|n| n.tag_name().name() == "rootfile")
            .find_map(|n| n.attribute("full-path"))
            .map(String::from)
            .ok_or_else(|| RenderError::Archive("no rootfile in container.xml".into()));
    }

    // Fallback: the first .xml or .musicxml file outside META-INF.
    let names: Vec<String> = (0..archive.len())
        .filter_map(|i| archive.by_index(i).ok().map(|f| f.name().to_string()))
        .collect();
    names
        .iter()
        .find(|name| !name.starts_with("META-INF/") && (name.ends_with(".xml") || name.ends_with(".musicxml")))
        .cloned()
        .ok_or_else(|| RenderError::Archive(format!("no MusicXML file in archive, files: {names:?}")))
}
