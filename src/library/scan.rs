use std::path::Path;
use std::time::Duration;

use lofty::prelude::*;
use walkdir::WalkDir;

use crate::config::LibrarySettings;

use super::model::Track;

pub(super) fn is_audio_file(path: &Path, settings: &LibrarySettings) -> bool {
    let exts: Vec<String> = settings
        .extensions
        .iter()
        .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|e| !e.is_empty())
        .collect();

    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            exts.iter().any(|e| e == &ext)
        })
        .unwrap_or(false)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|s| s.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

pub(super) fn make_name(title: &str, artist: Option<&str>) -> String {
    match artist.map(str::trim) {
        Some(a) if !a.is_empty() => format!("{} - {}", a, title.trim()),
        _ => title.trim().to_string(),
    }
}

/// Build a `Track` for one audio file, using tags for the name when present
/// and the file stem otherwise. Tag-less or unreadable files keep a zero
/// duration; the loader fills it in from the decoder later.
pub fn track_from_file(path: &Path) -> Track {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("UNKNOWN")
        .to_string();

    let mut title = stem;
    let mut artist: Option<String> = None;
    let mut duration = Duration::ZERO;

    if let Ok(tagged) = lofty::read_from_path(path) {
        duration = tagged.properties().duration();

        if let Some(tag) = tagged.primary_tag().or_else(|| tagged.first_tag()) {
            if let Some(v) = tag.title() {
                if !v.trim().is_empty() {
                    title = v.to_string();
                }
            }
            if let Some(v) = tag.artist() {
                let v = v.trim();
                if !v.is_empty() {
                    artist = Some(v.to_string());
                }
            }
        }
    }

    Track::new(path, make_name(&title, artist.as_deref())).with_duration(duration)
}

/// Scan `dir` for audio files and return them sorted by name.
pub fn scan(dir: &Path, settings: &LibrarySettings) -> Vec<Track> {
    let mut tracks: Vec<Track> = Vec::new();

    let mut walker = WalkDir::new(dir).follow_links(settings.follow_links);

    // Non-recursive = only the root directory.
    let depth_cap = if settings.recursive {
        settings.max_depth
    } else {
        Some(1)
    };
    if let Some(d) = depth_cap {
        walker = walker.max_depth(d);
    }

    for entry in walker
        .into_iter()
        .filter_entry(|e| settings.include_hidden || e.depth() == 0 || !is_hidden(e.path()))
        .filter_map(Result::ok)
    {
        let path = entry.path();
        if path.is_file()
            && (settings.include_hidden || !is_hidden(path))
            && is_audio_file(path, settings)
        {
            tracks.push(track_from_file(path));
        }
    }

    tracks.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
    tracks
}

/// Turn a user selection (folders and/or files) into tracks, keeping the
/// selection order. Folders are scanned; files are taken as-is when their
/// extension is a known audio type.
pub fn collect<P: AsRef<Path>>(selection: &[P], settings: &LibrarySettings) -> Vec<Track> {
    let mut tracks = Vec::new();
    for p in selection {
        let path = p.as_ref();
        if path.is_dir() {
            tracks.extend(scan(path, settings));
        } else if path.is_file() && is_audio_file(path, settings) {
            tracks.push(track_from_file(path));
        } else {
            log::debug!("library: skipping {}", path.display());
        }
    }
    tracks
}
