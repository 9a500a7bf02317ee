use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::thread;

use itertools::Itertools;
use log::{info, warn};
use serde::Deserialize;

use crate::error::LoadError;
use crate::sector::{ImageHandle, ResolvedEntry, SectorModel};

pub const ALLOWED_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "gif"];
/// Optional `filename -> label` overrides next to the images
pub const LABELS_FILE: &str = "wheel_data.json";

/// A prize entry as published by a wheel data source, before image resolution
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WheelEntry {
    pub image_ref: String,
    pub label: String,
}

impl WheelEntry {
    pub fn new(image_ref: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            image_ref: image_ref.into(),
            label: label.into(),
        }
    }
}

/// Ordered list of prize entries, fetched once at load
pub trait WheelSource {
    fn entries(&self) -> Result<Vec<WheelEntry>, LoadError>;
}

/// Resolves an image reference or reports it unavailable
pub trait ImageResolver: Sync {
    fn resolve(&self, reference: &str) -> Result<ImageHandle, LoadError>;
}

/// Resolves every entry's image in parallel. Entries whose image is
/// unavailable are dropped; survivors keep their original order.
pub fn resolve_entries<R>(entries: Vec<WheelEntry>, resolver: &R) -> Vec<ResolvedEntry>
where
    R: ImageResolver + ?Sized,
{
    let results: Vec<Result<ImageHandle, LoadError>> = thread::scope(|scope| {
        let handles: Vec<_> = entries
            .iter()
            .map(|entry| scope.spawn(move || resolver.resolve(&entry.image_ref)))
            .collect();

        handles
            .into_iter()
            .zip(entries.iter())
            .map(|(handle, entry)| {
                handle.join().unwrap_or_else(|_| {
                    Err(LoadError::ImageUnavailable {
                        reference: entry.image_ref.clone(),
                    })
                })
            })
            .collect()
    });

    entries
        .into_iter()
        .zip(results)
        .filter_map(|(entry, result)| match result {
            Ok(image) => Some(ResolvedEntry {
                image,
                label: entry.label,
            }),
            Err(err) => {
                warn!("dropping entry '{}': {}", entry.label, err);
                None
            }
        })
        .collect()
}

/// Fetches entries, resolves their images and builds the sector model.
///
/// A source that fails or returns nothing is an error; entries that fail to
/// resolve only shrink the wheel, down to an empty (inert) one.
pub fn load_wheel<S, R>(source: &S, resolver: &R) -> Result<SectorModel, LoadError>
where
    S: WheelSource + ?Sized,
    R: ImageResolver + ?Sized,
{
    let entries = source.entries()?;
    if entries.is_empty() {
        return Err(LoadError::NoEntries);
    }

    let requested = entries.len();
    let resolved = resolve_entries(entries, resolver);
    if resolved.is_empty() {
        warn!("no image of {} entries could be resolved", requested);
    } else {
        info!(
            "loaded {} of {} wheel entries",
            resolved.len(),
            requested
        );
    }

    Ok(SectorModel::build(resolved))
}

/// Wheel entries from a local image directory
#[derive(Debug, Clone)]
pub struct DirectoryWheelSource {
    dir: PathBuf,
}

impl DirectoryWheelSource {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    fn labels(&self) -> HashMap<String, String> {
        fs::read(self.dir.join(LABELS_FILE))
            .ok()
            .and_then(|bytes| serde_json::from_slice(&bytes).ok())
            .unwrap_or_default()
    }
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ALLOWED_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

impl WheelSource for DirectoryWheelSource {
    fn entries(&self) -> Result<Vec<WheelEntry>, LoadError> {
        let labels = self.labels();

        let entries = fs::read_dir(&self.dir)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && is_image(path))
            .filter_map(|path| {
                path.file_name()
                    .and_then(|name| name.to_str())
                    .map(str::to_string)
            })
            .sorted()
            .map(|filename| {
                let label = labels.get(&filename).cloned().unwrap_or_else(|| {
                    Path::new(&filename)
                        .file_stem()
                        .and_then(|stem| stem.to_str())
                        .unwrap_or(&filename)
                        .to_string()
                });
                WheelEntry::new(filename, label)
            })
            .collect();

        Ok(entries)
    }
}

/// Resolves references as files below a root directory
#[derive(Debug, Clone)]
pub struct FileImageResolver {
    root: PathBuf,
}

impl FileImageResolver {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }
}

impl ImageResolver for FileImageResolver {
    fn resolve(&self, reference: &str) -> Result<ImageHandle, LoadError> {
        let bytes = fs::read(self.root.join(reference))?;
        if bytes.is_empty() {
            return Err(LoadError::ImageUnavailable {
                reference: reference.to_string(),
            });
        }
        Ok(ImageHandle {
            reference: reference.to_string(),
            byte_len: bytes.len(),
        })
    }
}
