use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::geometry::ImageSize;
use crate::host::{AssetLoader, PictureImage};
use crate::picture_names::validate_picture_name;

pub const PICTURE_EXTENSION: &str = "png";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PictureFile {
    pub name: String,
    pub path: PathBuf,
    pub size: ImageSize,
}

impl PictureImage for PictureFile {
    fn size(&self) -> ImageSize {
        self.size
    }
}

/// Loads picture dimensions from `<root>/<name>.png`, remembering every
/// picture it has read. Missing or undecodable files are remembered too so
/// they are reported once.
#[derive(Debug, Clone)]
pub struct PictureDirectory {
    root: PathBuf,
    cache: HashMap<String, Option<ImageSize>>,
}

impl PictureDirectory {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            cache: HashMap::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn picture_path(&self, name: &str) -> PathBuf {
        self.root.join(format!("{name}.{PICTURE_EXTENSION}"))
    }

    pub fn is_cached(&self, name: &str) -> bool {
        matches!(self.cache.get(name), Some(Some(_)))
    }

    pub fn cached_count(&self) -> usize {
        self.cache.values().filter(|size| size.is_some()).count()
    }

    fn read_size(&mut self, name: &str) -> Option<ImageSize> {
        if let Some(size) = self.cache.get(name) {
            return *size;
        }

        let size = if let Err(error) = validate_picture_name(name) {
            warn!(picture = name, error = %error, "picture_name_rejected");
            None
        } else {
            let path = self.picture_path(name);
            match image::image_dimensions(&path) {
                Ok((width, height)) => Some(ImageSize { width, height }),
                Err(error) => {
                    warn!(
                        picture = name,
                        path = %path.display(),
                        error = %error,
                        "picture_load_failed"
                    );
                    None
                }
            }
        };
        self.cache.insert(name.to_string(), size);
        size
    }
}

impl AssetLoader for PictureDirectory {
    type Image = PictureFile;

    fn load_image(&mut self, name: &str) -> Option<Self::Image> {
        if name.is_empty() {
            return None;
        }
        let size = self.read_size(name)?;
        Some(PictureFile {
            name: name.to_string(),
            path: self.picture_path(name),
            size,
        })
    }

    fn request_cache(&mut self, name: &str) {
        if !name.is_empty() {
            self.read_size(name);
        }
    }
}
