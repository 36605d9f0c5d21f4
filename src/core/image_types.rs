//! Requested output image types
//!
//! Maps user-facing image type names to the builder export names, and
//! rejects requests the builder cannot satisfy in one run.

use crate::error::ImageTypeError;

/// Kind of artifact an image type produces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    /// Bootable disk image
    Disk,
    /// Installer ISO
    Iso,
}

impl std::fmt::Display for ImageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Disk => write!(f, "disk"),
            Self::Iso => write!(f, "iso"),
        }
    }
}

/// A supported image type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageType {
    /// Name accepted on the command line
    pub name: &'static str,
    /// Builder pipeline exported for this type
    pub export: &'static str,
    /// Disk or ISO
    pub kind: ImageKind,
}

/// Supported image types, sorted by name
pub const SUPPORTED_IMAGE_TYPES: &[ImageType] = &[
    ImageType {
        name: "ami",
        export: "image",
        kind: ImageKind::Disk,
    },
    ImageType {
        name: "anaconda-iso",
        export: "anaconda-iso",
        kind: ImageKind::Iso,
    },
    ImageType {
        name: "iso",
        export: "iso",
        kind: ImageKind::Iso,
    },
    ImageType {
        name: "qcow2",
        export: "qcow2",
        kind: ImageKind::Disk,
    },
    ImageType {
        name: "raw",
        export: "image",
        kind: ImageKind::Disk,
    },
    ImageType {
        name: "vhd",
        export: "vpc",
        kind: ImageKind::Disk,
    },
    ImageType {
        name: "vmdk",
        export: "vmdk",
        kind: ImageKind::Disk,
    },
];

/// Look up a supported image type by name
pub fn lookup(name: &str) -> Option<&'static ImageType> {
    SUPPORTED_IMAGE_TYPES.iter().find(|t| t.name == name)
}

fn all_names() -> String {
    SUPPORTED_IMAGE_TYPES
        .iter()
        .map(|t| t.name)
        .collect::<Vec<_>>()
        .join(", ")
}

/// A validated, non-empty set of image types of a single kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageTypes {
    types: Vec<&'static ImageType>,
}

impl ImageTypes {
    pub fn new<S: AsRef<str>>(names: &[S]) -> Result<Self, ImageTypeError> {
        if names.is_empty() {
            return Err(ImageTypeError::Empty);
        }

        let types = names
            .iter()
            .map(|name| {
                let name = name.as_ref();
                lookup(name).ok_or_else(|| ImageTypeError::Unsupported {
                    name: name.to_string(),
                    valid: all_names(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let kind = types[0].kind;
        if types.iter().any(|t| t.kind != kind) {
            return Err(ImageTypeError::MixedKinds {
                requested: names.iter().map(|n| n.as_ref().to_string()).collect(),
            });
        }

        Ok(Self { types })
    }

    /// Export names in request order, each listed once
    pub fn exports(&self) -> Vec<String> {
        let mut exports: Vec<String> = Vec::with_capacity(self.types.len());
        for t in &self.types {
            if !exports.iter().any(|e| e == t.export) {
                exports.push(t.export.to_string());
            }
        }
        exports
    }

    pub fn kind(&self) -> ImageKind {
        self.types[0].kind
    }

    pub fn builds_iso(&self) -> bool {
        self.kind() == ImageKind::Iso
    }

    /// Requested type names
    pub fn names(&self) -> Vec<&'static str> {
        self.types.iter().map(|t| t.name).collect()
    }
}
