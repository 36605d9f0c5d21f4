//! Types command implementation
//!
//! Implements `image-builder types` to list the image types a build accepts.

use crate::core::image_types::{ImageType, SUPPORTED_IMAGE_TYPES};

/// Format one table row
pub fn format_row(image_type: &ImageType) -> String {
    format!(
        "{:<14} {:<14} {}",
        image_type.name,
        image_type.export,
        image_type.kind
    )
}

/// Execute the types command
pub fn execute() {
    println!("{:<14} {:<14} KIND", "TYPE", "EXPORT");
    for image_type in SUPPORTED_IMAGE_TYPES {
        println!("{}", format_row(image_type));
    }
}
