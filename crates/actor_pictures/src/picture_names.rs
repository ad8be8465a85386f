use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PictureNameError {
    #[error("picture name must not start with '/'")]
    LeadingSlash,
    #[error("picture name must not contain '\\\\'")]
    Backslash,
    #[error("picture name must not contain a '..' segment")]
    ParentTraversal,
    #[error("picture name must not end with '/'")]
    TrailingSlash,
    #[error("picture name contains control character {character:?}")]
    ControlCharacter { character: char },
}

/// Picture names are relative paths under the pictures folder, without
/// extension. Sub-folders are allowed; the empty name means "no picture".
pub fn validate_picture_name(name: &str) -> Result<(), PictureNameError> {
    if name.is_empty() {
        return Ok(());
    }
    if name.starts_with('/') {
        return Err(PictureNameError::LeadingSlash);
    }
    if name.ends_with('/') {
        return Err(PictureNameError::TrailingSlash);
    }
    if name.contains('\\') {
        return Err(PictureNameError::Backslash);
    }
    if name.split('/').any(|segment| segment == "..") {
        return Err(PictureNameError::ParentTraversal);
    }
    if let Some(character) = name.chars().find(|ch| ch.is_control()) {
        return Err(PictureNameError::ControlCharacter { character });
    }
    Ok(())
}
