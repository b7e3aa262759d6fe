//! Image type detection stub.
//!
//! Media helpers may ask for the image kind of a file or header before
//! uploading. No sniffing is done here: every input reports an unknown type
//! and callers fall back to a generic document upload.

use std::path::Path;

/// Kinds a header sniffer would distinguish.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Jpeg,
    Png,
    Gif,
    Webp,
    Bmp,
    Tiff,
}

/// Always `None`.
pub fn detect<P: AsRef<Path>>(_source: P, _header: Option<&[u8]>) -> Option<ImageKind> {
    None
}
