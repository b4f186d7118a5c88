//! Image type detection.

/// File extension for image bytes, sniffed from their signature.
///
/// Falls back to `bin` for anything unrecognized.
pub fn sniff_extension(bytes: &[u8]) -> &'static str {
    if bytes.starts_with(b"\x89PNG\r\n\x1a\n") {
        "png"
    } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        "jpg"
    } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
        "gif"
    } else if bytes.len() >= 12 && bytes.starts_with(b"RIFF") && &bytes[8..12] == b"WEBP" {
        "webp"
    } else if looks_like_svg(bytes) {
        "svg"
    } else {
        "bin"
    }
}

fn looks_like_svg(bytes: &[u8]) -> bool {
    let head = &bytes[..bytes.len().min(1024)];
    let text = String::from_utf8_lossy(head);
    let text = text.trim_start_matches('\u{feff}').trim_start();
    (text.starts_with("<svg") || text.starts_with("<?xml")) && text.contains("<svg")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sniff_known_formats() {
        assert_eq!(sniff_extension(b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR"), "png");
        assert_eq!(sniff_extension(&[0xFF, 0xD8, 0xFF, 0xE0, 0, 0x10]), "jpg");
        assert_eq!(sniff_extension(b"GIF89a\x01\x00"), "gif");
        assert_eq!(sniff_extension(b"RIFF\x24\0\0\0WEBPVP8 "), "webp");
        assert_eq!(
            sniff_extension(b"<?xml version=\"1.0\"?>\n<svg xmlns=\"http://www.w3.org/2000/svg\"/>"),
            "svg"
        );
        assert_eq!(sniff_extension(b"  <svg></svg>"), "svg");
    }

    #[test]
    fn test_unknown_bytes_fall_back() {
        assert_eq!(sniff_extension(b""), "bin");
        assert_eq!(sniff_extension(b"RIFF\0\0\0\0WAVE"), "bin");
        assert_eq!(sniff_extension(b"<?xml version=\"1.0\"?><html/>"), "bin");
    }
}
