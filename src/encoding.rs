//! Byte-to-string conversion for fetched pages.

use encoding_rs::{Encoding, UTF_8};

use crate::patterns::META_CHARSET;

/// How far into the document to look for a `<meta charset>` declaration.
const SNIFF_WINDOW: usize = 1024;

/// Decodes raw page bytes to a UTF-8 string.
///
/// A BOM wins, then a `<meta charset>` declaration near the top of the
/// document, then UTF-8 with lossy replacement. The modern pages are always
/// UTF-8; the sniffing matters for archived legacy snapshots.
pub fn transcode_to_utf8(bytes: &[u8]) -> String {
    if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
        let (text, _) = encoding.decode_without_bom_handling(&bytes[bom_len..]);
        return text.into_owned();
    }

    let window = &bytes[..bytes.len().min(SNIFF_WINDOW)];
    let head = String::from_utf8_lossy(window);
    if let Some(caps) = META_CHARSET.captures(&head) {
        if let Some(encoding) = Encoding::for_label(caps[1].as_bytes()) {
            let (text, _) = encoding.decode_without_bom_handling(bytes);
            return text.into_owned();
        }
    }

    let (text, _, _) = UTF_8.decode(bytes);
    text.into_owned()
}
