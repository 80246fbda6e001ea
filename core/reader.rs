use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use crate::run::AnalysisRun;

/// Bytes sniffed from the head of a file for the binary heuristic.
const BINARY_SNIFF_LEN: usize = 8192;
/// Fraction of non-text bytes in the sniffed head above which a file is
/// treated as binary.
const BINARY_NON_TEXT_RATIO: f64 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Fallback {
    Utf8,
    Latin1,
    Cp1252,
    Iso88591,
    Ascii,
}

// Attempted in order; the first decode yielding non-blank content wins.
const ENCODING_FALLBACKS: [Fallback; 5] = [
    Fallback::Utf8,
    Fallback::Latin1,
    Fallback::Cp1252,
    Fallback::Iso88591,
    Fallback::Ascii,
];

/// Classifies and reads one file, failing closed on anything suspect.
///
/// Returns `("", false)` for missing/unstatable files, empty files, files
/// over `max_size`, binary content, and undecodable content. Filesystem
/// errors become warnings on the run, never hard failures. On success the
/// content is decoded, stripped of non-printable characters (tab, newline
/// and carriage return survive) and trimmed.
pub fn read_file_safely(path: &Path, max_size: u64, run: &mut AnalysisRun) -> (String, bool) {
    let size = match fs::metadata(path) {
        Ok(meta) => meta.len(),
        Err(_) => return (String::new(), false),
    };
    if size > max_size {
        run.log_warning(format!(
            "Oversized file skipped ({} bytes): {}",
            size,
            path.display()
        ));
        return (String::new(), false);
    }
    if size == 0 {
        return (String::new(), false);
    }

    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::PermissionDenied => {
            run.log_warning(format!("No permission to read: {}", path.display()));
            return (String::new(), false);
        }
        Err(e) => {
            run.log_warning(format!("I/O error reading {}: {}", path.display(), e));
            return (String::new(), false);
        }
    };

    if is_binary(&bytes) {
        run.log_warning(format!("Binary file skipped: {}", path.display()));
        return (String::new(), false);
    }

    for encoding in ENCODING_FALLBACKS {
        if let Some(content) = decode(&bytes, encoding) {
            if !content.trim().is_empty() {
                let cleaned: String = content
                    .chars()
                    .filter(|c| !c.is_control() || matches!(c, '\n' | '\r' | '\t'))
                    .collect();
                return (cleaned.trim().to_string(), true);
            }
        }
    }
    (String::new(), false)
}

/// NUL byte anywhere in the head, or too many bytes outside the extended
/// printable set.
pub fn is_binary(bytes: &[u8]) -> bool {
    let head = &bytes[..bytes.len().min(BINARY_SNIFF_LEN)];
    if head.is_empty() {
        return false;
    }
    if head.contains(&0) {
        return true;
    }
    let non_text = head.iter().filter(|&&b| !is_text_byte(b)).count();
    non_text as f64 / head.len() as f64 > BINARY_NON_TEXT_RATIO
}

// Common control whitespace plus everything from 0x20 upward except DEL.
fn is_text_byte(byte: u8) -> bool {
    matches!(byte, 7 | 8 | 9 | 10 | 12 | 13 | 27) || (byte >= 0x20 && byte != 0x7f)
}

fn decode(bytes: &[u8], encoding: Fallback) -> Option<String> {
    match encoding {
        Fallback::Utf8 => String::from_utf8(bytes.to_vec()).ok(),
        // ISO-8859-1 maps bytes to the first 256 code points directly.
        Fallback::Latin1 | Fallback::Iso88591 => {
            Some(bytes.iter().map(|&b| b as char).collect())
        }
        Fallback::Cp1252 => {
            let (text, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
            Some(text.into_owned())
        }
        Fallback::Ascii => Some(
            bytes
                .iter()
                .filter(|b| b.is_ascii())
                .map(|&b| b as char)
                .collect(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use std::time::Duration;
    use tempfile::TempDir;

    fn run() -> AnalysisRun {
        AnalysisRun::new(Duration::from_secs(300))
    }

    const MAX: u64 = 10 * 1024 * 1024;

    #[test]
    fn empty_file_fails_closed() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.txt");
        File::create(&path).unwrap();
        let (content, ok) = read_file_safely(&path, MAX, &mut run());
        assert_eq!(content, "");
        assert!(!ok);
    }

    #[test]
    fn missing_file_fails_closed() {
        let dir = TempDir::new().unwrap();
        let (content, ok) = read_file_safely(&dir.path().join("nope"), MAX, &mut run());
        assert_eq!(content, "");
        assert!(!ok);
    }

    #[test]
    fn oversized_file_fails_closed_with_warning() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("big.txt");
        fs::write(&path, vec![b'a'; 64]).unwrap();
        let mut run = run();
        let (_, ok) = read_file_safely(&path, 16, &mut run);
        assert!(!ok);
        assert_eq!(run.warnings().len(), 1);
    }

    #[test]
    fn nul_byte_in_head_means_binary() {
        assert!(is_binary(b"abc\x00def"));
        assert!(!is_binary(b"plain text\n"));
    }

    #[test]
    fn high_non_text_ratio_means_binary() {
        let mut bytes = vec![1u8; 40];
        bytes.extend_from_slice(&[b'a'; 60]);
        assert!(is_binary(&bytes));
        let mostly_text = [&[1u8; 10][..], &[b'a'; 90][..]].concat();
        assert!(!is_binary(&mostly_text));
    }

    #[test]
    fn utf8_content_is_stripped_and_trimmed() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("code.rs");
        let mut f = File::create(&path).unwrap();
        f.write_all("  fn main() {}\u{1}\n\t\n  ".as_bytes()).unwrap();
        let (content, ok) = read_file_safely(&path, MAX, &mut run());
        assert!(ok);
        assert_eq!(content, "fn main() {}");
    }

    #[test]
    fn latin1_fallback_decodes_non_utf8_text() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("latin.txt");
        // "café" in ISO-8859-1; 0xE9 is invalid as UTF-8 here.
        fs::write(&path, b"caf\xe9 au lait").unwrap();
        let (content, ok) = read_file_safely(&path, MAX, &mut run());
        assert!(ok);
        assert_eq!(content, "café au lait");
    }

    #[test]
    fn cp1252_decode_maps_smart_quotes() {
        let decoded = decode(b"\x93quoted\x94", Fallback::Cp1252).unwrap();
        assert_eq!(decoded, "\u{201c}quoted\u{201d}");
    }
}
