/// Delimiters considered by [`sniff_delimiter`], in order of preference.
pub const CANDIDATES: [u8; 5] = [b',', b';', b'\t', b'|', b':'];

const DEFAULT_DELIMITER: u8 = b',';

/// Guess the field delimiter of `content` from its header line.
///
/// Counts each candidate outside quoted regions on the first non-blank record.
/// The earliest candidate that occurs there wins. Data rows are not consulted,
/// so single-cell rows cannot outvote the header. Falls back to a comma for
/// single column input.
pub fn sniff_delimiter(content: &str) -> u8 {
    let counts = header_counts(content);

    CANDIDATES
        .iter()
        .zip(counts)
        .find(|(_, count)| *count > 0)
        .map(|(delimiter, _)| *delimiter)
        .unwrap_or(DEFAULT_DELIMITER)
}

/// Occurrence counts of every candidate on the first non-blank record,
/// ignoring quoted text. Quoted newlines do not end the record.
fn header_counts(content: &str) -> [usize; CANDIDATES.len()] {
    let mut counts = [0usize; CANDIDATES.len()];
    let mut in_quotes = false;
    let mut has_content = false;

    for byte in content.bytes() {
        match byte {
            b'"' => {
                in_quotes = !in_quotes;
                has_content = true;
            }
            b'\n' if !in_quotes => {
                if has_content {
                    break;
                }
            }
            b'\r' if !in_quotes => {}
            _ => {
                if !in_quotes {
                    if let Some(i) = CANDIDATES.iter().position(|c| *c == byte) {
                        counts[i] += 1;
                    }
                }
                has_content = true;
            }
        }
    }

    counts
}
