const UNITS: [&str; 6] = ["B", "KB", "MB", "GB", "TB", "PB"];

/// Formats a byte count with a binary (1024) unit and two decimals.
///
/// `1536` becomes `"1.50 KB"`. Values past the petabyte range stay in PB.
pub fn format_bytes(bytes: u64) -> String {
    let mut value = bytes as f64;
    let mut index = 0;
    while value >= 1024.0 && index < UNITS.len() - 1 {
        value /= 1024.0;
        index += 1;
    }
    format!("{value:.2} {}", UNITS[index])
}
