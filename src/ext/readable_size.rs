const LEVELS: [(u64, char); 4] = [
    (1 << 40, 'T'),
    (1 << 30, 'G'),
    (1 << 20, 'M'),
    (1 << 10, 'K'),
];

/// Renders a byte count using binary unit steps.
///
/// Exact multiples print as integers (`3M`); anything else gets three
/// fractional digits, truncated to the next lower unit (`1.500K`).
pub fn readable_size(bytes: u64) -> String {
    for (level, unit) in LEVELS {
        if bytes >= level {
            let quot = bytes / level;
            let remainder = (bytes % level) / (level / 1024);
            return if remainder == 0 {
                format!("{quot}{unit}")
            } else {
                format!("{:.3}{unit}", quot as f64 + remainder as f64 / 1024.0)
            };
        }
    }
    bytes.to_string()
}
