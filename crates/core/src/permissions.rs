//! Rendering of Unix permission bits for operator diagnostics.

/// Placeholder for any diagnostic field that could not be determined.
pub const UNKNOWN: &str = "Unknown (permissions issue?)";

/// `rwx` triples indexed by a 3-bit permission value.
const MASKS: [&str; 8] = ["---", "--x", "-w-", "-wx", "r--", "r-x", "rw-", "rwx"];

/// Last four octal digits of a `st_mode` value, e.g. `0644`.
pub fn octal_mode(mode: u32) -> String {
    let octal = format!("{mode:o}");
    let start = octal.len().saturating_sub(4);
    octal[start..].to_string()
}

/// Owner, group and other permissions as `rwx` triples, e.g. `rw- r-- r--`.
pub fn symbolic_mask(mode: u32) -> String {
    let triple = |shift: u32| MASKS[((mode >> shift) & 0o7) as usize];
    format!("{} {} {}", triple(6), triple(3), triple(0))
}
