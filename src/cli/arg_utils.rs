// arg_utils.rs: value parsers shared by the brstate subcommands

use crate::cli::constants::{KB, MB};

/// Parses an unsigned integer from the start of `s`, optionally followed by a
/// size suffix. Returns `None` if no leading digits are present or the value
/// overflows, otherwise `Some((value, remainder))` with the unconsumed tail.
///
/// Recognised suffixes (case-sensitive):
///   `K` / `KB` / `KiB`  → multiply by 1 024
///   `M` / `MB` / `MiB`  → multiply by 1 048 576
pub fn read_size_from_str(s: &str) -> Option<(usize, &str)> {
    let digits = s.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    let mut value: usize = s[..digits].parse().ok()?;
    let mut rest = &s[digits..];

    let multiplier = match rest.as_bytes().first() {
        Some(b'K') => KB,
        Some(b'M') => MB,
        _ => 1,
    };
    if multiplier != 1 {
        value = value.checked_mul(multiplier)?;
        rest = &rest[1..];
        rest = rest.strip_prefix('i').unwrap_or(rest);
        rest = rest.strip_prefix('B').unwrap_or(rest);
    }
    Some((value, rest))
}

/// `clap` value parser for byte sizes such as `4096`, `64K` or `1MiB`.
pub fn parse_size(s: &str) -> Result<usize, String> {
    match read_size_from_str(s) {
        Some((value, "")) => Ok(value),
        Some((_, rest)) => Err(format!("unexpected characters after size: {rest:?}")),
        None => Err(format!("expected a size, got {s:?}")),
    }
}
