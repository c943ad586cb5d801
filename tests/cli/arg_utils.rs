// Integration tests for cli/arg_utils.rs: size parsing with K/M suffixes.

use brotli_state::cli::arg_utils::{parse_size, read_size_from_str};

#[test]
fn bare_numbers() {
    assert_eq!(read_size_from_str("0"), Some((0, "")));
    assert_eq!(read_size_from_str("65536"), Some((65536, "")));
}

#[test]
fn kilo_and_mega_spellings() {
    for s in ["2K", "2KB", "2KiB"] {
        assert_eq!(parse_size(s), Ok(2048), "{s}");
    }
    for s in ["3M", "3MB", "3MiB"] {
        assert_eq!(parse_size(s), Ok(3 << 20), "{s}");
    }
}

#[test]
fn remainder_is_returned() {
    assert_eq!(read_size_from_str("8Kx"), Some((8192, "x")));
    assert_eq!(read_size_from_str("12 "), Some((12, " ")));
}

#[test]
fn trailing_garbage_is_rejected() {
    let err = parse_size("8Kx").unwrap_err();
    assert!(err.contains("unexpected"));
    assert!(parse_size("").is_err());
    assert!(parse_size("-1").is_err());
}
