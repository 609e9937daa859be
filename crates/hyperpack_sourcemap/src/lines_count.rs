use memchr::{memmem, memrchr};

#[inline]
pub fn lines_count(str: &str) -> u32 {
  u32::try_from(memmem::find_iter(str.as_bytes(), "\n").count()).unwrap_or(u32::MAX)
}

/// Line and UTF-16 column of the position right after `str`.
pub fn end_position(str: &str) -> (u32, u32) {
  let last_line = memrchr(b'\n', str.as_bytes()).map_or(str, |index| &str[index + 1..]);
  (lines_count(str), u32::try_from(last_line.encode_utf16().count()).unwrap_or(u32::MAX))
}

#[test]
fn test() {
  assert_eq!(lines_count("a\nb\nc"), 2);
  assert_eq!(lines_count("a\nb\nc\n"), 3);
  assert_eq!(lines_count("a"), 0);

  assert_eq!(end_position(""), (0, 0));
  assert_eq!(end_position("ab"), (0, 2));
  assert_eq!(end_position("a\nbcd"), (1, 3));
  assert_eq!(end_position("a\n"), (1, 0));
  assert_eq!(end_position("\"😀\""), (0, 4));
}
