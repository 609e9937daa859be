use std::borrow::Cow;

use rustc_hash::FxHashMap;

const HASH_PLACEHOLDER_LEFT: &str = "!~{";
const HASH_PLACEHOLDER_RIGHT: &str = "}~";
const OVERHEAD: usize = HASH_PLACEHOLDER_LEFT.len() + HASH_PLACEHOLDER_RIGHT.len();
const DIGITS: &[u8; 64] = b"0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ-_";

/// A placeholder must hold at least one digit.
pub const MIN_HASH_LEN: usize = OVERHEAD + 1;
/// Length of an url-safe base64 xxh3-128 digest.
pub const MAX_HASH_LEN: usize = 22;

/// Hands out unique placeholders such as `!~{000}~` that have the length of the hash they
/// stand for, so replacing them keeps every column in place.
#[derive(Debug, Default)]
pub struct HashPlaceholderGenerator {
  next_index: usize,
}

impl HashPlaceholderGenerator {
  /// `None` when `len` is out of `MIN_HASH_LEN..=MAX_HASH_LEN` or too short to tell this
  /// placeholder apart from the ones generated before.
  pub fn generate(&mut self, len: usize) -> Option<String> {
    if !(MIN_HASH_LEN..=MAX_HASH_LEN).contains(&len) {
      return None;
    }
    let width = len - OVERHEAD;
    let mut digits = vec![DIGITS[0]; width];
    let mut index = self.next_index;
    for digit in digits.iter_mut().rev() {
      *digit = DIGITS[index % DIGITS.len()];
      index /= DIGITS.len();
    }
    if index != 0 {
      return None;
    }
    self.next_index += 1;

    let mut placeholder = String::with_capacity(len);
    placeholder.push_str(HASH_PLACEHOLDER_LEFT);
    placeholder.extend(digits.into_iter().map(char::from));
    placeholder.push_str(HASH_PLACEHOLDER_RIGHT);
    Some(placeholder)
  }
}

/// Every well-formed placeholder in `content`, in order of appearance.
pub fn extract_hash_placeholders(content: &str) -> Vec<&str> {
  let mut ret = vec![];
  let mut offset = 0;
  while let Some(start) = content[offset..].find(HASH_PLACEHOLDER_LEFT) {
    let start = offset + start;
    let digits_start = start + HASH_PLACEHOLDER_LEFT.len();
    let digits_len =
      content[digits_start..].bytes().take_while(|byte| DIGITS.contains(byte)).count();
    let end = digits_start + digits_len;
    if digits_len > 0 && content[end..].starts_with(HASH_PLACEHOLDER_RIGHT) {
      let end = end + HASH_PLACEHOLDER_RIGHT.len();
      ret.push(&content[start..end]);
      offset = end;
    } else {
      offset = digits_start;
    }
  }
  ret
}

/// Replaces the placeholders found in `hashes`. Unknown placeholders are left alone.
pub fn replace_placeholder_with_hash<'a>(
  content: &'a str,
  hashes: &FxHashMap<String, String>,
) -> Cow<'a, str> {
  let placeholders = extract_hash_placeholders(content);
  if placeholders.iter().all(|placeholder| !hashes.contains_key(*placeholder)) {
    return Cow::Borrowed(content);
  }

  let mut ret = String::with_capacity(content.len());
  let mut rest = content;
  for placeholder in placeholders {
    let Some(hash) = hashes.get(placeholder) else {
      continue;
    };
    let Some(start) = rest.find(placeholder) else {
      continue;
    };
    ret.push_str(&rest[..start]);
    ret.push_str(hash);
    rest = &rest[start + placeholder.len()..];
  }
  ret.push_str(rest);
  Cow::Owned(ret)
}
