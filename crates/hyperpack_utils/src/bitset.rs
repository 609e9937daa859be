use std::fmt::{Debug, Display};

/// Fixed-size bit set, one bit per chunk anchor.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct BitSet {
  entries: Vec<u8>,
}

impl BitSet {
  pub fn new(max_bit_count: u32) -> Self {
    Self { entries: vec![0; max_bit_count.div_ceil(8) as usize] }
  }

  pub fn has_bit(&self, bit: u32) -> bool {
    self.entries.get(bit as usize / 8).is_some_and(|byte| byte & (1 << (bit & 7)) != 0)
  }

  pub fn set_bit(&mut self, bit: u32) {
    self.entries[bit as usize / 8] |= 1 << (bit & 7);
  }

  /// Both sets must have been created with the same bit count.
  pub fn union(&mut self, other: &Self) {
    for (byte, other) in self.entries.iter_mut().zip(&other.entries) {
      *byte |= other;
    }
  }

  pub fn count_ones(&self) -> u32 {
    self.entries.iter().map(|byte| byte.count_ones()).sum()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.iter().all(|byte| *byte == 0)
  }

  pub fn index_of_one(&self) -> Vec<u32> {
    let mut ret = vec![];
    for (index, &byte) in self.entries.iter().enumerate() {
      for offset in 0..8 {
        if byte & (1 << offset) != 0 {
          #[allow(clippy::cast_possible_truncation)]
          ret.push(index as u32 * 8 + offset);
        }
      }
    }
    ret
  }
}

impl Display for BitSet {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    let bits = self.entries.iter().rev().map(|byte| format!("{byte:08b}")).collect::<String>();
    f.write_str(&bits)
  }
}

impl Debug for BitSet {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_tuple("BitSet").field(&self.to_string()).finish()
  }
}

#[test]
fn test_bitset() {
  let mut bits = BitSet::new(10);
  assert!(bits.is_empty());
  bits.set_bit(0);
  bits.set_bit(9);
  assert!(bits.has_bit(9));
  assert!(!bits.has_bit(8));
  assert_eq!(bits.count_ones(), 2);
  assert_eq!(bits.index_of_one(), vec![0, 9]);
  assert_eq!(bits.to_string(), "0000001000000001");

  let mut other = BitSet::new(10);
  other.set_bit(3);
  other.union(&bits);
  assert_eq!(other.index_of_one(), vec![0, 3, 9]);
}
