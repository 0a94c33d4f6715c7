//! Filler length derivation.
//!
//! The number of filler units in front of a password is recomputed from the
//! key and the label on every recovery; it is never stored.
//!
//! # Properties
//!
//! - Pure: no RNG, no clock, no process state
//! - Order-insensitive: only the sums of the character codes matter, so
//!   permuting the characters of the key (or the label) gives the same value
//! - Unbounded: the value may exceed the size of the stored payload

/// Sum of the Unicode scalar values of every character in `s`.
#[must_use]
pub fn code_sum(s: &str) -> u64 {
    s.chars().map(|c| u64::from(u32::from(c))).sum()
}

/// Number of filler units preceding the password: `sum(key) XOR sum(label)`.
///
/// Must stay bit-for-bit identical across versions, existing cards are
/// located with it.
#[must_use]
pub fn trash_length(key: &str, label: &str) -> u64 {
    code_sum(key) ^ code_sum(label)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_characters_xor() {
        // 'x' = 120, 'y' = 121
        assert_eq!(trash_length("x", "y"), 1);
    }

    #[test]
    fn test_equal_sums_give_zero() {
        assert_eq!(trash_length("ab", "ab"), 0);
        assert_eq!(trash_length("ab", "ba"), 0);
    }

    #[test]
    fn test_permuted_key_same_offset() {
        let label = "bank";
        assert_eq!(trash_length("hunter2", label), trash_length("2hunter", label));
        assert_eq!(trash_length("hunter2", label), trash_length("rethnu2", label));
    }

    #[test]
    fn test_empty_label_is_key_sum() {
        assert_eq!(trash_length("abc", ""), 97 + 98 + 99);
    }

    #[test]
    fn test_non_ascii_uses_scalar_values() {
        // 'é' = 233, '€' = 8364
        assert_eq!(code_sum("é€"), 233 + 8364);
        assert_eq!(trash_length("é", "€"), 233 ^ 8364);
    }

    #[test]
    fn test_repeated_calls_agree() {
        let first = trash_length("correct horse", "mail");
        for _ in 0..10 {
            assert_eq!(trash_length("correct horse", "mail"), first);
        }
    }
}
