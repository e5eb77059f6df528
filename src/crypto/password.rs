//! Human-readable random password generator.
//!
//! A password is built from letters first; digits and then symbols are
//! inserted one at a time at uniformly random positions.

use rand::Rng;

const LETTERS: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";
const SYMBOLS: &[u8] = b"!<>[]{}()=+-_!@#$%^&*.,?/;:'\"\\";
const DIGITS: &[u8] = b"0123456789";

/// Generate a password of `length` characters containing `digits` digits
/// and `symbols` symbols.
///
/// Digits are capped at `length`; symbols get whatever room is left after
/// digits and letters, so the result is never longer than `length`.
pub fn generate(length: usize, digits: usize, symbols: usize) -> String {
    let letter_count = length.saturating_sub(digits).saturating_sub(symbols);
    let digit_count = digits.min(length);
    let symbol_count = length.saturating_sub(digit_count).saturating_sub(letter_count);

    let mut rng = rand::rng();
    let mut password = pick(&mut rng, LETTERS, letter_count);
    let digit_chars = pick(&mut rng, DIGITS, digit_count);
    merge(&mut rng, &mut password, &digit_chars);
    let symbol_chars = pick(&mut rng, SYMBOLS, symbol_count);
    merge(&mut rng, &mut password, &symbol_chars);

    // Every byte came from an ASCII table.
    password.into_iter().map(char::from).collect()
}

fn pick<R: Rng>(rng: &mut R, chars: &[u8], n: usize) -> Vec<u8> {
    (0..n)
        .map(|_| chars[rng.random_range(0..chars.len())])
        .collect()
}

fn merge<R: Rng>(rng: &mut R, into: &mut Vec<u8>, extra: &[u8]) {
    for &c in extra {
        let pos = rng.random_range(0..=into.len());
        into.insert(pos, c);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count(password: &str, table: &[u8]) -> usize {
        password.bytes().filter(|b| table.contains(b)).count()
    }

    #[test]
    fn default_shape() {
        let pw = generate(20, 0, 0);
        assert_eq!(pw.len(), 20);
        assert_eq!(count(&pw, LETTERS), 20);
    }

    #[test]
    fn mixes_in_digits_and_symbols() {
        let pw = generate(20, 3, 2);
        assert_eq!(pw.len(), 20);
        assert_eq!(count(&pw, DIGITS), 3);
        assert_eq!(count(&pw, SYMBOLS), 2);
        assert_eq!(count(&pw, LETTERS), 15);
    }

    #[test]
    fn digits_are_capped_at_length() {
        let pw = generate(4, 10, 0);
        assert_eq!(pw.len(), 4);
        assert_eq!(count(&pw, DIGITS), 4);
    }

    #[test]
    fn symbols_fill_remaining_room_only() {
        let pw = generate(5, 2, 10);
        assert_eq!(pw.len(), 5);
        assert_eq!(count(&pw, DIGITS), 2);
        assert_eq!(count(&pw, SYMBOLS), 3);
    }

    #[test]
    fn zero_length_is_empty() {
        assert_eq!(generate(0, 0, 0), "");
    }
}
