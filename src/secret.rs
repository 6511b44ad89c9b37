use rand::Rng;

/// Characters a generated SECRET_KEY may contain: digits, ASCII letters and
/// a fixed punctuation set. Kept in sync with what the Django settings
/// templates expect to receive via the environment.
const KEY_ALPHABET: &[u8] =
    b"0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ.,!@#$%^&*()-_+={}";

pub const KEY_LENGTH: usize = 64;

/// Randomly generate a key suitable for a production SECRET_KEY. The value
/// goes straight into remote config, so the source must be a CSPRNG;
/// `rand::rng()` qualifies.
pub fn generate_secret_key() -> String {
    let mut rng = rand::rng();
    (0..KEY_LENGTH)
        .map(|_| KEY_ALPHABET[rng.random_range(0..KEY_ALPHABET.len())] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_is_exactly_64_characters() {
        assert_eq!(generate_secret_key().len(), KEY_LENGTH);
    }

    #[test]
    fn key_draws_only_from_the_alphabet() {
        let key = generate_secret_key();
        for ch in key.bytes() {
            assert!(
                KEY_ALPHABET.contains(&ch),
                "unexpected character in key: {:?}",
                ch as char
            );
        }
    }

    #[test]
    fn successive_keys_differ() {
        // Collision odds over an 80-character alphabet are negligible.
        assert_ne!(generate_secret_key(), generate_secret_key());
    }
}
