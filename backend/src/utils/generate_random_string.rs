use rand::{Rng, distributions::Alphanumeric};

/// Generates a random alphanumeric string of the specified length.
///
/// The generated string contains uppercase letters (A-Z), lowercase letters (a-z),
/// and digits (0-9). `thread_rng` is a cryptographically secure generator, so
/// the output is suitable for one-time verification and reset tokens.
///
/// # Arguments
///
/// * `length` - The desired length of the generated string
pub fn generate_random_string(length: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generates_requested_length() {
        assert_eq!(generate_random_string(48).len(), 48);
        assert_eq!(generate_random_string(0).len(), 0);
    }

    #[test]
    fn test_output_is_alphanumeric_and_unique() {
        let first = generate_random_string(48);
        let second = generate_random_string(48);
        assert!(first.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(first, second);
    }
}
