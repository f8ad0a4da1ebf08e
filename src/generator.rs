use rand::Rng;

/// Generates the target sequence for one round: exactly `digits` characters,
/// each independently uniform over '0'..='9'. A zero count yields the empty
/// string, which later phases treat as a degraded-but-valid target.
pub fn generate(digits: usize) -> String {
    generate_with(&mut rand::thread_rng(), digits)
}

/// Same as [`generate`] but with an injected source of randomness, so tests
/// can pin the output with a seeded rng.
pub fn generate_with<R: Rng>(rng: &mut R, digits: usize) -> String {
    (0..digits)
        .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_generates_exact_length() {
        for digits in 1..=16 {
            let sequence = generate(digits);
            assert_eq!(sequence.len(), digits);
        }
    }

    #[test]
    fn test_all_characters_are_digits() {
        let sequence = generate(200);
        assert!(sequence.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_zero_digits_yields_empty_string() {
        assert_eq!(generate(0), "");
    }

    #[test]
    fn test_seeded_generation_is_deterministic() {
        let a = generate_with(&mut StdRng::seed_from_u64(42), 10);
        let b = generate_with(&mut StdRng::seed_from_u64(42), 10);
        assert_eq!(a, b);
        assert_eq!(a.len(), 10);
    }

    #[test]
    fn test_every_digit_appears_eventually() {
        // 1000 uniform draws miss a given digit with probability ~2e-46
        let sequence = generate(1000);
        for d in '0'..='9' {
            assert!(sequence.contains(d), "digit {} never generated", d);
        }
    }
}
