//! Random password generation under a character-class policy.
//!
//! Generation is a pure function of the policy plus a random source. The
//! default entry point draws from the thread-local CSPRNG (reseeded from
//! the OS), so two calls with the same policy produce independent outputs.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::errors::{PassKeeperError, Result};

const LOWERCASE: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
const UPPERCASE: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const DIGITS: &[u8] = b"0123456789";
const SYMBOLS: &[u8] = b"!@#$%^&*()_+-=[]{}|;:,.<>?";

/// Shortest password the generator will produce.
pub const MIN_LENGTH: usize = 1;

/// Longest password the generator will produce.
pub const MAX_LENGTH: usize = 128;

/// Which character classes to draw from, and how many characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeneratorPolicy {
    pub length: usize,
    pub lowercase: bool,
    pub uppercase: bool,
    pub digits: bool,
    pub symbols: bool,
}

impl Default for GeneratorPolicy {
    fn default() -> Self {
        Self {
            length: 16,
            lowercase: true,
            uppercase: true,
            digits: true,
            symbols: true,
        }
    }
}

impl GeneratorPolicy {
    /// The command-surface form: lowercase letters are always included.
    pub fn new(length: usize, use_uppercase: bool, use_numbers: bool, use_symbols: bool) -> Self {
        Self {
            length,
            lowercase: true,
            uppercase: use_uppercase,
            digits: use_numbers,
            symbols: use_symbols,
        }
    }

    fn classes(&self) -> Vec<&'static [u8]> {
        let mut classes = Vec::with_capacity(4);
        if self.lowercase {
            classes.push(LOWERCASE);
        }
        if self.uppercase {
            classes.push(UPPERCASE);
        }
        if self.digits {
            classes.push(DIGITS);
        }
        if self.symbols {
            classes.push(SYMBOLS);
        }
        classes
    }

    /// Check the policy without generating anything.
    pub fn validate(&self) -> Result<()> {
        if !(MIN_LENGTH..=MAX_LENGTH).contains(&self.length) {
            return Err(PassKeeperError::InvalidLength {
                length: self.length,
                min: MIN_LENGTH,
                max: MAX_LENGTH,
            });
        }
        if !(self.lowercase || self.uppercase || self.digits || self.symbols) {
            return Err(PassKeeperError::EmptyCharacterPool);
        }
        Ok(())
    }

    /// Returns `true` if `c` belongs to one of the enabled classes.
    pub fn allows(&self, c: char) -> bool {
        c.is_ascii() && self.classes().iter().any(|class| class.contains(&(c as u8)))
    }
}

/// Generate a password from fresh OS-seeded randomness.
pub fn generate(policy: &GeneratorPolicy) -> Result<String> {
    generate_with(policy, &mut rand::rng())
}

/// Generate a password from the given random source.
///
/// When the length allows it, every enabled class contributes at least one
/// character; the rest are drawn uniformly from the combined pool and the
/// result is shuffled so class order is not predictable.
pub fn generate_with<R: Rng>(policy: &GeneratorPolicy, rng: &mut R) -> Result<String> {
    policy.validate()?;

    let classes = policy.classes();
    let pool: Vec<u8> = classes.iter().flat_map(|c| c.iter().copied()).collect();

    let mut out: Vec<u8> = Vec::with_capacity(policy.length);
    if policy.length >= classes.len() {
        for class in &classes {
            out.push(class[rng.random_range(0..class.len())]);
        }
    }
    while out.len() < policy.length {
        out.push(pool[rng.random_range(0..pool.len())]);
    }
    out.shuffle(rng);

    String::from_utf8(out)
        .map_err(|_| PassKeeperError::SerializationError("generated password is not ASCII".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn respects_length_and_classes() {
        let policy = GeneratorPolicy {
            length: 24,
            ..GeneratorPolicy::default()
        };
        let s = generate(&policy).unwrap();
        assert_eq!(s.len(), 24);
        assert!(s.chars().any(|c| c.is_ascii_lowercase()));
        assert!(s.chars().any(|c| c.is_ascii_uppercase()));
        assert!(s.chars().any(|c| c.is_ascii_digit()));
        assert!(s.chars().any(|c| !c.is_ascii_alphanumeric()));
        assert!(s.chars().all(|c| policy.allows(c)));
    }

    #[test]
    fn digits_only_policy() {
        let policy = GeneratorPolicy {
            length: 12,
            lowercase: false,
            uppercase: false,
            digits: true,
            symbols: false,
        };
        let s = generate(&policy).unwrap();
        assert_eq!(s.len(), 12);
        assert!(s.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn command_form_keeps_lowercase() {
        let policy = GeneratorPolicy::new(10, false, false, false);
        let s = generate(&policy).unwrap();
        assert_eq!(s.len(), 10);
        assert!(s.chars().all(|c| c.is_ascii_lowercase()));
    }

    #[test]
    fn empty_pool_rejected() {
        let policy = GeneratorPolicy {
            length: 16,
            lowercase: false,
            uppercase: false,
            digits: false,
            symbols: false,
        };
        assert!(matches!(
            generate(&policy),
            Err(PassKeeperError::EmptyCharacterPool)
        ));
    }

    #[test]
    fn length_bounds_enforced() {
        let mut policy = GeneratorPolicy::default();
        policy.length = 0;
        assert!(matches!(
            generate(&policy),
            Err(PassKeeperError::InvalidLength { length: 0, .. })
        ));
        policy.length = MAX_LENGTH + 1;
        assert!(generate(&policy).is_err());
        policy.length = MAX_LENGTH;
        assert_eq!(generate(&policy).unwrap().len(), MAX_LENGTH);
    }

    #[test]
    fn shorter_than_class_count_still_works() {
        let policy = GeneratorPolicy {
            length: 1,
            ..GeneratorPolicy::default()
        };
        let s = generate(&policy).unwrap();
        assert_eq!(s.len(), 1);
        assert!(policy.allows(s.chars().next().unwrap()));
    }

    #[test]
    fn consecutive_draws_differ() {
        let policy = GeneratorPolicy {
            length: 32,
            ..GeneratorPolicy::default()
        };
        let a = generate(&policy).unwrap();
        let b = generate(&policy).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn seeded_source_is_reproducible() {
        let policy = GeneratorPolicy::default();
        let a = generate_with(&policy, &mut StdRng::seed_from_u64(7)).unwrap();
        let b = generate_with(&policy, &mut StdRng::seed_from_u64(7)).unwrap();
        assert_eq!(a, b);
    }
}
