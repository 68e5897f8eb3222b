//! Policy-compliant password generation.
//!
//! Every password is 25 characters long and holds at least two symbols, two
//! upper-case letters, two lower-case letters and two digits. The mandatory
//! characters are mixed with random fill and the whole is shuffled, so their
//! positions carry no information.

use rand::rngs::OsRng;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::domain::SecretString;

pub const PASSWORD_LENGTH: usize = 25;

/// Minimum count of each character class.
pub const MIN_PER_CLASS: usize = 2;

pub const SYMBOLS: &[u8] = b"!#%}";
pub const UPPERCASE: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
pub const LOWERCASE: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
pub const DIGITS: &[u8] = b"0123456789";

const CLASSES: [&[u8]; 4] = [SYMBOLS, UPPERCASE, LOWERCASE, DIGITS];

/// Generates passwords from the operating system RNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct PasswordGenerator;

impl PasswordGenerator {
    pub fn new() -> Self {
        Self
    }

    pub fn generate(&self) -> SecretString {
        let mut rng = OsRng;
        let mut chars: Vec<u8> = Vec::with_capacity(PASSWORD_LENGTH);

        for class in CLASSES {
            for _ in 0..MIN_PER_CLASS {
                chars.push(pick(&mut rng, class));
            }
        }

        let union: Vec<u8> = CLASSES.concat();
        while chars.len() < PASSWORD_LENGTH {
            chars.push(pick(&mut rng, &union));
        }

        chars.shuffle(&mut rng);
        SecretString::new(chars.into_iter().map(char::from).collect::<String>())
    }

    /// `count` independent passwords.
    pub fn generate_batch(&self, count: usize) -> Vec<SecretString> {
        (0..count).map(|_| self.generate()).collect()
    }
}

fn pick<R: Rng>(rng: &mut R, alphabet: &[u8]) -> u8 {
    alphabet[rng.gen_range(0..alphabet.len())]
}
