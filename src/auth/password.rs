use argon2::Argon2;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use thiserror::Error;

#[derive(Error, Debug)]
#[error("Failed to hash password: {0}")]
pub struct PasswordHashError(argon2::password_hash::Error);

pub fn hash_password(password: &str) -> Result<String, PasswordHashError> {
	let salt = SaltString::generate(&mut OsRng);
	Argon2::default()
		.hash_password(password.as_bytes(), &salt)
		.map(|password_hash| password_hash.to_string())
		.map_err(PasswordHashError)
}

/// Returns `false` both for a wrong password and for an unparseable stored hash.
pub fn verify_password(password: &str, password_hash: &str) -> bool {
	let Ok(parsed_hash) = PasswordHash::new(password_hash) else {
		return false;
	};

	Argon2::default().verify_password(password.as_bytes(), &parsed_hash).is_ok()
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn should_verify_a_hashed_password() {
		let password_hash = hash_password("secret1").expect("Failed to hash password");

		assert!(verify_password("secret1", &password_hash));
	}

	#[test]
	fn should_reject_a_wrong_password() {
		let password_hash = hash_password("secret1").expect("Failed to hash password");

		assert!(!verify_password("secret2", &password_hash));
	}

	#[test]
	fn should_reject_an_unparseable_hash() {
		assert!(!verify_password("secret1", "not a phc string"));
	}

	#[test]
	fn should_salt_hashes() {
		let first = hash_password("secret1").expect("Failed to hash password");
		let second = hash_password("secret1").expect("Failed to hash password");

		assert_ne!(first, second);
	}
}
