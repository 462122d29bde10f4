/// Authentication and authorization utilities
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and complexity checks
/// - [`jwt`]: Session token generation and validation (HS256, 1-day expiry)
/// - [`context`]: Authenticated request context carried through handlers
/// - [`policy`]: The single task access-control decision point
///
/// # Example
///
/// ```no_run
/// use planboard_shared::auth::password::{hash_password, verify_password};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("user_password")?;
/// assert!(verify_password("user_password", &hash)?);
/// # Ok(())
/// # }
/// ```

pub mod context;
pub mod jwt;
pub mod password;
pub mod policy;
