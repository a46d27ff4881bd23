//! Match id generation.
//!
//! Match ids are short strings over Crockford's Base32 alphabet, so they can
//! be read aloud and typed without ambiguity.

use rand::Rng;

const CROCKFORD: &[u8] = b"0123456789ABCDEFGHJKMNPQRSTVWXYZ"; // no I, L, O, U

/// Generate a random match id of `len` characters.
///
/// # Example
/// ```
/// use durak_backend::utils::match_id::generate_match_id;
///
/// let id = generate_match_id(&mut rand::rng(), 6);
/// assert_eq!(id.len(), 6);
/// ```
pub fn generate_match_id<R: Rng + ?Sized>(rng: &mut R, len: usize) -> String {
    let mut s = String::with_capacity(len);
    for _ in 0..len {
        s.push(CROCKFORD[rng.random_range(0..CROCKFORD.len())] as char);
    }
    s
}

/// True if `id` only uses the match id alphabet.
pub fn is_valid_match_id(id: &str) -> bool {
    !id.is_empty() && id.bytes().all(|b| CROCKFORD.contains(&b))
}
