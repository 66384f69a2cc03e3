use rand::RngCore;

/// Opaque action token: 32 random bytes, hex-encoded. Carries no claims;
/// validity is decided purely by database lookup, so clearing the stored
/// column revokes it.
pub fn generate_action_token() -> String {
    let mut bytes = [0u8; 32];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    let mut out = String::with_capacity(64);
    for b in bytes {
        out.push_str(&format!("{b:02x}"));
    }
    out
}
