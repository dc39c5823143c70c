/// Password hashing and verification, bcrypt with a cost factor of 8.
///
/// The cost is part of the stored-data contract: existing rows carry cost-8
/// hashes and `verificar` must keep accepting them. Both functions run the
/// bcrypt work under `spawn_blocking` so request handlers yield instead of
/// stalling a runtime worker on the key derivation.
pub const COSTO_BCRYPT: u32 = 8;

/// Hashes a plaintext password. Returns the bcrypt MCF string stored in the
/// `password` column.
pub async fn hash(plano: &str) -> Result<String, String> {
    let plano = plano.to_owned();
    tokio::task::spawn_blocking(move || bcrypt::hash(plano, COSTO_BCRYPT))
        .await
        .map_err(|e| format!("hash task failed: {}", e))?
        .map_err(|e| format!("bcrypt hash failed: {}", e))
}

/// Checks a plaintext password against a stored hash. `Ok(false)` is a
/// mismatch; `Err` means the stored hash is malformed.
pub async fn verificar(plano: &str, hash: &str) -> Result<bool, String> {
    let plano = plano.to_owned();
    let hash = hash.to_owned();
    tokio::task::spawn_blocking(move || bcrypt::verify(plano, &hash))
        .await
        .map_err(|e| format!("verify task failed: {}", e))?
        .map_err(|e| format!("bcrypt verify failed: {}", e))
}
