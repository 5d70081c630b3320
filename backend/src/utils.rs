/// FNV-1a over a sequence of byte chunks.
///
/// Used to seed generators from domain data; unlike `DefaultHasher` the
/// result is fixed across Rust releases and platforms.
pub fn stable_seed<'a, I>(chunks: I) -> u64
where
    I: IntoIterator<Item = &'a [u8]>,
{
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for chunk in chunks {
        for &byte in chunk {
            hash ^= byte as u64;
            hash = hash.wrapping_mul(0x0100_0000_01b3);
        }
        // Chunk separator so ["ab", "c"] and ["a", "bc"] differ
        hash ^= 0xff;
        hash = hash.wrapping_mul(0x0100_0000_01b3);
    }
    hash
}

/// SKU ids end up in upstream URL paths, so keep them to a safe alphabet.
pub fn validate_sku_id(raw: &str) -> Result<&str, String> {
    let sku = raw.trim();
    if sku.is_empty() {
        return Err("SKU ID parameter is required".to_string());
    }
    if sku.len() > 64 {
        return Err(format!("SKU ID too long ({} chars, max 64)", sku.len()));
    }
    if !sku.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')) {
        return Err(format!("Invalid SKU ID '{}'", sku));
    }
    Ok(sku)
}
