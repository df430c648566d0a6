use xxhash_rust::xxh3::Xxh3;

const XXH3_SEED: u64 = 0x51f1_c0de_7a3b_9e21;

/// Seeded xxh3 hasher with explicit little-endian encodings.
///
/// Used for content keys (glyph shapes, decoded images, generated font names) that must not
/// depend on process-local hashing state.
pub(crate) struct StableHasher {
    inner: Xxh3,
}

impl StableHasher {
    pub(crate) fn new() -> Self {
        Self {
            inner: Xxh3::with_seed(XXH3_SEED),
        }
    }

    pub(crate) fn write_bytes(&mut self, b: &[u8]) {
        self.inner.update(b);
    }

    pub(crate) fn write_u8(&mut self, v: u8) {
        self.write_bytes(&[v]);
    }

    pub(crate) fn write_u32(&mut self, v: u32) {
        self.write_bytes(&v.to_le_bytes());
    }

    pub(crate) fn write_u64(&mut self, v: u64) {
        self.write_bytes(&v.to_le_bytes());
    }

    pub(crate) fn write_f64(&mut self, v: f64) {
        // -0.0 and 0.0 compare equal, hash them equally too.
        let v = if v == 0.0 { 0.0 } else { v };
        self.write_u64(v.to_bits());
    }

    pub(crate) fn finish(self) -> u64 {
        self.inner.digest()
    }
}
