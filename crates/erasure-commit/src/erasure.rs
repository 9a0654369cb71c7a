use eds_primitives::Chunk;
use eyre::{ensure, eyre, Result};
use reed_solomon_novelpoly::{CodeParams, WrappedShard};

/// The number of bytes in a GF(2^16) symbol
const SYMBOL_BYTES: usize = 2;

/// The erasure code applied along every row and column of the square.
///
/// An axis of width `2k` holds `k` original chunks followed by `k` parity
/// chunks. Implementations must be deterministic: the parity of a given set of
/// chunks is always the same, and a successful decode returns exactly the
/// chunks that were originally encoded.
pub trait Codec {
    /// Produce the `k` parity chunks for `k` original chunks.
    fn encode(&self, data: &[Chunk]) -> Result<Vec<Chunk>>;
    /// Recover the `k` original chunks of an axis of `2k` shares, where unknown
    /// shares are `None`. Fails if fewer than `k` shares are known.
    fn decode(&self, shares: &[Option<Chunk>]) -> Result<Vec<Chunk>>;
    /// The maximum number of original chunks supported in a square.
    fn max_chunks(&self) -> usize;
}

/// Check the shape shared by every codec: a non-empty set of equally sized,
/// non-empty chunks.
fn chunk_size(data: &[Chunk]) -> Result<usize> {
    let size = data
        .first()
        .map(Vec::len)
        .ok_or_else(|| eyre!("cannot encode an empty axis"))?;
    ensure!(size > 0, "cannot encode zero-length chunks");
    ensure!(
        data.iter().all(|c| c.len() == size),
        "chunks have mismatching sizes"
    );
    Ok(size)
}

fn known_chunk_size(shares: &[Option<Chunk>]) -> Result<usize> {
    let size = shares
        .iter()
        .flatten()
        .map(Vec::len)
        .next()
        .ok_or_else(|| eyre!("no shares to decode from"))?;
    ensure!(
        shares.iter().flatten().all(|c| c.len() == size),
        "shares have mismatching sizes"
    );
    Ok(size)
}

/// A reed-solomon codec over GF(2^16), backed by `reed-solomon-novelpoly`.
///
/// The axis width must be a power of two and chunks must be a whole number
/// of 16 bit symbols.
#[derive(Debug, Clone, Copy, Default)]
pub struct NovelPolyCodec;

impl NovelPolyCodec {
    /// Largest supported axis of original chunks
    pub const MAX_ORIGINAL_WIDTH: usize = 32768;

    fn code_params(shards: usize) -> Result<CodeParams> {
        ensure!(
            shards >= 2 && shards.is_power_of_two(),
            "axis width {} is not a power of two",
            shards
        );
        Ok(CodeParams::derive_parameters(shards, shards / 2)?)
    }

    /// Spread the chunks over a message so that, once encoded, shard `i` is
    /// exactly chunk `i`. Each encoding run consumes one symbol of every chunk.
    fn interleave(data: &[Chunk], chunk_size: usize) -> Vec<u8> {
        let mut message = Vec::with_capacity(data.len() * chunk_size);
        for offset in (0..chunk_size).step_by(SYMBOL_BYTES) {
            for chunk in data {
                message.extend_from_slice(&chunk[offset..offset + SYMBOL_BYTES]);
            }
        }
        message
    }

    fn deinterleave(message: &[u8], k: usize, chunk_size: usize) -> Vec<Chunk> {
        let mut chunks = vec![Vec::with_capacity(chunk_size); k];
        for (i, symbol) in message.chunks_exact(SYMBOL_BYTES).enumerate() {
            chunks[i % k].extend_from_slice(symbol);
        }
        chunks
    }
}

impl Codec for NovelPolyCodec {
    fn encode(&self, data: &[Chunk]) -> Result<Vec<Chunk>> {
        let size = chunk_size(data)?;
        ensure!(
            size % SYMBOL_BYTES == 0,
            "chunk size {} is not a multiple of {}",
            size,
            SYMBOL_BYTES
        );
        let k = data.len();
        let rs = Self::code_params(k * 2)?.make_encoder();

        let shards: Vec<WrappedShard> = rs.encode(&Self::interleave(data, size))?;
        let parity: Vec<Chunk> = shards
            .into_iter()
            .skip(k)
            .map(WrappedShard::into_inner)
            .collect();
        ensure!(
            parity.len() == k && parity.iter().all(|p| p.len() == size),
            "unexpected parity shape"
        );
        Ok(parity)
    }

    fn decode(&self, shares: &[Option<Chunk>]) -> Result<Vec<Chunk>> {
        let size = known_chunk_size(shares)?;
        ensure!(
            size % SYMBOL_BYTES == 0,
            "chunk size {} is not a multiple of {}",
            size,
            SYMBOL_BYTES
        );
        let k = shares.len() / 2;
        let rs = Self::code_params(shares.len())?.make_encoder();

        let received: Vec<Option<WrappedShard>> = shares
            .iter()
            .map(|s| s.clone().map(WrappedShard::from))
            .collect();
        let message = rs.reconstruct(received)?;
        ensure!(
            message.len() >= k * size,
            "reconstructed {} bytes, expected {}",
            message.len(),
            k * size
        );
        Ok(Self::deinterleave(&message[..k * size], k, size))
    }

    fn max_chunks(&self) -> usize {
        Self::MAX_ORIGINAL_WIDTH * Self::MAX_ORIGINAL_WIDTH
    }
}

/// A reed-solomon codec over GF(2^8), backed by `reed-solomon-erasure`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Rsgf8Codec;

impl Rsgf8Codec {
    /// Largest supported axis of original chunks, GF(2^8) allows 256 shards
    pub const MAX_ORIGINAL_WIDTH: usize = 128;

    fn encoder(k: usize) -> Result<reed_solomon_erasure::galois_8::ReedSolomon> {
        Ok(reed_solomon_erasure::galois_8::ReedSolomon::new(k, k)?)
    }
}

impl Codec for Rsgf8Codec {
    fn encode(&self, data: &[Chunk]) -> Result<Vec<Chunk>> {
        let size = chunk_size(data)?;
        let rs = Self::encoder(data.len())?;
        let mut parity = vec![vec![0u8; size]; data.len()];
        rs.encode_sep(data, &mut parity[..])?;
        Ok(parity)
    }

    fn decode(&self, shares: &[Option<Chunk>]) -> Result<Vec<Chunk>> {
        known_chunk_size(shares)?;
        let k = shares.len() / 2;
        let rs = Self::encoder(k)?;
        let mut shards = shares.to_vec();
        rs.reconstruct_data(&mut shards[..])?;
        shards
            .into_iter()
            .take(k)
            .map(|s| s.ok_or_else(|| eyre!("data shard missing after reconstruction")))
            .collect()
    }

    fn max_chunks(&self) -> usize {
        Self::MAX_ORIGINAL_WIDTH * Self::MAX_ORIGINAL_WIDTH
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    const CHUNK_SIZE: usize = 8;

    fn test_chunks(n: usize, seed: u64) -> Vec<Chunk> {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..n)
            .map(|_| (0..CHUNK_SIZE).map(|_| rng.gen::<u8>()).collect())
            .collect()
    }

    fn erase(data: &[Chunk], parity: &[Chunk], missing: &[usize]) -> Vec<Option<Chunk>> {
        data.iter()
            .chain(parity.iter())
            .enumerate()
            .map(|(i, c)| (!missing.contains(&i)).then(|| c.clone()))
            .collect()
    }

    fn assert_recovers(codec: &dyn Codec, k: usize) {
        let data = test_chunks(k, k as u64);
        let parity = codec.encode(&data).unwrap();
        assert_eq!(parity.len(), k);
        parity.iter().for_each(|p| assert_eq!(p.len(), CHUNK_SIZE));

        // Only parity known
        let shares = erase(&data, &parity, &(0..k).collect::<Vec<_>>());
        assert_eq!(codec.decode(&shares).unwrap(), data);

        // Every other share known
        let missing: Vec<usize> = (0..2 * k).step_by(2).collect();
        let shares = erase(&data, &parity, &missing);
        assert_eq!(codec.decode(&shares).unwrap(), data);
    }

    #[test]
    fn test_novelpoly_recover() {
        for k in [2, 4, 16] {
            assert_recovers(&NovelPolyCodec, k);
        }
    }

    #[test]
    fn test_rsgf8_recover() {
        for k in [1, 2, 3, 16] {
            assert_recovers(&Rsgf8Codec, k);
        }
    }

    #[test]
    fn test_insufficient_shares() {
        let data = test_chunks(4, 1);
        for codec in [&NovelPolyCodec as &dyn Codec, &Rsgf8Codec] {
            let parity = codec.encode(&data).unwrap();
            let shares = erase(&data, &parity, &[0, 2, 4, 5, 7]);
            assert!(codec.decode(&shares).is_err());
        }
    }

    #[test]
    fn test_novelpoly_rejects_bad_shapes() {
        // Odd symbol size
        assert!(NovelPolyCodec.encode(&[vec![1, 2, 3], vec![4, 5, 6]]).is_err());
        // Axis of 6 is not a power of two
        assert!(NovelPolyCodec.encode(&test_chunks(3, 2)).is_err());
        assert!(Rsgf8Codec.encode(&test_chunks(3, 2)).is_ok());
    }

    #[test]
    fn test_uneven_chunks() {
        let data = vec![vec![0u8; 4], vec![0u8; 6]];
        assert!(NovelPolyCodec.encode(&data).is_err());
        assert!(Rsgf8Codec.encode(&data).is_err());
        assert!(Rsgf8Codec.encode(&[]).is_err());
    }

    #[test]
    fn test_max_chunks() {
        assert_eq!(Rsgf8Codec.max_chunks(), 128 * 128);
        assert_eq!(NovelPolyCodec.max_chunks(), 32768 * 32768);
    }
}
