//! Domain module for the Memo Codec
//!
//! Pure chunking, reassembly and amount distribution. No I/O.

pub mod chunk_id;
pub mod chunking;
pub mod distribution;
pub mod errors;

pub use chunk_id::{parse_chunk, ChunkHeader, ChunkIdentifier, ChunkParse};
pub use chunking::{
    decode_chunks, encode_chunks, BundleStatus, ChunkPiece, DecodeReport, MalformedChunk,
    MessageBundle, OutboundChunk, CHUNKED_MEMO_FORMAT,
};
pub use distribution::{distribute_amount, DistributionPolicy};
pub use errors::{ChunkParseError, CodecError};
