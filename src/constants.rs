//! Codec limits and wire-level constants.
//!
//! The limits bound how much work a hostile or corrupt input can cause; the
//! literal constants describe the textual form used for dictionary keys that
//! are not valid UTF-8.

// ============================================================================
// Decoder limits
// ============================================================================

/// Default maximum nesting depth of lists and dictionaries.
pub const MAX_DEPTH: usize = 64;

/// Longest integer or length literal accepted, in bytes.
///
/// `i64::MIN` needs 20 bytes; anything longer cannot be a valid literal.
pub const MAX_LITERAL_LEN: usize = 20;

// ============================================================================
// Streaming
// ============================================================================

/// Default cap on the size of a single value read from an async stream.
pub const MAX_VALUE_SIZE: usize = 16 * 1024 * 1024;

/// Initial capacity of the async stream read buffer.
pub const STREAM_BUFFER_CAPACITY: usize = 32 * 1024;

// ============================================================================
// Raw dictionary keys
// ============================================================================

/// Opening of the textual form of a non-UTF-8 dictionary key.
pub const RAW_KEY_PREFIX: &str = "RawBytes[";

/// Closing of the textual form of a non-UTF-8 dictionary key.
pub const RAW_KEY_SUFFIX: &str = "]";

/// Separator between byte values in a raw key literal.
pub const RAW_KEY_SEPARATOR: char = ',';
