//! NMEA 0183 sentence encoding.
//!
//! Every sentence is framed as `$<talker><formatter>,<fields>*<checksum>\r\n`.
//! Which formatters are produced is decided by a [`SentenceFilter`]; the
//! fields come from a [`SentenceContext`] describing one vessel at one tick.
//!
//! ```
//! use nmeasim::nmea0183::{checksum, frame};
//!
//! let sentence = frame('$', "GPHDT,123.4,T");
//! assert!(checksum::verify(&sentence));
//! ```

pub mod checksum;
mod encoder;
mod format;
mod kind;

pub use checksum::{frame, MAX_SENTENCE_LEN};
pub use encoder::{SentenceContext, SentenceEncoder, DEFAULT_TALKER};
pub use kind::{SentenceFilter, SentenceKind};
