// Output formatting module
// Renders raw digest bytes as raw, hex or base64 with an optional algorithm prefix

use std::fmt;
use std::str::FromStr;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use super::error::HashError;

/// Wire representation of a digest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Raw,
    #[default]
    Hex,
    Base64,
}

impl OutputFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            OutputFormat::Raw => "raw",
            OutputFormat::Hex => "hex",
            OutputFormat::Base64 => "base64",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = HashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "raw" => Ok(OutputFormat::Raw),
            "hex" => Ok(OutputFormat::Hex),
            "base64" => Ok(OutputFormat::Base64),
            _ => Err(HashError::InvalidFormat {
                format: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-call hashing options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Options {
    pub format: OutputFormat,
    pub prefix: bool,
    /// Worker threads for batch calls, 0 means one per available CPU
    pub workers: usize,
    pub buffer_size: usize,
}

pub const DEFAULT_BUFFER_SIZE: usize = 64 * 1024;

impl Default for Options {
    fn default() -> Self {
        Self {
            format: OutputFormat::Hex,
            prefix: false,
            workers: 0,
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }
}

/// A digest rendered in one of the wire formats
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormattedDigest {
    Raw(Vec<u8>),
    Hex(String),
    Base64(String),
}

impl FormattedDigest {
    /// Bytes as they go on the wire
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            FormattedDigest::Raw(bytes) => bytes,
            FormattedDigest::Hex(text) | FormattedDigest::Base64(text) => text.as_bytes(),
        }
    }

    /// Text form, None for raw digests
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FormattedDigest::Raw(_) => None,
            FormattedDigest::Hex(text) | FormattedDigest::Base64(text) => Some(text),
        }
    }

    pub fn format(&self) -> OutputFormat {
        match self {
            FormattedDigest::Raw(_) => OutputFormat::Raw,
            FormattedDigest::Hex(_) => OutputFormat::Hex,
            FormattedDigest::Base64(_) => OutputFormat::Base64,
        }
    }
}

// Raw digests have no text form; show them as hex when printed
impl fmt::Display for FormattedDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormattedDigest::Raw(bytes) => f.write_str(&hex::encode(bytes)),
            FormattedDigest::Hex(text) | FormattedDigest::Base64(text) => f.write_str(text),
        }
    }
}

/// Encode digest bytes as text (raw is treated as hex)
pub fn encode(bytes: &[u8], format: OutputFormat) -> String {
    match format {
        OutputFormat::Base64 => STANDARD.encode(bytes),
        OutputFormat::Hex | OutputFormat::Raw => hex::encode(bytes),
    }
}

/// Render digest bytes according to the options
///
/// The prefix applies to text formats only; raw output is always the digest
/// bytes untouched.
pub fn format_digest(bytes: Vec<u8>, algorithm: &str, options: &Options) -> FormattedDigest {
    let prefixed = |encoded: String| {
        if options.prefix {
            format!("{}:{}", algorithm.to_lowercase(), encoded)
        } else {
            encoded
        }
    };
    match options.format {
        OutputFormat::Raw => FormattedDigest::Raw(bytes),
        OutputFormat::Hex => FormattedDigest::Hex(prefixed(hex::encode(&bytes))),
        OutputFormat::Base64 => FormattedDigest::Base64(prefixed(STANDARD.encode(&bytes))),
    }
}
