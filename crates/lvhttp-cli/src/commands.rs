//! Subcommands.

use std::path::PathBuf;

use clap::Subcommand;

/// Available subcommands.
///
/// Every request goes through the launch layer: the registered error
/// handlers report failures, the subcommand prints successful payloads.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// GET an enveloped JSON resource and print its data
    Get {
        /// Request path, relative to the base URL, or an absolute URL
        path: String,
    },

    /// POST a url-encoded form and print the envelope's data
    Post {
        /// Request path, relative to the base URL, or an absolute URL
        path: String,
        /// Form field as key=value (repeatable)
        #[arg(short = 'f', long = "field", value_parser = parse_key_value)]
        fields: Vec<(String, String)>,
    },

    /// GET several resources concurrently and print every outcome in order
    FetchAll {
        /// Request paths
        #[arg(required = true)]
        paths: Vec<String>,
    },

    /// Upload files as a multipart form
    Upload {
        /// Request path, relative to the base URL, or an absolute URL
        path: String,
        /// Files to upload
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Form field name used for every file part
        #[arg(long = "field", default_value = "file")]
        field: String,
        /// Extra text part as key=value (repeatable)
        #[arg(short = 't', long = "text", value_parser = parse_key_value)]
        text: Vec<(String, String)>,
    },

    /// Stream a file to disk with progress
    Download {
        /// URL, or path relative to the base URL
        url: String,
        /// Destination directory
        #[arg(long = "dir", default_value = ".")]
        dir: PathBuf,
        /// File name; defaults to the last URL segment
        #[arg(long = "name")]
        name: Option<String>,
    },
}

/// Parse `key=value`. The value may itself contain `=`.
pub fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{raw}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty key in '{raw}'"));
    }
    Ok((key.to_string(), value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_key_value() {
        assert_eq!(
            parse_key_value("phone=151"),
            Ok(("phone".to_string(), "151".to_string()))
        );
        assert_eq!(
            parse_key_value("q=a=b"),
            Ok(("q".to_string(), "a=b".to_string()))
        );
        assert_eq!(parse_key_value("empty="), Ok(("empty".to_string(), String::new())));
    }

    #[test]
    fn test_parse_key_value_errors() {
        assert!(parse_key_value("novalue").unwrap_err().contains("key=value"));
        assert!(parse_key_value(" =x").unwrap_err().contains("empty key"));
    }
}
