// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Download-source lookup
//!
//! Browsers on macOS record where a file came from in an extended attribute
//! holding a property list of URLs. The lookup is a trait so classification
//! does not depend on the platform having that attribute at all.

use std::path::Path;
use tracing::debug;

/// Extended attribute macOS uses for "Where from" information
pub const WHERE_FROMS_ATTRIBUTE: &str = "com.apple.metadata:kMDItemWhereFroms";

/// Finds the download source recorded for a file
pub trait ProvenanceLookup {
    /// Name of this lookup
    fn name(&self) -> &'static str;

    /// First recorded source, or `None` when nothing is recorded
    fn lookup(&self, path: &Path) -> Option<String>;
}

/// Reads the source list from an extended attribute
pub struct XattrProvenance {
    attribute: String,
}

impl XattrProvenance {
    pub fn new(attribute: &str) -> Self {
        Self {
            attribute: attribute.to_string(),
        }
    }
}

impl Default for XattrProvenance {
    fn default() -> Self {
        Self::new(WHERE_FROMS_ATTRIBUTE)
    }
}

impl ProvenanceLookup for XattrProvenance {
    fn name(&self) -> &'static str {
        "xattr"
    }

    fn lookup(&self, path: &Path) -> Option<String> {
        match xattr::get(path, &self.attribute) {
            Ok(Some(data)) => decode_where_froms(&data),
            Ok(None) => None,
            Err(e) => {
                debug!("No {} attribute on {:?}: {}", self.attribute, path, e);
                None
            }
        }
    }
}

/// Lookup for platforms and filesystems without extended attributes
pub struct NoProvenance;

impl ProvenanceLookup for NoProvenance {
    fn name(&self) -> &'static str {
        "none"
    }

    fn lookup(&self, _path: &Path) -> Option<String> {
        None
    }
}

/// Decode an attribute payload into its first source string
///
/// The payload is a binary or XML property list containing an array of
/// strings. Anything else counts as no source.
pub fn decode_where_froms(data: &[u8]) -> Option<String> {
    match plist::from_bytes::<Vec<String>>(data) {
        Ok(sources) => sources.into_iter().next(),
        Err(e) => {
            debug!("Undecodable source list: {}", e);
            None
        }
    }
}

/// Lookup answering from a fixed table of file names
#[cfg(test)]
pub(crate) struct FixedProvenance {
    sources: std::collections::HashMap<String, String>,
}

#[cfg(test)]
impl FixedProvenance {
    pub(crate) fn new(entries: &[(&str, &str)]) -> Self {
        Self {
            sources: entries
                .iter()
                .map(|(name, source)| (name.to_string(), source.to_string()))
                .collect(),
        }
    }
}

#[cfg(test)]
impl ProvenanceLookup for FixedProvenance {
    fn name(&self) -> &'static str {
        "fixed"
    }

    fn lookup(&self, path: &Path) -> Option<String> {
        let name = path.file_name()?.to_str()?;
        self.sources.get(name).cloned()
    }
}
