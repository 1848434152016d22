//! Search result conversion.
//!
//! `ldap3` places a value in `attrs` whenever it happens to be valid UTF-8,
//! so a GUID or SID can land among the text attributes. Attributes the
//! registry tags as binary are moved back to `bin_attrs` here, which is
//! lossless because the text came from those very bytes.

use std::collections::HashMap;

use ad_directory::registry;
use ad_directory::RawEntry;
use ldap3::SearchEntry;

/// Converts a search entry into a raw entry with lowercased attribute names.
#[must_use]
pub fn raw_entry(entry: SearchEntry) -> RawEntry {
    let mut attributes: HashMap<String, Vec<String>> = HashMap::with_capacity(entry.attrs.len());
    let mut binary_attributes: HashMap<String, Vec<Vec<u8>>> = HashMap::new();

    for (name, values) in entry.attrs {
        let name = name.to_ascii_lowercase();
        if registry::is_binary_attribute(&name) {
            binary_attributes
                .entry(name)
                .or_default()
                .extend(values.into_iter().map(String::into_bytes));
        } else {
            attributes.entry(name).or_default().extend(values);
        }
    }

    for (name, values) in entry.bin_attrs {
        binary_attributes
            .entry(name.to_ascii_lowercase())
            .or_default()
            .extend(values);
    }

    RawEntry {
        dn: entry.dn,
        attributes,
        binary_attributes,
    }
}
