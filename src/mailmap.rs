use crate::error::{Result, StockError};
use crate::model::Identity;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone)]
struct MailmapEntry {
    dest_name: Option<String>,
    dest_email: Option<String>,
    /// When present, the entry only applies to commits carrying this exact
    /// display name alongside the source email.
    src_name: Option<String>,
    src_email: String,
}

/// Parsed mailmap file mapping raw commit signatures to canonical
/// identities. Supported line forms:
///
/// ```text
/// Proper Name <commit@email>
/// <proper@email> <commit@email>
/// Proper Name <proper@email> <commit@email>
/// Proper Name <proper@email> Commit Name <commit@email>
/// ```
#[derive(Debug, Clone, Default)]
pub struct Mailmap {
    entries: Vec<MailmapEntry>,
}

impl Mailmap {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load and parse a mailmap file. Malformed lines abort the load; a bad
    /// identity map would silently misattribute every downstream statistic.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let mut entries = Vec::new();

        for (index, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let entry = parse_line(line).map_err(|reason| StockError::Mailmap {
                path: path.display().to_string(),
                line: index + 1,
                reason,
            })?;
            entries.push(entry);
        }

        Ok(Self { entries })
    }

    /// Resolve a raw signature to its canonical identity. First matching
    /// entry wins; emails compare case-insensitively as git does.
    pub fn resolve(&self, email: &str, name: &str) -> Identity {
        for entry in &self.entries {
            if !entry.src_email.eq_ignore_ascii_case(email) {
                continue;
            }
            if let Some(src_name) = &entry.src_name {
                if src_name != name {
                    continue;
                }
            }
            return Identity::new(
                entry.dest_email.clone().unwrap_or_else(|| email.to_string()),
                entry.dest_name.clone().unwrap_or_else(|| name.to_string()),
            );
        }

        Identity::new(email, name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn parse_line(line: &str) -> std::result::Result<MailmapEntry, String> {
    // Split the line into (leading name, <email>) pairs.
    let mut pairs: Vec<(Option<String>, String)> = Vec::new();
    let mut rest = line;

    while let Some(open) = rest.find('<') {
        let close = rest[open..]
            .find('>')
            .map(|i| open + i)
            .ok_or_else(|| "unclosed '<'".to_string())?;

        let name = rest[..open].trim();
        let email = rest[open + 1..close].trim();
        if email.is_empty() {
            return Err("empty email".to_string());
        }

        pairs.push((
            if name.is_empty() {
                None
            } else {
                Some(name.to_string())
            },
            email.to_string(),
        ));
        rest = &rest[close + 1..];
    }

    if !rest.trim().is_empty() {
        return Err(format!("trailing text after email: '{}'", rest.trim()));
    }

    match pairs.len() {
        1 => {
            let (name, email) = pairs.remove(0);
            let dest_name = name.ok_or_else(|| "expected a proper name".to_string())?;
            Ok(MailmapEntry {
                dest_name: Some(dest_name),
                dest_email: None,
                src_name: None,
                src_email: email,
            })
        }
        2 => {
            let (src_name, src_email) = pairs.pop().unwrap_or((None, String::new()));
            let (dest_name, dest_email) = pairs.pop().unwrap_or((None, String::new()));
            Ok(MailmapEntry {
                dest_name,
                dest_email: Some(dest_email),
                src_name,
                src_email,
            })
        }
        0 => Err("expected at least one <email>".to_string()),
        n => Err(format!("expected at most two <email> fields, found {n}")),
    }
}
