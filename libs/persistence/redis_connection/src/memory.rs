use std::time::{Duration, Instant};

use bytes::Bytes;
use moka::{Expiry, future::Cache};

use crate::{config::MemoryConfig, core::CacheError};

#[derive(Debug, Clone)]
pub struct MemoryEntry {
    pub bytes: Bytes,
    /// Lifetime applied when this value is written. `None` keeps whatever
    /// lifetime the key already had.
    pub ttl: Option<Duration>,
}

impl MemoryEntry {
    pub fn expiring(bytes: Bytes, ttl: Duration) -> Self {
        Self {
            bytes,
            ttl: Some(ttl),
        }
    }
}

pub struct EntryExpiry;

impl Expiry<String, MemoryEntry> for EntryExpiry {
    fn expire_after_create(
        &self, _key: &String, value: &MemoryEntry, _created_at: Instant,
    ) -> Option<Duration> {
        value.ttl
    }

    fn expire_after_update(
        &self, _key: &String, value: &MemoryEntry, _updated_at: Instant,
        duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        value.ttl.or(duration_until_expiry)
    }
}

pub fn build_cache(config: &MemoryConfig) -> Cache<String, MemoryEntry> {
    Cache::builder()
        .max_capacity(config.capacity)
        .expire_after(EntryExpiry)
        .build()
}

pub fn parse_counter(bytes: &[u8]) -> Result<i64, CacheError> {
    std::str::from_utf8(bytes)
        .ok()
        .and_then(|s| s.parse().ok())
        .ok_or(CacheError::NotACounter)
}

/// Atomic increment. The first write on a cold key sets `ttl`; later writes
/// keep the remaining lifetime.
pub async fn increment(
    cache: &Cache<String, MemoryEntry>, key: &str, ttl: Duration,
) -> Result<i64, CacheError> {
    let entry = cache
        .entry(key.to_owned())
        .and_upsert_with(|existing| {
            let (current, ttl) = match existing {
                Some(entry) => {
                    (parse_counter(&entry.value().bytes).unwrap_or(0), None)
                }
                None => (0, Some(ttl)),
            };
            std::future::ready(MemoryEntry {
                bytes: Bytes::from((current + 1).to_string()),
                ttl,
            })
        })
        .await;

    parse_counter(&entry.into_value().bytes)
}

/// Redis `MATCH` semantics: `*`, `?`, `[...]` classes with `^` negation and
/// ranges, and `\` escapes.
pub fn glob_match(pattern: &str, text: &str) -> bool {
    let p: Vec<char> = pattern.chars().collect();
    let t: Vec<char> = text.chars().collect();

    let (mut pi, mut ti) = (0, 0);
    let mut backtrack: Option<(usize, usize)> = None;

    while ti < t.len() {
        let advanced = match p.get(pi) {
            Some('*') => {
                backtrack = Some((pi, ti));
                pi += 1;
                continue;
            }
            Some('?') => Some(pi + 1),
            Some('[') => {
                match match_class(&p, pi, t[ti]) {
                    Some((true, next)) => Some(next),
                    Some((false, _)) => None,
                    None if t[ti] == '[' => Some(pi + 1),
                    None => None,
                }
            }
            Some('\\') if pi + 1 < p.len() => {
                (p[pi + 1] == t[ti]).then_some(pi + 2)
            }
            Some(&c) => (c == t[ti]).then_some(pi + 1),
            None => None,
        };

        match (advanced, backtrack) {
            (Some(next), _) => {
                pi = next;
                ti += 1;
            }
            (None, Some((star, from))) => {
                pi = star + 1;
                ti = from + 1;
                backtrack = Some((star, from + 1));
            }
            (None, None) => return false,
        }
    }

    p[pi..].iter().all(|&c| c == '*')
}

/// Returns whether `c` is in the class starting at `start` and the index
/// after the closing `]`, or `None` when the class is unterminated.
fn match_class(p: &[char], start: usize, c: char) -> Option<(bool, usize)> {
    let mut i = start + 1;
    let negate = p.get(i) == Some(&'^');
    if negate {
        i += 1;
    }

    let mut matched = false;
    while i < p.len() && p[i] != ']' {
        if p[i] == '\\' && i + 1 < p.len() {
            matched |= p[i + 1] == c;
            i += 2;
        }
        else if i + 2 < p.len() && p[i + 1] == '-' && p[i + 2] != ']' {
            let (lo, hi) = if p[i] <= p[i + 2] {
                (p[i], p[i + 2])
            }
            else {
                (p[i + 2], p[i])
            };
            matched |= lo <= c && c <= hi;
            i += 3;
        }
        else {
            matched |= p[i] == c;
            i += 1;
        }
    }

    (i < p.len()).then_some((matched != negate, i + 1))
}
