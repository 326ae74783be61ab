use std::borrow::Cow;

/// A typed cache key family. Implementations are normally generated with
/// [`cache_key!`](crate::cache_key).
pub trait CacheKey {
    type Args<'r>;
    /// Value stored under keys of this family.
    type Value;

    fn get_key_with_args(&self, arg: Self::Args<'_>) -> Cow<'static, str>;

    fn get_key(&self) -> Cow<'static, str>
    where
        for<'r> Self::Args<'r>: CacheKeyAutoConstruct,
    {
        CacheKey::get_key_with_args(self, CacheKeyAutoConstruct::construct())
    }
}

pub trait CacheKeyArg1 {
    type Arg0;

    fn construct(arg0: Self::Arg0) -> Self;
}

impl<T> CacheKeyArg1 for (T,) {
    type Arg0 = T;

    fn construct(arg0: Self::Arg0) -> Self { (arg0,) }
}

pub trait CacheKeyAutoConstruct {
    fn construct() -> Self;
}

impl CacheKeyAutoConstruct for () {
    fn construct() -> Self {}
}

/// Escapes a free-text key segment so that it cannot introduce a separator
/// (`:` or `;`) or a glob metacharacter into the key.
pub fn escape_key_segment(segment: &str) -> Cow<'_, str> {
    escape_with(segment, &['\\', ':', ';', '*', '?', '[', ']'])
}

/// Escapes a literal so it matches only itself inside a SCAN `MATCH`
/// pattern.
pub fn escape_glob(literal: &str) -> Cow<'_, str> {
    escape_with(literal, &['\\', '*', '?', '[', ']'])
}

fn escape_with<'a>(input: &'a str, special: &[char]) -> Cow<'a, str> {
    if !input.contains(special) {
        return Cow::Borrowed(input);
    }

    let mut out = String::with_capacity(input.len() + 4);
    for c in input.chars() {
        if special.contains(&c) {
            out.push('\\');
        }
        out.push(c);
    }
    Cow::Owned(out)
}
