use super::{
    backend::CacheBackend,
    key::{CacheKey, CacheKeyArg1, CacheKeyAutoConstruct},
};
use crate::types::normal::Normal;

/// Binds a key family to a backend, yielding a handle typed by the family's
/// value.
pub trait CacheTypeBind: CacheKey {
    fn bind_with_args<'cache>(
        &self, backend: &'cache CacheBackend, args: <Self as CacheKey>::Args<'_>,
    ) -> Normal<'cache, Self::Value> {
        let key = CacheKey::get_key_with_args(self, args);
        Normal::new(backend, key)
    }

    fn bind_with<'cache, 'a>(
        &self, backend: &'cache CacheBackend,
        arg: <<Self as CacheKey>::Args<'a> as CacheKeyArg1>::Arg0,
    ) -> Normal<'cache, Self::Value>
    where
        <Self as CacheKey>::Args<'a>: CacheKeyArg1,
    {
        CacheTypeBind::bind_with_args(
            self,
            backend,
            <<Self as CacheKey>::Args<'a> as CacheKeyArg1>::construct(arg),
        )
    }

    fn bind<'cache>(
        &self, backend: &'cache CacheBackend,
    ) -> Normal<'cache, Self::Value>
    where
        for<'r> <Self as CacheKey>::Args<'r>: CacheKeyAutoConstruct,
    {
        CacheTypeBind::bind_with_args(
            self,
            backend,
            CacheKeyAutoConstruct::construct(),
        )
    }
}

impl<K> CacheTypeBind for K where K: CacheKey {}
