pub mod backend;
pub mod key;
pub mod type_bind;
pub mod value;

pub use backend::CacheBackend;
pub use key::{
    CacheKey, CacheKeyArg1, CacheKeyAutoConstruct, escape_glob,
    escape_key_segment,
};
pub use type_bind::CacheTypeBind;
pub use value::{CacheError, Json};
