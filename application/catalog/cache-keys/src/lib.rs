use std::{fmt::Write, time::Duration};

use catalog_queries::BulkQuoteLine;
use catalog_responses::{
    BulkQuoteResponse, CatalogItemResponse, CatalogPageResponse,
};
use redis_connection::{cache_key, core::escape_key_segment};

pub const CATALOG_TTL: Duration = Duration::from_secs(300);
pub const BULK_PRICE_TTL: Duration = Duration::from_secs(300);

cache_key!(CatalogPageCacheKey::<CatalogPageResponse> => "assortment:page:{}:size:{}"[page: i64, size: i64]);
cache_key!(CatalogItemCacheKey::<CatalogItemResponse> => "product:{}"[id: i32]);
cache_key!(BulkPriceCacheKey::<BulkQuoteResponse> => "bulk_price:{}"[lines: String]);

/// Every cached catalog page, whatever its page and size.
pub const CATALOG_PAGES_PATTERN: &str = "assortment:*";
pub const BULK_PRICE_PATTERN: &str = "bulk_price:*";

pub fn catalog_item_pattern(id: i32) -> String { format!("product:{id}") }

/// `{id}:{quantity:.2}:{spice};` per line, in request order.
pub fn bulk_key_fragment(lines: &[BulkQuoteLine]) -> String {
    let mut out = String::with_capacity(lines.len() * 24);
    for line in lines {
        let _ = write!(
            out,
            "{}:{:.2}:{};",
            line.id,
            line.quantity,
            escape_key_segment(&line.selected_spice)
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use redis_connection::core::CacheKey;

    use super::*;

    fn line(id: i32, quantity: f64, spice: &str) -> BulkQuoteLine {
        BulkQuoteLine {
            id,
            quantity,
            selected_spice: spice.into(),
        }
    }

    #[test]
    fn page_keys_encode_page_and_size() {
        let key = CatalogPageCacheKey.get_key_with_args((&2, &25));
        assert_eq!(key, "assortment:page:2:size:25");
    }

    #[test]
    fn item_key_matches_its_pattern() {
        let key = CatalogItemCacheKey.get_key_with_args((&7,));
        assert_eq!(key, catalog_item_pattern(7));
    }

    #[test]
    fn bulk_fragment_rounds_quantity_and_escapes_spice() {
        let fragment = bulk_key_fragment(&[
            line(1, 2.0, "Honey"),
            line(3, 0.125, "Salt;Pepper:hot"),
        ]);
        assert_eq!(fragment, r"1:2.00:Honey;3:0.13:Salt\;Pepper\:hot;");

        let key = BulkPriceCacheKey.get_key_with_args((&fragment,));
        assert!(key.starts_with("bulk_price:1:2.00:Honey;"));
    }

    #[test]
    fn bulk_fragment_is_order_sensitive() {
        let a = bulk_key_fragment(&[line(1, 1.0, "A"), line(2, 1.0, "B")]);
        let b = bulk_key_fragment(&[line(2, 1.0, "B"), line(1, 1.0, "A")]);
        assert_ne!(a, b);
    }

    #[test]
    fn distinct_spices_never_collide() {
        let joined = bulk_key_fragment(&[line(1, 1.0, "A;2:1.00:B")]);
        let split = bulk_key_fragment(&[line(1, 1.0, "A"), line(2, 1.0, "B")]);
        assert_ne!(joined, split);
    }
}
