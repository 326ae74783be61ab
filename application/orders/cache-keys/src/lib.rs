use std::{borrow::Cow, time::Duration};

use order_responses::OrderPageResponse;
use redis_connection::{
    cache_key,
    core::{escape_glob, escape_key_segment},
};

pub const ORDERS_TTL: Duration = Duration::from_secs(3600);

cache_key!(OrderPageCacheKey::<OrderPageResponse> => "orders:page:{}:size:{}"[page: i64, size: i64]);
cache_key!(ClientOrderPageCacheKey::<OrderPageResponse> => "client_orders:{}:page:{}:size:{}"[phone: String, page: i64, size: i64]);

pub const ORDER_PAGES_PATTERN: &str = "orders:*";

/// Phone numbers go into keys escaped, so they can never inject a
/// separator.
pub fn phone_segment(phone_number: &str) -> String {
    escape_key_segment(phone_number).into_owned()
}

/// Every cached order page of one principal.
pub fn client_orders_pattern(phone_number: &str) -> String {
    let segment: Cow<'_, str> = escape_key_segment(phone_number);
    format!("client_orders:{}:*", escape_glob(&segment))
}

#[cfg(test)]
mod tests {
    use redis_connection::{core::CacheKey, memory::glob_match};

    use super::*;

    #[test]
    fn client_page_key_is_covered_by_its_pattern() {
        let phone = phone_segment("+79990001122");
        let key = ClientOrderPageCacheKey.get_key_with_args((&phone, &1, &10));
        assert_eq!(key, "client_orders:+79990001122:page:1:size:10");
        assert!(glob_match(&client_orders_pattern("+79990001122"), &key));
    }

    #[test]
    fn patterns_do_not_leak_across_principals() {
        let other = phone_segment("+7999000112");
        let key = ClientOrderPageCacheKey.get_key_with_args((&other, &1, &10));
        assert!(!glob_match(&client_orders_pattern("+79990001122"), &key));
    }

    #[test]
    fn hostile_identifier_stays_literal() {
        let phone = phone_segment("*");
        let victim = phone_segment("+1");
        let own = ClientOrderPageCacheKey.get_key_with_args((&phone, &1, &10));
        let theirs =
            ClientOrderPageCacheKey.get_key_with_args((&victim, &1, &10));

        let pattern = client_orders_pattern("*");
        assert!(glob_match(&pattern, &own));
        assert!(!glob_match(&pattern, &theirs));
    }

    #[test]
    fn global_pages_pattern() {
        let key = OrderPageCacheKey.get_key_with_args((&3, &10));
        assert!(glob_match(ORDER_PAGES_PATTERN, &key));
        assert!(!glob_match(ORDER_PAGES_PATTERN, "client_orders:+1:page:1"));
    }
}
