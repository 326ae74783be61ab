use std::{
    collections::BTreeMap,
    sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};

use async_trait::async_trait;
use catalog_errors::CatalogError;
use catalog_models::{CatalogItem, CatalogItemDraft, Spice};
use chrono::{Duration, Utc};
use database_traits::GenericDao;
use order_errors::OrderError;
use order_models::{NewOrder, Order};
use order_store::OrderStore;
use user_errors::UserError;
use user_models::{NewUser, User};
use user_store::UserStore;

/// Per-operation call counters, so tests can tell a cache hit from a
/// store round trip.
#[derive(Debug, Default)]
pub struct StoreCalls {
    pub reads: AtomicUsize,
    pub counts: AtomicUsize,
    pub writes: AtomicUsize,
}

impl StoreCalls {
    pub fn reads(&self) -> usize { self.reads.load(Ordering::SeqCst) }

    pub fn counts(&self) -> usize { self.counts.load(Ordering::SeqCst) }

    pub fn writes(&self) -> usize { self.writes.load(Ordering::SeqCst) }

    fn read(&self) { self.reads.fetch_add(1, Ordering::SeqCst); }

    fn count(&self) { self.counts.fetch_add(1, Ordering::SeqCst); }

    fn write(&self) { self.writes.fetch_add(1, Ordering::SeqCst); }
}

fn page<T: Clone>(rows: impl Iterator<Item = T>, offset: i64, limit: i64) -> Vec<T> {
    rows.skip(offset.max(0) as usize)
        .take(limit.max(0) as usize)
        .collect()
}

/// The six cuts the production database is seeded with.
pub fn seed_assortment() -> Vec<CatalogItemDraft> {
    [
        ("Pork", 1800.0, "Honey, black pepper, soy sauce!", "Quince jam, red pepper, teriyaki sauce!"),
        ("Beef", 2800.0, "Pear cider, aromatic dried herbs!", "Apple cider, lecho sauce!"),
        ("Chicken", 1500.0, "Coke with lemongrass!", "Orange juice, paprika!"),
        ("Turkey", 2000.0, "Basil, cherry caramel!", "Rosemary, marjoram, pomegranate caramel!"),
        ("Mutton", 2400.0, "Mustard marinade, star anise, tomatoes!", "Kefir marinade, hot pepper mix, fresh mint!"),
        ("Venison", 5600.0, "Mead with garlic and wild blackberry!", "Mead with ginger and wild currant!"),
    ]
    .into_iter()
    .map(|(meat, price, recipe1, recipe2)| {
        CatalogItemDraft::builder()
            .meat(meat)
            .price(price)
            .spice(Spice::new(recipe1, recipe2))
            .build()
    })
    .collect()
}

#[derive(Default)]
pub struct MemoryCatalogStore {
    items: Mutex<BTreeMap<i32, CatalogItem>>,
    next_id: AtomicUsize,
    pub calls: StoreCalls,
}

impl MemoryCatalogStore {
    pub fn new() -> Self { Self::default() }

    /// A store holding the seeded assortment with ids 1..=6.
    pub fn seeded() -> Self {
        let store = Self::new();
        for draft in seed_assortment() {
            store.insert(draft);
        }
        store
    }

    pub fn insert(&self, draft: CatalogItemDraft) -> CatalogItem {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) as i32 + 1;
        let item = draft.into_item(id);
        self.with_items(|items| items.insert(id, item.clone()));
        item
    }

    fn with_items<R>(&self, f: impl FnOnce(&mut BTreeMap<i32, CatalogItem>) -> R) -> R {
        let mut items = self.items.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut items)
    }
}

#[async_trait]
impl GenericDao for MemoryCatalogStore {
    type Model = CatalogItem;
    type CreateRequest = CatalogItemDraft;
    type UpdateRequest = CatalogItemDraft;
    type Error = CatalogError;
    type ID = i32;

    async fn find_by_id(&self, id: i32) -> Result<CatalogItem, CatalogError> {
        self.calls.read();
        self.with_items(|items| items.get(&id).cloned())
            .ok_or(CatalogError::NotFound { id })
    }

    async fn find_page(
        &self, offset: i64, limit: i64,
    ) -> Result<Vec<CatalogItem>, CatalogError> {
        self.calls.read();
        Ok(self.with_items(|items| page(items.values().cloned(), offset, limit)))
    }

    async fn count(&self) -> Result<i64, CatalogError> {
        self.calls.count();
        Ok(self.with_items(|items| items.len() as i64))
    }

    async fn create(
        &self, req: CatalogItemDraft,
    ) -> Result<CatalogItem, CatalogError> {
        self.calls.write();
        Ok(self.insert(req))
    }

    async fn update(
        &self, id: i32, req: CatalogItemDraft,
    ) -> Result<CatalogItem, CatalogError> {
        self.calls.write();
        self.with_items(|items| {
            let slot = items.get_mut(&id).ok_or(CatalogError::NotFound { id })?;
            *slot = req.into_item(id);
            Ok(slot.clone())
        })
    }

    async fn delete(&self, id: i32) -> Result<(), CatalogError> {
        self.calls.write();
        self.with_items(|items| {
            items
                .remove(&id)
                .map(|_| ())
                .ok_or(CatalogError::NotFound { id })
        })
    }
}

#[derive(Default)]
pub struct MemoryOrderStore {
    orders: Mutex<Vec<Order>>,
    pub calls: StoreCalls,
}

impl MemoryOrderStore {
    pub fn new() -> Self { Self::default() }

    fn with_orders<R>(&self, f: impl FnOnce(&mut Vec<Order>) -> R) -> R {
        let mut orders = self.orders.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut orders)
    }

    fn newest_first(orders: &[Order]) -> Vec<Order> {
        let mut sorted = orders.to_vec();
        sorted.sort_by(|a, b| {
            b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id))
        });
        sorted
    }
}

#[async_trait]
impl OrderStore for MemoryOrderStore {
    async fn find_by_id(&self, id: i32) -> Result<Order, OrderError> {
        self.calls.read();
        self.with_orders(|orders| orders.iter().find(|o| o.id == id).cloned())
            .ok_or(OrderError::NotFound { id })
    }

    async fn find_page(
        &self, offset: i64, limit: i64,
    ) -> Result<Vec<Order>, OrderError> {
        self.calls.read();
        Ok(self.with_orders(|orders| {
            page(Self::newest_first(orders).into_iter(), offset, limit)
        }))
    }

    async fn count(&self) -> Result<i64, OrderError> {
        self.calls.count();
        Ok(self.with_orders(|orders| orders.len() as i64))
    }

    async fn find_page_for_phone(
        &self, phone_number: &str, offset: i64, limit: i64,
    ) -> Result<Vec<Order>, OrderError> {
        self.calls.read();
        Ok(self.with_orders(|orders| {
            let rows = Self::newest_first(orders)
                .into_iter()
                .filter(|o| o.phone_number == phone_number);
            page(rows, offset, limit)
        }))
    }

    async fn count_for_phone(
        &self, phone_number: &str,
    ) -> Result<i64, OrderError> {
        self.calls.count();
        Ok(self.with_orders(|orders| {
            orders.iter().filter(|o| o.phone_number == phone_number).count()
                as i64
        }))
    }

    async fn create(&self, order: NewOrder) -> Result<Order, OrderError> {
        self.calls.write();
        Ok(self.with_orders(|orders| {
            let id = orders.iter().map(|o| o.id).max().unwrap_or(0) + 1;
            // Strictly increasing timestamps keep "newest first" stable.
            let created_at = orders
                .iter()
                .map(|o| o.created_at + Duration::milliseconds(1))
                .max()
                .map_or_else(Utc::now, |next| next.max(Utc::now()));
            let order = order.into_order(id, created_at);
            orders.push(order.clone());
            order
        }))
    }

    async fn delete(&self, id: i32) -> Result<Order, OrderError> {
        self.calls.write();
        self.with_orders(|orders| {
            let pos = orders
                .iter()
                .position(|o| o.id == id)
                .ok_or(OrderError::NotFound { id })?;
            Ok(orders.remove(pos))
        })
    }
}

#[derive(Default)]
pub struct MemoryUserStore {
    users: Mutex<BTreeMap<String, User>>,
    pub calls: StoreCalls,
}

impl MemoryUserStore {
    pub fn new() -> Self { Self::default() }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_username(&self, username: &str) -> Result<User, UserError> {
        self.calls.read();
        let users = self.users.lock().unwrap_or_else(|e| e.into_inner());
        users.get(username).cloned().ok_or_else(|| {
            UserError::NameNotFound {
                username: username.to_string(),
            }
        })
    }

    async fn create(&self, user: NewUser) -> Result<User, UserError> {
        self.calls.write();
        let mut users = self.users.lock().unwrap_or_else(|e| e.into_inner());
        if users.contains_key(&user.username) {
            return Err(UserError::NameExists);
        }
        let created = user.into_user(users.len() as i32 + 1);
        users.insert(created.username.clone(), created.clone());
        Ok(created)
    }
}
