use dao_utils::PageRequest;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy)]
pub struct ListOrdersQuery {
    pub page: PageRequest,
}

/// Orders placed by one principal, identified by phone number.
#[derive(Debug, Clone)]
pub struct ListClientOrdersQuery {
    pub phone_number: String,
    pub page: PageRequest,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GetOrderQuery {
    pub id: i32,
}
