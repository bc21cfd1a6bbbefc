// src/db/store.rs

use std::sync::Arc;

use sqlx::PgPool;

use crate::{
    db::{MemoryRepository, PgRepository, Repository},
    models::{
        acquisition::Acquisition, brand::Brand, budget::Budget, client::Client,
        motorcycle::Motorcycle, part::Part, service_order::ServiceOrder, supplier::Supplier,
        user::User,
    },
};

/// Um repositório por coleção. É o que os serviços recebem.
#[derive(Clone)]
pub struct Store {
    pub clients: Arc<dyn Repository<Client>>,
    pub users: Arc<dyn Repository<User>>,
    pub motorcycles: Arc<dyn Repository<Motorcycle>>,
    pub brands: Arc<dyn Repository<Brand>>,
    pub suppliers: Arc<dyn Repository<Supplier>>,
    pub parts: Arc<dyn Repository<Part>>,
    pub service_orders: Arc<dyn Repository<ServiceOrder>>,
    pub budgets: Arc<dyn Repository<Budget>>,
    pub acquisitions: Arc<dyn Repository<Acquisition>>,
}

impl Store {
    pub fn in_memory() -> Self {
        Self {
            clients: Arc::new(MemoryRepository::<Client>::new()),
            users: Arc::new(MemoryRepository::<User>::new()),
            motorcycles: Arc::new(MemoryRepository::<Motorcycle>::new()),
            brands: Arc::new(MemoryRepository::<Brand>::new()),
            suppliers: Arc::new(MemoryRepository::<Supplier>::new()),
            parts: Arc::new(MemoryRepository::<Part>::new()),
            service_orders: Arc::new(MemoryRepository::<ServiceOrder>::new()),
            budgets: Arc::new(MemoryRepository::<Budget>::new()),
            acquisitions: Arc::new(MemoryRepository::<Acquisition>::new()),
        }
    }

    pub fn postgres(pool: PgPool) -> Self {
        Self {
            clients: Arc::new(PgRepository::<Client>::new(pool.clone())),
            users: Arc::new(PgRepository::<User>::new(pool.clone())),
            motorcycles: Arc::new(PgRepository::<Motorcycle>::new(pool.clone())),
            brands: Arc::new(PgRepository::<Brand>::new(pool.clone())),
            suppliers: Arc::new(PgRepository::<Supplier>::new(pool.clone())),
            parts: Arc::new(PgRepository::<Part>::new(pool.clone())),
            service_orders: Arc::new(PgRepository::<ServiceOrder>::new(pool.clone())),
            budgets: Arc::new(PgRepository::<Budget>::new(pool.clone())),
            acquisitions: Arc::new(PgRepository::<Acquisition>::new(pool)),
        }
    }
}
