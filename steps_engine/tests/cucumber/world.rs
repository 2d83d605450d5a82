use std::collections::HashMap;

use cucumber::World;
use log::*;
use steps_engine::{
    events::EventProducers,
    test_utils::prepare_env::{prepare_test_env, random_db_path},
    FamilyApi,
    LedgerApi,
    ShopApi,
    SqliteDatabase,
};

#[derive(Default, Debug, World)]
pub struct StepsWorld {
    pub system: Option<StepsSystem>,
}

#[derive(Debug)]
pub struct StepsSystem {
    pub db_path: String,
    pub db: SqliteDatabase,
    pub ledger: LedgerApi<SqliteDatabase>,
    pub shop: ShopApi<SqliteDatabase>,
    pub families: FamilyApi<SqliteDatabase>,
    /// Internal ids by username.
    pub users: HashMap<String, i64>,
    /// Family ids by name.
    pub family_ids: HashMap<String, i64>,
    /// Promo group ids by name.
    pub groups: HashMap<String, i64>,
    /// The outcome of the last `When` step: a description of what was received, or the error.
    pub last_result: Option<Result<String, String>>,
    next_telegram_id: i64,
}

impl StepsWorld {
    pub fn system(&mut self) -> &mut StepsSystem {
        self.system.as_mut().expect("System not initialised. Start the scenario with 'Given a fresh install'")
    }
}

impl StepsSystem {
    pub async fn new() -> Self {
        let url = random_db_path();
        let db = prepare_test_env(&url).await;
        debug!("Created database: {url}");
        Self {
            db_path: url,
            ledger: LedgerApi::new(db.clone()),
            shop: ShopApi::new(db.clone(), EventProducers::default()),
            families: FamilyApi::new(db.clone()),
            db,
            users: HashMap::new(),
            family_ids: HashMap::new(),
            groups: HashMap::new(),
            last_result: None,
            next_telegram_id: 1000,
        }
    }

    pub fn next_telegram_id(&mut self) -> i64 {
        self.next_telegram_id += 1;
        self.next_telegram_id
    }

    pub fn user_id(&self, username: &str) -> i64 {
        *self.users.get(username).unwrap_or_else(|| panic!("Unknown user {username}"))
    }

    pub fn family_id(&self, name: &str) -> i64 {
        *self.family_ids.get(name).unwrap_or_else(|| panic!("Unknown family {name}"))
    }

    pub fn group_id(&self, name: &str) -> i64 {
        *self.groups.get(name).unwrap_or_else(|| panic!("Unknown promo group {name}"))
    }

    pub fn last_error(&self) -> String {
        match &self.last_result {
            Some(Err(e)) => e.clone(),
            other => panic!("Expected the last action to fail, but got {other:?}"),
        }
    }
}
