use cucumber::given;
use steps_engine::{db_types::Owner, test_utils::seed};

use crate::cucumber::{world::StepsSystem, StepsWorld};

#[given("a fresh install")]
async fn fresh_database(world: &mut StepsWorld) {
    let system = StepsSystem::new().await;
    world.system = Some(system);
}

#[given(expr = "a family {string} with {int} points in the pool")]
async fn family(world: &mut StepsWorld, name: String, pool: i64) {
    let system = world.system();
    let account = seed::family(&system.db, &name, pool, 0, &[]).await;
    system.family_ids.insert(name, account.family.id);
}

#[given(expr = "{word} is a member of {string} with {int} points")]
async fn member(world: &mut StepsWorld, username: String, family: String, balance: i64) {
    let system = world.system();
    let family_id = system.family_id(&family);
    let tg = system.next_telegram_id();
    let account = seed::member(&system.db, family_id, tg, &username, balance).await;
    system.users.insert(username, account.id);
}

#[given(expr = "{word} has {int} points and no family")]
async fn individual(world: &mut StepsWorld, username: String, balance: i64) {
    let system = world.system();
    let tg = system.next_telegram_id();
    let account = seed::user(&system.db, tg, &username).await;
    if balance > 0 {
        seed::credit(&system.db, Owner::User(account.id), balance).await;
    }
    system.users.insert(username, account.id);
}

#[given(expr = "a promo group {string} priced at {int} points with code {word} for {int} use(s)")]
async fn promo_group(world: &mut StepsWorld, name: String, price: i64, code: String, uses: i64) {
    let system = world.system();
    let group = seed::promo_group(&system.db, &name, price, &[(code.as_str(), uses)]).await;
    system.groups.insert(name, group.id);
}
