use cucumber::{then, when};
use steps_engine::{
    db_types::{EntryMemo, Owner, Points, UserRef},
    AccountManagement,
};

use crate::cucumber::StepsWorld;

#[when(expr = "the family {string} is charged {int} points")]
async fn charge_family(world: &mut StepsWorld, family: String, amount: i64) {
    let system = world.system();
    let family_id = system.family_id(&family);
    let result = system.ledger.debit_family(family_id, Points::from(amount), EntryMemo::new("Charge")).await;
    system.last_result = Some(result.map(|entries| format!("{} entries", entries.len())).map_err(|e| e.to_string()));
}

#[when(expr = "{word} is charged {int} points")]
async fn charge_individual(world: &mut StepsWorld, username: String, amount: i64) {
    let system = world.system();
    let user = UserRef::Id(system.user_id(&username));
    let result = system.ledger.debit_user(user, Points::from(amount), EntryMemo::new("Charge")).await;
    system.last_result = Some(result.map(|entry| format!("entry #{}", entry.id)).map_err(|e| e.to_string()));
}

#[when(expr = "{word} buys a code from {string}")]
async fn buy_code(world: &mut StepsWorld, username: String, group: String) {
    let system = world.system();
    let user = UserRef::Id(system.user_id(&username));
    let group_id = system.group_id(&group);
    let result = system.shop.buy_promo_code(group_id, user).await;
    system.last_result = Some(result.map(|p| p.code.code).map_err(|e| e.to_string()));
}

#[then(expr = "the pool of {string} holds {int} points")]
async fn pool_balance(world: &mut StepsWorld, family: String, expected: i64) {
    let system = world.system();
    let family_id = system.family_id(&family);
    let account = system.db.fetch_family(family_id).await.expect("Error fetching family").expect("Family not found");
    assert_eq!(account.family.balance, Points::from(expected));
}

#[then(expr = "{word} holds {int} points")]
async fn user_balance(world: &mut StepsWorld, username: String, expected: i64) {
    let system = world.system();
    let user = UserRef::Id(system.user_id(&username));
    let account = system.db.fetch_user(user).await.expect("Error fetching user").expect("User not found");
    assert_eq!(account.balance, Points::from(expected));
}

#[then(expr = "the charge succeeds with {int} ledger entries")]
async fn charge_succeeded(world: &mut StepsWorld, count: usize) {
    let system = world.system();
    assert_eq!(system.last_result, Some(Ok(format!("{count} entries"))));
}

#[then(expr = "the action fails with {string}")]
async fn action_failed(world: &mut StepsWorld, message: String) {
    let error = world.system().last_error();
    assert!(error.contains(&message), "'{error}' does not contain '{message}'");
}

#[then(expr = "{word} receives the code {word}")]
async fn received_code(world: &mut StepsWorld, _username: String, code: String) {
    assert_eq!(world.system().last_result, Some(Ok(code)));
}

#[then(expr = "{int} uses remain in {string}")]
async fn uses_remaining(world: &mut StepsWorld, expected: i64, group: String) {
    let system = world.system();
    let group_id = system.group_id(&group);
    let remaining = system.db.available_promo_codes(group_id).await.expect("Error counting codes");
    assert_eq!(remaining, expected);
}

#[then("every ledger replays to its stored balance")]
async fn ledgers_are_consistent(world: &mut StepsWorld) {
    let system = world.system();
    let owners = system
        .users
        .values()
        .map(|&id| Owner::User(id))
        .chain(system.family_ids.values().map(|&id| Owner::Family(id)))
        .collect::<Vec<_>>();
    for owner in owners {
        let audit = system.ledger.audit(owner).await.expect("Error auditing ledger");
        assert!(audit.is_consistent(), "{audit:?}");
    }
}
