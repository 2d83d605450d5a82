use actix_web::{http::StatusCode, web, web::ServiceConfig};
use chrono::Utc;
use mockall::predicate::eq;
use serde_json::json;
use steps_engine::{
    db_types::{Family, FamilyAccount, FamilyInvitation, InviteStatus, Points, Referral, UserRef},
    FamilyApi,
    FamilyError,
    ReferralApi,
    ReferralError,
};

use super::{
    helpers::{json, post, user_account},
    mocks::{MockFamilyManager, MockReferralManager},
};
use crate::routes::{
    CreateFamilyRoute,
    CreateReferralRoute,
    DisbandFamilyRoute,
    InviteRoute,
    LeaveFamilyRoute,
    RespondToInvitationRoute,
};

fn family_routes(families: MockFamilyManager) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        cfg.service(CreateFamilyRoute::<MockFamilyManager>::new())
            .service(InviteRoute::<MockFamilyManager>::new())
            .service(RespondToInvitationRoute::<MockFamilyManager>::new())
            .service(LeaveFamilyRoute::<MockFamilyManager>::new())
            .service(DisbandFamilyRoute::<MockFamilyManager>::new())
            .app_data(web::Data::new(FamilyApi::new(families)));
    }
}

fn invitation(status: InviteStatus) -> FamilyInvitation {
    FamilyInvitation {
        id: 12,
        family_id: 3,
        inviter_id: 1,
        invitee_id: 2,
        status,
        created_at: Utc::now(),
        responded_at: None,
    }
}

#[actix_web::test]
async fn create_a_family_with_a_trimmed_name() {
    let mut families = MockFamilyManager::new();
    families
        .expect_create_family()
        .withf(|owner, name| *owner == UserRef::Telegram(1) && name == "Night Owls")
        .times(1)
        .returning(|_, name| {
            let now = Utc::now();
            Ok(FamilyAccount {
                family: Family {
                    id: 3,
                    name: name.to_string(),
                    balance: Points::zero(),
                    step_count: 0,
                    created_at: now,
                    updated_at: now,
                },
                members: vec![user_account(1, 1, Some("owl"))],
            })
        });
    let (status, body) =
        post("/api/families", json!({"telegram_id": 1, "name": "  Night Owls "}), family_routes(families)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json(&body)["family"]["name"], "Night Owls");
}

#[actix_web::test]
async fn invalid_names_never_reach_the_store() {
    let families = MockFamilyManager::new();
    let (status, body) = post("/api/families", json!({"telegram_id": 1, "name": "   "}), family_routes(families)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(json(&body)["error"].as_str().unwrap().starts_with("Invalid family name"));
}

#[actix_web::test]
async fn full_families_refuse_invitations() {
    let mut families = MockFamilyManager::new();
    families
        .expect_invite_member()
        .withf(|inviter, username| *inviter == UserRef::Telegram(1) && username == "guest")
        .returning(|_, _| Err(FamilyError::CapacityExceeded(5)));
    let (status, body) =
        post("/api/families/invite", json!({"telegram_id": 1, "username": "guest"}), family_routes(families)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json(&body)["error"], "The family already has the maximum of 5 members");
}

#[actix_web::test]
async fn accept_an_invitation() {
    let mut families = MockFamilyManager::new();
    families
        .expect_respond_to_invitation()
        .with(eq(UserRef::Telegram(2)), eq(12), eq(true))
        .times(1)
        .returning(|_, _, _| Ok(invitation(InviteStatus::Accepted)));
    let (status, body) = post(
        "/api/families/invitations/12/respond",
        json!({"telegram_id": 2, "accept": true}),
        family_routes(families),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json(&body)["status"], "accepted");
}

#[actix_web::test]
async fn answered_invitations_are_gone() {
    let mut families = MockFamilyManager::new();
    families.expect_respond_to_invitation().returning(|_, id, _| Err(FamilyError::InvitationNotFound(id)));
    let (status, _) = post(
        "/api/families/invitations/12/respond",
        json!({"telegram_id": 2, "accept": false}),
        family_routes(families),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn the_last_member_leaving_dissolves_the_family() {
    let mut families = MockFamilyManager::new();
    families.expect_leave_family().with(eq(UserRef::Telegram(8))).times(1).returning(|_| Ok(None));
    let (status, body) = post("/api/families/leave", json!({"telegram_id": 8}), family_routes(families)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json(&body), json!({"family_id": null}));
}

#[actix_web::test]
async fn the_owner_disbands_the_family() {
    let mut families = MockFamilyManager::new();
    families.expect_disband_family().with(eq(UserRef::Telegram(8))).times(1).returning(|_| Ok(Points::from(40)));
    let (status, body) = post("/api/families/disband", json!({"telegram_id": 8}), family_routes(families)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json(&body), json!({"returned": 40}));
}

#[actix_web::test]
async fn members_cannot_disband() {
    let mut families = MockFamilyManager::new();
    families
        .expect_disband_family()
        .returning(|_| Err(FamilyError::Forbidden("only the family owner can disband the family".into())));
    let (status, _) = post("/api/families/disband", json!({"telegram_id": 9}), family_routes(families)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

fn referral_routes(referrals: MockReferralManager) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        cfg.service(CreateReferralRoute::<MockReferralManager>::new())
            .app_data(web::Data::new(ReferralApi::new(referrals)));
    }
}

#[actix_web::test]
async fn refer_a_friend() {
    let mut referrals = MockReferralManager::new();
    referrals
        .expect_create_referral()
        .with(eq(UserRef::Telegram(20)), eq(UserRef::Telegram(10)))
        .times(1)
        .returning(|_, _| {
            Ok(Referral { id: 1, user_id: 2, inviter_id: 1, reward_points: Points::zero(), created_at: Utc::now() })
        });
    let body = json!({"referred_telegram_id": 20, "inviter_telegram_id": 10});
    let (status, body) = post("/api/referrals", body, referral_routes(referrals)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json(&body)["inviter_id"], 1);
}

#[actix_web::test]
async fn referrals_are_one_per_user() {
    let mut referrals = MockReferralManager::new();
    referrals.expect_create_referral().returning(|_, _| Err(ReferralError::AlreadyReferred(2)));
    let body = json!({"referred_telegram_id": 20, "inviter_telegram_id": 10});
    let (status, _) = post("/api/referrals", body, referral_routes(referrals)).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let referrals = MockReferralManager::new();
    let body = json!({"referred_telegram_id": 10, "inviter_telegram_id": 10});
    let (status, body) = post("/api/referrals", body, referral_routes(referrals)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json(&body)["error"], "Users cannot refer themselves");
}
