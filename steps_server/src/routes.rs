//! Request handler definitions
//!
//! Define each route and it handler here.
//! Handlers that are more than a line or two MUST go into a separate module. Keep this module neat and tidy 🙏
//!
//! A note about performance:
//! Since each worker thread processes its requests sequentially, handlers which block the current thread will cause the
//! current worker to stop processing new requests:
//! ```nocompile
//!     fn my_handler() -> impl Responder {
//!         std::thread::sleep(Duration::from_secs(5)); // <-- Bad practice! Will cause the current worker thread to
//! hang!
//!     }
//! ```
//! For this reason, any long, non-cpu-bound operation (e.g. I/O, database operations, etc.) should be expressed as
//! futures or asynchronous functions. Async handlers get executed concurrently by worker threads and thus don’t block
//! execution.
//!
//! All walker-facing routes identify the walker by their Telegram id.
use actix_web::{get, web, HttpResponse, Responder};
use chrono::Utc;
use log::*;
use steps_engine::{
    db_types::{NewUser, UserRef},
    engine_api::ledger_api::DEFAULT_HISTORY_LIMIT,
    traits::{
        AccountManagement,
        FamilyManagement,
        LedgerManagement,
        ReferralManagement,
        ShopManagement,
        WalkStore,
    },
    walk::{MessagingSink, TemperatureService},
    AccountApi,
    FamilyApi,
    LedgerApi,
    ReferralApi,
    ShopApi,
    WalkTracker,
};

use crate::{
    data_objects::{
        BuyerRequest,
        ChooseFormRequest,
        Contribution,
        CreateFamilyRequest,
        DisbandResult,
        HistoryParams,
        InvitationResponse,
        InviteRequest,
        JsonResponse,
        LeaveResult,
        LocationReport,
        ReferralRequest,
        RegisterUserRequest,
        WalkGoal,
    },
    errors::ServerError,
};

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------   Users  ----------------------------------------------------
route!(register_user => Post "/users" impl AccountManagement);
/// Registers a walker the first time they talk to the bot. Registering again refreshes the username.
pub async fn register_user<B: AccountManagement>(
    body: web::Json<RegisterUserRequest>,
    api: web::Data<AccountApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let RegisterUserRequest { telegram_id, username } = body.into_inner();
    debug!("💻️ POST register user {telegram_id}");
    let mut user = NewUser::new(telegram_id);
    if let Some(name) = username.filter(|n| !n.trim().is_empty()) {
        user = user.with_username(name.trim().trim_start_matches('@'));
    }
    let account = api.register(user).await?;
    Ok(HttpResponse::Ok().json(account))
}

//----------------------------------------------   Walks  ----------------------------------------------------
route!(choose_walk_form => Post "/walks/{subject}/form" impl WalkStore, TemperatureService, MessagingSink);
/// Opens a walk session in the chosen form. The response carries the step goal, which is what is left of today's
/// allowance. The walk starts with the first live location share.
pub async fn choose_walk_form<B, T, M>(
    path: web::Path<i64>,
    body: web::Json<ChooseFormRequest>,
    tracker: web::Data<WalkTracker<B, T, M>>,
) -> Result<HttpResponse, ServerError>
where
    B: WalkStore,
    T: TemperatureService,
    M: MessagingSink,
{
    let subject = path.into_inner();
    let form = body.into_inner().form;
    debug!("💻️ POST walk form {form} for {subject}");
    let goal = tracker.choose_form(subject, form, Utc::now().date_naive())?;
    Ok(HttpResponse::Ok().json(WalkGoal { subject, form, goal }))
}

route!(cancel_walk => Post "/walks/{subject}/cancel" impl WalkStore, TemperatureService, MessagingSink);
pub async fn cancel_walk<B, T, M>(
    path: web::Path<i64>,
    tracker: web::Data<WalkTracker<B, T, M>>,
) -> Result<HttpResponse, ServerError>
where
    B: WalkStore,
    T: TemperatureService,
    M: MessagingSink,
{
    let subject = path.into_inner();
    debug!("💻️ POST cancel walk for {subject}");
    tracker.cancel(subject)?;
    Ok(HttpResponse::Ok().json(JsonResponse::success("Walk cancelled")))
}

route!(walk_location => Post "/walks/{subject}/location" impl WalkStore, TemperatureService, MessagingSink);
/// Feeds a location share into the walker's session. The update is timestamped on receipt.
pub async fn walk_location<B, T, M>(
    path: web::Path<i64>,
    body: web::Json<LocationReport>,
    tracker: web::Data<WalkTracker<B, T, M>>,
) -> Result<HttpResponse, ServerError>
where
    B: WalkStore,
    T: TemperatureService,
    M: MessagingSink,
{
    let update = body.into_inner().into_update(path.into_inner());
    trace!("💻️ POST location for {} (live: {})", update.subject, update.live);
    let outcome = tracker.location_update(update).await?;
    Ok(HttpResponse::Ok().json(outcome))
}

route!(finish_walk => Post "/walks/{subject}/finish" impl WalkStore, TemperatureService, MessagingSink);
pub async fn finish_walk<B, T, M>(
    path: web::Path<i64>,
    tracker: web::Data<WalkTracker<B, T, M>>,
) -> Result<HttpResponse, ServerError>
where
    B: WalkStore,
    T: TemperatureService,
    M: MessagingSink,
{
    let subject = path.into_inner();
    debug!("💻️ POST finish walk for {subject}");
    match tracker.finish_walk(subject).await? {
        Some(summary) => Ok(HttpResponse::Ok().json(summary)),
        None => Ok(HttpResponse::Ok().json(JsonResponse::failure("There is no walk in progress"))),
    }
}

//----------------------------------------------   Accounts  ----------------------------------------------------
route!(history => Get "/accounts/{subject}/history" impl LedgerManagement);
/// The walker's ledger entries merged with their family's, newest first.
pub async fn history<B: LedgerManagement>(
    path: web::Path<i64>,
    query: web::Query<HistoryParams>,
    api: web::Data<LedgerApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let subject = path.into_inner();
    let limit = query.limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
    debug!("💻️ GET history for {subject} (limit {limit})");
    let entries = api.history(UserRef::Telegram(subject), limit).await?;
    Ok(HttpResponse::Ok().json(entries))
}

route!(contribution => Get "/accounts/{subject}/contribution" impl LedgerManagement);
pub async fn contribution<B: LedgerManagement>(
    path: web::Path<i64>,
    api: web::Data<LedgerApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let telegram_id = path.into_inner();
    debug!("💻️ GET contribution for {telegram_id}");
    let total = api.contribution_total(UserRef::Telegram(telegram_id)).await?;
    Ok(HttpResponse::Ok().json(Contribution { telegram_id, total }))
}

route!(stats => Get "/accounts/{subject}/stats" impl FamilyManagement);
pub async fn stats<B: FamilyManagement>(
    path: web::Path<i64>,
    api: web::Data<FamilyApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let subject = path.into_inner();
    debug!("💻️ GET stats for {subject}");
    let stats = api.stats(UserRef::Telegram(subject)).await?;
    Ok(HttpResponse::Ok().json(stats))
}

//----------------------------------------------   Shop  ----------------------------------------------------
route!(promo_groups => Get "/promo/groups" impl ShopManagement);
pub async fn promo_groups<B: ShopManagement>(api: web::Data<ShopApi<B>>) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET promo groups");
    let groups = api.promo_groups().await?;
    Ok(HttpResponse::Ok().json(groups))
}

route!(buy_promo_code => Post "/promo/{group_id}/purchase" impl ShopManagement);
/// Issues one code from the group and charges the buyer's family for it, or does neither.
pub async fn buy_promo_code<B: ShopManagement>(
    path: web::Path<i64>,
    body: web::Json<BuyerRequest>,
    api: web::Data<ShopApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let group_id = path.into_inner();
    let buyer = body.telegram_id;
    debug!("💻️ POST buy promo code from group #{group_id} for {buyer}");
    let purchase = api.buy_promo_code(group_id, UserRef::Telegram(buyer)).await?;
    Ok(HttpResponse::Ok().json(purchase))
}

route!(buy_product => Post "/catalog/{product_id}/purchase" impl ShopManagement);
pub async fn buy_product<B: ShopManagement>(
    path: web::Path<i64>,
    body: web::Json<BuyerRequest>,
    api: web::Data<ShopApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let product_id = path.into_inner();
    let buyer = body.telegram_id;
    debug!("💻️ POST buy product #{product_id} for {buyer}");
    let purchase = api.buy_product(product_id, UserRef::Telegram(buyer)).await?;
    Ok(HttpResponse::Ok().json(purchase))
}

//----------------------------------------------   Families  ----------------------------------------------------
route!(create_family => Post "/families" impl FamilyManagement);
pub async fn create_family<B: FamilyManagement>(
    body: web::Json<CreateFamilyRequest>,
    api: web::Data<FamilyApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let CreateFamilyRequest { telegram_id, name } = body.into_inner();
    debug!("💻️ POST create family '{name}' for {telegram_id}");
    let family = api.create_family(UserRef::Telegram(telegram_id), &name).await?;
    Ok(HttpResponse::Ok().json(family))
}

route!(invite => Post "/families/invite" impl FamilyManagement);
pub async fn invite<B: FamilyManagement>(
    body: web::Json<InviteRequest>,
    api: web::Data<FamilyApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let InviteRequest { telegram_id, username } = body.into_inner();
    debug!("💻️ POST invite {username} from {telegram_id}");
    let invitation = api.invite(UserRef::Telegram(telegram_id), &username).await?;
    Ok(HttpResponse::Ok().json(invitation))
}

route!(respond_to_invitation => Post "/families/invitations/{id}/respond" impl FamilyManagement);
pub async fn respond_to_invitation<B: FamilyManagement>(
    path: web::Path<i64>,
    body: web::Json<InvitationResponse>,
    api: web::Data<FamilyApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let invitation_id = path.into_inner();
    let InvitationResponse { telegram_id, accept } = body.into_inner();
    debug!("💻️ POST respond to invitation #{invitation_id} from {telegram_id}: {accept}");
    let invitation = api.respond(UserRef::Telegram(telegram_id), invitation_id, accept).await?;
    Ok(HttpResponse::Ok().json(invitation))
}

route!(leave_family => Post "/families/leave" impl FamilyManagement);
pub async fn leave_family<B: FamilyManagement>(
    body: web::Json<BuyerRequest>,
    api: web::Data<FamilyApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let telegram_id = body.telegram_id;
    debug!("💻️ POST leave family for {telegram_id}");
    let family_id = api.leave(UserRef::Telegram(telegram_id)).await?;
    Ok(HttpResponse::Ok().json(LeaveResult { family_id }))
}

route!(disband_family => Post "/families/disband" impl FamilyManagement);
pub async fn disband_family<B: FamilyManagement>(
    body: web::Json<BuyerRequest>,
    api: web::Data<FamilyApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let telegram_id = body.telegram_id;
    debug!("💻️ POST disband family for {telegram_id}");
    let returned = api.disband(UserRef::Telegram(telegram_id)).await?;
    Ok(HttpResponse::Ok().json(DisbandResult { returned }))
}

//----------------------------------------------   Referrals  ----------------------------------------------------
route!(create_referral => Post "/referrals" impl ReferralManagement);
pub async fn create_referral<B: ReferralManagement>(
    body: web::Json<ReferralRequest>,
    api: web::Data<ReferralApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let ReferralRequest { referred_telegram_id, inviter_telegram_id } = body.into_inner();
    debug!("💻️ POST referral of {referred_telegram_id} by {inviter_telegram_id}");
    let referral =
        api.refer(UserRef::Telegram(referred_telegram_id), UserRef::Telegram(inviter_telegram_id)).await?;
    Ok(HttpResponse::Ok().json(referral))
}

route!(referral_summary => Get "/referrals/{subject}" impl ReferralManagement);
pub async fn referral_summary<B: ReferralManagement>(
    path: web::Path<i64>,
    api: web::Data<ReferralApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let subject = path.into_inner();
    debug!("💻️ GET referral summary for {subject}");
    let summary = api.summary(UserRef::Telegram(subject)).await?;
    Ok(HttpResponse::Ok().json(summary))
}
