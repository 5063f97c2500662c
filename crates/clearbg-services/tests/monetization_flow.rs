//! Integration tests for the monetization gate over one shared store:
//! quota consumption, the advertisement unlock path and the payment unlock
//! path, plus account-scoped quota.

use std::sync::Arc;

use chrono::{Duration, Utc};
use uuid::Uuid;

use clearbg_core::config::{AppConfig, PriceTable};
use clearbg_core::models::{AdView, Currency, Identity, PaymentDetails};
use clearbg_services::{
    AccountService, AdResolution, AdViewVerifier, AuthDecision, GrantSource, IdentityResolver,
    MonetizationGate, PaymentIntentManager, QuotaLedger,
};
use clearbg_store::{AdViewRepository, DurableStore, MemoryStore};

struct World {
    store: Arc<dyn DurableStore>,
    ledger: Arc<QuotaLedger>,
    payments: Arc<PaymentIntentManager>,
    gate: MonetizationGate,
}

fn world() -> World {
    let config = AppConfig::default();
    let store: Arc<dyn DurableStore> = Arc::new(MemoryStore::new());

    let ledger = Arc::new(QuotaLedger::new(store.clone(), config.free_quota));
    let ads = Arc::new(AdViewVerifier::new(store.clone(), config.required_ad_watch));
    let payments = Arc::new(PaymentIntentManager::new(
        store.clone(),
        PriceTable::default(),
    ));

    World {
        gate: MonetizationGate::new(ledger.clone(), ads, payments.clone()),
        store,
        ledger,
        payments,
    }
}

fn valid_details() -> PaymentDetails {
    PaymentDetails {
        card_number: "4242424242424242".to_string(),
        expiry: "12/30".to_string(),
        cvc: "123".to_string(),
        holder_name: "Jo Doe".to_string(),
    }
}

async fn exhaust_quota(world: &World, identity: &Identity) {
    while world.ledger.try_consume(identity).await.unwrap() {}
}

#[tokio::test]
async fn anonymous_visitor_exhausts_quota_then_unlocks_via_ad() {
    let world = world();
    let resolver = IdentityResolver::new(world.store.clone());
    let identity = resolver.resolve(None).await.unwrap();

    // Three free removals, then the gate asks for a choice.
    for _ in 0..3 {
        let decision = world
            .gate
            .request_authorization(&identity, Uuid::new_v4())
            .await
            .unwrap();
        assert!(matches!(decision, AuthDecision::Granted(_)));
    }
    let decision = world
        .gate
        .request_authorization(&identity, Uuid::new_v4())
        .await
        .unwrap();
    assert!(matches!(decision, AuthDecision::NeedsChoice { .. }));

    // A fresh ad view is pending until the watch time has elapsed.
    let image_id = Uuid::new_v4();
    let ad_views = AdViewRepository::new(world.store.clone());
    let view = AdView::start(image_id, Utc::now());
    ad_views.save(&view).await.unwrap();
    assert!(matches!(
        world.gate.resolve_via_ad(view.id).await.unwrap(),
        AdResolution::Pending { .. }
    ));

    // Once the 30s have passed (back-dated here), the grant is issued
    // without touching the exhausted quota.
    let watched = AdView::start(image_id, Utc::now() - Duration::seconds(31));
    ad_views.save(&watched).await.unwrap();
    match world.gate.resolve_via_ad(watched.id).await.unwrap() {
        AdResolution::Granted(grant) => {
            assert_eq!(grant.via, GrantSource::Ad);
            assert_eq!(grant.image_id, image_id);
        }
        other => panic!("expected a grant, got {other:?}"),
    }
    assert_eq!(world.ledger.remaining(&identity).await.unwrap(), 0);
}

#[tokio::test]
async fn payment_path_unlocks_after_quota_exhaustion() {
    let world = world();
    let identity = Identity::Anonymous {
        device_id: "device_pay".to_string(),
    };
    exhaust_quota(&world, &identity).await;

    let image_id = Uuid::new_v4();
    let intent = world
        .payments
        .create_intent(image_id, Currency::Usd)
        .await
        .unwrap();

    let grant = world
        .gate
        .resolve_via_payment(intent.id, &valid_details())
        .await
        .unwrap();
    assert_eq!(grant.via, GrantSource::Payment);
    assert_eq!(grant.image_id, image_id);
    assert_eq!(world.ledger.remaining(&identity).await.unwrap(), 0);

    // Paying twice for the same intent is refused.
    assert!(world
        .gate
        .resolve_via_payment(intent.id, &valid_details())
        .await
        .is_err());
}

#[tokio::test]
async fn registered_and_anonymous_quotas_are_separate() {
    let world = world();
    let accounts = AccountService::new(world.store.clone());
    let resolver = IdentityResolver::new(world.store.clone());

    let anonymous = resolver.resolve(None).await.unwrap();
    exhaust_quota(&world, &anonymous).await;

    // Registering opens a fresh ledger entry for the account identity.
    let (_, session) = accounts
        .register("jo@example.com", "Jo", "hunter2!")
        .await
        .unwrap();
    let registered = resolver.resolve(Some(&session.token)).await.unwrap();
    assert!(registered.is_registered());

    assert_eq!(world.ledger.remaining(&anonymous).await.unwrap(), 0);
    assert_eq!(world.ledger.remaining(&registered).await.unwrap(), 3);
    assert!(world.ledger.try_consume(&registered).await.unwrap());
}
