use chrono::{NaiveDate, TimeZone, Utc};
use meal_order::catalog::Catalog;
use meal_order::clients::SessionClient;
use meal_order::framework::{ResourceClient, FrameworkError};
use meal_order::model::{
    ContactInfo, CustomerProfile, DeliveryDetails, MealId, PortionSize, Receipt, SessionId,
    TimeSlot,
};
use meal_order::notify::mock::MockNotifier;
use meal_order::notify::NotifyError;
use meal_order::session_actor::{
    AttemptId, CheckoutPhase, OrderSession, SessionAction, SessionActionResult, SessionContext,
    SessionError,
};
use rust_decimal::Decimal;
use std::future::Future;
use std::sync::Arc;
use std::task::Poll;
use std::time::Duration;

/// Real session actor, scripted notifier.
struct Harness {
    client: SessionClient,
    raw: ResourceClient<OrderSession>,
    notifier: MockNotifier,
    handle: tokio::task::JoinHandle<()>,
}

impl Harness {
    fn start(timeout: Duration) -> Self {
        let (actor, raw) = meal_order::session_actor::new();
        let handle = tokio::spawn(actor.run(SessionContext::new(Arc::new(Catalog::weekly_menu()))));
        let notifier = MockNotifier::new();
        let client = SessionClient::new(raw.clone(), Arc::new(notifier.clone()), timeout);
        Self {
            client,
            raw,
            notifier,
            handle,
        }
    }

    async fn stop(self) {
        drop(self.client);
        drop(self.raw);
        self.handle.await.unwrap();
    }
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 4, 1).unwrap()
}

fn profile() -> CustomerProfile {
    CustomerProfile {
        contact: ContactInfo {
            first_name: "Sam".into(),
            last_name: "Rivera".into(),
            email: "sam@example.com".into(),
            phone: "(555) 010-2020".into(),
            ..Default::default()
        },
        delivery: DeliveryDetails {
            street: "12 Elm St".into(),
            city: "Springfield".into(),
            state: "IL".into(),
            zip: "62701".into(),
            date: NaiveDate::from_ymd_opt(2025, 4, 3),
            time_slot: Some(TimeSlot::Morning),
            special_instructions: String::new(),
        },
        ..Default::default()
    }
}

fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

#[tokio::test]
async fn test_pricing_holds_for_every_cart_shape() {
    let h = Harness::start(Duration::from_secs(5));
    let session = h.client.open_session().await.unwrap();
    let portions = [PortionSize::Small, PortionSize::Regular, PortionSize::Large];

    for (i, portion) in portions.iter().enumerate() {
        let meal = MealId(i as u32 + 1);
        h.client.add_line(session, meal, *portion).await.unwrap();
        h.client.set_quantity(session, meal, i as i32 + 2).await.unwrap();

        let price = h.client.price(session).await.unwrap();
        assert_eq!(price.total, price.subtotal + price.tax + price.delivery_fee);
        assert_eq!(price.delivery_fee, dec("5.99"));
        assert_eq!(price.subtotal.scale(), 2);
        assert_eq!(price.tax.scale(), 2);
    }

    // 2 x 10.20 + 3 x 12.00 + 4 x 15.00
    let price = h.client.price(session).await.unwrap();
    assert_eq!(price.subtotal, dec("116.40"));
    assert_eq!(price.tax, dec("9.31"));
    assert_eq!(price.total, dec("131.70"));

    h.stop().await;
}

#[tokio::test]
async fn test_cart_edits() {
    let h = Harness::start(Duration::from_secs(5));
    let session = h.client.open_session().await.unwrap();

    // Unknown meals never create a line.
    assert_eq!(
        h.client.add_line(session, MealId(77), PortionSize::Regular).await.unwrap_err(),
        SessionError::MealNotFound(MealId(77))
    );

    // Add then remove leaves the cart as it was.
    h.client.add_line(session, MealId(1), PortionSize::Regular).await.unwrap();
    let before = h.client.session(session).await.unwrap().cart;
    h.client.add_line(session, MealId(3), PortionSize::Small).await.unwrap();
    assert!(h.client.remove_line(session, MealId(3)).await.unwrap());
    assert!(!h.client.remove_line(session, MealId(3)).await.unwrap());
    assert_eq!(h.client.session(session).await.unwrap().cart, before);

    // Quantity edits: absent line ignored, zero removes.
    assert!(!h.client.set_quantity(session, MealId(2), 5).await.unwrap());
    assert!(h.client.set_quantity(session, MealId(1), 0).await.unwrap());
    let empty = h.client.session(session).await.unwrap();
    assert!(empty.cart.is_empty());
    assert_eq!(h.client.price(session).await.unwrap().total, Decimal::ZERO);

    h.stop().await;
}

#[tokio::test]
async fn test_empty_cart_is_rejected_whatever_the_profile() {
    let h = Harness::start(Duration::from_secs(5));
    for profile in [CustomerProfile::default(), profile()] {
        let session = h.client.open_session_with(profile).await.unwrap();
        assert_eq!(
            h.client.submit_order(session, today()).await.unwrap_err(),
            SessionError::EmptyCart
        );
    }
    assert!(h.notifier.orders().is_empty());
    h.stop().await;
}

#[tokio::test]
async fn test_failed_submission_can_be_retried() {
    let h = Harness::start(Duration::from_secs(5));
    h.notifier
        .expect_order(Err(NotifyError::Unavailable("provider down".into())));
    h.notifier.expect_order(Ok(Receipt::accepted("email_2")));

    let session = h.client.open_session_with(profile()).await.unwrap();
    h.client.add_line(session, MealId(1), PortionSize::Regular).await.unwrap();

    let first = h.client.submit_order(session, today()).await;
    assert!(matches!(first, Err(SessionError::Submission(ref r)) if r.contains("provider down")));

    let snapshot = h.client.session(session).await.unwrap();
    assert_eq!(snapshot.phase(), CheckoutPhase::Editing);
    assert!(snapshot.state.notice().is_some());
    assert_eq!(snapshot.cart.item_count(), 1);
    assert_eq!(snapshot.profile, profile());

    let order = h.client.submit_order(session, today()).await.unwrap();
    let sent = h.notifier.orders();
    assert_eq!(sent.len(), 2);
    assert_ne!(sent[0].order_number, sent[1].order_number);
    assert_eq!(sent[1], order);

    h.notifier.verify();
    h.stop().await;
}

#[tokio::test]
async fn test_second_submit_while_submitting_is_rejected() {
    let h = Harness::start(Duration::from_secs(5));
    h.notifier
        .expect_order_after(Duration::from_millis(200), Ok(Receipt::accepted("email_3")));

    let session = h.client.open_session_with(profile()).await.unwrap();
    h.client.add_line(session, MealId(2), PortionSize::Large).await.unwrap();

    let first = {
        let client = h.client.clone();
        tokio::spawn(async move { client.submit_order(session, today()).await })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(
        h.client.submit_order(session, today()).await.unwrap_err(),
        SessionError::SubmissionInProgress
    );
    assert_eq!(
        h.client.remove_line(session, MealId(2)).await.unwrap_err(),
        SessionError::NotEditing(CheckoutPhase::Submitting)
    );

    let order = first.await.unwrap().unwrap();
    assert_eq!(order.price.subtotal, dec("15.00"));
    assert_eq!(h.notifier.orders().len(), 1);
    assert_eq!(
        h.client.session(session).await.unwrap().phase(),
        CheckoutPhase::Confirmed
    );

    h.notifier.verify();
    h.stop().await;
}

#[tokio::test]
async fn test_submit_dropped_before_reply_returns_to_editing() {
    let h = Harness::start(Duration::from_secs(5));
    let session = h.client.open_session_with(profile()).await.unwrap();
    h.client.add_line(session, MealId(1), PortionSize::Regular).await.unwrap();

    // One poll sends BeginCheckout; the reply is never read.
    let mut submit = Box::pin(h.client.submit_order(session, today()));
    let first = std::future::poll_fn(|cx| Poll::Ready(submit.as_mut().poll(cx))).await;
    assert!(first.is_pending());
    drop(submit);

    tokio::time::sleep(Duration::from_millis(50)).await;
    let snapshot = h.client.session(session).await.unwrap();
    assert_eq!(snapshot.phase(), CheckoutPhase::Editing);
    assert!(snapshot.state.notice().is_some_and(|n| n.contains("submission abandoned")));
    assert_eq!(snapshot.cart.item_count(), 1);
    assert!(h.notifier.orders().is_empty());

    h.notifier.expect_order(Ok(Receipt::accepted("email_4")));
    h.client.submit_order(session, today()).await.unwrap();
    assert_eq!(
        h.client.session(session).await.unwrap().phase(),
        CheckoutPhase::Confirmed
    );

    h.notifier.verify();
    h.stop().await;
}

#[tokio::test]
async fn test_abandon_while_submitting() {
    let h = Harness::start(Duration::from_secs(5));
    h.notifier
        .expect_order_after(Duration::from_millis(200), Ok(Receipt::accepted("email_5")));

    let session = h.client.open_session_with(profile()).await.unwrap();
    h.client.add_line(session, MealId(2), PortionSize::Regular).await.unwrap();

    let pending = {
        let client = h.client.clone();
        tokio::spawn(async move { client.submit_order(session, today()).await })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(
        h.client.session(session).await.unwrap().phase(),
        CheckoutPhase::Submitting
    );

    h.client.abandon(session).await.unwrap();
    assert_eq!(
        pending.await.unwrap().unwrap_err(),
        SessionError::NotFound(session.to_string())
    );
    assert_eq!(h.notifier.orders().len(), 1);

    let next = h.client.open_session().await.unwrap();
    assert_ne!(next, session);
    let fresh = h.client.session(next).await.unwrap();
    assert_eq!(fresh.phase(), CheckoutPhase::Editing);
    assert!(fresh.cart.is_empty());
    assert_eq!(h.client.price(next).await.unwrap().total, Decimal::ZERO);

    h.notifier.verify();
    h.stop().await;
}

#[tokio::test]
async fn test_timeout_returns_to_editing() {
    let h = Harness::start(Duration::from_millis(30));
    h.notifier
        .expect_order_after(Duration::from_secs(2), Ok(Receipt::accepted("late")));

    let session = h.client.open_session_with(profile()).await.unwrap();
    h.client.add_line(session, MealId(1), PortionSize::Regular).await.unwrap();

    let result = h.client.submit_order(session, today()).await;
    assert!(matches!(result, Err(SessionError::Submission(_))));
    assert_eq!(
        h.client.session(session).await.unwrap().phase(),
        CheckoutPhase::Editing
    );

    h.stop().await;
}

#[tokio::test]
async fn test_completion_after_reset_is_stale() {
    let h = Harness::start(Duration::from_secs(5));
    let session = h.client.open_session_with(profile()).await.unwrap();
    h.client.add_line(session, MealId(3), PortionSize::Regular).await.unwrap();

    let begin = SessionAction::BeginCheckout {
        attempt: AttemptId::next(),
        today: today(),
        submitted_at: Utc.with_ymd_and_hms(2025, 4, 1, 9, 30, 0).unwrap(),
    };
    let SessionActionResult::BeginCheckout(submission) =
        h.raw.perform_action(session, begin).await.unwrap()
    else {
        panic!("expected submission");
    };
    assert_eq!(submission.order.order_number.as_str(), "ORD-1743499800000");

    h.client.reset(session).await.unwrap();

    let late = h
        .raw
        .perform_action(
            session,
            SessionAction::ConfirmSubmission {
                attempt: submission.attempt,
                receipt: Receipt::accepted("late"),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(
        late.downcast_entity::<SessionError>(),
        Ok(SessionError::StaleSubmission(a)) if a == submission.attempt
    ));

    let snapshot = h.client.session(session).await.unwrap();
    assert_eq!(snapshot.phase(), CheckoutPhase::Editing);
    assert!(snapshot.cart.is_empty());

    h.stop().await;
}

#[tokio::test]
async fn test_unknown_session() {
    let h = Harness::start(Duration::from_secs(5));
    let result = h.raw.perform_action(SessionId(404), SessionAction::Price).await;
    assert!(matches!(result, Err(FrameworkError::NotFound(ref id)) if id == "session_404"));
    assert_eq!(
        h.client.reset(SessionId(404)).await.unwrap_err(),
        SessionError::NotFound("session_404".into())
    );
    h.stop().await;
}
