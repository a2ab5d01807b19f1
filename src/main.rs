//! Demo run of the storefront: shows the filtered menu, places one order
//! through the full checkout and optionally joins the mailing list.

use chrono::{Days, Local};
use clap::Parser;
use meal_order::config::Config;
use meal_order::lifecycle::{setup_tracing, Storefront};
use meal_order::model::{
    ContactInfo, DeliveryDetails, PortionSize, Subscription, TimeSlot,
};
use meal_order::session_actor::ProfileUpdate;
use tracing::{error, info, Instrument};

#[tokio::main]
async fn main() -> Result<(), String> {
    let config = Config::parse();
    config.apply_log_level();
    setup_tracing();

    let catalog = config.catalog()?;
    let store = Storefront::start(catalog, config.notifier(), config.submit_timeout());

    let shown = store.catalog.filtered(&config.preferences());
    for meal in &shown {
        info!(
            id = meal.id.0,
            name = %meal.name,
            price = %meal.base_price,
            calories = meal.calories,
            protein = meal.protein_grams,
            "Menu"
        );
    }

    let today = Local::now().date_naive();
    let span = tracing::info_span!("order_processing");
    let placed = async {
        if shown.is_empty() {
            info!("No meals match your preferences, nothing to order");
            return Ok::<_, String>(None);
        }
        let client = &store.session_client;
        let session = client.open_session().await.map_err(|e| e.to_string())?;

        for (meal, portion) in shown.iter().zip([PortionSize::Regular, PortionSize::Large]) {
            client
                .add_line(session, meal.id, portion)
                .await
                .map_err(|e| e.to_string())?;
        }
        let price = client.price(session).await.map_err(|e| e.to_string())?;
        info!(subtotal = %price.subtotal, tax = %price.tax, delivery = %price.delivery_fee, total = %price.total, "Cart priced");

        client
            .update_profile(
                session,
                ProfileUpdate {
                    contact: Some(ContactInfo {
                        first_name: "Alice".into(),
                        last_name: "Baker".into(),
                        email: "alice@example.com".into(),
                        phone: "(512) 555-0199".into(),
                        ..Default::default()
                    }),
                    delivery: Some(DeliveryDetails {
                        street: "100 Congress Ave".into(),
                        city: "Austin".into(),
                        state: "TX".into(),
                        zip: "78701".into(),
                        date: today.checked_add_days(Days::new(2)),
                        time_slot: Some(TimeSlot::Evening),
                        special_instructions: "Leave at the front desk".into(),
                    }),
                    dietary: None,
                },
            )
            .await
            .map_err(|e| e.to_string())?;

        client
            .submit_order(session, today)
            .await
            .map(Some)
            .map_err(|e| e.to_string())
    }
    .instrument(span)
    .await;

    match &placed {
        Ok(None) => {}
        Ok(Some(order)) => info!(order_number = %order.order_number, total = %order.price.total, "Order placed"),
        Err(e) => error!(error = %e, "Order not placed"),
    }

    if let Some(email) = &config.subscribe_email {
        let span = tracing::info_span!("subscription");
        let result = store
            .subscription_client
            .subscribe(Subscription::new("Alice", email.as_str()).with_city("Austin"))
            .instrument(span)
            .await;
        if let Err(e) = result {
            error!(error = %e, "Signup failed");
        }
    }

    store.shutdown().await?;
    placed.map(|_| ())
}
