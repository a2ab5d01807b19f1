//! Email delivery through the Resend REST API.
//!
//! Every order and signup sends one email to the customer and, when owner
//! addresses are configured, one notification addressed to all of them. Only
//! the customer email decides success; a failed owner notification is logged.

use crate::model::{Order, Receipt, Subscription};
use crate::notify::{Notifier, NotifyError};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info, instrument, warn};

#[derive(Debug, Clone)]
pub struct ResendConfig {
    pub api_key: String,
    pub base_url: String,
    pub from: String,
    /// Recipients of the owner notification. Empty disables it.
    pub owners: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct SendResponse {
    id: Option<String>,
}

pub struct ResendNotifier {
    client: reqwest::Client,
    config: ResendConfig,
}

impl ResendNotifier {
    pub fn new(config: ResendConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    fn payload(&self, to: &[String], subject: &str, html: &str) -> Value {
        json!({
            "from": self.config.from,
            "to": to,
            "subject": subject,
            "html": html,
        })
    }

    #[instrument(skip(self, html))]
    async fn send(&self, to: &[String], subject: &str, html: &str) -> Result<Option<String>, NotifyError> {
        let url = format!("{}/emails", self.config.base_url.trim_end_matches('/'));
        let response = self
            .client
            .post(url)
            .bearer_auth(&self.config.api_key)
            .json(&self.payload(to, subject, html))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), %body, "Email rejected");
            return Err(NotifyError::Rejected {
                status: status.as_u16(),
                body,
            });
        }
        let sent: SendResponse = response.json().await?;
        debug!(id = ?sent.id, "Email sent");
        Ok(sent.id)
    }

    async fn notify_owners(&self, subject: &str, html: &str) {
        if self.config.owners.is_empty() {
            return;
        }
        if let Err(e) = self.send(&self.config.owners, subject, html).await {
            warn!(error = %e, recipients = self.config.owners.len(), "Owner notification failed");
        }
    }
}

#[async_trait]
impl Notifier for ResendNotifier {
    async fn submit_order(&self, order: &Order) -> Result<Receipt, NotifyError> {
        let customer = &order.customer.contact;
        let subject = format!("Your HoneyByJasmine order {}", order.order_number);
        let id = self
            .send(&[customer.email.clone()], &subject, &order_html(order))
            .await?;
        info!(order_number = %order.order_number, "Order confirmation sent");

        let owner_subject = format!(
            "New Order {}: {}",
            order.order_number,
            order.customer.full_name()
        );
        self.notify_owners(&owner_subject, &order_html(order)).await;

        Ok(Receipt {
            accepted: true,
            reference_id: id.or_else(|| Some(order.order_number.to_string())),
        })
    }

    async fn subscribe(&self, subscription: &Subscription) -> Result<Receipt, NotifyError> {
        let id = self
            .send(
                &[subscription.email.clone()],
                "Welcome to The Honey List! 🍯",
                &welcome_html(subscription),
            )
            .await?;
        info!(first_name = %subscription.first_name, "Welcome email sent");

        let owner_subject = format!("New Honey List Subscriber: {}", subscription.first_name);
        self.notify_owners(&owner_subject, &subscriber_html(subscription))
            .await;

        Ok(Receipt {
            accepted: true,
            reference_id: id,
        })
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn order_html(order: &Order) -> String {
    let customer = &order.customer;
    let rows: String = order
        .lines
        .iter()
        .map(|line| {
            format!(
                "<tr><td>{} x {} ({})</td><td>${:.2}</td></tr>",
                line.quantity,
                escape(&line.name),
                line.portion,
                line.line_total()
            )
        })
        .collect();
    let delivery = &customer.delivery;
    let when = match (delivery.date, delivery.time_slot) {
        (Some(date), Some(slot)) => format!("{} ({slot})", date.format("%A, %B %-d, %Y")),
        _ => String::from("to be scheduled"),
    };

    format!(
        "<h1>Thank you, {name}!</h1>\
         <p>Order <strong>{number}</strong></p>\
         <table>{rows}\
         <tr><td>Subtotal</td><td>${subtotal}</td></tr>\
         <tr><td>Tax</td><td>${tax}</td></tr>\
         <tr><td>Delivery</td><td>${fee}</td></tr>\
         <tr><td><strong>Total</strong></td><td><strong>${total}</strong></td></tr></table>\
         <p>Delivery to {street}, {city}, {state} {zip} on {when}.</p>",
        name = escape(customer.contact.first_name.trim()),
        number = order.order_number,
        subtotal = order.price.subtotal,
        tax = order.price.tax,
        fee = order.price.delivery_fee,
        total = order.price.total,
        street = escape(&delivery.street),
        city = escape(&delivery.city),
        state = escape(&delivery.state),
        zip = escape(&delivery.zip),
    )
}

fn welcome_html(subscription: &Subscription) -> String {
    format!(
        "<h1>Welcome to The Honey List, {}!</h1>\
         <p>You'll be the first to hear about new menus, delivery days and seasonal specials.</p>",
        escape(subscription.first_name.trim())
    )
}

fn subscriber_html(subscription: &Subscription) -> String {
    let city = subscription.city.as_deref().unwrap_or("Not provided");
    let mut html = format!(
        "<h2>New subscriber</h2><p>Name: {}</p><p>Email: {}</p><p>City: {}</p>",
        escape(&subscription.first_name),
        escape(&subscription.email),
        escape(city)
    );
    if let Some(prefs) = &subscription.preferences {
        if let Ok(json) = serde_json::to_string_pretty(prefs) {
            html.push_str(&format!("<pre>{}</pre>", escape(&json)));
        }
    }
    html
}
