//! Email service for transactional messages.
//!
//! Uses SMTP via lettre for delivery with Askama HTML and plain text templates.

use askama::Template;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{MultiPart, SinglePart, header::ContentType},
    transport::smtp::{Error as SmtpError, authentication::Credentials},
};
use secrecy::ExposeSecret;
use thiserror::Error;

use crate::config::EmailConfig;

/// One line of an order confirmation, preformatted for display.
#[derive(Debug, Clone)]
pub struct ConfirmationLine {
    pub name: String,
    pub quantity: u32,
    /// `price × quantity`, two decimals.
    pub line_total: String,
}

/// Everything an order confirmation email shows.
#[derive(Debug, Clone)]
pub struct OrderConfirmation {
    /// Recipient, taken from the order's shipping email.
    pub to: String,
    pub recipient_name: String,
    pub order_number: String,
    /// e.g. `March 05, 2025`
    pub order_date: String,
    pub lines: Vec<ConfirmationLine>,
    /// Two decimals.
    pub total: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub country: String,
}

#[derive(Template)]
#[template(path = "email/welcome.html")]
struct WelcomeEmailHtml<'a> {
    app_name: &'a str,
    username: &'a str,
    shop_url: &'a str,
}

#[derive(Template)]
#[template(path = "email/welcome.txt")]
struct WelcomeEmailText<'a> {
    app_name: &'a str,
    username: &'a str,
    shop_url: &'a str,
}

#[derive(Template)]
#[template(path = "email/order_confirmation.html")]
struct OrderConfirmationHtml<'a> {
    app_name: &'a str,
    order: &'a OrderConfirmation,
    orders_url: &'a str,
}

#[derive(Template)]
#[template(path = "email/order_confirmation.txt")]
struct OrderConfirmationText<'a> {
    app_name: &'a str,
    order: &'a OrderConfirmation,
    orders_url: &'a str,
}

/// Errors that can occur when sending email.
#[derive(Debug, Error)]
pub enum EmailError {
    /// SMTP transport error.
    #[error("SMTP error: {0}")]
    Smtp(#[from] SmtpError),

    /// Failed to build email message.
    #[error("Failed to build message: {0}")]
    MessageBuild(#[from] lettre::error::Error),

    /// Invalid email address.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    /// Template rendering error.
    #[error("Template error: {0}")]
    Template(#[from] askama::Error),
}

/// Subject line of the welcome email.
#[must_use]
pub fn welcome_subject(app_name: &str, username: &str) -> String {
    format!("Welcome to {app_name}, {username}!")
}

/// Subject line of the order confirmation email.
#[must_use]
pub fn order_confirmation_subject(order_number: &str) -> String {
    format!("Order Confirmation - {order_number}")
}

/// Email service for sending transactional emails.
#[derive(Clone)]
pub struct EmailService {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
    app_name: String,
    base_url: String,
}

impl EmailService {
    /// Create a new email service from configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the SMTP relay cannot be configured.
    pub fn new(config: &EmailConfig, app_name: &str, base_url: &url::Url) -> Result<Self, SmtpError> {
        let credentials = Credentials::new(
            config.smtp_username.clone(),
            config.smtp_password.expose_secret().to_string(),
        );

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
            .port(config.smtp_port)
            .credentials(credentials)
            .build();

        Ok(Self {
            mailer,
            from_address: config.from_address.clone(),
            app_name: app_name.to_owned(),
            base_url: base_url.as_str().trim_end_matches('/').to_owned(),
        })
    }

    /// Send a welcome email after registration.
    ///
    /// # Errors
    ///
    /// Returns error if email fails to send or template fails to render.
    pub async fn send_welcome(&self, to: &str, username: &str) -> Result<(), EmailError> {
        let shop_url = format!("{}/", self.base_url);
        let app_name = self.app_name.as_str();

        let html = WelcomeEmailHtml {
            app_name,
            username,
            shop_url: &shop_url,
        }
        .render()?;
        let text = WelcomeEmailText {
            app_name,
            username,
            shop_url: &shop_url,
        }
        .render()?;

        self.send_multipart_email(to, &welcome_subject(app_name, username), &text, &html)
            .await
    }

    /// Send an order confirmation to the order's shipping email.
    ///
    /// # Errors
    ///
    /// Returns error if email fails to send or template fails to render.
    pub async fn send_order_confirmation(&self, order: &OrderConfirmation) -> Result<(), EmailError> {
        let orders_url = format!("{}/orders", self.base_url);
        let app_name = self.app_name.as_str();

        let html = OrderConfirmationHtml {
            app_name,
            order,
            orders_url: &orders_url,
        }
        .render()?;
        let text = OrderConfirmationText {
            app_name,
            order,
            orders_url: &orders_url,
        }
        .render()?;

        self.send_multipart_email(
            &order.to,
            &order_confirmation_subject(&order.order_number),
            &text,
            &html,
        )
        .await
    }

    /// Send a multipart email with both plain text and HTML versions.
    async fn send_multipart_email(
        &self,
        to: &str,
        subject: &str,
        text_body: &str,
        html_body: &str,
    ) -> Result<(), EmailError> {
        let email = Message::builder()
            .from(
                self.from_address
                    .parse()
                    .map_err(|_| EmailError::InvalidAddress(self.from_address.clone()))?,
            )
            .to(to
                .parse()
                .map_err(|_| EmailError::InvalidAddress(to.to_string()))?)
            .subject(subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(text_body.to_string()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(html_body.to_string()),
                    ),
            )?;

        self.mailer.send(email).await?;

        tracing::info!(to = %to, subject = %subject, "Email sent successfully");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn confirmation() -> OrderConfirmation {
        OrderConfirmation {
            to: "ada@example.com".to_owned(),
            recipient_name: "Ada <Lovelace>".to_owned(),
            order_number: "ORD-00C0FFEE".to_owned(),
            order_date: "March 05, 2025".to_owned(),
            lines: vec![ConfirmationLine {
                name: "Desk Lamp".to_owned(),
                quantity: 2,
                line_total: "59.98".to_owned(),
            }],
            total: "59.98".to_owned(),
            address: "12 Analytical Way".to_owned(),
            city: "London".to_owned(),
            state: "Greater London".to_owned(),
            zip: "N1 9GU".to_owned(),
            country: "UK".to_owned(),
        }
    }

    #[test]
    fn test_subjects() {
        assert_eq!(welcome_subject("ShopEasy", "ada"), "Welcome to ShopEasy, ada!");
        assert_eq!(
            order_confirmation_subject("ORD-00C0FFEE"),
            "Order Confirmation - ORD-00C0FFEE"
        );
    }

    #[test]
    fn test_order_confirmation_renders_lines_and_address() {
        let order = confirmation();
        let text = OrderConfirmationText {
            app_name: "ShopEasy",
            order: &order,
            orders_url: "http://localhost:5000/orders",
        }
        .render()
        .unwrap();

        assert!(text.contains("ORD-00C0FFEE"));
        assert!(text.contains("Desk Lamp x 2 - $59.98"));
        assert!(text.contains("London, Greater London N1 9GU"));
    }

    #[test]
    fn test_html_escapes_customer_input() {
        let order = confirmation();
        let html = OrderConfirmationHtml {
            app_name: "ShopEasy",
            order: &order,
            orders_url: "http://localhost:5000/orders",
        }
        .render()
        .unwrap();

        assert!(html.contains("Ada &#60;Lovelace&#62;") || html.contains("Ada &lt;Lovelace&gt;"));
        assert!(!html.contains("<Lovelace>"));
    }

    #[test]
    fn test_welcome_renders_username() {
        let text = WelcomeEmailText {
            app_name: "ShopEasy",
            username: "ada",
            shop_url: "http://localhost:5000/",
        }
        .render()
        .unwrap();
        assert!(text.contains("Hi ada,"));
        assert!(text.contains("http://localhost:5000/"));
    }
}
