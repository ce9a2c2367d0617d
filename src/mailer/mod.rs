// 邮件发送
// 联系表单的消息统一发给站点管理员，收件人由配置决定

use async_trait::async_trait;
use lettre::message::{Mailbox, header::ContentType};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use thiserror::Error;

use crate::config::Config;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("invalid mailbox: {0}")]
    Address(#[from] lettre::address::AddressError),
    #[error("failed to build message: {0}")]
    Build(#[from] lettre::error::Error),
    #[error("smtp transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),
}

/// 待发送的邮件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub subject: String,
    pub html_body: String,
    pub reply_to: Option<String>,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: EmailMessage) -> Result<(), MailError>;
}

/// 通过 SMTP(STARTTLS) 发送
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Mailbox,
}

impl SmtpMailer {
    pub fn new(
        host: &str,
        port: u16,
        username: String,
        password: String,
        from: &str,
        to: &str,
    ) -> Result<Self, MailError> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)?
            .port(port)
            .credentials(Credentials::new(username, password))
            .build();

        Ok(Self {
            transport,
            from: from.parse()?,
            to: to.parse()?,
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, message: EmailMessage) -> Result<(), MailError> {
        let mut builder = Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(message.subject)
            .header(ContentType::TEXT_HTML);

        if let Some(reply_to) = message.reply_to.as_deref() {
            match reply_to.parse::<Mailbox>() {
                Ok(mailbox) => builder = builder.reply_to(mailbox),
                Err(e) => tracing::warn!("Ignoring invalid reply-to {:?}: {}", reply_to, e),
            }
        }

        let email = builder.body(message.html_body)?;
        self.transport.send(email).await?;

        tracing::info!("Email sent to {}", self.to);
        Ok(())
    }
}

/// 未配置 SMTP 时只记录日志
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, message: EmailMessage) -> Result<(), MailError> {
        tracing::info!(
            subject = %message.subject,
            reply_to = ?message.reply_to,
            "SMTP is not configured, email logged instead of sent:\n{}",
            message.html_body
        );
        Ok(())
    }
}

/// 根据配置选择邮件发送方式
pub fn from_config(config: &Config) -> Result<Box<dyn Mailer>, MailError> {
    match (&config.smtp_username, &config.smtp_password, &config.mail_to) {
        (Some(username), Some(password), Some(to)) => {
            let from = config.mail_from.as_deref().unwrap_or(username);
            let mailer = SmtpMailer::new(
                &config.smtp_host,
                config.smtp_port,
                username.clone(),
                password.clone(),
                from,
                to,
            )?;
            tracing::info!("SMTP mailer configured via {}:{}", config.smtp_host, config.smtp_port);
            Ok(Box::new(mailer))
        }
        _ => {
            tracing::warn!("SMTP credentials or recipient missing, falling back to log mailer");
            Ok(Box::new(LogMailer))
        }
    }
}

pub const CONTACT_SUBJECT: &str = "Message from your website!";

/// 联系表单邮件正文，用户输入全部转义
pub fn contact_message(name: &str, email: &str, phone: &str, text: &str) -> EmailMessage {
    let name = escape_html(name);
    let email_html = escape_html(email);
    let phone = escape_html(phone);
    let text = escape_html(text);

    let html_body = format!(
        r#"<html>
<body>
    <p><strong>Name:</strong> {name}</p>
    <p><strong>Email:</strong> {email_html}</p>
    <p><strong>Phone:</strong> <a href="tel:{phone}">{phone}</a></p>
    <p><strong>Message:</strong></p>
    <p>{text}</p>
    <p>Best wishes,<br>Your team.</p>
</body>
</html>"#
    );

    EmailMessage {
        subject: CONTACT_SUBJECT.to_string(),
        html_body,
        reply_to: Some(email.to_string()),
    }
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contact_message_escapes_user_input() {
        let msg = contact_message("<b>Eve</b>", "eve@example.com", "+1 555", "Hi & bye");
        assert_eq!(msg.subject, CONTACT_SUBJECT);
        assert_eq!(msg.reply_to.as_deref(), Some("eve@example.com"));
        assert!(msg.html_body.contains("&lt;b&gt;Eve&lt;/b&gt;"));
        assert!(msg.html_body.contains("Hi &amp; bye"));
        assert!(msg.html_body.contains(r#"<a href="tel:+1 555">+1 555</a>"#));
        assert!(!msg.html_body.contains("<b>Eve</b>"));
    }

    #[test]
    fn falls_back_to_log_mailer_without_credentials() {
        let config = Config::default();
        assert!(from_config(&config).is_ok());
    }

    #[tokio::test]
    async fn log_mailer_always_succeeds() {
        let msg = contact_message("Ann", "ann@example.com", "12345", "Hello there");
        assert!(LogMailer.send(msg).await.is_ok());
    }
}
