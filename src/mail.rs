use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

use crate::config::SmtpConfig;

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_verification_code(&self, to: &str, code: &str) -> anyhow::Result<()>;
}

/// SMTP mailer (STARTTLS) used in production.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(config: &SmtpConfig) -> anyhow::Result<Self> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)?
            .port(config.port)
            .credentials(Credentials::new(
                config.user.clone(),
                config.password.clone(),
            ))
            .build();
        let from: Mailbox = config.from.parse()?;
        Ok(Self { transport, from })
    }
}

fn verification_body(code: &str) -> String {
    format!(
        "<html>\
            <body>\
                <h2>Welcome to PozLite Studio!</h2>\
                <p>Your verification code:</p>\
                <h1 style=\"color: #8B5CF6; font-size: 32px;\">{code}</h1>\
                <p>The code is valid for 5 minutes.</p>\
            </body>\
        </html>"
    )
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send_verification_code(&self, to: &str, code: &str) -> anyhow::Result<()> {
        let message = Message::builder()
            .from(self.from.clone())
            .to(to.parse()?)
            .subject("PozLite Studio verification code")
            .header(ContentType::TEXT_HTML)
            .body(verification_body(code))?;
        self.transport.send(message).await?;
        Ok(())
    }
}
