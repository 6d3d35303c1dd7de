//! Notification agent
//!
//! Filters ranked opportunities per user, renders the HTML digest, delivers it
//! through the SendGrid v3 REST API, and records the alert rows. A failed
//! delivery is logged and counted; the batch always runs to completion.

use std::time::Duration;

use sea_orm::DatabaseConnection;

use fomento_auth::UserAccount;
use fomento_common::{ALERT_KIND_DASHBOARD, ALERT_KIND_EMAIL, ALERT_RELEVANCE_THRESHOLD};
use fomento_opportunity::OpportunityInfo;
use fomento_opportunity::service::alert;

use crate::model::{DeliveryDetail, DeliveryReport};

const MAIL_SEND_PATH: &str = "/v3/mail/send";

#[derive(Debug, Clone)]
pub struct EmailConfig {
    /// SendGrid API key; delivery is disabled when unset
    pub api_key: Option<String>,
    /// API base URL, overridable for tests
    pub api_url: String,
    pub from_email: String,
    /// Dashboard link embedded in the digest
    pub dashboard_url: String,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: "https://api.sendgrid.com".to_string(),
            from_email: "noreply@fomento.dev".to_string(),
            dashboard_url: "https://app.fomento.dev/dashboard".to_string(),
        }
    }
}

/// SendGrid mail delivery client
pub struct EmailClient {
    config: EmailConfig,
    client: reqwest::Client,
}

impl EmailClient {
    pub fn new(config: EmailConfig) -> Self {
        if config.api_key.is_none() {
            tracing::warn!("SendGrid API key not configured, email delivery disabled");
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self { config, client }
    }

    pub fn enabled(&self) -> bool {
        self.config.api_key.is_some()
    }

    /// Deliver one HTML email
    pub async fn send(&self, to: &str, subject: &str, html: &str) -> anyhow::Result<()> {
        let Some(api_key) = self.config.api_key.as_deref() else {
            anyhow::bail!("email delivery disabled");
        };

        let payload = serde_json::json!({
            "personalizations": [{ "to": [{ "email": to }] }],
            "from": { "email": self.config.from_email },
            "subject": subject,
            "content": [{ "type": "text/html", "value": html }],
        });

        let response = self
            .client
            .post(format!("{}{}", self.config.api_url, MAIL_SEND_PATH))
            .bearer_auth(api_key)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("SendGrid returned HTTP {}: {}", status, body);
        }

        Ok(())
    }
}

pub struct Notifier {
    email: EmailClient,
    dashboard_url: String,
}

impl Notifier {
    pub fn new(config: EmailConfig) -> Self {
        let dashboard_url = config.dashboard_url.clone();
        Self {
            email: EmailClient::new(config),
            dashboard_url,
        }
    }

    /// Send alerts about the given opportunities to every matching user.
    /// Email alerts get an alerts row per digest; dashboard rows are written
    /// per matched opportunity.
    pub async fn send_alerts(
        &self,
        db: &DatabaseConnection,
        users: &[UserAccount],
        opportunities: &[OpportunityInfo],
    ) -> DeliveryReport {
        tracing::info!(
            "Sending alerts to {} users about {} opportunities",
            users.len(),
            opportunities.len()
        );

        let mut report = DeliveryReport::default();

        for user in users {
            let matched = filter_for_user(user, opportunities);
            if matched.is_empty() {
                continue;
            }

            let html = render_digest(
                &user.name,
                user.startup_name.as_deref(),
                matched.len(),
                &self.dashboard_url,
            );
            let subject = format!("{} novas oportunidades para você", matched.len());

            let outcome = if self.email.enabled() {
                match self.email.send(&user.email, &subject, &html).await {
                    Ok(()) => {
                        report.sent += 1;
                        "sent"
                    }
                    Err(e) => {
                        tracing::error!("Failed to send alert to {}: {}", user.email, e);
                        report.failed += 1;
                        report.details.push(DeliveryDetail {
                            user: user.email.clone(),
                            opportunities: matched.len(),
                            status: "failed".to_string(),
                            error: Some(e.to_string()),
                        });
                        continue;
                    }
                }
            } else {
                "skipped"
            };

            if outcome == "sent"
                && let Err(e) = alert::record(db, user.id, matched[0].id, ALERT_KIND_EMAIL).await
            {
                tracing::error!("Failed to record email alert for {}: {}", user.email, e);
            }

            for opportunity in &matched {
                if let Err(e) =
                    alert::record(db, user.id, opportunity.id, ALERT_KIND_DASHBOARD).await
                {
                    tracing::error!(
                        "Failed to record dashboard alert for {}: {}",
                        user.email,
                        e
                    );
                }
            }

            report.details.push(DeliveryDetail {
                user: user.email.clone(),
                opportunities: matched.len(),
                status: outcome.to_string(),
                error: None,
            });
        }

        tracing::info!(
            "Alert delivery finished: {} sent, {} failed",
            report.sent,
            report.failed
        );

        report
    }
}

/// Opportunities worth alerting this user about
pub fn filter_for_user<'a>(
    user: &UserAccount,
    opportunities: &'a [OpportunityInfo],
) -> Vec<&'a OpportunityInfo> {
    opportunities
        .iter()
        .filter(|opp| {
            if !user.preferred_categories.is_empty() {
                let Some(category) = &opp.category else {
                    return false;
                };
                if !user.preferred_categories.contains(category) {
                    return false;
                }
            }

            if !user.preferred_regions.is_empty() {
                let Some(region) = &opp.region else {
                    return false;
                };
                if !user.preferred_regions.contains(region) {
                    return false;
                }
            }

            opp.relevance_score >= ALERT_RELEVANCE_THRESHOLD
        })
        .collect()
}

/// Render the HTML digest for a user
pub fn render_digest(
    user_name: &str,
    startup_name: Option<&str>,
    opportunity_count: usize,
    dashboard_url: &str,
) -> String {
    let startup = startup_name
        .filter(|s| !s.is_empty())
        .unwrap_or("sua startup");

    format!(
        r#"<html>
<body style="font-family: Arial, sans-serif; line-height: 1.6; color: #333;">
  <div style="max-width: 600px; margin: 0 auto; padding: 20px;">
    <div style="background: linear-gradient(135deg, #667eea 0%, #764ba2 100%); color: white; padding: 30px; border-radius: 10px; text-align: center;">
      <h1 style="margin: 0; font-size: 28px;">Fomento</h1>
      <p style="margin: 10px 0 0 0; font-size: 16px;">Novas oportunidades para {startup}</p>
    </div>
    <div style="padding: 30px 0;">
      <h2 style="color: #667eea;">Olá, {user_name}!</h2>
      <p>Encontramos <strong>{opportunity_count} novas oportunidades</strong> que podem ser perfeitas para {startup}.</p>
      <div style="background: #f8f9ff; padding: 20px; border-radius: 8px; margin: 20px 0;">
        <h3 style="color: #667eea; margin-top: 0;">Resumo das oportunidades</h3>
        <ul style="margin: 0; padding-left: 20px;">
          <li>Editais governamentais com alta compatibilidade</li>
          <li>Bolsas de desenvolvimento tecnológico</li>
          <li>Oportunidades de investimento privado</li>
        </ul>
      </div>
      <div style="text-align: center; margin: 30px 0;">
        <a href="{dashboard_url}" style="background: #667eea; color: white; padding: 15px 30px; text-decoration: none; border-radius: 5px; font-weight: bold;">Ver oportunidades</a>
      </div>
      <p style="color: #666; font-size: 14px;">Acesse seu dashboard para ver análises detalhadas e scores de compatibilidade para cada oportunidade.</p>
    </div>
    <div style="border-top: 1px solid #eee; padding-top: 20px; text-align: center; color: #666; font-size: 12px;">
      <p>Este email foi enviado pelo Fomento - Sistema Inteligente de Oportunidades</p>
    </div>
  </div>
</body>
</html>"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn user(categories: &[&str], regions: &[&str]) -> UserAccount {
        UserAccount {
            id: 1,
            email: "founder@startup.com.br".to_string(),
            name: "Maria".to_string(),
            is_active: true,
            created_at: chrono::NaiveDateTime::default(),
            startup_name: Some("HealthAI".to_string()),
            startup_segment: Some("Saúde".to_string()),
            startup_trl: Some(5),
            startup_area: None,
            startup_description: None,
            preferred_regions: regions.iter().map(|s| s.to_string()).collect(),
            preferred_categories: categories.iter().map(|s| s.to_string()).collect(),
            min_amount: None,
            alert_frequency: "weekly".to_string(),
        }
    }

    fn opportunity(id: i64, category: &str, region: &str, score: f64) -> OpportunityInfo {
        OpportunityInfo {
            id,
            external_id: format!("test_{id}"),
            title: "Edital".to_string(),
            description: None,
            category: Some(category.to_string()),
            kind: Some("edital".to_string()),
            region: Some(region.to_string()),
            deadline: None,
            amount: None,
            source: None,
            source_url: None,
            relevance_score: score,
            tags: vec![],
            is_active: true,
            created_at: chrono::NaiveDateTime::default(),
            updated_at: chrono::NaiveDateTime::default(),
            is_favorite: false,
        }
    }

    #[test]
    fn test_filter_for_user_applies_preferences_and_threshold() {
        let user = user(&["Saúde"], &["Brasil"]);
        let opportunities = vec![
            opportunity(1, "Saúde", "Brasil", 80.0),
            opportunity(2, "Energia", "Brasil", 90.0),
            opportunity(3, "Saúde", "Europa", 90.0),
            opportunity(4, "Saúde", "Brasil", 55.0),
        ];

        let matched = filter_for_user(&user, &opportunities);
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].id, 1);
    }

    #[test]
    fn test_filter_for_user_without_preferences() {
        let user = user(&[], &[]);
        let opportunities = vec![
            opportunity(1, "Saúde", "Brasil", 80.0),
            opportunity(2, "Energia", "Europa", 61.0),
            opportunity(3, "Saúde", "Brasil", 59.0),
        ];

        // Only the relevance threshold applies
        assert_eq!(filter_for_user(&user, &opportunities).len(), 2);
    }

    #[test]
    fn test_render_digest() {
        let html = render_digest("Maria", Some("HealthAI"), 3, "https://app.fomento.dev");
        assert!(html.contains("Olá, Maria!"));
        assert!(html.contains("3 novas oportunidades"));
        assert!(html.contains("HealthAI"));
        assert!(html.contains("https://app.fomento.dev"));
    }

    #[test]
    fn test_render_digest_without_startup_name() {
        let html = render_digest("João", None, 1, "https://app.fomento.dev");
        assert!(html.contains("sua startup"));
    }

    #[tokio::test]
    async fn test_email_client_sends_expected_payload() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/v3/mail/send")
                    .header("authorization", "Bearer sg-test-key")
                    .json_body_partial(
                        r#"{ "from": { "email": "noreply@fomento.dev" }, "subject": "Teste" }"#,
                    );
                then.status(202);
            })
            .await;

        let client = EmailClient::new(EmailConfig {
            api_key: Some("sg-test-key".to_string()),
            api_url: server.base_url(),
            ..Default::default()
        });

        client
            .send("founder@startup.com.br", "Teste", "<p>olá</p>")
            .await
            .unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_email_client_disabled_without_key() {
        let client = EmailClient::new(EmailConfig::default());
        assert!(!client.enabled());
        assert!(client.send("a@b.c", "x", "y").await.is_err());
    }
}
