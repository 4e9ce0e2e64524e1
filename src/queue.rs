use std::sync::Arc;

use async_trait::async_trait;
use aws_sdk_sqs::Client;
use log::{debug, info};

use crate::aws::Session;
use crate::descriptor::{self, Descriptor};
use crate::error::{ErrorKind, Result, ServiceError};
use crate::models::SendReceipt;

const SQS_URL_PREFIX: &str = "https://sqs";

#[async_trait]
pub trait QueueService: Send + Sync {
    async fn get_queue_url(&self, queue_name: &str) -> std::result::Result<String, ServiceError>;

    async fn send_message(
        &self,
        queue_url: &str,
        body: &str,
    ) -> std::result::Result<SendReceipt, ServiceError>;
}

#[async_trait]
impl QueueService for Client {
    async fn get_queue_url(&self, queue_name: &str) -> std::result::Result<String, ServiceError> {
        debug!("GetQueueUrl {}", queue_name);
        let resp = self.get_queue_url().queue_name(queue_name).send().await?;
        resp.queue_url.ok_or_else(|| {
            ServiceError::new(
                ErrorKind::Other,
                None,
                format!("GetQueueUrl returned no URL for queue {}", queue_name),
            )
        })
    }

    async fn send_message(
        &self,
        queue_url: &str,
        body: &str,
    ) -> std::result::Result<SendReceipt, ServiceError> {
        debug!("SendMessage to {} ({} bytes)", queue_url, body.len());
        let resp = self
            .send_message()
            .queue_url(queue_url)
            .message_body(body)
            .send()
            .await?;
        Ok(SendReceipt {
            message_id: resp.message_id,
            md5_of_body: resp.md5_of_message_body,
        })
    }
}

pub fn is_queue_url(queue: &str) -> bool {
    queue.starts_with(SQS_URL_PREFIX)
}

/// Sends single messages to one SQS queue, resolved once on construction.
pub struct QueueSender<Q = Client> {
    service: Arc<Q>,
    queue_url: String,
}

impl QueueSender<Client> {
    pub async fn from_dsn(dsn: &str) -> Result<Self> {
        let descriptor = Descriptor::parse_with_keys(
            dsn,
            &[descriptor::REGION, descriptor::CREDENTIALS, descriptor::QUEUE],
        )?;
        let session = Session::from_descriptor(&descriptor).await?;
        Self::new(&session, &descriptor).await
    }

    pub async fn new(session: &Session, descriptor: &Descriptor) -> Result<Self> {
        Self::with_service(Arc::new(session.sqs_client()), descriptor).await
    }
}

impl<Q> QueueSender<Q>
where
    Q: QueueService,
{
    /// Binds to the `queue` named in `descriptor`, looking up its URL unless
    /// it already is one.
    pub async fn with_service(service: Arc<Q>, descriptor: &Descriptor) -> Result<Self> {
        let queue = descriptor.require(descriptor::QUEUE)?;

        let queue_url = if is_queue_url(queue) {
            queue.to_string()
        } else {
            let url = service.get_queue_url(queue).await?;
            info!("Resolved queue {} to {}", queue, url);
            url
        };

        Ok(Self { service, queue_url })
    }

    pub fn queue_url(&self) -> &str {
        &self.queue_url
    }

    pub async fn send(&self, body: &str) -> Result<SendReceipt> {
        let receipt = self.service.send_message(&self.queue_url, body).await?;
        debug!("Sent message {:?}", receipt.message_id);
        Ok(receipt)
    }
}

/// One-shot helper: resolve the queue in `dsn` and send `body` to it.
pub async fn send_message_with_dsn(dsn: &str, body: &str) -> Result<SendReceipt> {
    QueueSender::from_dsn(dsn).await?.send(body).await
}
