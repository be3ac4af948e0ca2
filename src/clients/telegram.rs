//! Telegram Bot API client.
//!
//! Only the handful of methods the bot needs: resolving a document's file
//! path, downloading it, and replying with plain text.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize, de::DeserializeOwned};

/// Request timeout for Bot API calls and file downloads.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Incoming webhook update.
///
/// Only messages are handled; other update kinds deserialize with
/// `message: None` and are ignored.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Message {
    pub message_id: i64,
    pub from: Option<User>,
    pub chat: Chat,
    pub text: Option<String>,
    pub document: Option<Document>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct User {
    pub id: i64,
    pub username: Option<String>,
    pub first_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Document {
    pub file_id: String,
    pub file_name: Option<String>,
    pub mime_type: Option<String>,
}

impl Message {
    pub fn sender_username(&self) -> Option<&str> {
        self.from.as_ref().and_then(|u| u.username.as_deref())
    }

    /// The attached document, if it is a PDF.
    pub fn pdf_document(&self) -> Option<&Document> {
        self.document
            .as_ref()
            .filter(|d| d.mime_type.as_deref() == Some("application/pdf"))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TelegramError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Bot API returned an error: {0}")]
    Api(String),

    #[error("Failed to download file from telegram api: {0}")]
    Download(reqwest::StatusCode),

    #[error("Invalid Telegram API base URL: {0}")]
    InvalidBaseUrl(#[from] url::ParseError),
}

/// Envelope every Bot API method answers with.
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct File {
    file_path: Option<String>,
}

#[derive(Clone)]
pub struct TelegramClient {
    client: Client,
    api_base: String,
    token: String,
}

impl TelegramClient {
    pub fn new(api_base: &str, token: impl Into<String>) -> Result<Self, TelegramError> {
        // Validate early so a typo in TELEGRAM_API_BASE fails at start-up
        let parsed = url::Url::parse(api_base)?;

        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        Ok(Self {
            client,
            api_base: parsed.as_str().trim_end_matches('/').to_string(),
            token: token.into(),
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_base, self.token, method)
    }

    async fn call<B, T>(&self, method: &str, body: &B) -> Result<T, TelegramError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .client
            .post(self.method_url(method))
            .json(body)
            .send()
            .await?;

        // The Bot API reports failures in the body, also for non-2xx statuses
        let envelope: ApiResponse<T> = response.json().await?;

        match envelope {
            ApiResponse {
                ok: true,
                result: Some(result),
                ..
            } => Ok(result),
            ApiResponse { description, .. } => Err(TelegramError::Api(
                description.unwrap_or_else(|| format!("{method} failed")),
            )),
        }
    }

    /// Resolve the server-side path of an uploaded file.
    pub async fn get_file(&self, file_id: &str) -> Result<String, TelegramError> {
        #[derive(Serialize)]
        struct GetFileRequest<'a> {
            file_id: &'a str,
        }

        let file: File = self.call("getFile", &GetFileRequest { file_id }).await?;

        file.file_path
            .ok_or_else(|| TelegramError::Api("getFile returned no file_path".to_string()))
    }

    /// Download a file previously resolved with [`TelegramClient::get_file`].
    pub async fn download_file(&self, file_path: &str) -> Result<Vec<u8>, TelegramError> {
        let url = format!("{}/file/bot{}/{}", self.api_base, self.token, file_path);

        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(TelegramError::Download(response.status()));
        }

        Ok(response.bytes().await?.to_vec())
    }

    /// Send a plain-text message.
    pub async fn send_message(&self, chat_id: i64, text: &str) -> Result<(), TelegramError> {
        #[derive(Serialize)]
        struct SendMessageRequest<'a> {
            chat_id: i64,
            text: &'a str,
        }

        tracing::debug!(chat_id, text, "Sending Telegram message");

        let _: serde_json::Value = self
            .call("sendMessage", &SendMessageRequest { chat_id, text })
            .await?;

        Ok(())
    }
}
